//! Channel modes.
//!
//! | letter | meaning                                  | argument     |
//! |--------|------------------------------------------|--------------|
//! | `n`    | no messages from non-members             |              |
//! | `b`    | accepted and ignored                     |              |
//! | `R`    | bridge to a broker topic                 | `+R <topic>` |
//! | `J`    | payloads are JSON rather than plain text |              |
//! | `N`    | JSON path selecting the origin nickname  | `+N <path>`  |
//! | `T`    | JSON path selecting the text             | `+T <path>`  |
//! | `P`    | republish channel chat to the broker     |              |
//!
//! Removal never takes an argument: `-R`, `-N` and `-T` just clear.

use crate::bridge::BridgeSettings;

/// The mode state of one channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelModes {
    pub no_external: bool,
    pub json: bool,
    pub topic: Option<String>,
    pub nick_path: Option<String>,
    pub text_path: Option<String>,
    pub publish: bool,
}

/// What a mode string did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ModeOutcome {
    /// Applied changes, sign before every letter (`+n+R-T`).
    pub flags: String,
    /// Arguments consumed by the applied changes, in order.
    pub args: Vec<String>,
    /// Unknown letters, one reply each.
    pub unknown: Vec<char>,
    /// `R` was applied; the running bridge must be replaced.
    pub topic_changed: bool,
}

impl ModeOutcome {
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    fn push(&mut self, sign: char, c: char) {
        self.flags.push(sign);
        self.flags.push(c);
    }
}

impl ChannelModes {
    /// Mode string for 324: `+` followed by the set letters in the order
    /// `n J R N T P`.
    pub fn mode_string(&self) -> String {
        let mut s = String::from("+");
        for (set, c) in [
            (self.no_external, 'n'),
            (self.json, 'J'),
            (self.topic.is_some(), 'R'),
            (self.nick_path.is_some(), 'N'),
            (self.text_path.is_some(), 'T'),
            (self.publish, 'P'),
        ] {
            if set {
                s.push(c);
            }
        }
        s
    }

    /// The subset of modes a running bridge needs.
    pub fn bridge_settings(&self) -> BridgeSettings {
        BridgeSettings {
            json: self.json,
            nick_path: self.nick_path.clone(),
            text_path: self.text_path.clone(),
            publish: self.publish,
        }
    }

    /// Apply `MODE <chan> <modes> [args...]`.
    ///
    /// Letters are processed left to right; a letter that needs an argument
    /// and finds none is skipped, and an unknown letter does not stop the
    /// ones after it.
    pub fn apply(&mut self, modes: &str, args: &[String]) -> ModeOutcome {
        let mut out = ModeOutcome::default();
        let mut args = args.iter();
        let mut sign = '+';

        for c in modes.chars() {
            let adding = sign == '+';
            match c {
                '+' | '-' => sign = c,
                'n' => {
                    if self.no_external != adding {
                        self.no_external = adding;
                        out.push(sign, c);
                    }
                }
                'b' => {}
                'R' => {
                    if !adding {
                        if self.topic.take().is_some() {
                            out.push(sign, c);
                            out.topic_changed = true;
                        }
                    } else if let Some(topic) = args.next() {
                        self.topic = Some(topic.clone());
                        out.push(sign, c);
                        out.args.push(topic.clone());
                        out.topic_changed = true;
                    }
                }
                'J' => {
                    self.json = adding;
                    out.push(sign, c);
                }
                'N' | 'T' => {
                    let slot = if c == 'N' {
                        &mut self.nick_path
                    } else {
                        &mut self.text_path
                    };
                    if adding {
                        if let Some(path) = args.next() {
                            *slot = Some(path.clone());
                            out.push(sign, c);
                            out.args.push(path.clone());
                        }
                    } else if slot.take().is_some() {
                        out.push(sign, c);
                    }
                }
                'P' => {
                    self.publish = adding;
                    out.push(sign, c);
                }
                other => out.unknown.push(other),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn seeded_defaults() {
        let mut modes = ChannelModes::default();
        let out = modes.apply("+nRP", &args(&["foo"]));
        assert_eq!(out.flags, "+n+R+P");
        assert_eq!(out.args, vec!["foo"]);
        assert!(out.topic_changed);
        assert_eq!(modes.mode_string(), "+nRP");
        assert_eq!(modes.topic.as_deref(), Some("foo"));
    }

    #[test]
    fn json_and_text_path_round_trip() {
        let mut modes = ChannelModes::default();
        assert_eq!(modes.apply("+nJ", &[]).flags, "+n+J");

        let out = modes.apply("+T", &args(&["$.msg"]));
        assert_eq!(out.flags, "+T");
        assert_eq!(out.args, vec!["$.msg"]);
        assert_eq!(modes.text_path.as_deref(), Some("$.msg"));

        let out = modes.apply("-T", &[]);
        assert_eq!(out.flags, "-T");
        assert!(modes.text_path.is_none());
        assert_eq!(modes.mode_string(), "+nJ");
    }

    #[test]
    fn argument_starved_letters_are_skipped() {
        let mut modes = ChannelModes::default();
        let out = modes.apply("+TnN", &[]);
        assert_eq!(out.flags, "+n");
        assert!(modes.text_path.is_none());
        assert!(modes.nick_path.is_none());

        let out = modes.apply("+R", &[]);
        assert!(out.is_empty());
        assert!(!out.topic_changed);
    }

    #[test]
    fn n_only_echoes_changes() {
        let mut modes = ChannelModes::default();
        assert_eq!(modes.apply("+n", &[]).flags, "+n");
        assert!(modes.apply("+n", &[]).is_empty());
        assert_eq!(modes.apply("-n", &[]).flags, "-n");
    }

    #[test]
    fn j_and_p_always_echo() {
        let mut modes = ChannelModes::default();
        assert_eq!(modes.apply("-J-P", &[]).flags, "-J-P");
        assert_eq!(modes.apply("+PP", &[]).flags, "+P+P");
        assert!(modes.publish);
    }

    #[test]
    fn unknown_letters_do_not_stop_parsing() {
        let mut modes = ChannelModes::default();
        let out = modes.apply("+nxJy", &[]);
        assert_eq!(out.flags, "+n+J");
        assert_eq!(out.unknown, vec!['x', 'y']);
        assert!(modes.no_external && modes.json);
    }

    #[test]
    fn ban_is_ignored() {
        let mut modes = ChannelModes::default();
        let out = modes.apply("+b", &args(&["*!*@*"]));
        assert!(out.is_empty());
        assert!(out.unknown.is_empty());
    }

    #[test]
    fn removing_bridge() {
        let mut modes = ChannelModes::default();
        modes.apply("+R", &args(&["events"]));

        let out = modes.apply("-R", &[]);
        assert_eq!(out.flags, "-R");
        assert!(out.topic_changed);
        assert!(modes.topic.is_none());

        let out = modes.apply("-R", &[]);
        assert!(out.is_empty());
        assert!(!out.topic_changed);
    }

    #[test]
    fn replacing_bridge_topic() {
        let mut modes = ChannelModes::default();
        modes.apply("+R", &args(&["a"]));
        let out = modes.apply("+R", &args(&["b"]));
        assert_eq!(out.flags, "+R");
        assert!(out.topic_changed);
        assert_eq!(modes.topic.as_deref(), Some("b"));
    }

    #[test]
    fn minus_path_takes_no_argument() {
        let mut modes = ChannelModes::default();
        modes.apply("+NT", &args(&["$.who", "$.msg"]));
        let out = modes.apply("-T+R", &args(&["topic"]));
        assert_eq!(out.flags, "-T+R");
        assert_eq!(out.args, vec!["topic"]);
        assert_eq!(modes.mode_string(), "+RN");
    }

    #[test]
    fn bridge_settings_follow_modes() {
        let mut modes = ChannelModes::default();
        modes.apply("+JNP", &args(&["$.who"]));
        let settings = modes.bridge_settings();
        assert!(settings.json && settings.publish);
        assert_eq!(settings.nick_path.as_deref(), Some("$.who"));
        assert!(settings.text_path.is_none());
    }
}
