//! Message origin.
//!
//! A prefix names where a line came from: the server itself, or a user as
//! `nick!user@host`. Any of the user parts may be empty.

use std::fmt;

/// Origin of a message.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum Prefix {
    /// The server, e.g. `irc.example.net`.
    ServerName(String),
    /// A user: (nickname, username, hostname).
    Nickname(String, String, String),
}

impl Prefix {
    /// Build a user prefix.
    pub fn new(nick: impl Into<String>, user: impl Into<String>, host: impl Into<String>) -> Self {
        Prefix::Nickname(nick.into(), user.into(), host.into())
    }

    /// Parse a prefix leniently.
    ///
    /// A name containing `.` and no `!`/`@` is treated as a server name.
    pub fn new_from_str(s: &str) -> Self {
        let (before_host, host) = match s.split_once('@') {
            Some((b, h)) => (b, h),
            None => (s, ""),
        };
        let (name, user) = match before_host.split_once('!') {
            Some((n, u)) => (n, u),
            None => (before_host, ""),
        };
        if user.is_empty() && host.is_empty() && name.contains('.') {
            Prefix::ServerName(name.to_owned())
        } else {
            Prefix::new(name, user, host)
        }
    }

    /// Nickname, for user prefixes with a non-empty nick.
    pub fn nick(&self) -> Option<&str> {
        match self {
            Prefix::Nickname(nick, _, _) if !nick.is_empty() => Some(nick),
            _ => None,
        }
    }

    /// Hostname, or the server name for server prefixes.
    pub fn host(&self) -> Option<&str> {
        match self {
            Prefix::ServerName(name) => Some(name),
            Prefix::Nickname(_, _, host) if !host.is_empty() => Some(host),
            _ => None,
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::ServerName(name) => f.write_str(name),
            Prefix::Nickname(nick, user, host) => {
                f.write_str(nick)?;
                if !user.is_empty() {
                    write!(f, "!{user}")?;
                }
                if !host.is_empty() {
                    write!(f, "@{host}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Prefix {
    fn from(s: &str) -> Self {
        Prefix::new_from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_mask() {
        let p = Prefix::new_from_str("alice!~al@10.1.2.3");
        assert_eq!(p, Prefix::new("alice", "~al", "10.1.2.3"));
        assert_eq!(p.nick(), Some("alice"));
        assert_eq!(p.host(), Some("10.1.2.3"));
    }

    #[test]
    fn dotted_name_is_server() {
        assert_eq!(
            Prefix::new_from_str("irc.example.net"),
            Prefix::ServerName("irc.example.net".into())
        );
        assert_eq!(Prefix::new_from_str("bob").nick(), Some("bob"));
    }

    #[test]
    fn display_omits_empty_parts() {
        assert_eq!(Prefix::new("n", "", "").to_string(), "n");
        assert_eq!(Prefix::new("n", "u", "").to_string(), "n!u");
        assert_eq!(Prefix::new("n", "", "h").to_string(), "n@h");
        assert_eq!(Prefix::new("topic", "auto", "redis").to_string(), "topic!auto@redis");
    }
}
