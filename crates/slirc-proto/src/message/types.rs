use std::fmt;

use crate::command::Command;
use crate::prefix::Prefix;

/// An owned IRC message: optional origin, verb and parameters.
///
/// Messages are immutable once built; fan-out shares one instance behind an
/// `Arc` instead of cloning.
///
/// ```
/// use slirc_proto::{Message, Prefix};
///
/// let msg = Message::join("#ops").with_prefix(Prefix::new("alice", "~a", "host"));
/// assert_eq!(msg.to_string(), ":alice!~a@host JOIN #ops");
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Message {
    /// Origin of the message, if any.
    pub prefix: Option<Prefix>,
    /// The command and its parameters.
    pub command: Command,
}

impl Message {
    /// Build a message from a verb and raw arguments.
    pub fn new(prefix: Option<Prefix>, command: &str, args: Vec<&str>) -> Message {
        Message {
            prefix,
            command: Command::new(command, args),
        }
    }

    /// Replace the origin.
    #[must_use]
    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = Some(prefix);
        self
    }

    /// Nickname of the origin, for user-originated messages.
    pub fn source_nickname(&self) -> Option<&str> {
        self.prefix.as_ref().and_then(Prefix::nick)
    }

    /// `PRIVMSG <target> :<text>`
    #[must_use]
    pub fn privmsg(target: impl Into<String>, text: impl Into<String>) -> Self {
        Command::PRIVMSG(target.into(), text.into()).into()
    }

    /// `NOTICE <target> :<text>`
    #[must_use]
    pub fn notice(target: impl Into<String>, text: impl Into<String>) -> Self {
        Command::NOTICE(target.into(), text.into()).into()
    }

    /// `JOIN <channel>`
    #[must_use]
    pub fn join(channel: impl Into<String>) -> Self {
        Command::JOIN(channel.into()).into()
    }

    /// `PART <channel> :<reason>`
    #[must_use]
    pub fn part(channel: impl Into<String>, reason: impl Into<String>) -> Self {
        Command::PART(channel.into(), Some(reason.into())).into()
    }

    /// `QUIT :<reason>`
    #[must_use]
    pub fn quit(reason: impl Into<String>) -> Self {
        Command::QUIT(Some(reason.into())).into()
    }

    /// `PING <token>`
    #[must_use]
    pub fn ping(token: impl Into<String>) -> Self {
        Command::PING(token.into(), None).into()
    }

    /// `PONG <server> <token>`
    #[must_use]
    pub fn pong(server: impl Into<String>, token: impl Into<String>) -> Self {
        Command::PONG(server.into(), Some(token.into())).into()
    }

    /// `ERROR :<text>`
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Command::ERROR(text.into()).into()
    }
}

impl From<Command> for Message {
    fn from(command: Command) -> Self {
        Message {
            prefix: None,
            command,
        }
    }
}

/// Whether a final parameter must be sent as `:trailing`.
#[inline]
pub(crate) fn needs_colon_prefix(s: &str) -> bool {
    s.is_empty() || s.contains(' ') || s.starts_with(':')
}

impl fmt::Display for Message {
    /// Wire form without the line terminator.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, ":{prefix} ")?;
        }
        f.write_str(&self.command.name())?;

        let params = self.command.params();
        if let Some((last, middle)) = params.split_last() {
            for p in middle {
                write!(f, " {p}")?;
            }
            if self.command.has_text_trailing() || needs_colon_prefix(last) {
                write!(f, " :{last}")?;
            } else {
                write!(f, " {last}")?;
            }
        }
        Ok(())
    }
}
