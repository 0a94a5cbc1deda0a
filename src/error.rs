//! Unified error handling for slircd-relay.
//!
//! Handler errors are the recoverable protocol errors of a single command:
//! each one maps to exactly one numeric reply. Broker errors never reach a
//! client; the bridge logs them and stops.

use slirc_proto::{Message, Prefix, Response};
use thiserror::Error;

// ============================================================================
// Handler Errors (command processing)
// ============================================================================

/// Errors that can occur during command handling.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("not enough parameters")]
    NeedMoreParams,

    #[error("no recipient given")]
    NoRecipient,

    #[error("no text to send")]
    NoTextToSend,

    #[error("no nickname given")]
    NoNicknameGiven,

    #[error("erroneous nickname: {0}")]
    ErroneousNickname(String),

    #[error("nickname in use: {0}")]
    NicknameInUse(String),

    #[error("not registered")]
    NotRegistered,

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("illegal channel name: {0}")]
    BadChannelName(String),

    #[error("users don't match")]
    UsersDontMatch,

    /// Registries are gone; the server is shutting down.
    #[error("internal error: {0}")]
    Internal(String),

    /// Terminate the session with this reason.
    #[error("client quit: {0}")]
    Quit(String),
}

impl HandlerError {
    /// Get a static error code string for log fields.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NeedMoreParams => "need_more_params",
            Self::NoRecipient => "no_recipient",
            Self::NoTextToSend => "no_text_to_send",
            Self::NoNicknameGiven => "no_nickname_given",
            Self::ErroneousNickname(_) => "erroneous_nickname",
            Self::NicknameInUse(_) => "nickname_in_use",
            Self::NotRegistered => "not_registered",
            Self::UnknownCommand(_) => "unknown_command",
            Self::BadChannelName(_) => "bad_channel_name",
            Self::UsersDontMatch => "users_dont_match",
            Self::Internal(_) => "internal_error",
            Self::Quit(_) => "quit",
        }
    }

    /// Convert to an IRC error reply message.
    ///
    /// Returns `None` for errors that end the session instead of being
    /// answered (quit, internal errors).
    pub fn to_irc_reply(&self, server_name: &str, nick: &str, cmd_name: &str) -> Option<Message> {
        let msg = match self {
            Self::NeedMoreParams => Response::err_needmoreparams(nick, cmd_name),
            Self::NoRecipient => Response::err_norecipient(nick),
            Self::NoTextToSend => Response::err_notexttosend(nick),
            Self::NoNicknameGiven => Response::err_nonicknamegiven(nick),
            Self::ErroneousNickname(bad) => Response::err_erroneousnickname(nick, bad),
            Self::NicknameInUse(taken) => Response::err_nicknameinuse(nick, taken),
            Self::NotRegistered => Response::err_notregistered(nick),
            Self::UnknownCommand(cmd) => Response::err_unknowncommand(nick, cmd),
            Self::BadChannelName(chan) => Response::err_badchanname(nick, chan),
            Self::UsersDontMatch => Response::err_usersdontmatch(nick),

            Self::Internal(_) | Self::Quit(_) => return None,
        };

        Some(msg.with_prefix(Prefix::ServerName(server_name.to_string())))
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;

impl From<RegistryError> for HandlerError {
    fn from(err: RegistryError) -> Self {
        HandlerError::Internal(err.to_string())
    }
}

// ============================================================================
// Registry Errors (actor plumbing)
// ============================================================================

/// A registry's request loop is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("{0} registry closed")]
    Closed(&'static str),
}

// ============================================================================
// Broker Errors (bridge plumbing)
// ============================================================================

/// Failures talking to the pub/sub broker.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("unsupported broker url: {0}")]
    UnsupportedUrl(String),

    #[error("redis: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("broker closed")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replies_carry_server_prefix_and_nick() {
        let reply = HandlerError::NeedMoreParams
            .to_irc_reply("irc.test", "alice", "JOIN")
            .unwrap();
        assert_eq!(
            reply.to_string(),
            ":irc.test 461 alice JOIN :Not enough parameters"
        );
    }

    #[test]
    fn nickname_errors_name_the_nick() {
        let reply = HandlerError::NicknameInUse("bob".into())
            .to_irc_reply("irc.test", "*", "NICK")
            .unwrap();
        assert_eq!(
            reply.to_string(),
            ":irc.test 433 * bob :Nickname already in use"
        );

        let reply = HandlerError::ErroneousNickname("9lives".into())
            .to_irc_reply("irc.test", "*", "NICK")
            .unwrap();
        assert_eq!(reply.to_string(), ":irc.test 432 * 9lives :Bad nickname");
    }

    #[test]
    fn unknown_command_reply() {
        let reply = HandlerError::UnknownCommand("FROB".into())
            .to_irc_reply("irc.test", "alice", "FROB")
            .unwrap();
        assert_eq!(reply.to_string(), ":irc.test 421 alice FROB :Unknown command");
    }

    #[test]
    fn session_ending_errors_have_no_reply() {
        assert!(
            HandlerError::Quit("bye".into())
                .to_irc_reply("s", "n", "QUIT")
                .is_none()
        );
        assert!(
            HandlerError::Internal("gone".into())
                .to_irc_reply("s", "n", "JOIN")
                .is_none()
        );
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(HandlerError::NoRecipient.error_code(), "no_recipient");
        assert_eq!(HandlerError::Quit(String::new()).error_code(), "quit");
    }
}
