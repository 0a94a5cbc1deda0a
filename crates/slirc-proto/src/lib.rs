//! # slirc-proto
//!
//! The line protocol spoken by `slircd-relay`: a small, strict subset of IRC.
//!
//! ## Features
//!
//! - Message parsing (`:prefix COMMAND middle... :trailing`) and encoding
//! - Typed commands for the verbs the relay understands, with a raw fallback
//! - RFC 1459 case mapping for nickname and channel keys
//! - Nickname and channel name validation
//! - Detection of HTTP request lines arriving on the chat port
//! - A tokio-util codec that remembers the verbatim last line it read
//!
//! ## Quick Start
//!
//! ```rust
//! use slirc_proto::{Command, Message, Prefix};
//!
//! let msg: Message = ":alice!~a@10.0.0.1 PRIVMSG #ops :deploy done".parse().unwrap();
//! assert_eq!(msg.source_nickname(), Some("alice"));
//! assert!(matches!(msg.command, Command::PRIVMSG(ref t, _) if t == "#ops"));
//!
//! let reply = Message::privmsg("#ops", "ack").with_prefix(Prefix::new("bob", "~b", "10.0.0.2"));
//! assert_eq!(reply.to_string(), ":bob!~b@10.0.0.2 PRIVMSG #ops :ack");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod casemap;
pub mod chan;
pub mod command;
pub mod encode;
pub mod error;
#[cfg(feature = "tokio")]
pub mod irc;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;
pub mod nick;
pub mod prefix;
pub mod response;
pub mod scanner;

pub use self::casemap::{irc_eq, irc_lower_char, irc_to_lower};
pub use self::chan::ChannelExt;
pub use self::command::Command;
pub use self::encode::IrcEncode;
pub use self::error::{MessageParseError, ProtocolError};
#[cfg(feature = "tokio")]
pub use self::irc::IrcCodec;
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;
pub use self::message::Message;
pub use self::nick::{NickExt, MAX_NICK_LEN};
pub use self::prefix::Prefix;
pub use self::response::Response;
