//! Commands understood by the relay.
//!
//! Parsing never fails on arity: a known verb with too few arguments becomes
//! [`Command::Raw`] so that handlers can answer with the right numeric
//! (`461`, `411`, `431`, ...) instead of the parser guessing.

use crate::response::Response;

/// An IRC command with its parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Command {
    /// `NICK <nickname>`
    NICK(String),
    /// `USER <user> <mode> <unused> <realname>`
    USER(String, String, String, String),
    /// `PING <token> [<server>]`
    PING(String, Option<String>),
    /// `PONG <server> [<token>]`
    PONG(String, Option<String>),
    /// `QUIT [<reason>]`
    QUIT(Option<String>),
    /// `JOIN <chan>{,<chan>}`
    JOIN(String),
    /// `PART <chan> [<reason>]`
    PART(String, Option<String>),
    /// `PRIVMSG <target> <text>`
    PRIVMSG(String, String),
    /// `NOTICE <target> <text>`
    NOTICE(String, String),
    /// `MODE <target> [<modes> [<args>...]]`
    MODE(String, Vec<String>),
    /// `ERROR <text>`, server to client only.
    ERROR(String),
    /// A numeric reply.
    Response(Response, Vec<String>),
    /// Anything else, or a known verb with unusable arity.
    Raw(String, Vec<String>),
}

impl Command {
    /// Build a command from a verb and its arguments.
    ///
    /// The verb is matched case-insensitively and upper-cased in `Raw`.
    pub fn new(cmd: &str, args: Vec<&str>) -> Command {
        let upper = cmd.to_ascii_uppercase();
        let owned = |i: usize| args[i].to_owned();
        let opt = |i: usize| args.get(i).map(|s| (*s).to_owned());

        match (upper.as_str(), args.len()) {
            ("NICK", n) if n >= 1 => Command::NICK(owned(0)),
            ("USER", n) if n >= 4 => Command::USER(owned(0), owned(1), owned(2), owned(3)),
            ("PING", n) if n >= 1 => Command::PING(owned(0), opt(1)),
            ("PONG", n) if n >= 1 => Command::PONG(owned(0), opt(1)),
            ("QUIT", _) => Command::QUIT(opt(0)),
            ("JOIN", n) if n >= 1 => Command::JOIN(owned(0)),
            ("PART", n) if n >= 1 => Command::PART(owned(0), opt(1)),
            ("PRIVMSG", n) if n >= 2 => Command::PRIVMSG(owned(0), owned(1)),
            ("NOTICE", n) if n >= 2 => Command::NOTICE(owned(0), owned(1)),
            ("MODE", n) if n >= 1 => Command::MODE(
                owned(0),
                args[1..].iter().map(|s| (*s).to_owned()).collect(),
            ),
            ("ERROR", n) if n >= 1 => Command::ERROR(owned(0)),
            _ => match upper.parse::<Response>() {
                Ok(resp) => Command::Response(resp, args.iter().map(|s| (*s).to_owned()).collect()),
                Err(()) => Command::Raw(upper, args.iter().map(|s| (*s).to_owned()).collect()),
            },
        }
    }

    /// The verb as written on the wire.
    pub fn name(&self) -> String {
        match self {
            Command::NICK(_) => "NICK".into(),
            Command::USER(..) => "USER".into(),
            Command::PING(..) => "PING".into(),
            Command::PONG(..) => "PONG".into(),
            Command::QUIT(_) => "QUIT".into(),
            Command::JOIN(_) => "JOIN".into(),
            Command::PART(..) => "PART".into(),
            Command::PRIVMSG(..) => "PRIVMSG".into(),
            Command::NOTICE(..) => "NOTICE".into(),
            Command::MODE(..) => "MODE".into(),
            Command::ERROR(_) => "ERROR".into(),
            Command::Response(resp, _) => resp.to_string(),
            Command::Raw(name, _) => name.clone(),
        }
    }

    /// Parameters in wire order.
    pub fn params(&self) -> Vec<&str> {
        match self {
            Command::NICK(n) => vec![n.as_str()],
            Command::USER(u, m, x, r) => vec![u.as_str(), m.as_str(), x.as_str(), r.as_str()],
            Command::PING(a, b) | Command::PONG(a, b) => {
                let mut v = vec![a.as_str()];
                v.extend(b.as_deref());
                v
            }
            Command::QUIT(r) => r.as_deref().into_iter().collect(),
            Command::JOIN(c) => vec![c.as_str()],
            Command::PART(c, r) => {
                let mut v = vec![c.as_str()];
                v.extend(r.as_deref());
                v
            }
            Command::PRIVMSG(t, m) | Command::NOTICE(t, m) => vec![t.as_str(), m.as_str()],
            Command::MODE(t, rest) => {
                let mut v = vec![t.as_str()];
                v.extend(rest.iter().map(String::as_str));
                v
            }
            Command::ERROR(m) => vec![m.as_str()],
            Command::Response(_, p) | Command::Raw(_, p) => p.iter().map(String::as_str).collect(),
        }
    }

    /// Whether the last parameter is free text and always written as a
    /// trailing (`:`-prefixed) parameter.
    pub(crate) fn has_text_trailing(&self) -> bool {
        matches!(
            self,
            Command::PRIVMSG(..)
                | Command::NOTICE(..)
                | Command::QUIT(Some(_))
                | Command::PART(_, Some(_))
                | Command::ERROR(_)
        )
    }
}
