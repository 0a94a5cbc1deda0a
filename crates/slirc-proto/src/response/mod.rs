//! Numeric replies.
//!
//! Only the numerics the relay actually sends are listed. Each is written on
//! the wire as its three-digit zero-padded code.

#![allow(non_camel_case_types)]

mod constructors;

use std::fmt;
use std::str::FromStr;

/// IRC server response code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
#[non_exhaustive]
pub enum Response {
    // === Connection Registration ===
    /// 001 - Welcome
    RPL_WELCOME = 1,
    /// 002 - Your host is running version
    RPL_YOURHOST = 2,
    /// 003 - Server description
    RPL_CREATED = 3,
    /// 004 - Server name, version, user modes, channel modes
    RPL_MYINFO = 4,

    // === Command Responses ===
    /// 221 - User mode string
    RPL_UMODEIS = 221,
    /// 324 - Channel mode string
    RPL_CHANNELMODEIS = 324,
    /// 353 - Names list
    RPL_NAMREPLY = 353,
    /// 366 - End of names list
    RPL_ENDOFNAMES = 366,

    // === Errors ===
    /// 401 - No such nick
    ERR_NOSUCHNICK = 401,
    /// 403 - No such channel
    ERR_NOSUCHCHANNEL = 403,
    /// 404 - Cannot send to channel
    ERR_CANNOTSENDTOCHAN = 404,
    /// 411 - No recipient given
    ERR_NORECIPIENT = 411,
    /// 412 - No text to send
    ERR_NOTEXTTOSEND = 412,
    /// 421 - Unknown command
    ERR_UNKNOWNCOMMAND = 421,
    /// 431 - No nickname given
    ERR_NONICKNAMEGIVEN = 431,
    /// 432 - Erroneous nickname
    ERR_ERRONEOUSNICKNAME = 432,
    /// 433 - Nickname in use
    ERR_NICKNAMEINUSE = 433,
    /// 442 - Not on channel
    ERR_NOTONCHANNEL = 442,
    /// 451 - Not registered
    ERR_NOTREGISTERED = 451,
    /// 461 - Not enough parameters
    ERR_NEEDMOREPARAMS = 461,
    /// 472 - Unknown mode character
    ERR_UNKNOWNMODE = 472,
    /// 479 - Illegal channel name (not in RFC 2812, widely used)
    ERR_BADCHANNAME = 479,
    /// 502 - Users don't match
    ERR_USERSDONTMATCH = 502,
}

impl Response {
    /// Numeric code.
    #[inline]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Look up a known numeric.
    pub fn from_code(code: u16) -> Option<Response> {
        use Response::*;
        let resp = match code {
            1 => RPL_WELCOME,
            2 => RPL_YOURHOST,
            3 => RPL_CREATED,
            4 => RPL_MYINFO,
            221 => RPL_UMODEIS,
            324 => RPL_CHANNELMODEIS,
            353 => RPL_NAMREPLY,
            366 => RPL_ENDOFNAMES,
            401 => ERR_NOSUCHNICK,
            403 => ERR_NOSUCHCHANNEL,
            404 => ERR_CANNOTSENDTOCHAN,
            411 => ERR_NORECIPIENT,
            412 => ERR_NOTEXTTOSEND,
            421 => ERR_UNKNOWNCOMMAND,
            431 => ERR_NONICKNAMEGIVEN,
            432 => ERR_ERRONEOUSNICKNAME,
            433 => ERR_NICKNAMEINUSE,
            442 => ERR_NOTONCHANNEL,
            451 => ERR_NOTREGISTERED,
            461 => ERR_NEEDMOREPARAMS,
            472 => ERR_UNKNOWNMODE,
            479 => ERR_BADCHANNAME,
            502 => ERR_USERSDONTMATCH,
            _ => return None,
        };
        Some(resp)
    }

    /// Error numerics are 400-599.
    #[inline]
    pub fn is_error(&self) -> bool {
        (400..600).contains(&self.code())
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.code())
    }
}

impl FromStr for Response {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 3 {
            return Err(());
        }
        s.parse::<u16>()
            .ok()
            .and_then(Response::from_code)
            .ok_or(())
    }
}
