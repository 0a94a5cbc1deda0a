//! Line parsing.
//!
//! `[:prefix] <command> [params...] [:trailing]` with nom for the head of
//! the line and a hand loop for parameters. Runs of spaces separate
//! parameters; at most 15 are kept.

use std::str::FromStr;

use nom::{
    bytes::complete::take_while1,
    character::complete::{char, space0},
    combinator::opt,
    sequence::preceded,
    IResult,
};

use crate::error::{MessageParseError, ProtocolError};
use crate::prefix::Prefix;

use super::types::Message;

const MAX_PARAMS: usize = 15;

fn parse_prefix(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), take_while1(|c| c != ' '))(input)
}

/// `1*letter / 3digit`
fn parse_command(input: &str) -> IResult<&str, &str> {
    let (rest, cmd) = take_while1(|c: char| c.is_ascii_alphanumeric())(input)?;
    let letters = cmd.chars().all(|c| c.is_ascii_alphabetic());
    let numeric = cmd.len() == 3 && cmd.chars().all(|c| c.is_ascii_digit());
    if letters || numeric {
        Ok((rest, cmd))
    } else {
        Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::AlphaNumeric,
        )))
    }
}

fn parse_params(mut rest: &str) -> Vec<&str> {
    let mut params = Vec::new();
    loop {
        let trimmed = rest.trim_start_matches(' ');
        if trimmed.len() == rest.len() || trimmed.is_empty() || params.len() >= MAX_PARAMS {
            break;
        }
        if let Some(trailing) = trimmed.strip_prefix(':') {
            params.push(trailing);
            break;
        }
        let end = trimmed.find(' ').unwrap_or(trimmed.len());
        params.push(&trimmed[..end]);
        rest = &trimmed[end..];
    }
    params
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Message, Self::Err> {
        let invalid = |cause| ProtocolError::InvalidMessage {
            string: s.to_owned(),
            cause,
        };

        let line = s.trim_end_matches(['\r', '\n']).trim_start_matches(' ');
        if line.trim().is_empty() {
            return Err(invalid(MessageParseError::EmptyMessage));
        }

        let (rest, prefix) = opt(parse_prefix)(line)
            .map_err(|_: nom::Err<nom::error::Error<&str>>| invalid(MessageParseError::UnterminatedOrigin))?;
        let (rest, _) = space0::<_, nom::error::Error<&str>>(rest)
            .map_err(|_| invalid(MessageParseError::UnterminatedOrigin))?;
        if prefix.is_some() && rest.is_empty() {
            return Err(invalid(MessageParseError::UnterminatedOrigin));
        }
        let (rest, command) =
            parse_command(rest).map_err(|_| invalid(MessageParseError::InvalidCommand))?;
        if !(rest.is_empty() || rest.starts_with(' ')) {
            return Err(invalid(MessageParseError::InvalidCommand));
        }

        Ok(Message::new(
            prefix.map(Prefix::new_from_str),
            command,
            parse_params(rest),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::response::Response;

    #[test]
    fn parses_prefix_command_and_trailing() {
        let msg: Message = ":alice!~a@h PRIVMSG #c :hello there\r\n".parse().unwrap();
        assert_eq!(msg.prefix, Some(Prefix::new("alice", "~a", "h")));
        assert_eq!(
            msg.command,
            Command::PRIVMSG("#c".into(), "hello there".into())
        );
    }

    #[test]
    fn bare_lf_and_extra_spaces() {
        let msg: Message = "USER  guest 0 *   :Real Name\n".parse().unwrap();
        assert_eq!(
            msg.command,
            Command::USER("guest".into(), "0".into(), "*".into(), "Real Name".into())
        );
    }

    #[test]
    fn empty_trailing_is_a_param() {
        let msg: Message = "QUIT :".parse().unwrap();
        assert_eq!(msg.command, Command::QUIT(Some(String::new())));
    }

    #[test]
    fn numerics_parse() {
        let msg: Message = ":irc.test 433 * bob :Nickname already in use".parse().unwrap();
        assert!(matches!(
            msg.command,
            Command::Response(Response::ERR_NICKNAMEINUSE, ref p) if p.len() == 3
        ));
    }

    #[test]
    fn http_request_line_is_raw() {
        let msg: Message = "GET /publish/x HTTP/1.1\r\n".parse().unwrap();
        assert_eq!(
            msg.command,
            Command::Raw("GET".into(), vec!["/publish/x".into(), "HTTP/1.1".into()])
        );
    }

    #[test]
    fn garbage_is_an_error() {
        assert!("".parse::<Message>().is_err());
        assert!("   \r\n".parse::<Message>().is_err());
        assert!(":onlyprefix".parse::<Message>().is_err());
        assert!("PRIV-MSG x".parse::<Message>().is_err());
        assert!("12 x".parse::<Message>().is_err());
    }

    #[test]
    fn keeps_at_most_fifteen_params() {
        let line = format!("MODE #c {}", vec!["x"; 20].join(" "));
        let msg: Message = line.parse().unwrap();
        assert_eq!(msg.command.params().len(), MAX_PARAMS);
    }
}
