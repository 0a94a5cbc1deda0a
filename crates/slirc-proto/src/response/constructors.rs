//! Reply constructors.
//!
//! Every reply is addressed to the requesting client first; the caller sets
//! the server prefix.

use crate::command::Command;
use crate::message::Message;
use crate::response::Response;

macro_rules! impl_reply {
    (
        $(#[$meta:meta])*
        $name:ident, $resp:ident, $msg:literal
    ) => {
        $(#[$meta])*
        pub fn $name(client: &str) -> Message {
            Self::reply(Response::$resp, vec![client.to_string(), $msg.to_string()])
        }
    };
    (
        $(#[$meta:meta])*
        $name:ident, $resp:ident, $arg:ident, $msg:literal
    ) => {
        $(#[$meta])*
        pub fn $name(client: &str, $arg: &str) -> Message {
            Self::reply(
                Response::$resp,
                vec![client.to_string(), $arg.to_string(), $msg.to_string()],
            )
        }
    };
}

impl Response {
    /// Build a numeric reply from raw parameters.
    pub fn reply(resp: Response, params: Vec<String>) -> Message {
        Message::from(Command::Response(resp, params))
    }

    impl_reply!(
        /// 411 - PRIVMSG/NOTICE without a target.
        err_norecipient, ERR_NORECIPIENT, "No recipient given"
    );
    impl_reply!(
        /// 412 - PRIVMSG/NOTICE without text.
        err_notexttosend, ERR_NOTEXTTOSEND, "No text to send"
    );
    impl_reply!(
        /// 431 - NICK without a parameter.
        err_nonicknamegiven, ERR_NONICKNAMEGIVEN, "No nickname given"
    );
    impl_reply!(
        /// 451 - a registered-only command before registration.
        err_notregistered, ERR_NOTREGISTERED, "Command not yet available"
    );
    impl_reply!(
        /// 502 - MODE on somebody else's nickname.
        err_usersdontmatch, ERR_USERSDONTMATCH, "Can't change mode for other users"
    );
    impl_reply!(
        /// 401 - unknown nickname target.
        err_nosuchnick, ERR_NOSUCHNICK, target, "No such nick/channel"
    );
    impl_reply!(
        /// 403 - unknown channel.
        err_nosuchchannel, ERR_NOSUCHCHANNEL, channel, "No such channel"
    );
    impl_reply!(
        /// 404 - external message to a `+n` channel.
        err_cannotsendtochan, ERR_CANNOTSENDTOCHAN, channel, "Cannot send to channel"
    );
    impl_reply!(
        /// 421 - unknown command.
        err_unknowncommand, ERR_UNKNOWNCOMMAND, command, "Unknown command"
    );
    impl_reply!(
        /// 432 - nickname failed validation.
        err_erroneousnickname, ERR_ERRONEOUSNICKNAME, nick, "Bad nickname"
    );
    impl_reply!(
        /// 433 - nickname already registered.
        err_nicknameinuse, ERR_NICKNAMEINUSE, nick, "Nickname already in use"
    );
    impl_reply!(
        /// 442 - PART from a channel the client is not in.
        err_notonchannel, ERR_NOTONCHANNEL, channel, "You're not on that channel"
    );
    impl_reply!(
        /// 461 - too few parameters.
        err_needmoreparams, ERR_NEEDMOREPARAMS, command, "Not enough parameters"
    );
    impl_reply!(
        /// 472 - unknown channel mode letter.
        err_unknownmode, ERR_UNKNOWNMODE, mode_char, "is an unknown mode character"
    );
    impl_reply!(
        /// 479 - JOIN/PART with a malformed channel name.
        err_badchanname, ERR_BADCHANNAME, channel, "Illegal channel name"
    );

    /// 221 - the client's own user modes.
    pub fn rpl_umodeis(client: &str, modes: &str) -> Message {
        Self::reply(
            Response::RPL_UMODEIS,
            vec![client.to_string(), modes.to_string()],
        )
    }

    /// 324 - channel mode string.
    pub fn rpl_channelmodeis(client: &str, channel: &str, modes: &str) -> Message {
        Self::reply(
            Response::RPL_CHANNELMODEIS,
            vec![client.to_string(), channel.to_string(), modes.to_string()],
        )
    }

    /// 353 - space separated member list of a public channel.
    pub fn rpl_namreply(client: &str, channel: &str, names: &str) -> Message {
        Self::reply(
            Response::RPL_NAMREPLY,
            vec![
                client.to_string(),
                "=".to_string(),
                channel.to_string(),
                names.to_string(),
            ],
        )
    }

    /// 366 - end of names list.
    pub fn rpl_endofnames(client: &str, channel: &str) -> Message {
        Self::reply(
            Response::RPL_ENDOFNAMES,
            vec![
                client.to_string(),
                channel.to_string(),
                "End of NAMES list".to_string(),
            ],
        )
    }
}
