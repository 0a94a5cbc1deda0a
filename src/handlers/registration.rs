//! Pre-registration state machine.
//!
//! A connection collects a nickname and a username in either order. Once
//! both are present the nick registry is asked for an identity; a taken
//! nickname sends the client back to choosing one, keeping the username.
//!
//! Replies produced here are returned to the caller instead of queued,
//! since the output queue has no consumer until registration completes.

use super::connection::quit_reason;
use super::{HandlerError, Registry};
use crate::state::{Matrix, OutputQueue, ServerInfo, User};
use slirc_proto::scanner::{is_http_request, is_http_verb};
use slirc_proto::{Command, Message, NickExt, Prefix, Response};
use std::sync::Arc;
use tracing::{debug, info};

/// Host shown in the echo of a pre-registration QUIT.
const UNREGISTERED_HOST: &str = "0.0.0.0";

/// What the session should do after a pre-registration command.
#[derive(Debug)]
pub enum Step {
    /// Keep reading.
    Continue,
    /// The client now has an identity.
    Registered(Arc<User>),
    /// Close the connection with this reason.
    Quit(String),
    /// The last line was an HTTP request line; hand the stream over.
    Http,
}

/// State of a connection that has not registered yet.
#[derive(Debug)]
pub struct Unregistered {
    host: String,
    output: OutputQueue,
    nick: Option<String>,
    username: Option<String>,
    realname: Option<String>,
}

impl Unregistered {
    /// `output` becomes the user's queue on successful registration.
    pub fn new(host: impl Into<String>, output: OutputQueue) -> Self {
        Self {
            host: host.into(),
            output,
            nick: None,
            username: None,
            realname: None,
        }
    }

    /// Name replies are addressed to.
    fn client_name(&self) -> &str {
        self.nick.as_deref().unwrap_or("*")
    }

    /// Process one command, appending any replies to `replies`.
    pub async fn handle(
        &mut self,
        matrix: &Matrix,
        registry: &Registry,
        msg: &Message,
        replies: &mut Vec<Message>,
    ) -> Step {
        match self.step(matrix, registry, msg, replies).await {
            Ok(step) => step,
            Err(HandlerError::Quit(reason) | HandlerError::Internal(reason)) => Step::Quit(reason),
            Err(e) => {
                debug!(error = %e, kind = e.error_code(), "Registration command failed");
                let cmd_name = msg.command.name();
                if let Some(reply) = e.to_irc_reply(&matrix.server_info.name, self.client_name(), &cmd_name) {
                    replies.push(reply);
                }
                Step::Continue
            }
        }
    }

    async fn step(
        &mut self,
        matrix: &Matrix,
        registry: &Registry,
        msg: &Message,
        replies: &mut Vec<Message>,
    ) -> Result<Step, HandlerError> {
        match &msg.command {
            Command::NICK(nick) => {
                if !nick.is_valid_nick() {
                    return Err(HandlerError::ErroneousNickname(nick.clone()));
                }
                self.nick = Some(nick.clone());
                self.try_register(matrix, replies).await
            }
            Command::USER(username, _, _, realname) => {
                self.username = Some(format!("~{username}"));
                self.realname = Some(realname.clone());
                self.try_register(matrix, replies).await
            }
            Command::PING(token, _) => {
                let server = &matrix.server_info.name;
                replies.push(
                    Message::pong(server.as_str(), token.as_str())
                        .with_prefix(Prefix::ServerName(server.clone())),
                );
                Ok(Step::Continue)
            }
            Command::QUIT(text) => {
                let prefix = Prefix::new(
                    self.client_name(),
                    self.username.as_deref().unwrap_or_default(),
                    UNREGISTERED_HOST,
                );
                replies.push(Message::quit(text.as_deref().unwrap_or_default()).with_prefix(prefix));
                Err(HandlerError::Quit(quit_reason(&msg.command)))
            }
            Command::Raw(verb, _) if is_http_verb(verb) => {
                if is_http_request(&msg.command.params()[..]) {
                    Ok(Step::Http)
                } else {
                    Ok(Step::Quit("Malformed HTTP".to_string()))
                }
            }
            Command::Raw(verb, _) if verb == "NICK" => Err(HandlerError::NoNicknameGiven),
            Command::Raw(verb, _) if verb == "USER" || verb == "PING" => {
                Err(HandlerError::NeedMoreParams)
            }
            other => {
                let name = other.name();
                if registry.knows(&name) {
                    Err(HandlerError::NotRegistered)
                } else {
                    Err(HandlerError::UnknownCommand(name))
                }
            }
        }
    }

    async fn try_register(
        &mut self,
        matrix: &Matrix,
        replies: &mut Vec<Message>,
    ) -> Result<Step, HandlerError> {
        let (Some(nick), Some(username)) = (self.nick.clone(), self.username.as_deref()) else {
            return Ok(Step::Continue);
        };

        let user = matrix
            .nicks
            .register(&nick, username, &self.host, self.output.clone())
            .await?;

        let Some(user) = user else {
            // Back to choosing a nickname; the username stays.
            self.nick = None;
            info!(nick = %nick, "Nickname in use");
            return Err(HandlerError::NicknameInUse(nick));
        };

        info!(
            uid = %user.id,
            nick = %user.nick,
            realname = self.realname.as_deref().unwrap_or_default(),
            "Client registered"
        );
        replies.extend(welcome_burst(&matrix.server_info, &user.nick));
        Ok(Step::Registered(user))
    }
}

/// Numerics 001-004 sent on successful registration.
pub fn welcome_burst(info: &ServerInfo, nick: &str) -> Vec<Message> {
    let created = info.description.clone().unwrap_or_else(|| {
        format!(
            "This server was created {}",
            info.created.format("%a %b %d %Y at %H:%M:%S UTC")
        )
    });

    let reply = |resp: Response, params: Vec<String>| {
        let mut all = vec![nick.to_string()];
        all.extend(params);
        Response::reply(resp, all).with_prefix(Prefix::ServerName(info.name.clone()))
    };

    vec![
        reply(
            Response::RPL_WELCOME,
            vec![format!("Welcome to something like IRC, {nick}")],
        ),
        reply(
            Response::RPL_YOURHOST,
            vec![format!(
                "Your host is {}, running version {}",
                info.name, info.version
            )],
        ),
        reply(Response::RPL_CREATED, vec![created]),
        reply(
            Response::RPL_MYINFO,
            vec![
                info.name.clone(),
                info.version.clone(),
                "iw".to_string(),
                "noR".to_string(),
                "oR".to_string(),
            ],
        ),
    ]
}
