//! IRC message codec for tokio.
//!
//! [`IrcCodec`] wraps [`LineCodec`], parses every line into a [`Message`]
//! and keeps the verbatim last line so a connection that turns out to speak
//! HTTP can be replayed to another handler.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::encode::IrcEncode;
use crate::error;
use crate::line::LineCodec;
use crate::message::Message;

/// Tokio codec for encoding/decoding IRC messages.
pub struct IrcCodec {
    inner: LineCodec,
    last_line: String,
}

impl IrcCodec {
    /// Codec with the default line limit.
    pub fn new() -> Self {
        Self::with_max_len(crate::line::DEFAULT_MAX_LEN)
    }

    /// Codec with a custom line limit in bytes.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            inner: LineCodec::with_max_len(max_len),
            last_line: String::new(),
        }
    }

    /// The raw last line read, terminator included.
    pub fn last_line(&self) -> &str {
        &self.last_line
    }

    /// Parse lines until one yields a message. Empty and unparseable lines
    /// are dropped.
    fn next_message(&mut self, line: Option<String>) -> Option<Message> {
        let line = line?;
        let parsed = line.parse::<Message>().ok();
        self.last_line = line;
        parsed
    }
}

impl Default for IrcCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for IrcCodec {
    type Item = Message;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<Message>> {
        loop {
            let line = self.inner.decode(src)?;
            let done = line.is_none();
            if let Some(msg) = self.next_message(line) {
                return Ok(Some(msg));
            }
            if done {
                return Ok(None);
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> error::Result<Option<Message>> {
        loop {
            let line = self.inner.decode_eof(src)?;
            let done = line.is_none();
            if let Some(msg) = self.next_message(line) {
                return Ok(Some(msg));
            }
            if done {
                return Ok(None);
            }
        }
    }
}

impl Encoder<&Message> for IrcCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, msg: &Message, dst: &mut BytesMut) -> error::Result<()> {
        msg.encode(&mut dst.writer())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;

    #[test]
    fn skips_blank_and_garbage_lines() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::from("\r\n:::\r\nNICK bob\r\n");
        let msg = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(msg.command, Command::NICK("bob".into()));
        assert!(buf.is_empty());
    }

    #[test]
    fn remembers_last_line() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::from("GET / HTTP/1.1\r\nHost: x\r\n");
        codec.decode(&mut buf).unwrap();
        assert_eq!(codec.last_line(), "GET / HTTP/1.1\r\n");
        assert_eq!(&buf[..], b"Host: x\r\n");
    }

    #[test]
    fn encodes_with_crlf() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::new();
        codec.encode(&Message::join("#c"), &mut buf).unwrap();
        assert_eq!(&buf[..], b"JOIN #c\r\n");
    }

    #[test]
    fn rejects_unsafe_param() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::new();
        let res = codec.encode(&Message::privmsg("#c", "a\nb"), &mut buf);
        assert!(matches!(res, Err(error::ProtocolError::Io(_))));
    }
}
