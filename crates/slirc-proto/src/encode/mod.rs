//! Writing messages to byte streams.
//!
//! [`IrcEncode`] writes the wire form plus CRLF straight into any
//! [`Write`] implementor, refusing parameters that would break framing.
//!
//! ```
//! use slirc_proto::{IrcEncode, Message};
//!
//! let bytes = Message::privmsg("#ops", "hi").to_bytes();
//! assert_eq!(&bytes, b"PRIVMSG #ops :hi\r\n");
//! ```

use std::io::{self, Write};

mod message;

/// Encode a protocol element to a byte stream.
pub trait IrcEncode {
    /// Encode this value to the given writer, returning the bytes written.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when a parameter contains CR, LF or NUL; otherwise
    /// whatever the writer reports.
    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<usize>;

    /// Encode into a fresh buffer. Invalid messages yield an empty buffer.
    #[must_use]
    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(512);
        if self.encode(&mut buf).is_err() {
            buf.clear();
        }
        buf
    }
}
