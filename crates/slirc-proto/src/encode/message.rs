use std::io::{self, Write};

use crate::message::Message;

use super::IrcEncode;

fn breaks_framing(s: &str) -> bool {
    s.bytes().any(|b| b == b'\r' || b == b'\n' || b == 0)
}

impl IrcEncode for Message {
    fn encode<W: Write>(&self, w: &mut W) -> io::Result<usize> {
        let prefix_bad = self
            .prefix
            .as_ref()
            .is_some_and(|p| breaks_framing(&p.to_string()));
        if prefix_bad || self.command.params().into_iter().any(breaks_framing) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "parameter contains CR, LF or NUL",
            ));
        }

        // One write per line keeps concurrent writers from interleaving.
        let mut line = self.to_string().into_bytes();
        line.extend_from_slice(b"\r\n");
        w.write_all(&line)?;
        Ok(line.len())
    }
}
