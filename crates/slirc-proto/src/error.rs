//! Error types for the protocol crate.
//!
//! [`ProtocolError`] covers framing and transport failures surfaced by the
//! codecs; [`MessageParseError`] describes why a single line did not parse.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Line exceeded the configured maximum length.
    #[error("message too long: {actual} bytes (limit: {limit})")]
    MessageTooLong {
        /// Bytes buffered so far for the offending line.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },

    /// The peer closed the stream in the middle of a line.
    #[error("unexpected end of stream with {0} bytes unterminated")]
    UnexpectedEof(usize),

    /// Failed to parse a line.
    #[error("invalid message: {string}")]
    InvalidMessage {
        /// The offending line.
        string: String,
        /// The underlying parse error.
        #[source]
        cause: MessageParseError,
    },
}

/// Errors encountered when parsing a single line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Line was empty or whitespace only.
    #[error("empty message")]
    EmptyMessage,

    /// A `:` prefix was not followed by a command.
    #[error("unterminated origin/prefix")]
    UnterminatedOrigin,

    /// Command token was missing or not `1*letter / 3digit`.
    #[error("invalid command")]
    InvalidCommand,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_long_display() {
        let err = ProtocolError::MessageTooLong {
            actual: 1024,
            limit: 512,
        };
        assert_eq!(err.to_string(), "message too long: 1024 bytes (limit: 512)");
    }

    #[test]
    fn invalid_message_chains_cause() {
        let err = ProtocolError::InvalidMessage {
            string: ":lonely".to_string(),
            cause: MessageParseError::UnterminatedOrigin,
        };
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("unterminated origin/prefix"));
    }

    #[test]
    fn io_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert!(matches!(ProtocolError::from(io), ProtocolError::Io(_)));
    }
}
