//! Classification of read failures into quit reasons.

use slirc_proto::error::ProtocolError;
use tracing::debug;

/// Reported for transport failures. The underlying error only goes to the log.
pub(super) const READ_ERROR_REASON: &str = "Read error";
pub(super) const WRITE_ERROR_REASON: &str = "Write error";

/// Quit reason announced when reading from the client fails.
///
/// Every read error is fatal: the line codec cannot resynchronise after an
/// over-long line without guessing where the next one starts.
pub(super) fn read_error_reason(e: &ProtocolError) -> String {
    match e {
        ProtocolError::UnexpectedEof(_) => "EOF".to_string(),
        ProtocolError::MessageTooLong { limit, .. } => {
            format!("Input line too long (limit {limit} bytes)")
        }
        other => {
            debug!(error = %other, "Read failed");
            READ_ERROR_REASON.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons() {
        assert_eq!(read_error_reason(&ProtocolError::UnexpectedEof(3)), "EOF");
        assert_eq!(
            read_error_reason(&ProtocolError::MessageTooLong {
                actual: 600,
                limit: 512
            }),
            "Input line too long (limit 512 bytes)"
        );
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert_eq!(read_error_reason(&ProtocolError::Io(io)), "Read error");
    }
}
