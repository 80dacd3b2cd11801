//! Error types for `ghmcp-iolog`.

use std::io;
use thiserror::Error;

/// Closed-state errors returned by [`crate::IoLogger`] once it has been closed.
///
/// These travel inside a [`std::io::Error`] so the logger can stand in for any tokio stream;
/// use [`is_end_of_stream`] / [`is_closed_pipe`] to tell them apart from errors produced by the
/// wrapped streams.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportClosed {
    /// Read attempted after close. The read loop should stop.
    #[error("end of stream: transport logger is closed")]
    EndOfStream,

    /// Write attempted after close.
    #[error("write on closed pipe: transport logger is closed")]
    ClosedPipe,
}

impl From<TransportClosed> for io::Error {
    fn from(value: TransportClosed) -> Self {
        let kind = match value {
            TransportClosed::EndOfStream => io::ErrorKind::UnexpectedEof,
            TransportClosed::ClosedPipe => io::ErrorKind::BrokenPipe,
        };
        io::Error::new(kind, value)
    }
}

fn closed_kind(err: &io::Error) -> Option<TransportClosed> {
    err.get_ref()?.downcast_ref::<TransportClosed>().copied()
}

/// True if `err` is the logger's own end-of-stream error (not an underlying EOF).
#[must_use]
pub fn is_end_of_stream(err: &io::Error) -> bool {
    closed_kind(err) == Some(TransportClosed::EndOfStream)
}

/// True if `err` is the logger's own closed-pipe error (not an underlying broken pipe).
#[must_use]
pub fn is_closed_pipe(err: &io::Error) -> bool {
    closed_kind(err) == Some(TransportClosed::ClosedPipe)
}

/// Setup errors: configuration, redaction rules, log destinations.
#[derive(Error, Debug)]
pub enum IoLogError {
    /// Configuration errors (invalid env values, conflicting options)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid redaction rule
    #[error("Invalid redaction rule '{name}': {message}")]
    Rule { name: String, message: String },

    /// IO errors (log file cannot be opened)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for setup operations.
pub type Result<T> = std::result::Result<T, IoLogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_errors_keep_their_identity_through_io_error() {
        let eos: io::Error = TransportClosed::EndOfStream.into();
        assert_eq!(eos.kind(), io::ErrorKind::UnexpectedEof);
        assert!(is_end_of_stream(&eos));
        assert!(!is_closed_pipe(&eos));

        let pipe: io::Error = TransportClosed::ClosedPipe.into();
        assert_eq!(pipe.kind(), io::ErrorKind::BrokenPipe);
        assert!(is_closed_pipe(&pipe));
    }

    #[test]
    fn underlying_errors_are_not_mistaken_for_closed_state() {
        let underlying = io::Error::new(io::ErrorKind::BrokenPipe, "peer went away");
        assert!(!is_closed_pipe(&underlying));
        assert!(!is_end_of_stream(&io::Error::from(io::ErrorKind::UnexpectedEof)));
    }
}
