//! Transport traffic logging for the MCP stdio server.
//!
//! [`IoLogger`] sits between the protocol server and its transport. Every byte is forwarded
//! unchanged; every successful read/write is reported to a [`LogSink`] after secret-shaped
//! substrings have been masked by a [`Redactor`].

pub mod config;
pub mod error;
pub mod logger;
pub mod redact;
pub mod sink;
pub mod telemetry;

pub use config::StdioLogConfig;
pub use error::{IoLogError, Result, TransportClosed, is_closed_pipe, is_end_of_stream};
pub use logger::{CloseHandle, IoLogger};
pub use redact::{Redactor, SecretRule};
pub use sink::{Direction, LogRecord, LogSink, MemorySink, OwnedLogRecord, TracingSink};
