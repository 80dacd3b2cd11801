//! `tracing` subscriber setup for the stdio server.
//!
//! Stdout carries protocol traffic, so logs never go there: they go to stderr or to the
//! configured log file.

use crate::config::StdioLogConfig;
use crate::error::{IoLogError, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Build the filter: `RUST_LOG` wins, then the configured level.
///
/// # Errors
///
/// Returns an error if the configured level is not a valid filter directive.
pub fn env_filter(cfg: &StdioLogConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&cfg.log_level)
        .map_err(|e| IoLogError::Config(format!("invalid log level '{}': {e}", cfg.log_level)))
}

fn make_writer(cfg: &StdioLogConfig) -> Result<BoxMakeWriter> {
    match &cfg.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Ok(BoxMakeWriter::new(Mutex::new(file)))
        }
        None => Ok(BoxMakeWriter::new(std::io::stderr)),
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the filter is invalid, the log file cannot be opened, or a global
/// subscriber is already installed.
pub fn init_tracing(cfg: &StdioLogConfig) -> Result<()> {
    let filter = env_filter(cfg)?;
    let writer = make_writer(cfg)?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(cfg.log_file.is_none());

    let res = if cfg.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    res.map_err(|e| IoLogError::Config(format!("failed to install tracing subscriber: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unopenable_log_file_is_an_io_error() {
        let cfg = StdioLogConfig {
            log_file: Some("/nonexistent-dir/ghmcp/log.txt".into()),
            ..StdioLogConfig::default()
        };
        assert!(matches!(make_writer(&cfg), Err(IoLogError::Io(_))));
    }
}
