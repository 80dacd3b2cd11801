//! Stdio logging configuration.
//!
//! Env:
//! - `GHMCP_ENABLE_COMMAND_LOGGING=1` to log (redacted) stdio traffic.
//! - `GHMCP_LOG_FILE=/path/to/file` to write logs to a file instead of stderr.
//! - `GHMCP_LOG_LEVEL=debug` default filter when `RUST_LOG` is unset (default `info`).
//! - `GHMCP_LOG_JSON=1` for JSON log lines.

use crate::error::{IoLogError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StdioLogConfig {
    #[serde(default)]
    pub enable_command_logging: bool,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for StdioLogConfig {
    fn default() -> Self {
        Self {
            enable_command_logging: false,
            log_file: None,
            log_level: default_log_level(),
            json: false,
        }
    }
}

fn parse_flag(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(IoLogError::Config(format!(
            "{name}: expected a boolean flag, got '{other}'"
        ))),
    }
}

impl StdioLogConfig {
    /// Load from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a flag variable holds something other than a boolean.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a flag variable holds something other than a boolean.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let flag = |name: &str| -> Result<bool> {
            lookup(name).map_or(Ok(false), |raw| parse_flag(name, &raw))
        };
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Self {
            enable_command_logging: flag("GHMCP_ENABLE_COMMAND_LOGGING")?,
            log_file: non_empty("GHMCP_LOG_FILE").map(PathBuf::from),
            log_level: non_empty("GHMCP_LOG_LEVEL").unwrap_or_else(default_log_level),
            json: flag("GHMCP_LOG_JSON")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let cfg = StdioLogConfig::from_lookup(lookup(&[])).expect("cfg");
        assert_eq!(cfg, StdioLogConfig::default());
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn reads_all_variables() {
        let cfg = StdioLogConfig::from_lookup(lookup(&[
            ("GHMCP_ENABLE_COMMAND_LOGGING", "Yes"),
            ("GHMCP_LOG_FILE", "/tmp/ghmcp.log"),
            ("GHMCP_LOG_LEVEL", "debug"),
            ("GHMCP_LOG_JSON", "1"),
        ]))
        .expect("cfg");
        assert!(cfg.enable_command_logging);
        assert_eq!(cfg.log_file, Some(PathBuf::from("/tmp/ghmcp.log")));
        assert_eq!(cfg.log_level, "debug");
        assert!(cfg.json);
    }

    #[test]
    fn blank_values_fall_back() {
        let cfg = StdioLogConfig::from_lookup(lookup(&[
            ("GHMCP_LOG_FILE", "  "),
            ("GHMCP_LOG_LEVEL", ""),
            ("GHMCP_LOG_JSON", ""),
        ]))
        .expect("cfg");
        assert_eq!(cfg, StdioLogConfig::default());
    }

    #[test]
    fn rejects_garbage_flags() {
        let err = StdioLogConfig::from_lookup(lookup(&[("GHMCP_LOG_JSON", "maybe")])).unwrap_err();
        assert!(err.to_string().contains("GHMCP_LOG_JSON"));
    }

    #[test]
    fn deserializes_camel_case_with_defaults() {
        let cfg: StdioLogConfig =
            serde_json::from_str(r#"{"enableCommandLogging": true}"#).expect("json");
        assert!(cfg.enable_command_logging);
        assert_eq!(cfg.log_level, "info");
    }
}
