//! Host configuration.
//!
//! Env:
//! - `GHMCP_HOST` (falls back to `GITHUB_HOST`): github.com, a `*.ghe.com` tenant, or an
//!   Enterprise Server URL such as `https://ghes.example.com`.
//! - `GHMCP_PROBE_TIMEOUT_MS`: timeout for the subdomain isolation probe (default 5000).

use crate::error::{HostError, Result};
use crate::probe::ReqwestProbe;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

fn default_probe_timeout_ms() -> u64 {
    DEFAULT_PROBE_TIMEOUT_MS
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            host: None,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
        }
    }
}

impl HostConfig {
    /// Load from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the probe timeout is not a positive integer.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the probe timeout is not a positive integer.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host = non_empty("GHMCP_HOST").or_else(|| non_empty("GITHUB_HOST"));
        let probe_timeout_ms = match non_empty("GHMCP_PROBE_TIMEOUT_MS") {
            None => DEFAULT_PROBE_TIMEOUT_MS,
            Some(raw) => match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => ms,
                _ => {
                    return Err(HostError::Config(format!(
                        "GHMCP_PROBE_TIMEOUT_MS: expected a positive integer, got '{raw}'"
                    )));
                }
            },
        };

        Ok(Self {
            host,
            probe_timeout_ms,
        })
    }

    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Build the HTTP probe with this config's timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn probe(&self) -> Result<ReqwestProbe> {
        let client = reqwest::Client::builder()
            .timeout(self.probe_timeout())
            .build()
            .map_err(|e| HostError::Http(e.to_string()))?;
        Ok(ReqwestProbe::new(client))
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
    fn defaults() {
        let cfg = HostConfig::from_lookup(lookup(&[])).expect("cfg");
        assert_eq!(cfg, HostConfig::default());
        assert_eq!(cfg.probe_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn ghmcp_host_wins_over_github_host() {
        let cfg = HostConfig::from_lookup(lookup(&[
            ("GHMCP_HOST", " https://ghes.example.com "),
            ("GITHUB_HOST", "https://other.example.com"),
        ]))
        .expect("cfg");
        assert_eq!(cfg.host.as_deref(), Some("https://ghes.example.com"));

        let cfg = HostConfig::from_lookup(lookup(&[("GITHUB_HOST", "octocorp.ghe.com")]))
            .expect("cfg");
        assert_eq!(cfg.host.as_deref(), Some("octocorp.ghe.com"));
    }

    #[test]
    fn probe_timeout_must_be_positive() {
        let cfg =
            HostConfig::from_lookup(lookup(&[("GHMCP_PROBE_TIMEOUT_MS", "250")])).expect("cfg");
        assert_eq!(cfg.probe_timeout(), Duration::from_millis(250));

        for bad in ["0", "-1", "soon"] {
            let err =
                HostConfig::from_lookup(lookup(&[("GHMCP_PROBE_TIMEOUT_MS", bad)])).unwrap_err();
            assert!(matches!(err, HostError::Config(_)), "{bad}: {err}");
        }
    }

    #[test]
    fn builds_probe() {
        HostConfig::default().probe().expect("probe");
    }
}
