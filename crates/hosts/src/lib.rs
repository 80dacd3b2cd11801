//! GitHub host resolution.
//!
//! Enterprise Server installs may or may not serve raw content and uploads from dedicated
//! subdomains ("subdomain isolation"). [`SubdomainIsolationCache`] probes each host once and
//! remembers the answer; [`ApiHost`] uses it to build the right endpoint URLs.

pub mod api_host;
pub mod cache;
pub mod config;
pub mod error;
pub mod probe;

pub use api_host::ApiHost;
pub use cache::SubdomainIsolationCache;
pub use config::HostConfig;
pub use error::{HostError, Result};
pub use probe::{PingProbe, ProbeError, ReqwestProbe};
