//! API endpoint resolution for github.com, GHE.com tenants and Enterprise Server.

use crate::cache::SubdomainIsolationCache;
use crate::error::{HostError, Result};
use crate::probe::PingProbe;
use url::Url;

const DOTCOM_HOST: &str = "github.com";
const TENANCY_SUFFIX: &str = ".ghe.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    DotCom,
    Tenancy,
    Enterprise,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiHost {
    pub kind: HostKind,
    pub rest: Url,
    pub graphql: Url,
    pub uploads: Url,
    pub raw: Url,
}

fn invalid(host: &str, message: impl Into<String>) -> HostError {
    HostError::InvalidHost {
        host: host.to_string(),
        message: message.into(),
    }
}

impl ApiHost {
    /// Public github.com endpoints.
    ///
    /// # Errors
    ///
    /// Infallible in practice; the URLs are constants.
    pub fn dotcom() -> Result<Self> {
        Ok(Self {
            kind: HostKind::DotCom,
            rest: Url::parse("https://api.github.com/")?,
            graphql: Url::parse("https://api.github.com/graphql")?,
            uploads: Url::parse("https://uploads.github.com")?,
            raw: Url::parse("https://raw.githubusercontent.com/")?,
        })
    }

    /// GHE.com tenant endpoints; tenants always use dedicated subdomains.
    ///
    /// # Errors
    ///
    /// Returns an error if `hostname` does not form valid URLs.
    pub fn tenancy(hostname: &str) -> Result<Self> {
        Ok(Self {
            kind: HostKind::Tenancy,
            rest: Url::parse(&format!("https://api.{hostname}/"))?,
            graphql: Url::parse(&format!("https://api.{hostname}/graphql"))?,
            uploads: Url::parse(&format!("https://uploads.{hostname}"))?,
            raw: Url::parse(&format!("https://raw.{hostname}/"))?,
        })
    }

    /// Enterprise Server endpoints for a known isolation setting.
    ///
    /// # Errors
    ///
    /// Returns an error if `scheme`/`host` do not form valid URLs.
    pub fn enterprise(scheme: &str, host: &str, isolated: bool) -> Result<Self> {
        let (uploads, raw) = if isolated {
            (
                format!("{scheme}://uploads.{host}/"),
                format!("{scheme}://raw.{host}/"),
            )
        } else {
            (
                format!("{scheme}://{host}/api/uploads/"),
                format!("{scheme}://{host}/raw/"),
            )
        };
        Ok(Self {
            kind: HostKind::Enterprise,
            rest: Url::parse(&format!("{scheme}://{host}/api/v3/"))?,
            graphql: Url::parse(&format!("{scheme}://{host}/api/graphql"))?,
            uploads: Url::parse(&uploads)?,
            raw: Url::parse(&raw)?,
        })
    }

    /// Resolve a configured host string.
    ///
    /// - empty or `github.com` (with or without `https://`): public endpoints
    /// - `*.ghe.com`: tenant endpoints
    /// - anything else: Enterprise Server; must carry an `http`/`https` scheme, and the
    ///   uploads/raw layout depends on the (cached) subdomain isolation probe.
    ///
    /// # Errors
    ///
    /// Returns an error for unparsable hosts, unsupported schemes, or Enterprise hosts given
    /// without a scheme.
    pub async fn resolve<P>(
        host: &str,
        cache: &SubdomainIsolationCache,
        probe: &P,
    ) -> Result<Self>
    where
        P: PingProbe + ?Sized,
    {
        let host = host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Self::dotcom();
        }

        if !host.contains("://") {
            let lower = host.to_ascii_lowercase();
            if lower == DOTCOM_HOST {
                return Self::dotcom();
            }
            if lower.ends_with(TENANCY_SUFFIX) {
                return Self::tenancy(&lower);
            }
            return Err(invalid(host, "host must have a scheme (http or https)"));
        }

        let url = Url::parse(host).map_err(|e| invalid(host, e.to_string()))?;
        let scheme = url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(invalid(
                host,
                format!("unsupported scheme '{scheme}' (expected http or https)"),
            ));
        }
        let Some(hostname) = url.host_str() else {
            return Err(invalid(host, "missing hostname"));
        };

        if hostname == DOTCOM_HOST {
            return Self::dotcom();
        }
        if hostname.ends_with(TENANCY_SUFFIX) {
            return Self::tenancy(hostname);
        }

        let authority = match url.port() {
            Some(port) => format!("{hostname}:{port}"),
            None => hostname.to_string(),
        };
        let isolated = cache.check(probe, scheme, &authority).await;
        Self::enterprise(scheme, &authority, isolated)
    }

    /// URL of a file's raw content at a given ref.
    ///
    /// # Errors
    ///
    /// Returns an error if the joined path is not a valid URL.
    pub fn raw_content_url(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
        path: &str,
    ) -> Result<Url> {
        let path = path.trim_start_matches('/');
        Ok(self.raw.join(&format!("{owner}/{repo}/{git_ref}/{path}"))?)
    }
}
