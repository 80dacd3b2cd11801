//! Memoized subdomain isolation checks.

use crate::probe::{PingProbe, loggable_url, ping_url};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Per-host memo of "does this host isolate the `raw.` subdomain".
///
/// Construct once and share (clones share storage). Entries are never evicted: a probe failure
/// is remembered as `false` for the lifetime of the cache.
///
/// The lock covers only the map lookup and the store. The probe runs unlocked, so two callers
/// racing on a cold host may both probe; the last store wins and both see the same answer in
/// practice since a host's configuration does not change underneath a running process.
#[derive(Debug, Clone, Default)]
pub struct SubdomainIsolationCache {
    inner: Arc<Mutex<HashMap<String, bool>>>,
}

impl SubdomainIsolationCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn host_key(scheme: &str, host: &str) -> String {
        format!("{scheme}://{host}")
    }

    /// Cached answer, if any. Never touches the network.
    #[must_use]
    pub fn get(&self, scheme: &str, host: &str) -> Option<bool> {
        self.inner.lock().get(&Self::host_key(scheme, host)).copied()
    }

    /// Return the cached flag for `scheme://host`, probing `scheme://raw.host/_ping` on a miss.
    ///
    /// A 2xx answer means isolated; any other status or a probe failure means not isolated.
    pub async fn check<P>(&self, probe: &P, scheme: &str, host: &str) -> bool
    where
        P: PingProbe + ?Sized,
    {
        let key = Self::host_key(scheme, host);
        let cached = self.inner.lock().get(&key).copied();
        if let Some(isolated) = cached {
            return isolated;
        }

        let isolated = probe_isolation(probe, scheme, host).await;
        self.inner.lock().insert(key, isolated);
        isolated
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

async fn probe_isolation<P>(probe: &P, scheme: &str, host: &str) -> bool
where
    P: PingProbe + ?Sized,
{
    let url = match ping_url(scheme, host) {
        Ok(url) => url,
        Err(e) => {
            warn!(scheme, host, error = %e, "cannot build subdomain isolation probe URL");
            return false;
        }
    };

    debug!(url = %loggable_url(&url), "probing subdomain isolation");
    match probe.ping(&url).await {
        Ok(status) => {
            let isolated = (200..300).contains(&status);
            debug!(host, status, isolated, "subdomain isolation probe answered");
            isolated
        }
        Err(e) => {
            warn!(host, error = %e, "subdomain isolation probe failed; assuming not isolated");
            false
        }
    }
}
