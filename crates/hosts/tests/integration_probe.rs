use axum::http::StatusCode;
use ghmcp_hosts::api_host::HostKind;
use ghmcp_hosts::{ApiHost, ReqwestProbe, SubdomainIsolationCache};
use ghmcp_test_support::PingServer;
use std::net::SocketAddr;
use std::time::Duration;

/// Client that sends `raw.<host>` (and `<host>`) to the loopback server.
fn probe_for(host: &str, addr: SocketAddr) -> anyhow::Result<ReqwestProbe> {
    let client = reqwest::Client::builder()
        .resolve(&format!("raw.{host}"), addr)
        .resolve(host, addr)
        .timeout(Duration::from_secs(5))
        .no_proxy()
        .build()?;
    Ok(ReqwestProbe::new(client))
}

#[tokio::test]
async fn reachable_raw_subdomain_is_isolated_and_cached() -> anyhow::Result<()> {
    let server = PingServer::start(StatusCode::OK).await?;
    let probe = probe_for("ghes.test", server.addr)?;
    let host = format!("ghes.test:{}", server.port());
    let cache = SubdomainIsolationCache::new();

    assert!(cache.check(&probe, "http", &host).await);
    assert!(cache.check(&probe, "http", &host).await);
    assert!(cache.check(&probe, "http", &host).await);

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/_ping");
    assert_eq!(
        requests[0].host.as_deref(),
        Some(format!("raw.ghes.test:{}", server.port()).as_str())
    );
    Ok(())
}

#[tokio::test]
async fn error_status_is_not_isolated() -> anyhow::Result<()> {
    let server = PingServer::start(StatusCode::NOT_FOUND).await?;
    let probe = probe_for("ghes.test", server.addr)?;
    let host = format!("ghes.test:{}", server.port());
    let cache = SubdomainIsolationCache::new();

    assert!(!cache.check(&probe, "http", &host).await);
    assert!(!cache.check(&probe, "http", &host).await);
    assert_eq!(server.hits(), 1);
    Ok(())
}

#[tokio::test]
async fn connection_failure_collapses_to_false() -> anyhow::Result<()> {
    // Bind then drop to get a port nobody listens on.
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        listener.local_addr()?
    };
    let probe = probe_for("down.test", addr)?;
    let cache = SubdomainIsolationCache::new();

    let host = format!("down.test:{}", addr.port());
    assert!(!cache.check(&probe, "http", &host).await);
    assert_eq!(cache.get("http", &host), Some(false));
    Ok(())
}

#[tokio::test]
async fn two_hosts_issue_two_probes() -> anyhow::Result<()> {
    let server = PingServer::start(StatusCode::OK).await?;
    let client = reqwest::Client::builder()
        .resolve("raw.a.test", server.addr)
        .resolve("raw.b.test", server.addr)
        .no_proxy()
        .build()?;
    let probe = ReqwestProbe::new(client);
    let cache = SubdomainIsolationCache::new();
    let port = server.port();

    assert!(cache.check(&probe, "http", &format!("a.test:{port}")).await);
    assert!(cache.check(&probe, "http", &format!("b.test:{port}")).await);
    assert!(cache.check(&probe, "http", &format!("a.test:{port}")).await);
    assert_eq!(server.hits(), 2);
    Ok(())
}

#[tokio::test]
async fn enterprise_resolution_follows_probe() -> anyhow::Result<()> {
    let server = PingServer::start(StatusCode::OK).await?;
    let probe = probe_for("ghes.test", server.addr)?;
    let cache = SubdomainIsolationCache::new();
    let port = server.port();

    let api = ApiHost::resolve(&format!("http://ghes.test:{port}"), &cache, &probe).await?;
    assert_eq!(api.kind, HostKind::Enterprise);
    assert_eq!(api.raw.as_str(), format!("http://raw.ghes.test:{port}/"));
    assert_eq!(api.uploads.as_str(), format!("http://uploads.ghes.test:{port}/"));
    assert_eq!(api.rest.as_str(), format!("http://ghes.test:{port}/api/v3/"));
    assert_eq!(server.hits(), 1);
    Ok(())
}
