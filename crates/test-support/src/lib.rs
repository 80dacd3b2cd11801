use anyhow::Context as _;
use axum::Router;
use axum::http::{StatusCode, Uri};
use axum::routing::any;
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::process::Child;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

pub struct KillOnDrop(pub Child);

impl Drop for KillOnDrop {
    fn drop(&mut self) {
        let _ = self.0.kill();
    }
}

/// Loopback HTTP server answering every request with a fixed status, recording what it saw.
pub struct PingServer {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown: Option<oneshot::Sender<()>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub host: Option<String>,
    pub path: String,
}

impl PingServer {
    /// Bind `127.0.0.1:0` and serve `status` for every path.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the listener fails.
    pub async fn start(status: StatusCode) -> anyhow::Result<Self> {
        let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::default();
        let seen = Arc::clone(&requests);
        let handler = move |headers: axum::http::HeaderMap, uri: Uri| {
            let seen = Arc::clone(&seen);
            async move {
                let host = headers
                    .get(axum::http::header::HOST)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                seen.lock().push(RecordedRequest {
                    host,
                    path: uri.path().to_string(),
                });
                status
            }
        };

        let app = Router::new()
            .route("/", any(handler.clone()))
            .route("/{*path}", any(handler));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind ping server")?;
        let addr = listener.local_addr().context("ping server local_addr")?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });
        tokio::spawn(async move {
            let _ = server.await;
        });

        Ok(Self {
            addr,
            requests,
            shutdown: Some(shutdown_tx),
        })
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    #[must_use]
    pub fn hits(&self) -> usize {
        self.requests.lock().len()
    }
}

impl Drop for PingServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}
