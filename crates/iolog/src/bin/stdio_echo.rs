//! Minimal stdio JSON-RPC echo server used only for integration tests.
//!
//! Wraps process stdio in `IoLogger` when command logging is enabled, so tests can observe the
//! forwarded bytes on stdout and the redacted traffic in the log destination.

use ghmcp_iolog::{IoLogger, StdioLogConfig, TracingSink, is_end_of_stream, telemetry};
use serde_json::json;
use tokio::io::{AsyncBufReadExt as _, AsyncRead, AsyncWrite, AsyncWriteExt as _, BufReader};

fn main() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    let res = runtime.block_on(run());
    // Stdin reads run on a blocking thread that cannot be cancelled; don't wait for it.
    runtime.shutdown_background();
    res
}

async fn run() -> anyhow::Result<()> {
    let cfg = StdioLogConfig::from_env()?;
    telemetry::init_tracing(&cfg)?;
    // Registered before any traffic is served, so an early SIGINT is not lost.
    let interrupted = interrupt()?;

    if cfg.enable_command_logging {
        let logger = IoLogger::stdio(TracingSink);
        let handle = logger.close_handle();
        tokio::spawn(async move {
            interrupted.await;
            tracing::info!("shutdown signal received, closing transport");
            handle.close();
        });
        let (reader, writer) = tokio::io::split(logger);
        serve(reader, writer).await
    } else {
        tokio::select! {
            res = serve(tokio::io::stdin(), tokio::io::stdout()) => res,
            () = interrupted => {
                tracing::info!("shutdown signal received, exiting");
                Ok(())
            }
        }
    }
}

#[cfg(unix)]
fn interrupt() -> std::io::Result<impl Future<Output = ()>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    Ok(async move {
        sigint.recv().await;
    })
}

#[cfg(not(unix))]
fn interrupt() -> std::io::Result<impl Future<Output = ()>> {
    Ok(async {
        let _ = tokio::signal::ctrl_c().await;
    })
}

async fn serve<R, W>(reader: R, mut writer: W) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) if is_end_of_stream(&e) => break,
            Err(e) => return Err(e.into()),
        };
        let Some(resp) = handle_line(&line) else {
            continue;
        };
        let mut out = serde_json::to_vec(&resp)?;
        out.push(b'\n');
        writer.write_all(&out).await?;
        writer.flush().await?;
    }

    writer.shutdown().await?;
    Ok(())
}

fn handle_line(line: &str) -> Option<serde_json::Value> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let msg: serde_json::Value = serde_json::from_str(line).ok()?;
    // Ignore notifications (no `id`).
    let id = msg.get("id")?.clone();
    let params = msg.get("params").cloned().unwrap_or(serde_json::Value::Null);

    Some(json!({ "jsonrpc": "2.0", "id": id, "result": { "echo": params } }))
}
