//! Duplex transport wrapper that logs redacted traffic.
//!
//! `IoLogger` implements [`AsyncRead`] over the wrapped source and [`AsyncWrite`] over the wrapped
//! sink, so it can be handed to the MCP server as its transport. Bytes pass through unchanged.
//!
//! Closing:
//! - [`CloseHandle::close`] marks it closed from another task (e.g. a signal handler). Reads and
//!   writes parked on the wrapped streams are woken and observe the closed state.
//! - `shutdown()` on the logger marks it closed the same way, then shuts down the wrapped sink.
//!   The sink is shut down exactly once, whichever path closed the logger first.
//!
//! Once closed, reads fail with [`TransportClosed::EndOfStream`] and writes with
//! [`TransportClosed::ClosedPipe`], without reaching the wrapped streams.

use crate::error::TransportClosed;
use crate::redact::{self, Redactor};
use crate::sink::{Direction, LogRecord, LogSink};
use parking_lot::Mutex;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf, Stdin, Stdout};

#[derive(Debug, Default)]
struct CloseState {
    closed: bool,
    sink_shut_down: bool,
    read_waker: Option<Waker>,
    write_waker: Option<Waker>,
}

impl CloseState {
    /// Open -> Closed. Returns the parked wakers to wake once the lock is released, or `None`
    /// if already closed.
    fn close(&mut self) -> Option<[Option<Waker>; 2]> {
        if self.closed {
            return None;
        }
        self.closed = true;
        Some([self.read_waker.take(), self.write_waker.take()])
    }
}

fn wake_all(wakers: Option<[Option<Waker>; 2]>) {
    for waker in wakers.into_iter().flatten().flatten() {
        waker.wake();
    }
}

fn park(slot: &mut Option<Waker>, cx: &Context<'_>) {
    match slot {
        Some(w) if w.will_wake(cx.waker()) => {}
        _ => *slot = Some(cx.waker().clone()),
    }
}

pub struct IoLogger<R, W> {
    reader: R,
    writer: W,
    sink: Arc<dyn LogSink>,
    redactor: Option<Arc<Redactor>>,
    state: Arc<Mutex<CloseState>>,
}

impl<R, W> IoLogger<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Wrap `reader`/`writer`, logging to `sink` with the built-in redaction rules.
    pub fn new(reader: R, writer: W, sink: impl LogSink + 'static) -> Self {
        Self {
            reader,
            writer,
            sink: Arc::new(sink),
            redactor: None,
            state: Arc::default(),
        }
    }

    /// Use a custom rule set instead of the built-in one.
    #[must_use]
    pub fn with_redactor(mut self, redactor: Arc<Redactor>) -> Self {
        self.redactor = Some(redactor);
        self
    }

    #[must_use]
    pub fn close_handle(&self) -> CloseHandle {
        CloseHandle {
            state: Arc::clone(&self.state),
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }

    fn emit(&self, direction: Direction, data: &[u8]) {
        let payload = match &self.redactor {
            Some(r) => r.redact(data),
            None => redact::redact(data),
        };
        self.sink.record(&LogRecord {
            direction,
            payload: &payload,
        });
    }
}

impl IoLogger<Stdin, Stdout> {
    /// Wrap the process stdio.
    pub fn stdio(sink: impl LogSink + 'static) -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout(), sink)
    }
}

impl<R, W> AsyncRead for IoLogger<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.state.lock().closed {
            return Poll::Ready(Err(TransportClosed::EndOfStream.into()));
        }

        let before = buf.filled().len();
        let res = match Pin::new(&mut this.reader).poll_read(cx, buf) {
            Poll::Ready(res) => res,
            Poll::Pending => {
                // Re-checked under the lock so a close racing this poll cannot be missed.
                let mut state = this.state.lock();
                if state.closed {
                    return Poll::Ready(Err(TransportClosed::EndOfStream.into()));
                }
                park(&mut state.read_waker, cx);
                return Poll::Pending;
            }
        };
        if res.is_ok() {
            // A zero-byte read is the end-of-input signal, not traffic.
            let read = &buf.filled()[before..];
            if !read.is_empty() {
                this.emit(Direction::Read, read);
            }
        }
        Poll::Ready(res)
    }
}

impl<R, W> AsyncWrite for IoLogger<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        if this.state.lock().closed {
            return Poll::Ready(Err(TransportClosed::ClosedPipe.into()));
        }

        let res = match Pin::new(&mut this.writer).poll_write(cx, buf) {
            Poll::Ready(res) => res,
            Poll::Pending => {
                let mut state = this.state.lock();
                if state.closed {
                    return Poll::Ready(Err(TransportClosed::ClosedPipe.into()));
                }
                park(&mut state.write_waker, cx);
                return Poll::Pending;
            }
        };
        if let Ok(n) = res {
            this.emit(Direction::Write, &buf[..n.min(buf.len())]);
        }
        Poll::Ready(res)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.state.lock().closed {
            // Whatever is still buffered is flushed by the sink's shutdown.
            return Poll::Ready(Ok(()));
        }
        Pin::new(&mut this.writer).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        // Held across the sink's shutdown poll so concurrent closers see one transition.
        let mut state = this.state.lock();
        let wakers = state.close();
        let res = if state.sink_shut_down {
            Poll::Ready(Ok(()))
        } else {
            let res = Pin::new(&mut this.writer).poll_shutdown(cx);
            if res.is_ready() {
                state.sink_shut_down = true;
            }
            res
        };
        drop(state);
        wake_all(wakers);
        res
    }
}

/// Closes an [`IoLogger`] from outside the task that owns it.
#[derive(Debug, Clone)]
pub struct CloseHandle {
    state: Arc<Mutex<CloseState>>,
}

impl CloseHandle {
    /// Mark the logger closed and wake any read or write parked on the wrapped streams.
    /// Returns `true` if this call performed the transition.
    pub fn close(&self) -> bool {
        let wakers = self.state.lock().close();
        let transitioned = wakers.is_some();
        wake_all(wakers);
        transitioned
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}
