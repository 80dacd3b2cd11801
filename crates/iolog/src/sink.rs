//! Log sink boundary for transport traffic.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Read,
    Write,
}

impl Direction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One intercepted read or write. `payload` is already redacted.
#[derive(Debug, Clone, Copy)]
pub struct LogRecord<'a> {
    pub direction: Direction,
    pub payload: &'a [u8],
}

impl LogRecord<'_> {
    #[must_use]
    pub fn to_owned_record(&self) -> OwnedLogRecord {
        OwnedLogRecord {
            direction: self.direction,
            payload: self.payload.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedLogRecord {
    pub direction: Direction,
    pub payload: Vec<u8>,
}

impl OwnedLogRecord {
    #[must_use]
    pub fn payload_lossy(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

/// Destination for log records. Called synchronously from the read/write path, so
/// implementations must not block.
pub trait LogSink: Send + Sync {
    fn record(&self, record: &LogRecord<'_>);
}

impl<F> LogSink for F
where
    F: Fn(&LogRecord<'_>) + Send + Sync,
{
    fn record(&self, record: &LogRecord<'_>) {
        self(record);
    }
}

/// Emits one INFO `tracing` event per record.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn record(&self, record: &LogRecord<'_>) {
        let payload = String::from_utf8_lossy(record.payload);
        match record.direction {
            Direction::Read => tracing::info!(
                direction = %record.direction,
                count = record.payload.len(),
                payload = %payload,
                "[stdin]: received bytes"
            ),
            Direction::Write => tracing::info!(
                direction = %record.direction,
                count = record.payload.len(),
                payload = %payload,
                "[stdout]: sending bytes"
            ),
        }
    }
}

/// Collects records in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<OwnedLogRecord>>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn records(&self) -> Vec<OwnedLogRecord> {
        self.records.lock().clone()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }

    /// All logged payloads, lossily decoded and concatenated.
    #[must_use]
    pub fn text(&self) -> String {
        self.records
            .lock()
            .iter()
            .map(OwnedLogRecord::payload_lossy)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn record(&self, record: &LogRecord<'_>) {
        self.records.lock().push(record.to_owned_record());
    }
}
