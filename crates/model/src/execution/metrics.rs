use serde::{Deserialize, Serialize};

/// Point-in-time copy of the engine counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub records_read: u64,
    pub records_written: u64,
    pub chunks_flushed: u64,
    pub bytes_written: u64,
    pub failure_count: u64,
    pub retry_count: u64,
}
