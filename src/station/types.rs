use serde::{Deserialize, Serialize};

use crate::station::log::LogEntry;

/// Load state of the workcenter context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContextStatus {
    /// No load attempted yet.
    Idle,
    /// A refresh is in flight.
    Loading,
    /// Context is loaded and scanning may be enabled.
    Loaded,
    /// The last refresh failed; prior values are kept but stale.
    Error,
}

/// Busy flag guarding scan entry.
///
/// `Loading` blocks new scans while a prior scan's commit step (or a context
/// refresh) is outstanding; at most one operation is in flight per station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanStatus {
    /// Scanning disabled (context not loaded).
    Idle,
    /// An operation is in flight.
    Loading,
    /// Ready to accept the next scan.
    Ready,
}

/// Terminal outcome of a scan or station command. Produced once per
/// operation, never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Accepted { message: String },
    Rejected { reason: String },
}

impl ScanOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ScanOutcome::Accepted { .. })
    }
}

/// Events the session pushes to the UI layer.
#[derive(Debug, Clone)]
pub enum StationEvent {
    ContextStatus(ContextStatus),
    ScanStatus(ScanStatus),
    Log(LogEntry),
    LogCleared,
    /// Current accumulator membership, in insertion order.
    Members(Vec<String>),
}
