//! Per-transaction event trace
//!
//! Every grant transaction records its state-machine transitions as a
//! serializable trace. Timestamps are supplied by the caller from the
//! transaction start time, so traces stay deterministic under test.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Phase of the grant transaction state machine
///
/// A transaction moves through these phases exactly once; no phase is
/// re-entered. `SessionFailed`, `CommandFailed`, `Success` and
/// `ClosedWithWarning` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionPhase {
    /// No work started yet
    Idle,
    /// Opening the remote console session
    SessionOpening,
    /// The session could not be opened
    SessionFailed,
    /// Issuing the ordered command sequence
    IssuingCommands,
    /// A command failed to send or was not acknowledged
    CommandFailed,
    /// Every command in the sequence was acknowledged
    AllIssued,
    /// Closing the session
    SessionClosing,
    /// Clean completion
    Success,
    /// Completed, but the session did not close cleanly
    ClosedWithWarning,
}

/// Kind of event recorded in a transaction trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceEventKind {
    /// Transaction started
    TransactionStarted,
    /// Session open requested
    SessionOpening,
    /// Session opened and authenticated
    SessionOpened,
    /// Session open failed
    SessionOpenFailed,
    /// A command was sent and acknowledged
    CommandIssued,
    /// A command failed to send or was not acknowledged
    CommandRejected,
    /// Session close requested
    SessionClosing,
    /// Session closed cleanly
    SessionClosed,
    /// Session close failed; surfaced as a warning, never as a failure
    SessionCloseWarning,
    /// Transaction reached a successful terminal state
    TransactionSucceeded,
    /// Transaction reached a failed terminal state
    TransactionFailed,
}

/// A single event in a transaction trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Event timestamp, derived from the transaction start time
    pub timestamp: DateTime<Utc>,
    /// What happened
    pub kind: TraceEventKind,
    /// 1-based command step, when the event concerns a command
    pub step: Option<usize>,
    /// Human-readable detail, e.g. an error rendering
    pub detail: Option<String>,
}

/// Ordered record of everything one grant transaction did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionTrace {
    /// When the transaction started
    pub started_at: DateTime<Utc>,
    events: Vec<TraceEvent>,
}

impl TransactionTrace {
    /// Create an empty trace for a transaction starting at `started_at`
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            events: Vec::new(),
        }
    }

    /// Record an event
    pub fn record(&mut self, kind: TraceEventKind, step: Option<usize>, detail: Option<String>) {
        self.events.push(TraceEvent {
            timestamp: self.started_at,
            kind,
            step,
            detail,
        });
    }

    /// Get all recorded events in order
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Get the number of recorded events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check whether the trace is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Filter events by kind
    pub fn events_by_kind(&self, kind: TraceEventKind) -> Vec<&TraceEvent> {
        self.events.iter().filter(|e| e.kind == kind).collect()
    }

    /// Events concerning a specific 1-based command step
    pub fn events_by_step(&self, step: usize) -> Vec<&TraceEvent> {
        self.events.iter().filter(|e| e.step == Some(step)).collect()
    }
}
