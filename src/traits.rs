//! Core traits for the RGTE
//!
//! These are the injection seams: the catalog, the remote console session,
//! and the two delivery destinations are all external collaborators the
//! orchestration core only knows through these contracts.

use crate::audit::AuditRecord;
use crate::error::{CommandError, DeliveryError, SessionError};
use crate::invoice::RenderedInvoice;
use crate::types::{GrantOutcome, Rank, RankDefinition};

/// Trait for rank catalogs
///
/// Fixed at startup; there is no mutation operation in the transaction path.
/// A miss is a caller precondition violation, signaled before any remote
/// session is opened.
pub trait RankCatalog {
    /// Resolve a rank to its grant attributes
    fn lookup(&self, rank: Rank) -> Option<&RankDefinition>;
}

/// Trait for an open remote console session
///
/// A session is a single-use resource: one transaction owns it exclusively,
/// issues its commands strictly in sequence, and closes it on every exit
/// path. Sessions are never reused across transactions.
pub trait ConsoleSession {
    /// Send one command line and wait for its acknowledgment
    ///
    /// Returns the console's response text, which may be empty. The send is
    /// bounded by the configured command timeout.
    fn send(&mut self, command: &str) -> Result<String, CommandError>;

    /// Close the session
    ///
    /// A close failure is surfaced to the orchestrator as a warning; it never
    /// turns an otherwise-successful transaction into a failure.
    fn close(self) -> Result<(), SessionError>
    where
        Self: Sized;
}

/// Trait for factories that open remote console sessions
///
/// Connection endpoint and credentials live behind the factory, never in the
/// orchestrator.
pub trait SessionFactory {
    type Session: ConsoleSession;

    /// Open and authenticate a new session, bounded by the connect timeout
    fn open(&self) -> Result<Self::Session, SessionError>;
}

/// Trait for the requester acknowledgment channel
///
/// The requester receives exactly one acknowledgment per transaction: either
/// a success carrying the rendered record, or a failure with the reason.
pub trait AcknowledgmentChannel {
    /// Acknowledge a consummated grant, attaching the rendered invoice
    fn acknowledge_success(
        &self,
        record: &AuditRecord,
        invoice: &RenderedInvoice,
    ) -> Result<(), DeliveryError>;

    /// Acknowledge a failed transaction with its outcome
    fn acknowledge_failure(&self, outcome: &GrantOutcome) -> Result<(), DeliveryError>;
}

/// Trait for the durable audit destination
///
/// Receives a record if and only if the transaction succeeded; the audit
/// trail never contains unconsummated grants.
pub trait AuditSink {
    /// Append a record and its rendered invoice to the durable log
    fn append(&self, record: &AuditRecord, invoice: &RenderedInvoice) -> Result<(), DeliveryError>;
}
