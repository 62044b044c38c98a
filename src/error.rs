//! Error types for the RGTE

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrantError {
    #[error("Precondition error: {0}")]
    Precondition(#[from] PreconditionError),

    #[error("A grant transaction for player {player} is already in flight")]
    TransactionInProgress { player: String },

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("Unknown rank: {rank}")]
    UnknownRank { rank: String },

    #[error("Player identifier must not be empty")]
    MissingPlayer,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Rank already registered: {rank}")]
    AlreadyRegistered { rank: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Failed to connect to {endpoint}: {reason}")]
    ConnectFailed { endpoint: String, reason: String },

    #[error("Console authentication rejected")]
    AuthenticationFailed,

    #[error("Session operation timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("Malformed console response: {reason}")]
    Protocol { reason: String },

    #[error("Failed to close console session: {reason}")]
    CloseFailed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Failed to send command: {reason}")]
    SendFailed { reason: String },

    #[error("Command not acknowledged: expected request id {expected}, got {actual}")]
    NotAcknowledged { expected: i32, actual: i32 },

    #[error("Command timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("Command exceeds the {limit}-byte console limit ({len} bytes)")]
    Oversized { len: usize, limit: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("Requester acknowledgment failed: {reason}")]
    AcknowledgmentFailed { reason: String },

    #[error("Durable audit write failed: {reason}")]
    AuditWriteFailed { reason: String },
}
