//! Rank Grant Transaction Engine (RGTE)
//!
//! A library for transactional rank grants on remote game servers: issue the
//! ordered administrative command sequence over a remote console session,
//! decide the overall outcome under partial failure, and record consummated
//! grants as auditable invoice artifacts.

pub mod audit;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod invoice;
pub mod locks;
pub mod notifier;
pub mod orchestrator;
pub mod rcon;
pub mod trace;
pub mod traits;
pub mod types;

// Re-export core types and traits
pub use audit::{AuditRecord, RecordHash};
pub use catalog::StaticRankCatalog;
pub use commands::{command_sequence, CommandKind, GrantCommand};
pub use config::{ConsoleConfig, DEFAULT_CONSOLE_PORT};
pub use engine::{GrantEngine, GrantEngineBuilder, GrantReport};
pub use error::{
    CatalogError, CommandError, DeliveryError, GrantError, PreconditionError, SessionError,
};
pub use invoice::{render, RenderedInvoice};
pub use locks::{ContentionPolicy, PlayerLockGuard, PlayerLockRegistry};
pub use notifier::{DeliveryReport, DeliveryStatus, ResultNotifier};
pub use orchestrator::{GrantOrchestrator, GrantOrchestratorBuilder};
pub use rcon::{TcpConsoleClient, TcpConsoleSession};
pub use trace::{TraceEvent, TraceEventKind, TransactionPhase, TransactionTrace};
pub use traits::{AcknowledgmentChannel, AuditSink, ConsoleSession, RankCatalog, SessionFactory};
pub use types::{
    CommandOutcome, GrantOutcome, GrantRequest, Rank, RankDefinition, TransactionStatus,
};
