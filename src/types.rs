//! Core data types for the RGTE

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CommandError, PreconditionError, SessionError};
use crate::trace::{TransactionPhase, TransactionTrace};

/// A privileged membership tier
///
/// The wire names are the catalog keys the remote server knows:
/// `vip`, `mvp`, `mvp++`, `immortal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    #[serde(rename = "vip")]
    Vip,
    #[serde(rename = "mvp")]
    Mvp,
    #[serde(rename = "mvp++")]
    MvpPlusPlus,
    #[serde(rename = "immortal")]
    Immortal,
}

impl Rank {
    /// Every rank, in ascending tier order
    pub const ALL: [Rank; 4] = [Rank::Vip, Rank::Mvp, Rank::MvpPlusPlus, Rank::Immortal];

    /// The wire name of this rank
    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Vip => "vip",
            Rank::Mvp => "mvp",
            Rank::MvpPlusPlus => "mvp++",
            Rank::Immortal => "immortal",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rank {
    type Err = PreconditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vip" => Ok(Rank::Vip),
            "mvp" => Ok(Rank::Mvp),
            "mvp++" => Ok(Rank::MvpPlusPlus),
            "immortal" => Ok(Rank::Immortal),
            other => Err(PreconditionError::UnknownRank {
                rank: other.to_string(),
            }),
        }
    }
}

/// Grant attributes bundled with a rank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankDefinition {
    pub rank: Rank,
    /// In-game currency granted alongside the rank
    pub cash: u64,
    /// Land-ownership allotment granted alongside the rank
    pub claim_blocks: u64,
}

impl RankDefinition {
    /// Create a new rank definition
    pub fn new(rank: Rank, cash: u64, claim_blocks: u64) -> Self {
        Self {
            rank,
            cash,
            claim_blocks,
        }
    }
}

/// One request to grant a rank to a player
///
/// The player identifier is externally supplied and is not checked against a
/// live player registry. Authorization is the intake layer's concern and has
/// already happened by the time a request reaches the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRequest {
    pub player: String,
    pub rank: Rank,
}

impl GrantRequest {
    /// Create a new grant request
    pub fn new(player: impl Into<String>, rank: Rank) -> Self {
        Self {
            player: player.into(),
            rank,
        }
    }

    /// Validate the request's local preconditions
    pub fn validate(&self) -> Result<(), PreconditionError> {
        if self.player.trim().is_empty() {
            return Err(PreconditionError::MissingPlayer);
        }
        Ok(())
    }
}

/// Outcome of one acknowledged remote command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutcome {
    /// 1-based position in the command sequence
    pub step: usize,
    /// The command line that was sent
    pub line: String,
    /// Response text returned by the console, when non-empty
    pub response: Option<String>,
}

/// Terminal status of a grant transaction
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionStatus {
    /// Every command was acknowledged. `close_warning` carries the close
    /// failure rendering when the session did not shut down cleanly; the
    /// grant itself still stands.
    Success {
        assigned_at: DateTime<Utc>,
        close_warning: Option<String>,
    },
    /// The session could not be opened; no commands were issued
    SessionFailed { cause: SessionError },
    /// A command failed; commands after `step` were never issued and
    /// commands before it are not rolled back
    CommandFailed {
        step: usize,
        line: String,
        cause: CommandError,
        close_warning: Option<String>,
    },
}

/// The complete result of one grant transaction
#[derive(Debug, Clone, PartialEq)]
pub struct GrantOutcome {
    pub request: GrantRequest,
    /// Attributes resolved from the catalog before the session opened
    pub definition: RankDefinition,
    pub status: TransactionStatus,
    /// Per-command outcomes for every acknowledged command, in issue order
    pub issued: Vec<CommandOutcome>,
    pub trace: TransactionTrace,
}

impl GrantOutcome {
    /// Whether the grant was consummated
    pub fn is_success(&self) -> bool {
        matches!(self.status, TransactionStatus::Success { .. })
    }

    /// The 1-based step that failed, for command failures
    pub fn failed_step(&self) -> Option<usize> {
        match &self.status {
            TransactionStatus::CommandFailed { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// The close warning, when the session did not shut down cleanly
    pub fn close_warning(&self) -> Option<&str> {
        match &self.status {
            TransactionStatus::Success { close_warning, .. }
            | TransactionStatus::CommandFailed { close_warning, .. } => close_warning.as_deref(),
            TransactionStatus::SessionFailed { .. } => None,
        }
    }

    /// Terminal phase of the transaction state machine
    pub fn terminal_phase(&self) -> TransactionPhase {
        match &self.status {
            TransactionStatus::Success {
                close_warning: None,
                ..
            } => TransactionPhase::Success,
            TransactionStatus::Success {
                close_warning: Some(_),
                ..
            } => TransactionPhase::ClosedWithWarning,
            TransactionStatus::SessionFailed { .. } => TransactionPhase::SessionFailed,
            TransactionStatus::CommandFailed { .. } => TransactionPhase::CommandFailed,
        }
    }
}
