//! Command transaction orchestration
//!
//! `GrantOrchestrator::execute` runs the grant state machine exactly once per
//! transaction: resolve the rank, take the player's exclusion token, open a
//! session, issue the ordered commands fail-stop, close the session on every
//! path, and report a typed outcome. Transport errors never escape as raw
//! errors; they become the outcome's terminal status.

use chrono::{DateTime, Utc};

use crate::commands::{command_sequence, GrantCommand};
use crate::error::{CommandError, GrantError, PreconditionError};
use crate::locks::{ContentionPolicy, PlayerLockRegistry};
use crate::trace::{TraceEventKind, TransactionTrace};
use crate::traits::{ConsoleSession, RankCatalog, SessionFactory};
use crate::types::{CommandOutcome, GrantOutcome, GrantRequest, TransactionStatus};

/// Orchestrator for grant transactions
///
/// Owns the per-player lock registry; safe to share across threads and run
/// concurrent transactions for distinct players.
#[derive(Debug)]
pub struct GrantOrchestrator<F, C>
where
    F: SessionFactory,
    C: RankCatalog,
{
    factory: F,
    catalog: C,
    contention: ContentionPolicy,
    locks: PlayerLockRegistry,
}

impl<F, C> GrantOrchestrator<F, C>
where
    F: SessionFactory,
    C: RankCatalog,
{
    /// Create an orchestrator with the default contention policy
    pub fn new(factory: F, catalog: C) -> Self {
        Self {
            factory,
            catalog,
            contention: ContentionPolicy::default(),
            locks: PlayerLockRegistry::new(),
        }
    }

    /// Create a builder for constructing an orchestrator
    pub fn builder() -> GrantOrchestratorBuilder<F, C> {
        GrantOrchestratorBuilder::new()
    }

    /// The contention policy in effect
    pub fn contention_policy(&self) -> ContentionPolicy {
        self.contention
    }

    /// Execute one grant transaction
    ///
    /// `started_at` is the transaction start time supplied by the caller; the
    /// audit assignment date and every trace timestamp derive from it.
    ///
    /// Returns `Err` only for precondition violations and contention
    /// rejections, both raised before any remote interaction. Session and
    /// command failures are reported inside the returned outcome.
    pub fn execute(
        &self,
        request: GrantRequest,
        started_at: DateTime<Utc>,
    ) -> Result<GrantOutcome, GrantError> {
        request.validate()?;
        let definition = self
            .catalog
            .lookup(request.rank)
            .ok_or_else(|| PreconditionError::UnknownRank {
                rank: request.rank.to_string(),
            })?
            .clone();

        // Held until this transaction reaches a terminal state
        let _token = match self.contention {
            ContentionPolicy::Reject => self.locks.try_acquire(&request.player).ok_or_else(|| {
                GrantError::TransactionInProgress {
                    player: request.player.clone(),
                }
            })?,
            ContentionPolicy::Wait => self.locks.acquire(&request.player),
        };

        let mut trace = TransactionTrace::new(started_at);
        trace.record(TraceEventKind::TransactionStarted, None, None);

        trace.record(TraceEventKind::SessionOpening, None, None);
        let mut session = match self.factory.open() {
            Ok(session) => session,
            Err(cause) => {
                trace.record(
                    TraceEventKind::SessionOpenFailed,
                    None,
                    Some(cause.to_string()),
                );
                trace.record(TraceEventKind::TransactionFailed, None, None);
                return Ok(GrantOutcome {
                    request,
                    definition,
                    status: TransactionStatus::SessionFailed { cause },
                    issued: Vec::new(),
                    trace,
                });
            }
        };
        trace.record(TraceEventKind::SessionOpened, None, None);

        let plan = command_sequence(&request, &definition);
        let mut issued = Vec::with_capacity(plan.len());
        let mut failed: Option<(GrantCommand, CommandError)> = None;

        for command in plan {
            match session.send(&command.line) {
                Ok(response) => {
                    trace.record(TraceEventKind::CommandIssued, Some(command.step), None);
                    issued.push(CommandOutcome {
                        step: command.step,
                        line: command.line,
                        response: if response.is_empty() {
                            None
                        } else {
                            Some(response)
                        },
                    });
                }
                Err(cause) => {
                    trace.record(
                        TraceEventKind::CommandRejected,
                        Some(command.step),
                        Some(cause.to_string()),
                    );
                    failed = Some((command, cause));
                    break;
                }
            }
        }

        // The session closes on every path, failed commands included
        trace.record(TraceEventKind::SessionClosing, None, None);
        let close_warning = match session.close() {
            Ok(()) => {
                trace.record(TraceEventKind::SessionClosed, None, None);
                None
            }
            Err(warning) => {
                trace.record(
                    TraceEventKind::SessionCloseWarning,
                    None,
                    Some(warning.to_string()),
                );
                Some(warning.to_string())
            }
        };

        let status = match failed {
            Some((command, cause)) => {
                trace.record(TraceEventKind::TransactionFailed, Some(command.step), None);
                TransactionStatus::CommandFailed {
                    step: command.step,
                    line: command.line,
                    cause,
                    close_warning,
                }
            }
            None => {
                trace.record(TraceEventKind::TransactionSucceeded, None, None);
                TransactionStatus::Success {
                    assigned_at: started_at,
                    close_warning,
                }
            }
        };

        Ok(GrantOutcome {
            request,
            definition,
            status,
            issued,
            trace,
        })
    }
}

/// Builder for constructing grant orchestrators with a fluent API
pub struct GrantOrchestratorBuilder<F, C>
where
    F: SessionFactory,
    C: RankCatalog,
{
    factory: Option<F>,
    catalog: Option<C>,
    contention: ContentionPolicy,
}

impl<F, C> GrantOrchestratorBuilder<F, C>
where
    F: SessionFactory,
    C: RankCatalog,
{
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            factory: None,
            catalog: None,
            contention: ContentionPolicy::default(),
        }
    }

    /// Set the session factory
    pub fn with_factory(mut self, factory: F) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Set the rank catalog
    pub fn with_catalog(mut self, catalog: C) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Set the contention policy
    pub fn with_contention_policy(mut self, policy: ContentionPolicy) -> Self {
        self.contention = policy;
        self
    }

    /// Build the orchestrator
    pub fn build(self) -> Result<GrantOrchestrator<F, C>, String> {
        let factory = self.factory.ok_or("Session factory is required")?;
        let catalog = self.catalog.ok_or("Rank catalog is required")?;

        Ok(GrantOrchestrator {
            factory,
            catalog,
            contention: self.contention,
            locks: PlayerLockRegistry::new(),
        })
    }
}

impl<F, C> Default for GrantOrchestratorBuilder<F, C>
where
    F: SessionFactory,
    C: RankCatalog,
{
    fn default() -> Self {
        Self::new()
    }
}
