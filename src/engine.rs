//! Grant engine facade
//!
//! Wires the full data flow: orchestrate the remote transaction, build the
//! audit record on success, render the invoice, deliver. The audit record is
//! only constructed on the success arm, so a failed transaction can never
//! produce an artifact implying the grant occurred. The rendered invoice is
//! ephemeral: it exists for delivery and is dropped afterwards.

use chrono::{DateTime, Utc};

use crate::audit::AuditRecord;
use crate::error::GrantError;
use crate::invoice::render;
use crate::locks::ContentionPolicy;
use crate::notifier::{DeliveryReport, ResultNotifier};
use crate::orchestrator::GrantOrchestrator;
use crate::traits::{AcknowledgmentChannel, AuditSink, RankCatalog, SessionFactory};
use crate::types::{GrantOutcome, GrantRequest, TransactionStatus};

/// Everything one processed grant produced
#[derive(Debug)]
pub struct GrantReport {
    pub outcome: GrantOutcome,
    /// Present if and only if the transaction succeeded
    pub record: Option<AuditRecord>,
    pub delivery: DeliveryReport,
}

/// End-to-end grant processing facade
#[derive(Debug)]
pub struct GrantEngine<F, C, A, D>
where
    F: SessionFactory,
    C: RankCatalog,
    A: AcknowledgmentChannel,
    D: AuditSink,
{
    orchestrator: GrantOrchestrator<F, C>,
    notifier: ResultNotifier<A, D>,
}

impl<F, C, A, D> GrantEngine<F, C, A, D>
where
    F: SessionFactory,
    C: RankCatalog,
    A: AcknowledgmentChannel + Sync,
    D: AuditSink + Sync,
{
    /// Create a builder for constructing a grant engine
    pub fn builder() -> GrantEngineBuilder<F, C, A, D> {
        GrantEngineBuilder::new()
    }

    /// Process one grant request end to end
    ///
    /// `started_at` is the transaction start time; on success it becomes the
    /// audit record's assignment date.
    pub fn process(
        &self,
        request: GrantRequest,
        started_at: DateTime<Utc>,
    ) -> Result<GrantReport, GrantError> {
        let outcome = self.orchestrator.execute(request, started_at)?;

        match &outcome.status {
            TransactionStatus::Success { assigned_at, .. } => {
                let record =
                    AuditRecord::build(&outcome.request, &outcome.definition, *assigned_at);
                let invoice = render(&record);
                let delivery = self.notifier.deliver_success(&record, &invoice);
                Ok(GrantReport {
                    outcome,
                    record: Some(record),
                    delivery,
                })
            }
            _ => {
                let delivery = self.notifier.deliver_failure(&outcome);
                Ok(GrantReport {
                    outcome,
                    record: None,
                    delivery,
                })
            }
        }
    }
}

/// Builder for constructing grant engines with a fluent API
pub struct GrantEngineBuilder<F, C, A, D>
where
    F: SessionFactory,
    C: RankCatalog,
    A: AcknowledgmentChannel,
    D: AuditSink,
{
    factory: Option<F>,
    catalog: Option<C>,
    ack_channel: Option<A>,
    audit_sink: Option<D>,
    contention: ContentionPolicy,
}

impl<F, C, A, D> GrantEngineBuilder<F, C, A, D>
where
    F: SessionFactory,
    C: RankCatalog,
    A: AcknowledgmentChannel + Sync,
    D: AuditSink + Sync,
{
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            factory: None,
            catalog: None,
            ack_channel: None,
            audit_sink: None,
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

    /// Set the requester acknowledgment channel
    pub fn with_acknowledgment_channel(mut self, channel: A) -> Self {
        self.ack_channel = Some(channel);
        self
    }

    /// Set the durable audit sink
    pub fn with_audit_sink(mut self, sink: D) -> Self {
        self.audit_sink = Some(sink);
        self
    }

    /// Set the contention policy
    pub fn with_contention_policy(mut self, policy: ContentionPolicy) -> Self {
        self.contention = policy;
        self
    }

    /// Build the grant engine
    pub fn build(self) -> Result<GrantEngine<F, C, A, D>, String> {
        let factory = self.factory.ok_or("Session factory is required")?;
        let catalog = self.catalog.ok_or("Rank catalog is required")?;
        let ack_channel = self.ack_channel.ok_or("Acknowledgment channel is required")?;
        let audit_sink = self.audit_sink.ok_or("Audit sink is required")?;

        let orchestrator = GrantOrchestrator::builder()
            .with_factory(factory)
            .with_catalog(catalog)
            .with_contention_policy(self.contention)
            .build()?;

        Ok(GrantEngine {
            orchestrator,
            notifier: ResultNotifier::new(ack_channel, audit_sink),
        })
    }
}

impl<F, C, A, D> Default for GrantEngineBuilder<F, C, A, D>
where
    F: SessionFactory,
    C: RankCatalog,
    A: AcknowledgmentChannel + Sync,
    D: AuditSink + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}
