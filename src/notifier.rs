//! Result delivery
//!
//! A successful grant fans out to two independent destinations: the
//! requester acknowledgment and the durable audit log. The destinations are
//! order-insensitive, delivered concurrently, and a failure in one never
//! blocks or fails the other. A failed transaction is acknowledged to the
//! requester only; the audit trail contains consummated grants exclusively.
//! Delivery failures never roll back the completed remote grant.

use crate::audit::AuditRecord;
use crate::error::DeliveryError;
use crate::invoice::RenderedInvoice;
use crate::traits::{AcknowledgmentChannel, AuditSink};
use crate::types::GrantOutcome;

/// Delivery result for one destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Delivered,
    Failed(DeliveryError),
    /// The destination was not addressed for this outcome
    Skipped,
}

impl DeliveryStatus {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryStatus::Delivered)
    }
}

impl From<Result<(), DeliveryError>> for DeliveryStatus {
    fn from(result: Result<(), DeliveryError>) -> Self {
        match result {
            Ok(()) => DeliveryStatus::Delivered,
            Err(e) => DeliveryStatus::Failed(e),
        }
    }
}

/// Per-destination report for one transaction's delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub requester: DeliveryStatus,
    pub audit_log: DeliveryStatus,
}

impl DeliveryReport {
    /// Whether every addressed destination was delivered
    pub fn is_complete(&self) -> bool {
        !matches!(self.requester, DeliveryStatus::Failed(_))
            && !matches!(self.audit_log, DeliveryStatus::Failed(_))
    }
}

/// Delivers outcomes to the requester and the durable audit log
#[derive(Debug)]
pub struct ResultNotifier<A, D>
where
    A: AcknowledgmentChannel,
    D: AuditSink,
{
    ack_channel: A,
    audit_sink: D,
}

impl<A, D> ResultNotifier<A, D>
where
    A: AcknowledgmentChannel + Sync,
    D: AuditSink + Sync,
{
    /// Create a notifier over the two destinations
    pub fn new(ack_channel: A, audit_sink: D) -> Self {
        Self {
            ack_channel,
            audit_sink,
        }
    }

    /// Deliver a consummated grant to both destinations
    ///
    /// The durable write gets at most one retry; the requester acknowledgment
    /// does not (the requester can be told the same thing only once).
    pub fn deliver_success(
        &self,
        record: &AuditRecord,
        invoice: &RenderedInvoice,
    ) -> DeliveryReport {
        let (requester, audit_log) = rayon::join(
            || self.ack_channel.acknowledge_success(record, invoice),
            || {
                self.audit_sink
                    .append(record, invoice)
                    .or_else(|_| self.audit_sink.append(record, invoice))
            },
        );

        DeliveryReport {
            requester: requester.into(),
            audit_log: audit_log.into(),
        }
    }

    /// Acknowledge a failed transaction to the requester only
    pub fn deliver_failure(&self, outcome: &GrantOutcome) -> DeliveryReport {
        DeliveryReport {
            requester: self.ack_channel.acknowledge_failure(outcome).into(),
            audit_log: DeliveryStatus::Skipped,
        }
    }
}
