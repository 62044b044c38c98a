//! Integration tests for result delivery
//!
//! The requester always receives exactly one acknowledgment; the durable
//! audit log receives a record if and only if the transaction succeeded, and
//! a failure at one destination never blocks the other.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rgte::{
    render, AcknowledgmentChannel, AuditRecord, AuditSink, CommandError, DeliveryError,
    DeliveryStatus, GrantOutcome, GrantRequest, Rank, RankDefinition, RenderedInvoice,
    ResultNotifier, TransactionStatus, TransactionTrace,
};

// ============================================================================
// Recording channel fixtures
// ============================================================================

#[derive(Debug, Clone, Default)]
struct RecordingAck {
    successes: Arc<Mutex<Vec<String>>>,
    failures: Arc<Mutex<Vec<Option<usize>>>>,
    fail: bool,
}

impl RecordingAck {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn success_count(&self) -> usize {
        self.successes.lock().unwrap().len()
    }

    fn failure_acks(&self) -> Vec<Option<usize>> {
        self.failures.lock().unwrap().clone()
    }
}

impl AcknowledgmentChannel for RecordingAck {
    fn acknowledge_success(
        &self,
        record: &AuditRecord,
        _invoice: &RenderedInvoice,
    ) -> Result<(), DeliveryError> {
        if self.fail {
            return Err(DeliveryError::AcknowledgmentFailed {
                reason: "requester channel closed".to_string(),
            });
        }
        self.successes.lock().unwrap().push(record.player.clone());
        Ok(())
    }

    fn acknowledge_failure(&self, outcome: &GrantOutcome) -> Result<(), DeliveryError> {
        if self.fail {
            return Err(DeliveryError::AcknowledgmentFailed {
                reason: "requester channel closed".to_string(),
            });
        }
        self.failures.lock().unwrap().push(outcome.failed_step());
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
struct RecordingSink {
    appended: Arc<Mutex<Vec<(String, String)>>>,
    attempts: Arc<AtomicUsize>,
    failures_remaining: Arc<AtomicUsize>,
}

impl RecordingSink {
    fn failing_times(n: usize) -> Self {
        Self {
            failures_remaining: Arc::new(AtomicUsize::new(n)),
            ..Self::default()
        }
    }

    fn appended(&self) -> Vec<(String, String)> {
        self.appended.lock().unwrap().clone()
    }

    fn attempt_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl AuditSink for RecordingSink {
    fn append(&self, record: &AuditRecord, invoice: &RenderedInvoice) -> Result<(), DeliveryError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(DeliveryError::AuditWriteFailed {
                reason: "log destination unavailable".to_string(),
            });
        }
        self.appended
            .lock()
            .unwrap()
            .push((record.player.clone(), invoice.file_name.clone()));
        Ok(())
    }
}

fn started_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 8, 12, 0, 0).unwrap()
}

fn sample_record() -> AuditRecord {
    AuditRecord::build(
        &GrantRequest::new("Alice", Rank::Vip),
        &RankDefinition::new(Rank::Vip, 5_000, 200),
        started_at(),
    )
}

fn failed_outcome() -> GrantOutcome {
    GrantOutcome {
        request: GrantRequest::new("Bob", Rank::MvpPlusPlus),
        definition: RankDefinition::new(Rank::MvpPlusPlus, 12_000, 800),
        status: TransactionStatus::CommandFailed {
            step: 2,
            line: "eco give Bob 12000".to_string(),
            cause: CommandError::SendFailed {
                reason: "broken pipe".to_string(),
            },
            close_warning: None,
        },
        issued: Vec::new(),
        trace: TransactionTrace::new(started_at()),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_success_reaches_both_destinations() {
    let notifier = ResultNotifier::new(RecordingAck::default(), RecordingSink::default());
    let record = sample_record();
    let invoice = render(&record);

    let report = notifier.deliver_success(&record, &invoice);

    assert!(report.is_complete());
    assert!(report.requester.is_delivered());
    assert!(report.audit_log.is_delivered());
}

#[test]
fn test_success_payload_contents() {
    let ack = RecordingAck::default();
    let sink = RecordingSink::default();
    let notifier = ResultNotifier::new(ack.clone(), sink.clone());
    let record = sample_record();
    let invoice = render(&record);

    notifier.deliver_success(&record, &invoice);

    assert_eq!(ack.success_count(), 1);
    assert_eq!(
        sink.appended(),
        vec![("Alice".to_string(), "Aliceinvoice.html".to_string())]
    );
}

#[test]
fn test_failure_never_touches_the_audit_log() {
    let ack = RecordingAck::default();
    let sink = RecordingSink::default();
    let notifier = ResultNotifier::new(ack.clone(), sink.clone());
    let outcome = failed_outcome();

    let report = notifier.deliver_failure(&outcome);

    assert!(report.requester.is_delivered());
    assert_eq!(report.audit_log, DeliveryStatus::Skipped);
    assert_eq!(sink.attempt_count(), 0);
    // Exactly one failure acknowledgment, naming the failed step
    assert_eq!(ack.failure_acks(), vec![Some(2)]);
}

#[test]
fn test_transient_audit_write_is_retried_once() {
    let ack = RecordingAck::default();
    let sink = RecordingSink::failing_times(1);
    let notifier = ResultNotifier::new(ack, sink.clone());
    let record = sample_record();
    let invoice = render(&record);

    let report = notifier.deliver_success(&record, &invoice);

    assert!(report.audit_log.is_delivered());
    assert_eq!(sink.attempt_count(), 2);
    assert_eq!(sink.appended().len(), 1);
}

#[test]
fn test_persistent_audit_failure_does_not_block_the_requester() {
    let ack = RecordingAck::default();
    let sink = RecordingSink::failing_times(2);
    let notifier = ResultNotifier::new(ack.clone(), sink.clone());
    let record = sample_record();
    let invoice = render(&record);

    let report = notifier.deliver_success(&record, &invoice);

    assert!(report.requester.is_delivered());
    assert!(matches!(report.audit_log, DeliveryStatus::Failed(_)));
    assert!(!report.is_complete());
    // One retry, then give up
    assert_eq!(sink.attempt_count(), 2);
    assert_eq!(ack.success_count(), 1);
}

#[test]
fn test_requester_failure_does_not_block_the_audit_log() {
    let ack = RecordingAck::failing();
    let sink = RecordingSink::default();
    let notifier = ResultNotifier::new(ack, sink.clone());
    let record = sample_record();
    let invoice = render(&record);

    let report = notifier.deliver_success(&record, &invoice);

    assert!(matches!(report.requester, DeliveryStatus::Failed(_)));
    assert!(report.audit_log.is_delivered());
    assert_eq!(sink.appended().len(), 1);
}
