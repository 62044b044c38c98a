//! Audit record construction
//!
//! An audit record is derived deterministically from the grant parameters and
//! the transaction start time. It is only ever built for a successful
//! transaction; the engine has no audit path for failures.

use blake3::Hasher as Blake3Hasher;
use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{GrantRequest, Rank, RankDefinition};

/// Blake3 fingerprint of an audit record's business fields
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordHash(pub [u8; 32]);

impl fmt::Display for RecordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Durable summary of one consummated grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub player: String,
    pub rank: Rank,
    pub cash: u64,
    pub claim_blocks: u64,
    /// Assignment date, date-only precision
    pub assigned_on: NaiveDate,
    /// Exactly one calendar month after the assignment date
    pub expires_on: NaiveDate,
    /// Tamper-evidence fingerprint over the fields above
    pub record_hash: RecordHash,
}

impl AuditRecord {
    /// Build the record for a successful grant
    ///
    /// Pure function of its inputs: same request, definition and timestamp
    /// always produce the same record, fingerprint included.
    pub fn build(
        request: &GrantRequest,
        definition: &RankDefinition,
        assigned_at: DateTime<Utc>,
    ) -> Self {
        let assigned_on = assigned_at.date_naive();
        let expires_on = expiration_date(assigned_on);
        let record_hash = fingerprint(
            &request.player,
            request.rank,
            definition.cash,
            definition.claim_blocks,
            assigned_on,
            expires_on,
        );

        Self {
            player: request.player.clone(),
            rank: request.rank,
            cash: definition.cash,
            claim_blocks: definition.claim_blocks,
            assigned_on,
            expires_on,
            record_hash,
        }
    }
}

/// One calendar month after `assigned_on`
///
/// Month-end dates clamp to the last valid day of the target month
/// (Jan 31 -> Feb 28/29), so the expiry is always strictly after the
/// assignment date and never rolls into the month after next.
fn expiration_date(assigned_on: NaiveDate) -> NaiveDate {
    assigned_on
        .checked_add_months(Months::new(1))
        .expect("one-month expiry stays inside the representable date range")
}

fn fingerprint(
    player: &str,
    rank: Rank,
    cash: u64,
    claim_blocks: u64,
    assigned_on: NaiveDate,
    expires_on: NaiveDate,
) -> RecordHash {
    let encoded = bincode::serialize(&(player, rank, cash, claim_blocks, assigned_on, expires_on))
        .expect("record field serialization should never fail");

    let mut hasher = Blake3Hasher::new();
    hasher.update(&encoded);
    RecordHash(*hasher.finalize().as_bytes())
}
