//! Integration tests for audit record construction
//!
//! The expiration date is exactly one calendar month after the assignment
//! date, with month-end dates clamped rather than rolled into the month
//! after next.

use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;

use rgte::{AuditRecord, GrantRequest, Rank, RankDefinition};

fn record_on(year: i32, month: u32, day: u32) -> AuditRecord {
    let assigned_at = Utc
        .with_ymd_and_hms(year, month, day, 12, 0, 0)
        .unwrap();
    AuditRecord::build(
        &GrantRequest::new("Alice", Rank::Vip),
        &RankDefinition::new(Rank::Vip, 5_000, 200),
        assigned_at,
    )
}

#[test]
fn test_plain_one_month_expiry() {
    let record = record_on(2026, 8, 8);
    assert_eq!(record.assigned_on, NaiveDate::from_ymd_opt(2026, 8, 8).unwrap());
    assert_eq!(record.expires_on, NaiveDate::from_ymd_opt(2026, 9, 8).unwrap());
}

#[test]
fn test_month_end_expiry_clamps() {
    // 31-day month into 28-day month
    assert_eq!(
        record_on(2026, 1, 31).expires_on,
        NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()
    );
    // Leap year
    assert_eq!(
        record_on(2024, 1, 31).expires_on,
        NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
    );
    // 31-day month into 30-day month
    assert_eq!(
        record_on(2026, 3, 31).expires_on,
        NaiveDate::from_ymd_opt(2026, 4, 30).unwrap()
    );
    assert_eq!(
        record_on(2026, 8, 31).expires_on,
        NaiveDate::from_ymd_opt(2026, 9, 30).unwrap()
    );
}

#[test]
fn test_year_rollover_expiry() {
    assert_eq!(
        record_on(2026, 12, 15).expires_on,
        NaiveDate::from_ymd_opt(2027, 1, 15).unwrap()
    );
}

#[test]
fn test_record_carries_the_grant_attributes() {
    let record = record_on(2026, 8, 8);
    assert_eq!(record.player, "Alice");
    assert_eq!(record.rank, Rank::Vip);
    assert_eq!(record.cash, 5_000);
    assert_eq!(record.claim_blocks, 200);
}

fn arbitrary_date() -> impl Strategy<Value = NaiveDate> {
    (1990i32..2100, 1u32..=12, 1u32..=31)
        .prop_filter_map("valid calendar date", |(y, m, d)| {
            NaiveDate::from_ymd_opt(y, m, d)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_expiry_is_strictly_one_calendar_month_out(date in arbitrary_date()) {
        let record = record_on(date.year(), date.month(), date.day());

        prop_assert!(record.expires_on > record.assigned_on);

        let gap = (record.expires_on - record.assigned_on).num_days();
        prop_assert!((28..=31).contains(&gap));

        let expected_month = if date.month() == 12 { 1 } else { date.month() + 1 };
        let expected_year = if date.month() == 12 { date.year() + 1 } else { date.year() };
        prop_assert_eq!(record.expires_on.month(), expected_month);
        prop_assert_eq!(record.expires_on.year(), expected_year);

        // Clamping never advances the day-of-month
        prop_assert!(record.expires_on.day() <= date.day());
    }

    #[test]
    fn prop_fingerprint_distinguishes_players(
        date in arbitrary_date(),
        player_a in "[A-Za-z0-9_]{1,16}",
        player_b in "[A-Za-z0-9_]{1,16}",
    ) {
        prop_assume!(player_a != player_b);

        let assigned_at = Utc
            .with_ymd_and_hms(date.year(), date.month(), date.day(), 12, 0, 0)
            .unwrap();
        let definition = RankDefinition::new(Rank::Mvp, 8_000, 500);

        let a = AuditRecord::build(&GrantRequest::new(player_a, Rank::Mvp), &definition, assigned_at);
        let b = AuditRecord::build(&GrantRequest::new(player_b, Rank::Mvp), &definition, assigned_at);
        prop_assert_ne!(a.record_hash, b.record_hash);
    }

    #[test]
    fn prop_build_is_deterministic(date in arbitrary_date()) {
        let a = record_on(date.year(), date.month(), date.day());
        let b = record_on(date.year(), date.month(), date.day());
        prop_assert_eq!(a, b);
    }
}
