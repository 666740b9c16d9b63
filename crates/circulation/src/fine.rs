//! Due-date and overdue-fine arithmetic.
//!
//! Pure functions over explicit instants; callers supply `now` through the
//! injected clock so the same inputs always produce the same fine.

use chrono::{DateTime, Duration, Utc};

/// Default loan period when the caller does not specify one.
pub const DEFAULT_LOAN_DAYS: i64 = 14;

/// Default fine per overdue day, in smallest currency unit (0.50/day).
pub const DEFAULT_DAILY_RATE_CENTS: u64 = 50;

/// Due date for a loan starting at `borrow_date` and lasting `days`.
pub fn due_date(borrow_date: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    borrow_date + Duration::days(days)
}

/// Fine owed for a copy due at `due_date` and returned at `return_date`.
///
/// Zero when on time. Otherwise whole overdue days (fractional remainder
/// truncated, not rounded) times the daily rate.
pub fn fine_cents(
    due_date: DateTime<Utc>,
    return_date: DateTime<Utc>,
    daily_rate_cents: u64,
) -> u64 {
    if return_date <= due_date {
        return 0;
    }
    let whole_days = (return_date - due_date).num_days() as u64;
    // The daily rate is operator-configurable; saturate rather than wrap so
    // the fine stays monotone even under a pathological rate.
    whole_days.saturating_mul(daily_rate_cents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + Duration::days(n)
    }

    #[test]
    fn due_date_adds_whole_days() {
        assert_eq!(due_date(day(0), 14), day(14));
        assert_eq!(due_date(day(0), 1), day(1));
    }

    #[test]
    fn on_time_return_owes_nothing() {
        assert_eq!(fine_cents(day(14), day(10), DEFAULT_DAILY_RATE_CENTS), 0);
        assert_eq!(fine_cents(day(14), day(14), DEFAULT_DAILY_RATE_CENTS), 0);
    }

    #[test]
    fn six_days_late_at_default_rate_is_three_units() {
        // 6 * 0.50 = 3.00
        assert_eq!(fine_cents(day(14), day(20), DEFAULT_DAILY_RATE_CENTS), 300);
    }

    #[test]
    fn fractional_day_truncates() {
        let due = day(14);
        let late_by_36_hours = due + Duration::hours(36);
        assert_eq!(fine_cents(due, late_by_36_hours, DEFAULT_DAILY_RATE_CENTS), 50);

        let late_by_23_hours = due + Duration::hours(23);
        assert_eq!(fine_cents(due, late_by_23_hours, DEFAULT_DAILY_RATE_CENTS), 0);
    }

    #[test]
    fn extreme_daily_rate_saturates_instead_of_wrapping() {
        let due = day(14);
        let very_late = due + Duration::days(365);
        assert_eq!(fine_cents(due, very_late, u64::MAX), u64::MAX);
        // Still monotone: later return can never owe less.
        assert!(
            fine_cents(due, very_late + Duration::days(1), u64::MAX)
                >= fine_cents(due, very_late, u64::MAX)
        );
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: the fine never decreases as the return slips later.
            #[test]
            fn fine_is_monotone_in_return_date(
                late_hours_a in 0i64..24 * 400,
                extra_hours in 0i64..24 * 100,
                rate in 1u64..10_000,
            ) {
                let due = day(14);
                let earlier = due + Duration::hours(late_hours_a);
                let later = earlier + Duration::hours(extra_hours);
                prop_assert!(fine_cents(due, earlier, rate) <= fine_cents(due, later, rate));
            }

            /// Property: the fine is always a whole multiple of the daily rate.
            #[test]
            fn fine_is_multiple_of_rate(
                late_hours in 0i64..24 * 400,
                rate in 1u64..10_000,
            ) {
                let due = day(14);
                let returned = due + Duration::hours(late_hours);
                prop_assert_eq!(fine_cents(due, returned, rate) % rate, 0);
            }
        }
    }
}
