use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use libris_core::{BookId, BorrowId, DomainError, DomainResult, Entity, MemberId};

use crate::fine;

/// Loans must run at least a day and at most a year.
pub const MIN_LOAN_DAYS: i64 = 1;
pub const MAX_LOAN_DAYS: i64 = 365;

/// Legacy wire status of a borrow record.
///
/// The original data model used this single enum for the whole lifecycle,
/// overloading `Overdue` to mean both "still out and past due" and
/// "returned late with the fine outstanding". Internally the record keeps
/// orthogonal `returned`/`lost`/`overdue`/`fine_paid` flags and only
/// projects onto this enum at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorrowStatus {
    Borrowing,
    Returned,
    Overdue,
    Lost,
}

/// One loan of one book copy to one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowRecord {
    id: BorrowId,
    book_id: BookId,
    member_id: MemberId,
    borrow_date: DateTime<Utc>,
    due_date: DateTime<Utc>,
    return_date: Option<DateTime<Utc>>,
    returned: bool,
    lost: bool,
    overdue: bool,
    fine_cents: u64,
    fine_paid: bool,
    remarks: Option<String>,
    version: u64,
}

impl BorrowRecord {
    /// Open a new loan. The caller has already verified that the member is in
    /// good standing and has checked the book out.
    pub fn open(
        id: BorrowId,
        book_id: BookId,
        member_id: MemberId,
        now: DateTime<Utc>,
        days: i64,
        remarks: Option<String>,
    ) -> DomainResult<Self> {
        if !(MIN_LOAN_DAYS..=MAX_LOAN_DAYS).contains(&days) {
            return Err(DomainError::validation(
                "days",
                format!("loan period must be between {MIN_LOAN_DAYS} and {MAX_LOAN_DAYS} days"),
            ));
        }

        Ok(Self {
            id,
            book_id,
            member_id,
            borrow_date: now,
            due_date: fine::due_date(now, days),
            return_date: None,
            returned: false,
            lost: false,
            overdue: false,
            fine_cents: 0,
            fine_paid: false,
            remarks,
            version: 1,
        })
    }

    pub fn book_id(&self) -> BookId {
        self.book_id
    }

    pub fn member_id(&self) -> MemberId {
        self.member_id
    }

    pub fn borrow_date(&self) -> DateTime<Utc> {
        self.borrow_date
    }

    pub fn due_date(&self) -> DateTime<Utc> {
        self.due_date
    }

    pub fn return_date(&self) -> Option<DateTime<Utc>> {
        self.return_date
    }

    pub fn fine_cents(&self) -> u64 {
        self.fine_cents
    }

    pub fn fine_paid(&self) -> bool {
        self.fine_paid
    }

    pub fn remarks(&self) -> Option<&str> {
        self.remarks.as_deref()
    }

    /// Non-terminal: the copy is still out (possibly past due).
    pub fn is_active(&self) -> bool {
        !self.returned && !self.lost
    }

    /// Unpaid fine currently attached to this record.
    pub fn has_outstanding_fine(&self) -> bool {
        self.fine_cents > 0 && !self.fine_paid
    }

    /// Project the orthogonal flags onto the legacy four-value status.
    pub fn status(&self) -> BorrowStatus {
        if self.lost {
            BorrowStatus::Lost
        } else if self.returned {
            if self.overdue && !self.fine_paid {
                BorrowStatus::Overdue
            } else {
                BorrowStatus::Returned
            }
        } else if self.overdue {
            BorrowStatus::Overdue
        } else {
            BorrowStatus::Borrowing
        }
    }

    /// Close the loan with the copy back on the shelf.
    ///
    /// A late return assesses the fine from the actual return instant. The
    /// amount never moves below what an earlier sweep already assessed.
    pub fn mark_returned(&mut self, now: DateTime<Utc>, daily_rate_cents: u64) -> DomainResult<()> {
        self.ensure_active()?;

        self.return_date = Some(now);
        self.returned = true;
        if !self.fine_paid {
            let assessed = fine::fine_cents(self.due_date, now, daily_rate_cents);
            self.fine_cents = self.fine_cents.max(assessed);
            self.overdue = self.fine_cents > 0;
        }
        self.version += 1;
        Ok(())
    }

    /// Close the loan with the copy reported lost.
    pub fn mark_lost(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_active()?;

        self.return_date = Some(now);
        self.lost = true;
        self.version += 1;
        Ok(())
    }

    /// Settle the outstanding fine.
    ///
    /// Settlement only clears the debt; it never closes a loan whose copy is
    /// still out. For a record that was returned late, settling moves the
    /// projected status from `overdue` to `returned`.
    pub fn pay_fine(&mut self) -> DomainResult<()> {
        if self.fine_cents == 0 {
            return Err(DomainError::validation("fine_amount", "no fine owed"));
        }
        if self.fine_paid {
            return Err(DomainError::conflict("fine has already been paid"));
        }

        self.fine_paid = true;
        self.version += 1;
        Ok(())
    }

    /// Sweep step: reclassify a still-out, past-due loan and raise its fine
    /// to the assessment at `now`.
    ///
    /// No-op (returns `false`) for terminal records, records whose fine is
    /// already settled, and records not yet past due. Repeated calls at the
    /// same instant are idempotent; later calls can only raise the amount.
    pub fn assess_overdue(&mut self, now: DateTime<Utc>, daily_rate_cents: u64) -> bool {
        if !self.is_active() || self.fine_paid {
            return false;
        }
        if self.due_date >= now {
            return false;
        }

        let assessed = fine::fine_cents(self.due_date, now, daily_rate_cents);
        let new_fine = self.fine_cents.max(assessed);
        let changed = !self.overdue || new_fine != self.fine_cents;
        if changed {
            self.overdue = true;
            self.fine_cents = new_fine;
            self.version += 1;
        }
        changed
    }

    fn ensure_active(&self) -> DomainResult<()> {
        if !self.is_active() {
            return Err(DomainError::conflict(
                "record is already settled (returned or lost)",
            ));
        }
        Ok(())
    }
}

impl Entity for BorrowRecord {
    type Id = BorrowId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fine::DEFAULT_DAILY_RATE_CENTS;
    use chrono::{Duration, TimeZone};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap() + Duration::days(n)
    }

    fn open_record(days: i64) -> BorrowRecord {
        BorrowRecord::open(
            BorrowId::new(),
            BookId::new(),
            MemberId::new(),
            day(0),
            days,
            None,
        )
        .unwrap()
    }

    #[test]
    fn open_computes_due_date() {
        let record = open_record(14);
        assert_eq!(record.due_date(), day(14));
        assert_eq!(record.status(), BorrowStatus::Borrowing);
        assert!(record.is_active());
    }

    #[test]
    fn open_rejects_out_of_range_days() {
        for days in [0, -3, 366] {
            let err = BorrowRecord::open(
                BorrowId::new(),
                BookId::new(),
                MemberId::new(),
                day(0),
                days,
                None,
            )
            .unwrap_err();
            assert!(matches!(err, DomainError::Validation { field: "days", .. }));
        }
    }

    #[test]
    fn on_time_return_closes_without_fine() {
        let mut record = open_record(14);
        record.mark_returned(day(10), DEFAULT_DAILY_RATE_CENTS).unwrap();
        assert_eq!(record.status(), BorrowStatus::Returned);
        assert_eq!(record.fine_cents(), 0);
        assert_eq!(record.return_date(), Some(day(10)));
        assert!(!record.is_active());
    }

    #[test]
    fn late_return_assesses_fine_and_projects_overdue() {
        let mut record = open_record(14);
        record.mark_returned(day(20), DEFAULT_DAILY_RATE_CENTS).unwrap();
        assert_eq!(record.fine_cents(), 300);
        assert_eq!(record.status(), BorrowStatus::Overdue);
        assert!(record.has_outstanding_fine());
    }

    #[test]
    fn paying_fine_on_late_return_settles_to_returned() {
        let mut record = open_record(14);
        record.mark_returned(day(20), DEFAULT_DAILY_RATE_CENTS).unwrap();
        record.pay_fine().unwrap();
        assert!(record.fine_paid());
        assert_eq!(record.status(), BorrowStatus::Returned);
    }

    #[test]
    fn pay_fine_with_nothing_owed_is_a_validation_error() {
        let mut record = open_record(14);
        let err = record.pay_fine().unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "fine_amount",
                ..
            }
        ));
    }

    #[test]
    fn pay_fine_twice_conflicts() {
        let mut record = open_record(14);
        record.mark_returned(day(20), DEFAULT_DAILY_RATE_CENTS).unwrap();
        record.pay_fine().unwrap();
        assert!(matches!(record.pay_fine(), Err(DomainError::Conflict(_))));
    }

    #[test]
    fn terminal_records_reject_further_returns() {
        let mut record = open_record(14);
        record.mark_returned(day(10), DEFAULT_DAILY_RATE_CENTS).unwrap();
        assert!(matches!(
            record.mark_returned(day(11), DEFAULT_DAILY_RATE_CENTS),
            Err(DomainError::Conflict(_))
        ));
        assert!(matches!(record.mark_lost(day(11)), Err(DomainError::Conflict(_))));
    }

    #[test]
    fn lost_is_terminal_and_keeps_report_date() {
        let mut record = open_record(14);
        record.mark_lost(day(5)).unwrap();
        assert_eq!(record.status(), BorrowStatus::Lost);
        assert_eq!(record.return_date(), Some(day(5)));
        assert!(!record.is_active());
    }

    #[test]
    fn sweep_reclassifies_and_raises_fine_over_time() {
        let mut record = open_record(14);

        // Not yet due: nothing happens.
        assert!(!record.assess_overdue(day(14), DEFAULT_DAILY_RATE_CENTS));
        assert_eq!(record.status(), BorrowStatus::Borrowing);

        // Two days past due.
        assert!(record.assess_overdue(day(16), DEFAULT_DAILY_RATE_CENTS));
        assert_eq!(record.status(), BorrowStatus::Overdue);
        assert_eq!(record.fine_cents(), 100);

        // Same instant: idempotent.
        assert!(!record.assess_overdue(day(16), DEFAULT_DAILY_RATE_CENTS));
        assert_eq!(record.fine_cents(), 100);

        // Three more days: fine grows.
        assert!(record.assess_overdue(day(19), DEFAULT_DAILY_RATE_CENTS));
        assert_eq!(record.fine_cents(), 250);
    }

    #[test]
    fn sweep_never_touches_settled_fines() {
        let mut record = open_record(14);
        record.assess_overdue(day(16), DEFAULT_DAILY_RATE_CENTS);
        record.pay_fine().unwrap();

        assert!(!record.assess_overdue(day(30), DEFAULT_DAILY_RATE_CENTS));
        assert_eq!(record.fine_cents(), 100);
        assert!(record.fine_paid());
    }

    #[test]
    fn paying_while_still_out_does_not_close_the_loan() {
        let mut record = open_record(14);
        record.assess_overdue(day(16), DEFAULT_DAILY_RATE_CENTS);
        record.pay_fine().unwrap();

        // Still out: the record stays active until the copy comes back.
        assert!(record.is_active());
        assert_eq!(record.status(), BorrowStatus::Overdue);

        record.mark_returned(day(17), DEFAULT_DAILY_RATE_CENTS).unwrap();
        assert_eq!(record.status(), BorrowStatus::Returned);
        // Settled amount is frozen: the late return does not re-assess.
        assert_eq!(record.fine_cents(), 100);
        assert!(record.fine_paid());
    }

    #[test]
    fn return_after_sweep_keeps_fine_monotone() {
        let mut record = open_record(14);
        record.assess_overdue(day(20), DEFAULT_DAILY_RATE_CENTS);
        assert_eq!(record.fine_cents(), 300);

        // Returned shortly after the sweep, same day count: no decrease.
        record.mark_returned(day(20), DEFAULT_DAILY_RATE_CENTS).unwrap();
        assert_eq!(record.fine_cents(), 300);
        assert_eq!(record.status(), BorrowStatus::Overdue);
    }
}
