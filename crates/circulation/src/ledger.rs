//! Record/book coordination.
//!
//! Every transition here mutates the borrow record and its linked book as a
//! pair, so a book can never end up `borrowed` without an active record (or
//! vice versa) as long as the caller commits both in one unit of work. On
//! error nothing has been persisted; the caller discards both copies.

use chrono::{DateTime, Utc};

use libris_catalog::Book;
use libris_core::{BookId, BorrowId, DomainError, DomainResult, Entity, MemberId};

use crate::record::BorrowRecord;

/// Stateless coordinator for the circulation lifecycle.
pub struct CirculationLedger;

impl CirculationLedger {
    /// Start a loan: check the book out and open the record.
    ///
    /// Fails `Conflict` when the book is not available, leaving it untouched.
    pub fn borrow(
        book: &mut Book,
        record_id: BorrowId,
        member_id: MemberId,
        now: DateTime<Utc>,
        days: i64,
        remarks: Option<String>,
    ) -> DomainResult<BorrowRecord> {
        // Validate the record first so a bad loan period cannot leave the
        // book checked out.
        let record = BorrowRecord::open(record_id, *book.id(), member_id, now, days, remarks)?;
        book.check_out()?;
        Ok(record)
    }

    /// Close a loan, as a regular return or a loss report.
    ///
    /// Regular return puts the book back on the shelf whether or not it came
    /// back late; lateness only affects the fine. A loss report marks both
    /// record and book lost.
    pub fn return_book(
        record: &mut BorrowRecord,
        book: &mut Book,
        now: DateTime<Utc>,
        daily_rate_cents: u64,
        is_lost: bool,
    ) -> DomainResult<()> {
        Self::ensure_pair(record, book)?;

        if is_lost {
            record.mark_lost(now)?;
            book.mark_lost()?;
        } else {
            record.mark_returned(now, daily_rate_cents)?;
            book.check_in()?;
        }
        Ok(())
    }

    /// Settle the fine on a record.
    pub fn pay_fine(record: &mut BorrowRecord) -> DomainResult<()> {
        record.pay_fine()
    }

    /// Sweep step for one record; returns whether it changed.
    pub fn sweep(record: &mut BorrowRecord, now: DateTime<Utc>, daily_rate_cents: u64) -> bool {
        record.assess_overdue(now, daily_rate_cents)
    }

    /// Administrative delete: require fine settlement, then repair the book
    /// if the record was still active.
    ///
    /// The caller removes the record afterwards; this only validates and
    /// fixes the book side.
    pub fn release_for_delete(record: &BorrowRecord, book: &mut Book) -> DomainResult<()> {
        Self::ensure_pair(record, book)?;

        if record.has_outstanding_fine() {
            return Err(DomainError::conflict(
                "record has an unpaid fine; settle it before deleting",
            ));
        }
        if record.is_active() {
            book.check_in()?;
        }
        Ok(())
    }

    fn ensure_pair(record: &BorrowRecord, book: &Book) -> DomainResult<()> {
        if record.book_id() != *book.id() {
            return Err(DomainError::conflict(
                "record does not reference the supplied book",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fine::DEFAULT_DAILY_RATE_CENTS;
    use crate::record::BorrowStatus;
    use chrono::{Duration, TimeZone};
    use libris_catalog::{BookStatus, NewBook};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap() + Duration::days(n)
    }

    fn test_book() -> Book {
        Book::register(
            BookId::new(),
            NewBook {
                isbn: None,
                title: "Book A".to_string(),
                author: "Author A".to_string(),
                publisher: None,
                price_cents: None,
                description: None,
                location: None,
                category_id: None,
            },
        )
        .unwrap()
    }

    fn borrow_pair(days: i64) -> (BorrowRecord, Book) {
        let mut book = test_book();
        let record = CirculationLedger::borrow(
            &mut book,
            BorrowId::new(),
            MemberId::new(),
            day(0),
            days,
            None,
        )
        .unwrap();
        (record, book)
    }

    #[test]
    fn borrow_checks_out_book_and_opens_record() {
        let (record, book) = borrow_pair(14);
        assert_eq!(book.status(), BookStatus::Borrowed);
        assert_eq!(record.status(), BorrowStatus::Borrowing);
        assert_eq!(record.due_date(), day(14));
    }

    #[test]
    fn borrow_unavailable_book_conflicts_and_leaves_status() {
        let (_record, mut book) = borrow_pair(14);
        let err = CirculationLedger::borrow(
            &mut book,
            BorrowId::new(),
            MemberId::new(),
            day(1),
            14,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(book.status(), BookStatus::Borrowed);
    }

    #[test]
    fn invalid_loan_period_leaves_book_available() {
        let mut book = test_book();
        let err = CirculationLedger::borrow(
            &mut book,
            BorrowId::new(),
            MemberId::new(),
            day(0),
            0,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
        assert_eq!(book.status(), BookStatus::Available);
    }

    #[test]
    fn on_time_return_frees_book_without_fine() {
        let (mut record, mut book) = borrow_pair(14);
        CirculationLedger::return_book(
            &mut record,
            &mut book,
            day(10),
            DEFAULT_DAILY_RATE_CENTS,
            false,
        )
        .unwrap();
        assert_eq!(record.status(), BorrowStatus::Returned);
        assert_eq!(record.fine_cents(), 0);
        assert_eq!(book.status(), BookStatus::Available);
    }

    #[test]
    fn late_return_frees_book_and_assesses_fine() {
        let (mut record, mut book) = borrow_pair(14);
        CirculationLedger::return_book(
            &mut record,
            &mut book,
            day(20),
            DEFAULT_DAILY_RATE_CENTS,
            false,
        )
        .unwrap();
        // 6 days late at 0.50/day.
        assert_eq!(record.fine_cents(), 300);
        assert_eq!(record.status(), BorrowStatus::Overdue);
        assert_eq!(book.status(), BookStatus::Available);
    }

    #[test]
    fn loss_report_marks_both_sides_lost() {
        let (mut record, mut book) = borrow_pair(14);
        CirculationLedger::return_book(
            &mut record,
            &mut book,
            day(3),
            DEFAULT_DAILY_RATE_CENTS,
            true,
        )
        .unwrap();
        assert_eq!(record.status(), BorrowStatus::Lost);
        assert_eq!(book.status(), BookStatus::Lost);
    }

    #[test]
    fn double_return_conflicts_without_touching_book() {
        let (mut record, mut book) = borrow_pair(14);
        CirculationLedger::return_book(
            &mut record,
            &mut book,
            day(10),
            DEFAULT_DAILY_RATE_CENTS,
            false,
        )
        .unwrap();
        let err = CirculationLedger::return_book(
            &mut record,
            &mut book,
            day(11),
            DEFAULT_DAILY_RATE_CENTS,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(book.status(), BookStatus::Available);
    }

    #[test]
    fn mismatched_pair_is_rejected() {
        let (mut record, _book) = borrow_pair(14);
        let mut other = test_book();
        let err = CirculationLedger::return_book(
            &mut record,
            &mut other,
            day(10),
            DEFAULT_DAILY_RATE_CENTS,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert!(record.is_active());
    }

    #[test]
    fn delete_of_active_record_repairs_book() {
        let (record, mut book) = borrow_pair(14);
        CirculationLedger::release_for_delete(&record, &mut book).unwrap();
        assert_eq!(book.status(), BookStatus::Available);
    }

    #[test]
    fn delete_with_unpaid_fine_is_blocked() {
        let (mut record, mut book) = borrow_pair(14);
        CirculationLedger::sweep(&mut record, day(20), DEFAULT_DAILY_RATE_CENTS);
        let err = CirculationLedger::release_for_delete(&record, &mut book).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(book.status(), BookStatus::Borrowed);

        CirculationLedger::pay_fine(&mut record).unwrap();
        CirculationLedger::release_for_delete(&record, &mut book).unwrap();
        assert_eq!(book.status(), BookStatus::Available);
    }

    #[test]
    fn delete_of_returned_record_leaves_book_alone() {
        let (mut record, mut book) = borrow_pair(14);
        CirculationLedger::return_book(
            &mut record,
            &mut book,
            day(10),
            DEFAULT_DAILY_RATE_CENTS,
            false,
        )
        .unwrap();
        CirculationLedger::release_for_delete(&record, &mut book).unwrap();
        assert_eq!(book.status(), BookStatus::Available);
        assert_eq!(book.version(), 3);
    }

    #[test]
    fn full_lifecycle_borrow_late_return_pay() {
        // Borrow day 0 for 14 days, return day 20, pay the fine.
        let (mut record, mut book) = borrow_pair(14);
        assert_eq!(record.due_date(), day(14));

        CirculationLedger::return_book(
            &mut record,
            &mut book,
            day(20),
            DEFAULT_DAILY_RATE_CENTS,
            false,
        )
        .unwrap();
        assert_eq!(record.fine_cents(), 300);
        assert_eq!(record.status(), BorrowStatus::Overdue);

        CirculationLedger::pay_fine(&mut record).unwrap();
        assert!(record.fine_paid());
        assert_eq!(record.status(), BorrowStatus::Returned);
    }
}
