//! Circulation domain module.
//!
//! The borrow-record lifecycle state machine and the pure fine arithmetic
//! behind it. Every transition that changes a record's active/terminal state
//! also mutates the linked book, and the two are handed back to the caller
//! to persist in one unit of work.

pub mod fine;
pub mod ledger;
pub mod record;

pub use fine::{DEFAULT_DAILY_RATE_CENTS, DEFAULT_LOAN_DAYS, due_date, fine_cents};
pub use ledger::CirculationLedger;
pub use record::{BorrowRecord, BorrowStatus};
