//! Application services: each operation is one transaction against the store.
//!
//! Handlers never touch `LibraryState` directly; everything goes through
//! [`AppServices`] so the pairing rules (record + book, category +
//! descendants) always commit or roll back together.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;

use libris_catalog::{Book, BookDetails, BookStatus, NewBook};
use libris_circulation::{BorrowRecord, BorrowStatus, CirculationLedger, DEFAULT_LOAN_DAYS};
use libris_core::{
    BookId, BorrowId, CategoryId, Clock, DomainError, Entity, MemberId,
};
use libris_members::{Member, MemberStatus, NewMember};
use libris_store::{MemoryStore, StoreError};
use libris_taxonomy::{Category, CategoryNode, CategoryUpdate, NewCategory, hierarchy};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// How far back the recent-borrows dashboard looks.
pub const RECENT_BORROWS_WINDOW_DAYS: i64 = 30;

/// Row cap for the dashboard listings.
pub const DASHBOARD_LIMIT: usize = 10;

/// Headline counters for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LibraryStatistics {
    pub total_books: usize,
    pub total_members: usize,
    pub total_borrows: usize,
    pub active_borrows: usize,
}

/// A recent loan joined with its book and member for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentBorrow {
    pub id: BorrowId,
    pub book_title: String,
    pub member_username: String,
    pub borrow_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
}

/// A book ranked by how often it has been borrowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopularBook {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub borrow_count: usize,
}

/// Optional filters for the borrow-record listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct BorrowFilter {
    pub member_id: Option<MemberId>,
    pub book_id: Option<BookId>,
    pub status: Option<BorrowStatus>,
}

/// Optional filters for the book listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct BookFilter {
    pub category_id: Option<CategoryId>,
    pub status: Option<BookStatus>,
}

pub struct AppServices {
    store: Arc<MemoryStore>,
    clock: Arc<dyn Clock>,
    daily_rate_cents: u64,
}

impl AppServices {
    pub fn new(store: Arc<MemoryStore>, clock: Arc<dyn Clock>, daily_rate_cents: u64) -> Self {
        Self {
            store,
            clock,
            daily_rate_cents,
        }
    }

    // ---- catalog ----

    pub fn create_book(&self, new: NewBook) -> ServiceResult<Book> {
        self.store.transaction(|state| {
            if let Some(isbn) = &new.isbn {
                if state.find_book_by_isbn(isbn).is_some() {
                    return Err(DomainError::conflict(format!(
                        "a book with ISBN {isbn} already exists"
                    ))
                    .into());
                }
            }
            let book = Book::register(BookId::new(), new.clone())?;
            state.insert_book(book.clone());
            Ok(book)
        })
    }

    pub fn get_book(&self, id: BookId) -> ServiceResult<Book> {
        self.store.read(|state| Ok(state.book(id)?.clone()))
    }

    pub fn list_books(&self, filter: BookFilter) -> ServiceResult<Vec<Book>> {
        self.store.read(|state| {
            let mut books: Vec<Book> = state
                .books()
                .filter(|b| {
                    filter
                        .category_id
                        .is_none_or(|c| b.category_id() == Some(c))
                        && filter.status.is_none_or(|s| b.status() == s)
                })
                .cloned()
                .collect();
            books.sort_by_key(|b| *b.id());
            Ok(books)
        })
    }

    pub fn update_book(&self, id: BookId, details: BookDetails) -> ServiceResult<Book> {
        self.store.transaction(|state| {
            if let Some(Some(category_id)) = details.category_id {
                state.category(category_id)?;
            }
            let book = state.book_mut(id)?;
            book.update_details(details.clone())?;
            Ok(book.clone())
        })
    }

    /// Remove a book from the catalog. Blocked while it is out on loan.
    pub fn delete_book(&self, id: BookId) -> ServiceResult<Book> {
        self.store.transaction(|state| {
            state.book(id)?;
            if state.active_record_for_book(id).is_some() {
                return Err(
                    DomainError::conflict("book has an active borrow record").into(),
                );
            }
            Ok(state.remove_book(id)?)
        })
    }

    // ---- members ----

    pub fn register_member(&self, new: NewMember) -> ServiceResult<Member> {
        self.store.transaction(|state| {
            if state.find_member_by_username(&new.username).is_some() {
                return Err(DomainError::conflict(format!(
                    "username {} is already taken",
                    new.username
                ))
                .into());
            }
            let member = Member::register(MemberId::new(), new.clone())?;
            state.insert_member(member.clone());
            Ok(member)
        })
    }

    pub fn get_member(&self, id: MemberId) -> ServiceResult<Member> {
        self.store.read(|state| Ok(state.member(id)?.clone()))
    }

    pub fn list_members(&self) -> ServiceResult<Vec<Member>> {
        self.store.read(|state| {
            let mut members: Vec<Member> = state.members().cloned().collect();
            members.sort_by(|a, b| a.username().cmp(b.username()));
            Ok(members)
        })
    }

    pub fn set_member_status(&self, id: MemberId, status: MemberStatus) -> ServiceResult<Member> {
        self.store.transaction(|state| {
            let mut member = state.member(id)?.clone();
            match status {
                MemberStatus::Active => member.reactivate(),
                MemberStatus::Inactive => member.deactivate(),
                MemberStatus::Locked => member.lock(),
            }
            state.insert_member(member.clone());
            Ok(member)
        })
    }

    // ---- circulation ----

    /// Start a loan.
    ///
    /// The member must be in good standing and the book must not already
    /// have an active record; both checks and the checkout commit in one
    /// transaction, so two concurrent borrowers cannot both win.
    pub fn borrow_book(
        &self,
        member_id: MemberId,
        book_id: BookId,
        days: Option<i64>,
        remarks: Option<String>,
    ) -> ServiceResult<BorrowRecord> {
        let now = self.clock.now();
        self.store.transaction(|state| {
            let member = state.member(member_id)?;
            if !member.can_borrow() {
                return Err(DomainError::conflict(format!(
                    "member {} is not in good standing to borrow",
                    member.username()
                ))
                .into());
            }
            if state.active_record_for_book(book_id).is_some() {
                return Err(DomainError::conflict(
                    "book already has an active borrow record",
                )
                .into());
            }

            let book = state.book_mut(book_id)?;
            let record = CirculationLedger::borrow(
                book,
                BorrowId::new(),
                member_id,
                now,
                days.unwrap_or(DEFAULT_LOAN_DAYS),
                remarks.clone(),
            )?;
            state.insert_record(record.clone());
            Ok(record)
        })
    }

    /// Close a loan, as a regular return or a loss report.
    pub fn return_book(&self, borrow_id: BorrowId, is_lost: bool) -> ServiceResult<BorrowRecord> {
        let now = self.clock.now();
        self.store.transaction(|state| {
            let mut record = state.record(borrow_id)?.clone();
            let book = state.book_mut(record.book_id())?;
            CirculationLedger::return_book(&mut record, book, now, self.daily_rate_cents, is_lost)?;
            state.insert_record(record.clone());
            Ok(record)
        })
    }

    pub fn pay_fine(&self, borrow_id: BorrowId) -> ServiceResult<BorrowRecord> {
        self.store.transaction(|state| {
            let mut record = state.record(borrow_id)?.clone();
            CirculationLedger::pay_fine(&mut record)?;
            state.insert_record(record.clone());
            Ok(record)
        })
    }

    /// Flag every loan past its due date and assess fines.
    ///
    /// Idempotent: a second sweep at the same instant changes nothing.
    pub fn sweep_overdue(&self) -> ServiceResult<Vec<BorrowId>> {
        let now = self.clock.now();
        self.store.transaction(|state| {
            let mut flagged = Vec::new();
            for record in state.records_mut() {
                if CirculationLedger::sweep(record, now, self.daily_rate_cents) {
                    flagged.push(*record.id());
                }
            }
            Ok::<_, ServiceError>(flagged)
        })
    }

    /// Administrative delete of a borrow record.
    ///
    /// Requires any fine to be settled first, and puts the book back on the
    /// shelf when the record was still active.
    pub fn delete_borrow(&self, borrow_id: BorrowId) -> ServiceResult<BorrowRecord> {
        self.store.transaction(|state| {
            let record = state.record(borrow_id)?.clone();
            if record.has_outstanding_fine() {
                return Err(DomainError::conflict(
                    "record has an unpaid fine; settle it before deleting",
                )
                .into());
            }
            if record.is_active() {
                let book = state.book_mut(record.book_id())?;
                CirculationLedger::release_for_delete(&record, book)?;
            }
            Ok(state.remove_record(borrow_id)?)
        })
    }

    pub fn get_borrow(&self, borrow_id: BorrowId) -> ServiceResult<BorrowRecord> {
        self.store.read(|state| Ok(state.record(borrow_id)?.clone()))
    }

    pub fn list_borrows(&self, filter: BorrowFilter) -> ServiceResult<Vec<BorrowRecord>> {
        self.store.read(|state| {
            let mut records: Vec<BorrowRecord> = state
                .records()
                .filter(|r| {
                    filter.member_id.is_none_or(|m| r.member_id() == m)
                        && filter.book_id.is_none_or(|b| r.book_id() == b)
                        && filter.status.is_none_or(|s| r.status() == s)
                })
                .cloned()
                .collect();
            records.sort_by_key(|r| *r.id());
            Ok(records)
        })
    }

    // ---- taxonomy ----

    pub fn create_category(&self, new: NewCategory) -> ServiceResult<Category> {
        self.store.transaction(|state| {
            Ok(hierarchy::create(
                state.categories_mut(),
                CategoryId::new(),
                new.clone(),
            )?)
        })
    }

    pub fn update_category(
        &self,
        id: CategoryId,
        update: CategoryUpdate,
    ) -> ServiceResult<Category> {
        self.store.transaction(|state| {
            Ok(hierarchy::update(state.categories_mut(), id, update.clone())?)
        })
    }

    /// Delete a category. Blocked while child categories or linked books
    /// exist.
    pub fn delete_category(&self, id: CategoryId) -> ServiceResult<Category> {
        self.store.transaction(|state| {
            let linked_books = state.books_in_category(id);
            Ok(hierarchy::delete(state.categories_mut(), id, linked_books)?)
        })
    }

    pub fn list_categories(&self) -> ServiceResult<Vec<Category>> {
        self.store.read(|state| {
            let mut categories: Vec<Category> = state.categories().values().cloned().collect();
            categories.sort_by_key(|c| (c.sort_order(), *c.id()));
            Ok(categories)
        })
    }

    pub fn category_tree(&self) -> ServiceResult<Vec<CategoryNode>> {
        self.store.read(|state| {
            Ok::<_, ServiceError>(hierarchy::tree(state.categories()))
        })
    }

    // ---- dashboard ----

    pub fn statistics(&self) -> ServiceResult<LibraryStatistics> {
        self.store.read(|state| {
            Ok::<_, ServiceError>(LibraryStatistics {
                total_books: state.books().count(),
                total_members: state.members().count(),
                total_borrows: state.records().count(),
                active_borrows: state.records().filter(|r| r.is_active()).count(),
            })
        })
    }

    /// Loans started within the last [`RECENT_BORROWS_WINDOW_DAYS`] days,
    /// newest first, capped at [`DASHBOARD_LIMIT`] rows.
    ///
    /// Records whose book or member has since been deleted are skipped.
    pub fn recent_borrows(&self) -> ServiceResult<Vec<RecentBorrow>> {
        let cutoff = self.clock.now() - Duration::days(RECENT_BORROWS_WINDOW_DAYS);
        self.store.read(|state| {
            let mut records: Vec<&BorrowRecord> = state
                .records()
                .filter(|r| r.borrow_date() >= cutoff)
                .collect();
            records.sort_by_key(|r| std::cmp::Reverse((r.borrow_date(), *r.id())));

            let mut recent = Vec::new();
            for record in records.into_iter().take(DASHBOARD_LIMIT) {
                let (Ok(book), Ok(member)) = (
                    state.book(record.book_id()),
                    state.member(record.member_id()),
                ) else {
                    continue;
                };
                recent.push(RecentBorrow {
                    id: *record.id(),
                    book_title: book.title().to_string(),
                    member_username: member.username().to_string(),
                    borrow_date: record.borrow_date(),
                    return_date: record.return_date(),
                });
            }
            Ok::<_, ServiceError>(recent)
        })
    }

    /// The [`DASHBOARD_LIMIT`] most-borrowed books, by total borrow count
    /// across all records. Books never borrowed do not appear.
    pub fn popular_books(&self) -> ServiceResult<Vec<PopularBook>> {
        self.store.read(|state| {
            let mut counts: HashMap<BookId, usize> = HashMap::new();
            for record in state.records() {
                *counts.entry(record.book_id()).or_default() += 1;
            }

            let mut popular: Vec<PopularBook> = counts
                .into_iter()
                .filter_map(|(book_id, borrow_count)| {
                    let book = state.book(book_id).ok()?;
                    Some(PopularBook {
                        id: book_id,
                        title: book.title().to_string(),
                        author: book.author().to_string(),
                        borrow_count,
                    })
                })
                .collect();
            popular.sort_by_key(|p| (std::cmp::Reverse(p.borrow_count), p.id));
            popular.truncate(DASHBOARD_LIMIT);
            Ok::<_, ServiceError>(popular)
        })
    }
}

impl crate::sweeper::SweepExecutor for AppServices {
    fn run_sweep(&self) -> anyhow::Result<usize> {
        let flagged = self.sweep_overdue()?;
        Ok(flagged.len())
    }
}
