//! The full library dataset as one value.
//!
//! A transaction works on a scratch copy of this struct; typed accessors
//! translate missing keys into `DomainError::NotFound` with the entity kind
//! and id, so services never hand raw map misses to callers.

use std::collections::HashMap;

use libris_catalog::Book;
use libris_circulation::BorrowRecord;
use libris_core::{BookId, BorrowId, CategoryId, DomainError, DomainResult, Entity, MemberId};
use libris_members::Member;
use libris_taxonomy::Category;

#[derive(Debug, Clone, Default)]
pub struct LibraryState {
    books: HashMap<BookId, Book>,
    members: HashMap<MemberId, Member>,
    records: HashMap<BorrowId, BorrowRecord>,
    categories: HashMap<CategoryId, Category>,
}

impl LibraryState {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- books ----

    pub fn book(&self, id: BookId) -> DomainResult<&Book> {
        self.books
            .get(&id)
            .ok_or_else(|| DomainError::not_found("Book", id))
    }

    pub fn book_mut(&mut self, id: BookId) -> DomainResult<&mut Book> {
        self.books
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Book", id))
    }

    pub fn insert_book(&mut self, book: Book) {
        self.books.insert(*book.id(), book);
    }

    pub fn remove_book(&mut self, id: BookId) -> DomainResult<Book> {
        self.books
            .remove(&id)
            .ok_or_else(|| DomainError::not_found("Book", id))
    }

    pub fn books(&self) -> impl Iterator<Item = &Book> {
        self.books.values()
    }

    pub fn find_book_by_isbn(&self, isbn: &str) -> Option<&Book> {
        self.books.values().find(|b| b.isbn() == Some(isbn))
    }

    pub fn books_in_category(&self, category_id: CategoryId) -> usize {
        self.books
            .values()
            .filter(|b| b.category_id() == Some(category_id))
            .count()
    }

    // ---- members ----

    pub fn member(&self, id: MemberId) -> DomainResult<&Member> {
        self.members
            .get(&id)
            .ok_or_else(|| DomainError::not_found("Member", id))
    }

    pub fn insert_member(&mut self, member: Member) {
        self.members.insert(*member.id(), member);
    }

    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    pub fn find_member_by_username(&self, username: &str) -> Option<&Member> {
        self.members.values().find(|m| m.username() == username)
    }

    // ---- borrow records ----

    pub fn record(&self, id: BorrowId) -> DomainResult<&BorrowRecord> {
        self.records
            .get(&id)
            .ok_or_else(|| DomainError::not_found("BorrowRecord", id))
    }

    pub fn record_mut(&mut self, id: BorrowId) -> DomainResult<&mut BorrowRecord> {
        self.records
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("BorrowRecord", id))
    }

    pub fn insert_record(&mut self, record: BorrowRecord) {
        self.records.insert(*record.id(), record);
    }

    pub fn remove_record(&mut self, id: BorrowId) -> DomainResult<BorrowRecord> {
        self.records
            .remove(&id)
            .ok_or_else(|| DomainError::not_found("BorrowRecord", id))
    }

    pub fn records(&self) -> impl Iterator<Item = &BorrowRecord> {
        self.records.values()
    }

    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut BorrowRecord> {
        self.records.values_mut()
    }

    /// The at-most-one active record per book invariant, as a lookup.
    pub fn active_record_for_book(&self, book_id: BookId) -> Option<&BorrowRecord> {
        self.records
            .values()
            .find(|r| r.book_id() == book_id && r.is_active())
    }

    pub fn active_records_for_member(&self, member_id: MemberId) -> usize {
        self.records
            .values()
            .filter(|r| r.member_id() == member_id && r.is_active())
            .count()
    }

    // ---- categories ----

    pub fn category(&self, id: CategoryId) -> DomainResult<&Category> {
        self.categories
            .get(&id)
            .ok_or_else(|| DomainError::not_found("Category", id))
    }

    /// The whole category map, for the hierarchy operations that need to
    /// mutate a node and its descendants in one unit of work.
    pub fn categories_mut(&mut self) -> &mut HashMap<CategoryId, Category> {
        &mut self.categories
    }

    pub fn categories(&self) -> &HashMap<CategoryId, Category> {
        &self.categories
    }
}
