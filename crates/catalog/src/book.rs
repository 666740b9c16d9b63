use serde::{Deserialize, Serialize};

use libris_core::{BookId, CategoryId, DomainError, DomainResult, Entity};

/// Availability status of a single book copy.
///
/// `Reserved` is a declared extension point: no operation currently sets or
/// clears it. The circulation ledger treats it as "not available".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    Available,
    Borrowed,
    Reserved,
    Lost,
}

/// Catalog attributes supplied when registering a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub isbn: Option<String>,
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    /// Price in smallest currency unit (cents).
    pub price_cents: Option<u64>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub category_id: Option<CategoryId>,
}

/// Catalog attributes that may change after registration.
///
/// Availability status is deliberately absent: it is owned by the
/// circulation ledger and only changes through borrow/return/loss
/// transitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDetails {
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub price_cents: Option<u64>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub category_id: Option<Option<CategoryId>>,
}

/// A single physical copy in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    id: BookId,
    isbn: Option<String>,
    title: String,
    author: String,
    publisher: Option<String>,
    price_cents: Option<u64>,
    description: Option<String>,
    location: Option<String>,
    category_id: Option<CategoryId>,
    status: BookStatus,
    version: u64,
}

impl Book {
    pub fn register(id: BookId, new: NewBook) -> DomainResult<Self> {
        if new.title.trim().is_empty() {
            return Err(DomainError::validation("title", "title cannot be empty"));
        }
        if new.author.trim().is_empty() {
            return Err(DomainError::validation("author", "author cannot be empty"));
        }
        if let Some(isbn) = &new.isbn {
            if isbn.trim().is_empty() {
                return Err(DomainError::validation("isbn", "isbn cannot be blank"));
            }
        }

        Ok(Self {
            id,
            isbn: new.isbn,
            title: new.title,
            author: new.author,
            publisher: new.publisher,
            price_cents: new.price_cents,
            description: new.description,
            location: new.location,
            category_id: new.category_id,
            status: BookStatus::Available,
            version: 1,
        })
    }

    pub fn isbn(&self) -> Option<&str> {
        self.isbn.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn publisher(&self) -> Option<&str> {
        self.publisher.as_deref()
    }

    pub fn price_cents(&self) -> Option<u64> {
        self.price_cents
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn category_id(&self) -> Option<CategoryId> {
        self.category_id
    }

    pub fn status(&self) -> BookStatus {
        self.status
    }

    pub fn is_available(&self) -> bool {
        matches!(self.status, BookStatus::Available)
    }

    /// Transition `Available -> Borrowed` at the start of a loan.
    pub fn check_out(&mut self) -> DomainResult<()> {
        if self.status != BookStatus::Available {
            return Err(DomainError::conflict(format!(
                "book is not available for borrowing (status: {:?})",
                self.status
            )));
        }
        self.status = BookStatus::Borrowed;
        self.version += 1;
        Ok(())
    }

    /// Transition `Borrowed -> Available` when the copy comes back on the
    /// shelf (regular return, or admin repair of a dangling active record).
    pub fn check_in(&mut self) -> DomainResult<()> {
        if self.status != BookStatus::Borrowed {
            return Err(DomainError::conflict(format!(
                "book is not checked out (status: {:?})",
                self.status
            )));
        }
        self.status = BookStatus::Available;
        self.version += 1;
        Ok(())
    }

    /// Transition `Borrowed -> Lost` when the borrower reports the copy lost.
    pub fn mark_lost(&mut self) -> DomainResult<()> {
        if self.status != BookStatus::Borrowed {
            return Err(DomainError::conflict(format!(
                "only a checked-out book can be reported lost (status: {:?})",
                self.status
            )));
        }
        self.status = BookStatus::Lost;
        self.version += 1;
        Ok(())
    }

    /// Apply a partial catalog-attribute update.
    pub fn update_details(&mut self, details: BookDetails) -> DomainResult<()> {
        if let Some(title) = &details.title {
            if title.trim().is_empty() {
                return Err(DomainError::validation("title", "title cannot be empty"));
            }
        }
        if let Some(author) = &details.author {
            if author.trim().is_empty() {
                return Err(DomainError::validation("author", "author cannot be empty"));
            }
        }

        if let Some(title) = details.title {
            self.title = title;
        }
        if let Some(author) = details.author {
            self.author = author;
        }
        if let Some(publisher) = details.publisher {
            self.publisher = Some(publisher);
        }
        if let Some(price) = details.price_cents {
            self.price_cents = Some(price);
        }
        if let Some(description) = details.description {
            self.description = Some(description);
        }
        if let Some(location) = details.location {
            self.location = Some(location);
        }
        if let Some(category_id) = details.category_id {
            self.category_id = category_id;
        }
        self.version += 1;
        Ok(())
    }
}

impl Entity for Book {
    type Id = BookId;

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

    fn test_book() -> Book {
        Book::register(
            BookId::new(),
            NewBook {
                isbn: Some("978-0-13-468599-1".to_string()),
                title: "The Rust Programming Language".to_string(),
                author: "Klabnik & Nichols".to_string(),
                publisher: None,
                price_cents: Some(3999),
                description: None,
                location: Some("A-3".to_string()),
                category_id: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn register_starts_available_at_version_one() {
        let book = test_book();
        assert_eq!(book.status(), BookStatus::Available);
        assert_eq!(book.version(), 1);
    }

    #[test]
    fn register_rejects_blank_title() {
        let err = Book::register(
            BookId::new(),
            NewBook {
                isbn: None,
                title: "  ".to_string(),
                author: "Someone".to_string(),
                publisher: None,
                price_cents: None,
                description: None,
                location: None,
                category_id: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "title", .. }));
    }

    #[test]
    fn check_out_then_in_round_trips_status() {
        let mut book = test_book();
        book.check_out().unwrap();
        assert_eq!(book.status(), BookStatus::Borrowed);
        book.check_in().unwrap();
        assert_eq!(book.status(), BookStatus::Available);
        assert_eq!(book.version(), 3);
    }

    #[test]
    fn check_out_fails_when_not_available() {
        let mut book = test_book();
        book.check_out().unwrap();
        let err = book.check_out().unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        // Failed transition leaves state untouched.
        assert_eq!(book.status(), BookStatus::Borrowed);
        assert_eq!(book.version(), 2);
    }

    #[test]
    fn mark_lost_requires_checked_out_copy() {
        let mut book = test_book();
        assert!(matches!(book.mark_lost(), Err(DomainError::Conflict(_))));

        book.check_out().unwrap();
        book.mark_lost().unwrap();
        assert_eq!(book.status(), BookStatus::Lost);

        // Terminal for circulation purposes: cannot check out a lost copy.
        assert!(matches!(book.check_out(), Err(DomainError::Conflict(_))));
    }

    #[test]
    fn update_details_is_partial() {
        let mut book = test_book();
        book.update_details(BookDetails {
            location: Some("B-7".to_string()),
            ..BookDetails::default()
        })
        .unwrap();
        assert_eq!(book.location(), Some("B-7"));
        assert_eq!(book.title(), "The Rust Programming Language");
    }

    #[test]
    fn update_details_cannot_blank_title() {
        let mut book = test_book();
        let err = book
            .update_details(BookDetails {
                title: Some(String::new()),
                ..BookDetails::default()
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "title", .. }));
        assert_eq!(book.version(), 1);
    }
}
