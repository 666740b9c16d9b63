//! Request payloads and JSON mapping helpers.
//!
//! Catalog, member, and taxonomy payloads deserialize straight into the
//! domain's `New*`/`*Update` types; only circulation needs its own request
//! shapes, and only borrow records need a custom JSON projection (the wire
//! format carries the legacy four-value status and the fine in both cents
//! and decimal form).

use serde::Deserialize;
use serde_json::json;

use libris_circulation::BorrowRecord;
use libris_core::Entity;
use libris_members::MemberStatus;

#[derive(Debug, Deserialize)]
pub struct BorrowRequest {
    pub member_id: String,
    pub book_id: String,
    pub days: Option<i64>,
    pub remarks: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReturnRequest {
    #[serde(default)]
    pub is_lost: bool,
}

#[derive(Debug, Deserialize)]
pub struct MemberStatusRequest {
    pub status: MemberStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct BorrowListQuery {
    pub member_id: Option<String>,
    pub book_id: Option<String>,
    pub status: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BookListQuery {
    pub category_id: Option<String>,
    pub status: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Page a sorted listing. Handled entirely at the routing layer; the
/// services always return the full filtered set.
pub fn paginate<T>(items: Vec<T>, limit: Option<usize>, offset: Option<usize>) -> Vec<T> {
    items
        .into_iter()
        .skip(offset.unwrap_or(0))
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

pub fn record_to_json(record: &BorrowRecord) -> serde_json::Value {
    json!({
        "id": record.id(),
        "book_id": record.book_id(),
        "member_id": record.member_id(),
        "borrow_date": record.borrow_date(),
        "due_date": record.due_date(),
        "return_date": record.return_date(),
        "status": record.status(),
        "fine_cents": record.fine_cents(),
        "fine": record.fine_cents() as f64 / 100.0,
        "fine_paid": record.fine_paid(),
        "remarks": record.remarks(),
    })
}
