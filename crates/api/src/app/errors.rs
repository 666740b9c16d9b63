use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use libris_core::DomainError;

use crate::app::services::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Store(e) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            e.to_string(),
        ),
    }
}

fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::NotFound { .. } => {
            json_error(StatusCode::NOT_FOUND, "not_found", err.to_string())
        }
        DomainError::Conflict(_) => json_error(StatusCode::CONFLICT, "conflict", err.to_string()),
        DomainError::Validation { .. } => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", err.to_string())
        }
        DomainError::InvalidId(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_id", err.to_string())
        }
    }
}

pub fn parse_book_status(s: &str) -> Result<libris_catalog::BookStatus, axum::response::Response> {
    use libris_catalog::BookStatus;
    match s.to_lowercase().as_str() {
        "available" => Ok(BookStatus::Available),
        "borrowed" => Ok(BookStatus::Borrowed),
        "reserved" => Ok(BookStatus::Reserved),
        "lost" => Ok(BookStatus::Lost),
        _ => Err(json_error(
            StatusCode::BAD_REQUEST,
            "invalid_status",
            "status must be one of: available, borrowed, reserved, lost",
        )),
    }
}

pub fn parse_borrow_status(
    s: &str,
) -> Result<libris_circulation::BorrowStatus, axum::response::Response> {
    use libris_circulation::BorrowStatus;
    match s.to_lowercase().as_str() {
        "borrowing" => Ok(BorrowStatus::Borrowing),
        "returned" => Ok(BorrowStatus::Returned),
        "overdue" => Ok(BorrowStatus::Overdue),
        "lost" => Ok(BorrowStatus::Lost),
        _ => Err(json_error(
            StatusCode::BAD_REQUEST,
            "invalid_status",
            "status must be one of: borrowing, returned, overdue, lost",
        )),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
