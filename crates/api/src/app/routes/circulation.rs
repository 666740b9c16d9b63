use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use libris_core::BorrowId;

use crate::app::services::{AppServices, BorrowFilter};
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_borrows).post(borrow_book))
        .route("/sweep", post(sweep_overdue))
        .route("/:id", get(get_borrow).delete(delete_borrow))
        .route("/:id/return", post(return_book))
        .route("/:id/fine/pay", post(pay_fine))
}

pub async fn borrow_book(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Json(body): Json<dto::BorrowRequest>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&principal, "circulation.borrow") {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let member_id = match body.member_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid member id");
        }
    };
    let book_id = match body.book_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid book id"),
    };

    match services.borrow_book(member_id, book_id, body.days, body.remarks) {
        Ok(record) => (StatusCode::CREATED, Json(dto::record_to_json(&record))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn return_book(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    body: Option<Json<dto::ReturnRequest>>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&principal, "circulation.borrow") {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let id: BorrowId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid borrow id");
        }
    };
    let is_lost = body.map(|Json(b)| b.is_lost).unwrap_or(false);

    match services.return_book(id, is_lost) {
        Ok(record) => (StatusCode::OK, Json(dto::record_to_json(&record))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn pay_fine(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&principal, "circulation.borrow") {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let id: BorrowId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid borrow id");
        }
    };

    match services.pay_fine(id) {
        Ok(record) => (StatusCode::OK, Json(dto::record_to_json(&record))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn sweep_overdue(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&principal, "circulation.manage") {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.sweep_overdue() {
        Ok(flagged) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "flagged": flagged.len(),
                "record_ids": flagged,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_borrow(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&principal, "circulation.manage") {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let id: BorrowId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid borrow id");
        }
    };

    match services.delete_borrow(id) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_borrow(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&principal, "circulation.read") {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let id: BorrowId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid borrow id");
        }
    };

    match services.get_borrow(id) {
        Ok(record) => (StatusCode::OK, Json(dto::record_to_json(&record))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_borrows(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Query(query): Query<dto::BorrowListQuery>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&principal, "circulation.read") {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let mut filter = BorrowFilter::default();
    if let Some(raw) = &query.member_id {
        match raw.parse() {
            Ok(v) => filter.member_id = Some(v),
            Err(_) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_id",
                    "invalid member id",
                );
            }
        }
    }
    if let Some(raw) = &query.book_id {
        match raw.parse() {
            Ok(v) => filter.book_id = Some(v),
            Err(_) => {
                return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid book id");
            }
        }
    }
    if let Some(raw) = &query.status {
        match errors::parse_borrow_status(raw) {
            Ok(v) => filter.status = Some(v),
            Err(resp) => return resp,
        }
    }

    match services.list_borrows(filter) {
        Ok(records) => (
            StatusCode::OK,
            Json(
                dto::paginate(records, query.limit, query.offset)
                    .iter()
                    .map(dto::record_to_json)
                    .collect::<Vec<_>>(),
            ),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
