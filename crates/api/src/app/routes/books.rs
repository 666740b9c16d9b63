use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use libris_catalog::{BookDetails, NewBook};
use libris_core::BookId;

use crate::app::services::{AppServices, BookFilter};
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/:id", get(get_book).put(update_book).delete(delete_book))
}

pub async fn create_book(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Json(body): Json<NewBook>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&principal, "catalog.manage") {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.create_book(body) {
        Ok(book) => (StatusCode::CREATED, Json(book)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_book(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&principal, "catalog.read") {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let id: BookId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid book id"),
    };

    match services.get_book(id) {
        Ok(book) => (StatusCode::OK, Json(book)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_books(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Query(query): Query<dto::BookListQuery>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&principal, "catalog.read") {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    let mut filter = BookFilter::default();
    if let Some(raw) = &query.category_id {
        match raw.parse() {
            Ok(v) => filter.category_id = Some(v),
            Err(_) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_id",
                    "invalid category id",
                );
            }
        }
    }
    if let Some(raw) = &query.status {
        match errors::parse_book_status(raw) {
            Ok(v) => filter.status = Some(v),
            Err(resp) => return resp,
        }
    }

    match services.list_books(filter) {
        Ok(books) => (
            StatusCode::OK,
            Json(dto::paginate(books, query.limit, query.offset)),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_book(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<BookDetails>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&principal, "catalog.manage") {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let id: BookId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid book id"),
    };

    match services.update_book(id, body) {
        Ok(book) => (StatusCode::OK, Json(book)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_book(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&principal, "catalog.manage") {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let id: BookId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid book id"),
    };

    match services.delete_book(id) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
