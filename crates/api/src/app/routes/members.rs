use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};

use libris_core::MemberId;
use libris_members::NewMember;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_members).post(register_member))
        .route("/:id", get(get_member))
        .route("/:id/status", put(set_member_status))
}

pub async fn register_member(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Json(body): Json<NewMember>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&principal, "members.manage") {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.register_member(body) {
        Ok(member) => (StatusCode::CREATED, Json(member)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_member(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&principal, "members.read") {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let id: MemberId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid member id");
        }
    };

    match services.get_member(id) {
        Ok(member) => (StatusCode::OK, Json(member)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_members(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Query(query): Query<dto::PageQuery>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&principal, "members.read") {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.list_members() {
        Ok(members) => (
            StatusCode::OK,
            Json(dto::paginate(members, query.limit, query.offset)),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn set_member_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<crate::context::PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::MemberStatusRequest>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::require(&principal, "members.manage") {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let id: MemberId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid member id");
        }
    };

    match services.set_member_status(id, body.status) {
        Ok(member) => (StatusCode::OK, Json(member)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
