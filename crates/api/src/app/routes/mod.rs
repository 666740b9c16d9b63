use axum::{Router, routing::get};

pub mod books;
pub mod categories;
pub mod circulation;
pub mod dashboard;
pub mod members;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/books", books::router())
        .nest("/members", members::router())
        .nest("/borrows", circulation::router())
        .nest("/categories", categories::router())
        .nest("/dashboard", dashboard::router())
}
