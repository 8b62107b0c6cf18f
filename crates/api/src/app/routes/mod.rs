use axum::{routing::get, Router};

pub mod accounts;
pub mod system;

/// Router for every ledger endpoint.
pub fn router() -> Router {
    Router::new()
        .route("/stream", get(system::stream))
        .nest("/accounts", accounts::router())
}
