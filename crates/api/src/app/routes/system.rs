use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::sse::Event as SseEvent,
};

use crate::app::dto;
use crate::app::services::{self, AppServices};

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Live audit feed, optionally narrowed with `?account_id=`.
pub async fn stream(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::StreamQuery>,
) -> axum::response::Sse<impl tokio_stream::Stream<Item = Result<SseEvent, std::convert::Infallible>>> {
    services::audit_sse_stream(services, query.account_id)
}
