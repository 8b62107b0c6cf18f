use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use tally_core::{AccountId, Amount};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_account).get(list_accounts))
        .route("/:id/deposit", post(deposit))
        .route("/:id/withdraw", post(withdraw))
        .route("/:id/balance", get(get_balance))
        .route("/:id/history", get(get_history))
}

pub async fn create_account(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.run(|registry| Ok(registry.create_account().snapshot())).await {
        Ok(snap) => (StatusCode::CREATED, Json(dto::snapshot_to_json(snap))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_accounts(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.run(|registry| Ok(registry.snapshots())).await {
        Ok(snaps) => {
            let items = snaps.into_iter().map(dto::snapshot_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Responds only after the deposit has been applied.
pub async fn deposit(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::AmountRequest>, JsonRejection>,
) -> axum::response::Response {
    let (id, amount) = match amount_target(&services, &id, body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.run(move |registry| registry.deposit(id, amount)).await {
        Ok(snap) => (StatusCode::OK, Json(dto::snapshot_to_json(snap))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Responds only after the withdrawal has been applied or rejected, so an
/// insufficient-funds failure always reaches the caller.
pub async fn withdraw(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::AmountRequest>, JsonRejection>,
) -> axum::response::Response {
    let (id, amount) = match amount_target(&services, &id, body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.run(move |registry| registry.withdraw(id, amount)).await {
        Ok(snap) => (StatusCode::OK, Json(dto::snapshot_to_json(snap))).into_response(),
        Err(e) => e.into_response(),
    }
}

// Path id first, then the account, then the body: an unknown account is a
// 404 whatever was posted.
fn amount_target(
    services: &AppServices,
    raw_id: &str,
    body: Result<Json<dto::AmountRequest>, JsonRejection>,
) -> Result<(AccountId, Amount), axum::response::Response> {
    let id = errors::parse_account_id(raw_id)?;
    services
        .registry()
        .lookup(id)
        .map_err(errors::ledger_error_to_response)?;
    let Json(body) = body.map_err(errors::json_rejection_to_response)?;
    let amount = body.validate().map_err(errors::ledger_error_to_response)?;
    Ok((id, amount))
}

pub async fn get_balance(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_account_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.run(move |registry| registry.balance(id)).await {
        Ok(balance) => (StatusCode::OK, Json(dto::balance_to_json(balance))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_history(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_account_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    if let Err(e) = services.registry().lookup(id) {
        return errors::ledger_error_to_response(e);
    }

    let records = services.history(id);
    (StatusCode::OK, Json(dto::history_to_json(id, records))).into_response()
}
