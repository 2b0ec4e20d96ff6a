use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use chrono::Utc;

use stockledger_core::{LedgerResult, MovementId, ProductId};
use stockledger_inventory::{Ack, MovementFilter, MovementKind, Period};

use crate::app::dto::{self, ConfirmQuery, MovementQuery, RecordMovementRequest};
use crate::app::errors;
use crate::app::services::AppServices;

const DEFAULT_LIMIT: usize = 50;

pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            get(list_movements).post(record_movement).delete(clear_history),
        )
        .route("/:id", delete(delete_movement))
}

fn parse_filter(q: &MovementQuery) -> LedgerResult<MovementFilter> {
    Ok(MovementFilter {
        product_id: q.product.as_deref().map(str::parse::<ProductId>).transpose()?,
        kind: q.kind.as_deref().map(str::parse::<MovementKind>).transpose()?,
        period: q.period.as_deref().map(str::parse::<Period>).transpose()?,
    })
}

/// Newest first, optionally filtered by product, direction and period.
pub async fn list_movements(
    Extension(services): Extension<Arc<AppServices>>,
    Query(q): Query<MovementQuery>,
) -> axum::response::Response {
    let filter = match parse_filter(&q) {
        Ok(f) => f,
        Err(e) => return errors::ledger_error_to_response(e),
    };
    let limit = q.limit.unwrap_or(DEFAULT_LIMIT);
    let now = Utc::now();

    services
        .read(|l| {
            let hits: Vec<_> = l.filter_movements(&filter, now).into_iter().take(limit).collect();
            Json(hits).into_response()
        })
        .await
}

pub async fn record_movement(
    Extension(services): Extension<Arc<AppServices>>,
    Query(q): Query<ConfirmQuery>,
    body: Result<Json<RecordMovementRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };

    match services
        .record_movement(req.product_id, req.kind, req.quantity, req.reason, Ack::from(q.confirm))
        .await
    {
        Ok(outcome) => dto::outcome_response(outcome),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn delete_movement(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Query(q): Query<ConfirmQuery>,
) -> axum::response::Response {
    let movement_id: MovementId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::ledger_error_to_response(e),
    };

    match services.delete_movement(movement_id, Ack::from(q.confirm)).await {
        Ok(outcome) => dto::outcome_response(outcome),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn clear_history(
    Extension(services): Extension<Arc<AppServices>>,
    Query(q): Query<ConfirmQuery>,
) -> axum::response::Response {
    match services.clear_movement_history(Ack::from(q.confirm)).await {
        Ok(outcome) => dto::outcome_response(outcome),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
