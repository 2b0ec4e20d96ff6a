use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::Utc;

use stockledger_core::LedgerError;
use stockledger_infra::exchange::{export_json, export_products_csv, import_products_csv, parse_json_import};
use stockledger_inventory::Ack;

use crate::app::dto::{self, ConfirmQuery, CsvImportSummary};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/export/csv", get(export_csv))
        .route("/export/json", get(export_json_backup))
        .route("/import/csv", post(import_csv))
        .route("/import/json", post(import_json))
}

fn attachment(filename: String) -> String {
    format!("attachment; filename=\"{filename}\"")
}

pub async fn export_csv(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let bytes = match services.read(|l| export_products_csv(l.products())).await {
        Ok(b) => b,
        Err(e) => return errors::ledger_error_to_response(e.into()),
    };
    let filename = format!("inventory-{}.csv", Utc::now().format("%Y-%m-%d"));

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, attachment(filename)),
        ],
        bytes,
    )
        .into_response()
}

pub async fn export_json_backup(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let now = Utc::now();
    let text = match services.read(|l| export_json(l.snapshot(), now)).await {
        Ok(t) => t,
        Err(e) => return errors::ledger_error_to_response(e.into()),
    };
    let filename = format!("inventory-backup-{}.json", now.format("%Y-%m-%d"));

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, attachment(filename)),
        ],
        text,
    )
        .into_response()
}

/// Merge products by SKU from a CSV body. Never touches movement history.
pub async fn import_csv(Extension(services): Extension<Arc<AppServices>>, body: String) -> axum::response::Response {
    let import = match import_products_csv(&body) {
        Ok(i) => i,
        Err(e) => return errors::ledger_error_to_response(e.into()),
    };
    tracing::info!(rows = import.records.len(), blank_rows = import.blank_rows, "csv import parsed");

    let blank_rows = import.blank_rows;
    match services.bulk_upsert_products(&import.records).await {
        Ok(committed) => dto::committed_response(
            StatusCode::OK,
            committed.map(|report| CsvImportSummary { report, blank_rows }),
        ),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

/// Replace all state from a JSON backup; needs `?confirm=true`.
pub async fn import_json(
    Extension(services): Extension<Arc<AppServices>>,
    Query(q): Query<ConfirmQuery>,
    body: String,
) -> axum::response::Response {
    let snapshot = match parse_json_import(&body) {
        Ok(s) => s,
        Err(e) => return errors::ledger_error_to_response(LedgerError::from(e)),
    };

    let counts = serde_json::json!({
        "products": snapshot.products.len(),
        "movements": snapshot.movements.len(),
    });

    // The previous state is not echoed back; report the imported counts instead.
    match services.replace_snapshot(snapshot, Ack::from(q.confirm)).await {
        Ok(outcome) => dto::outcome_response(outcome.map(|committed| committed.map(|_previous| counts))),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
