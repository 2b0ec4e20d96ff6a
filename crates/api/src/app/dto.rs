use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use stockledger_core::ProductId;
use stockledger_infra::Committed;
use stockledger_inventory::{Movement, MovementKind, Outcome, Product, StockStatus, UpsertReport};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMovementRequest {
    pub product_id: ProductId,
    #[serde(rename = "type")]
    pub kind: MovementKind,
    pub quantity: i64,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct MovementQuery {
    pub product: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub period: Option<String>,
    pub limit: Option<usize>,
}

/// `POST /api/save`: collections that are absent are left as they are.
#[derive(Debug, Default, Deserialize)]
pub struct SaveRequest {
    pub products: Option<Vec<Product>>,
    pub movements: Option<Vec<Movement>>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView<'a> {
    #[serde(flatten)]
    pub product: &'a Product,
    pub status: StockStatus,
    pub low_stock: bool,
}

impl<'a> From<&'a Product> for ProductView<'a> {
    fn from(product: &'a Product) -> Self {
        Self {
            product,
            status: product.status(),
            low_stock: product.is_low_stock(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvImportSummary {
    #[serde(flatten)]
    pub report: UpsertReport,
    pub blank_rows: usize,
}

/// `{ "result": .., "durable": bool, "warning"?: .. }`
pub fn committed_response<T: Serialize>(status: StatusCode, committed: Committed<T>) -> axum::response::Response {
    let durable = committed.is_durable();
    let warning = committed.warning().map(str::to_string);

    let result = match serde_json::to_value(&committed.value) {
        Ok(v) => v,
        Err(e) => return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "serialize_error", e.to_string()),
    };

    let mut body = serde_json::json!({
        "result": result,
        "durable": durable,
    });
    if let Some(warning) = warning {
        body["warning"] = serde_json::Value::String(warning);
    }

    (status, axum::Json(body)).into_response()
}

pub fn outcome_response<T: Serialize>(outcome: Outcome<Committed<T>>) -> axum::response::Response {
    match outcome {
        Outcome::Applied(committed) => committed_response(StatusCode::OK, committed),
        Outcome::NeedsConfirmation(risk) => errors::confirmation_required(risk),
    }
}
