use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockledger_core::LedgerError;
use stockledger_inventory::Risk;

pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    match err {
        LedgerError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        LedgerError::DuplicateSku(sku) => json_error(
            StatusCode::CONFLICT,
            "duplicate_sku",
            format!("sku already exists: {sku}"),
        ),
        e @ LedgerError::NotFound { .. } => json_error(StatusCode::NOT_FOUND, "not_found", e.to_string()),
        LedgerError::Parse(msg) => json_error(StatusCode::BAD_REQUEST, "parse_error", msg),
        LedgerError::Durability(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "durability_error", msg)
        }
    }
}

/// 409 carrying the risk the caller has to acknowledge with `?confirm=true`.
pub fn confirmation_required(risk: Risk) -> axum::response::Response {
    (
        StatusCode::CONFLICT,
        axum::Json(json!({
            "error": "confirmation_required",
            "message": risk.to_string(),
            "risk": risk,
        })),
    )
        .into_response()
}

pub fn json_rejection(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_json", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Error shape of the raw persistence endpoints.
pub fn raw_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "error": message.into(),
        })),
    )
        .into_response()
}
