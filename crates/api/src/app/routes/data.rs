//! Whole-state persistence contract (`/api/data`, `/api/save`, ...).
//!
//! These endpoints replace collections wholesale, so other ledgers can use this
//! server as their persistence backend.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use stockledger_inventory::{Movement, Product, Snapshot};

use crate::app::dto::SaveRequest;
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/api/data", get(get_data).post(post_data))
        .route("/api/save", post(save))
        .route("/api/products", get(get_products).post(post_products))
        .route("/api/movements", get(get_movements).post(post_movements))
}

pub async fn get_data(Extension(services): Extension<Arc<AppServices>>) -> Json<Snapshot> {
    Json(services.snapshot().await)
}

pub async fn get_products(Extension(services): Extension<Arc<AppServices>>) -> Json<Vec<Product>> {
    Json(services.read(|l| l.products().to_vec()).await)
}

pub async fn get_movements(Extension(services): Extension<Arc<AppServices>>) -> Json<Vec<Movement>> {
    Json(services.read(|l| l.movements().to_vec()).await)
}

pub async fn post_data(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<Snapshot>, JsonRejection>,
) -> axum::response::Response {
    let Json(snapshot) = match body {
        Ok(b) => b,
        Err(e) => return errors::raw_error(StatusCode::BAD_REQUEST, e.body_text()),
    };
    replace(&services, Some(snapshot.products), Some(snapshot.movements), "Data saved successfully").await
}

pub async fn save(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<SaveRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(e) => return errors::raw_error(StatusCode::BAD_REQUEST, e.body_text()),
    };
    replace(&services, req.products, req.movements, "Data saved successfully").await
}

pub async fn post_products(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<Vec<Product>>, JsonRejection>,
) -> axum::response::Response {
    let Json(products) = match body {
        Ok(b) => b,
        Err(e) => return errors::raw_error(StatusCode::BAD_REQUEST, e.body_text()),
    };
    replace(&services, Some(products), None, "Products saved successfully").await
}

pub async fn post_movements(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<Vec<Movement>>, JsonRejection>,
) -> axum::response::Response {
    let Json(movements) = match body {
        Ok(b) => b,
        Err(e) => return errors::raw_error(StatusCode::BAD_REQUEST, e.body_text()),
    };
    replace(&services, None, Some(movements), "Movements saved successfully").await
}

async fn replace(
    services: &AppServices,
    products: Option<Vec<Product>>,
    movements: Option<Vec<Movement>>,
    message: &'static str,
) -> axum::response::Response {
    let committed = match services.replace_collections(products, movements).await {
        Ok(c) => c,
        Err(e) => return errors::raw_error(StatusCode::BAD_REQUEST, e.to_string()),
    };

    // A backend that did not persist must not acknowledge the save.
    if let Some(warning) = committed.warning() {
        return errors::raw_error(StatusCode::INTERNAL_SERVER_ERROR, warning);
    }

    Json(serde_json::json!({
        "success": true,
        "message": message,
    }))
    .into_response()
}
