use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};

use stockledger_core::ProductId;
use stockledger_inventory::{Ack, ProductInput};

use crate::app::dto::{self, ConfirmQuery, ProductView};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:id", put(update_product).delete(delete_product))
}

/// Stock overview: low-stock products first, then by name.
pub async fn list_products(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    services
        .read(|l| {
            let views: Vec<ProductView<'_>> = l.stock_overview().into_iter().map(ProductView::from).collect();
            Json(views).into_response()
        })
        .await
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<ProductInput>, JsonRejection>,
) -> axum::response::Response {
    let Json(input) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };

    match services.create_product(input).await {
        Ok(committed) => dto::committed_response(StatusCode::CREATED, committed),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<ProductInput>, JsonRejection>,
) -> axum::response::Response {
    let product_id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::ledger_error_to_response(e),
    };
    let Json(input) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };

    match services.update_product(product_id, input).await {
        Ok(committed) => dto::committed_response(StatusCode::OK, committed),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Query(q): Query<ConfirmQuery>,
) -> axum::response::Response {
    let product_id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::ledger_error_to_response(e),
    };

    match services.delete_product(product_id, Ack::from(q.confirm)).await {
        Ok(outcome) => dto::outcome_response(outcome),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
