use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::dto::ProductView;
use crate::app::services::AppServices;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn stats(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    Json(services.read(|l| l.stats()).await)
}

/// Products at or below their minimum, out-of-stock first.
pub async fn alerts(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    services
        .read(|l| {
            let views: Vec<ProductView<'_>> = l.low_stock_alerts().into_iter().map(ProductView::from).collect();
            Json(views).into_response()
        })
        .await
}
