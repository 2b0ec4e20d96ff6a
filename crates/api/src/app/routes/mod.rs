use axum::{routing::get, Router};

pub mod data;
pub mod exchange;
pub mod movements;
pub mod products;
pub mod system;

/// Every endpoint except `/health`.
pub fn router() -> Router {
    Router::new()
        .merge(data::router())
        .nest("/api/ledger", ledger_router())
}

fn ledger_router() -> Router {
    Router::new()
        .route("/stats", get(system::stats))
        .route("/alerts", get(system::alerts))
        .nest("/products", products::router())
        .nest("/movements", movements::router())
        .merge(exchange::router())
}
