use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{json, Value};

use chrono::Utc;
use stockledger_infra::{GatewayError, HttpGateway, InMemoryGateway, PersistenceGateway};
use stockledger_inventory::{Ack, CreateProduct, Ledger, MovementKind, ProductInput, RecordMovement};

struct TestServer {
    base_url: String,
    gateway: Arc<InMemoryGateway>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory backend, ephemeral port.
        let gateway = Arc::new(InMemoryGateway::new());
        let dyn_gateway: Arc<dyn PersistenceGateway> = gateway.clone();
        let services = stockledger_api::app::services::build_services(dyn_gateway)
            .await
            .expect("bootstrap failed");
        let app = stockledger_api::app::build_app(services);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            gateway,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn create_product(client: &reqwest::Client, srv: &TestServer, sku: &str, qty: i64, min: i64) -> Value {
    let res = client
        .post(srv.url("/api/ledger/products"))
        .json(&json!({ "sku": sku, "name": format!("Item {sku}"), "quantity": qty, "minStock": min }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

async fn stats(client: &reqwest::Client, srv: &TestServer) -> Value {
    client
        .get(srv.url("/api/ledger/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn product_lifecycle_with_movements() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let body = create_product(&client, &srv, "a-1", 10, 5).await;
    assert_eq!(body["durable"], true);
    assert_eq!(body["result"]["product"]["sku"], "A-1");
    assert_eq!(body["result"]["movement"]["type"], "in");
    let product_id = body["result"]["product"]["id"].as_str().unwrap().to_string();

    // Duplicate SKU (case-insensitive).
    let res = client
        .post(srv.url("/api/ledger/products"))
        .json(&json!({ "sku": " A-1 ", "name": "Other" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["error"], "duplicate_sku");

    let res = client
        .post(srv.url("/api/ledger/movements"))
        .json(&json!({ "productId": product_id, "type": "out", "quantity": 7, "reason": "sale" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let recorded: Value = res.json().await.unwrap();
    assert_eq!(recorded["result"]["movement"]["previousStock"], 10);
    assert_eq!(recorded["result"]["movement"]["newStock"], 3);
    assert_eq!(recorded["result"]["lowStock"], true);

    let s = stats(&client, &srv).await;
    assert_eq!(s["totalStock"], 3);
    assert_eq!(s["totalMovements"], 2);
    assert_eq!(s["lowStock"], 1);

    let alerts: Value = client
        .get(srv.url("/api/ledger/alerts"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(alerts.as_array().unwrap().len(), 1);
    assert_eq!(alerts[0]["status"], "low");

    let movements: Value = client
        .get(srv.url(&format!("/api/ledger/movements?product={product_id}&type=out&period=today")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(movements.as_array().unwrap().len(), 1);
    assert_eq!(movements[0]["reason"], "sale");
}

#[tokio::test]
async fn overdraft_needs_confirmation_then_clamps() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let body = create_product(&client, &srv, "B1", 10, 0).await;
    let product_id = body["result"]["product"]["id"].as_str().unwrap().to_string();
    let saves = srv.gateway.save_count();

    let req = json!({ "productId": product_id, "type": "out", "quantity": 15, "reason": "damaged" });
    let res = client
        .post(srv.url("/api/ledger/movements"))
        .json(&req)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let pending: Value = res.json().await.unwrap();
    assert_eq!(pending["error"], "confirmation_required");
    assert_eq!(pending["risk"]["kind"], "overdraft");
    assert_eq!(pending["risk"]["shortfall"], 5);
    assert_eq!(srv.gateway.save_count(), saves);

    let res = client
        .post(srv.url("/api/ledger/movements?confirm=true"))
        .json(&req)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let recorded: Value = res.json().await.unwrap();
    assert_eq!(recorded["result"]["movement"]["newStock"], 0);
    let movement_id = recorded["result"]["movement"]["id"].as_str().unwrap().to_string();

    // Deleting the clamped movement restores the prior stock.
    let res = client
        .delete(srv.url(&format!("/api/ledger/movements/{movement_id}?confirm=true")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(stats(&client, &srv).await["totalStock"], 10);
}

#[tokio::test]
async fn delete_product_cascades_after_confirmation() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let body = create_product(&client, &srv, "C1", 4, 1).await;
    let product_id = body["result"]["product"]["id"].as_str().unwrap().to_string();
    create_product(&client, &srv, "C2", 2, 1).await;

    let url = srv.url(&format!("/api/ledger/products/{product_id}"));
    let res = client.delete(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client.delete(format!("{url}?confirm=true")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let deleted: Value = res.json().await.unwrap();
    assert_eq!(deleted["result"]["movementsRemoved"], 1);

    let stored = srv.gateway.stored();
    assert_eq!(stored.products.len(), 1);
    assert_eq!(stored.movements.len(), 1);

    let res = client.delete(format!("{url}?confirm=true")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn failed_save_is_reported_not_rolled_back() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    srv.gateway.set_fail_saves(true);

    let body = create_product(&client, &srv, "D1", 1, 0).await;
    assert_eq!(body["durable"], false);
    assert!(body["warning"].is_string());
    assert_eq!(stats(&client, &srv).await["totalProducts"], 1);

    // The raw contract must not acknowledge a save that did not persist.
    let res = client
        .post(srv.url("/api/save"))
        .json(&json!({ "movements": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["success"], false);
}

#[tokio::test]
async fn raw_persistence_contract() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    create_product(&client, &srv, "E1", 3, 1).await;

    let data: Value = client
        .get(srv.url("/api/data"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(data["products"].as_array().unwrap().len(), 1);
    assert_eq!(data["movements"].as_array().unwrap().len(), 1);

    let res = client
        .post(srv.url("/api/save"))
        .json(&json!({ "movements": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let ack: Value = res.json().await.unwrap();
    assert_eq!(ack["success"], true);

    let movements: Value = client
        .get(srv.url("/api/movements"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(movements.as_array().unwrap().is_empty());

    let res = client
        .post(srv.url("/api/data"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["success"], false);
    assert!(err["error"].is_string());
}

#[tokio::test]
async fn csv_import_merges_and_json_import_replaces() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    create_product(&client, &srv, "F1", 5, 1).await;

    let csv = "\u{feff}SKU,Product Name,Qty\nf1,Renamed,9\n,,\nG1,,abc\n";
    let res = client
        .post(srv.url("/api/ledger/import/csv"))
        .body(csv)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let summary: Value = res.json().await.unwrap();
    assert_eq!(summary["result"]["updated"].as_array().unwrap().len(), 1);
    assert_eq!(summary["result"]["created"].as_array().unwrap().len(), 1);
    assert_eq!(summary["result"]["blankRows"], 1);

    let s = stats(&client, &srv).await;
    assert_eq!(s["totalProducts"], 2);
    assert_eq!(s["totalStock"], 9);
    // Only the initial-stock movement; imports never write history.
    assert_eq!(s["totalMovements"], 1);

    let export = client
        .get(srv.url("/api/ledger/export/csv"))
        .send()
        .await
        .unwrap();
    assert!(
        export.headers()["content-disposition"]
            .to_str()
            .unwrap()
            .starts_with("attachment")
    );
    let text = export.text().await.unwrap();
    assert!(text.contains("F1,Renamed"));
    assert!(text.contains("Unnamed Product"));

    let backup = client
        .get(srv.url("/api/ledger/export/json"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    // Wipe history, then restore it from the backup.
    let res = client
        .delete(srv.url("/api/ledger/movements?confirm=true"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(stats(&client, &srv).await["totalMovements"], 0);

    let res = client
        .post(srv.url("/api/ledger/import/json"))
        .body(backup.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client
        .post(srv.url("/api/ledger/import/json?confirm=true"))
        .body(backup)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(stats(&client, &srv).await["totalMovements"], 1);

    let res = client
        .post(srv.url("/api/ledger/import/json?confirm=true"))
        .body(r#"{"data":{"movements":[]}}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(stats(&client, &srv).await["totalProducts"], 2);
}

#[tokio::test]
async fn http_gateway_round_trips_through_a_running_server() {
    let srv = TestServer::spawn().await;
    let gateway = HttpGateway::new(format!("{}/", srv.base_url));

    let mut ledger = Ledger::new();
    let product = ledger
        .create_product(CreateProduct {
            input: ProductInput::new("H1", "Hinge", 12, 4),
            occurred_at: Utc::now(),
        })
        .unwrap()
        .product;
    ledger
        .record_movement(RecordMovement {
            product_id: product.id_typed().clone(),
            kind: MovementKind::Out,
            quantity: 5,
            reason: "sale".to_string(),
            ack: Ack::Pending,
            occurred_at: Utc::now(),
        })
        .unwrap();
    let snapshot = ledger.snapshot().clone();

    gateway.save(&snapshot).await.unwrap();
    assert_eq!(gateway.load().await.unwrap(), snapshot);
    assert_eq!(srv.gateway.stored(), snapshot);
}

#[tokio::test]
async fn http_gateway_reports_unacknowledged_save_as_rejected() {
    let app = axum::Router::new().route(
        "/api/save",
        axum::routing::post(|| async { axum::Json(json!({ "success": false, "error": "disk full" })) }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let err = HttpGateway::new(base_url)
        .save(&Ledger::new().snapshot().clone())
        .await
        .unwrap_err();
    handle.abort();

    match err {
        GatewayError::Rejected { status, message } => {
            assert_eq!(status, 200);
            assert_eq!(message, "disk full");
        }
        other => panic!("Expected Rejected, got {other:?}"),
    }
}
