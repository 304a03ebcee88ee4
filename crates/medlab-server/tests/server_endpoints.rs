//! Endpoint tests over an ephemeral listener.
//!
//! State is built over lazily-connecting pools, so every path exercised
//! here must reject before its first query; validation and screening
//! behavior is testable without a MySQL instance.

use medlab_server::{AppConfig, AppState, build_app};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

async fn start_server(
    cfg: AppConfig,
) -> (String, tokio::sync::oneshot::Sender<()>, JoinHandle<()>) {
    let state = AppState::connect_lazy(&cfg).expect("build state");
    let app = build_app(&cfg, state);

    // Bind to an ephemeral port
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    (format!("http://{addr}"), tx, server)
}

#[tokio::test]
async fn health_and_unknown_routes() {
    let (base, shutdown_tx, handle) = start_server(AppConfig::default()).await;
    let client = reqwest::Client::new();

    // GET /api/health
    let resp = client
        .get(format!("{base}/api/health"))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["time"].is_string());

    // Unknown route
    let resp = client
        .get(format!("{base}/api/nope"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn order_validation_rejects_before_touching_the_database() {
    let (base, shutdown_tx, handle) = start_server(AppConfig::default()).await;
    let client = reqwest::Client::new();

    // Empty test list
    let resp = client
        .post(format!("{base}/api/orders"))
        .json(&json!({ "patientId": 1, "testIds": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "At least one test is required");

    // Duplicate test ids
    let resp = client
        .post(format!("{base}/api/orders"))
        .json(&json!({ "patientId": 1, "testIds": [5, 5] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Duplicate test id 5 in order");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn order_update_requires_at_least_one_field() {
    let (base, shutdown_tx, handle) = start_server(AppConfig::default()).await;
    let client = reqwest::Client::new();

    // No fields at all
    let resp = client
        .put(format!("{base}/api/orders/1"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Nothing to update");

    // Empty-string priority and status read as absent
    let resp = client
        .put(format!("{base}/api/orders/1"))
        .json(&json!({ "priority": "", "status": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Nothing to update");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn sql_demo_screens_queries() {
    let (base, shutdown_tx, handle) = start_server(AppConfig::default()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/sql-demo"))
        .json(&json!({ "query": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Query empty.");

    let resp = client
        .post(format!("{base}/api/sql-demo"))
        .json(&json!({ "query": "DROP TABLE patients" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Only safe SELECT queries allowed.");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn sql_demo_disabled_answers_forbidden() {
    let mut cfg = AppConfig::default();
    cfg.sql_demo.enabled = false;
    let (base, shutdown_tx, handle) = start_server(cfg).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/sql-demo"))
        .json(&json!({ "query": "SELECT 1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "SQL demo is disabled");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}
