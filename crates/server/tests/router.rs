use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

use configs::StoreConfig;
use server::{build_router, startup::open_state};

async fn app(seed: bool) -> anyhow::Result<Router> {
    let dir = std::env::temp_dir().join(format!("tracker-store-{}", uuid::Uuid::new_v4()));
    let store = StoreConfig { data_dir: dir.to_string_lossy().into_owned(), seed };
    let state = open_state(&store).await?;
    Ok(build_router(state, CorsLayer::very_permissive()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))?;
    let res = app.clone().oneshot(req).await?;
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

fn record_body(plate: &str, cost: f64) -> Value {
    json!({
        "driverName": "Tj",
        "carPlate": plate,
        "carModel": "Lexus",
        "partsCount": 1,
        "totalCost": cost,
        "date": "2025-11-20",
        "status": "Completed",
        "parts": [{"partType": "Battery", "replaced": "Yes", "cost": cost}]
    })
}

#[tokio::test]
async fn health_and_seeded_collections() -> anyhow::Result<()> {
    let app = app(true).await?;
    let (s, v) = send(&app, Method::GET, "/health", None).await?;
    assert_eq!(s, StatusCode::OK);
    assert_eq!(v["status"], "ok");

    let (_, records) = send(&app, Method::GET, "/records", None).await?;
    assert_eq!(records.as_array().map(Vec::len), Some(2));
    assert_eq!(records[0]["carPlate"], "54212");

    let (_, users) = send(&app, Method::GET, "/users?email=tj%40example.com", None).await?;
    assert_eq!(users.as_array().map(Vec::len), Some(1));
    assert_eq!(users[0]["password"], "123456");
    Ok(())
}

#[tokio::test]
async fn record_crud_status_codes() -> anyhow::Result<()> {
    let app = app(false).await?;
    let (s, created) = send(&app, Method::POST, "/records", Some(record_body("A1", 90.0))).await?;
    assert_eq!(s, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap_or_default().to_string();
    assert!(!id.is_empty());

    let (s, got) = send(&app, Method::GET, &format!("/records/{id}"), None).await?;
    assert_eq!(s, StatusCode::OK);
    assert_eq!(got["parts"][0]["partType"], "Battery");

    let (s, put) = send(&app, Method::PUT, &format!("/records/{id}"), Some(record_body("B2", 120.0))).await?;
    assert_eq!(s, StatusCode::OK);
    assert_eq!(put["carPlate"], "B2");
    assert_eq!(put["id"], id.as_str());

    let (s, _) = send(&app, Method::DELETE, &format!("/records/{id}"), None).await?;
    assert_eq!(s, StatusCode::NO_CONTENT);
    let (s, body) = send(&app, Method::DELETE, &format!("/records/{id}"), None).await?;
    assert_eq!(s, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    let (s, _) = send(&app, Method::PUT, "/records/missing", Some(record_body("C3", 1.0))).await?;
    assert_eq!(s, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn bad_bodies_are_400_json() -> anyhow::Result<()> {
    let app = app(false).await?;
    let (s, body) = send(&app, Method::POST, "/records", Some(json!({"driverName": 3}))).await?;
    assert_eq!(s, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_body");

    let (s, body) = send(&app, Method::POST, "/records", Some(record_body("A1", -5.0))).await?;
    assert_eq!(s, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");

    let (s, _) = send(&app, Method::POST, "/users", Some(json!({"name": "x", "email": "bad", "password": "p"}))).await?;
    assert_eq!(s, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn users_keep_numeric_client_ids() -> anyhow::Result<()> {
    let app = app(false).await?;
    let (s, u) = send(&app, Method::POST, "/users", Some(json!({"id": 4821, "name": "Dana", "email": "d@x.io", "password": "secret"}))).await?;
    assert_eq!(s, StatusCode::CREATED);
    assert_eq!(u["id"], "4821");
    let (s, _) = send(&app, Method::GET, "/users/4821", None).await?;
    assert_eq!(s, StatusCode::OK);
    let (s, _) = send(&app, Method::POST, "/users", Some(json!({"id": "4821", "name": "D2", "email": "d2@x.io", "password": "secret"}))).await?;
    assert_eq!(s, StatusCode::CONFLICT);
    let (s, _) = send(&app, Method::GET, "/users/nope", None).await?;
    assert_eq!(s, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn openapi_document_lists_paths() -> anyhow::Result<()> {
    let app = app(false).await?;
    let (s, doc) = send(&app, Method::GET, "/api-docs/openapi.json", None).await?;
    assert_eq!(s, StatusCode::OK);
    assert!(doc["paths"].get("/records/{id}").is_some());
    Ok(())
}
