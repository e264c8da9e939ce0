//! Integration tests for the health check, static decks and general HTTP
//! behaviour.

mod common;

use axum::http::StatusCode;

use common::{body_json, body_string, TestApp};

#[tokio::test]
async fn health_check_reports_store() {
    let app = TestApp::new().await;
    let response = app.get("/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["store_healthy"], true);
    assert_eq!(json["ws_connections"], 0);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = TestApp::new().await;
    let response = app.get("/this-route-does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let app = TestApp::new().await;
    let response = app.get("/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("x-request-id header");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

#[tokio::test]
async fn published_deck_is_served_under_public_base() {
    let app = TestApp::new().await;
    let output = app.service.output_dir("launch");
    std::fs::create_dir_all(&output).unwrap();
    std::fs::write(output.join("index.html"), "<h1>Launch deck</h1>").unwrap();

    let response = app.get("/decks/launch/").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "<h1>Launch deck</h1>");
}

#[tokio::test]
async fn missing_deck_is_404() {
    let app = TestApp::new().await;
    let response = app.get("/decks/nothing-here/").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
