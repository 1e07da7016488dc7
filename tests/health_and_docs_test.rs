mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};

#[tokio::test]
async fn health_endpoints_need_no_token() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "healthy");

    let response = app.request(Method::GET, "/health/ready", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["ready"], true);
    assert_eq!(body["database"], "up");

    let response = app.request(Method::GET, "/health/version", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["name"], "farjad-erp");

    let response = app
        .request(Method::GET, "/api/v1/core/health", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn every_response_carries_a_request_id() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health", None, None).await;
    assert!(response.headers().contains_key("x-request-id"));

    let response = app
        .request(Method::GET, "/api/v1/core/contacts", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response_json(response).await;
    assert_eq!(body["request_id"].as_str().map(str::to_string), request_id);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api-docs/openapi.json", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc = response_json(response).await;
    assert!(doc["paths"]["/api/v1/finance/invoices"].is_object());
    assert!(doc["paths"]["/api/v1/services/requests/{id}/rating"].is_object());
    assert!(doc["components"]["securitySchemes"]["Bearer"].is_object());
}

#[tokio::test]
async fn unknown_routes_are_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(Method::GET, "/api/v1/nowhere", None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
