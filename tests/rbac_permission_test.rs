//! Role based access control across the module routers.
//!
//! Covers:
//! - users without roles are refused business data
//! - the built-in staff role reads and writes but cannot delete
//! - account administration stays with superusers
//! - database roles grant permissions once assigned

mod common;

use axum::http::{Method, StatusCode};
use common::{id_of, TestApp};
use serde_json::json;

#[tokio::test]
async fn superuser_reaches_every_module() {
    let app = TestApp::new().await;

    for endpoint in [
        "/api/v1/accounts/users",
        "/api/v1/core/contacts",
        "/api/v1/finance/invoices",
        "/api/v1/inventory/products",
        "/api/v1/services/requests",
    ] {
        let response = app
            .request_authenticated(Method::GET, endpoint, None)
            .await;
        assert_eq!(response.status(), StatusCode::OK, "admin should reach {endpoint}");
    }
}

#[tokio::test]
async fn user_without_roles_is_forbidden() {
    let app = TestApp::new().await;
    let token = app.regular_user_token("guest", false).await;

    let response = app
        .request(Method::GET, "/api/v1/core/contacts", None, Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Own account stays reachable
    let response = app
        .request(Method::GET, "/api/v1/accounts/me", None, Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn staff_can_write_but_not_delete() {
    let app = TestApp::new().await;
    let token = app.regular_user_token("clerk", true).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/inventory/brands",
            Some(json!({ "name": "ABB" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let brand = common::response_json(response).await;
    let uri = format!("/api/v1/inventory/brands/{}", id_of(&brand["data"]));

    let response = app
        .request(Method::PATCH, &uri, Some(json!({ "description": "Automation" })), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.request(Method::DELETE, &uri, None, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.request_authenticated(Method::DELETE, &uri, None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn staff_cannot_administer_users() {
    let app = TestApp::new().await;
    let token = app.regular_user_token("clerk", true).await;

    let response = app
        .request(Method::GET, "/api/v1/accounts/users", None, Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/accounts/users/{}/roles", app.admin.id),
            Some(json!({ "role_id": app.admin.id })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn assigned_role_grants_its_permissions() {
    let app = TestApp::new().await;
    let auditor = app.regular_user("auditor", false).await;

    let role = app
        .expect_data(
            Method::POST,
            "/api/v1/accounts/roles",
            Some(json!({ "name": "auditor", "description": "Reads audit trail" })),
            201,
        )
        .await;
    let role_id = id_of(&role);

    let granted = app
        .expect_data(
            Method::POST,
            &format!("/api/v1/accounts/roles/{role_id}/permissions"),
            Some(json!({ "permission": "audit_logs:read" })),
            200,
        )
        .await;
    assert!(granted["permissions"]
        .as_array()
        .expect("permissions")
        .iter()
        .any(|p| p == "audit_logs:read"));

    let before = app.token_for(&auditor).await;
    let response = app
        .request(Method::GET, "/api/v1/core/audit-logs", None, Some(&before))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    app.expect_data(
        Method::POST,
        &format!("/api/v1/accounts/users/{}/roles", auditor.id),
        Some(json!({ "role_id": role_id })),
        201,
    )
    .await;

    let after = app.token_for(&auditor).await;
    let response = app
        .request(Method::GET, "/api/v1/core/audit-logs", None, Some(&after))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The grant is scoped to one resource
    let response = app
        .request(Method::GET, "/api/v1/core/contacts", None, Some(&after))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
