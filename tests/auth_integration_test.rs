//! Sign-in, registration and token lifecycle through the HTTP surface.

mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::{response_json, TestApp, ADMIN_PASSWORD};
use farjad_erp::entities::accounts::password_reset_token;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn login_accepts_email_or_username() {
    let app = TestApp::new().await;

    for credentials in [
        json!({ "email": "admin@farjad.test", "password": ADMIN_PASSWORD }),
        json!({ "username": "admin", "password": ADMIN_PASSWORD }),
    ] {
        let response = app
            .request(Method::POST, "/api/v1/accounts/login", Some(credentials), None)
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response_json(response).await;
        assert!(body["success"].as_bool().unwrap_or(false));
        assert!(!body["data"]["access"].as_str().unwrap_or_default().is_empty());
        assert!(!body["data"]["refresh"].as_str().unwrap_or_default().is_empty());
        assert_eq!(body["data"]["user"]["username"], "admin");
    }
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/accounts/login",
            Some(json!({ "email": "admin@farjad.test", "password": "not-the-password" })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = response_json(response).await;
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn register_then_sign_in() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/accounts/register",
            Some(json!({
                "username": "sara",
                "email": "sara@farjad.test",
                "first_name": "Sara",
                "last_name": "Karimi",
                "password": "a-long-password",
                "password_confirm": "a-long-password"
            })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["data"]["email"], "sara@farjad.test");
    assert!(body["data"].get("password_hash").is_none());

    let response = app
        .request(
            Method::POST,
            "/api/v1/accounts/login",
            Some(json!({ "username": "sara", "password": "a-long-password" })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn register_rejects_mismatched_passwords() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/accounts/register",
            Some(json!({
                "username": "omid",
                "email": "omid@farjad.test",
                "password": "a-long-password",
                "password_confirm": "another-password"
            })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/accounts/register",
            Some(json!({
                "username": "someone-else",
                "email": "admin@farjad.test",
                "password": "a-long-password",
                "password_confirm": "a-long-password"
            })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn me_requires_a_bearer_token() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/v1/accounts/me", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .request(Method::GET, "/api/v1/accounts/me", None, Some("not-a-jwt"))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let me = app
        .expect_data(Method::GET, "/api/v1/accounts/me", None, 200)
        .await;
    assert_eq!(me["username"], "admin");
    assert_eq!(me["email"], "admin@farjad.test");
}

#[tokio::test]
async fn refresh_rotates_and_rejects_reuse() {
    let app = TestApp::new().await;

    let login = response_json(
        app.request(
            Method::POST,
            "/api/v1/accounts/login",
            Some(json!({ "username": "admin", "password": ADMIN_PASSWORD })),
            None,
        )
        .await,
    )
    .await;
    let refresh = login["data"]["refresh"].as_str().expect("refresh token").to_string();

    let response = app
        .request(
            Method::POST,
            "/api/v1/accounts/token/refresh",
            Some(json!({ "refresh": refresh })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let rotated = response_json(response).await;
    assert_ne!(rotated["data"]["refresh"].as_str(), Some(refresh.as_str()));

    let response = app
        .request(
            Method::POST,
            "/api/v1/accounts/token/refresh",
            Some(json!({ "refresh": refresh })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn access_token_cannot_be_used_as_refresh_token() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/accounts/token/refresh",
            Some(json!({ "refresh": app.token() })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_revokes_the_access_token() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(Method::POST, "/api/v1/accounts/logout", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request_authenticated(Method::GET, "/api/v1/accounts/me", None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn password_reset_answers_the_same_for_unknown_email() {
    let app = TestApp::new().await;

    let known = app
        .request(
            Method::POST,
            "/api/v1/accounts/password-reset",
            Some(json!({ "email": "admin@farjad.test" })),
            None,
        )
        .await;
    let unknown = app
        .request(
            Method::POST,
            "/api/v1/accounts/password-reset",
            Some(json!({ "email": "nobody@farjad.test" })),
            None,
        )
        .await;

    assert_eq!(known.status(), unknown.status());
    let known = response_json(known).await;
    let unknown = response_json(unknown).await;
    assert_eq!(known["data"]["detail"], unknown["data"]["detail"]);
}

async fn login_status(app: &TestApp, password: &str) -> StatusCode {
    app.request(
        Method::POST,
        "/api/v1/accounts/login",
        Some(json!({ "email": "admin@farjad.test", "password": password })),
        None,
    )
    .await
    .status()
}

async fn confirm_reset(app: &TestApp, token: &str, password: &str) -> StatusCode {
    app.request(
        Method::POST,
        "/api/v1/accounts/password-reset/confirm",
        Some(json!({ "token": token, "password": password, "password_confirm": password })),
        None,
    )
    .await
    .status()
}

#[tokio::test]
async fn password_reset_confirm_changes_password_once() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/accounts/password-reset",
            Some(json!({ "email": "admin@farjad.test" })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = response_json(response).await;
    let token = body["data"]["token"]
        .as_str()
        .expect("reset token outside production")
        .to_string();

    assert_eq!(confirm_reset(&app, &token, "brand-new-pass-42").await, StatusCode::OK);
    assert_eq!(login_status(&app, ADMIN_PASSWORD).await, StatusCode::UNAUTHORIZED);
    assert_eq!(login_status(&app, "brand-new-pass-42").await, StatusCode::OK);

    // A used token cannot be replayed
    assert_eq!(
        confirm_reset(&app, &token, "another-pass-99").await,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(login_status(&app, "brand-new-pass-42").await, StatusCode::OK);
}

#[tokio::test]
async fn expired_reset_token_is_rejected() {
    let app = TestApp::new().await;
    let issued = Utc::now() - Duration::hours(3);
    password_reset_token::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(app.admin.id),
        token: Set("stale-reset-token".to_string()),
        created_at: Set(issued),
        expires_at: Set(issued + Duration::hours(1)),
        is_used: Set(false),
        ip_address: Set(None),
    }
    .insert(&*app.state.db)
    .await
    .expect("insert reset token");

    assert_eq!(
        confirm_reset(&app, "stale-reset-token", "brand-new-pass-42").await,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        confirm_reset(&app, "never-issued", "brand-new-pass-42").await,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(login_status(&app, ADMIN_PASSWORD).await, StatusCode::OK);
}

#[tokio::test]
async fn user_search_matches_underscores_literally() {
    let app = TestApp::new().await;
    app.regular_user("ali_reza", false).await;
    app.regular_user("alimreza", false).await;

    let page = app
        .expect_data(Method::GET, "/api/v1/accounts/users?search=ali_reza", None, 200)
        .await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["username"], "ali_reza");
}
