#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use farjad_erp::{
    auth::{hash_password, AuthConfig, AuthService},
    config::AppConfig,
    db,
    entities::accounts::user,
    AppState,
};

pub const ADMIN_PASSWORD: &str = "admin-password-123";

/// Application harness backed by a throwaway SQLite file.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub admin: user::Model,
    token: String,
    _dir: TempDir,
}

impl TestApp {
    /// Fresh database, migrated, with one superuser and a bearer token for it.
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir for test database");
        let db_path = dir.path().join("farjad_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "test_signing_key_for_integration_tests_only_0123456789abcdefghij".to_string(),
            3600,
            86_400,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let config = Arc::new(cfg);
        let auth = Arc::new(AuthService::new(
            AuthConfig::from(config.as_ref()),
            db_arc.clone(),
        ));
        let state = AppState::new(db_arc, config, auth);

        let admin = insert_user(&state, "admin", "admin@farjad.test", ADMIN_PASSWORD, true).await;
        let token = state
            .auth
            .generate_token(&admin)
            .await
            .expect("token for admin user")
            .access;

        let router = farjad_erp::build_app(state.clone()).expect("router for tests");

        Self {
            router,
            state,
            admin,
            token,
            _dir: dir,
        }
    }

    /// Bearer token for the default superuser.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Creates an active user without the superuser flag.
    pub async fn regular_user(&self, username: &str, staff: bool) -> user::Model {
        let model = insert_user(
            &self.state,
            username,
            &format!("{username}@farjad.test"),
            "regular-password-123",
            false,
        )
        .await;
        if !staff {
            return model;
        }
        let mut active: user::ActiveModel = model.into();
        active.is_staff = Set(true);
        active
            .update(&*self.state.db)
            .await
            .expect("promote user to staff")
    }

    /// Issues a fresh access token, picking up the user's current roles.
    pub async fn token_for(&self, user: &user::Model) -> String {
        self.state
            .auth
            .generate_token(user)
            .await
            .expect("token for test user")
            .access
    }

    pub async fn regular_user_token(&self, username: &str, staff: bool) -> String {
        let user = self.regular_user(username, staff).await;
        self.token_for(&user).await
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {tok}"));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Convenience helper for requests made as the superuser.
    pub async fn request_authenticated(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response {
        self.request(method, uri, body, Some(self.token())).await
    }

    /// Sends an authenticated request, asserts the status and returns the `data` envelope field.
    pub async fn expect_data(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        status: u16,
    ) -> Value {
        let response = self.request_authenticated(method.clone(), uri, body).await;
        let actual = response.status();
        let json = response_json(response).await;
        assert_eq!(actual.as_u16(), status, "{method} {uri} returned {json}");
        json["data"].clone()
    }
}

async fn insert_user(
    state: &AppState,
    username: &str,
    email: &str,
    password: &str,
    superuser: bool,
) -> user::Model {
    user::ActiveModel {
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        first_name: Set("Test".to_string()),
        last_name: Set(username.to_string()),
        phone: Set(String::new()),
        password_hash: Set(hash_password(password).expect("hash test password")),
        is_active: Set(true),
        is_verified: Set(true),
        is_staff: Set(superuser),
        is_superuser: Set(superuser),
        ..Default::default()
    }
    .insert(&*state.db)
    .await
    .expect("insert test user")
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("json response")
}

/// Reads a decimal serialized either as a string or a number.
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().expect("decimal string"),
        Value::Number(n) => n.to_string().parse().expect("decimal number"),
        other => panic!("expected decimal, got {other}"),
    }
}

/// The `id` of a created resource.
pub fn id_of(data: &Value) -> String {
    data["id"].as_str().expect("id field").to_string()
}
