//! Farjad ERP API library
//!
//! Accounts, core data, finance, inventory and field service over a
//! SeaORM-backed REST API.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod common;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{http::HeaderValue, response::Json, Extension, Router};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};
use ::tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::db::{ListParams, Page};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<config::AppConfig>,
    pub auth: Arc<auth::AuthService>,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: Arc<config::AppConfig>,
        auth: Arc<auth::AuthService>,
    ) -> Self {
        let services = handlers::AppServices::new(db.clone(), auth.clone(), config.clone());
        Self {
            db,
            config,
            auth,
            services,
        }
    }
}

/// Query parameters shared by every list endpoint
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// 1-based page number
    pub page: Option<u64>,
    /// Page size, capped by `api_max_page_size`
    pub limit: Option<u64>,
    /// Whitespace separated terms; each must match one of the resource's search fields
    pub search: Option<String>,
    /// Comma separated field names, `-` prefix for descending
    pub ordering: Option<String>,
}

impl ListQuery {
    pub fn params(&self, config: &config::AppConfig) -> ListParams {
        ListParams {
            page: self.page.unwrap_or(1).max(1),
            limit: config.page_size(self.limit),
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            ordering: self
                .ordering
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> From<Page<T>> for PaginatedResponse<T> {
    fn from(page: Page<T>) -> Self {
        let total_pages = page.total_pages();
        Self {
            items: page.items,
            total: page.total,
            page: page.page,
            limit: page.limit,
            total_pages,
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Everything under `/api/v1`, one nest per business module
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/accounts", handlers::accounts::routes())
        .nest("/core", handlers::core_data::routes())
        .nest("/finance", handlers::finance::routes())
        .nest("/inventory", handlers::inventory::routes())
        .nest("/services", handlers::field_service::routes())
}

/// CORS policy from configuration: explicit origins when given, permissive outside production
pub fn cors_layer(config: &config::AppConfig) -> anyhow::Result<CorsLayer> {
    let origins: Vec<HeaderValue> = config
        .cors_origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if !origins.is_empty() {
        return Ok(CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
            .allow_credentials(config.cors_allow_credentials));
    }
    if config.should_allow_permissive_cors() {
        info!(environment = %config.environment, "Using permissive CORS");
        return Ok(CorsLayer::permissive());
    }
    anyhow::bail!("Missing CORS configuration: set APP__CORS_ALLOWED_ORIGINS")
}

/// The complete HTTP application: health, `/api/v1` and Swagger UI behind the
/// request id, CORS, tracing, compression and auth-injection layers.
pub fn build_app(state: AppState) -> anyhow::Result<Router> {
    let cors = cors_layer(&state.config)?;
    let auth = state.auth.clone();

    Ok(Router::new()
        .nest("/health", health::health_routes(state.db.clone()))
        .nest("/api/v1", api_v1_routes().with_state(state))
        .merge(openapi::swagger_ui())
        .layer(Extension(auth))
        .layer(CompressionLayer::new())
        .layer(tracing::configure_http_tracing())
        .layer(cors)
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        )))
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[test]
    fn paginated_response_counts_pages() {
        let page = Page {
            items: vec![1, 2, 3],
            total: 41,
            page: 2,
            limit: 20,
        };
        let response = PaginatedResponse::from(page);
        assert_eq!(response.total_pages, 3);
        assert_eq!(response.items, vec![1, 2, 3]);
        assert_eq!(response.page, 2);
    }

    fn test_config() -> config::AppConfig {
        config::AppConfig::new(
            "sqlite::memory:".into(),
            "x".repeat(64),
            3600,
            604800,
            "127.0.0.1".into(),
            8000,
            "test".into(),
        )
    }

    #[test]
    fn list_query_applies_defaults_and_caps() {
        let config = test_config();

        let params = ListQuery::default().params(&config);
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, config.api_default_page_size);
        assert_eq!(params.search, None);

        let query = ListQuery {
            page: Some(0),
            limit: Some(10_000),
            search: Some("   ".into()),
            ordering: Some("-created_at".into()),
        };
        let params = query.params(&config);
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, config.api_max_page_size);
        assert_eq!(params.search, None);
        assert_eq!(params.ordering.as_deref(), Some("-created_at"));
    }

    #[test]
    fn production_requires_explicit_cors_origins() {
        let mut config = test_config();
        config.environment = "production".into();
        assert!(cors_layer(&config).is_err());

        config.cors_allowed_origins = Some("https://erp.example.com".into());
        assert!(cors_layer(&config).is_ok());
    }
}
