/*!
 * # Authentication and Authorization Module
 *
 * JWT access/refresh tokens for the Farjad ERP API.
 *
 * - Access tokens carry the user's identity, roles and effective permissions.
 * - Refresh tokens are tracked in the `refresh_tokens` table and rotated on use.
 * - Revoked access tokens are kept in an in-memory blacklist until they expire.
 *
 * Routers opt into authentication through [`AuthRouterExt`].
 */

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::entities::accounts::{refresh_token, role, role_permission, user, user_role};
use crate::errors::ServiceError;

mod password;
mod permissions;
mod rbac;

pub use password::{hash_password, verify_password};
pub use permissions::*;
pub use rbac::*;

/// Distinguishes access tokens from refresh tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claim structure for JWT tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub token_type: TokenType,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub iss: String,
    pub aud: String,
}

/// Authenticated user data extracted from the JWT token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: Option<String>,
    pub email: Option<String>,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
    pub token_id: String,
    pub expires_at: i64,
}

impl AuthUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Checks `permission` against the granted set, honouring `resource:*` and `*`
    pub fn has_permission(&self, permission: &str) -> bool {
        self.is_admin()
            || self
                .permissions
                .iter()
                .any(|granted| permission_matches(granted, permission))
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }

    fn from_claims(claims: Claims) -> Result<Self, AuthError> {
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
        Ok(Self {
            user_id,
            username: claims.username,
            email: claims.email,
            roles: claims.roles,
            permissions: claims.permissions,
            token_id: claims.jti,
            expires_at: claims.exp,
        })
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub jwt_issuer: String,
    pub access_token_expiration: Duration,
    pub refresh_token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        jwt_audience: String,
        jwt_issuer: String,
        access_token_expiration: Duration,
        refresh_token_expiration: Duration,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_audience,
            jwt_issuer,
            access_token_expiration,
            refresh_token_expiration,
        }
    }
}

impl From<&AppConfig> for AuthConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self::new(
            cfg.jwt_secret.clone(),
            cfg.auth_audience.clone(),
            cfg.auth_issuer.clone(),
            Duration::from_secs(cfg.jwt_expiration as u64),
            Duration::from_secs(cfg.refresh_token_expiration as u64),
        )
    }
}

/// Token pair returned by login, token and refresh endpoints
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Token blacklist entry
#[derive(Clone, Debug)]
struct BlacklistedToken {
    jti: String,
    expiry: DateTime<Utc>,
}

/// Authentication service that handles token issuance and validation
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
    pub db: Arc<DatabaseConnection>,
    blacklisted_tokens: Arc<RwLock<Vec<BlacklistedToken>>>,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DatabaseConnection>) -> Self {
        Self {
            config,
            db,
            blacklisted_tokens: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Issues an access/refresh pair for `user` and records the refresh token
    pub async fn generate_token(&self, user: &user::Model) -> Result<TokenPair, AuthError> {
        let now = Utc::now();
        let access_exp = now + to_chrono(self.config.access_token_expiration)?;
        let refresh_exp = now + to_chrono(self.config.refresh_token_expiration)?;

        let access_jti = Uuid::new_v4().to_string();
        let refresh_jti = Uuid::new_v4().to_string();

        let roles = self.get_user_roles(user).await?;
        let permissions = self.get_user_permissions(user.id, &roles).await?;

        let access_claims = Claims {
            sub: user.id.to_string(),
            username: Some(user.username.clone()),
            email: Some(user.email.clone()),
            first_name: Some(user.first_name.clone()),
            last_name: Some(user.last_name.clone()),
            is_verified: Some(user.is_verified),
            roles,
            permissions,
            token_type: TokenType::Access,
            jti: access_jti,
            iat: now.timestamp(),
            exp: access_exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        let refresh_claims = Claims {
            sub: user.id.to_string(),
            username: None,
            email: None,
            first_name: None,
            last_name: None,
            is_verified: None,
            roles: vec![],
            permissions: vec![],
            token_type: TokenType::Refresh,
            jti: refresh_jti.clone(),
            iat: now.timestamp(),
            exp: refresh_exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        let access = self.encode_claims(&access_claims)?;
        let refresh = self.encode_claims(&refresh_claims)?;

        self.store_refresh_token(user.id, &refresh_jti, refresh_exp)
            .await?;

        Ok(TokenPair { access, refresh })
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Validates signature, expiry, issuer and audience, then checks the blacklist
    pub async fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.jwt_issuer.as_str()]);
        validation.set_audience(&[self.config.jwt_audience.as_str()]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?
        .claims;

        if self.is_token_blacklisted(&claims.jti).await {
            return Err(AuthError::RevokedToken);
        }

        Ok(claims)
    }

    /// Exchanges a refresh token for a new pair, revoking the presented one
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.validate_token(refresh_token).await?;
        if claims.token_type != TokenType::Refresh {
            return Err(AuthError::WrongTokenType);
        }

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        let stored = refresh_token::Entity::find()
            .filter(refresh_token::Column::TokenId.eq(claims.jti.as_str()))
            .filter(refresh_token::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or(AuthError::InvalidToken)?;

        if stored.revoked {
            warn!(user_id = %user_id, "Refresh token reuse rejected");
            return Err(AuthError::RevokedToken);
        }
        if stored.expires_at <= Utc::now() {
            return Err(AuthError::TokenExpired);
        }

        let user = self.get_user(user_id).await?;
        if !user.is_active {
            return Err(AuthError::InactiveUser);
        }

        self.revoke_refresh_token(stored).await?;
        self.generate_token(&user).await
    }

    /// Blacklists an access token id until its natural expiry
    pub async fn revoke_access_token(&self, jti: &str, exp: i64) {
        let expiry = Utc
            .timestamp_opt(exp, 0)
            .single()
            .unwrap_or_else(Utc::now);

        let mut blacklist = self.blacklisted_tokens.write().await;
        blacklist.push(BlacklistedToken {
            jti: jti.to_string(),
            expiry,
        });
        Self::clean_blacklist(&mut blacklist);
    }

    /// Revokes every outstanding refresh token of a user
    pub async fn revoke_user_refresh_tokens(&self, user_id: Uuid) -> Result<(), AuthError> {
        refresh_token::Entity::update_many()
            .col_expr(refresh_token::Column::Revoked, sea_orm::sea_query::Expr::value(true))
            .filter(refresh_token::Column::UserId.eq(user_id))
            .filter(refresh_token::Column::Revoked.eq(false))
            .exec(&*self.db)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    async fn is_token_blacklisted(&self, token_id: &str) -> bool {
        let blacklist = self.blacklisted_tokens.read().await;
        blacklist.iter().any(|t| t.jti == token_id)
    }

    fn clean_blacklist(blacklist: &mut Vec<BlacklistedToken>) {
        let now = Utc::now();
        blacklist.retain(|t| t.expiry > now);
    }

    async fn get_user(&self, user_id: Uuid) -> Result<user::Model, AuthError> {
        user::Entity::find_by_id(user_id)
            .one(&*self.db)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or(AuthError::UserNotFound)
    }

    /// Built-in roles implied by user flags plus active database role assignments
    async fn get_user_roles(&self, user: &user::Model) -> Result<Vec<String>, AuthError> {
        let mut roles = BTreeSet::new();
        if user.is_superuser {
            roles.insert(ADMIN_ROLE.to_string());
        }
        if user.is_staff {
            roles.insert(STAFF_ROLE.to_string());
        }

        let assigned = user_role::Entity::find()
            .filter(user_role::Column::UserId.eq(user.id))
            .filter(user_role::Column::IsActive.eq(true))
            .find_also_related(role::Entity)
            .all(&*self.db)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        roles.extend(
            assigned
                .into_iter()
                .filter_map(|(_, role)| role)
                .filter(|role| role.is_active)
                .map(|role| role.name),
        );

        Ok(roles.into_iter().collect())
    }

    /// Union of built-in role permissions and granted database role permissions
    async fn get_user_permissions(
        &self,
        user_id: Uuid,
        roles: &[String],
    ) -> Result<Vec<String>, AuthError> {
        let mut permissions: BTreeSet<String> =
            RbacService::new().get_permissions_for_roles(roles).into_iter().collect();

        // Both the assignment and the role itself must be active
        let role_ids: Vec<Uuid> = user_role::Entity::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .filter(user_role::Column::IsActive.eq(true))
            .find_also_related(role::Entity)
            .all(&*self.db)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .into_iter()
            .filter_map(|(_, role)| role)
            .filter(|role| role.is_active)
            .map(|role| role.id)
            .collect();

        if !role_ids.is_empty() {
            let grants = role_permission::Entity::find()
                .filter(role_permission::Column::RoleId.is_in(role_ids))
                .filter(role_permission::Column::Granted.eq(true))
                .all(&*self.db)
                .await
                .map_err(|e| AuthError::DatabaseError(e.to_string()))?;
            permissions.extend(grants.into_iter().map(|grant| grant.permission));
        }

        Ok(permissions.into_iter().collect())
    }

    async fn store_refresh_token(
        &self,
        user_id: Uuid,
        token_id: &str,
        expiry: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        refresh_token::ActiveModel {
            user_id: Set(user_id),
            token_id: Set(token_id.to_string()),
            expires_at: Set(expiry),
            revoked: Set(false),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        debug!(user_id = %user_id, "Stored refresh token");
        Ok(())
    }

    async fn revoke_refresh_token(&self, stored: refresh_token::Model) -> Result<(), AuthError> {
        let user_id = stored.user_id;
        let mut active: refresh_token::ActiveModel = stored.into();
        active.revoked = Set(true);
        active
            .update(&*self.db)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        debug!(user_id = %user_id, "Revoked refresh token");
        Ok(())
    }
}

fn to_chrono(duration: Duration) -> Result<ChronoDuration, AuthError> {
    ChronoDuration::from_std(duration)
        .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication credentials were not provided")]
    MissingAuth,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User account is disabled")]
    InactiveUser,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token has been revoked")]
    RevokedToken,

    #[error("Token has wrong type")]
    WrongTokenType,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InsufficientPermissions => ServiceError::Forbidden(err.to_string()),
            AuthError::TokenCreation(msg) => ServiceError::JwtError(msg),
            AuthError::DatabaseError(msg) | AuthError::InternalError(msg) => {
                ServiceError::InternalError(msg)
            }
            AuthError::UserNotFound
            | AuthError::MissingAuth
            | AuthError::InvalidCredentials
            | AuthError::InactiveUser
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::RevokedToken
            | AuthError::WrongTokenType => ServiceError::Unauthorized(err.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ServiceError::from(self).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

/// Maps an HTTP method to the action a route requires
pub fn action_for_method(method: &Method) -> &'static str {
    match *method {
        Method::GET | Method::HEAD | Method::OPTIONS => Actions::READ,
        Method::POST => Actions::CREATE,
        Method::PUT | Method::PATCH => Actions::UPDATE,
        Method::DELETE => Actions::DELETE,
        _ => Actions::MANAGE,
    }
}

/// Permission middleware to check if a user has the required permission
pub async fn permission_middleware(
    State(required_permission): State<String>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or(AuthError::MissingAuth)?;

    if !user.has_permission(&required_permission) {
        warn!(user_id = %user.user_id, permission = %required_permission, "Permission denied");
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Requires `resource:<action>` where the action follows the request method
pub async fn resource_permission_middleware(
    State(resource): State<&'static str>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or(AuthError::MissingAuth)?;

    let required = format_permission(resource, action_for_method(request.method()));
    if !user.has_permission(&required) {
        warn!(user_id = %user.user_id, permission = %required, "Permission denied");
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Authentication middleware that extracts and validates bearer tokens
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return AuthError::InternalError("Authentication service not available".to_string())
                .into_response();
        }
    };

    match extract_auth_from_headers(request.headers(), &auth_service).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

async fn extract_auth_from_headers(
    headers: &HeaderMap,
    auth_service: &AuthService,
) -> Result<AuthUser, AuthError> {
    let token = bearer_token(headers).ok_or(AuthError::MissingAuth)?;
    let claims = auth_service.validate_token(token).await?;
    if claims.token_type != TokenType::Access {
        return Err(AuthError::WrongTokenType);
    }
    AuthUser::from_claims(claims)
}

/// Type alias used by handlers
pub type AuthenticatedUser = AuthUser;

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_permission(self, permission: &str) -> Self;
    fn with_resource(self, resource: &'static str) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_permission(self, permission: &str) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            permission.to_string(),
            permission_middleware,
        ))
        .with_auth()
    }

    fn with_resource(self, resource: &'static str) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            resource,
            resource_permission_middleware,
        ))
        .with_auth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::http::HeaderValue;

    fn user_with(roles: &[&str], permissions: &[&str]) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            username: Some("sara".into()),
            email: Some("sara@farjad.com".into()),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            token_id: Uuid::new_v4().to_string(),
            expires_at: 0,
        }
    }

    #[test]
    fn admin_bypasses_permission_checks() {
        let admin = user_with(&[ADMIN_ROLE], &[]);
        assert!(admin.has_permission("invoices:delete"));
    }

    #[test]
    fn wildcard_grants_match_by_resource() {
        let user = user_with(&[], &["invoices:*", "contacts:read"]);
        assert!(user.has_permission("invoices:delete"));
        assert!(user.has_permission("contacts:read"));
        assert!(!user.has_permission("contacts:update"));
        assert!(!user.has_permission("invoices_archive:read"));
    }

    #[test]
    fn methods_map_to_actions() {
        assert_eq!(action_for_method(&Method::GET), "read");
        assert_eq!(action_for_method(&Method::POST), "create");
        assert_eq!(action_for_method(&Method::PATCH), "update");
        assert_eq!(action_for_method(&Method::PUT), "update");
        assert_eq!(action_for_method(&Method::DELETE), "delete");
    }

    #[test]
    fn bearer_token_requires_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Token abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));
    }

    async fn auth_service_with_schema() -> AuthService {
        let mut options = sea_orm::ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = sea_orm::Database::connect(options)
            .await
            .expect("in-memory database");
        crate::db::run_migrations(&db).await.expect("migrations");

        let config = AuthConfig::new(
            "unit_test_signing_key_0123456789abcdefghijklmnopqrstuvwxyz0123456789".to_string(),
            "farjad-erp".to_string(),
            "farjad-erp".to_string(),
            Duration::from_secs(600),
            Duration::from_secs(3600),
        );
        AuthService::new(config, Arc::new(db))
    }

    async fn insert_user(service: &AuthService, username: &str) -> user::Model {
        user::ActiveModel {
            username: Set(username.to_string()),
            email: Set(format!("{username}@farjad.test")),
            first_name: Set("Nima".to_string()),
            last_name: Set("Karimi".to_string()),
            phone: Set(String::new()),
            password_hash: Set("unused".to_string()),
            is_active: Set(true),
            is_verified: Set(true),
            is_staff: Set(false),
            is_superuser: Set(false),
            ..Default::default()
        }
        .insert(&*service.db)
        .await
        .expect("insert user")
    }

    #[tokio::test]
    async fn issued_refresh_token_is_persisted_and_rotates() {
        let service = auth_service_with_schema().await;
        let user = insert_user(&service, "nima").await;

        let pair = service.generate_token(&user).await.expect("token pair");
        let stored = refresh_token::Entity::find()
            .filter(refresh_token::Column::UserId.eq(user.id))
            .all(&*service.db)
            .await
            .expect("refresh tokens");
        assert_eq!(stored.len(), 1);
        assert!(!stored[0].revoked);

        service.refresh_token(&pair.refresh).await.expect("rotated pair");
        assert_matches!(
            service.refresh_token(&pair.refresh).await,
            Err(AuthError::RevokedToken)
        );
    }

    #[tokio::test]
    async fn inactive_role_contributes_no_permissions() {
        let service = auth_service_with_schema().await;
        let user = insert_user(&service, "auditor").await;

        for (name, active, permission) in [
            ("archivist", false, "invoices:delete"),
            ("auditor", true, "audit_logs:read"),
        ] {
            let role = role::ActiveModel {
                name: Set(name.to_string()),
                description: Set(String::new()),
                is_active: Set(active),
                ..Default::default()
            }
            .insert(&*service.db)
            .await
            .expect("insert role");
            role_permission::ActiveModel {
                role_id: Set(role.id),
                permission: Set(permission.to_string()),
                granted: Set(true),
                ..Default::default()
            }
            .insert(&*service.db)
            .await
            .expect("insert grant");
            user_role::ActiveModel {
                user_id: Set(user.id),
                role_id: Set(role.id),
                is_active: Set(true),
                ..Default::default()
            }
            .insert(&*service.db)
            .await
            .expect("assign role");
        }

        let pair = service.generate_token(&user).await.expect("token pair");
        let claims = service.validate_token(&pair.access).await.expect("claims");
        assert_eq!(claims.roles, vec!["auditor".to_string()]);
        assert_eq!(claims.permissions, vec!["audit_logs:read".to_string()]);
    }

    #[test]
    fn auth_errors_map_to_statuses() {
        use axum::http::StatusCode;
        assert_eq!(
            ServiceError::from(AuthError::InsufficientPermissions).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ServiceError::from(AuthError::WrongTokenType).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }
}
