use std::sync::Arc;

use chrono::{Duration, Utc};
use metrics::counter;
use rand::{distributions::Alphanumeric, Rng};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    auth::{hash_password, verify_password, AuthError, AuthService, AuthUser, TokenPair},
    common::{patch, validate_phone},
    config::AppConfig,
    entities::{
        accounts::{password_reset_token, user, user_session},
        core_data::AuditAction,
    },
    errors::ServiceError,
    services::{audit::AuditService, find_or_404, Actor},
};

use super::{
    profiles::{ProfileResponse, ProfileService},
    users::{insert_user, CreateUserRequest, UserResponse},
};

const RESET_TOKEN_LENGTH: usize = 48;

/// Sign in with either the email or the username
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user: LoginUser,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RefreshRequest {
    #[validate(length(min = 1))]
    pub refresh: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "register_passwords_match", skip_on_field_errors = false))]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,
    #[serde(default)]
    #[validate(length(max = 17), custom = "validate_phone")]
    pub phone: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub password_confirm: String,
}

fn passwords_match(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password == confirm {
        Ok(())
    } else {
        let mut err = ValidationError::new("password_mismatch");
        err.message = Some("Passwords don't match.".into());
        Err(err)
    }
}

fn register_passwords_match(req: &RegisterRequest) -> Result<(), ValidationError> {
    passwords_match(&req.password, &req.password_confirm)
}

/// The signed-in user with their profile
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub profile: Option<ProfileResponse>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct MeRequest {
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,
    #[serde(default)]
    #[validate(length(max = 17), custom = "validate_phone")]
    pub phone: String,
}

/// `id` and `username` are read-only
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateMeRequest {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    #[validate(length(max = 17), custom = "validate_phone")]
    pub phone: Option<String>,
}

impl From<MeRequest> for UpdateMeRequest {
    fn from(req: MeRequest) -> Self {
        Self {
            email: Some(req.email),
            first_name: Some(req.first_name),
            last_name: Some(req.last_name),
            phone: Some(req.phone),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PasswordResetRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PasswordResetResponse {
    pub detail: String,
    /// Only returned outside production
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "confirm_passwords_match", skip_on_field_errors = false))]
pub struct PasswordResetConfirmRequest {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub password_confirm: String,
}

fn confirm_passwords_match(req: &PasswordResetConfirmRequest) -> Result<(), ValidationError> {
    passwords_match(&req.password, &req.password_confirm)
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DetailResponse {
    pub detail: String,
}

/// Sign-in, token and self-service account flows
#[derive(Clone)]
pub struct AccountService {
    db: Arc<DatabaseConnection>,
    auth: Arc<AuthService>,
    config: Arc<AppConfig>,
    audit: AuditService,
    profiles: ProfileService,
}

impl AccountService {
    pub fn new(db: Arc<DatabaseConnection>, auth: Arc<AuthService>, config: Arc<AppConfig>) -> Self {
        Self {
            audit: AuditService::new(db.clone()),
            profiles: ProfileService::new(db.clone()),
            db,
            auth,
            config,
        }
    }

    /// Resolves credentials to an active user
    async fn authenticate(&self, input: &LoginRequest) -> Result<user::Model, ServiceError> {
        input.validate()?;
        let query = match (input.email.as_deref(), input.username.as_deref()) {
            (Some(email), _) if !email.trim().is_empty() => {
                user::Entity::find().filter(user::Column::Email.eq(email.trim()))
            }
            (_, Some(username)) if !username.trim().is_empty() => {
                user::Entity::find().filter(user::Column::Username.eq(username.trim()))
            }
            _ => {
                return Err(ServiceError::ValidationError(
                    "email: Either email or username is required.".to_string(),
                ))
            }
        };

        let found = query
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        let user = match found {
            Some(user) if verify_password(&input.password, &user.password_hash) => user,
            _ => {
                counter!("farjad.auth.login_failures", 1);
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !user.is_active {
            return Err(AuthError::InactiveUser.into());
        }
        Ok(user)
    }

    /// Issues tokens, records a session and audits the sign-in
    #[instrument(skip(self, input, actor))]
    pub async fn login(&self, input: LoginRequest, actor: &Actor) -> Result<LoginResponse, ServiceError> {
        let user = self.authenticate(&input).await?;
        let tokens = self.auth.generate_token(&user).await?;
        let ip_address = actor
            .ip_address
            .clone()
            .unwrap_or_else(|| "0.0.0.0".to_string());

        user_session::ActiveModel {
            user_id: Set(user.id),
            session_key: Set(Uuid::new_v4().to_string()),
            ip_address: Set(ip_address.clone()),
            user_agent: Set(actor.user_agent.clone()),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(ServiceError::db_error)?;

        let mut active: user::ActiveModel = user.clone().into();
        active.last_login = Set(Some(Utc::now()));
        active.last_login_ip = Set(Some(ip_address));
        let user = active
            .update(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        let actor = Actor {
            user_id: Some(user.id),
            ..actor.clone()
        };
        self.audit
            .record(&actor, AuditAction::Login, "User", user.id, &user.email, None)
            .await;

        counter!("farjad.auth.logins", 1);
        info!(user_id = %user.id, "User logged in");

        Ok(LoginResponse {
            access: tokens.access,
            refresh: tokens.refresh,
            user: LoginUser {
                id: user.id,
                username: user.username,
                email: user.email,
                first_name: user.first_name,
                last_name: user.last_name,
                is_verified: user.is_verified,
            },
        })
    }

    /// Plain token pair for API clients
    #[instrument(skip(self, input))]
    pub async fn token(&self, input: LoginRequest) -> Result<TokenPair, ServiceError> {
        let user = self.authenticate(&input).await?;
        Ok(self.auth.generate_token(&user).await?)
    }

    #[instrument(skip(self, input))]
    pub async fn refresh(&self, input: RefreshRequest) -> Result<TokenPair, ServiceError> {
        input.validate()?;
        Ok(self.auth.refresh_token(&input.refresh).await?)
    }

    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn register(&self, input: RegisterRequest) -> Result<UserResponse, ServiceError> {
        input.validate()?;
        let user = insert_user(
            &self.db,
            CreateUserRequest {
                username: input.username,
                email: input.email,
                first_name: input.first_name,
                last_name: input.last_name,
                phone: input.phone,
                password: input.password,
                is_active: true,
                is_verified: false,
                is_staff: false,
                is_superuser: false,
            },
        )
        .await?;

        counter!("farjad.auth.registrations", 1);
        info!(user_id = %user.id, "User registered");
        Ok(user.into())
    }

    pub async fn me(&self, user_id: Uuid) -> Result<MeResponse, ServiceError> {
        let user = find_or_404::<user::Entity, _>(&*self.db, user_id, "User").await?;
        self.me_response(user).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_me(&self, user_id: Uuid, input: UpdateMeRequest) -> Result<MeResponse, ServiceError> {
        input.validate()?;
        let user = find_or_404::<user::Entity, _>(&*self.db, user_id, "User").await?;

        let mut active: user::ActiveModel = user.into();
        patch(&mut active.email, input.email);
        patch(&mut active.first_name, input.first_name);
        patch(&mut active.last_name, input.last_name);
        patch(&mut active.phone, input.phone);
        let user = active
            .update(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        self.me_response(user).await
    }

    /// Ends every session of the caller and revokes its tokens
    #[instrument(skip(self, auth_user, actor), fields(user_id = %auth_user.user_id))]
    pub async fn logout(&self, auth_user: &AuthUser, actor: &Actor) -> Result<DetailResponse, ServiceError> {
        user_session::Entity::update_many()
            .col_expr(user_session::Column::IsActive, Expr::value(false))
            .filter(user_session::Column::UserId.eq(auth_user.user_id))
            .filter(user_session::Column::IsActive.eq(true))
            .exec(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        self.auth
            .revoke_access_token(&auth_user.token_id, auth_user.expires_at)
            .await;
        self.auth.revoke_user_refresh_tokens(auth_user.user_id).await?;

        let repr = auth_user.email.clone().unwrap_or_default();
        self.audit
            .record(actor, AuditAction::Logout, "User", auth_user.user_id, &repr, None)
            .await;

        info!("User logged out");
        Ok(DetailResponse {
            detail: "Successfully logged out.".to_string(),
        })
    }

    /// Always answers the same way so callers cannot discover which accounts exist
    #[instrument(skip(self, input, actor))]
    pub async fn request_password_reset(
        &self,
        input: PasswordResetRequest,
        actor: &Actor,
    ) -> Result<PasswordResetResponse, ServiceError> {
        input.validate()?;
        let found = user::Entity::find()
            .filter(user::Column::Email.eq(input.email.as_str()))
            .filter(user::Column::IsActive.eq(true))
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        let mut token = None;
        if let Some(user) = found {
            let value = reset_token();
            let now = Utc::now();
            password_reset_token::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.id),
                token: Set(value.clone()),
                created_at: Set(now),
                expires_at: Set(now + Duration::seconds(self.config.password_reset_ttl_secs)),
                is_used: Set(false),
                ip_address: Set(actor.ip_address.clone()),
            }
            .insert(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

            info!(user_id = %user.id, "Password reset requested");
            if !self.config.is_production() {
                token = Some(value);
            }
        } else {
            warn!("Password reset requested for unknown or inactive account");
        }

        Ok(PasswordResetResponse {
            detail: "If the account exists, password reset instructions have been sent."
                .to_string(),
            token,
        })
    }

    #[instrument(skip(self, input))]
    pub async fn confirm_password_reset(
        &self,
        input: PasswordResetConfirmRequest,
    ) -> Result<DetailResponse, ServiceError> {
        input.validate()?;
        let invalid = || ServiceError::BadRequest("Invalid or expired token.".to_string());

        let reset = password_reset_token::Entity::find()
            .filter(password_reset_token::Column::Token.eq(input.token.as_str()))
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(invalid)?;

        if reset.is_used || reset.is_expired() {
            return Err(invalid());
        }

        let user = find_or_404::<user::Entity, _>(&*self.db, reset.user_id, "User").await?;
        let user_id = user.id;
        let mut active: user::ActiveModel = user.into();
        active.password_hash = Set(hash_password(&input.password)?);
        active
            .update(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        let mut used: password_reset_token::ActiveModel = reset.into();
        used.is_used = Set(true);
        used.update(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        self.auth.revoke_user_refresh_tokens(user_id).await?;
        info!(user_id = %user_id, "Password reset completed");
        Ok(DetailResponse {
            detail: "Password has been reset.".to_string(),
        })
    }

    async fn me_response(&self, user: user::Model) -> Result<MeResponse, ServiceError> {
        let profile = self.profiles.for_user(user.id).await?;
        Ok(MeResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            profile,
        })
    }
}

fn reset_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RESET_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(password: &str, confirm: &str) -> RegisterRequest {
        RegisterRequest {
            username: "mina".into(),
            email: "mina@farjad.com".into(),
            first_name: "Mina".into(),
            last_name: String::new(),
            phone: String::new(),
            password: password.into(),
            password_confirm: confirm.into(),
        }
    }

    #[test]
    fn mismatched_passwords_are_reported() {
        let err = register("password-1", "password-2").validate().unwrap_err();
        let message = ServiceError::from(err).to_string();
        assert!(message.contains("Passwords don't match."), "{message}");
        assert!(register("password-1", "password-1").validate().is_ok());
    }

    #[test]
    fn reset_tokens_are_long_and_distinct() {
        let a = reset_token();
        assert_eq!(a.len(), RESET_TOKEN_LENGTH);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, reset_token());
    }

    #[test]
    fn full_me_update_sets_every_editable_field() {
        let update = UpdateMeRequest::from(MeRequest {
            email: "new@farjad.com".into(),
            first_name: "N".into(),
            last_name: "M".into(),
            phone: String::new(),
        });
        assert_eq!(update.email.as_deref(), Some("new@farjad.com"));
        assert_eq!(update.phone.as_deref(), Some(""));
    }
}
