use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::hash_password,
    common::{patch, validate_phone},
    db::{ListParams, OrderingSpec, Page, QueryBuilder, SearchBuilder},
    entities::accounts::{role, user, user_role},
    errors::ServiceError,
    services::{delete_or_404, find_or_404, lookups, Actor},
};

fn default_true() -> bool {
    true
}

/// Admin-facing user creation
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
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
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 150))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    #[validate(length(max = 17), custom = "validate_phone")]
    pub phone: Option<String>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
}

impl From<CreateUserRequest> for UpdateUserRequest {
    fn from(req: CreateUserRequest) -> Self {
        Self {
            username: Some(req.username),
            email: Some(req.email),
            first_name: Some(req.first_name),
            last_name: Some(req.last_name),
            phone: Some(req.phone),
            password: Some(req.password),
            is_active: Some(req.is_active),
            is_verified: Some(req.is_verified),
            is_staff: Some(req.is_staff),
            is_superuser: Some(req.is_superuser),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub phone: String,
    pub is_active: bool,
    pub is_verified: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub last_login_ip: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            full_name: model.full_name(),
            id: model.id,
            username: model.username,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            phone: model.phone,
            is_active: model.is_active,
            is_verified: model.is_verified,
            is_staff: model.is_staff,
            is_superuser: model.is_superuser,
            date_joined: model.date_joined,
            last_login: model.last_login,
            last_login_ip: model.last_login_ip,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserFilters {
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AssignRoleRequest {
    pub role_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserRoleResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role_id: Uuid,
    pub role_name: Option<String>,
    pub assigned_at: DateTime<Utc>,
    pub assigned_by: Option<Uuid>,
    pub is_active: bool,
}

fn ordering() -> OrderingSpec {
    OrderingSpec::new()
        .field("first_name", user::Column::FirstName)
        .field("last_name", user::Column::LastName)
        .field("date_joined", user::Column::DateJoined)
        .default_asc(user::Column::LastName)
        .default_asc(user::Column::FirstName)
}

#[derive(Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: &ListParams,
        filters: UserFilters,
    ) -> Result<Page<UserResponse>, ServiceError> {
        let search = SearchBuilder::new(params.search.as_deref())
            .field(user::Column::FirstName)
            .field(user::Column::LastName)
            .field(user::Column::Email)
            .field(user::Column::Username);

        let page = QueryBuilder::new(user::Entity::find())
            .filter_eq(user::Column::IsActive, filters.is_active)
            .filter_eq(user::Column::IsVerified, filters.is_verified)
            .list(params, search, &ordering())
            .fetch(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(page.map(UserResponse::from))
    }

    pub async fn get(&self, id: Uuid) -> Result<UserResponse, ServiceError> {
        Ok(find_or_404::<user::Entity, _>(&*self.db, id, "User").await?.into())
    }

    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn create(&self, input: CreateUserRequest) -> Result<UserResponse, ServiceError> {
        input.validate()?;
        let model = insert_user(&self.db, input).await?;
        info!(user_id = %model.id, "User created");
        Ok(model.into())
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateUserRequest,
    ) -> Result<UserResponse, ServiceError> {
        input.validate()?;
        let existing = find_or_404::<user::Entity, _>(&*self.db, id, "User").await?;

        let mut active: user::ActiveModel = existing.into();
        patch(&mut active.username, input.username);
        patch(&mut active.email, input.email);
        patch(&mut active.first_name, input.first_name);
        patch(&mut active.last_name, input.last_name);
        patch(&mut active.phone, input.phone);
        patch(&mut active.is_active, input.is_active);
        patch(&mut active.is_verified, input.is_verified);
        patch(&mut active.is_staff, input.is_staff);
        patch(&mut active.is_superuser, input.is_superuser);
        if let Some(password) = input.password {
            active.password_hash = Set(hash_password(&password)?);
        }

        let model = active
            .update(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        info!(user_id = %id, "User updated");
        Ok(model.into())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        delete_or_404::<user::Entity, _>(&*self.db, id, "User").await?;
        info!(user_id = %id, "User deleted");
        Ok(())
    }

    pub async fn roles(&self, user_id: Uuid) -> Result<Vec<UserRoleResponse>, ServiceError> {
        find_or_404::<user::Entity, _>(&*self.db, user_id, "User").await?;

        let assignments = user_role::Entity::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .order_by_desc(user_role::Column::AssignedAt)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        let names = lookups::lookup::<role::Entity, _, _, _, _>(
            &*self.db,
            role::Column::Id,
            assignments.iter().map(|a| a.role_id),
            |r| (r.id, r.name),
        )
        .await
        .map_err(ServiceError::db_error)?;

        Ok(assignments
            .into_iter()
            .map(|a| user_role_response(a, &names))
            .collect())
    }

    /// Assigns a role, reactivating a previously disabled assignment
    #[instrument(skip(self, actor))]
    pub async fn assign_role(
        &self,
        user_id: Uuid,
        input: AssignRoleRequest,
        actor: &Actor,
    ) -> Result<UserRoleResponse, ServiceError> {
        find_or_404::<user::Entity, _>(&*self.db, user_id, "User").await?;
        let role = find_or_404::<role::Entity, _>(&*self.db, input.role_id, "Role").await?;

        let existing = user_role::Entity::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .filter(user_role::Column::RoleId.eq(role.id))
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        let model = match existing {
            Some(assignment) if assignment.is_active => {
                return Err(ServiceError::Conflict(format!(
                    "Role {} is already assigned to this user",
                    role.name
                )));
            }
            Some(assignment) => {
                let mut active: user_role::ActiveModel = assignment.into();
                active.is_active = Set(true);
                active.assigned_by = Set(actor.user_id);
                active.assigned_at = Set(Utc::now());
                active.update(&*self.db).await
            }
            None => {
                user_role::ActiveModel {
                    user_id: Set(user_id),
                    role_id: Set(role.id),
                    assigned_by: Set(actor.user_id),
                    is_active: Set(true),
                    ..Default::default()
                }
                .insert(&*self.db)
                .await
            }
        }
        .map_err(ServiceError::db_error)?;

        info!(user_id = %user_id, role = %role.name, "Role assigned");
        let names = [(role.id, role.name)].into_iter().collect();
        Ok(user_role_response(model, &names))
    }

    #[instrument(skip(self))]
    pub async fn remove_role(&self, user_id: Uuid, role_id: Uuid) -> Result<(), ServiceError> {
        let result = user_role::Entity::delete_many()
            .filter(user_role::Column::UserId.eq(user_id))
            .filter(user_role::Column::RoleId.eq(role_id))
            .exec(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Role {role_id} is not assigned to user {user_id}"
            )));
        }
        info!(user_id = %user_id, role_id = %role_id, "Role removed");
        Ok(())
    }
}

/// Shared by the admin resource and self-registration
pub(crate) async fn insert_user(
    db: &DatabaseConnection,
    input: CreateUserRequest,
) -> Result<user::Model, ServiceError> {
    user::ActiveModel {
        username: Set(input.username),
        email: Set(input.email),
        first_name: Set(input.first_name),
        last_name: Set(input.last_name),
        phone: Set(input.phone),
        password_hash: Set(hash_password(&input.password)?),
        is_active: Set(input.is_active),
        is_verified: Set(input.is_verified),
        is_staff: Set(input.is_staff),
        is_superuser: Set(input.is_superuser),
        last_login: Set(None),
        last_login_ip: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(ServiceError::db_error)
}

fn user_role_response(model: user_role::Model, names: &lookups::Labels) -> UserRoleResponse {
    UserRoleResponse {
        role_name: names.get(&model.role_id).cloned(),
        id: model.id,
        user_id: model.user_id,
        role_id: model.role_id,
        assigned_at: model.assigned_at,
        assigned_by: model.assigned_by,
        is_active: model.is_active,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateUserRequest {
        serde_json::from_value(serde_json::json!({
            "username": "reza",
            "email": "reza@farjad.com",
            "password": "long-enough"
        }))
        .unwrap()
    }

    #[test]
    fn create_defaults_to_active_unprivileged_user() {
        let req = request();
        assert!(req.is_active);
        assert!(!req.is_staff && !req.is_superuser && !req.is_verified);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn short_password_and_bad_phone_are_rejected() {
        let mut req = request();
        req.password = "short".into();
        req.phone = "12-34".into();
        let err = ServiceError::from(req.validate().unwrap_err()).to_string();
        assert!(err.contains("password"));
        assert!(err.contains("phone"));
    }

    #[test]
    fn full_update_carries_every_field() {
        let update = UpdateUserRequest::from(request());
        assert_eq!(update.username.as_deref(), Some("reza"));
        assert_eq!(update.is_active, Some(true));
        assert!(update.password.is_some());
    }
}
