use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    auth::is_valid_permission,
    common::patch,
    db::{ListParams, OrderingSpec, Page, QueryBuilder, SearchBuilder},
    entities::accounts::{role, role_permission},
    errors::ServiceError,
    services::{delete_or_404, find_or_404},
};

fn default_true() -> bool {
    true
}

fn permission_format(permission: &str) -> Result<(), ValidationError> {
    if is_valid_permission(permission) {
        Ok(())
    } else {
        let mut err = ValidationError::new("permission");
        err.message = Some("Permissions look like `resource:action`.".into());
        Err(err)
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateRoleRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateRoleRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl From<CreateRoleRequest> for UpdateRoleRequest {
    fn from(req: CreateRoleRequest) -> Self {
        Self {
            name: Some(req.name),
            description: Some(req.description),
            is_active: Some(req.is_active),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct GrantPermissionRequest {
    #[validate(custom = "permission_format")]
    pub permission: String,
    #[serde(default = "default_true")]
    pub granted: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RevokePermissionRequest {
    #[validate(length(min = 1))]
    pub permission: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoleResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    /// Granted `resource:action` strings
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RoleResponse {
    fn build(model: role::Model, permissions: Vec<String>) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            is_active: model.is_active,
            permissions,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RoleFilters {
    pub is_active: Option<bool>,
}

fn ordering() -> OrderingSpec {
    OrderingSpec::new()
        .field("name", role::Column::Name)
        .field("created_at", role::Column::CreatedAt)
        .default_asc(role::Column::Name)
}

#[derive(Clone)]
pub struct RoleService {
    db: Arc<DatabaseConnection>,
}

impl RoleService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: &ListParams,
        filters: RoleFilters,
    ) -> Result<Page<RoleResponse>, ServiceError> {
        let search = SearchBuilder::new(params.search.as_deref())
            .field(role::Column::Name)
            .field(role::Column::Description);

        let page = QueryBuilder::new(role::Entity::find())
            .filter_eq(role::Column::IsActive, filters.is_active)
            .list(params, search, &ordering())
            .fetch(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        let mut grants = self
            .granted_permissions(page.items.iter().map(|r| r.id).collect())
            .await?;
        Ok(page.map(|r| {
            let permissions = grants.remove(&r.id).unwrap_or_default();
            RoleResponse::build(r, permissions)
        }))
    }

    pub async fn get(&self, id: Uuid) -> Result<RoleResponse, ServiceError> {
        let model = find_or_404::<role::Entity, _>(&*self.db, id, "Role").await?;
        self.respond(model).await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: CreateRoleRequest) -> Result<RoleResponse, ServiceError> {
        input.validate()?;
        let model = role::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            is_active: Set(input.is_active),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(role_id = %model.id, "Role created");
        Ok(RoleResponse::build(model, Vec::new()))
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateRoleRequest) -> Result<RoleResponse, ServiceError> {
        input.validate()?;
        let existing = find_or_404::<role::Entity, _>(&*self.db, id, "Role").await?;

        let mut active: role::ActiveModel = existing.into();
        patch(&mut active.name, input.name);
        patch(&mut active.description, input.description);
        patch(&mut active.is_active, input.is_active);

        let model = active
            .update(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        info!(role_id = %id, "Role updated");
        self.respond(model).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        delete_or_404::<role::Entity, _>(&*self.db, id, "Role").await?;
        info!(role_id = %id, "Role deleted");
        Ok(())
    }

    /// Adds a grant, or flips the `granted` flag of an existing one
    #[instrument(skip(self, input), fields(permission = %input.permission))]
    pub async fn grant(
        &self,
        role_id: Uuid,
        input: GrantPermissionRequest,
    ) -> Result<RoleResponse, ServiceError> {
        input.validate()?;
        let role = find_or_404::<role::Entity, _>(&*self.db, role_id, "Role").await?;

        let existing = role_permission::Entity::find()
            .filter(role_permission::Column::RoleId.eq(role_id))
            .filter(role_permission::Column::Permission.eq(input.permission.as_str()))
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        match existing {
            Some(grant) => {
                let mut active: role_permission::ActiveModel = grant.into();
                active.granted = Set(input.granted);
                active.update(&*self.db).await
            }
            None => {
                role_permission::ActiveModel {
                    role_id: Set(role_id),
                    permission: Set(input.permission.clone()),
                    granted: Set(input.granted),
                    ..Default::default()
                }
                .insert(&*self.db)
                .await
            }
        }
        .map_err(ServiceError::db_error)?;

        info!(role_id = %role_id, "Permission granted");
        self.respond(role).await
    }

    #[instrument(skip(self, input), fields(permission = %input.permission))]
    pub async fn revoke(
        &self,
        role_id: Uuid,
        input: RevokePermissionRequest,
    ) -> Result<RoleResponse, ServiceError> {
        input.validate()?;
        let role = find_or_404::<role::Entity, _>(&*self.db, role_id, "Role").await?;

        let result = role_permission::Entity::delete_many()
            .filter(role_permission::Column::RoleId.eq(role_id))
            .filter(role_permission::Column::Permission.eq(input.permission.as_str()))
            .exec(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Permission {} is not granted to role {}",
                input.permission, role.name
            )));
        }
        info!(role_id = %role_id, "Permission revoked");
        self.respond(role).await
    }

    async fn respond(&self, model: role::Model) -> Result<RoleResponse, ServiceError> {
        let permissions = self
            .granted_permissions(vec![model.id])
            .await?
            .remove(&model.id)
            .unwrap_or_default();
        Ok(RoleResponse::build(model, permissions))
    }

    async fn granted_permissions(
        &self,
        role_ids: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, Vec<String>>, ServiceError> {
        if role_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = role_permission::Entity::find()
            .filter(role_permission::Column::RoleId.is_in(role_ids))
            .filter(role_permission::Column::Granted.eq(true))
            .order_by_asc(role_permission::Column::Permission)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        let mut grouped: HashMap<Uuid, Vec<String>> = HashMap::new();
        for row in rows {
            grouped.entry(row.role_id).or_default().push(row.permission);
        }
        Ok(grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("invoices:read", true)]
    #[case("service_requests:*", true)]
    #[case("*", true)]
    #[case("invoices", false)]
    #[case("invoices:launch", false)]
    fn grant_requests_check_permission_shape(#[case] permission: &str, #[case] ok: bool) {
        let req = GrantPermissionRequest {
            permission: permission.to_string(),
            granted: true,
        };
        assert_eq!(req.validate().is_ok(), ok);
    }
}
