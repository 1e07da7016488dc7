use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    db::{ListParams, OrderingSpec, Page, QueryBuilder, SearchBuilder},
    entities::accounts::{role, role_permission},
    errors::ServiceError,
    services::{find_or_404, lookups},
};

/// Read-only view of a role grant
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PermissionResponse {
    pub id: Uuid,
    pub role_id: Uuid,
    pub role_name: Option<String>,
    pub permission: String,
    pub resource: String,
    pub action: String,
    pub granted: bool,
    pub created_at: DateTime<Utc>,
}

impl PermissionResponse {
    fn build(model: role_permission::Model, role_names: &lookups::Labels) -> Self {
        Self {
            role_name: role_names.get(&model.role_id).cloned(),
            resource: model.resource().to_string(),
            action: model.action().to_string(),
            id: model.id,
            role_id: model.role_id,
            permission: model.permission,
            granted: model.granted,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PermissionFilters {
    pub role: Option<Uuid>,
    pub granted: Option<bool>,
}

fn ordering() -> OrderingSpec {
    OrderingSpec::new()
        .field("permission", role_permission::Column::Permission)
        .field("created_at", role_permission::Column::CreatedAt)
        .default_desc(role_permission::Column::CreatedAt)
}

#[derive(Clone)]
pub struct PermissionService {
    db: Arc<DatabaseConnection>,
}

impl PermissionService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: &ListParams,
        filters: PermissionFilters,
    ) -> Result<Page<PermissionResponse>, ServiceError> {
        let search = SearchBuilder::new(params.search.as_deref())
            .field(role_permission::Column::Permission);

        let page = QueryBuilder::new(role_permission::Entity::find())
            .filter_eq(role_permission::Column::RoleId, filters.role)
            .filter_eq(role_permission::Column::Granted, filters.granted)
            .list(params, search, &ordering())
            .fetch(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        let names = self.role_names(page.items.iter().map(|p| p.role_id)).await?;
        Ok(page.map(|p| PermissionResponse::build(p, &names)))
    }

    pub async fn get(&self, id: Uuid) -> Result<PermissionResponse, ServiceError> {
        let model =
            find_or_404::<role_permission::Entity, _>(&*self.db, id, "Permission").await?;
        let names = self.role_names([model.role_id]).await?;
        Ok(PermissionResponse::build(model, &names))
    }

    async fn role_names(
        &self,
        ids: impl IntoIterator<Item = Uuid>,
    ) -> Result<lookups::Labels, ServiceError> {
        lookups::lookup::<role::Entity, _, _, _, _>(&*self.db, role::Column::Id, ids, |r| {
            (r.id, r.name)
        })
        .await
        .map_err(ServiceError::db_error)
    }
}
