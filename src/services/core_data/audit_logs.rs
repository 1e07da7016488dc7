use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    db::{ListParams, OrderingSpec, Page, QueryBuilder, SearchBuilder},
    entities::core_data::{audit_log, AuditAction},
    errors::ServiceError,
    services::{find_or_404, lookups},
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditLogResponse {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub user_name: Option<String>,
    pub action: AuditAction,
    pub model_name: String,
    pub object_id: String,
    pub object_repr: String,
    #[schema(value_type = Option<Object>)]
    pub changes: Option<Json>,
    pub ip_address: Option<String>,
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
}

impl AuditLogResponse {
    fn build(model: audit_log::Model, users: &lookups::Labels) -> Self {
        Self {
            user_name: lookups::label(users, model.user_id),
            id: model.id,
            user_id: model.user_id,
            action: model.action,
            model_name: model.model_name,
            object_id: model.object_id,
            object_repr: model.object_repr,
            changes: model.changes,
            ip_address: model.ip_address,
            user_agent: model.user_agent,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuditLogFilters {
    pub action: Option<AuditAction>,
    pub model_name: Option<String>,
    pub user: Option<Uuid>,
}

fn ordering() -> OrderingSpec {
    OrderingSpec::new()
        .field("created_at", audit_log::Column::CreatedAt)
        .default_desc(audit_log::Column::CreatedAt)
}

/// Read side of the audit trail; entries are written by [`crate::services::audit::AuditService`]
#[derive(Clone)]
pub struct AuditLogService {
    db: Arc<DatabaseConnection>,
}

impl AuditLogService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: &ListParams,
        filters: AuditLogFilters,
    ) -> Result<Page<AuditLogResponse>, ServiceError> {
        let search = SearchBuilder::new(params.search.as_deref())
            .field(audit_log::Column::ObjectRepr)
            .field(audit_log::Column::IpAddress);

        let page = QueryBuilder::new(audit_log::Entity::find())
            .filter_eq(audit_log::Column::Action, filters.action)
            .filter_eq(audit_log::Column::ModelName, filters.model_name)
            .filter_eq(audit_log::Column::UserId, filters.user)
            .list(params, search, &ordering())
            .fetch(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        let users = lookups::user_names(&*self.db, page.items.iter().map(|l| l.user_id))
            .await
            .map_err(ServiceError::db_error)?;
        Ok(page.map(|l| AuditLogResponse::build(l, &users)))
    }

    pub async fn get(&self, id: Uuid) -> Result<AuditLogResponse, ServiceError> {
        let model = find_or_404::<audit_log::Entity, _>(&*self.db, id, "Audit log").await?;
        let users = lookups::user_names(&*self.db, [model.user_id])
            .await
            .map_err(ServiceError::db_error)?;
        Ok(AuditLogResponse::build(model, &users))
    }
}
