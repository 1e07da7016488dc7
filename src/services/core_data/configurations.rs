use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::patch,
    db::{ListParams, OrderingSpec, Page, QueryBuilder, SearchBuilder},
    entities::core_data::system_configuration,
    errors::ServiceError,
    services::{delete_or_404, find_or_404},
};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateConfigurationRequest {
    #[validate(length(min = 1, max = 100))]
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateConfigurationRequest {
    #[validate(length(min = 1, max = 100))]
    pub key: Option<String>,
    pub value: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl From<CreateConfigurationRequest> for UpdateConfigurationRequest {
    fn from(req: CreateConfigurationRequest) -> Self {
        Self {
            key: Some(req.key),
            value: Some(req.value),
            description: Some(req.description),
            is_active: Some(req.is_active),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConfigurationResponse {
    pub id: Uuid,
    pub key: String,
    pub value: String,
    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<system_configuration::Model> for ConfigurationResponse {
    fn from(model: system_configuration::Model) -> Self {
        Self {
            id: model.id,
            key: model.key,
            value: model.value,
            description: model.description,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConfigurationFilters {
    pub is_active: Option<bool>,
}

fn ordering() -> OrderingSpec {
    OrderingSpec::new()
        .field("key", system_configuration::Column::Key)
        .field("created_at", system_configuration::Column::CreatedAt)
        .default_asc(system_configuration::Column::Key)
}

/// Runtime key/value settings
#[derive(Clone)]
pub struct ConfigurationService {
    db: Arc<DatabaseConnection>,
}

impl ConfigurationService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: &ListParams,
        filters: ConfigurationFilters,
    ) -> Result<Page<ConfigurationResponse>, ServiceError> {
        let search = SearchBuilder::new(params.search.as_deref())
            .field(system_configuration::Column::Key)
            .field(system_configuration::Column::Description);

        let page = QueryBuilder::new(system_configuration::Entity::find())
            .filter_eq(system_configuration::Column::IsActive, filters.is_active)
            .list(params, search, &ordering())
            .fetch(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(page.map(ConfigurationResponse::from))
    }

    pub async fn get(&self, id: Uuid) -> Result<ConfigurationResponse, ServiceError> {
        Ok(
            find_or_404::<system_configuration::Entity, _>(&*self.db, id, "Configuration")
                .await?
                .into(),
        )
    }

    #[instrument(skip(self, input), fields(key = %input.key))]
    pub async fn create(
        &self,
        input: CreateConfigurationRequest,
    ) -> Result<ConfigurationResponse, ServiceError> {
        input.validate()?;
        let model = system_configuration::ActiveModel {
            key: Set(input.key),
            value: Set(input.value),
            description: Set(input.description),
            is_active: Set(input.is_active),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(configuration_id = %model.id, "Configuration created");
        Ok(model.into())
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateConfigurationRequest,
    ) -> Result<ConfigurationResponse, ServiceError> {
        input.validate()?;
        let existing =
            find_or_404::<system_configuration::Entity, _>(&*self.db, id, "Configuration").await?;

        let mut active: system_configuration::ActiveModel = existing.into();
        patch(&mut active.key, input.key);
        patch(&mut active.value, input.value);
        patch(&mut active.description, input.description);
        patch(&mut active.is_active, input.is_active);

        let model = active
            .update(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        info!(configuration_id = %id, "Configuration updated");
        Ok(model.into())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        delete_or_404::<system_configuration::Entity, _>(&*self.db, id, "Configuration").await?;
        info!(configuration_id = %id, "Configuration deleted");
        Ok(())
    }
}
