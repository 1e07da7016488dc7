use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{non_negative, patch},
    db::{ListParams, OrderingSpec, Page, QueryBuilder, SearchBuilder},
    entities::field_service::{service_request, service_type},
    errors::ServiceError,
    services::{delete_or_404, ensure_unreferenced, find_or_404},
};

fn default_true() -> bool {
    true
}

fn default_duration() -> i32 {
    60
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateServiceTypeRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(custom = "non_negative")]
    pub base_price: Decimal,
    #[serde(default = "default_duration")]
    #[validate(range(min = 1))]
    pub estimated_duration_minutes: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateServiceTypeRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom = "non_negative")]
    pub base_price: Option<Decimal>,
    #[validate(range(min = 1))]
    pub estimated_duration_minutes: Option<i32>,
    pub is_active: Option<bool>,
}

impl From<CreateServiceTypeRequest> for UpdateServiceTypeRequest {
    fn from(req: CreateServiceTypeRequest) -> Self {
        Self {
            name: Some(req.name),
            description: Some(req.description),
            base_price: Some(req.base_price),
            estimated_duration_minutes: Some(req.estimated_duration_minutes),
            is_active: Some(req.is_active),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceTypeResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub base_price: Decimal,
    pub estimated_duration_minutes: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<service_type::Model> for ServiceTypeResponse {
    fn from(model: service_type::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            base_price: model.base_price,
            estimated_duration_minutes: model.estimated_duration_minutes,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ServiceTypeFilters {
    pub is_active: Option<bool>,
}

fn ordering() -> OrderingSpec {
    OrderingSpec::new()
        .field("name", service_type::Column::Name)
        .field("base_price", service_type::Column::BasePrice)
        .field("created_at", service_type::Column::CreatedAt)
        .default_asc(service_type::Column::Name)
}

/// Catalogue of offered services
#[derive(Clone)]
pub struct ServiceTypeService {
    db: Arc<DatabaseConnection>,
}

impl ServiceTypeService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: &ListParams,
        filters: ServiceTypeFilters,
    ) -> Result<Page<ServiceTypeResponse>, ServiceError> {
        let search = SearchBuilder::new(params.search.as_deref())
            .field(service_type::Column::Name)
            .field(service_type::Column::Description);

        let page = QueryBuilder::new(service_type::Entity::find())
            .filter_eq(service_type::Column::IsActive, filters.is_active)
            .list(params, search, &ordering())
            .fetch(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(page.map(ServiceTypeResponse::from))
    }

    pub async fn get(&self, id: Uuid) -> Result<ServiceTypeResponse, ServiceError> {
        Ok(find_or_404::<service_type::Entity, _>(&*self.db, id, "Service type")
            .await?
            .into())
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(
        &self,
        input: CreateServiceTypeRequest,
    ) -> Result<ServiceTypeResponse, ServiceError> {
        input.validate()?;
        let model = service_type::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            base_price: Set(input.base_price),
            estimated_duration_minutes: Set(input.estimated_duration_minutes),
            is_active: Set(input.is_active),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(service_type_id = %model.id, "Service type created");
        Ok(model.into())
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateServiceTypeRequest,
    ) -> Result<ServiceTypeResponse, ServiceError> {
        input.validate()?;
        let existing = find_or_404::<service_type::Entity, _>(&*self.db, id, "Service type").await?;

        let mut active: service_type::ActiveModel = existing.into();
        patch(&mut active.name, input.name);
        patch(&mut active.description, input.description);
        patch(&mut active.base_price, input.base_price);
        patch(&mut active.estimated_duration_minutes, input.estimated_duration_minutes);
        patch(&mut active.is_active, input.is_active);

        let model = active
            .update(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        info!(service_type_id = %id, "Service type updated");
        Ok(model.into())
    }

    /// Types still referenced by service requests give 409
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        ensure_unreferenced::<service_request::Entity, _>(
            &*self.db,
            service_request::Column::ServiceTypeId,
            id,
            "Service type",
            "service request(s)",
        )
        .await?;
        delete_or_404::<service_type::Entity, _>(&*self.db, id, "Service type").await?;
        info!(service_type_id = %id, "Service type deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn duration_must_be_positive() {
        let req = CreateServiceTypeRequest {
            name: "Boiler repair".into(),
            description: String::new(),
            base_price: dec!(250.00),
            estimated_duration_minutes: 0,
            is_active: true,
        };
        assert!(req.validate().is_err());
        let req = CreateServiceTypeRequest {
            estimated_duration_minutes: 90,
            ..req
        };
        assert!(req.validate().is_ok());
    }
}
