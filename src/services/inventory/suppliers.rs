use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{blank_or_email, patch, validate_phone},
    db::{ListParams, OrderingSpec, Page, QueryBuilder, SearchBuilder},
    entities::inventory::supplier,
    errors::ServiceError,
    services::{delete_or_404, find_or_404},
};

fn default_true() -> bool {
    true
}

fn default_country() -> String {
    "Iran".to_string()
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateSupplierRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub contact_person: String,
    #[serde(default)]
    #[validate(custom = "blank_or_email")]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 17), custom = "validate_phone")]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub city: String,
    #[serde(default = "default_country")]
    #[validate(length(max = 100))]
    pub country: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub tax_id: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub payment_terms: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateSupplierRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 100))]
    pub contact_person: Option<String>,
    #[validate(custom = "blank_or_email")]
    pub email: Option<String>,
    #[validate(length(max = 17), custom = "validate_phone")]
    pub phone: Option<String>,
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
    #[validate(length(max = 50))]
    pub tax_id: Option<String>,
    #[validate(length(max = 100))]
    pub payment_terms: Option<String>,
    pub is_active: Option<bool>,
}

impl From<CreateSupplierRequest> for UpdateSupplierRequest {
    fn from(req: CreateSupplierRequest) -> Self {
        Self {
            name: Some(req.name),
            contact_person: Some(req.contact_person),
            email: Some(req.email),
            phone: Some(req.phone),
            address: Some(req.address),
            city: Some(req.city),
            country: Some(req.country),
            tax_id: Some(req.tax_id),
            payment_terms: Some(req.payment_terms),
            is_active: Some(req.is_active),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SupplierResponse {
    pub id: Uuid,
    pub name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub tax_id: String,
    pub payment_terms: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<supplier::Model> for SupplierResponse {
    fn from(model: supplier::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            contact_person: model.contact_person,
            email: model.email,
            phone: model.phone,
            address: model.address,
            city: model.city,
            country: model.country,
            tax_id: model.tax_id,
            payment_terms: model.payment_terms,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SupplierFilters {
    pub is_active: Option<bool>,
}

fn ordering() -> OrderingSpec {
    OrderingSpec::new()
        .field("name", supplier::Column::Name)
        .field("created_at", supplier::Column::CreatedAt)
        .default_asc(supplier::Column::Name)
}

#[derive(Clone)]
pub struct SupplierService {
    db: Arc<DatabaseConnection>,
}

impl SupplierService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: &ListParams,
        filters: SupplierFilters,
    ) -> Result<Page<SupplierResponse>, ServiceError> {
        let search = SearchBuilder::new(params.search.as_deref())
            .field(supplier::Column::Name)
            .field(supplier::Column::ContactPerson)
            .field(supplier::Column::Email)
            .field(supplier::Column::City);

        let page = QueryBuilder::new(supplier::Entity::find())
            .filter_eq(supplier::Column::IsActive, filters.is_active)
            .list(params, search, &ordering())
            .fetch(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(page.map(SupplierResponse::from))
    }

    pub async fn get(&self, id: Uuid) -> Result<SupplierResponse, ServiceError> {
        Ok(find_or_404::<supplier::Entity, _>(&*self.db, id, "Supplier").await?.into())
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: CreateSupplierRequest) -> Result<SupplierResponse, ServiceError> {
        input.validate()?;
        let model = supplier::ActiveModel {
            name: Set(input.name),
            contact_person: Set(input.contact_person),
            email: Set(input.email),
            phone: Set(input.phone),
            address: Set(input.address),
            city: Set(input.city),
            country: Set(input.country),
            tax_id: Set(input.tax_id),
            payment_terms: Set(input.payment_terms),
            is_active: Set(input.is_active),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(supplier_id = %model.id, "Supplier created");
        Ok(model.into())
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateSupplierRequest,
    ) -> Result<SupplierResponse, ServiceError> {
        input.validate()?;
        let existing = find_or_404::<supplier::Entity, _>(&*self.db, id, "Supplier").await?;

        let mut active: supplier::ActiveModel = existing.into();
        patch(&mut active.name, input.name);
        patch(&mut active.contact_person, input.contact_person);
        patch(&mut active.email, input.email);
        patch(&mut active.phone, input.phone);
        patch(&mut active.address, input.address);
        patch(&mut active.city, input.city);
        patch(&mut active.country, input.country);
        patch(&mut active.tax_id, input.tax_id);
        patch(&mut active.payment_terms, input.payment_terms);
        patch(&mut active.is_active, input.is_active);

        let model = active
            .update(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        info!(supplier_id = %id, "Supplier updated");
        Ok(model.into())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        delete_or_404::<supplier::Entity, _>(&*self.db, id, "Supplier").await?;
        info!(supplier_id = %id, "Supplier deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_defaults_to_iran() {
        let req: CreateSupplierRequest =
            serde_json::from_value(serde_json::json!({ "name": "Pars Parts" })).unwrap();
        assert_eq!(req.country, "Iran");
        assert!(req.is_active);
        assert!(req.validate().is_ok());
    }
}
