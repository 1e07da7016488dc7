use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{current, nullable, patch},
    db::{ListParams, OrderingSpec, Page, QueryBuilder, SearchBuilder},
    entities::core_data::{address, company, contact, AddressType},
    errors::ServiceError,
    services::{delete_or_404, ensure_exists_opt, find_or_404, lookups},
};

fn default_address_type() -> AddressType {
    AddressType::Billing
}

fn default_country() -> String {
    "Iran".to_string()
}

/// An address belongs to exactly one contact or one company
pub fn check_owner(contact_id: Option<Uuid>, company_id: Option<Uuid>) -> Result<(), ServiceError> {
    match (contact_id, company_id) {
        (None, None) => Err(ServiceError::ValidationError(
            "Either contact or company must be specified.".to_string(),
        )),
        (Some(_), Some(_)) => Err(ServiceError::ValidationError(
            "Cannot specify both contact and company.".to_string(),
        )),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAddressRequest {
    pub contact_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    #[serde(default = "default_address_type")]
    pub address_type: AddressType,
    #[validate(length(min = 1))]
    pub street_address: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub state: String,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub postal_code: String,
    #[serde(default = "default_country")]
    #[validate(length(max = 100))]
    pub country: String,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAddressRequest {
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<Uuid>)]
    pub contact_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<Uuid>)]
    pub company_id: Option<Option<Uuid>>,
    pub address_type: Option<AddressType>,
    #[validate(length(min = 1))]
    pub street_address: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub state: Option<String>,
    #[validate(length(max = 20))]
    pub postal_code: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
    pub is_primary: Option<bool>,
}

impl From<CreateAddressRequest> for UpdateAddressRequest {
    fn from(req: CreateAddressRequest) -> Self {
        Self {
            contact_id: Some(req.contact_id),
            company_id: Some(req.company_id),
            address_type: Some(req.address_type),
            street_address: Some(req.street_address),
            city: Some(req.city),
            state: Some(req.state),
            postal_code: Some(req.postal_code),
            country: Some(req.country),
            is_primary: Some(req.is_primary),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddressResponse {
    pub id: Uuid,
    pub contact_id: Option<Uuid>,
    pub contact_name: Option<String>,
    pub company_id: Option<Uuid>,
    pub company_name: Option<String>,
    pub address_type: AddressType,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AddressResponse {
    fn build(model: address::Model, contacts: &lookups::Labels, companies: &lookups::Labels) -> Self {
        Self {
            contact_name: lookups::label(contacts, model.contact_id),
            company_name: lookups::label(companies, model.company_id),
            id: model.id,
            contact_id: model.contact_id,
            company_id: model.company_id,
            address_type: model.address_type,
            street_address: model.street_address,
            city: model.city,
            state: model.state,
            postal_code: model.postal_code,
            country: model.country,
            is_primary: model.is_primary,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AddressFilters {
    pub address_type: Option<AddressType>,
    pub is_primary: Option<bool>,
    pub contact: Option<Uuid>,
    pub company: Option<Uuid>,
}

fn ordering() -> OrderingSpec {
    OrderingSpec::new()
        .field("city", address::Column::City)
        .field("created_at", address::Column::CreatedAt)
        .default_asc(address::Column::City)
        .default_asc(address::Column::StreetAddress)
}

#[derive(Clone)]
pub struct AddressService {
    db: Arc<DatabaseConnection>,
}

impl AddressService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: &ListParams,
        filters: AddressFilters,
    ) -> Result<Page<AddressResponse>, ServiceError> {
        let search = SearchBuilder::new(params.search.as_deref())
            .field(address::Column::StreetAddress)
            .field(address::Column::City)
            .field(address::Column::State)
            .field(address::Column::PostalCode);

        let page = QueryBuilder::new(address::Entity::find())
            .filter_eq(address::Column::AddressType, filters.address_type)
            .filter_eq(address::Column::IsPrimary, filters.is_primary)
            .filter_eq(address::Column::ContactId, filters.contact)
            .filter_eq(address::Column::CompanyId, filters.company)
            .list(params, search, &ordering())
            .fetch(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        let contacts = lookups::contact_names(&*self.db, page.items.iter().map(|a| a.contact_id))
            .await
            .map_err(ServiceError::db_error)?;
        let companies = lookups::company_names(&*self.db, page.items.iter().map(|a| a.company_id))
            .await
            .map_err(ServiceError::db_error)?;

        Ok(page.map(|a| AddressResponse::build(a, &contacts, &companies)))
    }

    pub async fn get(&self, id: Uuid) -> Result<AddressResponse, ServiceError> {
        let model = find_or_404::<address::Entity, _>(&*self.db, id, "Address").await?;
        self.respond(model).await
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CreateAddressRequest) -> Result<AddressResponse, ServiceError> {
        input.validate()?;
        check_owner(input.contact_id, input.company_id)?;
        self.check_references(input.contact_id, input.company_id).await?;

        let model = address::ActiveModel {
            contact_id: Set(input.contact_id),
            company_id: Set(input.company_id),
            address_type: Set(input.address_type),
            street_address: Set(input.street_address),
            city: Set(input.city),
            state: Set(input.state),
            postal_code: Set(input.postal_code),
            country: Set(input.country),
            is_primary: Set(input.is_primary),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(address_id = %model.id, "Address created");
        self.respond(model).await
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateAddressRequest,
    ) -> Result<AddressResponse, ServiceError> {
        input.validate()?;
        let existing = find_or_404::<address::Entity, _>(&*self.db, id, "Address").await?;

        let mut active: address::ActiveModel = existing.into();
        patch(&mut active.contact_id, input.contact_id);
        patch(&mut active.company_id, input.company_id);
        let (contact_id, company_id) = (
            current(&active.contact_id).flatten(),
            current(&active.company_id).flatten(),
        );
        check_owner(contact_id, company_id)?;
        self.check_references(contact_id, company_id).await?;
        patch(&mut active.address_type, input.address_type);
        patch(&mut active.street_address, input.street_address);
        patch(&mut active.city, input.city);
        patch(&mut active.state, input.state);
        patch(&mut active.postal_code, input.postal_code);
        patch(&mut active.country, input.country);
        patch(&mut active.is_primary, input.is_primary);

        let model = active
            .update(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        info!(address_id = %id, "Address updated");
        self.respond(model).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        delete_or_404::<address::Entity, _>(&*self.db, id, "Address").await?;
        info!(address_id = %id, "Address deleted");
        Ok(())
    }

    async fn check_references(
        &self,
        contact_id: Option<Uuid>,
        company_id: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        ensure_exists_opt::<contact::Entity, _>(&*self.db, contact_id, "contact_id").await?;
        ensure_exists_opt::<company::Entity, _>(&*self.db, company_id, "company_id").await
    }

    async fn respond(&self, model: address::Model) -> Result<AddressResponse, ServiceError> {
        let contacts = lookups::contact_names(&*self.db, [model.contact_id])
            .await
            .map_err(ServiceError::db_error)?;
        let companies = lookups::company_names(&*self.db, [model.company_id])
            .await
            .map_err(ServiceError::db_error)?;
        Ok(AddressResponse::build(model, &contacts, &companies))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn owner_must_be_exactly_one() {
        let id = Some(Uuid::new_v4());
        assert!(check_owner(id, None).is_ok());
        assert!(check_owner(None, id).is_ok());
        assert_matches!(
            check_owner(None, None),
            Err(ServiceError::ValidationError(msg)) if msg == "Either contact or company must be specified."
        );
        assert_matches!(
            check_owner(id, id),
            Err(ServiceError::ValidationError(msg)) if msg == "Cannot specify both contact and company."
        );
    }
}
