use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Iterable,
    PaginatorTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{patch, validate_phone},
    db::{ListParams, OrderingSpec, Page, QueryBuilder, SearchBuilder},
    entities::{
        core_data::{contact, AuditAction, ContactType},
        field_service::service_request,
        finance::invoice,
    },
    errors::ServiceError,
    services::{audit::AuditService, delete_or_404, ensure_unreferenced, find_or_404, Actor},
};

fn default_true() -> bool {
    true
}

fn default_contact_type() -> ContactType {
    ContactType::Customer
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateContactRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 17), custom = "validate_phone")]
    pub phone: String,
    #[serde(default)]
    #[validate(length(max = 17), custom = "validate_phone")]
    pub mobile: String,
    #[serde(default = "default_contact_type")]
    pub contact_type: ContactType,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateContactRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 17), custom = "validate_phone")]
    pub phone: Option<String>,
    #[validate(length(max = 17), custom = "validate_phone")]
    pub mobile: Option<String>,
    pub contact_type: Option<ContactType>,
    pub is_active: Option<bool>,
    pub notes: Option<String>,
}

impl From<CreateContactRequest> for UpdateContactRequest {
    fn from(req: CreateContactRequest) -> Self {
        Self {
            first_name: Some(req.first_name),
            last_name: Some(req.last_name),
            email: Some(req.email),
            phone: Some(req.phone),
            mobile: Some(req.mobile),
            contact_type: Some(req.contact_type),
            is_active: Some(req.is_active),
            notes: Some(req.notes),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub mobile: String,
    pub contact_type: ContactType,
    pub is_active: bool,
    pub notes: String,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<contact::Model> for ContactResponse {
    fn from(model: contact::Model) -> Self {
        Self {
            full_name: model.full_name(),
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            phone: model.phone,
            mobile: model.mobile,
            contact_type: model.contact_type,
            is_active: model.is_active,
            notes: model.notes,
            created_by: model.created_by,
            updated_by: model.updated_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ContactFilters {
    pub contact_type: Option<ContactType>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ContactStatistics {
    pub total_contacts: u64,
    pub active_contacts: u64,
    pub inactive_contacts: u64,
    /// Count per contact type, including types with no contacts
    pub by_type: BTreeMap<String, u64>,
}

fn ordering() -> OrderingSpec {
    OrderingSpec::new()
        .field("first_name", contact::Column::FirstName)
        .field("last_name", contact::Column::LastName)
        .field("created_at", contact::Column::CreatedAt)
        .default_asc(contact::Column::LastName)
        .default_asc(contact::Column::FirstName)
}

#[derive(Clone)]
pub struct ContactService {
    db: Arc<DatabaseConnection>,
    audit: AuditService,
}

impl ContactService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            audit: AuditService::new(db.clone()),
            db,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: &ListParams,
        filters: ContactFilters,
    ) -> Result<Page<ContactResponse>, ServiceError> {
        let search = SearchBuilder::new(params.search.as_deref())
            .field(contact::Column::FirstName)
            .field(contact::Column::LastName)
            .field(contact::Column::Email)
            .field(contact::Column::Phone);

        let page = QueryBuilder::new(contact::Entity::find())
            .filter_eq(contact::Column::ContactType, filters.contact_type)
            .filter_eq(contact::Column::IsActive, filters.is_active)
            .list(params, search, &ordering())
            .fetch(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(page.map(ContactResponse::from))
    }

    pub async fn get(&self, id: Uuid) -> Result<ContactResponse, ServiceError> {
        Ok(find_or_404::<contact::Entity, _>(&*self.db, id, "Contact").await?.into())
    }

    #[instrument(skip(self, input, actor))]
    pub async fn create(
        &self,
        input: CreateContactRequest,
        actor: &Actor,
    ) -> Result<ContactResponse, ServiceError> {
        input.validate()?;
        let model = contact::ActiveModel {
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            email: Set(input.email),
            phone: Set(input.phone),
            mobile: Set(input.mobile),
            contact_type: Set(input.contact_type),
            is_active: Set(input.is_active),
            notes: Set(input.notes),
            created_by: Set(actor.user_id),
            updated_by: Set(actor.user_id),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(contact_id = %model.id, "Contact created");
        let response = ContactResponse::from(model);
        self.audit
            .record(
                actor,
                AuditAction::Create,
                "Contact",
                response.id,
                &response.full_name,
                serde_json::to_value(&response).ok(),
            )
            .await;
        Ok(response)
    }

    #[instrument(skip(self, input, actor))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateContactRequest,
        actor: &Actor,
    ) -> Result<ContactResponse, ServiceError> {
        input.validate()?;
        let existing = find_or_404::<contact::Entity, _>(&*self.db, id, "Contact").await?;

        let mut active: contact::ActiveModel = existing.into();
        patch(&mut active.first_name, input.first_name);
        patch(&mut active.last_name, input.last_name);
        patch(&mut active.email, input.email);
        patch(&mut active.phone, input.phone);
        patch(&mut active.mobile, input.mobile);
        patch(&mut active.contact_type, input.contact_type);
        patch(&mut active.is_active, input.is_active);
        patch(&mut active.notes, input.notes);
        active.updated_by = Set(actor.user_id);

        let model = active
            .update(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        info!(contact_id = %id, "Contact updated");
        let response = ContactResponse::from(model);
        self.audit
            .record(
                actor,
                AuditAction::Update,
                "Contact",
                id,
                &response.full_name,
                serde_json::to_value(&response).ok(),
            )
            .await;
        Ok(response)
    }

    #[instrument(skip(self, actor))]
    pub async fn delete(&self, id: Uuid, actor: &Actor) -> Result<(), ServiceError> {
        let existing = find_or_404::<contact::Entity, _>(&*self.db, id, "Contact").await?;
        ensure_unreferenced::<invoice::Entity, _>(
            &*self.db,
            invoice::Column::CustomerId,
            id,
            "Contact",
            "invoice(s)",
        )
        .await?;
        ensure_unreferenced::<service_request::Entity, _>(
            &*self.db,
            service_request::Column::CustomerId,
            id,
            "Contact",
            "service request(s)",
        )
        .await?;
        delete_or_404::<contact::Entity, _>(&*self.db, id, "Contact").await?;

        info!(contact_id = %id, "Contact deleted");
        self.audit
            .record(actor, AuditAction::Delete, "Contact", id, &existing.full_name(), None)
            .await;
        Ok(())
    }

    pub async fn statistics(&self) -> Result<ContactStatistics, ServiceError> {
        let db = &*self.db;
        let total_contacts = contact::Entity::find()
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        let active_contacts = contact::Entity::find()
            .filter(contact::Column::IsActive.eq(true))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;

        let mut by_type = BTreeMap::new();
        for contact_type in ContactType::iter() {
            let count = contact::Entity::find()
                .filter(contact::Column::ContactType.eq(contact_type))
                .count(db)
                .await
                .map_err(ServiceError::db_error)?;
            by_type.insert(contact_type.to_value(), count);
        }

        Ok(ContactStatistics {
            total_contacts,
            active_contacts,
            inactive_contacts: total_contacts - active_contacts,
            by_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_type_defaults_to_customer() {
        let req: CreateContactRequest = serde_json::from_value(serde_json::json!({
            "first_name": "Ali",
            "last_name": "Rezaei",
            "email": "ali@example.com"
        }))
        .unwrap();
        assert_eq!(req.contact_type, ContactType::Customer);
        assert!(req.is_active);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn unknown_contact_type_is_rejected() {
        let parsed = serde_json::from_value::<CreateContactRequest>(serde_json::json!({
            "first_name": "Ali",
            "last_name": "Rezaei",
            "email": "ali@example.com",
            "contact_type": "vendor"
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn statistics_keys_use_stored_values() {
        let keys: Vec<String> = ContactType::iter().map(|t| t.to_value()).collect();
        assert_eq!(keys, vec!["customer", "supplier", "employee", "other"]);
    }
}
