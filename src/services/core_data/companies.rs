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
    common::{blank_or_email, blank_or_url, nullable, patch, validate_phone},
    db::{ListParams, OrderingSpec, Page, QueryBuilder, SearchBuilder},
    entities::core_data::{company, AuditAction, CompanyType},
    errors::ServiceError,
    services::{audit::AuditService, delete_or_404, find_or_404, Actor},
};

fn default_true() -> bool {
    true
}

fn default_company_type() -> CompanyType {
    CompanyType::Customer
}

/// Blank tax ids are stored as NULL so the unique index ignores them
fn normalize_tax_id(tax_id: Option<String>) -> Option<String> {
    tax_id
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCompanyRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub legal_name: String,
    #[serde(default = "default_company_type")]
    pub company_type: CompanyType,
    #[validate(length(max = 50))]
    pub tax_id: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub registration_number: String,
    #[serde(default)]
    #[validate(custom = "blank_or_url")]
    pub website: String,
    #[serde(default)]
    #[validate(custom = "blank_or_email")]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 17), custom = "validate_phone")]
    pub phone: String,
    #[serde(default)]
    #[validate(length(max = 17), custom = "validate_phone")]
    pub fax: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCompanyRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 200))]
    pub legal_name: Option<String>,
    pub company_type: Option<CompanyType>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 50))]
    pub tax_id: Option<Option<String>>,
    #[validate(length(max = 50))]
    pub registration_number: Option<String>,
    #[validate(custom = "blank_or_url")]
    pub website: Option<String>,
    #[validate(custom = "blank_or_email")]
    pub email: Option<String>,
    #[validate(length(max = 17), custom = "validate_phone")]
    pub phone: Option<String>,
    #[validate(length(max = 17), custom = "validate_phone")]
    pub fax: Option<String>,
    pub is_active: Option<bool>,
    pub notes: Option<String>,
}

impl From<CreateCompanyRequest> for UpdateCompanyRequest {
    fn from(req: CreateCompanyRequest) -> Self {
        Self {
            name: Some(req.name),
            legal_name: Some(req.legal_name),
            company_type: Some(req.company_type),
            tax_id: Some(req.tax_id),
            registration_number: Some(req.registration_number),
            website: Some(req.website),
            email: Some(req.email),
            phone: Some(req.phone),
            fax: Some(req.fax),
            is_active: Some(req.is_active),
            notes: Some(req.notes),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompanyResponse {
    pub id: Uuid,
    pub name: String,
    pub legal_name: String,
    pub company_type: CompanyType,
    pub tax_id: Option<String>,
    pub registration_number: String,
    pub website: String,
    pub email: String,
    pub phone: String,
    pub fax: String,
    pub is_active: bool,
    pub notes: String,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<company::Model> for CompanyResponse {
    fn from(model: company::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            legal_name: model.legal_name,
            company_type: model.company_type,
            tax_id: model.tax_id,
            registration_number: model.registration_number,
            website: model.website,
            email: model.email,
            phone: model.phone,
            fax: model.fax,
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
pub struct CompanyFilters {
    pub company_type: Option<CompanyType>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CompanyStatistics {
    pub total_companies: u64,
    pub active_companies: u64,
    pub inactive_companies: u64,
    pub by_type: BTreeMap<String, u64>,
}

fn ordering() -> OrderingSpec {
    OrderingSpec::new()
        .field("name", company::Column::Name)
        .field("created_at", company::Column::CreatedAt)
        .default_asc(company::Column::Name)
}

#[derive(Clone)]
pub struct CompanyService {
    db: Arc<DatabaseConnection>,
    audit: AuditService,
}

impl CompanyService {
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
        filters: CompanyFilters,
    ) -> Result<Page<CompanyResponse>, ServiceError> {
        let search = SearchBuilder::new(params.search.as_deref())
            .field(company::Column::Name)
            .field(company::Column::LegalName)
            .field(company::Column::Email)
            .field(company::Column::TaxId);

        let page = QueryBuilder::new(company::Entity::find())
            .filter_eq(company::Column::CompanyType, filters.company_type)
            .filter_eq(company::Column::IsActive, filters.is_active)
            .list(params, search, &ordering())
            .fetch(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(page.map(CompanyResponse::from))
    }

    pub async fn get(&self, id: Uuid) -> Result<CompanyResponse, ServiceError> {
        Ok(find_or_404::<company::Entity, _>(&*self.db, id, "Company").await?.into())
    }

    #[instrument(skip(self, input, actor), fields(name = %input.name))]
    pub async fn create(
        &self,
        input: CreateCompanyRequest,
        actor: &Actor,
    ) -> Result<CompanyResponse, ServiceError> {
        input.validate()?;
        let model = company::ActiveModel {
            name: Set(input.name),
            legal_name: Set(input.legal_name),
            company_type: Set(input.company_type),
            tax_id: Set(normalize_tax_id(input.tax_id)),
            registration_number: Set(input.registration_number),
            website: Set(input.website),
            email: Set(input.email),
            phone: Set(input.phone),
            fax: Set(input.fax),
            is_active: Set(input.is_active),
            notes: Set(input.notes),
            created_by: Set(actor.user_id),
            updated_by: Set(actor.user_id),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(company_id = %model.id, "Company created");
        let response = CompanyResponse::from(model);
        self.audit
            .record(
                actor,
                AuditAction::Create,
                "Company",
                response.id,
                &response.name,
                serde_json::to_value(&response).ok(),
            )
            .await;
        Ok(response)
    }

    #[instrument(skip(self, input, actor))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateCompanyRequest,
        actor: &Actor,
    ) -> Result<CompanyResponse, ServiceError> {
        input.validate()?;
        let existing = find_or_404::<company::Entity, _>(&*self.db, id, "Company").await?;

        let mut active: company::ActiveModel = existing.into();
        patch(&mut active.name, input.name);
        patch(&mut active.legal_name, input.legal_name);
        patch(&mut active.company_type, input.company_type);
        patch(&mut active.tax_id, input.tax_id.map(normalize_tax_id));
        patch(&mut active.registration_number, input.registration_number);
        patch(&mut active.website, input.website);
        patch(&mut active.email, input.email);
        patch(&mut active.phone, input.phone);
        patch(&mut active.fax, input.fax);
        patch(&mut active.is_active, input.is_active);
        patch(&mut active.notes, input.notes);
        active.updated_by = Set(actor.user_id);

        let model = active
            .update(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        info!(company_id = %id, "Company updated");
        let response = CompanyResponse::from(model);
        self.audit
            .record(
                actor,
                AuditAction::Update,
                "Company",
                id,
                &response.name,
                serde_json::to_value(&response).ok(),
            )
            .await;
        Ok(response)
    }

    #[instrument(skip(self, actor))]
    pub async fn delete(&self, id: Uuid, actor: &Actor) -> Result<(), ServiceError> {
        let existing = find_or_404::<company::Entity, _>(&*self.db, id, "Company").await?;
        delete_or_404::<company::Entity, _>(&*self.db, id, "Company").await?;

        info!(company_id = %id, "Company deleted");
        self.audit
            .record(actor, AuditAction::Delete, "Company", id, &existing.name, None)
            .await;
        Ok(())
    }

    pub async fn statistics(&self) -> Result<CompanyStatistics, ServiceError> {
        let db = &*self.db;
        let total_companies = company::Entity::find()
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        let active_companies = company::Entity::find()
            .filter(company::Column::IsActive.eq(true))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;

        let mut by_type = BTreeMap::new();
        for company_type in CompanyType::iter() {
            let count = company::Entity::find()
                .filter(company::Column::CompanyType.eq(company_type))
                .count(db)
                .await
                .map_err(ServiceError::db_error)?;
            by_type.insert(company_type.to_value(), count);
        }

        Ok(CompanyStatistics {
            total_companies,
            active_companies,
            inactive_companies: total_companies - active_companies,
            by_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_tax_id_becomes_null() {
        assert_eq!(normalize_tax_id(Some("  ".into())), None);
        assert_eq!(normalize_tax_id(None), None);
        assert_eq!(
            normalize_tax_id(Some(" 10101 ".into())).as_deref(),
            Some("10101")
        );
    }

    #[test]
    fn website_and_email_may_be_blank_but_not_malformed() {
        let mut req: CreateCompanyRequest =
            serde_json::from_value(serde_json::json!({ "name": "Farjad Co" })).unwrap();
        assert!(req.validate().is_ok());
        req.website = "farjad".into();
        req.email = "nope".into();
        let message = ServiceError::from(req.validate().unwrap_err()).to_string();
        assert!(message.contains("website") && message.contains("email"));
    }
}
