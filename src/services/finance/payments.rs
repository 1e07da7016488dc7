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
    common::{patch, positive_amount},
    db::{ListParams, OrderingSpec, Page, QueryBuilder, SearchBuilder},
    entities::{
        core_data::AuditAction,
        finance::{invoice, payment, PaymentMethod, PaymentStatus},
    },
    errors::ServiceError,
    services::{
        audit::AuditService, delete_or_404, ensure_exists, find_or_404, lookups, numbering, Actor,
    },
};

fn default_status() -> PaymentStatus {
    PaymentStatus::Pending
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePaymentRequest {
    /// Generated as `PAY-…` when omitted
    #[validate(length(max = 50))]
    pub payment_number: Option<String>,
    pub invoice_id: Uuid,
    #[validate(custom = "positive_amount")]
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    #[serde(default = "default_status")]
    pub status: PaymentStatus,
    /// Defaults to now
    pub payment_date: Option<DateTime<Utc>>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub reference_number: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub bank_name: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub account_number: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePaymentRequest {
    #[validate(length(min = 1, max = 50))]
    pub payment_number: Option<String>,
    pub invoice_id: Option<Uuid>,
    #[validate(custom = "positive_amount")]
    pub amount: Option<Decimal>,
    pub payment_method: Option<PaymentMethod>,
    pub status: Option<PaymentStatus>,
    pub payment_date: Option<DateTime<Utc>>,
    #[validate(length(max = 100))]
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    #[validate(length(max = 100))]
    pub bank_name: Option<String>,
    #[validate(length(max = 50))]
    pub account_number: Option<String>,
}

impl From<CreatePaymentRequest> for UpdatePaymentRequest {
    fn from(req: CreatePaymentRequest) -> Self {
        Self {
            payment_number: req.payment_number.filter(|n| !n.trim().is_empty()),
            invoice_id: Some(req.invoice_id),
            amount: Some(req.amount),
            payment_method: Some(req.payment_method),
            status: Some(req.status),
            payment_date: req.payment_date,
            reference_number: Some(req.reference_number),
            notes: Some(req.notes),
            bank_name: Some(req.bank_name),
            account_number: Some(req.account_number),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub payment_number: String,
    pub invoice_id: Uuid,
    pub invoice_number: Option<String>,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub status: PaymentStatus,
    pub payment_date: DateTime<Utc>,
    pub reference_number: String,
    pub notes: String,
    pub bank_name: String,
    pub account_number: String,
    pub created_by: Option<Uuid>,
    pub created_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentResponse {
    fn build(model: payment::Model, invoices: &lookups::Labels, users: &lookups::Labels) -> Self {
        Self {
            invoice_number: invoices.get(&model.invoice_id).cloned(),
            created_by_name: lookups::label(users, model.created_by),
            id: model.id,
            payment_number: model.payment_number,
            invoice_id: model.invoice_id,
            amount: model.amount,
            payment_method: model.payment_method,
            status: model.status,
            payment_date: model.payment_date,
            reference_number: model.reference_number,
            notes: model.notes,
            bank_name: model.bank_name,
            account_number: model.account_number,
            created_by: model.created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaymentFilters {
    pub status: Option<PaymentStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub invoice: Option<Uuid>,
}

fn ordering() -> OrderingSpec {
    OrderingSpec::new()
        .field("payment_date", payment::Column::PaymentDate)
        .field("amount", payment::Column::Amount)
        .field("created_at", payment::Column::CreatedAt)
        .default_desc(payment::Column::PaymentDate)
}

#[derive(Clone)]
pub struct PaymentService {
    db: Arc<DatabaseConnection>,
    audit: AuditService,
}

impl PaymentService {
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
        filters: PaymentFilters,
    ) -> Result<Page<PaymentResponse>, ServiceError> {
        let search = SearchBuilder::new(params.search.as_deref())
            .field(payment::Column::PaymentNumber)
            .field(payment::Column::ReferenceNumber)
            .field(payment::Column::Notes);

        let page = QueryBuilder::new(payment::Entity::find())
            .filter_eq(payment::Column::Status, filters.status)
            .filter_eq(payment::Column::PaymentMethod, filters.payment_method)
            .filter_eq(payment::Column::InvoiceId, filters.invoice)
            .list(params, search, &ordering())
            .fetch(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        let (invoices, users) = self.labels(&page.items).await?;
        Ok(page.map(|p| PaymentResponse::build(p, &invoices, &users)))
    }

    pub async fn get(&self, id: Uuid) -> Result<PaymentResponse, ServiceError> {
        let model = find_or_404::<payment::Entity, _>(&*self.db, id, "Payment").await?;
        self.respond(model).await
    }

    #[instrument(skip(self, input, actor), fields(invoice_id = %input.invoice_id))]
    pub async fn create(
        &self,
        input: CreatePaymentRequest,
        actor: &Actor,
    ) -> Result<PaymentResponse, ServiceError> {
        input.validate()?;
        ensure_exists::<invoice::Entity, _>(&*self.db, input.invoice_id, "invoice_id").await?;

        let payment_number = numbering::provided_or_next::<payment::Entity, _>(
            &*self.db,
            payment::Column::PaymentNumber,
            numbering::PAYMENT_PREFIX,
            input.payment_number,
        )
        .await
        .map_err(ServiceError::db_error)?;

        let model = payment::ActiveModel {
            payment_number: Set(payment_number),
            invoice_id: Set(input.invoice_id),
            amount: Set(input.amount),
            payment_method: Set(input.payment_method),
            status: Set(input.status),
            payment_date: Set(input.payment_date.unwrap_or_else(Utc::now)),
            reference_number: Set(input.reference_number),
            notes: Set(input.notes),
            bank_name: Set(input.bank_name),
            account_number: Set(input.account_number),
            created_by: Set(actor.user_id),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(payment_id = %model.id, amount = %model.amount, "Payment recorded");
        let response = self.respond(model).await?;
        self.record(actor, AuditAction::Create, &response).await;
        Ok(response)
    }

    #[instrument(skip(self, input, actor))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdatePaymentRequest,
        actor: &Actor,
    ) -> Result<PaymentResponse, ServiceError> {
        input.validate()?;
        let existing = find_or_404::<payment::Entity, _>(&*self.db, id, "Payment").await?;
        if let Some(invoice_id) = input.invoice_id {
            ensure_exists::<invoice::Entity, _>(&*self.db, invoice_id, "invoice_id").await?;
        }

        let mut active: payment::ActiveModel = existing.into();
        patch(&mut active.payment_number, input.payment_number);
        patch(&mut active.invoice_id, input.invoice_id);
        patch(&mut active.amount, input.amount);
        patch(&mut active.payment_method, input.payment_method);
        patch(&mut active.status, input.status);
        patch(&mut active.payment_date, input.payment_date);
        patch(&mut active.reference_number, input.reference_number);
        patch(&mut active.notes, input.notes);
        patch(&mut active.bank_name, input.bank_name);
        patch(&mut active.account_number, input.account_number);

        let model = active
            .update(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        info!(payment_id = %id, "Payment updated");
        let response = self.respond(model).await?;
        self.record(actor, AuditAction::Update, &response).await;
        Ok(response)
    }

    #[instrument(skip(self, actor))]
    pub async fn delete(&self, id: Uuid, actor: &Actor) -> Result<(), ServiceError> {
        let existing = find_or_404::<payment::Entity, _>(&*self.db, id, "Payment").await?;
        delete_or_404::<payment::Entity, _>(&*self.db, id, "Payment").await?;

        info!(payment_id = %id, "Payment deleted");
        self.audit
            .record(actor, AuditAction::Delete, "Payment", id, &existing.payment_number, None)
            .await;
        Ok(())
    }

    async fn respond(&self, model: payment::Model) -> Result<PaymentResponse, ServiceError> {
        let (invoices, users) = self.labels(std::slice::from_ref(&model)).await?;
        Ok(PaymentResponse::build(model, &invoices, &users))
    }

    async fn labels(
        &self,
        payments: &[payment::Model],
    ) -> Result<(lookups::Labels, lookups::Labels), ServiceError> {
        let db = &*self.db;
        let invoices = lookups::lookup::<invoice::Entity, _, _, _, _>(
            db,
            invoice::Column::Id,
            payments.iter().map(|p| p.invoice_id),
            |i| (i.id, i.invoice_number),
        )
        .await
        .map_err(ServiceError::db_error)?;
        let users = lookups::user_names(db, payments.iter().map(|p| p.created_by))
            .await
            .map_err(ServiceError::db_error)?;
        Ok((invoices, users))
    }

    async fn record(&self, actor: &Actor, action: AuditAction, response: &PaymentResponse) {
        self.audit
            .record(
                actor,
                action,
                "Payment",
                response.id,
                &response.payment_number,
                serde_json::to_value(response).ok(),
            )
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn payment_defaults_to_pending() {
        let req: CreatePaymentRequest = serde_json::from_value(serde_json::json!({
            "invoice_id": Uuid::new_v4(),
            "amount": "150.00",
            "payment_method": "bank_transfer"
        }))
        .unwrap();
        assert_eq!(req.status, PaymentStatus::Pending);
        assert_eq!(req.payment_method, PaymentMethod::BankTransfer);
        assert!(req.payment_date.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn amount_below_one_cent_is_rejected() {
        let req = UpdatePaymentRequest {
            amount: Some(dec!(0.001)),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
