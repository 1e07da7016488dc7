use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::{current, non_negative, nullable, patch, percentage, positive_amount},
    db::{ListParams, OrderingSpec, Page, QueryBuilder, SearchBuilder},
    entities::{
        core_data::{company, contact, AuditAction},
        finance::{invoice, invoice_item, payment, InvoiceStatus, InvoiceType},
    },
    errors::ServiceError,
    services::{
        audit::AuditService, delete_or_404, ensure_exists, ensure_exists_opt, find_or_404,
        lookups, numbering, Actor,
    },
};

fn default_invoice_type() -> InvoiceType {
    InvoiceType::Sale
}

fn default_status() -> InvoiceStatus {
    InvoiceStatus::Draft
}

fn check_dates(invoice_date: NaiveDate, due_date: NaiveDate) -> Result<(), ValidationError> {
    if due_date < invoice_date {
        let mut err = ValidationError::new("due_date");
        err.message = Some("Due date cannot be before invoice date.".into());
        return Err(err);
    }
    Ok(())
}

fn create_dates_ordered(req: &CreateInvoiceRequest) -> Result<(), ValidationError> {
    check_dates(req.invoice_date, req.due_date)
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateInvoiceItemRequest {
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    #[validate(custom = "positive_amount")]
    pub quantity: Decimal,
    #[validate(custom = "non_negative")]
    pub unit_price: Decimal,
    #[serde(default)]
    #[validate(custom = "percentage")]
    pub discount_percentage: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateInvoiceItemRequest {
    #[validate(length(min = 1, max = 500))]
    pub description: Option<String>,
    #[validate(custom = "positive_amount")]
    pub quantity: Option<Decimal>,
    #[validate(custom = "non_negative")]
    pub unit_price: Option<Decimal>,
    #[validate(custom = "percentage")]
    pub discount_percentage: Option<Decimal>,
}

impl From<CreateInvoiceItemRequest> for UpdateInvoiceItemRequest {
    fn from(req: CreateInvoiceItemRequest) -> Self {
        Self {
            description: Some(req.description),
            quantity: Some(req.quantity),
            unit_price: Some(req.unit_price),
            discount_percentage: Some(req.discount_percentage),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "create_dates_ordered", skip_on_field_errors = false))]
pub struct CreateInvoiceRequest {
    /// Generated as `INV-…` when omitted
    #[validate(length(max = 50))]
    pub invoice_number: Option<String>,
    #[serde(default = "default_invoice_type")]
    pub invoice_type: InvoiceType,
    #[serde(default = "default_status")]
    pub status: InvoiceStatus,
    pub customer_id: Uuid,
    pub customer_company_id: Option<Uuid>,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub sent_date: Option<DateTime<Utc>>,
    pub paid_date: Option<DateTime<Utc>>,
    #[serde(default)]
    #[validate(custom = "percentage")]
    pub tax_rate: Decimal,
    #[serde(default)]
    #[validate(custom = "non_negative")]
    pub discount_amount: Decimal,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub terms_and_conditions: String,
    #[serde(default)]
    pub items: Vec<CreateInvoiceItemRequest>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateInvoiceRequest {
    #[validate(length(min = 1, max = 50))]
    pub invoice_number: Option<String>,
    pub invoice_type: Option<InvoiceType>,
    pub status: Option<InvoiceStatus>,
    pub customer_id: Option<Uuid>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<Uuid>)]
    pub customer_company_id: Option<Option<Uuid>>,
    pub invoice_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub sent_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub paid_date: Option<Option<DateTime<Utc>>>,
    #[validate(custom = "percentage")]
    pub tax_rate: Option<Decimal>,
    #[validate(custom = "non_negative")]
    pub discount_amount: Option<Decimal>,
    pub notes: Option<String>,
    pub terms_and_conditions: Option<String>,
}

impl From<CreateInvoiceRequest> for UpdateInvoiceRequest {
    /// Line items are managed through the item endpoints and are not replaced here
    fn from(req: CreateInvoiceRequest) -> Self {
        Self {
            invoice_number: req.invoice_number.filter(|n| !n.trim().is_empty()),
            invoice_type: Some(req.invoice_type),
            status: Some(req.status),
            customer_id: Some(req.customer_id),
            customer_company_id: Some(req.customer_company_id),
            invoice_date: Some(req.invoice_date),
            due_date: Some(req.due_date),
            sent_date: Some(req.sent_date),
            paid_date: Some(req.paid_date),
            tax_rate: Some(req.tax_rate),
            discount_amount: Some(req.discount_amount),
            notes: Some(req.notes),
            terms_and_conditions: Some(req.terms_and_conditions),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvoiceItemResponse {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub discount_percentage: Decimal,
    pub line_total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<invoice_item::Model> for InvoiceItemResponse {
    fn from(model: invoice_item::Model) -> Self {
        Self {
            id: model.id,
            invoice_id: model.invoice_id,
            description: model.description,
            quantity: model.quantity,
            unit_price: model.unit_price,
            discount_percentage: model.discount_percentage,
            line_total: model.line_total,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvoiceResponse {
    pub id: Uuid,
    pub invoice_number: String,
    pub invoice_type: InvoiceType,
    pub status: InvoiceStatus,
    pub customer_id: Uuid,
    pub customer_name: Option<String>,
    pub customer_company_id: Option<Uuid>,
    pub customer_company_name: Option<String>,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub sent_date: Option<DateTime<Utc>>,
    pub paid_date: Option<DateTime<Utc>>,
    pub subtotal: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub is_overdue: bool,
    pub remaining_amount: Decimal,
    pub notes: String,
    pub terms_and_conditions: String,
    pub created_by: Option<Uuid>,
    pub created_by_name: Option<String>,
    pub items: Vec<InvoiceItemResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InvoiceFilters {
    pub status: Option<InvoiceStatus>,
    pub invoice_type: Option<InvoiceType>,
    pub customer: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
}

/// Sums line totals and applies tax (rounded to cents) then the flat discount
pub fn compute_totals<I>(line_totals: I, tax_rate: Decimal, discount_amount: Decimal) -> InvoiceTotals
where
    I: IntoIterator<Item = Decimal>,
{
    let subtotal: Decimal = line_totals.into_iter().sum();
    let tax_amount = (subtotal * tax_rate / Decimal::ONE_HUNDRED).round_dp(2);
    InvoiceTotals {
        subtotal,
        tax_amount,
        total_amount: subtotal + tax_amount - discount_amount,
    }
}

fn ordering() -> OrderingSpec {
    OrderingSpec::new()
        .field("invoice_date", invoice::Column::InvoiceDate)
        .field("due_date", invoice::Column::DueDate)
        .field("total_amount", invoice::Column::TotalAmount)
        .field("created_at", invoice::Column::CreatedAt)
        .default_desc(invoice::Column::InvoiceDate)
        .default_desc(invoice::Column::CreatedAt)
}

/// Labels and child rows needed to render a batch of invoices
#[derive(Default)]
struct InvoiceContext {
    customers: lookups::Labels,
    companies: lookups::Labels,
    users: lookups::Labels,
    items: HashMap<Uuid, Vec<InvoiceItemResponse>>,
    paid: HashMap<Uuid, Decimal>,
}

impl InvoiceContext {
    fn render(&mut self, model: invoice::Model) -> InvoiceResponse {
        let paid = self.paid.get(&model.id).copied().unwrap_or_default();
        InvoiceResponse {
            customer_name: self.customers.get(&model.customer_id).cloned(),
            customer_company_name: lookups::label(&self.companies, model.customer_company_id),
            created_by_name: lookups::label(&self.users, model.created_by),
            is_overdue: model.is_overdue(),
            remaining_amount: model.remaining_amount(paid),
            items: self.items.remove(&model.id).unwrap_or_default(),
            id: model.id,
            invoice_number: model.invoice_number,
            invoice_type: model.invoice_type,
            status: model.status,
            customer_id: model.customer_id,
            customer_company_id: model.customer_company_id,
            invoice_date: model.invoice_date,
            due_date: model.due_date,
            sent_date: model.sent_date,
            paid_date: model.paid_date,
            subtotal: model.subtotal,
            tax_rate: model.tax_rate,
            tax_amount: model.tax_amount,
            discount_amount: model.discount_amount,
            total_amount: model.total_amount,
            notes: model.notes,
            terms_and_conditions: model.terms_and_conditions,
            created_by: model.created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Rewrites the stored totals of `invoice` from its current line items
async fn recalculate<C: ConnectionTrait>(
    db: &C,
    invoice: invoice::Model,
) -> Result<invoice::Model, ServiceError> {
    let line_totals: Vec<Decimal> = invoice_item::Entity::find()
        .select_only()
        .column(invoice_item::Column::LineTotal)
        .filter(invoice_item::Column::InvoiceId.eq(invoice.id))
        .into_tuple()
        .all(db)
        .await
        .map_err(ServiceError::db_error)?;

    let totals = compute_totals(line_totals, invoice.tax_rate, invoice.discount_amount);
    debug!(invoice_id = %invoice.id, subtotal = %totals.subtotal, total = %totals.total_amount, "Recalculated invoice totals");

    let mut active: invoice::ActiveModel = invoice.into();
    active.subtotal = Set(totals.subtotal);
    active.tax_amount = Set(totals.tax_amount);
    active.total_amount = Set(totals.total_amount);
    active.update(db).await.map_err(ServiceError::db_error)
}

fn new_item(invoice_id: Uuid, input: CreateInvoiceItemRequest) -> invoice_item::ActiveModel {
    invoice_item::ActiveModel {
        invoice_id: Set(invoice_id),
        description: Set(input.description),
        quantity: Set(input.quantity),
        unit_price: Set(input.unit_price),
        discount_percentage: Set(input.discount_percentage),
        line_total: Set(invoice_item::line_total(
            input.quantity,
            input.unit_price,
            input.discount_percentage,
        )),
        ..Default::default()
    }
}

#[derive(Clone)]
pub struct InvoiceService {
    db: Arc<DatabaseConnection>,
    audit: AuditService,
}

impl InvoiceService {
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
        filters: InvoiceFilters,
    ) -> Result<Page<InvoiceResponse>, ServiceError> {
        let search = SearchBuilder::new(params.search.as_deref())
            .field(invoice::Column::InvoiceNumber)
            .field(contact::Column::FirstName)
            .field(contact::Column::LastName);

        let select = invoice::Entity::find().join(JoinType::InnerJoin, invoice::Relation::Customer.def());
        let page = QueryBuilder::new(select)
            .filter_eq(invoice::Column::Status, filters.status)
            .filter_eq(invoice::Column::InvoiceType, filters.invoice_type)
            .filter_eq(invoice::Column::CustomerId, filters.customer)
            .list(params, search, &ordering())
            .fetch(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        let mut context = self.context(&page.items).await?;
        Ok(page.map(|model| context.render(model)))
    }

    pub async fn get(&self, id: Uuid) -> Result<InvoiceResponse, ServiceError> {
        let model = find_or_404::<invoice::Entity, _>(&*self.db, id, "Invoice").await?;
        self.respond(model).await
    }

    #[instrument(skip(self, input, actor), fields(customer_id = %input.customer_id))]
    pub async fn create(
        &self,
        input: CreateInvoiceRequest,
        actor: &Actor,
    ) -> Result<InvoiceResponse, ServiceError> {
        input.validate()?;
        for item in &input.items {
            item.validate()?;
        }

        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;
        ensure_exists::<contact::Entity, _>(&txn, input.customer_id, "customer_id").await?;
        ensure_exists_opt::<company::Entity, _>(&txn, input.customer_company_id, "customer_company_id")
            .await?;

        let invoice_number = numbering::provided_or_next::<invoice::Entity, _>(
            &txn,
            invoice::Column::InvoiceNumber,
            numbering::INVOICE_PREFIX,
            input.invoice_number,
        )
        .await
        .map_err(ServiceError::db_error)?;

        let totals = compute_totals(
            input
                .items
                .iter()
                .map(|i| invoice_item::line_total(i.quantity, i.unit_price, i.discount_percentage)),
            input.tax_rate,
            input.discount_amount,
        );

        let model = invoice::ActiveModel {
            invoice_number: Set(invoice_number),
            invoice_type: Set(input.invoice_type),
            status: Set(input.status),
            customer_id: Set(input.customer_id),
            customer_company_id: Set(input.customer_company_id),
            invoice_date: Set(input.invoice_date),
            due_date: Set(input.due_date),
            sent_date: Set(input.sent_date),
            paid_date: Set(input.paid_date),
            subtotal: Set(totals.subtotal),
            tax_rate: Set(input.tax_rate),
            tax_amount: Set(totals.tax_amount),
            discount_amount: Set(input.discount_amount),
            total_amount: Set(totals.total_amount),
            notes: Set(input.notes),
            terms_and_conditions: Set(input.terms_and_conditions),
            created_by: Set(actor.user_id),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(ServiceError::db_error)?;

        for item in input.items {
            new_item(model.id, item)
                .insert(&txn)
                .await
                .map_err(ServiceError::db_error)?;
        }
        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(invoice_id = %model.id, invoice_number = %model.invoice_number, "Invoice created");
        let response = self.respond(model).await?;
        self.record(actor, AuditAction::Create, &response).await;
        Ok(response)
    }

    #[instrument(skip(self, input, actor))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateInvoiceRequest,
        actor: &Actor,
    ) -> Result<InvoiceResponse, ServiceError> {
        input.validate()?;
        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;
        let existing = find_or_404::<invoice::Entity, _>(&txn, id, "Invoice").await?;

        let mut active: invoice::ActiveModel = existing.into();
        patch(&mut active.invoice_number, input.invoice_number);
        patch(&mut active.invoice_type, input.invoice_type);
        patch(&mut active.status, input.status);
        patch(&mut active.customer_id, input.customer_id);
        patch(&mut active.customer_company_id, input.customer_company_id);
        patch(&mut active.invoice_date, input.invoice_date);
        patch(&mut active.due_date, input.due_date);
        patch(&mut active.sent_date, input.sent_date);
        patch(&mut active.paid_date, input.paid_date);
        patch(&mut active.tax_rate, input.tax_rate);
        patch(&mut active.discount_amount, input.discount_amount);
        patch(&mut active.notes, input.notes);
        patch(&mut active.terms_and_conditions, input.terms_and_conditions);

        if let (Some(invoice_date), Some(due_date)) =
            (current(&active.invoice_date), current(&active.due_date))
        {
            check_dates(invoice_date, due_date).map_err(|_| {
                ServiceError::ValidationError(
                    "due_date: Due date cannot be before invoice date.".to_string(),
                )
            })?;
        }
        if let Some(customer_id) = current(&active.customer_id) {
            ensure_exists::<contact::Entity, _>(&txn, customer_id, "customer_id").await?;
        }
        ensure_exists_opt::<company::Entity, _>(
            &txn,
            current(&active.customer_company_id).flatten(),
            "customer_company_id",
        )
        .await?;

        let model = active.update(&txn).await.map_err(ServiceError::db_error)?;
        let model = recalculate(&txn, model).await?;
        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(invoice_id = %id, "Invoice updated");
        let response = self.respond(model).await?;
        self.record(actor, AuditAction::Update, &response).await;
        Ok(response)
    }

    /// Line items and payments are removed with the invoice
    #[instrument(skip(self, actor))]
    pub async fn delete(&self, id: Uuid, actor: &Actor) -> Result<(), ServiceError> {
        let existing = find_or_404::<invoice::Entity, _>(&*self.db, id, "Invoice").await?;
        delete_or_404::<invoice::Entity, _>(&*self.db, id, "Invoice").await?;

        info!(invoice_id = %id, "Invoice deleted");
        self.audit
            .record(actor, AuditAction::Delete, "Invoice", id, &existing.invoice_number, None)
            .await;
        Ok(())
    }

    pub async fn items(&self, invoice_id: Uuid) -> Result<Vec<InvoiceItemResponse>, ServiceError> {
        find_or_404::<invoice::Entity, _>(&*self.db, invoice_id, "Invoice").await?;
        let items = invoice_item::Entity::find()
            .filter(invoice_item::Column::InvoiceId.eq(invoice_id))
            .order_by_asc(invoice_item::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        Ok(items.into_iter().map(InvoiceItemResponse::from).collect())
    }

    #[instrument(skip(self, input))]
    pub async fn add_item(
        &self,
        invoice_id: Uuid,
        input: CreateInvoiceItemRequest,
    ) -> Result<InvoiceItemResponse, ServiceError> {
        input.validate()?;
        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;
        let invoice = find_or_404::<invoice::Entity, _>(&txn, invoice_id, "Invoice").await?;

        let item = new_item(invoice_id, input)
            .insert(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        recalculate(&txn, invoice).await?;
        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(invoice_id = %invoice_id, item_id = %item.id, "Invoice item added");
        Ok(item.into())
    }

    #[instrument(skip(self, input))]
    pub async fn update_item(
        &self,
        invoice_id: Uuid,
        item_id: Uuid,
        input: UpdateInvoiceItemRequest,
    ) -> Result<InvoiceItemResponse, ServiceError> {
        input.validate()?;
        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;
        let invoice = find_or_404::<invoice::Entity, _>(&txn, invoice_id, "Invoice").await?;
        let existing = Self::find_item(&txn, invoice_id, item_id).await?;

        let mut active: invoice_item::ActiveModel = existing.into();
        patch(&mut active.description, input.description);
        patch(&mut active.quantity, input.quantity);
        patch(&mut active.unit_price, input.unit_price);
        patch(&mut active.discount_percentage, input.discount_percentage);

        let item = active.update(&txn).await.map_err(ServiceError::db_error)?;
        recalculate(&txn, invoice).await?;
        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(invoice_id = %invoice_id, item_id = %item_id, "Invoice item updated");
        Ok(item.into())
    }

    #[instrument(skip(self))]
    pub async fn delete_item(&self, invoice_id: Uuid, item_id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;
        let invoice = find_or_404::<invoice::Entity, _>(&txn, invoice_id, "Invoice").await?;
        Self::find_item(&txn, invoice_id, item_id).await?;

        invoice_item::Entity::delete_by_id(item_id)
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        recalculate(&txn, invoice).await?;
        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(invoice_id = %invoice_id, item_id = %item_id, "Invoice item deleted");
        Ok(())
    }

    async fn find_item<C: ConnectionTrait>(
        db: &C,
        invoice_id: Uuid,
        item_id: Uuid,
    ) -> Result<invoice_item::Model, ServiceError> {
        invoice_item::Entity::find_by_id(item_id)
            .filter(invoice_item::Column::InvoiceId.eq(invoice_id))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::not_found("Invoice item", item_id))
    }

    async fn respond(&self, model: invoice::Model) -> Result<InvoiceResponse, ServiceError> {
        let mut context = self.context(std::slice::from_ref(&model)).await?;
        Ok(context.render(model))
    }

    async fn context(&self, invoices: &[invoice::Model]) -> Result<InvoiceContext, ServiceError> {
        if invoices.is_empty() {
            return Ok(InvoiceContext::default());
        }
        let db = &*self.db;
        let ids: Vec<Uuid> = invoices.iter().map(|i| i.id).collect();

        let customers = lookups::contact_names(db, invoices.iter().map(|i| i.customer_id))
            .await
            .map_err(ServiceError::db_error)?;
        let companies = lookups::company_names(db, invoices.iter().map(|i| i.customer_company_id))
            .await
            .map_err(ServiceError::db_error)?;
        let users = lookups::user_names(db, invoices.iter().map(|i| i.created_by))
            .await
            .map_err(ServiceError::db_error)?;

        let mut items: HashMap<Uuid, Vec<InvoiceItemResponse>> = HashMap::new();
        for item in invoice_item::Entity::find()
            .filter(invoice_item::Column::InvoiceId.is_in(ids.clone()))
            .order_by_asc(invoice_item::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?
        {
            items.entry(item.invoice_id).or_default().push(item.into());
        }

        let payments: Vec<(Uuid, Decimal)> = payment::Entity::find()
            .select_only()
            .column(payment::Column::InvoiceId)
            .column(payment::Column::Amount)
            .filter(payment::Column::InvoiceId.is_in(ids))
            .into_tuple()
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;
        let mut paid: HashMap<Uuid, Decimal> = HashMap::new();
        for (invoice_id, amount) in payments {
            *paid.entry(invoice_id).or_default() += amount;
        }

        Ok(InvoiceContext {
            customers,
            companies,
            users,
            items,
            paid,
        })
    }

    async fn record(&self, actor: &Actor, action: AuditAction, response: &InvoiceResponse) {
        self.audit
            .record(
                actor,
                action,
                "Invoice",
                response.id,
                &response.invoice_number,
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
    fn totals_apply_tax_then_discount() {
        let totals = compute_totals([dec!(27.00), dec!(73.00)], dec!(9), dec!(5.00));
        assert_eq!(totals.subtotal, dec!(100.00));
        assert_eq!(totals.tax_amount, dec!(9.00));
        assert_eq!(totals.total_amount, dec!(104.00));
    }

    #[test]
    fn tax_is_rounded_to_cents() {
        let totals = compute_totals([dec!(33.33)], dec!(9), Decimal::ZERO);
        assert_eq!(totals.tax_amount, dec!(3.00));
        assert_eq!(totals.total_amount, dec!(36.33));
    }

    #[test]
    fn empty_invoice_has_zero_totals() {
        let totals = compute_totals(Vec::new(), dec!(10), Decimal::ZERO);
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.total_amount, Decimal::ZERO);
    }

    #[test]
    fn due_date_before_invoice_date_is_rejected() {
        let req: CreateInvoiceRequest = serde_json::from_value(serde_json::json!({
            "customer_id": Uuid::new_v4(),
            "invoice_date": "2024-05-10",
            "due_date": "2024-05-01"
        }))
        .unwrap();
        let err = ServiceError::from(req.validate().unwrap_err());
        assert!(err.to_string().contains("Due date cannot be before invoice date."));
    }

    #[test]
    fn create_defaults_to_draft_sale() {
        let req: CreateInvoiceRequest = serde_json::from_value(serde_json::json!({
            "customer_id": Uuid::new_v4(),
            "invoice_date": "2024-05-01",
            "due_date": "2024-05-31",
            "items": [{"description": "Repair", "quantity": "2", "unit_price": "50.00"}]
        }))
        .unwrap();
        assert_eq!(req.invoice_type, InvoiceType::Sale);
        assert_eq!(req.status, InvoiceStatus::Draft);
        assert_eq!(req.items[0].discount_percentage, Decimal::ZERO);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn zero_quantity_item_is_invalid() {
        let item = CreateInvoiceItemRequest {
            description: "Labour".into(),
            quantity: Decimal::ZERO,
            unit_price: dec!(10.00),
            discount_percentage: Decimal::ZERO,
        };
        assert!(item.validate().is_err());
    }
}
