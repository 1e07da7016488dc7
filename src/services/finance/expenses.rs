use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{nullable, patch, positive_amount},
    db::{ListParams, OrderingSpec, Page, QueryBuilder, SearchBuilder},
    entities::{
        core_data::contact,
        finance::{account, expense, ExpenseCategory},
    },
    errors::ServiceError,
    services::{
        delete_or_404, ensure_exists, ensure_exists_opt, find_or_404, lookups, numbering, Actor,
    },
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateExpenseRequest {
    /// Generated as `EXP-…` when omitted
    #[validate(length(max = 50))]
    pub expense_number: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    pub category: ExpenseCategory,
    #[validate(custom = "positive_amount")]
    pub amount: Decimal,
    /// Defaults to today
    pub expense_date: Option<NaiveDate>,
    pub account_id: Uuid,
    pub vendor_id: Option<Uuid>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub receipt_number: String,
    #[validate(length(max = 500))]
    pub receipt_image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateExpenseRequest {
    #[validate(length(min = 1, max = 50))]
    pub expense_number: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub description: Option<String>,
    pub category: Option<ExpenseCategory>,
    #[validate(custom = "positive_amount")]
    pub amount: Option<Decimal>,
    pub expense_date: Option<NaiveDate>,
    pub account_id: Option<Uuid>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<Uuid>)]
    pub vendor_id: Option<Option<Uuid>>,
    #[validate(length(max = 100))]
    pub receipt_number: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub receipt_image: Option<Option<String>>,
}

impl From<CreateExpenseRequest> for UpdateExpenseRequest {
    fn from(req: CreateExpenseRequest) -> Self {
        Self {
            expense_number: req.expense_number.filter(|n| !n.trim().is_empty()),
            description: Some(req.description),
            category: Some(req.category),
            amount: Some(req.amount),
            expense_date: req.expense_date,
            account_id: Some(req.account_id),
            vendor_id: Some(req.vendor_id),
            receipt_number: Some(req.receipt_number),
            receipt_image: Some(req.receipt_image),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExpenseResponse {
    pub id: Uuid,
    pub expense_number: String,
    pub description: String,
    pub category: ExpenseCategory,
    pub amount: Decimal,
    pub expense_date: NaiveDate,
    pub account_id: Uuid,
    pub account_name: Option<String>,
    pub vendor_id: Option<Uuid>,
    pub vendor_name: Option<String>,
    pub receipt_number: String,
    pub receipt_image: Option<String>,
    pub is_approved: bool,
    pub approved_by: Option<Uuid>,
    pub approved_by_name: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
    pub created_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct ExpenseLabels {
    accounts: lookups::Labels,
    vendors: lookups::Labels,
    users: lookups::Labels,
}

impl ExpenseLabels {
    fn render(&self, model: expense::Model) -> ExpenseResponse {
        ExpenseResponse {
            account_name: self.accounts.get(&model.account_id).cloned(),
            vendor_name: lookups::label(&self.vendors, model.vendor_id),
            approved_by_name: lookups::label(&self.users, model.approved_by),
            created_by_name: lookups::label(&self.users, model.created_by),
            id: model.id,
            expense_number: model.expense_number,
            description: model.description,
            category: model.category,
            amount: model.amount,
            expense_date: model.expense_date,
            account_id: model.account_id,
            vendor_id: model.vendor_id,
            receipt_number: model.receipt_number,
            receipt_image: model.receipt_image,
            is_approved: model.is_approved,
            approved_by: model.approved_by,
            approved_at: model.approved_at,
            created_by: model.created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExpenseFilters {
    pub category: Option<ExpenseCategory>,
    pub is_approved: Option<bool>,
    pub account: Option<Uuid>,
}

fn ordering() -> OrderingSpec {
    OrderingSpec::new()
        .field("expense_date", expense::Column::ExpenseDate)
        .field("amount", expense::Column::Amount)
        .field("created_at", expense::Column::CreatedAt)
        .default_desc(expense::Column::ExpenseDate)
}

#[derive(Clone)]
pub struct ExpenseService {
    db: Arc<DatabaseConnection>,
}

impl ExpenseService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: &ListParams,
        filters: ExpenseFilters,
    ) -> Result<Page<ExpenseResponse>, ServiceError> {
        let search = SearchBuilder::new(params.search.as_deref())
            .field(expense::Column::ExpenseNumber)
            .field(expense::Column::Description)
            .field(expense::Column::ReceiptNumber);

        let page = QueryBuilder::new(expense::Entity::find())
            .filter_eq(expense::Column::Category, filters.category)
            .filter_eq(expense::Column::IsApproved, filters.is_approved)
            .filter_eq(expense::Column::AccountId, filters.account)
            .list(params, search, &ordering())
            .fetch(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        let labels = self.labels(&page.items).await?;
        Ok(page.map(|e| labels.render(e)))
    }

    pub async fn get(&self, id: Uuid) -> Result<ExpenseResponse, ServiceError> {
        let model = find_or_404::<expense::Entity, _>(&*self.db, id, "Expense").await?;
        self.respond(model).await
    }

    #[instrument(skip(self, input, actor), fields(amount = %input.amount))]
    pub async fn create(
        &self,
        input: CreateExpenseRequest,
        actor: &Actor,
    ) -> Result<ExpenseResponse, ServiceError> {
        input.validate()?;
        ensure_exists::<account::Entity, _>(&*self.db, input.account_id, "account_id").await?;
        ensure_exists_opt::<contact::Entity, _>(&*self.db, input.vendor_id, "vendor_id").await?;

        let expense_number = numbering::provided_or_next::<expense::Entity, _>(
            &*self.db,
            expense::Column::ExpenseNumber,
            numbering::EXPENSE_PREFIX,
            input.expense_number,
        )
        .await
        .map_err(ServiceError::db_error)?;

        let model = expense::ActiveModel {
            expense_number: Set(expense_number),
            description: Set(input.description),
            category: Set(input.category),
            amount: Set(input.amount),
            expense_date: Set(input.expense_date.unwrap_or_else(|| Utc::now().date_naive())),
            account_id: Set(input.account_id),
            vendor_id: Set(input.vendor_id),
            receipt_number: Set(input.receipt_number),
            receipt_image: Set(input.receipt_image),
            is_approved: Set(false),
            approved_by: Set(None),
            approved_at: Set(None),
            created_by: Set(actor.user_id),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(expense_id = %model.id, "Expense recorded");
        self.respond(model).await
    }

    /// Approval fields are only changed through [`ExpenseService::approve`]
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateExpenseRequest,
    ) -> Result<ExpenseResponse, ServiceError> {
        input.validate()?;
        let existing = find_or_404::<expense::Entity, _>(&*self.db, id, "Expense").await?;
        if let Some(account_id) = input.account_id {
            ensure_exists::<account::Entity, _>(&*self.db, account_id, "account_id").await?;
        }
        ensure_exists_opt::<contact::Entity, _>(&*self.db, input.vendor_id.flatten(), "vendor_id")
            .await?;

        let mut active: expense::ActiveModel = existing.into();
        patch(&mut active.expense_number, input.expense_number);
        patch(&mut active.description, input.description);
        patch(&mut active.category, input.category);
        patch(&mut active.amount, input.amount);
        patch(&mut active.expense_date, input.expense_date);
        patch(&mut active.account_id, input.account_id);
        patch(&mut active.vendor_id, input.vendor_id);
        patch(&mut active.receipt_number, input.receipt_number);
        patch(&mut active.receipt_image, input.receipt_image);

        let model = active
            .update(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        info!(expense_id = %id, "Expense updated");
        self.respond(model).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        delete_or_404::<expense::Entity, _>(&*self.db, id, "Expense").await?;
        info!(expense_id = %id, "Expense deleted");
        Ok(())
    }

    #[instrument(skip(self, actor))]
    pub async fn approve(&self, id: Uuid, actor: &Actor) -> Result<ExpenseResponse, ServiceError> {
        let existing = find_or_404::<expense::Entity, _>(&*self.db, id, "Expense").await?;
        if existing.is_approved {
            return Err(ServiceError::Conflict("Expense is already approved.".to_string()));
        }

        let mut active: expense::ActiveModel = existing.into();
        active.is_approved = Set(true);
        active.approved_by = Set(actor.user_id);
        active.approved_at = Set(Some(Utc::now()));

        let model = active
            .update(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        info!(expense_id = %id, approved_by = ?actor.user_id, "Expense approved");
        self.respond(model).await
    }

    async fn respond(&self, model: expense::Model) -> Result<ExpenseResponse, ServiceError> {
        let labels = self.labels(std::slice::from_ref(&model)).await?;
        Ok(labels.render(model))
    }

    async fn labels(&self, rows: &[expense::Model]) -> Result<ExpenseLabels, ServiceError> {
        if rows.is_empty() {
            return Ok(ExpenseLabels::default());
        }
        let db = &*self.db;
        let accounts = lookups::account_names(db, rows.iter().map(|e| e.account_id))
            .await
            .map_err(ServiceError::db_error)?;
        let vendors = lookups::contact_names(db, rows.iter().map(|e| e.vendor_id))
            .await
            .map_err(ServiceError::db_error)?;
        let users = lookups::user_names(
            db,
            rows.iter().flat_map(|e| [e.created_by, e.approved_by]),
        )
        .await
        .map_err(ServiceError::db_error)?;
        Ok(ExpenseLabels {
            accounts,
            vendors,
            users,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_body_keeps_vendor_nullable() {
        let req: CreateExpenseRequest = serde_json::from_value(serde_json::json!({
            "description": "Fuel",
            "category": "travel",
            "amount": "45.50",
            "account_id": Uuid::new_v4()
        }))
        .unwrap();
        let update = UpdateExpenseRequest::from(req);
        assert_eq!(update.vendor_id, Some(None));
        assert_eq!(update.category, Some(ExpenseCategory::Travel));
        assert!(update.expense_number.is_none());
    }

    #[test]
    fn explicit_null_clears_receipt_image() {
        let req: UpdateExpenseRequest =
            serde_json::from_value(serde_json::json!({ "receipt_image": null })).unwrap();
        assert_eq!(req.receipt_image, Some(None));
        let req: UpdateExpenseRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(req.receipt_image, None);
    }
}
