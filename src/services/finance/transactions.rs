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
    common::{current, patch, positive_amount},
    db::{ListParams, OrderingSpec, Page, QueryBuilder, SearchBuilder},
    entities::finance::{account, transaction},
    errors::ServiceError,
    services::{delete_or_404, ensure_exists, find_or_404, lookups, numbering, Actor},
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTransactionRequest {
    /// Generated as `TXN-…` when omitted
    #[validate(length(max = 50))]
    pub transaction_number: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    /// Defaults to today
    pub transaction_date: Option<NaiveDate>,
    #[validate(custom = "positive_amount")]
    pub amount: Decimal,
    pub debit_account_id: Uuid,
    pub credit_account_id: Uuid,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub reference_type: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub reference_id: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTransactionRequest {
    #[validate(length(min = 1, max = 50))]
    pub transaction_number: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub description: Option<String>,
    pub transaction_date: Option<NaiveDate>,
    #[validate(custom = "positive_amount")]
    pub amount: Option<Decimal>,
    pub debit_account_id: Option<Uuid>,
    pub credit_account_id: Option<Uuid>,
    #[validate(length(max = 50))]
    pub reference_type: Option<String>,
    #[validate(length(max = 50))]
    pub reference_id: Option<String>,
}

impl From<CreateTransactionRequest> for UpdateTransactionRequest {
    fn from(req: CreateTransactionRequest) -> Self {
        Self {
            transaction_number: req.transaction_number.filter(|n| !n.trim().is_empty()),
            description: Some(req.description),
            transaction_date: req.transaction_date,
            amount: Some(req.amount),
            debit_account_id: Some(req.debit_account_id),
            credit_account_id: Some(req.credit_account_id),
            reference_type: Some(req.reference_type),
            reference_id: Some(req.reference_id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub transaction_number: String,
    pub description: String,
    pub transaction_date: NaiveDate,
    pub amount: Decimal,
    pub debit_account_id: Uuid,
    pub debit_account_name: Option<String>,
    pub credit_account_id: Uuid,
    pub credit_account_name: Option<String>,
    pub reference_type: String,
    pub reference_id: String,
    pub created_by: Option<Uuid>,
    pub created_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TransactionResponse {
    fn build(model: transaction::Model, accounts: &lookups::Labels, users: &lookups::Labels) -> Self {
        Self {
            debit_account_name: accounts.get(&model.debit_account_id).cloned(),
            credit_account_name: accounts.get(&model.credit_account_id).cloned(),
            created_by_name: lookups::label(users, model.created_by),
            id: model.id,
            transaction_number: model.transaction_number,
            description: model.description,
            transaction_date: model.transaction_date,
            amount: model.amount,
            debit_account_id: model.debit_account_id,
            credit_account_id: model.credit_account_id,
            reference_type: model.reference_type,
            reference_id: model.reference_id,
            created_by: model.created_by,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TransactionFilters {
    pub debit_account: Option<Uuid>,
    pub credit_account: Option<Uuid>,
}

fn ordering() -> OrderingSpec {
    OrderingSpec::new()
        .field("transaction_date", transaction::Column::TransactionDate)
        .field("amount", transaction::Column::Amount)
        .field("created_at", transaction::Column::CreatedAt)
        .default_desc(transaction::Column::TransactionDate)
}

fn check_sides(debit: Uuid, credit: Uuid) -> Result<(), ServiceError> {
    if debit == credit {
        return Err(ServiceError::ValidationError(
            "credit_account_id: Debit and credit accounts must be different.".to_string(),
        ));
    }
    Ok(())
}

/// Double-entry journal lines
#[derive(Clone)]
pub struct TransactionService {
    db: Arc<DatabaseConnection>,
}

impl TransactionService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: &ListParams,
        filters: TransactionFilters,
    ) -> Result<Page<TransactionResponse>, ServiceError> {
        let search = SearchBuilder::new(params.search.as_deref())
            .field(transaction::Column::TransactionNumber)
            .field(transaction::Column::Description)
            .field(transaction::Column::ReferenceType);

        let page = QueryBuilder::new(transaction::Entity::find())
            .filter_eq(transaction::Column::DebitAccountId, filters.debit_account)
            .filter_eq(transaction::Column::CreditAccountId, filters.credit_account)
            .list(params, search, &ordering())
            .fetch(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        let (accounts, users) = self.labels(&page.items).await?;
        Ok(page.map(|t| TransactionResponse::build(t, &accounts, &users)))
    }

    pub async fn get(&self, id: Uuid) -> Result<TransactionResponse, ServiceError> {
        let model = find_or_404::<transaction::Entity, _>(&*self.db, id, "Transaction").await?;
        self.respond(model).await
    }

    #[instrument(skip(self, input, actor), fields(amount = %input.amount))]
    pub async fn create(
        &self,
        input: CreateTransactionRequest,
        actor: &Actor,
    ) -> Result<TransactionResponse, ServiceError> {
        input.validate()?;
        check_sides(input.debit_account_id, input.credit_account_id)?;
        ensure_exists::<account::Entity, _>(&*self.db, input.debit_account_id, "debit_account_id")
            .await?;
        ensure_exists::<account::Entity, _>(&*self.db, input.credit_account_id, "credit_account_id")
            .await?;

        let transaction_number = numbering::provided_or_next::<transaction::Entity, _>(
            &*self.db,
            transaction::Column::TransactionNumber,
            numbering::TRANSACTION_PREFIX,
            input.transaction_number,
        )
        .await
        .map_err(ServiceError::db_error)?;

        let model = transaction::ActiveModel {
            transaction_number: Set(transaction_number),
            description: Set(input.description),
            transaction_date: Set(input
                .transaction_date
                .unwrap_or_else(|| Utc::now().date_naive())),
            amount: Set(input.amount),
            debit_account_id: Set(input.debit_account_id),
            credit_account_id: Set(input.credit_account_id),
            reference_type: Set(input.reference_type),
            reference_id: Set(input.reference_id),
            created_by: Set(actor.user_id),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(transaction_id = %model.id, number = %model.transaction_number, "Transaction posted");
        self.respond(model).await
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateTransactionRequest,
    ) -> Result<TransactionResponse, ServiceError> {
        input.validate()?;
        let existing = find_or_404::<transaction::Entity, _>(&*self.db, id, "Transaction").await?;

        let mut active: transaction::ActiveModel = existing.into();
        patch(&mut active.transaction_number, input.transaction_number);
        patch(&mut active.description, input.description);
        patch(&mut active.transaction_date, input.transaction_date);
        patch(&mut active.amount, input.amount);
        patch(&mut active.debit_account_id, input.debit_account_id);
        patch(&mut active.credit_account_id, input.credit_account_id);
        patch(&mut active.reference_type, input.reference_type);
        patch(&mut active.reference_id, input.reference_id);

        if let (Some(debit), Some(credit)) = (
            current(&active.debit_account_id),
            current(&active.credit_account_id),
        ) {
            check_sides(debit, credit)?;
            ensure_exists::<account::Entity, _>(&*self.db, debit, "debit_account_id").await?;
            ensure_exists::<account::Entity, _>(&*self.db, credit, "credit_account_id").await?;
        }

        let model = active
            .update(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        info!(transaction_id = %id, "Transaction updated");
        self.respond(model).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        delete_or_404::<transaction::Entity, _>(&*self.db, id, "Transaction").await?;
        info!(transaction_id = %id, "Transaction deleted");
        Ok(())
    }

    async fn respond(&self, model: transaction::Model) -> Result<TransactionResponse, ServiceError> {
        let (accounts, users) = self.labels(std::slice::from_ref(&model)).await?;
        Ok(TransactionResponse::build(model, &accounts, &users))
    }

    async fn labels(
        &self,
        rows: &[transaction::Model],
    ) -> Result<(lookups::Labels, lookups::Labels), ServiceError> {
        let db = &*self.db;
        let accounts = lookups::account_names(
            db,
            rows.iter()
                .flat_map(|t| [t.debit_account_id, t.credit_account_id]),
        )
        .await
        .map_err(ServiceError::db_error)?;
        let users = lookups::user_names(db, rows.iter().map(|t| t.created_by))
            .await
            .map_err(ServiceError::db_error)?;
        Ok((accounts, users))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn same_account_on_both_sides_is_rejected() {
        let id = Uuid::new_v4();
        assert_matches!(check_sides(id, id), Err(ServiceError::ValidationError(msg)) if msg.contains("must be different"));
        assert!(check_sides(id, Uuid::new_v4()).is_ok());
    }

    #[test]
    fn transaction_date_is_optional() {
        let req: CreateTransactionRequest = serde_json::from_value(serde_json::json!({
            "description": "Office rent",
            "amount": "1200.00",
            "debit_account_id": Uuid::new_v4(),
            "credit_account_id": Uuid::new_v4()
        }))
        .unwrap();
        assert!(req.transaction_date.is_none());
        assert!(req.transaction_number.is_none());
        assert!(req.validate().is_ok());
    }
}
