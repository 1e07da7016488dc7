use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{current, nullable, patch},
    db::{ListParams, OrderingSpec, Page, QueryBuilder, SearchBuilder},
    entities::finance::{account, expense, transaction, AccountType},
    errors::ServiceError,
    services::{delete_or_404, ensure_exists_opt, ensure_unreferenced, find_or_404},
};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAccountRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    pub account_type: AccountType,
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAccountRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub code: Option<String>,
    pub account_type: Option<AccountType>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<Uuid>)]
    pub parent_id: Option<Option<Uuid>>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl From<CreateAccountRequest> for UpdateAccountRequest {
    fn from(req: CreateAccountRequest) -> Self {
        Self {
            name: Some(req.name),
            code: Some(req.code),
            account_type: Some(req.account_type),
            parent_id: Some(req.parent_id),
            description: Some(req.description),
            is_active: Some(req.is_active),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub account_type: AccountType,
    pub parent_id: Option<Uuid>,
    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<account::Model> for AccountResponse {
    fn from(model: account::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            code: model.code,
            account_type: model.account_type,
            parent_id: model.parent_id,
            description: model.description,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AccountBalance {
    pub account_id: Uuid,
    pub debits: Decimal,
    pub credits: Decimal,
    pub balance: Decimal,
}

impl AccountBalance {
    /// Debit-normal accounts report `debits - credits`, the rest `credits - debits`
    pub fn compute(account_id: Uuid, account_type: AccountType, debits: Decimal, credits: Decimal) -> Self {
        let balance = if account_type.is_debit_normal() {
            debits - credits
        } else {
            credits - debits
        };
        Self {
            account_id,
            debits,
            credits,
            balance,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AccountFilters {
    pub account_type: Option<AccountType>,
    pub is_active: Option<bool>,
}

fn ordering() -> OrderingSpec {
    OrderingSpec::new()
        .field("code", account::Column::Code)
        .field("name", account::Column::Name)
        .field("created_at", account::Column::CreatedAt)
        .default_asc(account::Column::Code)
}

fn check_parent(id: Uuid, parent_id: Option<Uuid>) -> Result<(), ServiceError> {
    if parent_id == Some(id) {
        return Err(ServiceError::ValidationError(
            "parent_id: An account cannot be its own parent.".to_string(),
        ));
    }
    Ok(())
}

/// Chart of accounts
#[derive(Clone)]
pub struct LedgerAccountService {
    db: Arc<DatabaseConnection>,
}

impl LedgerAccountService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: &ListParams,
        filters: AccountFilters,
    ) -> Result<Page<AccountResponse>, ServiceError> {
        let search = SearchBuilder::new(params.search.as_deref())
            .field(account::Column::Name)
            .field(account::Column::Code)
            .field(account::Column::Description);

        let page = QueryBuilder::new(account::Entity::find())
            .filter_eq(account::Column::AccountType, filters.account_type)
            .filter_eq(account::Column::IsActive, filters.is_active)
            .list(params, search, &ordering())
            .fetch(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(page.map(AccountResponse::from))
    }

    pub async fn get(&self, id: Uuid) -> Result<AccountResponse, ServiceError> {
        Ok(find_or_404::<account::Entity, _>(&*self.db, id, "Account").await?.into())
    }

    #[instrument(skip(self, input), fields(code = %input.code))]
    pub async fn create(&self, input: CreateAccountRequest) -> Result<AccountResponse, ServiceError> {
        input.validate()?;
        ensure_exists_opt::<account::Entity, _>(&*self.db, input.parent_id, "parent_id").await?;

        let model = account::ActiveModel {
            name: Set(input.name),
            code: Set(input.code),
            account_type: Set(input.account_type),
            parent_id: Set(input.parent_id),
            description: Set(input.description),
            is_active: Set(input.is_active),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(account_id = %model.id, "Account created");
        Ok(model.into())
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateAccountRequest) -> Result<AccountResponse, ServiceError> {
        input.validate()?;
        let existing = find_or_404::<account::Entity, _>(&*self.db, id, "Account").await?;

        let mut active: account::ActiveModel = existing.into();
        patch(&mut active.name, input.name);
        patch(&mut active.code, input.code);
        patch(&mut active.account_type, input.account_type);
        patch(&mut active.parent_id, input.parent_id);
        patch(&mut active.description, input.description);
        patch(&mut active.is_active, input.is_active);

        let parent_id = current(&active.parent_id).flatten();
        check_parent(id, parent_id)?;
        ensure_exists_opt::<account::Entity, _>(&*self.db, parent_id, "parent_id").await?;

        let model = active
            .update(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        info!(account_id = %id, "Account updated");
        Ok(model.into())
    }

    /// Fails with 409 while child accounts or transactions reference the account
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        ensure_unreferenced::<account::Entity, _>(
            db,
            account::Column::ParentId,
            id,
            "Account",
            "sub-account(s)",
        )
        .await?;
        for side in [
            transaction::Column::DebitAccountId,
            transaction::Column::CreditAccountId,
        ] {
            ensure_unreferenced::<transaction::Entity, _>(db, side, id, "Account", "transaction(s)")
                .await?;
        }
        ensure_unreferenced::<expense::Entity, _>(
            db,
            expense::Column::AccountId,
            id,
            "Account",
            "expense(s)",
        )
        .await?;
        delete_or_404::<account::Entity, _>(db, id, "Account").await?;
        info!(account_id = %id, "Account deleted");
        Ok(())
    }

    pub async fn balance(&self, id: Uuid) -> Result<AccountBalance, ServiceError> {
        let account = find_or_404::<account::Entity, _>(&*self.db, id, "Account").await?;
        let debits = self.sum_amounts(transaction::Column::DebitAccountId, id).await?;
        let credits = self.sum_amounts(transaction::Column::CreditAccountId, id).await?;
        Ok(AccountBalance::compute(id, account.account_type, debits, credits))
    }

    async fn sum_amounts(&self, side: transaction::Column, id: Uuid) -> Result<Decimal, ServiceError> {
        let amounts: Vec<Decimal> = transaction::Entity::find()
            .select_only()
            .column(transaction::Column::Amount)
            .filter(side.eq(id))
            .into_tuple()
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        Ok(amounts.into_iter().sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(AccountType::Asset, dec!(70.00))]
    #[case(AccountType::Expense, dec!(70.00))]
    #[case(AccountType::Liability, dec!(-70.00))]
    #[case(AccountType::Equity, dec!(-70.00))]
    #[case(AccountType::Revenue, dec!(-70.00))]
    fn balance_follows_normal_side(#[case] account_type: AccountType, #[case] expected: Decimal) {
        let balance = AccountBalance::compute(Uuid::new_v4(), account_type, dec!(100.00), dec!(30.00));
        assert_eq!(balance.balance, expected);
    }

    #[test]
    fn account_cannot_parent_itself() {
        let id = Uuid::new_v4();
        assert!(check_parent(id, Some(id)).is_err());
        assert!(check_parent(id, Some(Uuid::new_v4())).is_ok());
        assert!(check_parent(id, None).is_ok());
    }
}
