use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, DatabaseConnection, EntityTrait, JoinType, QuerySelect,
    RelationTrait, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{non_negative, nullable, patch},
    db::{ListParams, OrderingSpec, Page, QueryBuilder, SearchBuilder},
    entities::inventory::{inventory_item, product, MovementType},
    errors::ServiceError,
    services::{delete_or_404, ensure_exists, find_or_404, lookups, Actor},
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateMovementRequest {
    pub product_id: Uuid,
    /// Signed; negative quantities take stock out
    pub quantity: i32,
    pub transaction_type: MovementType,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub reference_number: String,
    #[serde(default)]
    pub notes: String,
    #[validate(custom = "non_negative")]
    pub unit_cost: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateMovementRequest {
    pub product_id: Option<Uuid>,
    pub quantity: Option<i32>,
    pub transaction_type: Option<MovementType>,
    #[validate(length(max = 100))]
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<Decimal>)]
    #[validate(custom = "non_negative")]
    pub unit_cost: Option<Option<Decimal>>,
}

impl From<CreateMovementRequest> for UpdateMovementRequest {
    fn from(req: CreateMovementRequest) -> Self {
        Self {
            product_id: Some(req.product_id),
            quantity: Some(req.quantity),
            transaction_type: Some(req.transaction_type),
            reference_number: Some(req.reference_number),
            notes: Some(req.notes),
            unit_cost: Some(req.unit_cost),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MovementResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: Option<String>,
    pub product_sku: Option<String>,
    pub quantity: i32,
    pub transaction_type: MovementType,
    pub reference_number: String,
    pub notes: String,
    pub unit_cost: Option<Decimal>,
    pub created_by: Option<Uuid>,
    pub created_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MovementFilters {
    pub product: Option<Uuid>,
    pub transaction_type: Option<MovementType>,
}

fn ordering() -> OrderingSpec {
    OrderingSpec::new()
        .field("created_at", inventory_item::Column::CreatedAt)
        .field("quantity", inventory_item::Column::Quantity)
        .default_desc(inventory_item::Column::CreatedAt)
}

type ProductLabels = std::collections::HashMap<Uuid, (String, String)>;

fn render(
    model: inventory_item::Model,
    products: &ProductLabels,
    users: &lookups::Labels,
) -> MovementResponse {
    let product = products.get(&model.product_id);
    MovementResponse {
        product_name: product.map(|(name, _)| name.clone()),
        product_sku: product.map(|(_, sku)| sku.clone()),
        created_by_name: lookups::label(users, model.created_by),
        id: model.id,
        product_id: model.product_id,
        quantity: model.quantity,
        transaction_type: model.transaction_type,
        reference_number: model.reference_number,
        notes: model.notes,
        unit_cost: model.unit_cost,
        created_by: model.created_by,
        created_at: model.created_at,
    }
}

/// Stock ledger; a product's on-hand quantity is the sum of its movements
#[derive(Clone)]
pub struct InventoryMovementService {
    db: Arc<DatabaseConnection>,
}

impl InventoryMovementService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: &ListParams,
        filters: MovementFilters,
    ) -> Result<Page<MovementResponse>, ServiceError> {
        let search = SearchBuilder::new(params.search.as_deref())
            .field(product::Column::Name)
            .field(inventory_item::Column::ReferenceNumber)
            .field(inventory_item::Column::Notes);

        let select = inventory_item::Entity::find()
            .join(JoinType::InnerJoin, inventory_item::Relation::Product.def());
        let page = QueryBuilder::new(select)
            .filter_eq(inventory_item::Column::ProductId, filters.product)
            .filter_eq(inventory_item::Column::TransactionType, filters.transaction_type)
            .list(params, search, &ordering())
            .fetch(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        let (products, users) = self.labels(&page.items).await?;
        Ok(page.map(|m| render(m, &products, &users)))
    }

    pub async fn get(&self, id: Uuid) -> Result<MovementResponse, ServiceError> {
        let model = find_or_404::<inventory_item::Entity, _>(&*self.db, id, "Inventory item").await?;
        self.respond(model).await
    }

    #[instrument(skip(self, input, actor), fields(product_id = %input.product_id, quantity = input.quantity))]
    pub async fn create(
        &self,
        input: CreateMovementRequest,
        actor: &Actor,
    ) -> Result<MovementResponse, ServiceError> {
        input.validate()?;
        ensure_exists::<product::Entity, _>(&*self.db, input.product_id, "product_id").await?;

        let model = inventory_item::ActiveModel {
            product_id: Set(input.product_id),
            quantity: Set(input.quantity),
            transaction_type: Set(input.transaction_type),
            reference_number: Set(input.reference_number),
            notes: Set(input.notes),
            unit_cost: Set(input.unit_cost),
            created_by: Set(actor.user_id),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(ServiceError::db_error)?;

        counter!(
            "farjad.inventory.movements",
            1,
            "type" => model.transaction_type.to_value()
        );
        info!(movement_id = %model.id, "Stock movement recorded");
        self.respond(model).await
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateMovementRequest,
    ) -> Result<MovementResponse, ServiceError> {
        input.validate()?;
        let existing =
            find_or_404::<inventory_item::Entity, _>(&*self.db, id, "Inventory item").await?;
        if let Some(product_id) = input.product_id {
            ensure_exists::<product::Entity, _>(&*self.db, product_id, "product_id").await?;
        }

        let mut active: inventory_item::ActiveModel = existing.into();
        patch(&mut active.product_id, input.product_id);
        patch(&mut active.quantity, input.quantity);
        patch(&mut active.transaction_type, input.transaction_type);
        patch(&mut active.reference_number, input.reference_number);
        patch(&mut active.notes, input.notes);
        patch(&mut active.unit_cost, input.unit_cost);

        let model = active
            .update(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        info!(movement_id = %id, "Stock movement updated");
        self.respond(model).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        delete_or_404::<inventory_item::Entity, _>(&*self.db, id, "Inventory item").await?;
        info!(movement_id = %id, "Stock movement deleted");
        Ok(())
    }

    async fn respond(&self, model: inventory_item::Model) -> Result<MovementResponse, ServiceError> {
        let (products, users) = self.labels(std::slice::from_ref(&model)).await?;
        Ok(render(model, &products, &users))
    }

    async fn labels(
        &self,
        rows: &[inventory_item::Model],
    ) -> Result<(ProductLabels, lookups::Labels), ServiceError> {
        let db = &*self.db;
        let products = lookups::lookup::<product::Entity, _, _, _, _>(
            db,
            product::Column::Id,
            rows.iter().map(|m| m.product_id),
            |p| (p.id, (p.name, p.sku)),
        )
        .await
        .map_err(ServiceError::db_error)?;
        let users = lookups::user_names(db, rows.iter().map(|m| m.created_by))
            .await
            .map_err(ServiceError::db_error)?;
        Ok((products, users))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outgoing_stock_uses_negative_quantity() {
        let req: CreateMovementRequest = serde_json::from_value(serde_json::json!({
            "product_id": Uuid::new_v4(),
            "quantity": -4,
            "transaction_type": "out"
        }))
        .unwrap();
        assert_eq!(req.quantity, -4);
        assert_eq!(req.transaction_type, MovementType::Out);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn negative_unit_cost_is_rejected() {
        let req = UpdateMovementRequest {
            unit_cost: Some(Some(Decimal::NEGATIVE_ONE)),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
