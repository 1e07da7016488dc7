use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub sku: String,
    #[sea_orm(unique)]
    pub barcode: Option<String>,
    pub description: String,
    pub short_description: String,
    pub category_id: Uuid,
    pub brand_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub cost_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub selling_price: Decimal,
    pub unit_type: UnitType,
    pub min_stock_level: i32,
    pub max_stock_level: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 3)))", nullable)]
    pub weight: Option<Decimal>,
    pub dimensions: String,
    pub status: ProductStatus,
    pub is_taxable: bool,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub tax_rate: Decimal,
    pub image: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Markup over cost as a percentage; zero when cost is not positive
pub fn profit_margin(cost_price: Decimal, selling_price: Decimal) -> Decimal {
    if cost_price > Decimal::ZERO {
        ((selling_price - cost_price) / cost_price * Decimal::ONE_HUNDRED).round_dp(2)
    } else {
        Decimal::ZERO
    }
}

/// Stock figures derived from the movement ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockLevel {
    pub current_stock: i64,
    pub is_low_stock: bool,
    pub is_out_of_stock: bool,
}

impl Model {
    pub fn profit_margin(&self) -> Decimal {
        profit_margin(self.cost_price, self.selling_price)
    }

    pub fn stock_level(&self, current_stock: i64) -> StockLevel {
        StockLevel {
            current_stock,
            is_low_stock: current_stock <= i64::from(self.min_stock_level),
            is_out_of_stock: current_stock <= 0,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    #[sea_orm(string_value = "piece")]
    Piece,
    #[sea_orm(string_value = "kg")]
    Kg,
    #[sea_orm(string_value = "gram")]
    Gram,
    #[sea_orm(string_value = "liter")]
    Liter,
    #[sea_orm(string_value = "meter")]
    Meter,
    #[sea_orm(string_value = "box")]
    Box,
    #[sea_orm(string_value = "pack")]
    Pack,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "discontinued")]
    Discontinued,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "Restrict"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::brand::Entity",
        from = "Column::BrandId",
        to = "super::brand::Column::Id",
        on_delete = "Restrict"
    )]
    Brand,
    #[sea_orm(has_many = "super::inventory_item::Entity")]
    InventoryItems,
    #[sea_orm(has_many = "super::product_image::Entity")]
    Images,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::brand::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Brand.def()
    }
}

impl Related<super::inventory_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryItems.def()
    }
}

impl Related<super::product_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();

        if insert {
            if active_model.id.is_not_set() {
                active_model.id = Set(Uuid::new_v4());
            }
            active_model.created_at = Set(now);
        }
        active_model.updated_at = Set(now);

        Ok(active_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn margin_is_relative_to_cost() {
        assert_eq!(profit_margin(dec!(80.00), dec!(100.00)), dec!(25.00));
        assert_eq!(profit_margin(dec!(100.00), dec!(90.00)), dec!(-10.00));
        assert_eq!(profit_margin(dec!(0), dec!(50.00)), dec!(0));
    }

    proptest! {
        #[test]
        fn selling_above_cost_has_positive_margin(cost in 1i64..1_000_000, markup in 1i64..1_000_000) {
            let cost = Decimal::new(cost, 2);
            let sell = cost + Decimal::new(markup, 2);
            prop_assert!(profit_margin(cost, sell) >= Decimal::ZERO);
        }
    }
}
