use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::common::current;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoice_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub unit_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub discount_percentage: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub line_total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `unit_price × quantity` less the percentage discount, rounded half-even to cents
pub fn line_total(quantity: Decimal, unit_price: Decimal, discount_percentage: Decimal) -> Decimal {
    let gross = unit_price * quantity;
    let discount = gross * discount_percentage / Decimal::ONE_HUNDRED;
    (gross - discount).round_dp(2)
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::invoice::Entity",
        from = "Column::InvoiceId",
        to = "super::invoice::Column::Id",
        on_delete = "Cascade"
    )]
    Invoice,
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoice.def()
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

        if let (Some(quantity), Some(unit_price), Some(discount)) = (
            current(&active_model.quantity),
            current(&active_model.unit_price),
            current(&active_model.discount_percentage),
        ) {
            active_model.line_total = Set(line_total(quantity, unit_price, discount));
        }

        Ok(active_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn applies_percentage_discount() {
        assert_eq!(line_total(dec!(3), dec!(10.00), dec!(10)), dec!(27.00));
        // Midpoints round to the even cent
        assert_eq!(line_total(dec!(1.5), dec!(19.99), dec!(0)), dec!(29.98));
        assert_eq!(line_total(dec!(1.5), dec!(19.97), dec!(0)), dec!(29.96));
        assert_eq!(line_total(dec!(2), dec!(50.00), dec!(100)), dec!(0.00));
    }

    proptest! {
        #[test]
        fn total_never_exceeds_gross(
            qty in 1u32..10_000,
            cents in 0u32..1_000_000,
            discount in 0u32..=100,
        ) {
            let quantity = Decimal::from(qty);
            let price = Decimal::new(cents as i64, 2);
            let total = line_total(quantity, price, Decimal::from(discount));
            prop_assert!(total >= Decimal::ZERO);
            prop_assert!(total <= (price * quantity).round_dp(2));
        }
    }
}
