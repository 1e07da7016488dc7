use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub invoice_number: String,
    pub invoice_type: InvoiceType,
    pub status: InvoiceStatus,
    pub customer_id: Uuid,
    pub customer_company_id: Option<Uuid>,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub sent_date: Option<DateTime<Utc>>,
    pub paid_date: Option<DateTime<Utc>>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub subtotal: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub tax_rate: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub tax_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub discount_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total_amount: Decimal,
    pub notes: String,
    pub terms_and_conditions: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Unpaid, uncancelled and past its due date
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        !matches!(self.status, InvoiceStatus::Paid | InvoiceStatus::Cancelled)
            && today > self.due_date
    }

    pub fn is_overdue(&self) -> bool {
        self.is_overdue_on(Utc::now().date_naive())
    }

    pub fn remaining_amount(&self, paid: Decimal) -> Decimal {
        self.total_amount - paid
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum InvoiceType {
    #[sea_orm(string_value = "sale")]
    Sale,
    #[sea_orm(string_value = "service")]
    Service,
    #[sea_orm(string_value = "credit")]
    Credit,
    #[sea_orm(string_value = "debit")]
    Debit,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "sent")]
    Sent,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "overdue")]
    Overdue,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::invoice_item::Entity")]
    Items,
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
    #[sea_orm(
        belongs_to = "crate::entities::core_data::contact::Entity",
        from = "Column::CustomerId",
        to = "crate::entities::core_data::contact::Column::Id",
        on_delete = "Restrict"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "crate::entities::core_data::company::Entity",
        from = "Column::CustomerCompanyId",
        to = "crate::entities::core_data::company::Column::Id",
        on_delete = "SetNull"
    )]
    CustomerCompany,
}

impl Related<super::invoice_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<crate::entities::core_data::contact::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
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
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn invoice(status: InvoiceStatus, due: NaiveDate) -> Model {
        let now = Utc::now();
        Model {
            id: Uuid::new_v4(),
            invoice_number: "INV-1".into(),
            invoice_type: InvoiceType::Sale,
            status,
            customer_id: Uuid::new_v4(),
            customer_company_id: None,
            invoice_date: due,
            due_date: due,
            sent_date: None,
            paid_date: None,
            subtotal: dec!(100.00),
            tax_rate: dec!(0),
            tax_amount: dec!(0),
            discount_amount: dec!(0),
            total_amount: dec!(100.00),
            notes: String::new(),
            terms_and_conditions: String::new(),
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    #[case(InvoiceStatus::Draft, true)]
    #[case(InvoiceStatus::Sent, true)]
    #[case(InvoiceStatus::Overdue, true)]
    #[case(InvoiceStatus::Paid, false)]
    #[case(InvoiceStatus::Cancelled, false)]
    fn overdue_depends_on_status(#[case] status: InvoiceStatus, #[case] expected: bool) {
        let due = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 1, 11).unwrap();
        assert_eq!(invoice(status, due).is_overdue_on(today), expected);
    }

    #[test]
    fn not_overdue_on_due_date() {
        let due = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert!(!invoice(InvoiceStatus::Sent, due).is_overdue_on(due));
    }

    #[test]
    fn remaining_subtracts_payments() {
        let due = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let inv = invoice(InvoiceStatus::Sent, due);
        assert_eq!(inv.remaining_amount(dec!(40.00)), dec!(60.00));
        assert_eq!(inv.remaining_amount(dec!(0)), dec!(100.00));
    }
}
