use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Join table between technicians and the service types they handle
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "technician_specializations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub technician_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub service_type_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::technician::Entity",
        from = "Column::TechnicianId",
        to = "super::technician::Column::Id",
        on_delete = "Cascade"
    )]
    Technician,
    #[sea_orm(
        belongs_to = "super::service_type::Entity",
        from = "Column::ServiceTypeId",
        to = "super::service_type::Column::Id",
        on_delete = "Cascade"
    )]
    ServiceType,
}

impl ActiveModelBehavior for ActiveModel {}
