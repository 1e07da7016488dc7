use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// A `resource:action` grant attached to a role
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "role_permissions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub role_id: Uuid,
    pub permission: String,
    pub granted: bool,
    pub created_at: DateTime<Utc>,
}

impl Model {
    pub fn resource(&self) -> &str {
        self.permission
            .split_once(':')
            .map_or(self.permission.as_str(), |(resource, _)| resource)
    }

    pub fn action(&self) -> &str {
        self.permission
            .split_once(':')
            .map_or("", |(_, action)| action)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::role::Entity",
        from = "Column::RoleId",
        to = "super::role::Column::Id",
        on_delete = "Cascade"
    )]
    Role,
}

impl Related<super::role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Role.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        if insert {
            if active_model.id.is_not_set() {
                active_model.id = Set(Uuid::new_v4());
            }
            active_model.created_at = Set(Utc::now());
        }
        Ok(active_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(permission: &str) -> Model {
        Model {
            id: Uuid::new_v4(),
            role_id: Uuid::new_v4(),
            permission: permission.to_string(),
            granted: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn splits_resource_and_action() {
        let p = grant("invoices:update");
        assert_eq!(p.resource(), "invoices");
        assert_eq!(p.action(), "update");

        let wildcard = grant("*");
        assert_eq!(wildcard.resource(), "*");
        assert_eq!(wildcard.action(), "");
    }
}
