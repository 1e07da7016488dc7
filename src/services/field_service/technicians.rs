use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, JoinType,
    QueryFilter, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{non_negative, patch},
    db::{ListParams, OrderingSpec, Page, QueryBuilder, SearchBuilder},
    entities::{
        accounts::user,
        field_service::{service_type, technician, technician_specialization, SkillLevel},
    },
    errors::ServiceError,
    services::{delete_or_404, ensure_exists, find_or_404, lookups},
};

fn default_true() -> bool {
    true
}

fn default_skill_level() -> SkillLevel {
    SkillLevel::Junior
}

fn default_max_daily_hours() -> i32 {
    8
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTechnicianRequest {
    pub user_id: Uuid,
    #[validate(length(min = 1, max = 20))]
    pub employee_id: String,
    #[serde(default = "default_skill_level")]
    pub skill_level: SkillLevel,
    /// Service type ids this technician handles
    #[serde(default)]
    pub specializations: Vec<Uuid>,
    #[serde(default)]
    #[validate(custom = "non_negative")]
    pub hourly_rate: Decimal,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default = "default_max_daily_hours")]
    #[validate(range(min = 1, max = 24))]
    pub max_daily_hours: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTechnicianRequest {
    pub user_id: Option<Uuid>,
    #[validate(length(min = 1, max = 20))]
    pub employee_id: Option<String>,
    pub skill_level: Option<SkillLevel>,
    /// Replaces the whole set when present
    pub specializations: Option<Vec<Uuid>>,
    #[validate(custom = "non_negative")]
    pub hourly_rate: Option<Decimal>,
    pub is_available: Option<bool>,
    #[validate(range(min = 1, max = 24))]
    pub max_daily_hours: Option<i32>,
}

impl From<CreateTechnicianRequest> for UpdateTechnicianRequest {
    fn from(req: CreateTechnicianRequest) -> Self {
        Self {
            user_id: Some(req.user_id),
            employee_id: Some(req.employee_id),
            skill_level: Some(req.skill_level),
            specializations: Some(req.specializations),
            hourly_rate: Some(req.hourly_rate),
            is_available: Some(req.is_available),
            max_daily_hours: Some(req.max_daily_hours),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TechnicianResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub full_name: Option<String>,
    pub employee_id: String,
    pub skill_level: SkillLevel,
    pub specializations: Vec<Uuid>,
    pub hourly_rate: Decimal,
    pub is_available: bool,
    pub max_daily_hours: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TechnicianFilters {
    pub skill_level: Option<SkillLevel>,
    pub is_available: Option<bool>,
}

fn ordering() -> OrderingSpec {
    OrderingSpec::new()
        .field("user__last_name", user::Column::LastName)
        .field("skill_level", technician::Column::SkillLevel)
        .field("created_at", technician::Column::CreatedAt)
        .default_asc(user::Column::LastName)
        .default_asc(user::Column::FirstName)
}

/// Technician display name, as used by requests and schedules
pub(crate) async fn technician_names<C, I>(db: &C, ids: I) -> Result<lookups::Labels, ServiceError>
where
    C: ConnectionTrait,
    I: IntoIterator,
    I::Item: Into<Option<Uuid>>,
{
    let technicians = lookups::lookup::<technician::Entity, _, _, _, _>(
        db,
        technician::Column::Id,
        ids,
        |t| (t.id, t.user_id),
    )
    .await
    .map_err(ServiceError::db_error)?;
    let users = lookups::user_names(db, technicians.values().copied())
        .await
        .map_err(ServiceError::db_error)?;

    Ok(technicians
        .into_iter()
        .filter_map(|(id, user_id)| users.get(&user_id).map(|name| (id, name.clone())))
        .collect())
}

/// Username, email and full name of the linked account
type UserLabel = (String, String, String);

#[derive(Default)]
struct TechnicianLabels {
    users: HashMap<Uuid, UserLabel>,
    specializations: HashMap<Uuid, Vec<Uuid>>,
}

impl TechnicianLabels {
    fn render(&mut self, model: technician::Model) -> TechnicianResponse {
        let user = self.users.get(&model.user_id);
        TechnicianResponse {
            user_name: user.map(|(username, _, _)| username.clone()),
            user_email: user.map(|(_, email, _)| email.clone()),
            full_name: user.map(|(_, _, full_name)| full_name.clone()),
            specializations: self.specializations.remove(&model.id).unwrap_or_default(),
            id: model.id,
            user_id: model.user_id,
            employee_id: model.employee_id,
            skill_level: model.skill_level,
            hourly_rate: model.hourly_rate,
            is_available: model.is_available,
            max_daily_hours: model.max_daily_hours,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct TechnicianService {
    db: Arc<DatabaseConnection>,
}

impl TechnicianService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: &ListParams,
        filters: TechnicianFilters,
    ) -> Result<Page<TechnicianResponse>, ServiceError> {
        let search = SearchBuilder::new(params.search.as_deref())
            .field(user::Column::FirstName)
            .field(user::Column::LastName)
            .field(technician::Column::EmployeeId);

        let select = technician::Entity::find()
            .join(JoinType::InnerJoin, technician::Relation::User.def());
        let page = QueryBuilder::new(select)
            .filter_eq(technician::Column::SkillLevel, filters.skill_level)
            .filter_eq(technician::Column::IsAvailable, filters.is_available)
            .list(params, search, &ordering())
            .fetch(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        let mut labels = self.labels(&page.items).await?;
        Ok(page.map(|t| labels.render(t)))
    }

    pub async fn get(&self, id: Uuid) -> Result<TechnicianResponse, ServiceError> {
        let model = find_or_404::<technician::Entity, _>(&*self.db, id, "Technician").await?;
        self.respond(model).await
    }

    #[instrument(skip(self, input), fields(employee_id = %input.employee_id))]
    pub async fn create(
        &self,
        input: CreateTechnicianRequest,
    ) -> Result<TechnicianResponse, ServiceError> {
        input.validate()?;
        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;
        ensure_exists::<user::Entity, _>(&txn, input.user_id, "user_id").await?;

        let model = technician::ActiveModel {
            user_id: Set(input.user_id),
            employee_id: Set(input.employee_id),
            skill_level: Set(input.skill_level),
            hourly_rate: Set(input.hourly_rate),
            is_available: Set(input.is_available),
            max_daily_hours: Set(input.max_daily_hours),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(ServiceError::db_error)?;

        Self::replace_specializations(&txn, model.id, &input.specializations).await?;
        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(technician_id = %model.id, "Technician created");
        self.respond(model).await
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateTechnicianRequest,
    ) -> Result<TechnicianResponse, ServiceError> {
        input.validate()?;
        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;
        let existing = find_or_404::<technician::Entity, _>(&txn, id, "Technician").await?;
        if let Some(user_id) = input.user_id {
            ensure_exists::<user::Entity, _>(&txn, user_id, "user_id").await?;
        }

        let mut active: technician::ActiveModel = existing.into();
        patch(&mut active.user_id, input.user_id);
        patch(&mut active.employee_id, input.employee_id);
        patch(&mut active.skill_level, input.skill_level);
        patch(&mut active.hourly_rate, input.hourly_rate);
        patch(&mut active.is_available, input.is_available);
        patch(&mut active.max_daily_hours, input.max_daily_hours);

        let model = active.update(&txn).await.map_err(ServiceError::db_error)?;
        if let Some(specializations) = input.specializations {
            Self::replace_specializations(&txn, id, &specializations).await?;
        }
        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(technician_id = %id, "Technician updated");
        self.respond(model).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        delete_or_404::<technician::Entity, _>(&*self.db, id, "Technician").await?;
        info!(technician_id = %id, "Technician deleted");
        Ok(())
    }

    async fn replace_specializations<C: ConnectionTrait>(
        db: &C,
        technician_id: Uuid,
        service_type_ids: &[Uuid],
    ) -> Result<(), ServiceError> {
        let mut ids = service_type_ids.to_vec();
        ids.sort();
        ids.dedup();
        for service_type_id in &ids {
            ensure_exists::<service_type::Entity, _>(db, *service_type_id, "specializations").await?;
        }

        technician_specialization::Entity::delete_many()
            .filter(technician_specialization::Column::TechnicianId.eq(technician_id))
            .exec(db)
            .await
            .map_err(ServiceError::db_error)?;

        if ids.is_empty() {
            return Ok(());
        }
        let rows = ids
            .into_iter()
            .map(|service_type_id| technician_specialization::ActiveModel {
                technician_id: Set(technician_id),
                service_type_id: Set(service_type_id),
            });
        technician_specialization::Entity::insert_many(rows)
            .exec(db)
            .await
            .map_err(ServiceError::db_error)?;
        Ok(())
    }

    async fn respond(&self, model: technician::Model) -> Result<TechnicianResponse, ServiceError> {
        let mut labels = self.labels(std::slice::from_ref(&model)).await?;
        Ok(labels.render(model))
    }

    async fn labels(&self, rows: &[technician::Model]) -> Result<TechnicianLabels, ServiceError> {
        if rows.is_empty() {
            return Ok(TechnicianLabels::default());
        }
        let db = &*self.db;
        let users = lookups::lookup::<user::Entity, _, _, _, _>(
            db,
            user::Column::Id,
            rows.iter().map(|t| t.user_id),
            |u| {
                let full_name = u.full_name();
                (u.id, (u.username, u.email, full_name))
            },
        )
        .await
        .map_err(ServiceError::db_error)?;

        let pairs: Vec<(Uuid, Uuid)> = technician_specialization::Entity::find()
            .select_only()
            .column(technician_specialization::Column::TechnicianId)
            .column(technician_specialization::Column::ServiceTypeId)
            .filter(technician_specialization::Column::TechnicianId.is_in(rows.iter().map(|t| t.id)))
            .into_tuple()
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;
        let mut specializations: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for (technician_id, service_type_id) in pairs {
            specializations.entry(technician_id).or_default().push(service_type_id);
        }

        Ok(TechnicianLabels {
            users,
            specializations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(24, true)]
    #[case(25, false)]
    fn daily_hours_bounds(#[case] hours: i32, #[case] valid: bool) {
        let req = UpdateTechnicianRequest {
            max_daily_hours: Some(hours),
            ..Default::default()
        };
        assert_eq!(req.validate().is_ok(), valid);
    }

    #[test]
    fn create_defaults() {
        let req: CreateTechnicianRequest = serde_json::from_value(serde_json::json!({
            "user_id": Uuid::new_v4(),
            "employee_id": "T-042"
        }))
        .unwrap();
        assert_eq!(req.max_daily_hours, 8);
        assert_eq!(req.skill_level, SkillLevel::Junior);
        assert!(req.is_available);
        assert!(req.specializations.is_empty());
    }

    #[test]
    fn ordering_uses_user_names_by_default() {
        assert_eq!(ordering().resolve(None).len(), 2);
        assert_eq!(ordering().resolve(Some("-user__last_name")).len(), 1);
    }
}
