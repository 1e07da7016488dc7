use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, JoinType, QuerySelect, RelationTrait, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{current, patch},
    db::{ListParams, OrderingSpec, Page, QueryBuilder, SearchBuilder},
    entities::{
        accounts::user,
        field_service::{schedule, service_request, technician},
    },
    errors::ServiceError,
    services::{delete_or_404, ensure_exists, find_or_404, lookups, Actor},
};

use super::technicians::technician_names;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateScheduleRequest {
    pub technician_id: Uuid,
    pub service_request_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub is_confirmed: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateScheduleRequest {
    pub technician_id: Option<Uuid>,
    pub service_request_id: Option<Uuid>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub is_confirmed: Option<bool>,
}

impl From<CreateScheduleRequest> for UpdateScheduleRequest {
    fn from(req: CreateScheduleRequest) -> Self {
        Self {
            technician_id: Some(req.technician_id),
            service_request_id: Some(req.service_request_id),
            start_time: Some(req.start_time),
            end_time: Some(req.end_time),
            notes: Some(req.notes),
            is_confirmed: Some(req.is_confirmed),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScheduleResponse {
    pub id: Uuid,
    pub technician_id: Uuid,
    pub technician_name: Option<String>,
    pub service_request_id: Uuid,
    pub service_request_number: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub notes: String,
    pub is_confirmed: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScheduleFilters {
    pub technician: Option<Uuid>,
    pub is_confirmed: Option<bool>,
}

fn ordering() -> OrderingSpec {
    OrderingSpec::new()
        .field("start_time", schedule::Column::StartTime)
        .field("end_time", schedule::Column::EndTime)
        .field("created_at", schedule::Column::CreatedAt)
        .default_asc(schedule::Column::StartTime)
}

pub fn check_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), ServiceError> {
    if start >= end {
        return Err(ServiceError::ValidationError(
            "End time must be after start time.".to_string(),
        ));
    }
    Ok(())
}

#[derive(Default)]
struct ScheduleLabels {
    technicians: lookups::Labels,
    requests: lookups::Labels,
}

impl ScheduleLabels {
    fn render(&self, model: schedule::Model) -> ScheduleResponse {
        ScheduleResponse {
            technician_name: self.technicians.get(&model.technician_id).cloned(),
            service_request_number: self.requests.get(&model.service_request_id).cloned(),
            id: model.id,
            technician_id: model.technician_id,
            service_request_id: model.service_request_id,
            start_time: model.start_time,
            end_time: model.end_time,
            notes: model.notes,
            is_confirmed: model.is_confirmed,
            created_by: model.created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Technician bookings against service requests
#[derive(Clone)]
pub struct ScheduleService {
    db: Arc<DatabaseConnection>,
}

impl ScheduleService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: &ListParams,
        filters: ScheduleFilters,
    ) -> Result<Page<ScheduleResponse>, ServiceError> {
        let search = SearchBuilder::new(params.search.as_deref())
            .field(user::Column::FirstName)
            .field(user::Column::LastName)
            .field(schedule::Column::Notes);

        let select = schedule::Entity::find()
            .join(JoinType::InnerJoin, schedule::Relation::Technician.def())
            .join(JoinType::InnerJoin, technician::Relation::User.def());
        let page = QueryBuilder::new(select)
            .filter_eq(schedule::Column::TechnicianId, filters.technician)
            .filter_eq(schedule::Column::IsConfirmed, filters.is_confirmed)
            .list(params, search, &ordering())
            .fetch(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        let labels = self.labels(&page.items).await?;
        Ok(page.map(|s| labels.render(s)))
    }

    pub async fn get(&self, id: Uuid) -> Result<ScheduleResponse, ServiceError> {
        let model = find_or_404::<schedule::Entity, _>(&*self.db, id, "Schedule").await?;
        self.respond(model).await
    }

    #[instrument(skip(self, input, actor), fields(technician_id = %input.technician_id))]
    pub async fn create(
        &self,
        input: CreateScheduleRequest,
        actor: &Actor,
    ) -> Result<ScheduleResponse, ServiceError> {
        input.validate()?;
        check_window(input.start_time, input.end_time)?;
        let db = &*self.db;
        ensure_exists::<technician::Entity, _>(db, input.technician_id, "technician_id").await?;
        ensure_exists::<service_request::Entity, _>(db, input.service_request_id, "service_request_id")
            .await?;

        let model = schedule::ActiveModel {
            technician_id: Set(input.technician_id),
            service_request_id: Set(input.service_request_id),
            start_time: Set(input.start_time),
            end_time: Set(input.end_time),
            notes: Set(input.notes),
            is_confirmed: Set(input.is_confirmed),
            created_by: Set(actor.user_id),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(schedule_id = %model.id, start = %model.start_time, "Schedule created");
        self.respond(model).await
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateScheduleRequest,
    ) -> Result<ScheduleResponse, ServiceError> {
        input.validate()?;
        let db = &*self.db;
        let existing = find_or_404::<schedule::Entity, _>(db, id, "Schedule").await?;
        if let Some(technician_id) = input.technician_id {
            ensure_exists::<technician::Entity, _>(db, technician_id, "technician_id").await?;
        }
        if let Some(request_id) = input.service_request_id {
            ensure_exists::<service_request::Entity, _>(db, request_id, "service_request_id").await?;
        }

        let mut active: schedule::ActiveModel = existing.into();
        patch(&mut active.technician_id, input.technician_id);
        patch(&mut active.service_request_id, input.service_request_id);
        patch(&mut active.start_time, input.start_time);
        patch(&mut active.end_time, input.end_time);
        patch(&mut active.notes, input.notes);
        patch(&mut active.is_confirmed, input.is_confirmed);
        if let (Some(start), Some(end)) = (current(&active.start_time), current(&active.end_time)) {
            check_window(start, end)?;
        }

        let model = active.update(db).await.map_err(ServiceError::db_error)?;
        info!(schedule_id = %id, "Schedule updated");
        self.respond(model).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        delete_or_404::<schedule::Entity, _>(&*self.db, id, "Schedule").await?;
        info!(schedule_id = %id, "Schedule deleted");
        Ok(())
    }

    async fn respond(&self, model: schedule::Model) -> Result<ScheduleResponse, ServiceError> {
        let labels = self.labels(std::slice::from_ref(&model)).await?;
        Ok(labels.render(model))
    }

    async fn labels(&self, rows: &[schedule::Model]) -> Result<ScheduleLabels, ServiceError> {
        if rows.is_empty() {
            return Ok(ScheduleLabels::default());
        }
        let db = &*self.db;
        let technicians = technician_names(db, rows.iter().map(|s| s.technician_id)).await?;
        let requests = lookups::lookup::<service_request::Entity, _, _, _, _>(
            db,
            service_request::Column::Id,
            rows.iter().map(|s| s.service_request_id),
            |r| (r.id, r.request_number),
        )
        .await
        .map_err(ServiceError::db_error)?;
        Ok(ScheduleLabels {
            technicians,
            requests,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Duration;

    #[test]
    fn window_must_move_forward() {
        let start = Utc::now();
        assert!(check_window(start, start + Duration::hours(2)).is_ok());
        assert_matches!(
            check_window(start, start),
            Err(ServiceError::ValidationError(msg)) if msg == "End time must be after start time."
        );
        assert!(check_window(start, start - Duration::minutes(1)).is_err());
    }
}
