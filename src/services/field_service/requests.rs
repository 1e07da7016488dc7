use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{current, non_negative, nullable, patch},
    db::{ListParams, OrderingSpec, Page, QueryBuilder, SearchBuilder},
    entities::{
        core_data::{company, contact},
        field_service::{
            service_note, service_rating, service_request, service_type, technician, Priority,
            RequestStatus,
        },
    },
    errors::ServiceError,
    services::{
        delete_or_404, ensure_exists, ensure_exists_opt, find_or_404, lookups, numbering, Actor,
    },
};

use super::technicians::technician_names;

fn default_priority() -> Priority {
    Priority::Medium
}

fn default_status() -> RequestStatus {
    RequestStatus::Pending
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateServiceRequestRequest {
    /// Generated as `SR-…` when omitted
    #[validate(length(max = 50))]
    pub request_number: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub customer_id: Uuid,
    pub customer_company_id: Option<Uuid>,
    pub service_type_id: Uuid,
    #[serde(default = "default_priority")]
    pub priority: Priority,
    #[serde(default = "default_status")]
    pub status: RequestStatus,
    pub assigned_technician_id: Option<Uuid>,
    /// Defaults to now
    pub requested_date: Option<DateTime<Utc>>,
    pub scheduled_date: Option<DateTime<Utc>>,
    #[validate(custom = "non_negative")]
    pub estimated_cost: Option<Decimal>,
    #[validate(custom = "non_negative")]
    pub actual_cost: Option<Decimal>,
    #[serde(default)]
    pub service_address: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub service_city: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateServiceRequestRequest {
    #[validate(length(min = 1, max = 50))]
    pub request_number: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub customer_id: Option<Uuid>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<Uuid>)]
    pub customer_company_id: Option<Option<Uuid>>,
    pub service_type_id: Option<Uuid>,
    pub priority: Option<Priority>,
    pub status: Option<RequestStatus>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<Uuid>)]
    pub assigned_technician_id: Option<Option<Uuid>>,
    pub requested_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub scheduled_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<Decimal>)]
    #[validate(custom = "non_negative")]
    pub estimated_cost: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<Decimal>)]
    #[validate(custom = "non_negative")]
    pub actual_cost: Option<Option<Decimal>>,
    pub service_address: Option<String>,
    #[validate(length(max = 100))]
    pub service_city: Option<String>,
}

impl From<CreateServiceRequestRequest> for UpdateServiceRequestRequest {
    fn from(req: CreateServiceRequestRequest) -> Self {
        Self {
            request_number: req.request_number.filter(|n| !n.trim().is_empty()),
            title: Some(req.title),
            description: Some(req.description),
            customer_id: Some(req.customer_id),
            customer_company_id: Some(req.customer_company_id),
            service_type_id: Some(req.service_type_id),
            priority: Some(req.priority),
            status: Some(req.status),
            assigned_technician_id: Some(req.assigned_technician_id),
            requested_date: req.requested_date,
            scheduled_date: Some(req.scheduled_date),
            estimated_cost: Some(req.estimated_cost),
            actual_cost: Some(req.actual_cost),
            service_address: Some(req.service_address),
            service_city: Some(req.service_city),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceRequestResponse {
    pub id: Uuid,
    pub request_number: String,
    pub title: String,
    pub description: String,
    pub customer_id: Uuid,
    pub customer_name: Option<String>,
    pub customer_company_id: Option<Uuid>,
    pub customer_company_name: Option<String>,
    pub service_type_id: Uuid,
    pub service_type_name: Option<String>,
    pub priority: Priority,
    pub status: RequestStatus,
    pub assigned_technician_id: Option<Uuid>,
    pub assigned_technician_name: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub assigned_by: Option<Uuid>,
    pub assigned_by_name: Option<String>,
    pub requested_date: DateTime<Utc>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub estimated_cost: Option<Decimal>,
    pub actual_cost: Option<Decimal>,
    pub service_address: String,
    pub service_city: String,
    pub created_by: Option<Uuid>,
    pub created_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ServiceRequestFilters {
    pub status: Option<RequestStatus>,
    pub priority: Option<Priority>,
    pub service_type: Option<Uuid>,
    pub assigned_technician: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateServiceNoteRequest {
    #[validate(length(min = 1))]
    pub note: String,
    #[serde(default)]
    pub is_internal: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceNoteResponse {
    pub id: Uuid,
    pub service_request_id: Uuid,
    pub note: String,
    pub is_internal: bool,
    pub created_by: Option<Uuid>,
    pub created_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RateServiceRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceRatingResponse {
    pub id: Uuid,
    pub service_request_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<service_rating::Model> for ServiceRatingResponse {
    fn from(model: service_rating::Model) -> Self {
        Self {
            id: model.id,
            service_request_id: model.service_request_id,
            rating: model.rating,
            comment: model.comment,
            created_by: model.created_by,
            created_at: model.created_at,
        }
    }
}

fn ordering() -> OrderingSpec {
    OrderingSpec::new()
        .field("created_at", service_request::Column::CreatedAt)
        .field("requested_date", service_request::Column::RequestedDate)
        .field("scheduled_date", service_request::Column::ScheduledDate)
        .field("priority", service_request::Column::Priority)
        .default_desc(service_request::Column::CreatedAt)
}

/// Stamps assignment and status timestamps on a request about to be saved.
///
/// `previous` is the stored row, `None` on create. A newly assigned
/// technician records who assigned it and when, and promotes a pending
/// request to assigned. Entering `in_progress` or `completed` records the
/// matching timestamp.
pub fn apply_lifecycle(
    active: &mut service_request::ActiveModel,
    previous: Option<&service_request::Model>,
    actor: &Actor,
    now: DateTime<Utc>,
) {
    let technician = current(&active.assigned_technician_id).flatten();
    let previous_technician = previous.and_then(|p| p.assigned_technician_id);
    if technician.is_some() && technician != previous_technician {
        active.assigned_at = Set(Some(now));
        active.assigned_by = Set(actor.user_id);
        if current(&active.status) == Some(RequestStatus::Pending) {
            active.status = Set(RequestStatus::Assigned);
        }
    }

    let status = current(&active.status);
    let previous_status = previous.map(|p| p.status);
    if status != previous_status {
        match status {
            Some(RequestStatus::InProgress) => active.started_at = Set(Some(now)),
            Some(RequestStatus::Completed) => active.completed_at = Set(Some(now)),
            _ => {}
        }
    }
}

#[derive(Default)]
struct RequestLabels {
    customers: lookups::Labels,
    companies: lookups::Labels,
    service_types: lookups::Labels,
    technicians: lookups::Labels,
    users: lookups::Labels,
}

impl RequestLabels {
    fn render(&self, model: service_request::Model) -> ServiceRequestResponse {
        ServiceRequestResponse {
            customer_name: self.customers.get(&model.customer_id).cloned(),
            customer_company_name: lookups::label(&self.companies, model.customer_company_id),
            service_type_name: self.service_types.get(&model.service_type_id).cloned(),
            assigned_technician_name: lookups::label(&self.technicians, model.assigned_technician_id),
            assigned_by_name: lookups::label(&self.users, model.assigned_by),
            created_by_name: lookups::label(&self.users, model.created_by),
            id: model.id,
            request_number: model.request_number,
            title: model.title,
            description: model.description,
            customer_id: model.customer_id,
            customer_company_id: model.customer_company_id,
            service_type_id: model.service_type_id,
            priority: model.priority,
            status: model.status,
            assigned_technician_id: model.assigned_technician_id,
            assigned_at: model.assigned_at,
            assigned_by: model.assigned_by,
            requested_date: model.requested_date,
            scheduled_date: model.scheduled_date,
            started_at: model.started_at,
            completed_at: model.completed_at,
            estimated_cost: model.estimated_cost,
            actual_cost: model.actual_cost,
            service_address: model.service_address,
            service_city: model.service_city,
            created_by: model.created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct ServiceRequestService {
    db: Arc<DatabaseConnection>,
}

impl ServiceRequestService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: &ListParams,
        filters: ServiceRequestFilters,
    ) -> Result<Page<ServiceRequestResponse>, ServiceError> {
        let search = SearchBuilder::new(params.search.as_deref())
            .field(service_request::Column::RequestNumber)
            .field(service_request::Column::Title)
            .field(service_request::Column::Description)
            .field(contact::Column::FirstName)
            .field(contact::Column::LastName);

        let select = service_request::Entity::find()
            .join(JoinType::InnerJoin, service_request::Relation::Customer.def());
        let page = QueryBuilder::new(select)
            .filter_eq(service_request::Column::Status, filters.status)
            .filter_eq(service_request::Column::Priority, filters.priority)
            .filter_eq(service_request::Column::ServiceTypeId, filters.service_type)
            .filter_eq(
                service_request::Column::AssignedTechnicianId,
                filters.assigned_technician,
            )
            .list(params, search, &ordering())
            .fetch(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        let labels = self.labels(&page.items).await?;
        Ok(page.map(|r| labels.render(r)))
    }

    pub async fn get(&self, id: Uuid) -> Result<ServiceRequestResponse, ServiceError> {
        let model = find_or_404::<service_request::Entity, _>(&*self.db, id, "Service request").await?;
        self.respond(model).await
    }

    #[instrument(skip(self, input, actor), fields(customer_id = %input.customer_id))]
    pub async fn create(
        &self,
        input: CreateServiceRequestRequest,
        actor: &Actor,
    ) -> Result<ServiceRequestResponse, ServiceError> {
        input.validate()?;
        let db = &*self.db;
        ensure_exists::<contact::Entity, _>(db, input.customer_id, "customer_id").await?;
        ensure_exists_opt::<company::Entity, _>(db, input.customer_company_id, "customer_company_id")
            .await?;
        ensure_exists::<service_type::Entity, _>(db, input.service_type_id, "service_type_id").await?;
        ensure_exists_opt::<technician::Entity, _>(
            db,
            input.assigned_technician_id,
            "assigned_technician_id",
        )
        .await?;

        let request_number = numbering::provided_or_next::<service_request::Entity, _>(
            db,
            service_request::Column::RequestNumber,
            numbering::SERVICE_REQUEST_PREFIX,
            input.request_number,
        )
        .await
        .map_err(ServiceError::db_error)?;

        let now = Utc::now();
        let mut active = service_request::ActiveModel {
            request_number: Set(request_number),
            title: Set(input.title),
            description: Set(input.description),
            customer_id: Set(input.customer_id),
            customer_company_id: Set(input.customer_company_id),
            service_type_id: Set(input.service_type_id),
            priority: Set(input.priority),
            status: Set(input.status),
            assigned_technician_id: Set(input.assigned_technician_id),
            assigned_at: Set(None),
            assigned_by: Set(None),
            requested_date: Set(input.requested_date.unwrap_or(now)),
            scheduled_date: Set(input.scheduled_date),
            started_at: Set(None),
            completed_at: Set(None),
            estimated_cost: Set(input.estimated_cost),
            actual_cost: Set(input.actual_cost),
            service_address: Set(input.service_address),
            service_city: Set(input.service_city),
            created_by: Set(actor.user_id),
            ..Default::default()
        };
        apply_lifecycle(&mut active, None, actor, now);

        let model = active.insert(db).await.map_err(ServiceError::db_error)?;
        counter!("farjad.service_requests.created", 1, "priority" => model.priority.to_value());
        info!(request_id = %model.id, number = %model.request_number, "Service request created");
        self.respond(model).await
    }

    #[instrument(skip(self, input, actor))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateServiceRequestRequest,
        actor: &Actor,
    ) -> Result<ServiceRequestResponse, ServiceError> {
        input.validate()?;
        let db = &*self.db;
        let existing = find_or_404::<service_request::Entity, _>(db, id, "Service request").await?;
        if let Some(customer_id) = input.customer_id {
            ensure_exists::<contact::Entity, _>(db, customer_id, "customer_id").await?;
        }
        ensure_exists_opt::<company::Entity, _>(
            db,
            input.customer_company_id.flatten(),
            "customer_company_id",
        )
        .await?;
        if let Some(service_type_id) = input.service_type_id {
            ensure_exists::<service_type::Entity, _>(db, service_type_id, "service_type_id").await?;
        }
        ensure_exists_opt::<technician::Entity, _>(
            db,
            input.assigned_technician_id.flatten(),
            "assigned_technician_id",
        )
        .await?;

        let mut active: service_request::ActiveModel = existing.clone().into();
        patch(&mut active.request_number, input.request_number);
        patch(&mut active.title, input.title);
        patch(&mut active.description, input.description);
        patch(&mut active.customer_id, input.customer_id);
        patch(&mut active.customer_company_id, input.customer_company_id);
        patch(&mut active.service_type_id, input.service_type_id);
        patch(&mut active.priority, input.priority);
        patch(&mut active.status, input.status);
        patch(&mut active.assigned_technician_id, input.assigned_technician_id);
        patch(&mut active.requested_date, input.requested_date);
        patch(&mut active.scheduled_date, input.scheduled_date);
        patch(&mut active.estimated_cost, input.estimated_cost);
        patch(&mut active.actual_cost, input.actual_cost);
        patch(&mut active.service_address, input.service_address);
        patch(&mut active.service_city, input.service_city);
        apply_lifecycle(&mut active, Some(&existing), actor, Utc::now());

        let model = active.update(db).await.map_err(ServiceError::db_error)?;
        if model.status != existing.status {
            info!(
                request_id = %id,
                from = %existing.status.to_value(),
                to = %model.status.to_value(),
                "Service request status changed"
            );
        }
        self.respond(model).await
    }

    /// Notes, schedules and the rating are removed with the request
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        delete_or_404::<service_request::Entity, _>(&*self.db, id, "Service request").await?;
        info!(request_id = %id, "Service request deleted");
        Ok(())
    }

    pub async fn notes(&self, request_id: Uuid) -> Result<Vec<ServiceNoteResponse>, ServiceError> {
        let db = &*self.db;
        find_or_404::<service_request::Entity, _>(db, request_id, "Service request").await?;
        let notes = service_note::Entity::find()
            .filter(service_note::Column::ServiceRequestId.eq(request_id))
            .order_by_desc(service_note::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;
        let users = lookups::user_names(db, notes.iter().map(|n| n.created_by))
            .await
            .map_err(ServiceError::db_error)?;
        Ok(notes
            .into_iter()
            .map(|n| Self::render_note(n, &users))
            .collect())
    }

    #[instrument(skip(self, input, actor))]
    pub async fn add_note(
        &self,
        request_id: Uuid,
        input: CreateServiceNoteRequest,
        actor: &Actor,
    ) -> Result<ServiceNoteResponse, ServiceError> {
        input.validate()?;
        let db = &*self.db;
        find_or_404::<service_request::Entity, _>(db, request_id, "Service request").await?;

        let note = service_note::ActiveModel {
            service_request_id: Set(request_id),
            note: Set(input.note),
            is_internal: Set(input.is_internal),
            created_by: Set(actor.user_id),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(request_id = %request_id, note_id = %note.id, "Service note added");
        let users = lookups::user_names(db, [note.created_by])
            .await
            .map_err(ServiceError::db_error)?;
        Ok(Self::render_note(note, &users))
    }

    pub async fn rating(&self, request_id: Uuid) -> Result<ServiceRatingResponse, ServiceError> {
        let db = &*self.db;
        find_or_404::<service_request::Entity, _>(db, request_id, "Service request").await?;
        service_rating::Entity::find()
            .filter(service_rating::Column::ServiceRequestId.eq(request_id))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .map(ServiceRatingResponse::from)
            .ok_or_else(|| ServiceError::NotFound(format!("Service request {request_id} has no rating")))
    }

    /// Creates the rating or replaces the existing one
    #[instrument(skip(self, input, actor), fields(rating = input.rating))]
    pub async fn rate(
        &self,
        request_id: Uuid,
        input: RateServiceRequest,
        actor: &Actor,
    ) -> Result<ServiceRatingResponse, ServiceError> {
        input.validate()?;
        let db = &*self.db;
        find_or_404::<service_request::Entity, _>(db, request_id, "Service request").await?;

        let existing = service_rating::Entity::find()
            .filter(service_rating::Column::ServiceRequestId.eq(request_id))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;

        let model = match existing {
            Some(rating) => {
                let mut active: service_rating::ActiveModel = rating.into();
                active.rating = Set(input.rating);
                active.comment = Set(input.comment);
                active.update(db).await
            }
            None => {
                service_rating::ActiveModel {
                    service_request_id: Set(request_id),
                    rating: Set(input.rating),
                    comment: Set(input.comment),
                    created_by: Set(actor.user_id),
                    ..Default::default()
                }
                .insert(db)
                .await
            }
        }
        .map_err(ServiceError::db_error)?;

        info!(request_id = %request_id, rating = model.rating, "Service rated");
        Ok(model.into())
    }

    fn render_note(model: service_note::Model, users: &lookups::Labels) -> ServiceNoteResponse {
        ServiceNoteResponse {
            created_by_name: lookups::label(users, model.created_by),
            id: model.id,
            service_request_id: model.service_request_id,
            note: model.note,
            is_internal: model.is_internal,
            created_by: model.created_by,
            created_at: model.created_at,
        }
    }

    async fn respond(
        &self,
        model: service_request::Model,
    ) -> Result<ServiceRequestResponse, ServiceError> {
        let labels = self.labels(std::slice::from_ref(&model)).await?;
        Ok(labels.render(model))
    }

    async fn labels(&self, rows: &[service_request::Model]) -> Result<RequestLabels, ServiceError> {
        if rows.is_empty() {
            return Ok(RequestLabels::default());
        }
        let db = &*self.db;
        let customers = lookups::contact_names(db, rows.iter().map(|r| r.customer_id))
            .await
            .map_err(ServiceError::db_error)?;
        let companies = lookups::company_names(db, rows.iter().map(|r| r.customer_company_id))
            .await
            .map_err(ServiceError::db_error)?;
        let service_types = lookups::lookup::<service_type::Entity, _, _, _, _>(
            db,
            service_type::Column::Id,
            rows.iter().map(|r| r.service_type_id),
            |t| (t.id, t.name),
        )
        .await
        .map_err(ServiceError::db_error)?;
        let technicians = technician_names(db, rows.iter().map(|r| r.assigned_technician_id)).await?;
        let users = lookups::user_names(db, rows.iter().flat_map(|r| [r.created_by, r.assigned_by]))
            .await
            .map_err(ServiceError::db_error)?;

        Ok(RequestLabels {
            customers,
            companies,
            service_types,
            technicians,
            users,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(status: RequestStatus, technician: Option<Uuid>) -> service_request::Model {
        let now = Utc::now();
        service_request::Model {
            id: Uuid::new_v4(),
            request_number: "SR-20240101090000".into(),
            title: "Leaking pipe".into(),
            description: String::new(),
            customer_id: Uuid::new_v4(),
            customer_company_id: None,
            service_type_id: Uuid::new_v4(),
            priority: Priority::Medium,
            status,
            assigned_technician_id: technician,
            assigned_at: None,
            assigned_by: None,
            requested_date: now,
            scheduled_date: None,
            started_at: None,
            completed_at: None,
            estimated_cost: None,
            actual_cost: None,
            service_address: String::new(),
            service_city: String::new(),
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn assigning_technician_promotes_pending_request() {
        let previous = stored(RequestStatus::Pending, None);
        let dispatcher = Uuid::new_v4();
        let technician = Uuid::new_v4();
        let now = Utc::now();

        let mut active: service_request::ActiveModel = previous.clone().into();
        active.assigned_technician_id = Set(Some(technician));
        apply_lifecycle(&mut active, Some(&previous), &Actor::user(dispatcher), now);

        assert_eq!(current(&active.status), Some(RequestStatus::Assigned));
        assert_eq!(current(&active.assigned_at), Some(Some(now)));
        assert_eq!(current(&active.assigned_by), Some(Some(dispatcher)));
    }

    #[test]
    fn same_technician_keeps_original_assignment() {
        let technician = Uuid::new_v4();
        let previous = stored(RequestStatus::Assigned, Some(technician));

        let mut active: service_request::ActiveModel = previous.clone().into();
        active.title = Set("Leaking pipe, kitchen".into());
        apply_lifecycle(&mut active, Some(&previous), &Actor::user(Uuid::new_v4()), Utc::now());

        assert_eq!(current(&active.assigned_at), Some(None));
        assert_eq!(current(&active.assigned_by), Some(None));
    }

    #[test]
    fn reassigning_keeps_non_pending_status() {
        let previous = stored(RequestStatus::OnHold, Some(Uuid::new_v4()));
        let mut active: service_request::ActiveModel = previous.clone().into();
        active.assigned_technician_id = Set(Some(Uuid::new_v4()));
        apply_lifecycle(&mut active, Some(&previous), &Actor::system(), Utc::now());

        assert_eq!(current(&active.status), Some(RequestStatus::OnHold));
        assert!(current(&active.assigned_at).flatten().is_some());
    }

    #[test]
    fn status_transitions_stamp_progress() {
        let previous = stored(RequestStatus::Assigned, Some(Uuid::new_v4()));
        let now = Utc::now();

        let mut active: service_request::ActiveModel = previous.clone().into();
        active.status = Set(RequestStatus::InProgress);
        apply_lifecycle(&mut active, Some(&previous), &Actor::system(), now);
        assert_eq!(current(&active.started_at), Some(Some(now)));
        assert_eq!(current(&active.completed_at), Some(None));

        let mut active: service_request::ActiveModel = previous.clone().into();
        active.status = Set(RequestStatus::Completed);
        apply_lifecycle(&mut active, Some(&previous), &Actor::system(), now);
        assert_eq!(current(&active.completed_at), Some(Some(now)));
    }

    #[test]
    fn create_with_technician_starts_assigned() {
        let mut active = service_request::ActiveModel {
            status: Set(RequestStatus::Pending),
            assigned_technician_id: Set(Some(Uuid::new_v4())),
            ..Default::default()
        };
        apply_lifecycle(&mut active, None, &Actor::system(), Utc::now());
        assert_eq!(current(&active.status), Some(RequestStatus::Assigned));
    }

    #[test]
    fn rating_must_be_one_to_five() {
        for (rating, ok) in [(0, false), (1, true), (5, true), (6, false)] {
            let req = RateServiceRequest {
                rating,
                comment: String::new(),
            };
            assert_eq!(req.validate().is_ok(), ok, "rating {rating}");
        }
    }
}
