//! `/api/v1/services`: field service requests, service types, technicians and schedules

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use uuid::Uuid;

use super::common::{created, ok, paginated};
use crate::{
    auth::{AuthRouterExt, Resources},
    errors::ServiceError,
    services::{
        field_service::{
            requests::{
                CreateServiceNoteRequest, CreateServiceRequestRequest, RateServiceRequest,
                ServiceNoteResponse, ServiceRatingResponse, ServiceRequestFilters,
                ServiceRequestResponse, UpdateServiceRequestRequest,
            },
            schedules::{
                CreateScheduleRequest, ScheduleFilters, ScheduleResponse, UpdateScheduleRequest,
            },
            service_types::{
                CreateServiceTypeRequest, ServiceTypeFilters, ServiceTypeResponse,
                UpdateServiceTypeRequest,
            },
            technicians::{
                CreateTechnicianRequest, TechnicianFilters, TechnicianResponse,
                UpdateTechnicianRequest,
            },
        },
        Actor,
    },
    ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse,
};

type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), ServiceError>;

pub fn routes() -> Router<AppState> {
    let requests = Router::new()
        .route("/requests", get(list_requests).post(create_request))
        .route(
            "/requests/:id",
            get(get_request)
                .put(replace_request)
                .patch(update_request)
                .delete(delete_request),
        )
        .route("/requests/:id/notes", get(list_notes).post(add_note))
        .route("/requests/:id/rating", get(get_rating).put(rate_request))
        .with_resource(Resources::SERVICE_REQUESTS);

    let types = Router::new()
        .route("/types", get(list_types).post(create_type))
        .route(
            "/types/:id",
            get(get_type)
                .put(replace_type)
                .patch(update_type)
                .delete(delete_type),
        )
        .with_resource(Resources::SERVICE_TYPES);

    let technicians = Router::new()
        .route("/technicians", get(list_technicians).post(create_technician))
        .route(
            "/technicians/:id",
            get(get_technician)
                .put(replace_technician)
                .patch(update_technician)
                .delete(delete_technician),
        )
        .with_resource(Resources::TECHNICIANS);

    let schedules = Router::new()
        .route("/schedules", get(list_schedules).post(create_schedule))
        .route(
            "/schedules/:id",
            get(get_schedule)
                .put(replace_schedule)
                .patch(update_schedule)
                .delete(delete_schedule),
        )
        .with_resource(Resources::SCHEDULES);

    Router::new()
        .merge(requests)
        .merge(types)
        .merge(technicians)
        .merge(schedules)
}

// ---- service requests ----

#[utoipa::path(
    get,
    path = "/api/v1/services/requests",
    tag = "services",
    summary = "List service requests",
    params(ListQuery, ServiceRequestFilters),
    responses(
        (status = 200, description = "Service requests", body = ApiResponse<PaginatedResponse<ServiceRequestResponse>>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<ServiceRequestFilters>,
) -> ApiResult<PaginatedResponse<ServiceRequestResponse>> {
    let page = state
        .services
        .service_requests
        .list(&query.params(&state.config), filters)
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/services/requests",
    tag = "services",
    summary = "Open service request",
    description = "Supplying a technician assigns the request immediately",
    request_body = CreateServiceRequestRequest,
    responses(
        (status = 201, description = "Request opened", body = ApiResponse<ServiceRequestResponse>),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_request(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateServiceRequestRequest>,
) -> Created<ServiceRequestResponse> {
    Ok(created(
        state.services.service_requests.create(payload, &actor).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/services/requests/{id}",
    tag = "services",
    summary = "Get service request",
    params(("id" = Uuid, Path, description = "Service request ID")),
    responses(
        (status = 200, description = "Service request", body = ApiResponse<ServiceRequestResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ServiceRequestResponse> {
    Ok(ok(state.services.service_requests.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/services/requests/{id}",
    tag = "services",
    summary = "Replace service request",
    params(("id" = Uuid, Path, description = "Service request ID")),
    request_body = CreateServiceRequestRequest,
    responses((status = 200, description = "Request updated", body = ApiResponse<ServiceRequestResponse>)),
    security(("Bearer" = []))
)]
pub async fn replace_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(payload): Json<CreateServiceRequestRequest>,
) -> ApiResult<ServiceRequestResponse> {
    Ok(ok(state
        .services
        .service_requests
        .update(id, payload.into(), &actor)
        .await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/services/requests/{id}",
    tag = "services",
    summary = "Update service request",
    description = "Status moves to in_progress and completed stamp started_at and completed_at",
    params(("id" = Uuid, Path, description = "Service request ID")),
    request_body = UpdateServiceRequestRequest,
    responses((status = 200, description = "Request updated", body = ApiResponse<ServiceRequestResponse>)),
    security(("Bearer" = []))
)]
pub async fn update_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(payload): Json<UpdateServiceRequestRequest>,
) -> ApiResult<ServiceRequestResponse> {
    Ok(ok(state
        .services
        .service_requests
        .update(id, payload, &actor)
        .await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/services/requests/{id}",
    tag = "services",
    summary = "Delete service request",
    params(("id" = Uuid, Path, description = "Service request ID")),
    responses((status = 204, description = "Request deleted")),
    security(("Bearer" = []))
)]
pub async fn delete_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.service_requests.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/services/requests/{id}/notes",
    tag = "services",
    summary = "List request notes",
    params(("id" = Uuid, Path, description = "Service request ID")),
    responses(
        (status = 200, description = "Notes, newest first", body = ApiResponse<Vec<ServiceNoteResponse>>),
        (status = 404, description = "Request not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_notes(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<ServiceNoteResponse>> {
    Ok(ok(state.services.service_requests.notes(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/services/requests/{id}/notes",
    tag = "services",
    summary = "Add request note",
    params(("id" = Uuid, Path, description = "Service request ID")),
    request_body = CreateServiceNoteRequest,
    responses(
        (status = 201, description = "Note added", body = ApiResponse<ServiceNoteResponse>),
        (status = 404, description = "Request not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn add_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(payload): Json<CreateServiceNoteRequest>,
) -> Created<ServiceNoteResponse> {
    Ok(created(
        state
            .services
            .service_requests
            .add_note(id, payload, &actor)
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/services/requests/{id}/rating",
    tag = "services",
    summary = "Get request rating",
    params(("id" = Uuid, Path, description = "Service request ID")),
    responses(
        (status = 200, description = "Rating", body = ApiResponse<ServiceRatingResponse>),
        (status = 404, description = "Request missing or not yet rated", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_rating(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ServiceRatingResponse> {
    Ok(ok(state.services.service_requests.rating(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/services/requests/{id}/rating",
    tag = "services",
    summary = "Rate service request",
    description = "Creates the rating or replaces the existing one",
    params(("id" = Uuid, Path, description = "Service request ID")),
    request_body = RateServiceRequest,
    responses(
        (status = 200, description = "Rating stored", body = ApiResponse<ServiceRatingResponse>),
        (status = 400, description = "Rating outside 1..=5", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn rate_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(payload): Json<RateServiceRequest>,
) -> ApiResult<ServiceRatingResponse> {
    Ok(ok(state
        .services
        .service_requests
        .rate(id, payload, &actor)
        .await?))
}

// ---- service types ----

#[utoipa::path(
    get,
    path = "/api/v1/services/types",
    tag = "services",
    summary = "List service types",
    params(ListQuery, ServiceTypeFilters),
    responses((status = 200, description = "Service types", body = ApiResponse<PaginatedResponse<ServiceTypeResponse>>)),
    security(("Bearer" = []))
)]
pub async fn list_types(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<ServiceTypeFilters>,
) -> ApiResult<PaginatedResponse<ServiceTypeResponse>> {
    let page = state
        .services
        .service_types
        .list(&query.params(&state.config), filters)
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/services/types",
    tag = "services",
    summary = "Create service type",
    request_body = CreateServiceTypeRequest,
    responses(
        (status = 201, description = "Service type created", body = ApiResponse<ServiceTypeResponse>),
        (status = 409, description = "Name already in use", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_type(
    State(state): State<AppState>,
    Json(payload): Json<CreateServiceTypeRequest>,
) -> Created<ServiceTypeResponse> {
    Ok(created(state.services.service_types.create(payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/services/types/{id}",
    tag = "services",
    summary = "Get service type",
    params(("id" = Uuid, Path, description = "Service type ID")),
    responses(
        (status = 200, description = "Service type", body = ApiResponse<ServiceTypeResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ServiceTypeResponse> {
    Ok(ok(state.services.service_types.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/services/types/{id}",
    tag = "services",
    summary = "Replace service type",
    params(("id" = Uuid, Path, description = "Service type ID")),
    request_body = CreateServiceTypeRequest,
    responses((status = 200, description = "Service type updated", body = ApiResponse<ServiceTypeResponse>)),
    security(("Bearer" = []))
)]
pub async fn replace_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateServiceTypeRequest>,
) -> ApiResult<ServiceTypeResponse> {
    Ok(ok(state
        .services
        .service_types
        .update(id, payload.into())
        .await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/services/types/{id}",
    tag = "services",
    summary = "Update service type",
    params(("id" = Uuid, Path, description = "Service type ID")),
    request_body = UpdateServiceTypeRequest,
    responses((status = 200, description = "Service type updated", body = ApiResponse<ServiceTypeResponse>)),
    security(("Bearer" = []))
)]
pub async fn update_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateServiceTypeRequest>,
) -> ApiResult<ServiceTypeResponse> {
    Ok(ok(state.services.service_types.update(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/services/types/{id}",
    tag = "services",
    summary = "Delete service type",
    params(("id" = Uuid, Path, description = "Service type ID")),
    responses(
        (status = 204, description = "Service type deleted"),
        (status = 409, description = "Referenced by service requests", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.service_types.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- technicians ----

#[utoipa::path(
    get,
    path = "/api/v1/services/technicians",
    tag = "services",
    summary = "List technicians",
    params(ListQuery, TechnicianFilters),
    responses((status = 200, description = "Technicians", body = ApiResponse<PaginatedResponse<TechnicianResponse>>)),
    security(("Bearer" = []))
)]
pub async fn list_technicians(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<TechnicianFilters>,
) -> ApiResult<PaginatedResponse<TechnicianResponse>> {
    let page = state
        .services
        .technicians
        .list(&query.params(&state.config), filters)
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/services/technicians",
    tag = "services",
    summary = "Register technician",
    request_body = CreateTechnicianRequest,
    responses(
        (status = 201, description = "Technician registered", body = ApiResponse<TechnicianResponse>),
        (status = 409, description = "User or employee id already registered", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_technician(
    State(state): State<AppState>,
    Json(payload): Json<CreateTechnicianRequest>,
) -> Created<TechnicianResponse> {
    Ok(created(state.services.technicians.create(payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/services/technicians/{id}",
    tag = "services",
    summary = "Get technician",
    params(("id" = Uuid, Path, description = "Technician ID")),
    responses(
        (status = 200, description = "Technician", body = ApiResponse<TechnicianResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_technician(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<TechnicianResponse> {
    Ok(ok(state.services.technicians.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/services/technicians/{id}",
    tag = "services",
    summary = "Replace technician",
    params(("id" = Uuid, Path, description = "Technician ID")),
    request_body = CreateTechnicianRequest,
    responses((status = 200, description = "Technician updated", body = ApiResponse<TechnicianResponse>)),
    security(("Bearer" = []))
)]
pub async fn replace_technician(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateTechnicianRequest>,
) -> ApiResult<TechnicianResponse> {
    Ok(ok(state
        .services
        .technicians
        .update(id, payload.into())
        .await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/services/technicians/{id}",
    tag = "services",
    summary = "Update technician",
    params(("id" = Uuid, Path, description = "Technician ID")),
    request_body = UpdateTechnicianRequest,
    responses((status = 200, description = "Technician updated", body = ApiResponse<TechnicianResponse>)),
    security(("Bearer" = []))
)]
pub async fn update_technician(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTechnicianRequest>,
) -> ApiResult<TechnicianResponse> {
    Ok(ok(state.services.technicians.update(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/services/technicians/{id}",
    tag = "services",
    summary = "Delete technician",
    params(("id" = Uuid, Path, description = "Technician ID")),
    responses((status = 204, description = "Technician deleted")),
    security(("Bearer" = []))
)]
pub async fn delete_technician(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.technicians.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- schedules ----

#[utoipa::path(
    get,
    path = "/api/v1/services/schedules",
    tag = "services",
    summary = "List schedules",
    params(ListQuery, ScheduleFilters),
    responses((status = 200, description = "Schedules", body = ApiResponse<PaginatedResponse<ScheduleResponse>>)),
    security(("Bearer" = []))
)]
pub async fn list_schedules(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<ScheduleFilters>,
) -> ApiResult<PaginatedResponse<ScheduleResponse>> {
    let page = state
        .services
        .schedules
        .list(&query.params(&state.config), filters)
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/services/schedules",
    tag = "services",
    summary = "Create schedule slot",
    request_body = CreateScheduleRequest,
    responses(
        (status = 201, description = "Slot created", body = ApiResponse<ScheduleResponse>),
        (status = 400, description = "End time not after start time", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_schedule(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateScheduleRequest>,
) -> Created<ScheduleResponse> {
    Ok(created(state.services.schedules.create(payload, &actor).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/services/schedules/{id}",
    tag = "services",
    summary = "Get schedule slot",
    params(("id" = Uuid, Path, description = "Schedule ID")),
    responses(
        (status = 200, description = "Slot", body = ApiResponse<ScheduleResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ScheduleResponse> {
    Ok(ok(state.services.schedules.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/services/schedules/{id}",
    tag = "services",
    summary = "Replace schedule slot",
    params(("id" = Uuid, Path, description = "Schedule ID")),
    request_body = CreateScheduleRequest,
    responses((status = 200, description = "Slot updated", body = ApiResponse<ScheduleResponse>)),
    security(("Bearer" = []))
)]
pub async fn replace_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateScheduleRequest>,
) -> ApiResult<ScheduleResponse> {
    Ok(ok(state.services.schedules.update(id, payload.into()).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/services/schedules/{id}",
    tag = "services",
    summary = "Update schedule slot",
    params(("id" = Uuid, Path, description = "Schedule ID")),
    request_body = UpdateScheduleRequest,
    responses(
        (status = 200, description = "Slot updated", body = ApiResponse<ScheduleResponse>),
        (status = 400, description = "End time not after start time", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateScheduleRequest>,
) -> ApiResult<ScheduleResponse> {
    Ok(ok(state.services.schedules.update(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/services/schedules/{id}",
    tag = "services",
    summary = "Delete schedule slot",
    params(("id" = Uuid, Path, description = "Schedule ID")),
    responses((status = 204, description = "Slot deleted")),
    security(("Bearer" = []))
)]
pub async fn delete_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.schedules.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
