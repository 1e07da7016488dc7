//! `/api/v1/core`: contacts, companies, addresses, configurations and the audit trail

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
    health,
    services::{
        core_data::{
            addresses::{AddressFilters, AddressResponse, CreateAddressRequest, UpdateAddressRequest},
            audit_logs::{AuditLogFilters, AuditLogResponse},
            companies::{
                CompanyFilters, CompanyResponse, CompanyStatistics, CreateCompanyRequest,
                UpdateCompanyRequest,
            },
            configurations::{
                ConfigurationFilters, ConfigurationResponse, CreateConfigurationRequest,
                UpdateConfigurationRequest,
            },
            contacts::{
                ContactFilters, ContactResponse, ContactStatistics, CreateContactRequest,
                UpdateContactRequest,
            },
        },
        Actor,
    },
    ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse,
};

pub fn routes() -> Router<AppState> {
    let contacts = Router::new()
        .route("/contacts", get(list_contacts).post(create_contact))
        .route("/contacts/statistics", get(contact_statistics))
        .route(
            "/contacts/:id",
            get(get_contact)
                .put(replace_contact)
                .patch(update_contact)
                .delete(delete_contact),
        )
        .with_resource(Resources::CONTACTS);

    let companies = Router::new()
        .route("/companies", get(list_companies).post(create_company))
        .route("/companies/statistics", get(company_statistics))
        .route(
            "/companies/:id",
            get(get_company)
                .put(replace_company)
                .patch(update_company)
                .delete(delete_company),
        )
        .with_resource(Resources::COMPANIES);

    let addresses = Router::new()
        .route("/addresses", get(list_addresses).post(create_address))
        .route(
            "/addresses/:id",
            get(get_address)
                .put(replace_address)
                .patch(update_address)
                .delete(delete_address),
        )
        .with_resource(Resources::ADDRESSES);

    let configurations = Router::new()
        .route(
            "/configurations",
            get(list_configurations).post(create_configuration),
        )
        .route(
            "/configurations/:id",
            get(get_configuration)
                .put(replace_configuration)
                .patch(update_configuration)
                .delete(delete_configuration),
        )
        .with_resource(Resources::CONFIGURATIONS);

    let audit_logs = Router::new()
        .route("/audit-logs", get(list_audit_logs))
        .route("/audit-logs/:id", get(get_audit_log))
        .with_resource(Resources::AUDIT_LOGS);

    Router::new()
        .route("/health", get(health::health_check))
        .merge(contacts)
        .merge(companies)
        .merge(addresses)
        .merge(configurations)
        .merge(audit_logs)
}

// ---- contacts ----

#[utoipa::path(
    get,
    path = "/api/v1/core/contacts",
    tag = "core",
    summary = "List contacts",
    params(ListQuery, ContactFilters),
    responses(
        (status = 200, description = "Contacts", body = ApiResponse<PaginatedResponse<ContactResponse>>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_contacts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<ContactFilters>,
) -> ApiResult<PaginatedResponse<ContactResponse>> {
    let page = state
        .services
        .contacts
        .list(&query.params(&state.config), filters)
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/core/contacts",
    tag = "core",
    summary = "Create contact",
    request_body = CreateContactRequest,
    responses(
        (status = 201, description = "Contact created", body = ApiResponse<ContactResponse>),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_contact(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateContactRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ContactResponse>>), ServiceError> {
    Ok(created(state.services.contacts.create(payload, &actor).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/core/contacts/statistics",
    tag = "core",
    summary = "Contact counts",
    responses((status = 200, description = "Totals by type and activity", body = ApiResponse<ContactStatistics>)),
    security(("Bearer" = []))
)]
pub async fn contact_statistics(State(state): State<AppState>) -> ApiResult<ContactStatistics> {
    Ok(ok(state.services.contacts.statistics().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/core/contacts/{id}",
    tag = "core",
    summary = "Get contact",
    params(("id" = Uuid, Path, description = "Contact ID")),
    responses(
        (status = 200, description = "Contact", body = ApiResponse<ContactResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ContactResponse> {
    Ok(ok(state.services.contacts.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/core/contacts/{id}",
    tag = "core",
    summary = "Replace contact",
    params(("id" = Uuid, Path, description = "Contact ID")),
    request_body = CreateContactRequest,
    responses((status = 200, description = "Contact updated", body = ApiResponse<ContactResponse>)),
    security(("Bearer" = []))
)]
pub async fn replace_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(payload): Json<CreateContactRequest>,
) -> ApiResult<ContactResponse> {
    Ok(ok(state
        .services
        .contacts
        .update(id, payload.into(), &actor)
        .await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/core/contacts/{id}",
    tag = "core",
    summary = "Update contact",
    params(("id" = Uuid, Path, description = "Contact ID")),
    request_body = UpdateContactRequest,
    responses((status = 200, description = "Contact updated", body = ApiResponse<ContactResponse>)),
    security(("Bearer" = []))
)]
pub async fn update_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(payload): Json<UpdateContactRequest>,
) -> ApiResult<ContactResponse> {
    Ok(ok(state.services.contacts.update(id, payload, &actor).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/core/contacts/{id}",
    tag = "core",
    summary = "Delete contact",
    params(("id" = Uuid, Path, description = "Contact ID")),
    responses(
        (status = 204, description = "Contact deleted"),
        (status = 409, description = "Contact is referenced by invoices or service requests", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
) -> Result<StatusCode, ServiceError> {
    state.services.contacts.delete(id, &actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- companies ----

#[utoipa::path(
    get,
    path = "/api/v1/core/companies",
    tag = "core",
    summary = "List companies",
    params(ListQuery, CompanyFilters),
    responses((status = 200, description = "Companies", body = ApiResponse<PaginatedResponse<CompanyResponse>>)),
    security(("Bearer" = []))
)]
pub async fn list_companies(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<CompanyFilters>,
) -> ApiResult<PaginatedResponse<CompanyResponse>> {
    let page = state
        .services
        .companies
        .list(&query.params(&state.config), filters)
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/core/companies",
    tag = "core",
    summary = "Create company",
    request_body = CreateCompanyRequest,
    responses(
        (status = 201, description = "Company created", body = ApiResponse<CompanyResponse>),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_company(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CompanyResponse>>), ServiceError> {
    Ok(created(state.services.companies.create(payload, &actor).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/core/companies/statistics",
    tag = "core",
    summary = "Company counts",
    responses((status = 200, description = "Totals by type and activity", body = ApiResponse<CompanyStatistics>)),
    security(("Bearer" = []))
)]
pub async fn company_statistics(State(state): State<AppState>) -> ApiResult<CompanyStatistics> {
    Ok(ok(state.services.companies.statistics().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/core/companies/{id}",
    tag = "core",
    summary = "Get company",
    params(("id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company", body = ApiResponse<CompanyResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<CompanyResponse> {
    Ok(ok(state.services.companies.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/core/companies/{id}",
    tag = "core",
    summary = "Replace company",
    params(("id" = Uuid, Path, description = "Company ID")),
    request_body = CreateCompanyRequest,
    responses((status = 200, description = "Company updated", body = ApiResponse<CompanyResponse>)),
    security(("Bearer" = []))
)]
pub async fn replace_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(payload): Json<CreateCompanyRequest>,
) -> ApiResult<CompanyResponse> {
    Ok(ok(state
        .services
        .companies
        .update(id, payload.into(), &actor)
        .await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/core/companies/{id}",
    tag = "core",
    summary = "Update company",
    params(("id" = Uuid, Path, description = "Company ID")),
    request_body = UpdateCompanyRequest,
    responses((status = 200, description = "Company updated", body = ApiResponse<CompanyResponse>)),
    security(("Bearer" = []))
)]
pub async fn update_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(payload): Json<UpdateCompanyRequest>,
) -> ApiResult<CompanyResponse> {
    Ok(ok(state.services.companies.update(id, payload, &actor).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/core/companies/{id}",
    tag = "core",
    summary = "Delete company",
    params(("id" = Uuid, Path, description = "Company ID")),
    responses((status = 204, description = "Company deleted")),
    security(("Bearer" = []))
)]
pub async fn delete_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
) -> Result<StatusCode, ServiceError> {
    state.services.companies.delete(id, &actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- addresses ----

#[utoipa::path(
    get,
    path = "/api/v1/core/addresses",
    tag = "core",
    summary = "List addresses",
    params(ListQuery, AddressFilters),
    responses((status = 200, description = "Addresses", body = ApiResponse<PaginatedResponse<AddressResponse>>)),
    security(("Bearer" = []))
)]
pub async fn list_addresses(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<AddressFilters>,
) -> ApiResult<PaginatedResponse<AddressResponse>> {
    let page = state
        .services
        .addresses
        .list(&query.params(&state.config), filters)
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/core/addresses",
    tag = "core",
    summary = "Create address",
    request_body = CreateAddressRequest,
    responses(
        (status = 201, description = "Address created", body = ApiResponse<AddressResponse>),
        (status = 400, description = "Owner missing or ambiguous", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_address(
    State(state): State<AppState>,
    Json(payload): Json<CreateAddressRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AddressResponse>>), ServiceError> {
    Ok(created(state.services.addresses.create(payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/core/addresses/{id}",
    tag = "core",
    summary = "Get address",
    params(("id" = Uuid, Path, description = "Address ID")),
    responses(
        (status = 200, description = "Address", body = ApiResponse<AddressResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_address(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<AddressResponse> {
    Ok(ok(state.services.addresses.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/core/addresses/{id}",
    tag = "core",
    summary = "Replace address",
    params(("id" = Uuid, Path, description = "Address ID")),
    request_body = CreateAddressRequest,
    responses((status = 200, description = "Address updated", body = ApiResponse<AddressResponse>)),
    security(("Bearer" = []))
)]
pub async fn replace_address(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateAddressRequest>,
) -> ApiResult<AddressResponse> {
    Ok(ok(state.services.addresses.update(id, payload.into()).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/core/addresses/{id}",
    tag = "core",
    summary = "Update address",
    params(("id" = Uuid, Path, description = "Address ID")),
    request_body = UpdateAddressRequest,
    responses((status = 200, description = "Address updated", body = ApiResponse<AddressResponse>)),
    security(("Bearer" = []))
)]
pub async fn update_address(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAddressRequest>,
) -> ApiResult<AddressResponse> {
    Ok(ok(state.services.addresses.update(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/core/addresses/{id}",
    tag = "core",
    summary = "Delete address",
    params(("id" = Uuid, Path, description = "Address ID")),
    responses((status = 204, description = "Address deleted")),
    security(("Bearer" = []))
)]
pub async fn delete_address(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.addresses.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- configurations ----

#[utoipa::path(
    get,
    path = "/api/v1/core/configurations",
    tag = "core",
    summary = "List system configuration entries",
    params(ListQuery, ConfigurationFilters),
    responses((status = 200, description = "Configuration entries", body = ApiResponse<PaginatedResponse<ConfigurationResponse>>)),
    security(("Bearer" = []))
)]
pub async fn list_configurations(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<ConfigurationFilters>,
) -> ApiResult<PaginatedResponse<ConfigurationResponse>> {
    let page = state
        .services
        .configurations
        .list(&query.params(&state.config), filters)
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/core/configurations",
    tag = "core",
    summary = "Create configuration entry",
    request_body = CreateConfigurationRequest,
    responses(
        (status = 201, description = "Entry created", body = ApiResponse<ConfigurationResponse>),
        (status = 409, description = "Key already exists", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_configuration(
    State(state): State<AppState>,
    Json(payload): Json<CreateConfigurationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ConfigurationResponse>>), ServiceError> {
    Ok(created(state.services.configurations.create(payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/core/configurations/{id}",
    tag = "core",
    summary = "Get configuration entry",
    params(("id" = Uuid, Path, description = "Entry ID")),
    responses(
        (status = 200, description = "Entry", body = ApiResponse<ConfigurationResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_configuration(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ConfigurationResponse> {
    Ok(ok(state.services.configurations.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/core/configurations/{id}",
    tag = "core",
    summary = "Replace configuration entry",
    params(("id" = Uuid, Path, description = "Entry ID")),
    request_body = CreateConfigurationRequest,
    responses((status = 200, description = "Entry updated", body = ApiResponse<ConfigurationResponse>)),
    security(("Bearer" = []))
)]
pub async fn replace_configuration(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateConfigurationRequest>,
) -> ApiResult<ConfigurationResponse> {
    Ok(ok(state
        .services
        .configurations
        .update(id, payload.into())
        .await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/core/configurations/{id}",
    tag = "core",
    summary = "Update configuration entry",
    params(("id" = Uuid, Path, description = "Entry ID")),
    request_body = UpdateConfigurationRequest,
    responses((status = 200, description = "Entry updated", body = ApiResponse<ConfigurationResponse>)),
    security(("Bearer" = []))
)]
pub async fn update_configuration(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateConfigurationRequest>,
) -> ApiResult<ConfigurationResponse> {
    Ok(ok(state.services.configurations.update(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/core/configurations/{id}",
    tag = "core",
    summary = "Delete configuration entry",
    params(("id" = Uuid, Path, description = "Entry ID")),
    responses((status = 204, description = "Entry deleted")),
    security(("Bearer" = []))
)]
pub async fn delete_configuration(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.configurations.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- audit logs (read-only) ----

#[utoipa::path(
    get,
    path = "/api/v1/core/audit-logs",
    tag = "core",
    summary = "List audit log entries",
    params(ListQuery, AuditLogFilters),
    responses((status = 200, description = "Audit entries", body = ApiResponse<PaginatedResponse<AuditLogResponse>>)),
    security(("Bearer" = []))
)]
pub async fn list_audit_logs(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<AuditLogFilters>,
) -> ApiResult<PaginatedResponse<AuditLogResponse>> {
    let page = state
        .services
        .audit_logs
        .list(&query.params(&state.config), filters)
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    get,
    path = "/api/v1/core/audit-logs/{id}",
    tag = "core",
    summary = "Get audit log entry",
    params(("id" = Uuid, Path, description = "Entry ID")),
    responses(
        (status = 200, description = "Audit entry", body = ApiResponse<AuditLogResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_audit_log(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<AuditLogResponse> {
    Ok(ok(state.services.audit_logs.get(id).await?))
}
