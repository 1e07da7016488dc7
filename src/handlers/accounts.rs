//! `/api/v1/accounts`: sign-in flows, users, profiles, roles and permissions

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use super::common::{created, ok, paginated};
use crate::{
    auth::{consts as perm, AuthRouterExt, AuthUser, Resources, TokenPair},
    errors::ServiceError,
    services::{
        accounts::{
            auth::{
                DetailResponse, LoginRequest, LoginResponse, MeRequest, MeResponse,
                PasswordResetConfirmRequest, PasswordResetRequest, PasswordResetResponse,
                RefreshRequest, RegisterRequest, UpdateMeRequest,
            },
            permissions::{PermissionFilters, PermissionResponse},
            profiles::{
                CreateProfileRequest, ProfileFilters, ProfileResponse, UpdateProfileRequest,
            },
            roles::{
                CreateRoleRequest, GrantPermissionRequest, RevokePermissionRequest, RoleFilters,
                RoleResponse, UpdateRoleRequest,
            },
            users::{
                AssignRoleRequest, CreateUserRequest, UpdateUserRequest, UserFilters,
                UserResponse, UserRoleResponse,
            },
        },
        Actor,
    },
    ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse,
};

pub fn routes() -> Router<AppState> {
    let public = Router::new()
        .route("/login", post(login))
        .route("/token", post(token))
        .route("/token/refresh", post(refresh_token))
        .route("/register", post(register))
        .route("/password-reset", post(request_password_reset))
        .route("/password-reset/confirm", post(confirm_password_reset));

    let me = Router::new()
        .route("/me", get(get_me).put(replace_me).patch(update_me))
        .route("/logout", post(logout))
        .with_auth();

    let users = Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user)
                .put(replace_user)
                .patch(update_user)
                .delete(delete_user),
        )
        .with_resource(Resources::USERS);

    let user_roles = Router::new()
        .route("/users/:id/roles", get(list_user_roles).post(assign_user_role))
        .route(
            "/users/:id/roles/:role_id",
            axum::routing::delete(remove_user_role),
        )
        .with_permission(perm::USERS_MANAGE);

    let profiles = Router::new()
        .route("/profiles", get(list_profiles).post(create_profile))
        .route(
            "/profiles/:id",
            get(get_profile)
                .put(replace_profile)
                .patch(update_profile)
                .delete(delete_profile),
        )
        .with_resource(Resources::PROFILES);

    let roles = Router::new()
        .route("/roles", get(list_roles).post(create_role))
        .route(
            "/roles/:id",
            get(get_role)
                .put(replace_role)
                .patch(update_role)
                .delete(delete_role),
        )
        .with_resource(Resources::ROLES);

    let role_grants = Router::new()
        .route(
            "/roles/:id/permissions",
            post(grant_permission).delete(revoke_permission),
        )
        .with_permission(perm::ROLES_MANAGE);

    let permissions = Router::new()
        .route("/permissions", get(list_permissions))
        .route("/permissions/:id", get(get_permission))
        .with_resource(Resources::PERMISSIONS);

    Router::new()
        .merge(public)
        .merge(me)
        .merge(users)
        .merge(user_roles)
        .merge(profiles)
        .merge(roles)
        .merge(role_grants)
        .merge(permissions)
}

// ---- authentication ----

#[utoipa::path(
    post,
    path = "/api/v1/accounts/login",
    tag = "accounts",
    summary = "Sign in",
    description = "Authenticate with email or username and receive an access/refresh token pair",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials or inactive user", body = crate::errors::ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    Ok(ok(state.services.account.login(payload, &actor).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/accounts/token",
    tag = "accounts",
    summary = "Obtain a token pair",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token pair issued", body = ApiResponse<TokenPair>),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse),
    )
)]
pub async fn token(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<TokenPair> {
    Ok(ok(state.services.account.token(payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/accounts/token/refresh",
    tag = "accounts",
    summary = "Rotate a refresh token",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair", body = ApiResponse<TokenPair>),
        (status = 401, description = "Invalid, revoked or wrong-type token", body = crate::errors::ErrorResponse),
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<TokenPair> {
    Ok(ok(state.services.account.refresh(payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/accounts/register",
    tag = "accounts",
    summary = "Register a new user",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = ApiResponse<UserResponse>),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email or username already taken", body = crate::errors::ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ServiceError> {
    Ok(created(state.services.account.register(payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/accounts/password-reset",
    tag = "accounts",
    summary = "Request a password reset",
    request_body = PasswordResetRequest,
    responses(
        (status = 202, description = "Accepted whether or not the email is known", body = ApiResponse<PasswordResetResponse>),
    )
)]
pub async fn request_password_reset(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<PasswordResetRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PasswordResetResponse>>), ServiceError> {
    let response = state
        .services
        .account
        .request_password_reset(payload, &actor)
        .await?;
    Ok((StatusCode::ACCEPTED, ok(response)))
}

#[utoipa::path(
    post,
    path = "/api/v1/accounts/password-reset/confirm",
    tag = "accounts",
    summary = "Set a new password with a reset token",
    request_body = PasswordResetConfirmRequest,
    responses(
        (status = 200, description = "Password changed", body = ApiResponse<DetailResponse>),
        (status = 400, description = "Invalid, used or expired token", body = crate::errors::ErrorResponse),
    )
)]
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(payload): Json<PasswordResetConfirmRequest>,
) -> ApiResult<DetailResponse> {
    Ok(ok(state.services.account.confirm_password_reset(payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/accounts/me",
    tag = "accounts",
    summary = "Current user",
    responses(
        (status = 200, description = "Current user with profile", body = ApiResponse<MeResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_me(State(state): State<AppState>, user: AuthUser) -> ApiResult<MeResponse> {
    Ok(ok(state.services.account.me(user.user_id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/accounts/me",
    tag = "accounts",
    summary = "Replace current user details",
    request_body = MeRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<MeResponse>),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn replace_me(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<MeRequest>,
) -> ApiResult<MeResponse> {
    Ok(ok(state
        .services
        .account
        .update_me(user.user_id, payload.into())
        .await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/accounts/me",
    tag = "accounts",
    summary = "Update current user details",
    request_body = UpdateMeRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<MeResponse>),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateMeRequest>,
) -> ApiResult<MeResponse> {
    Ok(ok(state.services.account.update_me(user.user_id, payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/accounts/logout",
    tag = "accounts",
    summary = "Sign out",
    description = "Ends the caller's sessions and revokes the presented access token",
    responses(
        (status = 200, description = "Signed out", body = ApiResponse<DetailResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
    actor: Actor,
) -> ApiResult<DetailResponse> {
    Ok(ok(state.services.account.logout(&user, &actor).await?))
}

// ---- users ----

#[utoipa::path(
    get,
    path = "/api/v1/accounts/users",
    tag = "accounts",
    summary = "List users",
    params(ListQuery, UserFilters),
    responses(
        (status = 200, description = "Users", body = ApiResponse<PaginatedResponse<UserResponse>>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<UserFilters>,
) -> ApiResult<PaginatedResponse<UserResponse>> {
    let page = state
        .services
        .users
        .list(&query.params(&state.config), filters)
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/accounts/users",
    tag = "accounts",
    summary = "Create user",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserResponse>),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email or username already taken", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ServiceError> {
    Ok(created(state.services.users.create(payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/accounts/users/{id}",
    tag = "accounts",
    summary = "Get user",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = ApiResponse<UserResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_user(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<UserResponse> {
    Ok(ok(state.services.users.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/accounts/users/{id}",
    tag = "accounts",
    summary = "Replace user",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn replace_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<UserResponse> {
    Ok(ok(state.services.users.update(id, payload.into()).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/accounts/users/{id}",
    tag = "accounts",
    summary = "Update user",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<UserResponse> {
    Ok(ok(state.services.users.update(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/accounts/users/{id}",
    tag = "accounts",
    summary = "Delete user",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/accounts/users/{id}/roles",
    tag = "accounts",
    summary = "Roles assigned to a user",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Role assignments", body = ApiResponse<Vec<UserRoleResponse>>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_user_roles(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<UserRoleResponse>> {
    Ok(ok(state.services.users.roles(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/accounts/users/{id}/roles",
    tag = "accounts",
    summary = "Assign a role to a user",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = AssignRoleRequest,
    responses(
        (status = 201, description = "Role assigned", body = ApiResponse<UserRoleResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn assign_user_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(payload): Json<AssignRoleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserRoleResponse>>), ServiceError> {
    Ok(created(
        state.services.users.assign_role(id, payload, &actor).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/accounts/users/{id}/roles/{role_id}",
    tag = "accounts",
    summary = "Remove a role from a user",
    params(
        ("id" = Uuid, Path, description = "User ID"),
        ("role_id" = Uuid, Path, description = "Role ID"),
    ),
    responses(
        (status = 204, description = "Role removed"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn remove_user_role(
    State(state): State<AppState>,
    Path((id, role_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServiceError> {
    state.services.users.remove_role(id, role_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- profiles ----

#[utoipa::path(
    get,
    path = "/api/v1/accounts/profiles",
    tag = "accounts",
    summary = "List profiles",
    params(ListQuery, ProfileFilters),
    responses((status = 200, description = "Profiles", body = ApiResponse<PaginatedResponse<ProfileResponse>>)),
    security(("Bearer" = []))
)]
pub async fn list_profiles(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<ProfileFilters>,
) -> ApiResult<PaginatedResponse<ProfileResponse>> {
    let page = state
        .services
        .profiles
        .list(&query.params(&state.config), filters)
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/accounts/profiles",
    tag = "accounts",
    summary = "Create profile",
    request_body = CreateProfileRequest,
    responses(
        (status = 201, description = "Profile created", body = ApiResponse<ProfileResponse>),
        (status = 409, description = "User already has a profile", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_profile(
    State(state): State<AppState>,
    Json(payload): Json<CreateProfileRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProfileResponse>>), ServiceError> {
    Ok(created(state.services.profiles.create(payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/accounts/profiles/{id}",
    tag = "accounts",
    summary = "Get profile",
    params(("id" = Uuid, Path, description = "Profile ID")),
    responses(
        (status = 200, description = "Profile", body = ApiResponse<ProfileResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ProfileResponse> {
    Ok(ok(state.services.profiles.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/accounts/profiles/{id}",
    tag = "accounts",
    summary = "Replace profile",
    params(("id" = Uuid, Path, description = "Profile ID")),
    request_body = CreateProfileRequest,
    responses((status = 200, description = "Profile updated", body = ApiResponse<ProfileResponse>)),
    security(("Bearer" = []))
)]
pub async fn replace_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateProfileRequest>,
) -> ApiResult<ProfileResponse> {
    Ok(ok(state.services.profiles.update(id, payload.into()).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/accounts/profiles/{id}",
    tag = "accounts",
    summary = "Update profile",
    params(("id" = Uuid, Path, description = "Profile ID")),
    request_body = UpdateProfileRequest,
    responses((status = 200, description = "Profile updated", body = ApiResponse<ProfileResponse>)),
    security(("Bearer" = []))
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<ProfileResponse> {
    Ok(ok(state.services.profiles.update(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/accounts/profiles/{id}",
    tag = "accounts",
    summary = "Delete profile",
    params(("id" = Uuid, Path, description = "Profile ID")),
    responses((status = 204, description = "Profile deleted")),
    security(("Bearer" = []))
)]
pub async fn delete_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.profiles.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- roles ----

#[utoipa::path(
    get,
    path = "/api/v1/accounts/roles",
    tag = "accounts",
    summary = "List roles",
    params(ListQuery, RoleFilters),
    responses((status = 200, description = "Roles", body = ApiResponse<PaginatedResponse<RoleResponse>>)),
    security(("Bearer" = []))
)]
pub async fn list_roles(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<RoleFilters>,
) -> ApiResult<PaginatedResponse<RoleResponse>> {
    let page = state
        .services
        .roles
        .list(&query.params(&state.config), filters)
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/accounts/roles",
    tag = "accounts",
    summary = "Create role",
    request_body = CreateRoleRequest,
    responses(
        (status = 201, description = "Role created", body = ApiResponse<RoleResponse>),
        (status = 409, description = "Role name already taken", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_role(
    State(state): State<AppState>,
    Json(payload): Json<CreateRoleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RoleResponse>>), ServiceError> {
    Ok(created(state.services.roles.create(payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/accounts/roles/{id}",
    tag = "accounts",
    summary = "Get role",
    params(("id" = Uuid, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Role with its grants", body = ApiResponse<RoleResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_role(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<RoleResponse> {
    Ok(ok(state.services.roles.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/accounts/roles/{id}",
    tag = "accounts",
    summary = "Replace role",
    params(("id" = Uuid, Path, description = "Role ID")),
    request_body = CreateRoleRequest,
    responses((status = 200, description = "Role updated", body = ApiResponse<RoleResponse>)),
    security(("Bearer" = []))
)]
pub async fn replace_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<RoleResponse> {
    Ok(ok(state.services.roles.update(id, payload.into()).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/accounts/roles/{id}",
    tag = "accounts",
    summary = "Update role",
    params(("id" = Uuid, Path, description = "Role ID")),
    request_body = UpdateRoleRequest,
    responses((status = 200, description = "Role updated", body = ApiResponse<RoleResponse>)),
    security(("Bearer" = []))
)]
pub async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> ApiResult<RoleResponse> {
    Ok(ok(state.services.roles.update(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/accounts/roles/{id}",
    tag = "accounts",
    summary = "Delete role",
    params(("id" = Uuid, Path, description = "Role ID")),
    responses((status = 204, description = "Role deleted")),
    security(("Bearer" = []))
)]
pub async fn delete_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.roles.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/accounts/roles/{id}/permissions",
    tag = "accounts",
    summary = "Grant a permission to a role",
    params(("id" = Uuid, Path, description = "Role ID")),
    request_body = GrantPermissionRequest,
    responses(
        (status = 200, description = "Role with the new grant", body = ApiResponse<RoleResponse>),
        (status = 400, description = "Malformed permission", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn grant_permission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<GrantPermissionRequest>,
) -> ApiResult<RoleResponse> {
    Ok(ok(state.services.roles.grant(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/accounts/roles/{id}/permissions",
    tag = "accounts",
    summary = "Revoke a permission from a role",
    params(("id" = Uuid, Path, description = "Role ID")),
    request_body = RevokePermissionRequest,
    responses((status = 200, description = "Role without the grant", body = ApiResponse<RoleResponse>)),
    security(("Bearer" = []))
)]
pub async fn revoke_permission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RevokePermissionRequest>,
) -> ApiResult<RoleResponse> {
    Ok(ok(state.services.roles.revoke(id, payload).await?))
}

// ---- permissions (read-only) ----

#[utoipa::path(
    get,
    path = "/api/v1/accounts/permissions",
    tag = "accounts",
    summary = "List role permission grants",
    params(ListQuery, PermissionFilters),
    responses((status = 200, description = "Grants", body = ApiResponse<PaginatedResponse<PermissionResponse>>)),
    security(("Bearer" = []))
)]
pub async fn list_permissions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<PermissionFilters>,
) -> ApiResult<PaginatedResponse<PermissionResponse>> {
    let page = state
        .services
        .permissions
        .list(&query.params(&state.config), filters)
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    get,
    path = "/api/v1/accounts/permissions/{id}",
    tag = "accounts",
    summary = "Get role permission grant",
    params(("id" = Uuid, Path, description = "Grant ID")),
    responses(
        (status = 200, description = "Grant", body = ApiResponse<PermissionResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_permission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<PermissionResponse> {
    Ok(ok(state.services.permissions.get(id).await?))
}
