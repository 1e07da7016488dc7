//! `/api/v1/inventory`: catalogue, suppliers and stock movements

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Router,
};
use uuid::Uuid;

use super::common::{created, ok, paginated};
use crate::{
    auth::{AuthRouterExt, Resources},
    errors::ServiceError,
    services::{
        inventory::{
            brands::{BrandFilters, BrandResponse, CreateBrandRequest, UpdateBrandRequest},
            categories::{
                CategoryFilters, CategoryResponse, CreateCategoryRequest, UpdateCategoryRequest,
            },
            movements::{
                CreateMovementRequest, MovementFilters, MovementResponse, UpdateMovementRequest,
            },
            products::{
                CreateProductImageRequest, CreateProductRequest, ProductFilters,
                ProductImageResponse, ProductResponse, UpdateProductRequest,
            },
            suppliers::{
                CreateSupplierRequest, SupplierFilters, SupplierResponse, UpdateSupplierRequest,
            },
        },
        Actor,
    },
    ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse,
};

type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), ServiceError>;

pub fn routes() -> Router<AppState> {
    let products = Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:id",
            get(get_product)
                .put(replace_product)
                .patch(update_product)
                .delete(delete_product),
        )
        .route(
            "/products/:id/images",
            get(list_product_images).post(add_product_image),
        )
        .route(
            "/products/:id/images/:image_id",
            delete(delete_product_image),
        )
        .with_resource(Resources::PRODUCTS);

    let categories = Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/:id",
            get(get_category)
                .put(replace_category)
                .patch(update_category)
                .delete(delete_category),
        )
        .with_resource(Resources::CATEGORIES);

    let brands = Router::new()
        .route("/brands", get(list_brands).post(create_brand))
        .route(
            "/brands/:id",
            get(get_brand)
                .put(replace_brand)
                .patch(update_brand)
                .delete(delete_brand),
        )
        .with_resource(Resources::BRANDS);

    let suppliers = Router::new()
        .route("/suppliers", get(list_suppliers).post(create_supplier))
        .route(
            "/suppliers/:id",
            get(get_supplier)
                .put(replace_supplier)
                .patch(update_supplier)
                .delete(delete_supplier),
        )
        .with_resource(Resources::SUPPLIERS);

    let movements = Router::new()
        .route("/inventory", get(list_movements).post(create_movement))
        .route(
            "/inventory/:id",
            get(get_movement)
                .put(replace_movement)
                .patch(update_movement)
                .delete(delete_movement),
        )
        .with_resource(Resources::INVENTORY);

    Router::new()
        .merge(products)
        .merge(categories)
        .merge(brands)
        .merge(suppliers)
        .merge(movements)
}

// ---- products ----

#[utoipa::path(
    get,
    path = "/api/v1/inventory/products",
    tag = "inventory",
    summary = "List products",
    params(ListQuery, ProductFilters),
    responses(
        (status = 200, description = "Products", body = ApiResponse<PaginatedResponse<ProductResponse>>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<ProductFilters>,
) -> ApiResult<PaginatedResponse<ProductResponse>> {
    let page = state
        .services
        .products
        .list(&query.params(&state.config), filters)
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/inventory/products",
    tag = "inventory",
    summary = "Create product",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<ProductResponse>),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse),
        (status = 409, description = "SKU or barcode already in use", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_product(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateProductRequest>,
) -> Created<ProductResponse> {
    Ok(created(state.services.products.create(payload, &actor).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory/products/{id}",
    tag = "inventory",
    summary = "Get product",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product", body = ApiResponse<ProductResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ProductResponse> {
    Ok(ok(state.services.products.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/inventory/products/{id}",
    tag = "inventory",
    summary = "Replace product",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = CreateProductRequest,
    responses((status = 200, description = "Product updated", body = ApiResponse<ProductResponse>)),
    security(("Bearer" = []))
)]
pub async fn replace_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(payload): Json<CreateProductRequest>,
) -> ApiResult<ProductResponse> {
    Ok(ok(state
        .services
        .products
        .update(id, payload.into(), &actor)
        .await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/inventory/products/{id}",
    tag = "inventory",
    summary = "Update product",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses((status = 200, description = "Product updated", body = ApiResponse<ProductResponse>)),
    security(("Bearer" = []))
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
    Json(payload): Json<UpdateProductRequest>,
) -> ApiResult<ProductResponse> {
    Ok(ok(state.services.products.update(id, payload, &actor).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/inventory/products/{id}",
    tag = "inventory",
    summary = "Delete product",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses((status = 204, description = "Product deleted")),
    security(("Bearer" = []))
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    actor: Actor,
) -> Result<StatusCode, ServiceError> {
    state.services.products.delete(id, &actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory/products/{id}/images",
    tag = "inventory",
    summary = "List product images",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses((status = 200, description = "Images in display order", body = ApiResponse<Vec<ProductImageResponse>>)),
    security(("Bearer" = []))
)]
pub async fn list_product_images(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<ProductImageResponse>> {
    Ok(ok(state.services.products.images(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/inventory/products/{id}/images",
    tag = "inventory",
    summary = "Attach product image",
    description = "A product may have only one primary image",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = CreateProductImageRequest,
    responses(
        (status = 201, description = "Image attached", body = ApiResponse<ProductImageResponse>),
        (status = 400, description = "Product already has a primary image", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn add_product_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateProductImageRequest>,
) -> Created<ProductImageResponse> {
    Ok(created(state.services.products.add_image(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/inventory/products/{id}/images/{image_id}",
    tag = "inventory",
    summary = "Remove product image",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("image_id" = Uuid, Path, description = "Image ID"),
    ),
    responses((status = 204, description = "Image removed")),
    security(("Bearer" = []))
)]
pub async fn delete_product_image(
    State(state): State<AppState>,
    Path((id, image_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServiceError> {
    state.services.products.delete_image(id, image_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- categories ----

#[utoipa::path(
    get,
    path = "/api/v1/inventory/categories",
    tag = "inventory",
    summary = "List categories",
    params(ListQuery, CategoryFilters),
    responses((status = 200, description = "Categories with their full path", body = ApiResponse<PaginatedResponse<CategoryResponse>>)),
    security(("Bearer" = []))
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<CategoryFilters>,
) -> ApiResult<PaginatedResponse<CategoryResponse>> {
    let page = state
        .services
        .categories
        .list(&query.params(&state.config), filters)
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/inventory/categories",
    tag = "inventory",
    summary = "Create category",
    request_body = CreateCategoryRequest,
    responses((status = 201, description = "Category created", body = ApiResponse<CategoryResponse>)),
    security(("Bearer" = []))
)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Created<CategoryResponse> {
    Ok(created(state.services.categories.create(payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory/categories/{id}",
    tag = "inventory",
    summary = "Get category",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category", body = ApiResponse<CategoryResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<CategoryResponse> {
    Ok(ok(state.services.categories.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/inventory/categories/{id}",
    tag = "inventory",
    summary = "Replace category",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = CreateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<CategoryResponse>),
        (status = 400, description = "Parent would create a cycle", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn replace_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateCategoryRequest>,
) -> ApiResult<CategoryResponse> {
    Ok(ok(state.services.categories.update(id, payload.into()).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/inventory/categories/{id}",
    tag = "inventory",
    summary = "Update category",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<CategoryResponse>),
        (status = 400, description = "Parent would create a cycle", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> ApiResult<CategoryResponse> {
    Ok(ok(state.services.categories.update(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/inventory/categories/{id}",
    tag = "inventory",
    summary = "Delete category",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses((status = 204, description = "Category deleted")),
    security(("Bearer" = []))
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.categories.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- brands ----

#[utoipa::path(
    get,
    path = "/api/v1/inventory/brands",
    tag = "inventory",
    summary = "List brands",
    params(ListQuery, BrandFilters),
    responses((status = 200, description = "Brands", body = ApiResponse<PaginatedResponse<BrandResponse>>)),
    security(("Bearer" = []))
)]
pub async fn list_brands(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<BrandFilters>,
) -> ApiResult<PaginatedResponse<BrandResponse>> {
    let page = state
        .services
        .brands
        .list(&query.params(&state.config), filters)
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/inventory/brands",
    tag = "inventory",
    summary = "Create brand",
    request_body = CreateBrandRequest,
    responses(
        (status = 201, description = "Brand created", body = ApiResponse<BrandResponse>),
        (status = 409, description = "Name already in use", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_brand(
    State(state): State<AppState>,
    Json(payload): Json<CreateBrandRequest>,
) -> Created<BrandResponse> {
    Ok(created(state.services.brands.create(payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory/brands/{id}",
    tag = "inventory",
    summary = "Get brand",
    params(("id" = Uuid, Path, description = "Brand ID")),
    responses(
        (status = 200, description = "Brand", body = ApiResponse<BrandResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_brand(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<BrandResponse> {
    Ok(ok(state.services.brands.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/inventory/brands/{id}",
    tag = "inventory",
    summary = "Replace brand",
    params(("id" = Uuid, Path, description = "Brand ID")),
    request_body = CreateBrandRequest,
    responses((status = 200, description = "Brand updated", body = ApiResponse<BrandResponse>)),
    security(("Bearer" = []))
)]
pub async fn replace_brand(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateBrandRequest>,
) -> ApiResult<BrandResponse> {
    Ok(ok(state.services.brands.update(id, payload.into()).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/inventory/brands/{id}",
    tag = "inventory",
    summary = "Update brand",
    params(("id" = Uuid, Path, description = "Brand ID")),
    request_body = UpdateBrandRequest,
    responses((status = 200, description = "Brand updated", body = ApiResponse<BrandResponse>)),
    security(("Bearer" = []))
)]
pub async fn update_brand(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBrandRequest>,
) -> ApiResult<BrandResponse> {
    Ok(ok(state.services.brands.update(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/inventory/brands/{id}",
    tag = "inventory",
    summary = "Delete brand",
    params(("id" = Uuid, Path, description = "Brand ID")),
    responses((status = 204, description = "Brand deleted")),
    security(("Bearer" = []))
)]
pub async fn delete_brand(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.brands.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- suppliers ----

#[utoipa::path(
    get,
    path = "/api/v1/inventory/suppliers",
    tag = "inventory",
    summary = "List suppliers",
    params(ListQuery, SupplierFilters),
    responses((status = 200, description = "Suppliers", body = ApiResponse<PaginatedResponse<SupplierResponse>>)),
    security(("Bearer" = []))
)]
pub async fn list_suppliers(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<SupplierFilters>,
) -> ApiResult<PaginatedResponse<SupplierResponse>> {
    let page = state
        .services
        .suppliers
        .list(&query.params(&state.config), filters)
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/inventory/suppliers",
    tag = "inventory",
    summary = "Create supplier",
    request_body = CreateSupplierRequest,
    responses(
        (status = 201, description = "Supplier created", body = ApiResponse<SupplierResponse>),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_supplier(
    State(state): State<AppState>,
    Json(payload): Json<CreateSupplierRequest>,
) -> Created<SupplierResponse> {
    Ok(created(state.services.suppliers.create(payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory/suppliers/{id}",
    tag = "inventory",
    summary = "Get supplier",
    params(("id" = Uuid, Path, description = "Supplier ID")),
    responses(
        (status = 200, description = "Supplier", body = ApiResponse<SupplierResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<SupplierResponse> {
    Ok(ok(state.services.suppliers.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/inventory/suppliers/{id}",
    tag = "inventory",
    summary = "Replace supplier",
    params(("id" = Uuid, Path, description = "Supplier ID")),
    request_body = CreateSupplierRequest,
    responses((status = 200, description = "Supplier updated", body = ApiResponse<SupplierResponse>)),
    security(("Bearer" = []))
)]
pub async fn replace_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateSupplierRequest>,
) -> ApiResult<SupplierResponse> {
    Ok(ok(state.services.suppliers.update(id, payload.into()).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/inventory/suppliers/{id}",
    tag = "inventory",
    summary = "Update supplier",
    params(("id" = Uuid, Path, description = "Supplier ID")),
    request_body = UpdateSupplierRequest,
    responses((status = 200, description = "Supplier updated", body = ApiResponse<SupplierResponse>)),
    security(("Bearer" = []))
)]
pub async fn update_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSupplierRequest>,
) -> ApiResult<SupplierResponse> {
    Ok(ok(state.services.suppliers.update(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/inventory/suppliers/{id}",
    tag = "inventory",
    summary = "Delete supplier",
    params(("id" = Uuid, Path, description = "Supplier ID")),
    responses((status = 204, description = "Supplier deleted")),
    security(("Bearer" = []))
)]
pub async fn delete_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.suppliers.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- stock movements ----

#[utoipa::path(
    get,
    path = "/api/v1/inventory/inventory",
    tag = "inventory",
    summary = "List stock movements",
    params(ListQuery, MovementFilters),
    responses((status = 200, description = "Movements, newest first", body = ApiResponse<PaginatedResponse<MovementResponse>>)),
    security(("Bearer" = []))
)]
pub async fn list_movements(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<MovementFilters>,
) -> ApiResult<PaginatedResponse<MovementResponse>> {
    let page = state
        .services
        .movements
        .list(&query.params(&state.config), filters)
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/inventory/inventory",
    tag = "inventory",
    summary = "Record stock movement",
    description = "Positive quantities add stock and negative quantities remove it; current stock is the sum of all movements",
    request_body = CreateMovementRequest,
    responses(
        (status = 201, description = "Movement recorded", body = ApiResponse<MovementResponse>),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_movement(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateMovementRequest>,
) -> Created<MovementResponse> {
    Ok(created(state.services.movements.create(payload, &actor).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory/inventory/{id}",
    tag = "inventory",
    summary = "Get stock movement",
    params(("id" = Uuid, Path, description = "Movement ID")),
    responses(
        (status = 200, description = "Movement", body = ApiResponse<MovementResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_movement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<MovementResponse> {
    Ok(ok(state.services.movements.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/inventory/inventory/{id}",
    tag = "inventory",
    summary = "Replace stock movement",
    params(("id" = Uuid, Path, description = "Movement ID")),
    request_body = CreateMovementRequest,
    responses((status = 200, description = "Movement updated", body = ApiResponse<MovementResponse>)),
    security(("Bearer" = []))
)]
pub async fn replace_movement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateMovementRequest>,
) -> ApiResult<MovementResponse> {
    Ok(ok(state.services.movements.update(id, payload.into()).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/inventory/inventory/{id}",
    tag = "inventory",
    summary = "Update stock movement",
    params(("id" = Uuid, Path, description = "Movement ID")),
    request_body = UpdateMovementRequest,
    responses((status = 200, description = "Movement updated", body = ApiResponse<MovementResponse>)),
    security(("Bearer" = []))
)]
pub async fn update_movement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMovementRequest>,
) -> ApiResult<MovementResponse> {
    Ok(ok(state.services.movements.update(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/inventory/inventory/{id}",
    tag = "inventory",
    summary = "Delete stock movement",
    params(("id" = Uuid, Path, description = "Movement ID")),
    responses((status = 204, description = "Movement deleted")),
    security(("Bearer" = []))
)]
pub async fn delete_movement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.movements.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
