use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::{current, non_negative, nullable, patch, percentage},
    db::{ListParams, OrderingSpec, Page, QueryBuilder, SearchBuilder},
    entities::{
        core_data::AuditAction,
        inventory::{
            brand, category, inventory_item, product, product_image, ProductStatus, UnitType,
        },
    },
    errors::ServiceError,
    services::{
        audit::AuditService, delete_or_404, ensure_exists, find_or_404, lookups, Actor,
    },
};

const STOCK_LEVELS_MESSAGE: &str =
    "Maximum stock level must be greater than or equal to minimum stock level.";

fn default_true() -> bool {
    true
}

fn default_unit_type() -> UnitType {
    UnitType::Piece
}

fn default_status() -> ProductStatus {
    ProductStatus::Active
}

fn default_max_stock() -> i32 {
    1000
}

fn normalize_barcode(barcode: Option<String>) -> Option<String> {
    barcode
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
}

fn check_stock_levels(min: i32, max: i32) -> Result<(), ValidationError> {
    if max < min {
        let mut err = ValidationError::new("max_stock_level");
        err.message = Some(STOCK_LEVELS_MESSAGE.into());
        return Err(err);
    }
    Ok(())
}

fn create_stock_levels(req: &CreateProductRequest) -> Result<(), ValidationError> {
    check_stock_levels(req.min_stock_level, req.max_stock_level)
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "create_stock_levels", skip_on_field_errors = false))]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub sku: String,
    #[validate(length(max = 50))]
    pub barcode: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub short_description: String,
    pub category_id: Uuid,
    pub brand_id: Uuid,
    #[validate(custom = "non_negative")]
    pub cost_price: Decimal,
    #[validate(custom = "non_negative")]
    pub selling_price: Decimal,
    #[serde(default = "default_unit_type")]
    pub unit_type: UnitType,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub min_stock_level: i32,
    #[serde(default = "default_max_stock")]
    #[validate(range(min = 0))]
    pub max_stock_level: i32,
    #[validate(custom = "non_negative")]
    pub weight: Option<Decimal>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub dimensions: String,
    #[serde(default = "default_status")]
    pub status: ProductStatus,
    #[serde(default = "default_true")]
    pub is_taxable: bool,
    #[serde(default)]
    #[validate(custom = "percentage")]
    pub tax_rate: Decimal,
    #[validate(length(max = 500))]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub sku: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 50))]
    pub barcode: Option<Option<String>>,
    pub description: Option<String>,
    #[validate(length(max = 500))]
    pub short_description: Option<String>,
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    #[validate(custom = "non_negative")]
    pub cost_price: Option<Decimal>,
    #[validate(custom = "non_negative")]
    pub selling_price: Option<Decimal>,
    pub unit_type: Option<UnitType>,
    #[validate(range(min = 0))]
    pub min_stock_level: Option<i32>,
    #[validate(range(min = 0))]
    pub max_stock_level: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<Decimal>)]
    pub weight: Option<Option<Decimal>>,
    #[validate(length(max = 100))]
    pub dimensions: Option<String>,
    pub status: Option<ProductStatus>,
    pub is_taxable: Option<bool>,
    #[validate(custom = "percentage")]
    pub tax_rate: Option<Decimal>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub image: Option<Option<String>>,
}

impl From<CreateProductRequest> for UpdateProductRequest {
    fn from(req: CreateProductRequest) -> Self {
        Self {
            name: Some(req.name),
            sku: Some(req.sku),
            barcode: Some(req.barcode),
            description: Some(req.description),
            short_description: Some(req.short_description),
            category_id: Some(req.category_id),
            brand_id: Some(req.brand_id),
            cost_price: Some(req.cost_price),
            selling_price: Some(req.selling_price),
            unit_type: Some(req.unit_type),
            min_stock_level: Some(req.min_stock_level),
            max_stock_level: Some(req.max_stock_level),
            weight: Some(req.weight),
            dimensions: Some(req.dimensions),
            status: Some(req.status),
            is_taxable: Some(req.is_taxable),
            tax_rate: Some(req.tax_rate),
            image: Some(req.image),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub barcode: Option<String>,
    pub description: String,
    pub short_description: String,
    pub category_id: Uuid,
    pub category_name: Option<String>,
    pub brand_id: Uuid,
    pub brand_name: Option<String>,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub profit_margin: Decimal,
    pub unit_type: UnitType,
    pub min_stock_level: i32,
    pub max_stock_level: i32,
    pub current_stock: i64,
    pub is_low_stock: bool,
    pub is_out_of_stock: bool,
    pub weight: Option<Decimal>,
    pub dimensions: String,
    pub status: ProductStatus,
    pub is_taxable: bool,
    pub tax_rate: Decimal,
    pub image: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductFilters {
    pub category: Option<Uuid>,
    pub brand: Option<Uuid>,
    pub status: Option<ProductStatus>,
    pub is_taxable: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProductImageRequest {
    #[validate(length(min = 1, max = 500))]
    pub image: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub alt_text: String,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductImageResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub image: String,
    pub alt_text: String,
    pub is_primary: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

impl From<product_image::Model> for ProductImageResponse {
    fn from(model: product_image::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            image: model.image,
            alt_text: model.alt_text,
            is_primary: model.is_primary,
            sort_order: model.sort_order,
            created_at: model.created_at,
        }
    }
}

fn ordering() -> OrderingSpec {
    OrderingSpec::new()
        .field("name", product::Column::Name)
        .field("sku", product::Column::Sku)
        .field("created_at", product::Column::CreatedAt)
        .field("selling_price", product::Column::SellingPrice)
        .default_asc(product::Column::Name)
}

#[derive(Default)]
struct ProductLabels {
    categories: lookups::Labels,
    brands: lookups::Labels,
    stock: HashMap<Uuid, i64>,
}

impl ProductLabels {
    fn render(&self, model: product::Model) -> ProductResponse {
        let stock = model.stock_level(self.stock.get(&model.id).copied().unwrap_or_default());
        ProductResponse {
            category_name: self.categories.get(&model.category_id).cloned(),
            brand_name: self.brands.get(&model.brand_id).cloned(),
            profit_margin: model.profit_margin(),
            current_stock: stock.current_stock,
            is_low_stock: stock.is_low_stock,
            is_out_of_stock: stock.is_out_of_stock,
            id: model.id,
            name: model.name,
            sku: model.sku,
            barcode: model.barcode,
            description: model.description,
            short_description: model.short_description,
            category_id: model.category_id,
            brand_id: model.brand_id,
            cost_price: model.cost_price,
            selling_price: model.selling_price,
            unit_type: model.unit_type,
            min_stock_level: model.min_stock_level,
            max_stock_level: model.max_stock_level,
            weight: model.weight,
            dimensions: model.dimensions,
            status: model.status,
            is_taxable: model.is_taxable,
            tax_rate: model.tax_rate,
            image: model.image,
            created_by: model.created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Sums signed movement quantities per product
pub fn stock_totals<I: IntoIterator<Item = (Uuid, i32)>>(movements: I) -> HashMap<Uuid, i64> {
    let mut totals: HashMap<Uuid, i64> = HashMap::new();
    for (product_id, quantity) in movements {
        *totals.entry(product_id).or_default() += i64::from(quantity);
    }
    totals
}

#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
    audit: AuditService,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            audit: AuditService::new(db.clone()),
            db,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: &ListParams,
        filters: ProductFilters,
    ) -> Result<Page<ProductResponse>, ServiceError> {
        let search = SearchBuilder::new(params.search.as_deref())
            .field(product::Column::Name)
            .field(product::Column::Sku)
            .field(product::Column::Barcode)
            .field(product::Column::Description);

        let page = QueryBuilder::new(product::Entity::find())
            .filter_eq(product::Column::CategoryId, filters.category)
            .filter_eq(product::Column::BrandId, filters.brand)
            .filter_eq(product::Column::Status, filters.status)
            .filter_eq(product::Column::IsTaxable, filters.is_taxable)
            .list(params, search, &ordering())
            .fetch(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        let labels = self.labels(&page.items).await?;
        Ok(page.map(|p| labels.render(p)))
    }

    pub async fn get(&self, id: Uuid) -> Result<ProductResponse, ServiceError> {
        let model = find_or_404::<product::Entity, _>(&*self.db, id, "Product").await?;
        self.respond(model).await
    }

    #[instrument(skip(self, input, actor), fields(sku = %input.sku))]
    pub async fn create(
        &self,
        input: CreateProductRequest,
        actor: &Actor,
    ) -> Result<ProductResponse, ServiceError> {
        input.validate()?;
        ensure_exists::<category::Entity, _>(&*self.db, input.category_id, "category_id").await?;
        ensure_exists::<brand::Entity, _>(&*self.db, input.brand_id, "brand_id").await?;

        let model = product::ActiveModel {
            name: Set(input.name),
            sku: Set(input.sku),
            barcode: Set(normalize_barcode(input.barcode)),
            description: Set(input.description),
            short_description: Set(input.short_description),
            category_id: Set(input.category_id),
            brand_id: Set(input.brand_id),
            cost_price: Set(input.cost_price),
            selling_price: Set(input.selling_price),
            unit_type: Set(input.unit_type),
            min_stock_level: Set(input.min_stock_level),
            max_stock_level: Set(input.max_stock_level),
            weight: Set(input.weight.map(|w| w.round_dp(3))),
            dimensions: Set(input.dimensions),
            status: Set(input.status),
            is_taxable: Set(input.is_taxable),
            tax_rate: Set(input.tax_rate),
            image: Set(input.image),
            created_by: Set(actor.user_id),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(product_id = %model.id, sku = %model.sku, "Product created");
        let response = self.respond(model).await?;
        self.record(actor, AuditAction::Create, &response).await;
        Ok(response)
    }

    #[instrument(skip(self, input, actor))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateProductRequest,
        actor: &Actor,
    ) -> Result<ProductResponse, ServiceError> {
        input.validate()?;
        let existing = find_or_404::<product::Entity, _>(&*self.db, id, "Product").await?;
        if let Some(category_id) = input.category_id {
            ensure_exists::<category::Entity, _>(&*self.db, category_id, "category_id").await?;
        }
        if let Some(brand_id) = input.brand_id {
            ensure_exists::<brand::Entity, _>(&*self.db, brand_id, "brand_id").await?;
        }

        let mut active: product::ActiveModel = existing.into();
        patch(&mut active.name, input.name);
        patch(&mut active.sku, input.sku);
        patch(&mut active.barcode, input.barcode.map(normalize_barcode));
        patch(&mut active.description, input.description);
        patch(&mut active.short_description, input.short_description);
        patch(&mut active.category_id, input.category_id);
        patch(&mut active.brand_id, input.brand_id);
        patch(&mut active.cost_price, input.cost_price);
        patch(&mut active.selling_price, input.selling_price);
        patch(&mut active.unit_type, input.unit_type);
        patch(&mut active.min_stock_level, input.min_stock_level);
        patch(&mut active.max_stock_level, input.max_stock_level);
        patch(&mut active.weight, input.weight.map(|w| w.map(|w| w.round_dp(3))));
        patch(&mut active.dimensions, input.dimensions);
        patch(&mut active.status, input.status);
        patch(&mut active.is_taxable, input.is_taxable);
        patch(&mut active.tax_rate, input.tax_rate);
        patch(&mut active.image, input.image);

        if let (Some(min), Some(max)) = (
            current(&active.min_stock_level),
            current(&active.max_stock_level),
        ) {
            check_stock_levels(min, max).map_err(|_| {
                ServiceError::ValidationError(format!("max_stock_level: {STOCK_LEVELS_MESSAGE}"))
            })?;
        }

        let model = active
            .update(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        info!(product_id = %id, "Product updated");
        let response = self.respond(model).await?;
        self.record(actor, AuditAction::Update, &response).await;
        Ok(response)
    }

    /// Stock movements and images are removed with the product
    #[instrument(skip(self, actor))]
    pub async fn delete(&self, id: Uuid, actor: &Actor) -> Result<(), ServiceError> {
        let existing = find_or_404::<product::Entity, _>(&*self.db, id, "Product").await?;
        delete_or_404::<product::Entity, _>(&*self.db, id, "Product").await?;

        info!(product_id = %id, "Product deleted");
        self.audit
            .record(actor, AuditAction::Delete, "Product", id, &existing.name, None)
            .await;
        Ok(())
    }

    pub async fn images(&self, product_id: Uuid) -> Result<Vec<ProductImageResponse>, ServiceError> {
        find_or_404::<product::Entity, _>(&*self.db, product_id, "Product").await?;
        let images = product_image::Entity::find()
            .filter(product_image::Column::ProductId.eq(product_id))
            .order_by_asc(product_image::Column::SortOrder)
            .order_by_asc(product_image::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        Ok(images.into_iter().map(ProductImageResponse::from).collect())
    }

    #[instrument(skip(self, input))]
    pub async fn add_image(
        &self,
        product_id: Uuid,
        input: CreateProductImageRequest,
    ) -> Result<ProductImageResponse, ServiceError> {
        input.validate()?;
        find_or_404::<product::Entity, _>(&*self.db, product_id, "Product").await?;

        if input.is_primary {
            let primaries = product_image::Entity::find()
                .filter(product_image::Column::ProductId.eq(product_id))
                .filter(product_image::Column::IsPrimary.eq(true))
                .count(&*self.db)
                .await
                .map_err(ServiceError::db_error)?;
            if primaries > 0 {
                return Err(ServiceError::ValidationError(
                    "Only one primary image is allowed per product.".to_string(),
                ));
            }
        }

        let model = product_image::ActiveModel {
            product_id: Set(product_id),
            image: Set(input.image),
            alt_text: Set(input.alt_text),
            is_primary: Set(input.is_primary),
            sort_order: Set(input.sort_order),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(product_id = %product_id, image_id = %model.id, "Product image added");
        Ok(model.into())
    }

    #[instrument(skip(self))]
    pub async fn delete_image(&self, product_id: Uuid, image_id: Uuid) -> Result<(), ServiceError> {
        let result = product_image::Entity::delete_many()
            .filter(product_image::Column::Id.eq(image_id))
            .filter(product_image::Column::ProductId.eq(product_id))
            .exec(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Product image", image_id));
        }
        info!(product_id = %product_id, image_id = %image_id, "Product image deleted");
        Ok(())
    }

    async fn respond(&self, model: product::Model) -> Result<ProductResponse, ServiceError> {
        let labels = self.labels(std::slice::from_ref(&model)).await?;
        Ok(labels.render(model))
    }

    async fn labels(&self, rows: &[product::Model]) -> Result<ProductLabels, ServiceError> {
        if rows.is_empty() {
            return Ok(ProductLabels::default());
        }
        let db = &*self.db;
        let categories = lookups::lookup::<category::Entity, _, _, _, _>(
            db,
            category::Column::Id,
            rows.iter().map(|p| p.category_id),
            |c| (c.id, c.name),
        )
        .await
        .map_err(ServiceError::db_error)?;
        let brands = lookups::lookup::<brand::Entity, _, _, _, _>(
            db,
            brand::Column::Id,
            rows.iter().map(|p| p.brand_id),
            |b| (b.id, b.name),
        )
        .await
        .map_err(ServiceError::db_error)?;

        let movements: Vec<(Uuid, i32)> = inventory_item::Entity::find()
            .select_only()
            .column(inventory_item::Column::ProductId)
            .column(inventory_item::Column::Quantity)
            .filter(inventory_item::Column::ProductId.is_in(rows.iter().map(|p| p.id)))
            .into_tuple()
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(ProductLabels {
            categories,
            brands,
            stock: stock_totals(movements),
        })
    }

    async fn record(&self, actor: &Actor, action: AuditAction, response: &ProductResponse) {
        self.audit
            .record(
                actor,
                action,
                "Product",
                response.id,
                &response.name,
                serde_json::to_value(response).ok(),
            )
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> serde_json::Value {
        serde_json::json!({
            "name": "Drill",
            "sku": "DR-100",
            "category_id": Uuid::new_v4(),
            "brand_id": Uuid::new_v4(),
            "cost_price": "80.00",
            "selling_price": "100.00"
        })
    }

    #[test]
    fn defaults_match_catalogue_conventions() {
        let req: CreateProductRequest = serde_json::from_value(body()).unwrap();
        assert_eq!(req.unit_type, UnitType::Piece);
        assert_eq!(req.status, ProductStatus::Active);
        assert_eq!(req.min_stock_level, 0);
        assert_eq!(req.max_stock_level, 1000);
        assert!(req.is_taxable);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn max_below_min_is_rejected() {
        let mut value = body();
        value["min_stock_level"] = 50.into();
        value["max_stock_level"] = 10.into();
        let req: CreateProductRequest = serde_json::from_value(value).unwrap();
        let err = ServiceError::from(req.validate().unwrap_err());
        assert!(err.to_string().contains(STOCK_LEVELS_MESSAGE));
    }

    #[test]
    fn stock_sums_signed_movements() {
        let drill = Uuid::new_v4();
        let saw = Uuid::new_v4();
        let totals = stock_totals([(drill, 10), (drill, -3), (saw, -2), (drill, 1)]);
        assert_eq!(totals[&drill], 8);
        assert_eq!(totals[&saw], -2);
    }

    #[test]
    fn blank_barcode_is_stored_as_null() {
        assert_eq!(normalize_barcode(Some("  ".into())), None);
        assert_eq!(normalize_barcode(Some(" 123 ".into())).as_deref(), Some("123"));
    }
}
