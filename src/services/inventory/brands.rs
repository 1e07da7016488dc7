use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{blank_or_url, nullable, patch},
    db::{ListParams, OrderingSpec, Page, QueryBuilder, SearchBuilder},
    entities::inventory::{brand, product},
    errors::ServiceError,
    services::{delete_or_404, ensure_unreferenced, find_or_404},
};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBrandRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[validate(custom = "blank_or_url")]
    pub website: String,
    #[validate(length(max = 500))]
    pub logo: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBrandRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom = "blank_or_url")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub logo: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl From<CreateBrandRequest> for UpdateBrandRequest {
    fn from(req: CreateBrandRequest) -> Self {
        Self {
            name: Some(req.name),
            description: Some(req.description),
            website: Some(req.website),
            logo: Some(req.logo),
            is_active: Some(req.is_active),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BrandResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub website: String,
    pub logo: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<brand::Model> for BrandResponse {
    fn from(model: brand::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            website: model.website,
            logo: model.logo,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BrandFilters {
    pub is_active: Option<bool>,
}

fn ordering() -> OrderingSpec {
    OrderingSpec::new()
        .field("name", brand::Column::Name)
        .field("created_at", brand::Column::CreatedAt)
        .default_asc(brand::Column::Name)
}

#[derive(Clone)]
pub struct BrandService {
    db: Arc<DatabaseConnection>,
}

impl BrandService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: &ListParams,
        filters: BrandFilters,
    ) -> Result<Page<BrandResponse>, ServiceError> {
        let search = SearchBuilder::new(params.search.as_deref())
            .field(brand::Column::Name)
            .field(brand::Column::Description);

        let page = QueryBuilder::new(brand::Entity::find())
            .filter_eq(brand::Column::IsActive, filters.is_active)
            .list(params, search, &ordering())
            .fetch(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(page.map(BrandResponse::from))
    }

    pub async fn get(&self, id: Uuid) -> Result<BrandResponse, ServiceError> {
        Ok(find_or_404::<brand::Entity, _>(&*self.db, id, "Brand").await?.into())
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: CreateBrandRequest) -> Result<BrandResponse, ServiceError> {
        input.validate()?;
        let model = brand::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            website: Set(input.website),
            logo: Set(input.logo),
            is_active: Set(input.is_active),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(brand_id = %model.id, "Brand created");
        Ok(model.into())
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateBrandRequest) -> Result<BrandResponse, ServiceError> {
        input.validate()?;
        let existing = find_or_404::<brand::Entity, _>(&*self.db, id, "Brand").await?;

        let mut active: brand::ActiveModel = existing.into();
        patch(&mut active.name, input.name);
        patch(&mut active.description, input.description);
        patch(&mut active.website, input.website);
        patch(&mut active.logo, input.logo);
        patch(&mut active.is_active, input.is_active);

        let model = active
            .update(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        info!(brand_id = %id, "Brand updated");
        Ok(model.into())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        ensure_unreferenced::<product::Entity, _>(
            &*self.db,
            product::Column::BrandId,
            id,
            "Brand",
            "product(s)",
        )
        .await?;
        delete_or_404::<brand::Entity, _>(&*self.db, id, "Brand").await?;
        info!(brand_id = %id, "Brand deleted");
        Ok(())
    }
}
