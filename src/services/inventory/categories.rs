use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{current, nullable, patch},
    db::{ListParams, OrderingSpec, Page, QueryBuilder, SearchBuilder},
    entities::inventory::{category, product},
    errors::ServiceError,
    services::{delete_or_404, ensure_exists_opt, ensure_unreferenced, find_or_404},
};

const PATH_SEPARATOR: &str = " > ";

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub parent_id: Option<Uuid>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<Uuid>)]
    pub parent_id: Option<Option<Uuid>>,
    pub is_active: Option<bool>,
}

impl From<CreateCategoryRequest> for UpdateCategoryRequest {
    fn from(req: CreateCategoryRequest) -> Self {
        Self {
            name: Some(req.name),
            description: Some(req.description),
            parent_id: Some(req.parent_id),
            is_active: Some(req.is_active),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub parent_id: Option<Uuid>,
    /// Ancestor names joined with ` > `, root first
    pub full_path: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoryFilters {
    pub parent: Option<Uuid>,
    pub is_active: Option<bool>,
}

/// Name and parent of every category, enough to walk the tree in memory
#[derive(Debug, Default)]
pub struct CategoryTree {
    nodes: HashMap<Uuid, (String, Option<Uuid>)>,
}

impl CategoryTree {
    pub fn from_models<I: IntoIterator<Item = category::Model>>(models: I) -> Self {
        Self {
            nodes: models
                .into_iter()
                .map(|c| (c.id, (c.name, c.parent_id)))
                .collect(),
        }
    }

    /// Ids from `id` up to the root, stopping at a repeated id or a dangling parent
    fn ancestry(&self, id: Uuid) -> Vec<Uuid> {
        let mut seen = HashSet::new();
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if !seen.insert(current) {
                warn!(category_id = %id, "Category hierarchy contains a cycle");
                break;
            }
            let Some((_, parent)) = self.nodes.get(&current) else {
                break;
            };
            chain.push(current);
            cursor = *parent;
        }
        chain
    }

    pub fn full_path(&self, id: Uuid) -> String {
        let names: Vec<&str> = self
            .ancestry(id)
            .iter()
            .rev()
            .filter_map(|id| self.nodes.get(id).map(|(name, _)| name.as_str()))
            .collect();
        names.join(PATH_SEPARATOR)
    }

    /// True when `candidate` is `id` itself or sits below it
    pub fn is_self_or_descendant(&self, id: Uuid, candidate: Uuid) -> bool {
        candidate == id || self.ancestry(candidate).contains(&id)
    }
}

fn ordering() -> OrderingSpec {
    OrderingSpec::new()
        .field("name", category::Column::Name)
        .field("created_at", category::Column::CreatedAt)
        .default_asc(category::Column::Name)
}

#[derive(Clone)]
pub struct CategoryService {
    db: Arc<DatabaseConnection>,
}

impl CategoryService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: &ListParams,
        filters: CategoryFilters,
    ) -> Result<Page<CategoryResponse>, ServiceError> {
        let search = SearchBuilder::new(params.search.as_deref())
            .field(category::Column::Name)
            .field(category::Column::Description);

        let page = QueryBuilder::new(category::Entity::find())
            .filter_eq(category::Column::ParentId, filters.parent)
            .filter_eq(category::Column::IsActive, filters.is_active)
            .list(params, search, &ordering())
            .fetch(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        let tree = self.tree().await?;
        Ok(page.map(|c| Self::render(c, &tree)))
    }

    pub async fn get(&self, id: Uuid) -> Result<CategoryResponse, ServiceError> {
        let model = find_or_404::<category::Entity, _>(&*self.db, id, "Category").await?;
        let tree = self.tree().await?;
        Ok(Self::render(model, &tree))
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: CreateCategoryRequest) -> Result<CategoryResponse, ServiceError> {
        input.validate()?;
        ensure_exists_opt::<category::Entity, _>(&*self.db, input.parent_id, "parent_id").await?;

        let model = category::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            parent_id: Set(input.parent_id),
            is_active: Set(input.is_active),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(category_id = %model.id, "Category created");
        self.get(model.id).await
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateCategoryRequest,
    ) -> Result<CategoryResponse, ServiceError> {
        input.validate()?;
        let existing = find_or_404::<category::Entity, _>(&*self.db, id, "Category").await?;

        let mut active: category::ActiveModel = existing.into();
        patch(&mut active.name, input.name);
        patch(&mut active.description, input.description);
        patch(&mut active.parent_id, input.parent_id);
        patch(&mut active.is_active, input.is_active);

        if let Some(parent_id) = current(&active.parent_id).flatten() {
            ensure_exists_opt::<category::Entity, _>(&*self.db, Some(parent_id), "parent_id").await?;
            if self.tree().await?.is_self_or_descendant(id, parent_id) {
                return Err(ServiceError::ValidationError(
                    "parent_id: A category cannot be its own parent or a child of its descendants."
                        .to_string(),
                ));
            }
        }

        let model = active
            .update(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        info!(category_id = %id, "Category updated");
        self.get(model.id).await
    }

    /// Subcategories are removed with their parent; categories still holding products give 409
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        ensure_unreferenced::<product::Entity, _>(
            &*self.db,
            product::Column::CategoryId,
            id,
            "Category",
            "product(s)",
        )
        .await?;
        delete_or_404::<category::Entity, _>(&*self.db, id, "Category").await?;
        info!(category_id = %id, "Category deleted");
        Ok(())
    }

    async fn tree(&self) -> Result<CategoryTree, ServiceError> {
        let all = category::Entity::find()
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        Ok(CategoryTree::from_models(all))
    }

    fn render(model: category::Model, tree: &CategoryTree) -> CategoryResponse {
        CategoryResponse {
            full_path: tree.full_path(model.id),
            id: model.id,
            name: model.name,
            description: model.description,
            parent_id: model.parent_id,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, parent: Option<Uuid>) -> category::Model {
        let now = Utc::now();
        category::Model {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            parent_id: parent,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn full_path_joins_ancestors_root_first() {
        let root = node("Electronics", None);
        let mid = node("Computers", Some(root.id));
        let leaf = node("Laptops", Some(mid.id));
        let (root_id, leaf_id) = (root.id, leaf.id);
        let tree = CategoryTree::from_models([root, mid, leaf]);

        assert_eq!(tree.full_path(leaf_id), "Electronics > Computers > Laptops");
        assert_eq!(tree.full_path(root_id), "Electronics");
    }

    #[test]
    fn cycle_does_not_loop_forever() {
        let mut a = node("A", None);
        let b = node("B", Some(a.id));
        a.parent_id = Some(b.id);
        let a_id = a.id;
        let tree = CategoryTree::from_models([a, b]);

        assert_eq!(tree.full_path(a_id), "B > A");
    }

    #[test]
    fn descendants_cannot_become_parents() {
        let root = node("Tools", None);
        let child = node("Hand tools", Some(root.id));
        let other = node("Garden", None);
        let (root_id, child_id, other_id) = (root.id, child.id, other.id);
        let tree = CategoryTree::from_models([root, child, other]);

        assert!(tree.is_self_or_descendant(root_id, root_id));
        assert!(tree.is_self_or_descendant(root_id, child_id));
        assert!(!tree.is_self_or_descendant(root_id, other_id));
        assert!(!tree.is_self_or_descendant(child_id, root_id));
    }
}
