use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter,
    QuerySelect, RelationTrait, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{nullable, patch, validate_phone},
    db::{ListParams, OrderingSpec, Page, QueryBuilder, SearchBuilder},
    entities::accounts::{profile, user, Gender},
    errors::ServiceError,
    services::{delete_or_404, ensure_exists, find_or_404, lookups},
};

fn default_country() -> String {
    "Iran".to_string()
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProfileRequest {
    pub user_id: Uuid,
    #[validate(length(max = 500))]
    pub avatar: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub bio: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub city: String,
    #[serde(default = "default_country")]
    #[validate(length(max = 100))]
    pub country: String,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub postal_code: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub emergency_contact_name: String,
    #[serde(default)]
    #[validate(length(max = 17), custom = "validate_phone")]
    pub emergency_contact_phone: String,
}

/// The owning user cannot be changed after creation
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 500))]
    pub avatar: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<Gender>)]
    pub gender: Option<Option<Gender>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<NaiveDate>)]
    pub date_of_birth: Option<Option<NaiveDate>>,
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
    #[validate(length(max = 20))]
    pub postal_code: Option<String>,
    #[validate(length(max = 100))]
    pub emergency_contact_name: Option<String>,
    #[validate(length(max = 17), custom = "validate_phone")]
    pub emergency_contact_phone: Option<String>,
}

impl From<CreateProfileRequest> for UpdateProfileRequest {
    fn from(req: CreateProfileRequest) -> Self {
        Self {
            avatar: Some(req.avatar),
            gender: Some(req.gender),
            date_of_birth: Some(req.date_of_birth),
            bio: Some(req.bio),
            address: Some(req.address),
            city: Some(req.city),
            country: Some(req.country),
            postal_code: Some(req.postal_code),
            emergency_contact_name: Some(req.emergency_contact_name),
            emergency_contact_phone: Some(req.emergency_contact_phone),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub avatar: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub bio: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub postal_code: String,
    pub emergency_contact_name: String,
    pub emergency_contact_phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileResponse {
    fn build(model: profile::Model, owner: Option<&user::Model>) -> Self {
        Self {
            user_name: owner.map(user::Model::full_name),
            user_email: owner.map(|u| u.email.clone()),
            id: model.id,
            user_id: model.user_id,
            avatar: model.avatar,
            gender: model.gender,
            date_of_birth: model.date_of_birth,
            bio: model.bio,
            address: model.address,
            city: model.city,
            country: model.country,
            postal_code: model.postal_code,
            emergency_contact_name: model.emergency_contact_name,
            emergency_contact_phone: model.emergency_contact_phone,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProfileFilters {
    pub gender: Option<Gender>,
    pub city: Option<String>,
}

fn ordering() -> OrderingSpec {
    OrderingSpec::new()
        .field("created_at", profile::Column::CreatedAt)
        .field("updated_at", profile::Column::UpdatedAt)
        .default_desc(profile::Column::CreatedAt)
}

#[derive(Clone)]
pub struct ProfileService {
    db: Arc<DatabaseConnection>,
}

impl ProfileService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: &ListParams,
        filters: ProfileFilters,
    ) -> Result<Page<ProfileResponse>, ServiceError> {
        let search = SearchBuilder::new(params.search.as_deref())
            .field(user::Column::FirstName)
            .field(user::Column::LastName)
            .field(user::Column::Email);

        let select = profile::Entity::find().join(JoinType::InnerJoin, profile::Relation::User.def());
        let page = QueryBuilder::new(select)
            .filter_eq(profile::Column::Gender, filters.gender)
            .filter_eq(profile::Column::City, filters.city)
            .list(params, search, &ordering())
            .fetch(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        let owners = lookups::lookup::<user::Entity, _, _, _, _>(
            &*self.db,
            user::Column::Id,
            page.items.iter().map(|p| p.user_id),
            |u| (u.id, u),
        )
        .await
        .map_err(ServiceError::db_error)?;

        Ok(page.map(|p| {
            let owner = owners.get(&p.user_id);
            ProfileResponse::build(p, owner)
        }))
    }

    pub async fn get(&self, id: Uuid) -> Result<ProfileResponse, ServiceError> {
        let model = find_or_404::<profile::Entity, _>(&*self.db, id, "Profile").await?;
        self.respond(model).await
    }

    pub async fn for_user(&self, user_id: Uuid) -> Result<Option<ProfileResponse>, ServiceError> {
        let found = profile::Entity::find()
            .filter(profile::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        match found {
            Some(model) => self.respond(model).await.map(Some),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    pub async fn create(&self, input: CreateProfileRequest) -> Result<ProfileResponse, ServiceError> {
        input.validate()?;
        ensure_exists::<user::Entity, _>(&*self.db, input.user_id, "user_id").await?;

        let model = profile::ActiveModel {
            user_id: Set(input.user_id),
            avatar: Set(input.avatar),
            gender: Set(input.gender),
            date_of_birth: Set(input.date_of_birth),
            bio: Set(input.bio),
            address: Set(input.address),
            city: Set(input.city),
            country: Set(input.country),
            postal_code: Set(input.postal_code),
            emergency_contact_name: Set(input.emergency_contact_name),
            emergency_contact_phone: Set(input.emergency_contact_phone),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(profile_id = %model.id, "Profile created");
        self.respond(model).await
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateProfileRequest,
    ) -> Result<ProfileResponse, ServiceError> {
        input.validate()?;
        let existing = find_or_404::<profile::Entity, _>(&*self.db, id, "Profile").await?;

        let mut active: profile::ActiveModel = existing.into();
        patch(&mut active.avatar, input.avatar);
        patch(&mut active.gender, input.gender);
        patch(&mut active.date_of_birth, input.date_of_birth);
        patch(&mut active.bio, input.bio);
        patch(&mut active.address, input.address);
        patch(&mut active.city, input.city);
        patch(&mut active.country, input.country);
        patch(&mut active.postal_code, input.postal_code);
        patch(&mut active.emergency_contact_name, input.emergency_contact_name);
        patch(&mut active.emergency_contact_phone, input.emergency_contact_phone);

        let model = active
            .update(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        info!(profile_id = %id, "Profile updated");
        self.respond(model).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        delete_or_404::<profile::Entity, _>(&*self.db, id, "Profile").await?;
        info!(profile_id = %id, "Profile deleted");
        Ok(())
    }

    async fn respond(&self, model: profile::Model) -> Result<ProfileResponse, ServiceError> {
        let owner = user::Entity::find_by_id(model.user_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        Ok(ProfileResponse::build(model, owner.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_defaults_to_iran() {
        let req: CreateProfileRequest =
            serde_json::from_value(serde_json::json!({ "user_id": Uuid::new_v4() })).unwrap();
        assert_eq!(req.country, "Iran");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn explicit_null_clears_optional_fields() {
        let req: UpdateProfileRequest =
            serde_json::from_value(serde_json::json!({ "gender": null, "city": "Tabriz" }))
                .unwrap();
        assert_eq!(req.gender, Some(None));
        assert_eq!(req.date_of_birth, None);
        assert_eq!(req.city.as_deref(), Some("Tabriz"));
    }
}
