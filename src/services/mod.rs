//! Business services. Each service owns a database handle and exposes the
//! operations its REST resource needs; request and response DTOs live beside
//! the service that consumes them.

use sea_orm::{
    ColumnTrait, ConnectionTrait, DeleteResult, EntityTrait, PaginatorTrait, PrimaryKeyTrait,
    QueryFilter,
};
use uuid::Uuid;

use crate::errors::ServiceError;

pub mod accounts;
pub mod audit;
pub mod core_data;
pub mod field_service;
pub mod finance;
pub mod inventory;
pub mod lookups;
pub mod numbering;

/// Who performed a write, and from where
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Option<Uuid>,
    pub ip_address: Option<String>,
    pub user_agent: String,
}

impl Actor {
    pub fn user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            ..Default::default()
        }
    }

    /// Writes made without a signed-in user
    pub fn system() -> Self {
        Self::default()
    }
}

/// Loads a row by primary key or fails with a 404 naming `kind`
pub(crate) async fn find_or_404<E, C>(db: &C, id: Uuid, kind: &str) -> Result<E::Model, ServiceError>
where
    E: EntityTrait,
    C: ConnectionTrait,
    Uuid: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
{
    E::find_by_id(id)
        .one(db)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::not_found(kind, id))
}

/// Rejects a reference to a missing row with a 400 naming the offending field
pub(crate) async fn ensure_exists<E, C>(db: &C, id: Uuid, field: &str) -> Result<(), ServiceError>
where
    E: EntityTrait,
    C: ConnectionTrait,
    Uuid: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
{
    let found = E::find_by_id(id)
        .one(db)
        .await
        .map_err(ServiceError::db_error)?;

    match found {
        Some(_) => Ok(()),
        None => Err(ServiceError::ValidationError(format!(
            "{field}: Invalid pk \"{id}\" - object does not exist."
        ))),
    }
}

/// Same as [`ensure_exists`] for nullable references
pub(crate) async fn ensure_exists_opt<E, C>(
    db: &C,
    id: Option<Uuid>,
    field: &str,
) -> Result<(), ServiceError>
where
    E: EntityTrait,
    C: ConnectionTrait,
    Uuid: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
{
    match id {
        Some(id) => ensure_exists::<E, C>(db, id, field).await,
        None => Ok(()),
    }
}

/// Deletes a row by primary key; protected references surface as 409
pub(crate) async fn delete_or_404<E, C>(db: &C, id: Uuid, kind: &str) -> Result<(), ServiceError>
where
    E: EntityTrait,
    C: ConnectionTrait,
    Uuid: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
{
    let DeleteResult { rows_affected } = E::delete_by_id(id)
        .exec(db)
        .await
        .map_err(ServiceError::db_error)?;

    if rows_affected == 0 {
        return Err(ServiceError::not_found(kind, id));
    }
    Ok(())
}

/// Refuses to delete `kind` while rows of `E` still point at it through `column`
pub(crate) async fn ensure_unreferenced<E, C>(
    db: &C,
    column: E::Column,
    id: Uuid,
    kind: &str,
    relation: &str,
) -> Result<(), ServiceError>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let references = E::find()
        .filter(column.eq(id))
        .count(db)
        .await
        .map_err(ServiceError::db_error)?;

    if references > 0 {
        return Err(ServiceError::Conflict(format!(
            "Cannot delete {kind} {id}: it is referenced by {references} {relation}."
        )));
    }
    Ok(())
}
