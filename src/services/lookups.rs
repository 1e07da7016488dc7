//! Batched id → label lookups used to decorate list responses without N+1 queries.

use std::collections::{HashMap, HashSet};

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entities::{
    accounts::user,
    core_data::{company, contact},
    finance::account,
};

pub type Labels = HashMap<Uuid, String>;

/// Fetches every row whose `id_column` is among `ids` and maps it through `f`
pub async fn lookup<E, C, I, T, F>(
    db: &C,
    id_column: E::Column,
    ids: I,
    f: F,
) -> Result<HashMap<Uuid, T>, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
    I: IntoIterator,
    I::Item: Into<Option<Uuid>>,
    F: Fn(E::Model) -> (Uuid, T),
{
    let ids: HashSet<Uuid> = ids.into_iter().filter_map(Into::into).collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = E::find().filter(id_column.is_in(ids)).all(db).await?;
    Ok(rows.into_iter().map(f).collect())
}

pub async fn user_names<C, I>(db: &C, ids: I) -> Result<Labels, DbErr>
where
    C: ConnectionTrait,
    I: IntoIterator,
    I::Item: Into<Option<Uuid>>,
{
    lookup::<user::Entity, _, _, _, _>(db, user::Column::Id, ids, |u| (u.id, u.full_name())).await
}

pub async fn contact_names<C, I>(db: &C, ids: I) -> Result<Labels, DbErr>
where
    C: ConnectionTrait,
    I: IntoIterator,
    I::Item: Into<Option<Uuid>>,
{
    lookup::<contact::Entity, _, _, _, _>(db, contact::Column::Id, ids, |c| {
        (c.id, c.full_name())
    })
    .await
}

pub async fn company_names<C, I>(db: &C, ids: I) -> Result<Labels, DbErr>
where
    C: ConnectionTrait,
    I: IntoIterator,
    I::Item: Into<Option<Uuid>>,
{
    lookup::<company::Entity, _, _, _, _>(db, company::Column::Id, ids, |c| (c.id, c.name)).await
}

pub async fn account_names<C, I>(db: &C, ids: I) -> Result<Labels, DbErr>
where
    C: ConnectionTrait,
    I: IntoIterator,
    I::Item: Into<Option<Uuid>>,
{
    lookup::<account::Entity, _, _, _, _>(db, account::Column::Id, ids, |a| (a.id, a.name)).await
}

/// Label for an optional reference
pub fn label(labels: &Labels, id: Option<Uuid>) -> Option<String> {
    id.and_then(|id| labels.get(&id).cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_references_have_no_label() {
        let id = Uuid::new_v4();
        let labels: Labels = [(id, "Cash Account".to_string())].into_iter().collect();
        assert_eq!(label(&labels, Some(id)).as_deref(), Some("Cash Account"));
        assert_eq!(label(&labels, Some(Uuid::new_v4())), None);
        assert_eq!(label(&labels, None), None);
    }
}
