use sea_orm::{
    sea_query::{Expr, Func, LikeExpr, SimpleExpr},
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, Order, PaginatorTrait, QueryFilter,
    QueryOrder, Select,
};

/// Pagination, search and ordering requested by a list endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub page: u64,
    pub limit: u64,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

/// One page of rows plus the total row count across all pages
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            0
        } else {
            self.total.div_ceil(self.limit)
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }
}

/// Whitelisted ordering fields for a resource, plus its default order.
///
/// The `ordering` parameter is a comma separated list such as `-invoice_date,name`.
/// Unknown names are dropped; when nothing valid remains the default applies.
#[derive(Clone, Default)]
pub struct OrderingSpec {
    fields: Vec<(&'static str, SimpleExpr)>,
    default: Vec<(SimpleExpr, Order)>,
}

impl OrderingSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field<C: ColumnTrait>(mut self, name: &'static str, column: C) -> Self {
        self.fields.push((name, column_expr(column)));
        self
    }

    pub fn default_asc<C: ColumnTrait>(mut self, column: C) -> Self {
        self.default.push((column_expr(column), Order::Asc));
        self
    }

    pub fn default_desc<C: ColumnTrait>(mut self, column: C) -> Self {
        self.default.push((column_expr(column), Order::Desc));
        self
    }

    /// Names accepted by this spec, in declaration order
    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|(name, _)| *name).collect()
    }

    pub fn resolve(&self, ordering: Option<&str>) -> Vec<(SimpleExpr, Order)> {
        let requested: Vec<(SimpleExpr, Order)> = ordering
            .unwrap_or_default()
            .split(',')
            .filter_map(|raw| {
                let raw = raw.trim();
                let (name, order) = match raw.strip_prefix('-') {
                    Some(stripped) => (stripped, Order::Desc),
                    None => (raw, Order::Asc),
                };
                self.fields
                    .iter()
                    .find(|(field, _)| *field == name)
                    .map(|(_, expr)| (expr.clone(), order))
            })
            .collect();

        if requested.is_empty() {
            self.default.clone()
        } else {
            requested
        }
    }
}

/// Case-insensitive substring search across several columns.
///
/// The search text is split on whitespace; every term has to match at least
/// one column.
pub struct SearchBuilder {
    terms: Vec<String>,
    conditions: Vec<Condition>,
}

impl SearchBuilder {
    pub fn new(search: Option<&str>) -> Self {
        let terms: Vec<String> = search
            .unwrap_or_default()
            .split_whitespace()
            .map(|term| term.to_lowercase())
            .collect();
        let conditions = terms.iter().map(|_| Condition::any()).collect();
        Self { terms, conditions }
    }

    pub fn field<C: ColumnTrait>(mut self, column: C) -> Self {
        let column = column_expr(column);
        self.conditions = self
            .terms
            .iter()
            .zip(self.conditions)
            .map(|(term, cond)| {
                let pattern = format!("%{}%", escape_like(term));
                cond.add(
                    Expr::expr(Func::lower(column.clone()))
                        .like(LikeExpr::new(pattern).escape(LIKE_ESCAPE)),
                )
            })
            .collect();
        self
    }

    pub fn build(self) -> Option<Condition> {
        if self.terms.is_empty() {
            None
        } else {
            Some(
                self.conditions
                    .into_iter()
                    .fold(Condition::all(), |acc, cond| acc.add(cond)),
            )
        }
    }
}

/// Helper for composing list queries
pub struct QueryBuilder<E: EntityTrait> {
    query: Select<E>,
    page: u64,
    limit: u64,
}

impl<E: EntityTrait> QueryBuilder<E> {
    pub fn new(query: Select<E>) -> Self {
        Self {
            query,
            page: 1,
            limit: 20,
        }
    }

    pub fn paginate(mut self, page: u64, limit: u64) -> Self {
        self.page = page.max(1);
        self.limit = limit.max(1);
        self
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.query = self.query.filter(condition);
        self
    }

    /// Adds an equality filter when the value is present
    pub fn filter_eq<C, V>(mut self, column: C, value: Option<V>) -> Self
    where
        C: ColumnTrait,
        V: Into<sea_orm::Value>,
    {
        if let Some(value) = value {
            self.query = self.query.filter(column.eq(value));
        }
        self
    }

    pub fn search(mut self, search: SearchBuilder) -> Self {
        if let Some(condition) = search.build() {
            self.query = self.query.filter(condition);
        }
        self
    }

    pub fn order(mut self, spec: &OrderingSpec, ordering: Option<&str>) -> Self {
        for (expr, order) in spec.resolve(ordering) {
            self.query = self.query.order_by(expr, order);
        }
        self
    }

    /// Applies page, search and ordering from request parameters
    pub fn list(self, params: &ListParams, search: SearchBuilder, spec: &OrderingSpec) -> Self {
        self.search(search)
            .order(spec, params.ordering.as_deref())
            .paginate(params.page, params.limit)
    }

    pub async fn fetch<C>(self, db: &C) -> Result<Page<E::Model>, sea_orm::DbErr>
    where
        C: ConnectionTrait,
        E::Model: Send + Sync,
    {
        let paginator = self.query.paginate(db, self.limit);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(self.page - 1).await?;

        Ok(Page {
            items,
            total,
            page: self.page,
            limit: self.limit,
        })
    }
}

fn column_expr<C: ColumnTrait>(column: C) -> SimpleExpr {
    Expr::col(column.as_column_ref()).into()
}

const LIKE_ESCAPE: char = '\\';

/// Makes `%` and `_` in user input match literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::core_data::contact;
    use sea_orm::{DbBackend, QueryTrait};

    fn contact_ordering() -> OrderingSpec {
        OrderingSpec::new()
            .field("first_name", contact::Column::FirstName)
            .field("last_name", contact::Column::LastName)
            .field("created_at", contact::Column::CreatedAt)
            .default_asc(contact::Column::LastName)
            .default_asc(contact::Column::FirstName)
    }

    fn sql(builder: QueryBuilder<contact::Entity>) -> String {
        builder.query.build(DbBackend::Sqlite).to_string()
    }

    #[test]
    fn ordering_falls_back_to_default() {
        let spec = contact_ordering();
        assert_eq!(spec.resolve(None).len(), 2);
        assert_eq!(spec.resolve(Some("bogus,,")).len(), 2);
        let sql = sql(QueryBuilder::new(contact::Entity::find()).order(&spec, None));
        assert!(sql.ends_with(r#"ORDER BY "contacts"."last_name" ASC, "contacts"."first_name" ASC"#));
    }

    #[test]
    fn ordering_accepts_descending_prefix_and_ignores_unknown() {
        let spec = contact_ordering();
        let resolved = spec.resolve(Some("-created_at, password, first_name"));
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].1, Order::Desc);
        assert_eq!(resolved[1].1, Order::Asc);
        assert_eq!(spec.field_names(), vec!["first_name", "last_name", "created_at"]);
    }

    #[test]
    fn search_requires_every_term() {
        let builder = QueryBuilder::new(contact::Entity::find()).search(
            SearchBuilder::new(Some("  Ali  Rez "))
                .field(contact::Column::FirstName)
                .field(contact::Column::LastName),
        );
        let sql = sql(builder);
        assert!(sql.contains("LIKE '%ali%'"));
        assert!(sql.contains("LIKE '%rez%'"));
        assert!(sql.contains(" AND "));
        assert!(sql.contains(" OR "));
    }

    #[test]
    fn wildcards_in_terms_match_literally() {
        assert_eq!(escape_like("ali_reza"), "ali\\_reza");
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a\\b"), "a\\\\b");

        let builder = QueryBuilder::new(contact::Entity::find())
            .search(SearchBuilder::new(Some("MOT_001")).field(contact::Column::Email));
        let sql = sql(builder);
        assert!(sql.contains("mot") && sql.contains("\\_001"), "{sql}");
        assert!(sql.contains("ESCAPE"), "{sql}");
    }

    #[test]
    fn empty_search_adds_no_condition() {
        assert!(SearchBuilder::new(Some("   "))
            .field(contact::Column::Email)
            .build()
            .is_none());
        assert!(SearchBuilder::new(None).build().is_none());
    }

    #[test]
    fn page_math() {
        let page = Page {
            items: vec![1, 2, 3],
            total: 41,
            page: 1,
            limit: 20,
        };
        assert_eq!(page.total_pages(), 3);
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.items, vec![10, 20, 30]);
        assert_eq!(mapped.total, 41);
    }
}
