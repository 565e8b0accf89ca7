//! Query specification: predicates plus the fixed descending sort.

use sqlx::{Postgres, QueryBuilder};

use super::descriptor::{Column, EntityDescriptor};
use super::filter::{build_predicates, like_pattern, FilterDecl, FilterValues, Predicate};

/// Predicates over one entity, rendered into SQL with every value bound.
///
/// A spec is cheap to build and is rebuilt for each query it backs, so the
/// count and the fetch of one request always see the same predicate set.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    descriptor: &'static EntityDescriptor,
    predicates: Vec<Predicate>,
}

impl QuerySpec {
    pub fn new(descriptor: &'static EntityDescriptor, predicates: Vec<Predicate>) -> Self {
        Self {
            descriptor,
            predicates,
        }
    }

    pub fn from_filters(
        descriptor: &'static EntityDescriptor,
        decls: &[FilterDecl],
        values: &FilterValues,
    ) -> Self {
        Self::new(descriptor, build_predicates(descriptor, decls, values))
    }

    pub fn descriptor(&self) -> &'static EntityDescriptor {
        self.descriptor
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// `SELECT COUNT(*)` over every matching row.
    pub fn count_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM ");
        qb.push(self.descriptor.table);
        self.push_where(&mut qb);
        qb
    }

    /// One page of matching rows, newest identity first.
    pub fn select_query(&self, limit: i64, offset: i64) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(self.descriptor.select_list());
        qb.push(" FROM ");
        qb.push(self.descriptor.table);
        self.push_where(&mut qb);
        qb.push(" ORDER BY ");
        qb.push(self.descriptor.id_column);
        qb.push(" DESC LIMIT ");
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind(offset);
        qb
    }

    fn push_where(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        for (i, predicate) in self.predicates.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            match predicate {
                Predicate::Unsatisfiable { .. } => {
                    qb.push("FALSE");
                }
                Predicate::Eq { column, value } => {
                    qb.push(column.name);
                    qb.push(" = ");
                    push_value(qb, column, value);
                }
                Predicate::Contains { column, value } => {
                    qb.push(column.name);
                    if column.sql_type.cast().is_some() {
                        qb.push("::text");
                    }
                    qb.push(" ILIKE ");
                    qb.push_bind(like_pattern(value));
                }
                Predicate::Between {
                    column,
                    lower,
                    upper,
                } => {
                    qb.push(column.name);
                    qb.push(" BETWEEN ");
                    push_value(qb, column, lower);
                    qb.push(" AND ");
                    push_value(qb, column, upper);
                }
            }
        }
    }
}

fn push_value(qb: &mut QueryBuilder<'static, Postgres>, column: &Column, value: &str) {
    let zone = column.sql_type.zone();
    if zone.is_some() {
        qb.push("(");
    }
    qb.push_bind(value.to_string());
    if let Some(cast) = column.sql_type.cast() {
        qb.push("::");
        qb.push(cast);
    }
    if let Some(zone) = zone {
        qb.push(" AT TIME ZONE '");
        qb.push(zone);
        qb.push("')");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::descriptor::ColumnType;

    static SESSIONS: EntityDescriptor = EntityDescriptor {
        table: "sessions",
        id_column: "id",
        columns: &[
            Column::new("id", ColumnType::BigInt),
            Column::text("peer"),
            Column::new("kind", ColumnType::Integer),
            Column::new("created_at", ColumnType::Timestamp),
        ],
    };

    const FILTERS: &[FilterDecl] = &[
        FilterDecl::exact("peer", "peer"),
        FilterDecl::exact("type", "kind"),
        FilterDecl::contains("kind_like", "kind"),
        FilterDecl::range("created_at", "created_at"),
    ];

    #[test]
    fn test_unfiltered_queries() {
        let spec = QuerySpec::from_filters(&SESSIONS, FILTERS, &FilterValues::new());
        assert!(spec.predicates().is_empty());
        assert_eq!(spec.count_query().sql(), "SELECT COUNT(*) FROM sessions");
        assert_eq!(
            spec.select_query(10, 20).sql(),
            "SELECT id, peer, kind, created_at FROM sessions ORDER BY id DESC LIMIT $1 OFFSET $2"
        );
    }

    #[test]
    fn test_predicates_are_bound_and_cast() {
        let values: FilterValues = [
            ("peer", "'; DROP TABLE sessions; --"),
            ("type", "3"),
            ("created_at[0]", "2024-01-01 00:00:00"),
            ("created_at[1]", "2024-01-02 00:00:00"),
        ]
        .into_iter()
        .collect();
        let spec = QuerySpec::from_filters(&SESSIONS, FILTERS, &values);

        let count = spec.count_query();
        assert_eq!(
            count.sql(),
            "SELECT COUNT(*) FROM sessions WHERE peer = $1 AND kind = $2::integer \
             AND created_at BETWEEN ($3::timestamp AT TIME ZONE 'UTC') \
             AND ($4::timestamp AT TIME ZONE 'UTC')"
        );
        assert!(!count.sql().contains("DROP"));

        let select = spec.select_query(5, 0);
        assert!(select.sql().ends_with("ORDER BY id DESC LIMIT $5 OFFSET $6"));
    }

    #[test]
    fn test_mistyped_value_renders_false() {
        let values: FilterValues = [("peer", "p1"), ("type", "abc")].into_iter().collect();
        let spec = QuerySpec::from_filters(&SESSIONS, FILTERS, &values);
        assert_eq!(
            spec.count_query().sql(),
            "SELECT COUNT(*) FROM sessions WHERE peer = $1 AND FALSE"
        );
        assert_eq!(
            spec.select_query(10, 0).sql(),
            "SELECT id, peer, kind, created_at FROM sessions WHERE peer = $1 AND FALSE \
             ORDER BY id DESC LIMIT $2 OFFSET $3"
        );
    }

    #[test]
    fn test_contains_on_non_text_column() {
        let values: FilterValues = [("kind_like", "2")].into_iter().collect();
        let spec = QuerySpec::from_filters(&SESSIONS, FILTERS, &values);
        assert_eq!(
            spec.count_query().sql(),
            "SELECT COUNT(*) FROM sessions WHERE kind::text ILIKE $1"
        );
    }

    #[test]
    fn test_count_and_select_share_predicates() {
        let values: FilterValues = [("peer", "abc")].into_iter().collect();
        let first = QuerySpec::from_filters(&SESSIONS, FILTERS, &values);
        let second = QuerySpec::from_filters(&SESSIONS, FILTERS, &values);
        assert_eq!(first.predicates(), second.predicates());
    }
}
