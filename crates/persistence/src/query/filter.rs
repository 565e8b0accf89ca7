//! Predicate builder: raw request values to bound filter predicates.

use std::collections::HashMap;

use super::descriptor::{Column, EntityDescriptor};

/// How a filter compares its column with the request value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// `column = value`
    Exact,
    /// Case-insensitive substring match anywhere in the column.
    Contains,
    /// `column BETWEEN key[0] AND key[1]`, inclusive, only when both bounds
    /// are present.
    Range,
}

/// Maps a request key onto a column of the listed entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterDecl {
    pub key: &'static str,
    pub column: &'static str,
    pub kind: FilterKind,
}

impl FilterDecl {
    pub const fn exact(key: &'static str, column: &'static str) -> Self {
        Self {
            key,
            column,
            kind: FilterKind::Exact,
        }
    }

    pub const fn contains(key: &'static str, column: &'static str) -> Self {
        Self {
            key,
            column,
            kind: FilterKind::Contains,
        }
    }

    pub const fn range(key: &'static str, column: &'static str) -> Self {
        Self {
            key,
            column,
            kind: FilterKind::Range,
        }
    }
}

/// Raw filter values of one request, keyed by query parameter name.
///
/// Range bounds live under `key[0]` and `key[1]`. An empty string is the same
/// as a missing key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterValues(HashMap<String, String>);

impl FilterValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Non-empty value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Both bounds of the range filter `key`, or nothing if either is missing.
    pub fn range(&self, key: &str) -> Option<(&str, &str)> {
        let lower = self.get(&format!("{}[0]", key))?;
        let upper = self.get(&format!("{}[1]", key))?;
        Some((lower, upper))
    }
}

impl From<HashMap<String, String>> for FilterValues {
    fn from(values: HashMap<String, String>) -> Self {
        Self(values)
    }
}

impl<K, V> FromIterator<(K, V)> for FilterValues
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// One filter condition on one column. Values are always bound, never
/// spliced into SQL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// A supplied value is not of the column's type; no row can match.
    Unsatisfiable {
        column: Column,
    },
    Eq {
        column: Column,
        value: String,
    },
    Contains {
        column: Column,
        value: String,
    },
    Between {
        column: Column,
        lower: String,
        upper: String,
    },
}

impl Predicate {
    pub fn column(&self) -> &Column {
        match self {
            Predicate::Unsatisfiable { column }
            | Predicate::Eq { column, .. }
            | Predicate::Contains { column, .. }
            | Predicate::Between { column, .. } => column,
        }
    }
}

/// Builds the predicates of `decls` that the request actually supplies.
///
/// Request keys without a declaration are ignored. A declaration whose column
/// the descriptor does not know is skipped with a warning instead of
/// producing a predicate that could never match.
///
/// Exact and range values are checked against the column type and carried in
/// canonical form. A value of the wrong type (`conn_id=abc`) yields
/// [`Predicate::Unsatisfiable`], so the listing is empty rather than failing
/// in the database cast.
pub fn build_predicates(
    descriptor: &EntityDescriptor,
    decls: &[FilterDecl],
    values: &FilterValues,
) -> Vec<Predicate> {
    let mut predicates = Vec::new();

    for decl in decls {
        let Some(column) = descriptor.column(decl.column) else {
            tracing::warn!(
                table = descriptor.table,
                column = decl.column,
                filter = decl.key,
                "Filter references unknown column, skipping"
            );
            continue;
        };

        let column = *column;
        let predicate = match decl.kind {
            FilterKind::Exact => values.get(decl.key).map(|raw| {
                match column.sql_type.coerce(raw) {
                    Some(value) => Predicate::Eq { column, value },
                    None => unsatisfiable(descriptor, decl, column),
                }
            }),
            FilterKind::Contains => values.get(decl.key).map(|value| Predicate::Contains {
                column,
                value: value.to_string(),
            }),
            FilterKind::Range => values.range(decl.key).map(|(lower, upper)| {
                match (column.sql_type.coerce(lower), column.sql_type.coerce(upper)) {
                    (Some(lower), Some(upper)) => Predicate::Between {
                        column,
                        lower,
                        upper,
                    },
                    _ => unsatisfiable(descriptor, decl, column),
                }
            }),
        };

        predicates.extend(predicate);
    }

    predicates
}

fn unsatisfiable(descriptor: &EntityDescriptor, decl: &FilterDecl, column: Column) -> Predicate {
    tracing::debug!(
        table = descriptor.table,
        column = column.name,
        filter = decl.key,
        "Filter value does not match column type, nothing can match"
    );
    Predicate::Unsatisfiable { column }
}

/// `%needle%` with LIKE metacharacters in the needle escaped, so the match is
/// a literal substring.
pub fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
