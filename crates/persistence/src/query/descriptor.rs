//! Static table metadata for listings.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use shared::time::{format_timestamp, TIME_FORMAT};

/// SQL type of a filterable column. Decides how a request value is checked
/// and the cast applied to its bound parameter, since every filter value
/// arrives as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    SmallInt,
    Integer,
    BigInt,
    Boolean,
    Timestamp,
}

impl ColumnType {
    /// Postgres cast for a text parameter compared against this column.
    ///
    /// Timestamps are cast without a zone and then read as UTC, see
    /// [`ColumnType::zone`].
    pub fn cast(&self) -> Option<&'static str> {
        match self {
            ColumnType::Text => None,
            ColumnType::SmallInt => Some("smallint"),
            ColumnType::Integer => Some("integer"),
            ColumnType::BigInt => Some("bigint"),
            ColumnType::Boolean => Some("boolean"),
            ColumnType::Timestamp => Some("timestamp"),
        }
    }

    /// Zone a cast parameter is read in, independent of the session setting.
    pub fn zone(&self) -> Option<&'static str> {
        match self {
            ColumnType::Timestamp => Some("UTC"),
            _ => None,
        }
    }

    /// Canonical text of `raw` for this column, or `None` when the value is
    /// not of the column's type and the cast would fail.
    ///
    /// Integers must fit the column width. Booleans accept `true`/`false`,
    /// `t`/`f`, `yes`/`no`, `on`/`off` and `1`/`0`. Timestamps accept
    /// `YYYY-MM-DD HH:MM:SS`, a bare date (midnight) or RFC 3339 with an
    /// offset, and come back as UTC `YYYY-MM-DD HH:MM:SS`.
    pub fn coerce(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        match self {
            ColumnType::Text => Some(raw.to_string()),
            ColumnType::SmallInt => trimmed.parse::<i16>().ok().map(|v| v.to_string()),
            ColumnType::Integer => trimmed.parse::<i32>().ok().map(|v| v.to_string()),
            ColumnType::BigInt => trimmed.parse::<i64>().ok().map(|v| v.to_string()),
            ColumnType::Boolean => parse_bool(trimmed).map(|v| v.to_string()),
            ColumnType::Timestamp => parse_timestamp(trimmed).map(|ts| format_timestamp(&ts)),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in [TIME_FORMAT, "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Some(ts.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: ColumnType,
}

impl Column {
    pub const fn new(name: &'static str, sql_type: ColumnType) -> Self {
        Self { name, sql_type }
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, ColumnType::Text)
    }
}

/// A table, its identity column and its addressable columns.
///
/// Descriptors are `static` items owned by the repositories; the names in
/// them are the only identifiers ever spliced into SQL text.
#[derive(Debug)]
pub struct EntityDescriptor {
    pub table: &'static str,
    pub id_column: &'static str,
    pub columns: &'static [Column],
}

impl EntityDescriptor {
    /// Looks up an addressable column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Comma separated column list for `SELECT`.
    pub fn select_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
