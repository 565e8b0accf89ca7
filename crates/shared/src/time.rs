//! Canonical timestamp formatting for API output.

use chrono::{DateTime, Utc};

/// The single textual format used for every timestamp in listing records.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats a timestamp with [`TIME_FORMAT`]. Also the canonical text of
/// timestamp filter bounds.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIME_FORMAT).to_string()
}

/// Serde helpers for `#[serde(serialize_with = ...)]` on record fields.
pub mod canonical {
    use chrono::{DateTime, Utc};
    use serde::Serializer;

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&ts.format(super::TIME_FORMAT))
    }
}
