//! Page coordinates and filter values of a listing request.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use persistence::query::FilterValues;
use shared::pagination::{PageRequest, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use std::collections::HashMap;
use std::convert::Infallible;

/// Largest page the admin API serves.
pub const MAX_PAGE_SIZE: i64 = 1000;

/// Query string of a listing endpoint.
///
/// `current` and `size` become the page coordinates; every other parameter
/// is a candidate filter value. Extraction never fails: a malformed query
/// string or a non-numeric coordinate falls back to the defaults.
#[derive(Debug, Clone)]
pub struct ListParams {
    pub page: PageRequest,
    pub filters: FilterValues,
}

impl ListParams {
    pub fn from_map(mut raw: HashMap<String, String>) -> Self {
        let current = parse_or(raw.remove("current"), DEFAULT_PAGE);
        let size = parse_or(raw.remove("size"), DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);

        Self {
            page: PageRequest::new(current, size),
            filters: raw.into(),
        }
    }
}

fn parse_or(value: Option<String>, default: i64) -> i64 {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(default)
}

#[async_trait]
impl<S> FromRequestParts<S> for ListParams
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw = match Query::<HashMap<String, String>>::from_request_parts(parts, state).await {
            Ok(Query(raw)) => raw,
            Err(rejection) => {
                tracing::debug!(error = %rejection, "Unparseable list query, using defaults");
                HashMap::new()
            }
        };
        Ok(Self::from_map(raw))
    }
}
