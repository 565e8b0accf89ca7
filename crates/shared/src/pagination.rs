//! Offset-based pagination primitives shared by every listing endpoint.

use serde::Serialize;

/// Page number used when the request does not carry a usable one.
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when the request does not carry a usable one.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Normalized page coordinates.
///
/// Both coordinates are always at least 1, so the derived limit is positive
/// and the derived offset is never negative. No upper bound is applied here;
/// callers that need one clamp before constructing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    current: i64,
    size: i64,
}

impl PageRequest {
    /// Creates page coordinates, raising anything below 1 to 1.
    pub fn new(current: i64, size: i64) -> Self {
        Self {
            current: current.max(1),
            size: size.max(1),
        }
    }

    /// 1-based page number.
    pub fn current(&self) -> i64 {
        self.current
    }

    /// Maximum number of records on a page.
    pub fn size(&self) -> i64 {
        self.size
    }

    /// Row limit for the fetch query.
    pub fn limit(&self) -> i64 {
        self.size
    }

    /// Rows to skip before the requested page. Saturates instead of overflowing.
    pub fn offset(&self) -> i64 {
        (self.current - 1).saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_PAGE_SIZE)
    }
}

/// One page of a filtered listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// Number of rows matching the filters, ignoring page bounds.
    pub total: i64,
    pub records: Vec<T>,
    pub current: i64,
    pub size: i64,
}

impl<T> Page<T> {
    /// Builds a page from the coordinates that produced it.
    pub fn new(request: PageRequest, total: i64, records: Vec<T>) -> Self {
        Self {
            total,
            records,
            current: request.current(),
            size: request.size(),
        }
    }

    /// Projects every record, keeping totals and coordinates.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            total: self.total,
            records: self.records.into_iter().map(f).collect(),
            current: self.current,
            size: self.size,
        }
    }
}
