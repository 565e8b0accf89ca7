//! Pagination engine: a count and a bounded fetch per request.

use async_trait::async_trait;
use shared::pagination::{Page, PageRequest};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};

use super::descriptor::EntityDescriptor;
use super::filter::{FilterDecl, FilterValues};
use super::spec::QuerySpec;
use crate::metrics::QueryTimer;

/// Storage that can run a [`QuerySpec`].
///
/// Each call consumes its spec. Connections are acquired per call and
/// released when the call returns.
#[async_trait]
pub trait QuerySession<T: Send>: Send + Sync {
    /// Number of rows matching the spec, ignoring page bounds.
    async fn count(&self, spec: QuerySpec) -> Result<i64, sqlx::Error>;

    /// Matching rows in descending identity order, bounded by `limit`/`offset`.
    async fn fetch(&self, spec: QuerySpec, limit: i64, offset: i64)
        -> Result<Vec<T>, sqlx::Error>;
}

#[async_trait]
impl<T> QuerySession<T> for PgPool
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin + 'static,
{
    async fn count(&self, spec: QuerySpec) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new(format!("{}.count", spec.descriptor().table));
        let mut qb = spec.count_query();
        let total = qb.build_query_scalar::<i64>().fetch_one(self).await;
        timer.record();
        if let Err(e) = &total {
            tracing::error!(table = spec.descriptor().table, step = "count", error = %e, "Listing query failed");
        }
        total
    }

    async fn fetch(
        &self,
        spec: QuerySpec,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<T>, sqlx::Error> {
        let timer = QueryTimer::new(format!("{}.fetch", spec.descriptor().table));
        let mut qb = spec.select_query(limit, offset);
        let rows = qb.build_query_as::<T>().fetch_all(self).await;
        timer.record();
        if let Err(e) = &rows {
            tracing::error!(table = spec.descriptor().table, step = "fetch", error = %e, "Listing query failed");
        }
        rows
    }
}

/// Runs one paginated listing.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    request: PageRequest,
    total: i64,
}

impl Paginator {
    pub fn new(request: PageRequest) -> Self {
        Self { request, total: 0 }
    }

    /// Total recorded by the last successful [`Paginator::paginate`].
    pub fn total(&self) -> i64 {
        self.total
    }

    /// Counts, then fetches the requested page into `out`.
    ///
    /// `factory` is called once per query and must return equivalent specs.
    /// Either failure aborts the call with the storage error unchanged and
    /// leaves `out` untouched. A page past the end is not an error, it is
    /// simply empty.
    pub async fn paginate<T, S, F>(
        &mut self,
        session: &S,
        factory: F,
        out: &mut Vec<T>,
    ) -> Result<(), sqlx::Error>
    where
        T: Send,
        S: QuerySession<T> + ?Sized,
        F: Fn() -> QuerySpec,
    {
        let total = session.count(factory()).await?;
        let records = session
            .fetch(factory(), self.request.limit(), self.request.offset())
            .await?;

        self.total = total;
        out.extend(records);
        Ok(())
    }

    pub fn into_page<T>(self, records: Vec<T>) -> Page<T> {
        Page::new(self.request, self.total, records)
    }
}

/// Filters, counts and fetches one page of `descriptor`'s table.
pub async fn list_page<T, S>(
    session: &S,
    descriptor: &'static EntityDescriptor,
    decls: &[FilterDecl],
    filters: &FilterValues,
    request: PageRequest,
) -> Result<Page<T>, sqlx::Error>
where
    T: Send,
    S: QuerySession<T> + ?Sized,
{
    let mut paginator = Paginator::new(request);
    let mut records = Vec::with_capacity(request.limit().clamp(0, 1000) as usize);
    paginator
        .paginate(
            session,
            || QuerySpec::from_filters(descriptor, decls, filters),
            &mut records,
        )
        .await?;

    tracing::debug!(
        table = descriptor.table,
        total = paginator.total(),
        returned = records.len(),
        "Listed page"
    );

    Ok(paginator.into_page(records))
}
