//! Listing and repository query metrics.
//!
//! Every count and page fetch of a listing, and every repository statement,
//! is timed under a `table.step` name such as `audits.count` or
//! `users.insert`.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Records one statement's duration in `database_query_duration_seconds`,
/// labelled by its `table.step` name.
pub fn record_query_duration(query_name: &str, duration_secs: f64) {
    histogram!(
        "database_query_duration_seconds",
        "query" => query_name.to_string()
    )
    .record(duration_secs);
}

/// Publishes how many pooled connections are checked out by handlers and how
/// many sit idle. Sampled on every `/health` check.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("database_connections_active").set(active as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Stopwatch for one listing step or repository statement.
///
/// Failed statements are recorded too, so a slow timeout shows up in the
/// histogram next to the successful runs.
///
/// ```ignore
/// let timer = QueryTimer::new("file_transfers.fetch");
/// let rows = qb.build_query_as::<FileTransferEntity>().fetch_all(&pool).await;
/// timer.record();
/// ```
pub struct QueryTimer {
    query_name: String,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: impl Into<String>) -> Self {
        Self {
            query_name: query_name.into(),
            start: Instant::now(),
        }
    }

    pub fn record(self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_query_duration(&self.query_name, duration);
    }
}
