//! In-memory [`QuerySession`] for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::filter::Predicate;
use super::paginate::QuerySession;
use super::spec::QuerySpec;

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRow {
    pub id: i64,
    pub fields: HashMap<&'static str, String>,
}

impl MemoryRow {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            fields: HashMap::new(),
        }
    }

    pub fn with(mut self, column: &'static str, value: impl Into<String>) -> Self {
        self.fields.insert(column, value.into());
        self
    }

    fn field(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }

    fn matches(&self, predicate: &Predicate) -> bool {
        match predicate {
            Predicate::Unsatisfiable { .. } => false,
            Predicate::Eq { column, value } => self.field(column.name) == value,
            Predicate::Contains { column, value } => self
                .field(column.name)
                .to_lowercase()
                .contains(&value.to_lowercase()),
            Predicate::Between {
                column,
                lower,
                upper,
            } => {
                let v = self.field(column.name);
                lower.as_str() <= v && v <= upper.as_str()
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct MemorySession {
    rows: Vec<MemoryRow>,
    fail_count: bool,
    fail_fetch: bool,
    fetch_calls: AtomicUsize,
}

impl MemorySession {
    pub fn new(rows: Vec<MemoryRow>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    pub fn failing_count(mut self) -> Self {
        self.fail_count = true;
        self
    }

    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    fn matching(&self, spec: &QuerySpec) -> Vec<MemoryRow> {
        let mut rows: Vec<MemoryRow> = self
            .rows
            .iter()
            .filter(|row| spec.predicates().iter().all(|p| row.matches(p)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        rows
    }
}

#[async_trait]
impl QuerySession<MemoryRow> for MemorySession {
    async fn count(&self, spec: QuerySpec) -> Result<i64, sqlx::Error> {
        if self.fail_count {
            return Err(sqlx::Error::PoolTimedOut);
        }
        Ok(self.matching(&spec).len() as i64)
    }

    async fn fetch(
        &self,
        spec: QuerySpec,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MemoryRow>, sqlx::Error> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch {
            return Err(sqlx::Error::PoolTimedOut);
        }
        Ok(self
            .matching(&spec)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}
