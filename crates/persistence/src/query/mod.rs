//! Filtered pagination query engine.
//!
//! Every listing endpoint goes through the same three steps:
//!
//! 1. [`filter::build_predicates`] turns raw request values into bound
//!    predicates, following a static list of [`FilterDecl`]s.
//! 2. A [`QuerySpec`] pairs those predicates with an [`EntityDescriptor`] and
//!    a descending sort on the identity column.
//! 3. [`Paginator::paginate`] runs a count and a bounded fetch, each from its
//!    own freshly built spec, through a [`QuerySession`].
//!
//! Count and fetch are independent queries without a shared transaction, so
//! a write landing between them can make `total` disagree with the page.

pub mod descriptor;
pub mod filter;
pub mod paginate;
pub mod spec;

#[cfg(test)]
pub(crate) mod memory;

pub use descriptor::{Column, ColumnType, EntityDescriptor};
pub use filter::{build_predicates, FilterDecl, FilterKind, FilterValues, Predicate};
pub use paginate::{list_page, Paginator, QuerySession};
pub use spec::QuerySpec;
