//! Cached board game lookups.
//!
//! [`CatalogCache`] decides per id whether a stored entry is fresh enough to
//! serve, and otherwise refetches it from BGG and writes it through to the
//! store. [`CatalogSearch`] runs a remote text search and backfills stale or
//! unknown matches through the cache in fixed-size batches.

mod cache;
mod error;
mod search;
mod types;

pub use cache::{CatalogCache, Freshness};
pub use error::LookupError;
pub use search::{CatalogSearch, SearchOptions};
pub use types::SearchResult;
