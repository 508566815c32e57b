//! Board game catalog store - the persistent side of the BGG cache.
//!
//! Entries are written only after a successful remote fetch and read on
//! every lookup so repeated searches avoid hitting BoardGameGeek.

mod sqlite;
mod types;

pub use sqlite::SqliteCatalogStore;
pub use types::*;

/// Trait for catalog entry storage.
pub trait CatalogStore: Send + Sync {
    /// Get an entry by BGG id.
    fn get(&self, id: &str) -> Result<Option<CatalogEntry>, CatalogError>;

    /// Insert or overwrite an entry.
    ///
    /// The write is atomic per id. A write older than the stored entry is
    /// ignored so `last_updated_at` never goes backwards; returns whether
    /// the entry was written.
    fn upsert(&self, entry: &CatalogEntry) -> Result<bool, CatalogError>;

    /// Remove an entry.
    fn remove(&self, id: &str) -> Result<(), CatalogError>;

    /// Get store statistics.
    fn stats(&self) -> Result<CatalogStats, CatalogError>;

    /// Clear all cached entries.
    fn clear(&self) -> Result<(), CatalogError>;
}
