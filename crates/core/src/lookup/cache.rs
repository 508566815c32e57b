//! Write-through TTL cache over the catalog store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::LookupError;
use crate::catalog::{CatalogEntry, CatalogStats, CatalogStore};
use crate::config::BggConfig;
use crate::external_catalog::BoardGameCatalog;
use crate::metrics::record_cache_lookup;

/// Freshness of a stored entry relative to the cache TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Stored and younger than the TTL.
    Fresh,
    /// Stored but at least as old as the TTL.
    Stale,
    /// Not stored.
    Missing,
}

impl Freshness {
    fn as_str(&self) -> &'static str {
        match self {
            Freshness::Fresh => "hit",
            Freshness::Stale => "stale",
            Freshness::Missing => "miss",
        }
    }
}

/// Catalog cache: serves fresh entries from the store, refetches the rest.
pub struct CatalogCache {
    store: Arc<dyn CatalogStore>,
    remote: Arc<dyn BoardGameCatalog>,
    max_age_days: f64,
}

impl CatalogCache {
    /// Create a cache treating entries older than `max_age_days` as stale.
    pub fn new(
        store: Arc<dyn CatalogStore>,
        remote: Arc<dyn BoardGameCatalog>,
        max_age_days: f64,
    ) -> Self {
        Self {
            store,
            remote,
            max_age_days,
        }
    }

    /// Create a cache using the TTL from the BGG configuration.
    pub fn from_config(
        config: &BggConfig,
        store: Arc<dyn CatalogStore>,
        remote: Arc<dyn BoardGameCatalog>,
    ) -> Self {
        Self::new(store, remote, config.max_age_days)
    }

    /// Classify an optional stored entry and record the outcome.
    pub fn freshness(&self, entry: Option<&CatalogEntry>, now: DateTime<Utc>) -> Freshness {
        let freshness = match entry {
            None => Freshness::Missing,
            Some(entry) if entry.is_fresh(now, self.max_age_days) => Freshness::Fresh,
            Some(_) => Freshness::Stale,
        };
        record_cache_lookup(freshness.as_str());
        freshness
    }

    /// Read the stored entry without ever contacting BGG.
    pub fn peek(&self, id: &str) -> Result<Option<CatalogEntry>, LookupError> {
        Ok(self.store.get(id)?)
    }

    /// Get an entry, refetching it when missing or stale.
    ///
    /// Returns `None` only when BGG has no thing with this id.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<CatalogEntry>, LookupError> {
        let stored = self.store.get(id)?;

        match self.freshness(stored.as_ref(), Utc::now()) {
            Freshness::Fresh => {
                debug!("Catalog cache hit for {}", id);
                return Ok(stored);
            }
            state => debug!("Catalog cache {:?} for {}, fetching", state, id),
        }

        let mut fetched = self.fetch_and_store(&[id.to_string()]).await?;
        let position = fetched.iter().position(|entry| entry.id == id).unwrap_or(0);

        if fetched.is_empty() {
            Ok(None)
        } else {
            Ok(Some(fetched.swap_remove(position)))
        }
    }

    /// Fetch all `ids` in one request and write every entry to the store.
    ///
    /// The returned entries follow the response order. An empty `ids`
    /// slice returns an empty list without contacting BGG.
    pub async fn fetch_and_store(&self, ids: &[String]) -> Result<Vec<CatalogEntry>, LookupError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let details = self.remote.fetch_things(ids).await?;
        let fetched_at = Utc::now();

        if details.len() != ids.len() {
            debug!(
                "BGG returned {} thing(s) for {} requested id(s)",
                details.len(),
                ids.len()
            );
        }

        let mut entries = Vec::with_capacity(details.len());
        for thing in details {
            let entry = CatalogEntry::from_details(thing, fetched_at);
            self.store.upsert(&entry)?;
            entries.push(entry);
        }

        Ok(entries)
    }

    /// Remove a stored entry.
    pub fn remove(&self, id: &str) -> Result<(), LookupError> {
        Ok(self.store.remove(id)?)
    }

    pub fn stats(&self) -> Result<CatalogStats, LookupError> {
        Ok(self.store.stats()?)
    }

    pub fn clear(&self) -> Result<(), LookupError> {
        Ok(self.store.clear()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SqliteCatalogStore;
    use crate::external_catalog::BggError;
    use crate::testing::{fixtures, MockBoardGameCatalog};
    use chrono::Duration;

    struct Harness {
        store: Arc<SqliteCatalogStore>,
        remote: Arc<MockBoardGameCatalog>,
        cache: CatalogCache,
    }

    fn harness(max_age_days: f64) -> Harness {
        let store = Arc::new(SqliteCatalogStore::in_memory().unwrap());
        let remote = Arc::new(MockBoardGameCatalog::new());
        let cache = CatalogCache::new(
            Arc::clone(&store) as Arc<dyn CatalogStore>,
            Arc::clone(&remote) as Arc<dyn BoardGameCatalog>,
            max_age_days,
        );
        Harness {
            store,
            remote,
            cache,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_fetches_missing_entry() {
        let h = harness(30.0);
        h.remote
            .add_thing(fixtures::thing("13", "Catan", "boardgame"))
            .await;

        let entry = h.cache.get_by_id("13").await.unwrap().unwrap();
        assert_eq!(entry.name, "Catan");
        assert_eq!(entry.attributes.subtype, "boardgame");
        assert_eq!(h.remote.fetch_calls().await, vec![vec!["13".to_string()]]);

        // Written through to the store
        assert_eq!(h.store.get("13").unwrap(), Some(entry));
    }

    #[tokio::test]
    async fn test_get_by_id_twice_fetches_once() {
        let h = harness(30.0);
        h.remote
            .add_thing(fixtures::thing("13", "Catan", "boardgame"))
            .await;

        let first = h.cache.get_by_id("13").await.unwrap();
        let second = h.cache.get_by_id("13").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(h.remote.fetch_calls().await.len(), 1);
    }

    #[tokio::test]
    async fn test_get_by_id_serves_fresh_entry() {
        let h = harness(30.0);
        let cached = fixtures::catalog_entry("13", "Catan", "boardgame", Utc::now() - Duration::days(29));
        h.store.upsert(&cached).unwrap();

        let entry = h.cache.get_by_id("13").await.unwrap();
        assert_eq!(entry, Some(cached));
        assert!(h.remote.recorded_calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_get_by_id_refetches_stale_entry() {
        let h = harness(30.0);
        let stale = fixtures::catalog_entry("13", "Settlers", "boardgame", Utc::now() - Duration::days(31));
        h.store.upsert(&stale).unwrap();
        h.remote
            .add_thing(fixtures::thing("13", "Catan", "boardgame"))
            .await;

        let entry = h.cache.get_by_id("13").await.unwrap().unwrap();

        assert_eq!(h.remote.fetch_calls().await.len(), 1);
        assert_eq!(entry.name, "Catan");
        assert!(entry.last_updated_at > stale.last_updated_at);
        assert_eq!(h.store.get("13").unwrap().unwrap().name, "Catan");
    }

    #[tokio::test]
    async fn test_get_by_id_unknown_remote_returns_none() {
        let h = harness(30.0);

        assert!(h.cache.get_by_id("404").await.unwrap().is_none());
        assert_eq!(h.remote.fetch_calls().await.len(), 1);
        assert!(h.store.get("404").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_by_id_remote_failure() {
        let h = harness(30.0);
        h.remote
            .set_next_error(BggError::ApiError {
                status: 500,
                message: "boom".to_string(),
            })
            .await;

        let result = h.cache.get_by_id("13").await;
        assert!(matches!(result, Err(LookupError::RemoteUnavailable(_))));
    }

    #[tokio::test]
    async fn test_get_by_id_malformed_response() {
        let h = harness(30.0);
        h.remote
            .set_next_error(BggError::ParseError("thing has no id".to_string()))
            .await;

        let result = h.cache.get_by_id("13").await;
        assert!(matches!(result, Err(LookupError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_fetch_and_store_is_idempotent() {
        let h = harness(30.0);
        h.remote
            .add_thing(fixtures::thing("13", "Catan", "boardgame"))
            .await;
        let ids = vec!["13".to_string()];

        let first = h.cache.fetch_and_store(&ids).await.unwrap();
        let second = h.cache.fetch_and_store(&ids).await.unwrap();

        let stats = h.store.stats().unwrap();
        assert_eq!(stats.total_entries, 1);

        let stored = h.store.get("13").unwrap().unwrap();
        assert!(stored.last_updated_at >= first[0].last_updated_at);
        assert_eq!(stored, second[0]);
    }

    #[tokio::test]
    async fn test_fetch_and_store_empty_ids_skips_remote() {
        let h = harness(30.0);

        let entries = h.cache.fetch_and_store(&[]).await.unwrap();
        assert!(entries.is_empty());
        assert!(h.remote.recorded_calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_and_store_batches_in_one_call() {
        let h = harness(30.0);
        h.remote.add_things(fixtures::numbered_things(3)).await;
        let ids: Vec<String> = vec!["3".into(), "1".into(), "2".into()];

        let entries = h.cache.fetch_and_store(&ids).await.unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(h.remote.fetch_calls().await, vec![ids]);
        for entry in &entries {
            assert!(h.store.get(&entry.id).unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn test_freshness() {
        let h = harness(30.0);
        let now = Utc::now();
        let fresh = fixtures::catalog_entry("1", "A", "boardgame", now - Duration::days(1));
        let stale = fixtures::catalog_entry("2", "B", "boardgame", now - Duration::days(30));

        assert_eq!(h.cache.freshness(Some(&fresh), now), Freshness::Fresh);
        assert_eq!(h.cache.freshness(Some(&stale), now), Freshness::Stale);
        assert_eq!(h.cache.freshness(None, now), Freshness::Missing);
    }

    #[tokio::test]
    async fn test_remove_then_refetch() {
        let h = harness(30.0);
        h.remote
            .add_thing(fixtures::thing("13", "Catan", "boardgame"))
            .await;
        h.cache.get_by_id("13").await.unwrap();

        h.cache.remove("13").unwrap();
        assert!(h.cache.peek("13").unwrap().is_none());

        h.cache.get_by_id("13").await.unwrap();
        assert_eq!(h.remote.fetch_calls().await.len(), 2);
    }
}
