//! Search orchestration: remote search plus batched cache backfill.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::{CatalogCache, Freshness, LookupError, SearchResult};
use crate::config::BggConfig;
use crate::external_catalog::{decode_entities, BoardGameCatalog};
use crate::metrics::BACKFILL_IDS;

/// Search behavior options.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Maximum ids per backfill request.
    pub batch_size: usize,
    /// Results of any other subtype are dropped.
    pub primary_subtype: String,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            batch_size: 20,
            primary_subtype: "boardgame".to_string(),
        }
    }
}

impl From<&BggConfig> for SearchOptions {
    fn from(config: &BggConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            primary_subtype: config.primary_subtype.clone(),
        }
    }
}

/// Freshness-aware catalog search.
///
/// Matches are processed in batches of `batch_size`. Fresh cache hits are
/// served from the store; every other match of a batch is refetched with a
/// single detail request before the next batch starts. Any failure aborts
/// the whole search.
pub struct CatalogSearch {
    remote: Arc<dyn BoardGameCatalog>,
    cache: Arc<CatalogCache>,
    options: SearchOptions,
}

impl CatalogSearch {
    pub fn new(
        remote: Arc<dyn BoardGameCatalog>,
        cache: Arc<CatalogCache>,
        options: SearchOptions,
    ) -> Self {
        Self {
            remote,
            cache,
            options,
        }
    }

    pub fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    /// Search BGG for `query`, returning primary-subtype results in the
    /// order they were first matched.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, LookupError> {
        let matches = self.remote.search(query).await?;
        debug!("BGG search '{}' returned {} match(es)", query, matches.len());

        let batch_size = self.options.batch_size.max(1);
        let mut results: Vec<SearchResult> = Vec::with_capacity(matches.len());
        let mut seen: HashSet<String> = HashSet::new();
        let mut backfilled = 0usize;

        for batch in matches.chunks(batch_size) {
            let now = Utc::now();
            let mut refresh_ids: Vec<String> = Vec::new();

            for m in batch {
                let (Some(id), Some(raw_label)) = (m.id.as_deref(), m.raw_label.as_deref()) else {
                    continue;
                };
                let label = decode_entities(raw_label);
                if label.trim().is_empty() || !seen.insert(id.to_string()) {
                    continue;
                }

                let cached = self.cache.peek(id)?;
                match (self.cache.freshness(cached.as_ref(), now), cached) {
                    (Freshness::Fresh, Some(entry)) => results.push(SearchResult {
                        id: id.to_string(),
                        label,
                        attributes: entry.attributes,
                    }),
                    _ => {
                        refresh_ids.push(id.to_string());
                        results.push(SearchResult::placeholder(id, label));
                    }
                }
            }

            if refresh_ids.is_empty() {
                continue;
            }

            BACKFILL_IDS.observe(refresh_ids.len() as f64);
            backfilled += refresh_ids.len();

            let fetched = self.cache.fetch_and_store(&refresh_ids).await?;
            for entry in fetched {
                if let Some(result) = results.iter_mut().find(|r| r.id == entry.id) {
                    result.attributes = entry.attributes;
                }
            }
        }

        let total = results.len();
        let unresolved = results
            .iter()
            .filter(|r| r.attributes.is_placeholder())
            .count();
        results.retain(|r| r.attributes.subtype == self.options.primary_subtype);

        if unresolved > 0 {
            debug!(
                "BGG search '{}': {} match(es) missing from detail responses",
                query, unresolved
            );
        }
        info!(
            "BGG search '{}': {} result(s), {} backfilled, {} dropped by subtype",
            query,
            results.len(),
            backfilled,
            total - results.len()
        );

        Ok(results)
    }
}
