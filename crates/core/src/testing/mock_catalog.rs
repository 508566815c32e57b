//! Mock BGG catalog for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::external_catalog::{BggError, BoardGameCatalog, SearchMatch, ThingDetails};

/// A recorded remote call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedBggCall {
    Search { query: String },
    FetchThings { ids: Vec<String> },
}

/// Mock implementation of the BoardGameCatalog trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable search matches and thing details
/// - Track calls for assertions
/// - Simulate failures
#[derive(Debug)]
pub struct MockBoardGameCatalog {
    /// Thing details by id.
    things: Arc<RwLock<HashMap<String, ThingDetails>>>,
    /// Search matches by query.
    search_results: Arc<RwLock<HashMap<String, Vec<SearchMatch>>>>,
    /// Recorded calls.
    calls: Arc<RwLock<Vec<RecordedBggCall>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<BggError>>>,
    /// If set, fetches fail once this many fetches have succeeded.
    fetch_error_after: Arc<RwLock<Option<usize>>>,
}

impl Default for MockBoardGameCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBoardGameCatalog {
    /// Create a new empty mock catalog.
    pub fn new() -> Self {
        Self {
            things: Arc::new(RwLock::new(HashMap::new())),
            search_results: Arc::new(RwLock::new(HashMap::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            fetch_error_after: Arc::new(RwLock::new(None)),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Add a thing returned by detail fetches.
    pub async fn add_thing(&self, thing: ThingDetails) {
        self.things.write().await.insert(thing.id.clone(), thing);
    }

    /// Add several things at once.
    pub async fn add_things(&self, things: Vec<ThingDetails>) {
        let mut map = self.things.write().await;
        for thing in things {
            map.insert(thing.id.clone(), thing);
        }
    }

    /// Set the matches returned for `query`.
    pub async fn set_search_results(&self, query: &str, matches: Vec<SearchMatch>) {
        self.search_results
            .write()
            .await
            .insert(query.to_string(), matches);
    }

    // =========================================================================
    // Call Recording
    // =========================================================================

    /// Get all recorded calls.
    pub async fn recorded_calls(&self) -> Vec<RecordedBggCall> {
        self.calls.read().await.clone()
    }

    /// Id lists of every recorded detail fetch, in call order.
    pub async fn fetch_calls(&self) -> Vec<Vec<String>> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|call| match call {
                RecordedBggCall::FetchThings { ids } => Some(ids.clone()),
                RecordedBggCall::Search { .. } => None,
            })
            .collect()
    }

    /// Number of recorded search calls.
    pub async fn search_count(&self) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|call| matches!(call, RecordedBggCall::Search { .. }))
            .count()
    }

    /// Clear recorded calls.
    pub async fn clear_recorded(&self) {
        self.calls.write().await.clear();
    }

    // =========================================================================
    // Error Injection
    // =========================================================================

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: BggError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every fetch after the first `successful` ones fail with a 503.
    pub async fn set_fetch_error_after(&self, successful: usize) {
        *self.fetch_error_after.write().await = Some(successful);
    }

    /// Take the next error if set.
    async fn take_error(&self) -> Option<BggError> {
        self.next_error.write().await.take()
    }

    async fn record(&self, call: RecordedBggCall) {
        self.calls.write().await.push(call);
    }
}

#[async_trait]
impl BoardGameCatalog for MockBoardGameCatalog {
    async fn search(&self, query: &str) -> Result<Vec<SearchMatch>, BggError> {
        self.record(RecordedBggCall::Search {
            query: query.to_string(),
        })
        .await;

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        Ok(self
            .search_results
            .read()
            .await
            .get(query)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_things(&self, ids: &[String]) -> Result<Vec<ThingDetails>, BggError> {
        let previous_fetches = self.fetch_calls().await.len();
        self.record(RecordedBggCall::FetchThings { ids: ids.to_vec() })
            .await;

        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        if let Some(successful) = *self.fetch_error_after.read().await {
            if previous_fetches >= successful {
                return Err(BggError::ApiError {
                    status: 503,
                    message: "mock fetch failure".to_string(),
                });
            }
        }

        let things = self.things.read().await;
        Ok(ids.iter().filter_map(|id| things.get(id).cloned()).collect())
    }
}
