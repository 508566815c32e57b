//! BoardGameGeek catalog integration.
//!
//! This module provides the remote side of the catalog cache: a text search
//! returning lightweight matches and a batched detail fetch by id.

mod bgg;
mod parser;
mod types;

pub use bgg::BggClient;
pub use parser::{
    decode_entities, parse_search_response, parse_thing_response, UNKNOWN_NAME, UNKNOWN_SUBTYPE,
};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to BoardGameGeek.
#[derive(Debug, Error)]
pub enum BggError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimitExceeded,

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Trait for the remote board game catalog.
#[async_trait]
pub trait BoardGameCatalog: Send + Sync {
    /// Search things by free-text query.
    async fn search(&self, query: &str) -> Result<Vec<SearchMatch>, BggError>;

    /// Fetch details for all `ids` in one request.
    ///
    /// Results follow the order of the response, not of `ids`.
    async fn fetch_things(&self, ids: &[String]) -> Result<Vec<ThingDetails>, BggError>;
}
