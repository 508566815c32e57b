//! Types for the board game catalog store.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::external_catalog::ThingDetails;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Descriptive attributes of a catalog entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThingAttributes {
    /// Thing subtype (e.g., "boardgame", "boardgameexpansion").
    /// Empty for a placeholder awaiting backfill.
    #[serde(default)]
    pub subtype: String,
    #[serde(default)]
    pub year_published: Option<i32>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ThingAttributes {
    /// Attributes of a result whose details are not known yet.
    pub fn placeholder() -> Self {
        Self::default()
    }

    pub fn is_placeholder(&self) -> bool {
        self.subtype.is_empty()
    }
}

impl From<&ThingDetails> for ThingAttributes {
    fn from(details: &ThingDetails) -> Self {
        Self {
            subtype: details.subtype.clone(),
            year_published: details.year_published,
            thumbnail_url: details.thumbnail_url.clone(),
            image_url: details.image_url.clone(),
        }
    }
}

/// A BGG thing cached locally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    /// BGG id.
    pub id: String,
    /// Primary name.
    pub name: String,
    pub attributes: ThingAttributes,
    /// When the entry was last fetched from BGG (millisecond precision).
    pub last_updated_at: DateTime<Utc>,
}

impl CatalogEntry {
    /// Build an entry from freshly fetched details.
    pub fn from_details(details: ThingDetails, fetched_at: DateTime<Utc>) -> Self {
        let attributes = ThingAttributes::from(&details);
        Self {
            id: details.id,
            name: details.name,
            attributes,
            last_updated_at: fetched_at.trunc_subsecs(3),
        }
    }

    /// Age of the entry in (fractional) days.
    pub fn age_days(&self, now: DateTime<Utc>) -> f64 {
        let elapsed_ms = now.timestamp_millis() - self.last_updated_at.timestamp_millis();
        elapsed_ms as f64 / MILLIS_PER_DAY
    }

    /// Whether the entry can be served without refetching.
    pub fn is_fresh(&self, now: DateTime<Utc>, max_age_days: f64) -> bool {
        self.age_days(now) < max_age_days
    }
}

/// Catalog store statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStats {
    /// Total cached entries.
    pub total_entries: u64,
    /// Least recently refreshed entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_update: Option<DateTime<Utc>>,
    /// Most recently refreshed entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_update: Option<DateTime<Utc>>,
}

/// Errors for catalog store operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
