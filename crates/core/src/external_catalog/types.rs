//! Types for BoardGameGeek API responses.

use serde::{Deserialize, Serialize};

/// A lightweight match from a BGG text search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SearchMatch {
    /// BGG thing id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Name as found in the payload, XML-unescaped but not entity-decoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_label: Option<String>,
    /// Subtype reported by the search endpoint (e.g., "boardgame").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype_hint: Option<String>,
}

/// A detailed BGG thing as returned by the `thing` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThingDetails {
    /// BGG thing id.
    pub id: String,
    /// Primary name, or "Unknown" when no name is flagged primary.
    pub name: String,
    /// Thing subtype, "unknown" when absent.
    pub subtype: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_published: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}
