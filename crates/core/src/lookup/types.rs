use serde::{Deserialize, Serialize};

use crate::catalog::ThingAttributes;

/// A search hit, enriched with cached or freshly fetched attributes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResult {
    pub id: String,
    /// Display label with HTML entities decoded.
    pub label: String,
    pub attributes: ThingAttributes,
}

impl SearchResult {
    /// A result whose attributes are pending backfill.
    pub fn placeholder(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            attributes: ThingAttributes::placeholder(),
        }
    }
}
