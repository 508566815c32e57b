//! Testing utilities and mock implementations.
//!
//! This module provides a mock of the remote BGG catalog so the cache and
//! search can be exercised without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use meeple_core::testing::{fixtures, MockBoardGameCatalog};
//!
//! let remote = MockBoardGameCatalog::new();
//! remote.add_thing(fixtures::thing("13", "Catan", "boardgame")).await;
//! remote
//!     .set_search_results("catan", vec![fixtures::search_match("13", "Catan")])
//!     .await;
//! ```

mod mock_catalog;

pub use mock_catalog::{MockBoardGameCatalog, RecordedBggCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{DateTime, SubsecRound, Utc};

    use crate::catalog::{CatalogEntry, ThingAttributes};
    use crate::external_catalog::{SearchMatch, ThingDetails};

    /// Create a detailed thing with reasonable defaults.
    pub fn thing(id: &str, name: &str, subtype: &str) -> ThingDetails {
        ThingDetails {
            id: id.to_string(),
            name: name.to_string(),
            subtype: subtype.to_string(),
            year_published: Some(2000),
            thumbnail_url: Some(format!("https://cf.geekdo-images.com/{}_t.jpg", id)),
            image_url: Some(format!("https://cf.geekdo-images.com/{}.jpg", id)),
        }
    }

    /// Create a board game search match.
    pub fn search_match(id: &str, label: &str) -> SearchMatch {
        SearchMatch {
            id: Some(id.to_string()),
            raw_label: Some(label.to_string()),
            subtype_hint: Some("boardgame".to_string()),
        }
    }

    /// Create a catalog entry last refreshed at `last_updated_at`.
    pub fn catalog_entry(
        id: &str,
        name: &str,
        subtype: &str,
        last_updated_at: DateTime<Utc>,
    ) -> CatalogEntry {
        CatalogEntry {
            id: id.to_string(),
            name: name.to_string(),
            attributes: ThingAttributes {
                subtype: subtype.to_string(),
                year_published: Some(2000),
                thumbnail_url: None,
                image_url: None,
            },
            last_updated_at: last_updated_at.trunc_subsecs(3),
        }
    }

    /// Sequential board game ids `"1"..="count"` with matching things.
    pub fn numbered_things(count: usize) -> Vec<ThingDetails> {
        (1..=count)
            .map(|i| thing(&i.to_string(), &format!("Game {}", i), "boardgame"))
            .collect()
    }
}
