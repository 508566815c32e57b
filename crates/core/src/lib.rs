pub mod catalog;
pub mod config;
pub mod external_catalog;
pub mod lookup;
pub mod metrics;
pub mod testing;

pub use catalog::{
    CatalogEntry, CatalogError, CatalogStats, CatalogStore, SqliteCatalogStore, ThingAttributes,
};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, BggConfig, Config,
    ConfigError, DatabaseConfig, SanitizedConfig,
};
pub use external_catalog::{BggClient, BggError, BoardGameCatalog, SearchMatch, ThingDetails};
pub use lookup::{
    CatalogCache, CatalogSearch, Freshness, LookupError, SearchOptions, SearchResult,
};
