mod cli;
mod metrics;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use meeple_core::{
    load_config, load_config_from_env, validate_config, BggClient, BoardGameCatalog, CatalogCache,
    CatalogSearch, CatalogStore, Config, SanitizedConfig, SearchOptions, SearchResult,
    SqliteCatalogStore,
};

use cli::{Cli, Command};

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "MEEPLE_CONFIG";

/// Config file picked up from the working directory.
const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Serialize)]
struct SearchOutput<'a> {
    query: &'a str,
    results: Vec<SearchResult>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_settings(cli.config.as_deref())?;
    validate_config(&config).context("Configuration validation failed")?;

    info!("Database path: {:?}", config.database.path);
    let store: Arc<dyn CatalogStore> = Arc::new(
        SqliteCatalogStore::new(&config.database.path)
            .context("Failed to open catalog store")?,
    );
    let remote: Arc<dyn BoardGameCatalog> =
        Arc::new(BggClient::new(&config.bgg).context("Failed to create BGG client")?);

    let cache = Arc::new(CatalogCache::from_config(
        &config.bgg,
        Arc::clone(&store),
        Arc::clone(&remote),
    ));
    let search = CatalogSearch::new(
        remote,
        Arc::clone(&cache),
        SearchOptions::from(&config.bgg),
    );

    match cli.command {
        Command::Search { query } => {
            let results = search
                .search(&query)
                .await
                .with_context(|| format!("Search for '{}' failed", query))?;
            print_json(&SearchOutput {
                query: &query,
                results,
            })?;
        }
        Command::Get { id } => {
            let entry = cache
                .get_by_id(&id)
                .await
                .with_context(|| format!("Lookup of BGG thing {} failed", id))?;
            print_json(&entry)?;
        }
        Command::Remove { id } => {
            cache
                .remove(&id)
                .with_context(|| format!("Failed to remove BGG thing {}", id))?;
            info!("Removed BGG thing {} from the cache", id);
        }
        Command::Stats => {
            print_json(&cache.stats().context("Failed to read cache stats")?)?;
        }
        Command::Clear => {
            cache.clear().context("Failed to clear cache")?;
            info!("Catalog cache cleared");
        }
        Command::Config => {
            print_json(&SanitizedConfig::from(&config))?;
        }
    }

    if cli.print_metrics {
        eprint!("{}", metrics::encode_metrics()?);
    }

    Ok(())
}

/// Resolve and load configuration.
///
/// An explicit path must exist. Otherwise `$MEEPLE_CONFIG`, then
/// `./config.toml` if present, then defaults plus environment.
fn load_settings(explicit: Option<&Path>) -> Result<Config> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from))
        .or_else(|| {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        });

    match path {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))
        }
        None => {
            info!("No config file found, using defaults and environment");
            load_config_from_env().context("Failed to load config from environment")
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
