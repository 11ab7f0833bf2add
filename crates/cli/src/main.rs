//! presence: resolve application icons to public URLs and maintain the
//! local icon index.

mod config;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use futures::TryStreamExt;
use presence_core::config::AppConfig;
use presence_icons::IconResolver;
use presence_index::{IconRepo, IndexStore};
use presence_storage::ObjectStore;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "presence")]
#[command(about = "Icon cache for presence reporting")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "PRESENCE_CONFIG",
        default_value = "config/presence.toml",
        global = true
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an icon if needed and print its public URL
    Resolve {
        /// Display name of the application the icon belongs to
        #[arg(long)]
        name: String,

        #[command(flatten)]
        source: IconSource,
    },
    /// Rewrite every cached URL to the configured public domain
    MigrateUrls,
    /// List indexed icons
    List,
    /// Delete every index record (uploaded objects are kept)
    ClearIndex {
        /// Confirm the deletion
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
    /// Verify storage and index connectivity
    Check,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct IconSource {
    /// Read raw image bytes from a file
    #[arg(long)]
    file: Option<PathBuf>,

    /// Base64 image, bare or as a data URL
    #[arg(long)]
    base64: Option<String>,

    /// Read a base64 image from stdin
    #[arg(long, default_value_t = false)]
    stdin: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output only.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = config::load(&cli.config)?;

    match cli.command {
        Commands::Resolve { name, source } => resolve(config, &name, source).await,
        Commands::MigrateUrls => migrate_urls(config).await,
        Commands::List => list(config).await,
        Commands::ClearIndex { yes } => clear_index(config, yes).await,
        Commands::Check => check(config).await,
    }
}

async fn open_storage(config: &AppConfig) -> Result<Arc<dyn ObjectStore>> {
    let storage = presence_storage::from_config(&config.storage)
        .await
        .context("failed to initialize storage")?;
    tracing::debug!(backend = storage.backend_name(), "Storage backend initialized");
    Ok(storage)
}

async fn open_index(config: &AppConfig) -> Result<Arc<dyn IndexStore>> {
    presence_index::from_config(&config.index)
        .await
        .context("failed to open icon index")
}

async fn build_resolver(config: AppConfig) -> Result<IconResolver> {
    let storage = open_storage(&config).await?;
    let index = open_index(&config).await?;
    IconResolver::new(storage, index, config.icons)
        .await
        .context("failed to initialize icon resolver")
}

async fn resolve(config: AppConfig, name: &str, source: IconSource) -> Result<()> {
    let resolver = build_resolver(config).await?;

    let url = if let Some(path) = source.file {
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("failed to read icon file {}", path.display()))?;
        resolver.resolve_icon_url(&bytes, name).await?
    } else if let Some(encoded) = source.base64 {
        resolver.resolve_icon_base64(encoded.trim(), name).await?
    } else {
        let mut encoded = String::new();
        std::io::stdin()
            .read_to_string(&mut encoded)
            .context("failed to read icon from stdin")?;
        resolver.resolve_icon_base64(encoded.trim(), name).await?
    };

    println!("{url}");
    Ok(())
}

async fn migrate_urls(mut config: AppConfig) -> Result<()> {
    // Run the sweep explicitly so its report can be printed.
    config.icons.migrate_on_start = false;
    let resolver = build_resolver(config).await?;
    let report = resolver.migrate_urls().await?;

    println!("scanned: {}", report.scanned);
    println!("updated: {}", report.updated);
    Ok(())
}

async fn list(config: AppConfig) -> Result<()> {
    let index = open_index(&config).await?;
    let rows: Vec<_> = index
        .stream_icons()
        .try_collect()
        .await
        .context("failed to read icon index")?;

    for row in rows {
        println!("{}  {}  {}", row.content_id, row.display_name, row.url);
    }
    Ok(())
}

async fn clear_index(config: AppConfig, yes: bool) -> Result<()> {
    if !yes {
        anyhow::bail!("refusing to clear the icon index without --yes");
    }

    // Only the index is touched; storage need not be reachable.
    let index = open_index(&config).await?;
    let removed = index
        .clear_icons()
        .await
        .context("failed to clear icon index")?;
    tracing::info!(removed, "Cleared icon index");
    println!("removed: {removed}");
    Ok(())
}

async fn check(config: AppConfig) -> Result<()> {
    let storage = open_storage(&config).await?;
    storage
        .health_check()
        .await
        .context("storage health check failed")?;
    println!("storage: ok ({})", storage.backend_name());

    let index = open_index(&config).await?;
    index
        .health_check()
        .await
        .context("index health check failed")?;
    println!("index: ok ({})", config.index.resolved_path().display());
    Ok(())
}
