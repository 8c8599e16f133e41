use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use indulgeout_common::DiscoveryConfig;
use indulgeout_discovery::{
    facets, load_events, load_filter_config, recommend_events, EventFilterEngine, FilterConfig,
};

#[derive(Parser)]
#[command(name = "discover", about = "Filter, sort and page an IndulgeOut event list")]
struct Cli {
    /// JSON event list (bare array, or wrapped under `events` / `data`)
    #[arg(long)]
    events: PathBuf,

    /// JSON filter document (camelCase keys). Omit for no filtering.
    #[arg(long)]
    filter: Option<PathBuf>,

    /// Comma-separated interest categories
    #[arg(long, value_delimiter = ',')]
    interests: Vec<String>,

    /// Print this many recommendations instead of a page
    #[arg(long, conflicts_with = "facets")]
    recommend: Option<usize>,

    /// Print filter facets instead of a page
    #[arg(long)]
    facets: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = DiscoveryConfig::from_env()?;

    let events = load_events(&cli.events)
        .with_context(|| format!("Failed to load events from {}", cli.events.display()))?;
    let interests: Vec<String> = cli
        .interests
        .iter()
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .collect();

    info!(events = events.len(), interests = interests.len(), "Event list loaded");

    let output = if cli.facets {
        serde_json::to_string_pretty(&facets(&events))?
    } else if let Some(limit) = cli.recommend {
        let picks = recommend_events(&events, &interests, chrono::Utc::now(), limit);
        serde_json::to_string_pretty(&picks)?
    } else {
        let filter = match &cli.filter {
            Some(path) => load_filter_config(path)
                .with_context(|| format!("Failed to load filter from {}", path.display()))?,
            None => FilterConfig::default(),
        };
        let selection = EventFilterEngine::new(config).select(&events, &filter, &interests);
        info!(
            total = selection.total,
            page = selection.page_number,
            returned = selection.page.len(),
            "Selection complete"
        );
        serde_json::to_string_pretty(&selection)?
    };

    println!("{output}");
    Ok(())
}
