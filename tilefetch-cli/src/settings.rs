//! Resolution of run settings from CLI flags and the config file.

use clap::Args;

use tilefetch::config::ConfigFile;
use tilefetch::fetch::FetcherConfig;
use tilefetch::provider::StyleTileSource;

use crate::error::CliError;

/// Flags that override `~/.tilefetch/config.ini`.
#[derive(Debug, Clone, Default, Args)]
pub struct Overrides {
    /// Tile server host [default: us.djiservice.org]
    #[arg(long)]
    pub host: Option<String>,

    /// Map style served by the host [default: osm-bright]
    #[arg(long)]
    pub style: Option<String>,

    /// Tile URL template using {host}, {style}, {z}, {x} and {y}
    #[arg(long)]
    pub template: Option<String>,

    /// Number of parallel download workers [default: 8]
    #[arg(long)]
    pub workers: Option<usize>,

    /// HTTP request timeout in seconds [default: 30]
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Retries per failed tile [default: 0]
    #[arg(long)]
    pub retries: Option<u32>,
}

/// Effective settings for one run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub source: StyleTileSource,
    pub fetcher: FetcherConfig,
}

/// Resolve settings: CLI takes precedence, then config, then defaults.
pub fn resolve_settings(overrides: &Overrides, config: &ConfigFile) -> Result<RunSettings, CliError> {
    let host = overrides
        .host
        .clone()
        .unwrap_or_else(|| config.server.host.clone());
    let style = overrides
        .style
        .clone()
        .unwrap_or_else(|| config.server.style.clone());
    let template = overrides
        .template
        .as_deref()
        .unwrap_or(&config.server.template);
    let source = StyleTileSource::with_template(template, host, style)?;

    let mut fetcher = config.fetcher_config();
    if let Some(workers) = overrides.workers {
        fetcher = fetcher.with_concurrency(workers);
    }
    if let Some(timeout) = overrides.timeout {
        fetcher = fetcher.with_timeout_secs(timeout);
    }
    if let Some(retries) = overrides.retries {
        fetcher = fetcher.with_max_retries(retries);
    }

    Ok(RunSettings { source, fetcher })
}
