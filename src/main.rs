//! pump-feed - Pump.fun Listing Aggregator
//!
//! Merges the new, bonding and graduated pump.fun feeds into one listing,
//! resolves contract addresses and renders recent price history.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use pump_feed::adapters::cli::{self, view, Command, HistoryCmd, SearchCmd, TokensCmd, WatchCmd};
use pump_feed::adapters::http::{HttpFetcher, HttpFetcherConfig};
use pump_feed::application::{
    AddressResolver, Endpoints, ListingCache, ListingOrigin, PriceHistoryService, PriceSeries,
    Resolution, TokenAggregator,
};
use pump_feed::config::{load_config_or_default, Config};
use pump_feed::domain::{arrange, PAGE_COUNT};
use pump_feed::ports::{Clock, JsonFetcher, SystemClock};

/// Fully wired listing pipeline
struct Pipeline {
    clock: Arc<dyn Clock>,
    aggregator: Arc<TokenAggregator>,
    resolver: AddressResolver,
    history: PriceHistoryService,
    placeholder_points: usize,
}

impl Pipeline {
    fn build(config: &Config) -> Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let mut gateway_config = HttpFetcherConfig::default().timeout(config.request_timeout());
        match config.gateway.get_api_key() {
            Some(key) => gateway_config.api_key = Some(key),
            None => warn!("No gateway API key configured (set MORALIS_API_KEY); listing requests will likely be rejected"),
        }
        let gateway: Arc<dyn JsonFetcher> = Arc::new(
            HttpFetcher::with_config(gateway_config).context("Failed to create gateway client")?,
        );
        let pair_lookup: Arc<dyn JsonFetcher> = Arc::new(
            HttpFetcher::with_config(HttpFetcherConfig::default().timeout(config.request_timeout()))
                .context("Failed to create pair lookup client")?,
        );

        let endpoints = Endpoints::from(config);
        let cache = ListingCache::with_window(clock.clone(), config.freshness_window());
        let aggregator = Arc::new(TokenAggregator::new(
            gateway.clone(),
            endpoints.clone(),
            cache,
            clock.clone(),
        ));
        let resolver = AddressResolver::new(pair_lookup, endpoints, aggregator.clone(), clock.clone());
        let history = PriceHistoryService::from_config(gateway, config);

        Ok(Self {
            clock,
            aggregator,
            resolver,
            history,
            placeholder_points: config.history.placeholder_points,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (MORALIS_API_KEY goes here, not in the config file)
    dotenvy::dotenv().ok();

    let app = cli::init();
    let config_path = app.command.config_path();
    let config = load_config_or_default(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;

    init_logging(app.verbose, app.debug, &config.logging.level)?;
    let pipeline = Pipeline::build(&config)?;

    match app.command {
        Command::Tokens(cmd) => tokens_command(cmd, &pipeline).await,
        Command::Search(cmd) => search_command(cmd, &pipeline).await,
        Command::History(cmd) => history_command(cmd, &pipeline).await,
        Command::Watch(cmd) => watch_command(cmd, &pipeline, &config).await,
    }
}

fn init_logging(verbose: bool, debug: bool, configured: &str) -> Result<()> {
    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        configured
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt().with_env_filter(filter).with_target(false).init();
    Ok(())
}

async fn tokens_command(cmd: TokensCmd, pipeline: &Pipeline) -> Result<()> {
    let result = pipeline.aggregator.get_tokens_detailed().await;
    if let Some(ref report) = result.report {
        if !report.failed.is_empty() {
            warn!("Listing may be incomplete, feeds failed: {:?}", report.failed);
        }
    }
    if result.origin == ListingOrigin::Fallback {
        warn!("All feeds failed, showing the last known listing");
    }

    let pages = arrange(&result.tokens, cmd.sort, cmd.nsfw);
    let page = pages.get(usize::from(cmd.page) - 1).cloned().unwrap_or_default();

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    if page.is_empty() {
        println!("No tokens available");
        return Ok(());
    }

    let now = pipeline.clock.now();
    for token in &page {
        println!("{}", view::token_row(token, now));
    }
    println!(
        "\nPage {}/{} ({} tokens total, sorted {:?})",
        cmd.page,
        PAGE_COUNT,
        result.tokens.len(),
        cmd.sort
    );
    Ok(())
}

async fn search_command(cmd: SearchCmd, pipeline: &Pipeline) -> Result<()> {
    let resolution = pipeline.resolver.resolve(&cmd.query).await;
    let source = match resolution {
        Resolution::Pair(_) => "pair lookup",
        Resolution::Listing(_) => "listing",
        Resolution::NotFound => {
            println!("No token found for '{}'", cmd.query.trim());
            return Ok(());
        }
    };

    let Some(token) = resolution.into_token() else {
        return Ok(());
    };
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&token)?);
    } else {
        println!("{}", view::token_detail(&token, pipeline.clock.now(), None));
        println!("  (found via {})", source);
    }
    Ok(())
}

async fn history_command(cmd: HistoryCmd, pipeline: &Pipeline) -> Result<()> {
    let now = pipeline.clock.now();

    match pipeline.resolver.resolve(&cmd.token).await.into_token() {
        Some(token) => {
            let series = pipeline.history.series_for(&token, pipeline.placeholder_points).await;
            println!("{}", view::token_detail(&token, now, Some(&series)));
        }
        None => match pipeline.history.get_price_history(cmd.token.trim()).await {
            Some(points) => {
                let series = PriceSeries {
                    points,
                    synthetic: false,
                };
                println!("{}", cmd.token.trim());
                println!("{}", view::history_line(&series));
            }
            None => println!("No price history for '{}'", cmd.token.trim()),
        },
    }
    Ok(())
}

async fn watch_command(cmd: WatchCmd, pipeline: &Pipeline, config: &Config) -> Result<()> {
    let period = match cmd.interval {
        Some(secs) => {
            ensure!(secs > 0, "--interval must be > 0");
            Duration::from_secs(secs)
        }
        None => config.refresh_interval(),
    };

    info!("Watching listing every {:?}", period);
    let mut ticker = tokio::time::interval(period);
    let mut last_count: Option<usize> = None;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let result = pipeline.aggregator.get_tokens_detailed().await;
                let count = result.tokens.len();
                if last_count != Some(count) {
                    info!("Listing now has {} tokens ({:?})", count, result.origin);
                    println!("{} tokens ({:?})", count, result.origin);
                    last_count = Some(count);
                }
                if result.is_partial() {
                    warn!("Partial refresh: {:?}", result.report.map(|r| r.failed));
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }
    Ok(())
}
