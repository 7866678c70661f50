//! CLI Command Definitions
//!
//! Argument parsing for the pump-feed commands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::SortMode;

/// Default configuration path, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/pump-feed.toml";

/// pump-feed - Pump.fun listing aggregator
#[derive(Parser, Debug)]
#[command(
    name = "pump-feed",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Pump.fun listing aggregator",
    long_about = "pump-feed merges the new, bonding and graduated pump.fun feeds into one \
                  listing, resolves contract addresses through DexScreener and renders \
                  recent price history."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show one page of the aggregated listing
    Tokens(TokensCmd),

    /// Find a token by contract address, symbol or name
    Search(SearchCmd),

    /// Show recent price history for a token
    History(HistoryCmd),

    /// Keep the listing warm and report changes
    Watch(WatchCmd),
}

impl Command {
    /// Configuration path of whichever command was given
    pub fn config_path(&self) -> PathBuf {
        let raw = match self {
            Command::Tokens(cmd) => &cmd.config,
            Command::Search(cmd) => &cmd.config,
            Command::History(cmd) => &cmd.config,
            Command::Watch(cmd) => &cmd.config,
        };
        PathBuf::from(shellexpand::tilde(&raw.to_string_lossy()).into_owned())
    }
}

/// Show aggregated listing
#[derive(Parser, Debug)]
pub struct TokensCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// View ordering
    #[arg(short, long, value_enum, default_value_t = SortMode::Latest)]
    pub sort: SortMode,

    /// Page to show (1-4)
    #[arg(short, long, value_name = "N", default_value = "1",
          value_parser = clap::value_parser!(u8).range(1..=4))]
    pub page: u8,

    /// Include tokens flagged NSFW
    #[arg(long)]
    pub nsfw: bool,

    /// Print the page as JSON
    #[arg(long)]
    pub json: bool,
}

/// Resolve a query
#[derive(Parser, Debug)]
pub struct SearchCmd {
    /// Contract address, symbol or name
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Print the token as JSON
    #[arg(long)]
    pub json: bool,
}

/// Price history
#[derive(Parser, Debug)]
pub struct HistoryCmd {
    /// Token identifier, symbol or name
    #[arg(value_name = "TOKEN")]
    pub token: String,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

/// Periodic refresh
#[derive(Parser, Debug)]
pub struct WatchCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Override the refresh interval in seconds
    #[arg(short, long, value_name = "SECS")]
    pub interval: Option<u64>,
}
