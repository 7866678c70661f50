//! CLI Adapter
//!
//! Command-line interface for pump-feed.
//! Uses clap derive macros for argument parsing.

mod commands;
pub mod view;

pub use commands::{
    CliApp, Command, HistoryCmd, SearchCmd, TokensCmd, WatchCmd, DEFAULT_CONFIG_PATH,
};

/// Parse the process arguments
pub fn init() -> CliApp {
    use clap::Parser;
    CliApp::parse()
}
