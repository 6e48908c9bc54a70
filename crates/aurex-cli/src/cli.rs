//! CLI argument definitions for aurex.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `prices` | Probe providers, run one refresh cycle, print the cards |
//! | `history` | Print synthetic chart history |
//! | `sources` | List provider chains and their status |
//! | `watch` | Keep refreshing and print updates as they arrive |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `table` | Output format (table, json) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--config` | `aurex.toml` if present | Configuration file |
//! | `--offline` | `false` | Never touch the network; synthetic data only |
//! | `--timeout-ms` | from config | Per-request timeout in ms |
//!
//! # Examples
//!
//! ```bash
//! aurex prices
//! aurex history --period 6M --instrument XAU
//! aurex history --start 2024-01-01 --end 2024-03-31 --format json --pretty
//! aurex watch --interval-secs 30
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Gold and forex price board with live data and synthetic fallback.
#[derive(Debug, Parser)]
#[command(
    name = "aurex",
    author,
    version,
    about = "Gold and forex price board",
    long_about = "aurex shows gold (CNY/g) and USD, CHF and JPY exchange rates against CNY.\n\
\n\
Prices come from several public quote providers with automatic fallback. When live\n\
data is unavailable the board switches to synthetic data and says so.\n\
\n\
Use 'aurex <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Configuration file (TOML).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Skip the network and use synthetic data for the whole session.
    #[arg(long, global = true, default_value_t = false)]
    pub offline: bool,

    /// Request timeout in milliseconds; overrides the configuration.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Price cards and tables for terminal display.
    Table,
    /// JSON output; `watch` prints one event per line.
    Json,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch current prices and print one card per instrument.
    ///
    /// # Examples
    ///
    ///   aurex prices
    ///   aurex prices --format json --pretty
    Prices,

    /// Print synthetic price history for the chart.
    ///
    /// # Examples
    ///
    ///   aurex history
    ///   aurex history --period 3Y --instrument USD
    ///   aurex history --start 2024-01-01 --end 2024-02-01
    History(HistoryArgs),

    /// List provider chains per category and which provider is serving.
    Sources,

    /// Refresh periodically and print updates.
    ///
    /// Commands read from stdin: r = refresh now, p = pause (hidden),
    /// v = resume (visible), q = quit.
    Watch(WatchArgs),
}

/// Arguments for the `history` command.
#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Preset period: 1M (default), 6M, 1Y or 3Y.
    #[arg(long, conflicts_with_all = ["start", "end"])]
    pub period: Option<String>,

    /// Custom range start (YYYY-MM-DD).
    #[arg(long, requires = "end")]
    pub start: Option<String>,

    /// Custom range end (YYYY-MM-DD), after `--start`.
    #[arg(long, requires = "start")]
    pub end: Option<String>,

    /// Single instrument (XAU, USD, CHF, JPY); all four when omitted.
    #[arg(long)]
    pub instrument: Option<String>,
}

/// Arguments for the `watch` command.
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Refresh interval in seconds; overrides the configuration.
    #[arg(long)]
    pub interval_secs: Option<u64>,
}
