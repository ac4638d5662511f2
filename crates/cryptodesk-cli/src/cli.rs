//! CLI argument definitions for cryptodesk.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `price` | Current spot quotes for one or more assets |
//! | `history` | Hourly candles for one asset |
//! | `headlines` | Top crypto headlines |
//! | `news` | Latest news matching a query |
//! | `posts` | Top social posts |
//! | `providers` | Wrappers enabled per domain |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--config` | none | TOML configuration file |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--verbose` | `false` | Log every call attempt (`debug`) |
//! | `--json-logs` | `false` | Emit logs as JSON lines on stderr |
//!
//! # Examples
//!
//! ```bash
//! cryptodesk price BTC ETH --aggregate --pretty
//! cryptodesk history BTC --limit 24
//! cryptodesk news "spot etf" --all
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use cryptodesk_core::DEFAULT_HISTORY_LIMIT;

/// Crypto market, news and social data from many providers at once.
#[derive(Debug, Parser)]
#[command(
    name = "cryptodesk",
    author,
    version,
    about = "Multi-provider crypto data CLI",
    long_about = "cryptodesk queries ranked lists of crypto data providers with retries and \
failover, and can combine every provider's answer.\n\
\n\
Provider credentials are read from the environment (a .env file is loaded first).\n\
Output is JSON on stdout; logs go to stderr."
)]
pub struct Cli {
    /// TOML configuration file with an `[api]` table.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Log every provider attempt, not only failures.
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Write logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Current spot quote of each asset.
    Price(PriceArgs),
    /// Hourly OHLCV candles, most recent last.
    History(HistoryArgs),
    /// Top crypto headlines.
    Headlines(HeadlinesArgs),
    /// Latest news matching a query.
    News(NewsArgs),
    /// Top posts from crypto communities.
    Posts(PostsArgs),
    /// List the wrappers enabled for each domain.
    Providers,
}

#[derive(Debug, Args)]
pub struct PriceArgs {
    /// Bare asset tickers such as BTC or ETH.
    #[arg(required = true, value_name = "ASSET")]
    pub assets: Vec<String>,

    /// Combine every provider's quotes into one volume-weighted quote per asset.
    #[arg(long, default_value_t = false)]
    pub aggregate: bool,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Bare asset ticker.
    #[arg(value_name = "ASSET")]
    pub asset: String,

    /// Maximum number of hourly candles.
    #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
    pub limit: usize,

    /// Average candles across every provider.
    #[arg(long, default_value_t = false)]
    pub aggregate: bool,
}

#[derive(Debug, Args)]
pub struct HeadlinesArgs {
    #[arg(long, default_value_t = 10)]
    pub limit: usize,

    /// Return every provider's headlines keyed by provider.
    #[arg(long, default_value_t = false)]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct NewsArgs {
    /// Free text or a ticker.
    #[arg(value_name = "QUERY")]
    pub query: String,

    #[arg(long, default_value_t = 10)]
    pub limit: usize,

    /// Return every provider's articles keyed by provider.
    #[arg(long, default_value_t = false)]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct PostsArgs {
    #[arg(long, default_value_t = 5)]
    pub limit: usize,

    /// Return every provider's posts keyed by provider.
    #[arg(long, default_value_t = false)]
    pub all: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn price_accepts_many_assets_and_global_flags_anywhere() {
        let cli = Cli::try_parse_from([
            "cryptodesk",
            "price",
            "BTC",
            "ETH",
            "--aggregate",
            "--pretty",
        ])
        .expect("valid arguments");

        assert!(cli.pretty);
        match cli.command {
            Command::Price(args) => {
                assert_eq!(args.assets, vec!["BTC", "ETH"]);
                assert!(args.aggregate);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn history_limit_defaults() {
        let cli = Cli::try_parse_from(["cryptodesk", "history", "SOL"]).expect("valid arguments");
        match cli.command {
            Command::History(args) => assert_eq!(args.limit, DEFAULT_HISTORY_LIMIT),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn price_requires_an_asset() {
        assert!(Cli::try_parse_from(["cryptodesk", "price"]).is_err());
    }
}
