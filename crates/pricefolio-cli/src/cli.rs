//! CLI argument definitions for Pricefolio.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `prices` | Fetch current quotes for a mixed crypto/stock portfolio |
//! | `history` | Fetch candle history plus the latest ticker |
//! | `news` | Fetch recent company news for a symbol |
//! | `overview` | Fetch top coins by market cap |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--pretty` | `false` | Pretty-print JSON output |
//!
//! # Environment
//!
//! The stock-quote provider needs an API key, read from
//! `PRICEFOLIO_FINNHUB_API_KEY` (falling back to `FINNHUB_API_KEY`).
//!
//! # Examples
//!
//! ```bash
//! # Price a mixed portfolio; entries are SYMBOL or SYMBOL:TYPE
//! pricefolio prices BTC ETH AAPL:stock
//!
//! # One month of ETH candles, pretty-printed
//! pricefolio history ETH --range 1M --pretty
//!
//! # Recent company news
//! pricefolio news AAPL
//!
//! # Top 10 coins by market cap
//! pricefolio overview --limit 10
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};

use pricefolio_market::AssetType;

/// Pricefolio - portfolio price aggregation CLI
///
/// Fetch normalized quotes, candle history, and news for crypto and stock
/// portfolios from multiple public providers, with TTL caching.
#[derive(Debug, Parser)]
#[command(
    name = "pricefolio",
    author,
    version,
    about = "Portfolio price aggregation CLI"
)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Asset class selector for command arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AssetTypeArg {
    /// Crypto asset, priced via the coin-metadata batch endpoint.
    Crypto,
    /// Stock, priced via the per-symbol stock-quote provider.
    Stock,
}

impl From<AssetTypeArg> for AssetType {
    fn from(value: AssetTypeArg) -> Self {
        match value {
            AssetTypeArg::Crypto => AssetType::Crypto,
            AssetTypeArg::Stock => AssetType::Stock,
        }
    }
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch current quotes for one or more symbols.
    ///
    /// Entries are `SYMBOL` or `SYMBOL:TYPE` (e.g. `AAPL:stock`); bare
    /// entries use `--asset-type`. The response always has one quote per
    /// entry, in input order; unpriceable symbols come back zero-priced.
    ///
    /// # Examples
    ///
    ///   pricefolio prices BTC ETH SOL
    ///   pricefolio prices BTC AAPL:stock MSFT:stock --pretty
    Prices(PricesArgs),

    /// Fetch candle history plus the latest 24h ticker.
    ///
    /// The time range picks the candle interval and count; stocks return
    /// an empty candle series with the latest quote as ticker.
    ///
    /// # Examples
    ///
    ///   pricefolio history BTC
    ///   pricefolio history ETH --range 1W
    ///   pricefolio history AAPL --asset-type stock --range 3M
    History(HistoryArgs),

    /// Fetch recent company news for a symbol.
    ///
    /// # Examples
    ///
    ///   pricefolio news AAPL
    News(NewsArgs),

    /// Fetch the top coins by market cap.
    ///
    /// # Examples
    ///
    ///   pricefolio overview
    ///   pricefolio overview --limit 25
    Overview(OverviewArgs),
}

/// Arguments for the `prices` command.
#[derive(Debug, Args)]
pub struct PricesArgs {
    /// One or more portfolio entries, `SYMBOL` or `SYMBOL:TYPE`.
    #[arg(required = true, num_args = 1..)]
    pub entries: Vec<String>,

    /// Asset type for entries without an explicit `:TYPE` suffix.
    #[arg(long, value_enum, default_value_t = AssetTypeArg::Crypto)]
    pub asset_type: AssetTypeArg,
}

/// Arguments for the `history` command.
#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Symbol to fetch history for.
    pub symbol: String,

    /// Time range: 1D, 1W, 1M, 3M, 1Y, or ALL.
    ///
    /// Unrecognized values fall back to 3M.
    #[arg(long, default_value = "3M")]
    pub range: String,

    /// Asset type of the symbol.
    #[arg(long, value_enum, default_value_t = AssetTypeArg::Crypto)]
    pub asset_type: AssetTypeArg,
}

/// Arguments for the `news` command.
#[derive(Debug, Args)]
pub struct NewsArgs {
    /// Symbol to fetch news for.
    pub symbol: String,
}

/// Arguments for the `overview` command.
#[derive(Debug, Args)]
pub struct OverviewArgs {
    /// Number of top coins to return.
    #[arg(long, default_value_t = 10)]
    pub limit: u32,
}
