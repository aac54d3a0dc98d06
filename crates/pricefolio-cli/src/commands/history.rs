use pricefolio_market::{MarketData, Symbol, TimeRange};

use crate::cli::HistoryArgs;
use crate::error::CliError;

pub async fn run(args: &HistoryArgs, market: &MarketData) -> Result<serde_json::Value, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let range = TimeRange::parse_lossy(&args.range);

    let chart = market
        .get_history(&symbol, args.asset_type.into(), range)
        .await;
    Ok(serde_json::to_value(chart)?)
}
