use serde::Serialize;

use pricefolio_market::{CoinMarket, MarketData};

use crate::cli::OverviewArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct OverviewResponseData {
    markets: Vec<CoinMarket>,
}

pub async fn run(args: &OverviewArgs, market: &MarketData) -> Result<serde_json::Value, CliError> {
    let markets = market
        .market_overview(args.limit)
        .await
        .map_err(|error| CliError::Command(error.to_string()))?;

    Ok(serde_json::to_value(OverviewResponseData { markets })?)
}
