use std::str::FromStr;

use serde::Serialize;

use pricefolio_market::{AssetType, MarketData, PriceRequest, Quote, Symbol};

use crate::cli::PricesArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct PricesResponseData {
    quotes: Vec<Quote>,
}

pub async fn run(args: &PricesArgs, market: &MarketData) -> Result<serde_json::Value, CliError> {
    let default_type: AssetType = args.asset_type.into();
    let requests = args
        .entries
        .iter()
        .map(|entry| parse_entry(entry, default_type))
        .collect::<Result<Vec<_>, _>>()?;

    let quotes = market.get_prices(&requests).await;
    Ok(serde_json::to_value(PricesResponseData { quotes })?)
}

/// Parse a `SYMBOL` or `SYMBOL:TYPE` portfolio entry.
fn parse_entry(entry: &str, default_type: AssetType) -> Result<PriceRequest, CliError> {
    let (raw_symbol, asset_type) = match entry.split_once(':') {
        Some((symbol, type_suffix)) => (symbol, AssetType::from_str(type_suffix)?),
        None => (entry, default_type),
    };

    Ok(PriceRequest::new(Symbol::parse(raw_symbol)?, asset_type))
}
