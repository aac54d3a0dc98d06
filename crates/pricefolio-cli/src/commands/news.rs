use serde::Serialize;

use pricefolio_market::{MarketData, NewsArticle, Symbol};

use crate::cli::NewsArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct NewsResponseData {
    symbol: Symbol,
    articles: Vec<NewsArticle>,
}

pub async fn run(args: &NewsArgs, market: &MarketData) -> Result<serde_json::Value, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let articles = market.get_news(&symbol).await;

    Ok(serde_json::to_value(NewsResponseData { symbol, articles })?)
}
