//! Crypto-exchange adapter (Binance public REST API).
//!
//! Serves two roles: OHLCV candle history plus the 24h ticker for charts,
//! and a lightweight last-price ticker the aggregator uses as a degraded
//! fallback when the coin-metadata batch call fails.

use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::http_client::{HttpClient, HttpRequest};
use crate::provider::SourceError;
use crate::{Candle, CandleInterval, Symbol, TickerSnapshot};

const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// The exchange lists spot pairs, not bare assets; prices are read from the
/// USDT pair with a BUSD retry for assets that only trade against BUSD.
const QUOTE_ASSETS: [&str; 2] = ["USDT", "BUSD"];

#[derive(Clone)]
pub struct BinanceAdapter {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
}

impl BinanceAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            base_url: String::from(DEFAULT_BASE_URL),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Historical OHLCV bars for `{symbol}USDT`, ascending by open time.
    ///
    /// A symbol the exchange does not list comes back as an empty series
    /// from upstream, which is forwarded as-is, not as an error.
    pub async fn klines(
        &self,
        symbol: &Symbol,
        interval: CandleInterval,
        limit: u32,
    ) -> Result<Vec<Candle>, SourceError> {
        if limit == 0 {
            return Err(SourceError::invalid_request(
                "klines limit must be greater than zero",
            ));
        }

        let url = format!(
            "{}/api/v3/klines?symbol={}USDT&interval={}&limit={limit}",
            self.base_url,
            urlencoding::encode(symbol.as_str()),
            interval.as_str(),
        );

        let body = self.execute(&url).await?;
        let rows: Vec<Vec<Value>> = serde_json::from_str(&body).map_err(|e| {
            SourceError::unavailable(format!("binance klines payload malformed: {e}"))
        })?;

        rows.iter().map(|row| parse_kline_row(row)).collect()
    }

    /// 24h rolling-window ticker for `{symbol}USDT`.
    pub async fn ticker_24h(&self, symbol: &Symbol) -> Result<TickerSnapshot, SourceError> {
        let url = format!(
            "{}/api/v3/ticker/24hr?symbol={}USDT",
            self.base_url,
            urlencoding::encode(symbol.as_str()),
        );

        let body = self.execute(&url).await?;
        let ticker: Ticker24hResponse = serde_json::from_str(&body).map_err(|e| {
            SourceError::unavailable(format!("binance 24h ticker payload malformed: {e}"))
        })?;

        Ok(TickerSnapshot {
            price: parse_decimal("lastPrice", &ticker.last_price)?,
            change_24h: parse_decimal("priceChange", &ticker.price_change)?,
            change_percent_24h: parse_decimal("priceChangePercent", &ticker.price_change_percent)?,
        })
    }

    /// Last traded price for the symbol, trying USDT then BUSD pairs.
    pub async fn ticker_price(&self, symbol: &Symbol) -> Result<f64, SourceError> {
        let mut last_error =
            SourceError::unavailable("binance ticker price: no quote asset attempted");

        for quote_asset in QUOTE_ASSETS {
            let url = format!(
                "{}/api/v3/ticker/price?symbol={}{quote_asset}",
                self.base_url,
                urlencoding::encode(symbol.as_str()),
            );

            match self.execute(&url).await {
                Ok(body) => {
                    let ticker: TickerPriceResponse =
                        serde_json::from_str(&body).map_err(|e| {
                            SourceError::unavailable(format!(
                                "binance price ticker payload malformed: {e}"
                            ))
                        })?;
                    return parse_decimal("price", &ticker.price);
                }
                Err(error) => last_error = error,
            }
        }

        Err(last_error)
    }

    async fn execute(&self, url: &str) -> Result<String, SourceError> {
        let request = HttpRequest::get(url);
        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| SourceError::unavailable(format!("binance transport error: {}", e.message())))?;

        if response.status == 429 {
            return Err(SourceError::rate_limited(
                "binance request weight limit exceeded",
            ));
        }
        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "binance returned status {}",
                response.status
            )));
        }

        Ok(response.body)
    }
}

/// One kline row is a positional JSON array:
/// `[openTime, open, high, low, close, volume, closeTime, ...]` with prices
/// encoded as decimal strings and times in milliseconds.
fn parse_kline_row(row: &[Value]) -> Result<Candle, SourceError> {
    if row.len() < 6 {
        return Err(SourceError::unavailable(format!(
            "binance kline row has {} fields, expected at least 6",
            row.len()
        )));
    }

    let open_time_ms = row[0].as_i64().ok_or_else(|| {
        SourceError::unavailable("binance kline open time is not an integer")
    })?;

    Ok(Candle {
        time: open_time_ms / 1_000,
        open: parse_value("open", &row[1])?,
        high: parse_value("high", &row[2])?,
        low: parse_value("low", &row[3])?,
        close: parse_value("close", &row[4])?,
        volume: parse_value("volume", &row[5])?,
    })
}

fn parse_value(field: &str, value: &Value) -> Result<f64, SourceError> {
    match value {
        Value::String(s) => parse_decimal(field, s),
        Value::Number(n) => n.as_f64().ok_or_else(|| {
            SourceError::unavailable(format!("binance kline field '{field}' is not a number"))
        }),
        _ => Err(SourceError::unavailable(format!(
            "binance kline field '{field}' has unexpected type"
        ))),
    }
}

fn parse_decimal(field: &str, raw: &str) -> Result<f64, SourceError> {
    raw.parse::<f64>().map_err(|_| {
        SourceError::unavailable(format!("binance field '{field}' is not a decimal: '{raw}'"))
    })
}

#[derive(Debug, Deserialize)]
struct Ticker24hResponse {
    #[serde(rename = "lastPrice")]
    last_price: String,
    #[serde(rename = "priceChange")]
    price_change: String,
    #[serde(rename = "priceChangePercent")]
    price_change_percent: String,
}

#[derive(Debug, Deserialize)]
struct TickerPriceResponse {
    price: String,
}
