//! Coin-metadata adapter (CoinGecko public REST API).
//!
//! The authoritative source for crypto batch pricing: one `/coins/markets`
//! call prices an entire portfolio and carries display metadata (name, logo,
//! market-cap rank) the exchange ticker cannot provide. Free-tier limits are
//! tight, which is why callers batch and cache around this adapter.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::http_client::{HttpClient, HttpRequest};
use crate::provider::SourceError;

const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Market row from `/coins/markets`. Cached verbatim as JSON, so it is both
/// serializable and deserializable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinMarket {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub image: String,
    /// Some listed coins carry no market data; `null` means unpriceable.
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
}

#[derive(Clone)]
pub struct CoinGeckoAdapter {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
}

impl CoinGeckoAdapter {
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

    /// Batch market data for the given coin ids.
    pub async fn markets(&self, ids: &[&str]) -> Result<Vec<CoinMarket>, SourceError> {
        if ids.is_empty() {
            return Err(SourceError::invalid_request(
                "markets request must include at least one coin id",
            ));
        }

        let url = format!(
            "{}/coins/markets?vs_currency=usd&order=market_cap_desc&per_page={}&page=1&sparkline=false&price_change_percentage=24h&ids={}",
            self.base_url,
            ids.len(),
            urlencoding::encode(&ids.join(",")),
        );

        self.fetch_markets(&url).await
    }

    /// Top coins by market cap, no id filter. Backs the market overview.
    pub async fn top_markets(&self, limit: u32) -> Result<Vec<CoinMarket>, SourceError> {
        if limit == 0 {
            return Err(SourceError::invalid_request(
                "top markets limit must be greater than zero",
            ));
        }

        let url = format!(
            "{}/coins/markets?vs_currency=usd&order=market_cap_desc&per_page={limit}&page=1&sparkline=false&price_change_percentage=24h",
            self.base_url,
        );

        self.fetch_markets(&url).await
    }

    async fn fetch_markets(&self, url: &str) -> Result<Vec<CoinMarket>, SourceError> {
        let body = self.execute(url).await?;
        serde_json::from_str(&body).map_err(|e| {
            SourceError::unavailable(format!("coingecko markets payload malformed: {e}"))
        })
    }

    async fn execute(&self, url: &str) -> Result<String, SourceError> {
        let request = HttpRequest::get(url);
        let response = self.http_client.execute(request).await.map_err(|e| {
            SourceError::unavailable(format!("coingecko transport error: {}", e.message()))
        })?;

        if response.status == 429 {
            return Err(SourceError::rate_limited(
                "coingecko free-tier rate limit exceeded",
            ));
        }
        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "coingecko returned status {}",
                response.status
            )));
        }

        Ok(response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_row_tolerates_missing_price() {
        let body = r#"{"id":"stray-coin","symbol":"stry","name":"Stray","current_price":null}"#;
        let market: CoinMarket = serde_json::from_str(body).expect("row must parse");
        assert_eq!(market.current_price, None);
        assert_eq!(market.image, "");
    }

    #[test]
    fn market_row_parses_full_payload() {
        let body = r#"{
            "id": "bitcoin",
            "symbol": "btc",
            "name": "Bitcoin",
            "image": "https://assets.coingecko.com/coins/images/1/large/bitcoin.png",
            "current_price": 64000.5,
            "market_cap": 1260000000000.0,
            "market_cap_rank": 1,
            "price_change_percentage_24h": -1.25
        }"#;
        let market: CoinMarket = serde_json::from_str(body).expect("row must parse");
        assert_eq!(market.current_price, Some(64_000.5));
        assert_eq!(market.market_cap_rank, Some(1));
    }
}
