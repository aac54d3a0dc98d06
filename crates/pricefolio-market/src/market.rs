//! Market-data aggregator.
//!
//! Orchestrates the cache store, the symbol mapper, and the three provider
//! adapters behind two caller-facing operations: batch price lookups and
//! chart history. All fallback decisions live here, in one ordered chain:
//!
//! 1. cache hit,
//! 2. coin-metadata batch call (crypto) / stock-quote call (stocks),
//! 3. exchange per-symbol ticker (crypto only, degraded: price without 24h
//!    change),
//! 4. zero-price quote.
//!
//! Every requested symbol resolves to exactly one quote in input order; a
//! single symbol's upstream failure never aborts its siblings, and a cache
//! outage degrades to fetch-through, never to a caller-visible error.

use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use crate::adapters::{BinanceAdapter, CoinGeckoAdapter, CoinMarket, FinnhubAdapter};
use crate::cache::{keys, ttl, Cache};
use crate::http_client::HttpClient;
use crate::provider::SourceError;
use crate::symbol_map::coingecko_id;
use crate::{
    AssetType, Candle, ChartData, NewsArticle, Quote, Symbol, TickerSnapshot, TimeRange,
    UtcDateTime,
};

/// One entry of a batch price lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRequest {
    pub symbol: Symbol,
    pub asset_type: AssetType,
}

impl PriceRequest {
    pub fn new(symbol: Symbol, asset_type: AssetType) -> Self {
        Self { symbol, asset_type }
    }
}

/// Aggregator configuration.
#[derive(Debug, Clone, Default)]
pub struct MarketConfig {
    pub finnhub_api_key: String,
}

impl MarketConfig {
    pub fn new(finnhub_api_key: impl Into<String>) -> Self {
        Self {
            finnhub_api_key: finnhub_api_key.into(),
        }
    }

    /// Read provider credentials from the environment.
    pub fn from_env() -> Self {
        let finnhub_api_key = env::var("PRICEFOLIO_FINNHUB_API_KEY")
            .or_else(|_| env::var("FINNHUB_API_KEY"))
            .unwrap_or_default();
        Self { finnhub_api_key }
    }
}

/// Stock quote shape persisted in the cache.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct CachedStockQuote {
    price: f64,
    change: f64,
    change_percent: f64,
}

/// Cache-first, batch-first market data service. Stateless per call; the
/// only shared state is the injected cache.
#[derive(Clone)]
pub struct MarketData {
    cache: Arc<dyn Cache>,
    binance: BinanceAdapter,
    coingecko: CoinGeckoAdapter,
    finnhub: FinnhubAdapter,
}

impl MarketData {
    pub fn new(cache: Arc<dyn Cache>, http_client: Arc<dyn HttpClient>, config: MarketConfig) -> Self {
        Self {
            cache,
            binance: BinanceAdapter::new(Arc::clone(&http_client)),
            coingecko: CoinGeckoAdapter::new(Arc::clone(&http_client)),
            finnhub: FinnhubAdapter::new(http_client, config.finnhub_api_key),
        }
    }

    /// Batch price lookup.
    ///
    /// Returns exactly one quote per input entry, in input order; symbols
    /// that cannot be priced come back with `current_price == 0.0`.
    pub async fn get_prices(&self, requests: &[PriceRequest]) -> Vec<Quote> {
        let fetched_at = UtcDateTime::now();
        let mut slots: Vec<Option<Quote>> = (0..requests.len()).map(|_| None).collect();

        // Partition by asset type, resolving unmapped crypto tickers
        // immediately without a network call.
        let mut crypto: Vec<(usize, Symbol, &'static str)> = Vec::new();
        let mut stocks: Vec<(usize, Symbol)> = Vec::new();

        for (index, request) in requests.iter().enumerate() {
            match request.asset_type {
                AssetType::Crypto => match coingecko_id(&request.symbol) {
                    Some(id) => crypto.push((index, request.symbol.clone(), id)),
                    None => {
                        slots[index] = Some(Quote::unavailable(
                            request.symbol.clone(),
                            AssetType::Crypto,
                            fetched_at,
                        ));
                    }
                },
                AssetType::Stock => stocks.push((index, request.symbol.clone())),
            }
        }

        if !crypto.is_empty() {
            for (index, quote) in self.crypto_quotes(&crypto, fetched_at).await {
                slots[index] = Some(quote);
            }
        }

        if !stocks.is_empty() {
            for (index, quote) in self.stock_quotes(stocks, fetched_at).await {
                slots[index] = Some(quote);
            }
        }

        slots
            .into_iter()
            .zip(requests)
            .map(|(slot, request)| {
                slot.unwrap_or_else(|| {
                    Quote::unavailable(request.symbol.clone(), request.asset_type, fetched_at)
                })
            })
            .collect()
    }

    /// Chart history: candle series plus the latest ticker.
    ///
    /// Never fails for "no data": a fully degraded response is an empty
    /// candle series with a zero ticker.
    pub async fn get_history(
        &self,
        symbol: &Symbol,
        asset_type: AssetType,
        range: TimeRange,
    ) -> ChartData {
        match asset_type {
            AssetType::Crypto => self.crypto_history(symbol, range).await,
            AssetType::Stock => self.stock_history(symbol, range).await,
        }
    }

    /// Recent company news, cached at the news tier. Upstream failure
    /// degrades to an empty feed.
    pub async fn get_news(&self, symbol: &Symbol) -> Vec<NewsArticle> {
        let key = keys::news(symbol);
        if let Some(articles) = self.cached::<Vec<NewsArticle>>(&key).await {
            return articles;
        }

        match self.finnhub.company_news(symbol).await {
            Ok(articles) => {
                self.store(&key, &articles, ttl::NEWS).await;
                articles
            }
            Err(_) => Vec::new(),
        }
    }

    /// Top coins by market cap, cached at the market tier.
    pub async fn market_overview(&self, limit: u32) -> Result<Vec<CoinMarket>, SourceError> {
        let key = keys::market_overview(limit);
        if let Some(markets) = self.cached::<Vec<CoinMarket>>(&key).await {
            return Ok(markets);
        }

        let markets = self.coingecko.top_markets(limit).await?;
        self.store(&key, &markets, ttl::MARKET).await;
        Ok(markets)
    }

    async fn crypto_quotes(
        &self,
        entries: &[(usize, Symbol, &'static str)],
        fetched_at: UtcDateTime,
    ) -> Vec<(usize, Quote)> {
        let ids: Vec<&str> = entries.iter().map(|(_, _, id)| *id).collect();

        match self.markets_batch(&ids).await {
            Ok(markets) => {
                let by_id: HashMap<&str, &CoinMarket> =
                    markets.iter().map(|m| (m.id.as_str(), m)).collect();

                entries
                    .iter()
                    .map(|(index, symbol, id)| {
                        let quote = match by_id.get(id).copied() {
                            Some(market) => {
                                market_to_quote(symbol.clone(), market, fetched_at)
                            }
                            None => Quote::unavailable(
                                symbol.clone(),
                                AssetType::Crypto,
                                fetched_at,
                            ),
                        };
                        (*index, quote)
                    })
                    .collect()
            }
            Err(_) => self.exchange_fallback_quotes(entries, fetched_at).await,
        }
    }

    /// Cache-first batch call to the coin-metadata provider.
    ///
    /// The cache key is built from the sorted id set, so permuted but
    /// logically-identical requests share one upstream call.
    async fn markets_batch(&self, ids: &[&str]) -> Result<Vec<CoinMarket>, SourceError> {
        let key = keys::markets(ids);
        if let Some(markets) = self.cached::<Vec<CoinMarket>>(&key).await {
            return Ok(markets);
        }

        let markets = self.coingecko.markets(ids).await?;
        let markets: Vec<CoinMarket> = markets
            .into_iter()
            .filter(|market| market.current_price.unwrap_or(0.0) > 0.0)
            .collect();

        self.store(&key, &markets, ttl::QUOTE).await;
        Ok(markets)
    }

    /// Degraded path when the metadata batch fails: per-symbol last price
    /// from the exchange, no 24h change, nothing cached so the metadata
    /// provider is retried on the next TTL window.
    async fn exchange_fallback_quotes(
        &self,
        entries: &[(usize, Symbol, &'static str)],
        fetched_at: UtcDateTime,
    ) -> Vec<(usize, Quote)> {
        let mut resolved = Vec::with_capacity(entries.len());

        for (index, symbol, _) in entries {
            let quote = match self.binance.ticker_price(symbol).await {
                Ok(price) => Quote::new(
                    symbol.clone(),
                    AssetType::Crypto,
                    symbol.as_str(),
                    price,
                    0.0,
                    0.0,
                    None,
                    fetched_at,
                )
                .unwrap_or_else(|_| {
                    Quote::unavailable(symbol.clone(), AssetType::Crypto, fetched_at)
                }),
                Err(_) => Quote::unavailable(symbol.clone(), AssetType::Crypto, fetched_at),
            };
            resolved.push((*index, quote));
        }

        resolved
    }

    /// Per-symbol stock lookups, fanned out concurrently. Results carry
    /// their input index so the merge step restores caller order.
    async fn stock_quotes(
        &self,
        stocks: Vec<(usize, Symbol)>,
        fetched_at: UtcDateTime,
    ) -> Vec<(usize, Quote)> {
        let mut set = JoinSet::new();

        for (index, symbol) in stocks {
            let service = self.clone();
            set.spawn(async move {
                let quote = service.stock_quote(&symbol, fetched_at).await;
                (index, quote)
            });
        }

        let mut resolved = Vec::new();
        while let Some(joined) = set.join_next().await {
            if let Ok(entry) = joined {
                resolved.push(entry);
            }
        }
        resolved
    }

    async fn stock_quote(&self, symbol: &Symbol, fetched_at: UtcDateTime) -> Quote {
        match self.stock_quote_raw(symbol).await {
            Some(cached) => Quote::new(
                symbol.clone(),
                AssetType::Stock,
                symbol.as_str(),
                cached.price,
                cached.change,
                cached.change_percent,
                None,
                fetched_at,
            )
            .unwrap_or_else(|_| Quote::unavailable(symbol.clone(), AssetType::Stock, fetched_at)),
            None => Quote::unavailable(symbol.clone(), AssetType::Stock, fetched_at),
        }
    }

    async fn stock_quote_raw(&self, symbol: &Symbol) -> Option<CachedStockQuote> {
        let key = keys::stock_quote(symbol);
        if let Some(cached) = self.cached::<CachedStockQuote>(&key).await {
            return Some(cached);
        }

        match self.finnhub.quote(symbol).await {
            Ok(quote) => {
                let cached = CachedStockQuote {
                    price: quote.price,
                    change: quote.change,
                    change_percent: quote.change_percent,
                };
                self.store(&key, &cached, ttl::QUOTE).await;
                Some(cached)
            }
            Err(_) => None,
        }
    }

    async fn crypto_history(&self, symbol: &Symbol, range: TimeRange) -> ChartData {
        let (interval, limit) = range.plan();
        let key = keys::candles(symbol, interval, limit);

        let (candles, ticker) = match self.cached::<Vec<Candle>>(&key).await {
            Some(candles) => {
                let ticker = self
                    .binance
                    .ticker_24h(symbol)
                    .await
                    .unwrap_or_else(|_| TickerSnapshot::zero());
                (candles, ticker)
            }
            None => {
                // Candles and ticker are independent: either side failing
                // degrades only its own half of the response.
                let (klines, ticker) = tokio::join!(
                    self.binance.klines(symbol, interval, limit),
                    self.binance.ticker_24h(symbol),
                );

                let candles = match klines {
                    Ok(candles) => {
                        self.store(&key, &candles, ttl::CANDLES).await;
                        candles
                    }
                    Err(_) => Vec::new(),
                };

                (candles, ticker.unwrap_or_else(|_| TickerSnapshot::zero()))
            }
        };

        ChartData {
            symbol: symbol.clone(),
            asset_type: AssetType::Crypto,
            range,
            candles,
            ticker,
        }
    }

    /// No stock candle source is wired; the response still carries the
    /// latest quote so portfolio views can render a price.
    async fn stock_history(&self, symbol: &Symbol, range: TimeRange) -> ChartData {
        let ticker = match self.stock_quote_raw(symbol).await {
            Some(quote) => TickerSnapshot {
                price: quote.price,
                change_24h: quote.change,
                change_percent_24h: quote.change_percent,
            },
            None => TickerSnapshot::zero(),
        };

        ChartData {
            symbol: symbol.clone(),
            asset_type: AssetType::Stock,
            range,
            candles: Vec::new(),
            ticker,
        }
    }

    /// Best-effort cache read: backend errors and undecodable payloads are
    /// both treated as misses.
    async fn cached<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.cache.get(key).await {
            Ok(Some(body)) => serde_json::from_str(&body).ok(),
            _ => None,
        }
    }

    /// Best-effort cache write: failures are ignored.
    async fn store<T: Serialize>(&self, key: &str, value: &T, ttl: std::time::Duration) {
        if let Ok(body) = serde_json::to_string(value) {
            let _ = self.cache.set(key, body, ttl).await;
        }
    }
}

fn market_to_quote(symbol: Symbol, market: &CoinMarket, fetched_at: UtcDateTime) -> Quote {
    let price = market.current_price.unwrap_or(0.0);
    let change_percent = market.price_change_percentage_24h.unwrap_or(0.0);
    let change = if price > 0.0 && change_percent != 0.0 {
        price * change_percent / 100.0
    } else {
        0.0
    };

    let name = if market.name.is_empty() {
        symbol.as_str().to_owned()
    } else {
        market.name.clone()
    };
    let image = if market.image.is_empty() {
        None
    } else {
        Some(market.image.clone())
    };

    Quote::new(
        symbol.clone(),
        AssetType::Crypto,
        name,
        price,
        change,
        change_percent,
        image,
        fetched_at,
    )
    .unwrap_or_else(|_| Quote::unavailable(symbol, AssetType::Crypto, fetched_at))
}
