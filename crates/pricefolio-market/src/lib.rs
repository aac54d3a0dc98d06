//! # Pricefolio Market
//!
//! Price and market-data aggregation layer for portfolio tracking.
//!
//! ## Overview
//!
//! This crate fronts three public market-data providers with one coherent
//! API:
//!
//! - **Batch price lookups** across mixed crypto and stock portfolios
//! - **Candle history** with a per-range interval/limit plan
//! - **Company news** and a **market overview** of top coins
//! - **TTL caching** with tiered lifetimes per data kind
//! - **Graceful degradation**: per-symbol isolation, exchange fallback,
//!   zero-price sentinels instead of missing entries
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (Binance, CoinGecko, Finnhub) |
//! | [`cache`] | Cache trait, in-memory store, key builders, TTL tiers |
//! | [`domain`] | Domain models (Quote, Candle, ChartData, NewsArticle) |
//! | [`error`] | Validation errors for domain construction |
//! | [`http_client`] | HTTP client abstraction |
//! | [`market`] | The aggregator tying cache, mapper, and adapters together |
//! | [`provider`] | Structured upstream error type |
//! | [`symbol_map`] | Ticker to coin-id mapping for the metadata provider |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pricefolio_market::{
//!     AssetType, MarketConfig, MarketData, MemoryCache, PriceRequest,
//!     ReqwestHttpClient, Symbol,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let market = MarketData::new(
//!         Arc::new(MemoryCache::new()),
//!         Arc::new(ReqwestHttpClient::new()),
//!         MarketConfig::from_env(),
//!     );
//!
//!     let requests = vec![
//!         PriceRequest::new(Symbol::parse("BTC")?, AssetType::Crypto),
//!         PriceRequest::new(Symbol::parse("AAPL")?, AssetType::Stock),
//!     ];
//!     for quote in market.get_prices(&requests).await {
//!         println!("{}: ${:.2}", quote.symbol, quote.current_price);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Upstream failures surface as [`SourceError`] with a structured kind:
//!
//! ```rust
//! use pricefolio_market::{SourceError, SourceErrorKind};
//!
//! fn handle_error(error: SourceError) {
//!     match error.kind() {
//!         SourceErrorKind::RateLimited => {
//!             // Wait for the next TTL window
//!         }
//!         SourceErrorKind::Unavailable => {
//!             // Serve a degraded response
//!         }
//!         SourceErrorKind::InvalidRequest => {
//!             // Report to user
//!         }
//!         _ => {}
//!     }
//! }
//! ```
//!
//! The batch operations themselves never fail for "no data": a symbol that
//! cannot be priced yields a zero-price quote in its slot, keeping the
//! response aligned with the request.
//!
//! ## Security
//!
//! - API keys are read from environment variables only (never logged)
//! - Input validation on all domain types

pub mod adapters;
pub mod cache;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod market;
pub mod provider;
pub mod symbol_map;

// Re-export commonly used types at crate root for convenience

// Adapter implementations
pub use adapters::{BinanceAdapter, CoinGeckoAdapter, CoinMarket, FinnhubAdapter, StockQuote};

// Caching
pub use cache::{Cache, CacheError, MemoryCache};

// Domain models
pub use domain::{
    AssetType, Candle, CandleInterval, ChartData, NewsArticle, Quote, Symbol, TickerSnapshot,
    TimeRange, UtcDateTime,
};

// Error types
pub use error::ValidationError;

// HTTP client types
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

// Aggregator
pub use market::{MarketConfig, MarketData, PriceRequest};

// Upstream error type
pub use provider::{SourceError, SourceErrorKind};
