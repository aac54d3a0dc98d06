//! Canonical domain types for pricefolio market data.
//!
//! All models validate their invariants at construction, with one deliberate
//! exception: [`Candle`] OHLC relationships are trusted as delivered by the
//! upstream exchange.

mod models;
mod symbol;
mod timerange;
mod timestamp;

pub use models::{
    AssetType, Candle, ChartData, NewsArticle, Quote, TickerSnapshot,
};
pub use symbol::Symbol;
pub use timerange::{CandleInterval, TimeRange};
pub use timestamp::UtcDateTime;
