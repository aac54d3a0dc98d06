use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Symbol, TimeRange, UtcDateTime, ValidationError};

/// Asset class of a tracked position; selects which provider is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    Crypto,
    Stock,
}

impl AssetType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Crypto => "crypto",
            Self::Stock => "stock",
        }
    }
}

impl Display for AssetType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "crypto" => Ok(Self::Crypto),
            "stock" => Ok(Self::Stock),
            other => Err(ValidationError::InvalidAssetType {
                value: other.to_owned(),
            }),
        }
    }
}

/// Point-in-time price observation for one symbol.
///
/// `current_price == 0.0` is the explicit "unavailable" sentinel: every
/// requested symbol always resolves to a quote, never to an omission. The
/// 24h change fields are zero when the serving provider did not supply them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: Symbol,
    pub asset_type: AssetType,
    pub name: String,
    pub current_price: f64,
    pub change_24h: f64,
    pub change_percent_24h: f64,
    pub image: Option<String>,
    pub fetched_at: UtcDateTime,
}

impl Quote {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: Symbol,
        asset_type: AssetType,
        name: impl Into<String>,
        current_price: f64,
        change_24h: f64,
        change_percent_24h: f64,
        image: Option<String>,
        fetched_at: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("current_price", current_price)?;
        validate_finite("change_24h", change_24h)?;
        validate_finite("change_percent_24h", change_percent_24h)?;

        Ok(Self {
            symbol,
            asset_type,
            name: name.into(),
            current_price,
            change_24h,
            change_percent_24h,
            image,
            fetched_at,
        })
    }

    /// Zero-price quote used when no provider could price the symbol.
    pub fn unavailable(symbol: Symbol, asset_type: AssetType, fetched_at: UtcDateTime) -> Self {
        let name = symbol.as_str().to_owned();
        Self {
            symbol,
            asset_type,
            name,
            current_price: 0.0,
            change_24h: 0.0,
            change_percent_24h: 0.0,
            image: None,
            fetched_at,
        }
    }
}

/// One OHLCV bar. `time` is the interval start in seconds since epoch;
/// adapters convert provider millisecond timestamps before constructing one.
///
/// Upstream OHLC relationships are trusted as-is and deliberately not
/// validated here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Exchange 24h ticker attached to history responses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickerSnapshot {
    pub price: f64,
    pub change_24h: f64,
    pub change_percent_24h: f64,
}

impl TickerSnapshot {
    pub const fn zero() -> Self {
        Self {
            price: 0.0,
            change_24h: 0.0,
            change_percent_24h: 0.0,
        }
    }
}

/// Response shape of history lookups: candles plus the latest ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub symbol: Symbol,
    pub asset_type: AssetType,
    pub range: TimeRange,
    pub candles: Vec<Candle>,
    pub ticker: TickerSnapshot,
}

/// Normalized news article from the stock-quote provider's news feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub source: String,
    pub url: String,
    pub image_url: String,
    /// Publication time, seconds since epoch.
    pub published_at: i64,
    pub symbols: Vec<String>,
    pub category: String,
}

fn validate_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    Ok(())
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    validate_finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
