//! Shared key-value cache with per-entry TTL.
//!
//! The cache is injected into the aggregator as a trait object so tests can
//! substitute doubles, and it is strictly best-effort: a failed read is a
//! miss, a failed write is ignored. Values are JSON text; keys incorporate
//! every parameter that affects the response (see [`keys`]).

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::{CandleInterval, Symbol};

/// TTL tiers, chosen to balance upstream rate limits against perceived
/// freshness.
pub mod ttl {
    use std::time::Duration;

    /// Live quotes and batch price lookups.
    pub const QUOTE: Duration = Duration::from_secs(60);
    /// OHLCV candle series.
    pub const CANDLES: Duration = Duration::from_secs(300);
    /// Market overview snapshots.
    pub const MARKET: Duration = Duration::from_secs(300);
    /// News articles.
    pub const NEWS: Duration = Duration::from_secs(900);
}

/// Deterministic cache-key builders.
///
/// Two logically-identical requests must collide on the same key regardless
/// of call order, so batch keys sort their id sets.
pub mod keys {
    use super::{CandleInterval, Symbol};

    pub fn markets(ids: &[&str]) -> String {
        let mut sorted = ids.to_vec();
        sorted.sort_unstable();
        format!("markets:{}", sorted.join(","))
    }

    pub fn stock_quote(symbol: &Symbol) -> String {
        format!("stock:{}:quote", symbol.as_str())
    }

    pub fn candles(symbol: &Symbol, interval: CandleInterval, limit: u32) -> String {
        format!("candles:{}:{}:{limit}", symbol.as_str(), interval.as_str())
    }

    pub fn news(symbol: &Symbol) -> String {
        format!("news:{}", symbol.as_str())
    }

    pub fn market_overview(limit: u32) -> String {
        format!("market:overview:{limit}")
    }
}

/// Failure talking to the cache backend. Never surfaced past the aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheError {
    message: String,
}

impl CacheError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for CacheError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CacheError {}

/// Key-value store contract: `GET key` / `SET key value EX seconds`.
///
/// Writes are idempotent and last-writer-wins races are acceptable, so no
/// client-side locking is required.
pub trait Cache: Send + Sync {
    fn get<'a>(
        &'a self,
        key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>, CacheError>> + Send + 'a>>;

    fn set<'a>(
        &'a self,
        key: &'a str,
        value: String,
        ttl: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<(), CacheError>> + Send + 'a>>;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    body: String,
    expires_at: Instant,
}

/// In-process cache implementation.
///
/// Entries expire lazily on read; `clear_expired` exists for callers that
/// want to bound memory on long-running processes.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    inner: Arc<tokio::sync::RwLock<HashMap<String, CacheEntry>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn clear_expired(&self) {
        let now = Instant::now();
        let mut map = self.inner.write().await;
        map.retain(|_, entry| entry.expires_at > now);
    }

    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

impl Cache for MemoryCache {
    fn get<'a>(
        &'a self,
        key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>, CacheError>> + Send + 'a>> {
        Box::pin(async move {
            let map = self.inner.read().await;
            Ok(map.get(key).and_then(|entry| {
                if Instant::now() <= entry.expires_at {
                    Some(entry.body.clone())
                } else {
                    None
                }
            }))
        })
    }

    fn set<'a>(
        &'a self,
        key: &'a str,
        value: String,
        ttl: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<(), CacheError>> + Send + 'a>> {
        Box::pin(async move {
            let entry = CacheEntry {
                body: value,
                expires_at: Instant::now() + ttl,
            };
            self.inner.write().await.insert(key.to_owned(), entry);
            Ok(())
        })
    }
}
