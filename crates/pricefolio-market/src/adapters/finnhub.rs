//! Stock-quote adapter (Finnhub REST API).
//!
//! Prices stock symbols one at a time and serves the company news feed.
//! The API key rides on the `token` query parameter.

use std::sync::Arc;

use serde::Deserialize;
use time::{Duration, OffsetDateTime};

use crate::http_client::{HttpClient, HttpRequest};
use crate::provider::SourceError;
use crate::{NewsArticle, Symbol};

const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1";
const NEWS_LOOKBACK_DAYS: i64 = 7;

/// Normalized quote from the `/quote` endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StockQuote {
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub high: f64,
    pub low: f64,
    pub open: f64,
    pub previous_close: f64,
    /// Quote time, seconds since epoch.
    pub timestamp: i64,
}

#[derive(Clone)]
pub struct FinnhubAdapter {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    api_key: String,
}

impl FinnhubAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: String::from(DEFAULT_BASE_URL),
            api_key: api_key.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Current quote with day stats.
    ///
    /// Finnhub answers unknown symbols with an all-zero payload rather than
    /// an error status; that is forwarded as a zero-price quote, per the
    /// "no data is not a failure" contract.
    pub async fn quote(&self, symbol: &Symbol) -> Result<StockQuote, SourceError> {
        let url = format!(
            "{}/quote?symbol={}&token={}",
            self.base_url,
            urlencoding::encode(symbol.as_str()),
            urlencoding::encode(&self.api_key),
        );

        let body = self.execute(&url).await?;
        let quote: QuoteResponse = serde_json::from_str(&body).map_err(|e| {
            SourceError::unavailable(format!("finnhub quote payload malformed: {e}"))
        })?;

        Ok(StockQuote {
            price: quote.current.unwrap_or(0.0),
            change: quote.change.unwrap_or(0.0),
            change_percent: quote.change_percent.unwrap_or(0.0),
            high: quote.high.unwrap_or(0.0),
            low: quote.low.unwrap_or(0.0),
            open: quote.open.unwrap_or(0.0),
            previous_close: quote.previous_close.unwrap_or(0.0),
            timestamp: quote.timestamp.unwrap_or(0),
        })
    }

    /// Company news over the trailing week.
    pub async fn company_news(&self, symbol: &Symbol) -> Result<Vec<NewsArticle>, SourceError> {
        let now = OffsetDateTime::now_utc();
        let week_ago = now - Duration::days(NEWS_LOOKBACK_DAYS);

        let url = format!(
            "{}/company-news?symbol={}&from={}&to={}&token={}",
            self.base_url,
            urlencoding::encode(symbol.as_str()),
            format_date(week_ago),
            format_date(now),
            urlencoding::encode(&self.api_key),
        );

        let body = self.execute(&url).await?;
        let articles: Vec<NewsResponse> = serde_json::from_str(&body).map_err(|e| {
            SourceError::unavailable(format!("finnhub news payload malformed: {e}"))
        })?;

        Ok(articles.into_iter().map(NewsResponse::into_article).collect())
    }

    async fn execute(&self, url: &str) -> Result<String, SourceError> {
        let request = HttpRequest::get(url);
        let response = self.http_client.execute(request).await.map_err(|e| {
            SourceError::unavailable(format!("finnhub transport error: {}", e.message()))
        })?;

        if response.status == 429 {
            return Err(SourceError::rate_limited(
                "finnhub API quota exhausted",
            ));
        }
        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "finnhub returned status {}",
                response.status
            )));
        }

        Ok(response.body)
    }
}

fn format_date(value: OffsetDateTime) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        value.year(),
        u8::from(value.month()),
        value.day()
    )
}

/// Raw `/quote` payload; single-letter fields per the upstream schema.
#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(rename = "c")]
    current: Option<f64>,
    #[serde(rename = "d")]
    change: Option<f64>,
    #[serde(rename = "dp")]
    change_percent: Option<f64>,
    #[serde(rename = "h")]
    high: Option<f64>,
    #[serde(rename = "l")]
    low: Option<f64>,
    #[serde(rename = "o")]
    open: Option<f64>,
    #[serde(rename = "pc")]
    previous_close: Option<f64>,
    #[serde(rename = "t")]
    timestamp: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    id: i64,
    headline: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    image: String,
    datetime: i64,
    #[serde(default)]
    related: String,
    #[serde(default)]
    category: String,
}

impl NewsResponse {
    fn into_article(self) -> NewsArticle {
        NewsArticle {
            id: self.id.to_string(),
            title: self.headline,
            summary: self.summary,
            source: self.source,
            url: self.url,
            image_url: self.image,
            published_at: self.datetime,
            symbols: self
                .related
                .split(',')
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
            category: self.category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_payload_parses_single_letter_fields() {
        let body = r#"{"c":212.3,"d":-1.2,"dp":-0.56,"h":214.0,"l":210.9,"o":213.1,"pc":213.5,"t":1700000000}"#;
        let quote: QuoteResponse = serde_json::from_str(body).expect("must parse");
        assert_eq!(quote.current, Some(212.3));
        assert_eq!(quote.change_percent, Some(-0.56));
    }

    #[test]
    fn unknown_symbol_payload_becomes_zero_quote() {
        let body = r#"{"c":0,"d":null,"dp":null,"h":0,"l":0,"o":0,"pc":0,"t":0}"#;
        let quote: QuoteResponse = serde_json::from_str(body).expect("must parse");
        assert_eq!(quote.current, Some(0.0));
        assert_eq!(quote.change, None);
    }

    #[test]
    fn news_related_field_splits_into_symbols() {
        let raw = NewsResponse {
            id: 42,
            headline: String::from("Quarterly results"),
            summary: String::new(),
            source: String::from("wire"),
            url: String::new(),
            image: String::new(),
            datetime: 1_700_000_000,
            related: String::from("AAPL,,MSFT"),
            category: String::from("company"),
        };
        let article = raw.into_article();
        assert_eq!(article.symbols, vec!["AAPL", "MSFT"]);
        assert_eq!(article.id, "42");
    }

    #[test]
    fn formats_news_window_dates() {
        let ts = OffsetDateTime::from_unix_timestamp(1_700_000_000).expect("valid timestamp");
        assert_eq!(format_date(ts), "2023-11-14");
    }
}
