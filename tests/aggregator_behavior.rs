//! End-to-end behavior of the aggregator: batching, caching, fallback
//! chains, and degradation, exercised against canned HTTP responses.

use pricefolio_tests::{Arc, CannedHttpClient, FailingCache};

use pricefolio_market::{
    AssetType, HttpClient, MarketConfig, MarketData, MemoryCache, PriceRequest, Symbol, TimeRange,
};

const BTC_ETH_MARKETS: &str = r#"[
    {
        "id": "bitcoin",
        "symbol": "btc",
        "name": "Bitcoin",
        "image": "https://img.test/btc.png",
        "current_price": 64000.0,
        "market_cap": 1260000000000.0,
        "market_cap_rank": 1,
        "price_change_percentage_24h": 2.0
    },
    {
        "id": "ethereum",
        "symbol": "eth",
        "name": "Ethereum",
        "image": "https://img.test/eth.png",
        "current_price": 3200.0,
        "market_cap": 384000000000.0,
        "market_cap_rank": 2,
        "price_change_percentage_24h": -1.5
    }
]"#;

const BTC_ONLY_MARKETS: &str = r#"[
    {
        "id": "bitcoin",
        "symbol": "btc",
        "name": "Bitcoin",
        "image": "https://img.test/btc.png",
        "current_price": 64000.0,
        "price_change_percentage_24h": 2.0
    }
]"#;

const AAPL_QUOTE: &str =
    r#"{"c":212.3,"d":-1.2,"dp":-0.56,"h":214.0,"l":210.9,"o":213.1,"pc":213.5,"t":1700000000}"#;

const BTC_KLINES: &str = r#"[
    [1700000000000, "35000.10", "35100.00", "34950.50", "35050.25", "123.456", 1700000899999],
    [1700000900000, "35050.25", "35200.00", "35000.00", "35150.75", "98.765", 1700001799999]
]"#;

const BTC_TICKER_24H: &str =
    r#"{"lastPrice":"64000.00","priceChange":"1280.00","priceChangePercent":"2.00"}"#;

const AAPL_NEWS: &str = r#"[
    {
        "id": 101,
        "headline": "Quarterly results announced",
        "summary": "Earnings beat expectations.",
        "source": "wire",
        "url": "https://news.test/101",
        "image": "https://news.test/101.png",
        "datetime": 1700000000,
        "related": "AAPL,MSFT",
        "category": "company"
    }
]"#;

fn market_with(client: Arc<CannedHttpClient>) -> MarketData {
    MarketData::new(
        Arc::new(MemoryCache::new()),
        client,
        MarketConfig::new("test-key"),
    )
}

fn request(symbol: &str, asset_type: AssetType) -> PriceRequest {
    PriceRequest::new(Symbol::parse(symbol).expect("valid symbol"), asset_type)
}

#[tokio::test]
async fn mixed_batch_preserves_length_and_order() {
    let client = Arc::new(
        CannedHttpClient::new()
            .with_json("coins/markets", BTC_ONLY_MARKETS)
            .with_json("finnhub.io/api/v1/quote", AAPL_QUOTE),
    );
    let market = market_with(Arc::clone(&client));

    let requests = vec![
        request("BTC", AssetType::Crypto),
        request("ZZZ", AssetType::Crypto),
        request("AAPL", AssetType::Stock),
    ];
    let quotes = market.get_prices(&requests).await;

    assert_eq!(quotes.len(), 3);

    assert_eq!(quotes[0].symbol.as_str(), "BTC");
    assert_eq!(quotes[0].name, "Bitcoin");
    assert_eq!(quotes[0].current_price, 64_000.0);
    assert_eq!(quotes[0].change_24h, 1_280.0);
    assert_eq!(quotes[0].image.as_deref(), Some("https://img.test/btc.png"));

    // Unmapped crypto ticker: a zero quote in its slot, never an omission.
    assert_eq!(quotes[1].symbol.as_str(), "ZZZ");
    assert_eq!(quotes[1].current_price, 0.0);
    assert_eq!(quotes[1].name, "ZZZ");

    assert_eq!(quotes[2].symbol.as_str(), "AAPL");
    assert_eq!(quotes[2].current_price, 212.3);
    assert_eq!(quotes[2].change_percent_24h, -0.56);
}

#[tokio::test]
async fn unmapped_symbols_cost_no_upstream_calls() {
    let client = Arc::new(CannedHttpClient::new());
    let market = market_with(Arc::clone(&client));

    let requests = vec![
        request("ZZZ", AssetType::Crypto),
        request("QQQQ", AssetType::Crypto),
    ];
    let quotes = market.get_prices(&requests).await;

    assert!(quotes.iter().all(|q| q.current_price == 0.0));
    assert!(client.recorded_urls().is_empty());
}

#[tokio::test]
async fn repeated_batch_is_served_from_cache() {
    let client = Arc::new(CannedHttpClient::new().with_json("coins/markets", BTC_ETH_MARKETS));
    let market = market_with(Arc::clone(&client));

    let requests = vec![
        request("BTC", AssetType::Crypto),
        request("ETH", AssetType::Crypto),
    ];
    let first = market.get_prices(&requests).await;
    let second = market.get_prices(&requests).await;

    assert_eq!(client.request_count("coins/markets"), 1);
    assert_eq!(first[0].current_price, second[0].current_price);
    assert_eq!(second[1].name, "Ethereum");
}

#[tokio::test]
async fn permuted_batch_shares_the_cache_entry() {
    let client = Arc::new(CannedHttpClient::new().with_json("coins/markets", BTC_ETH_MARKETS));
    let market = market_with(Arc::clone(&client));

    let forward = vec![
        request("BTC", AssetType::Crypto),
        request("ETH", AssetType::Crypto),
    ];
    let reversed = vec![
        request("ETH", AssetType::Crypto),
        request("BTC", AssetType::Crypto),
    ];

    market.get_prices(&forward).await;
    let quotes = market.get_prices(&reversed).await;

    // Same id set, same cache key: one upstream call for both batches.
    assert_eq!(client.request_count("coins/markets"), 1);
    assert_eq!(quotes[0].symbol.as_str(), "ETH");
    assert_eq!(quotes[1].symbol.as_str(), "BTC");
}

#[tokio::test]
async fn missing_market_row_yields_zero_quote() {
    let client = Arc::new(CannedHttpClient::new().with_json("coins/markets", BTC_ONLY_MARKETS));
    let market = market_with(Arc::clone(&client));

    let requests = vec![
        request("BTC", AssetType::Crypto),
        request("ETH", AssetType::Crypto),
    ];
    let quotes = market.get_prices(&requests).await;

    assert_eq!(quotes[0].current_price, 64_000.0);
    assert_eq!(quotes[1].symbol.as_str(), "ETH");
    assert_eq!(quotes[1].current_price, 0.0);
}

#[tokio::test]
async fn stock_failure_does_not_poison_crypto() {
    let client = Arc::new(
        CannedHttpClient::new()
            .with_json("coins/markets", BTC_ONLY_MARKETS)
            .with_status("finnhub.io/api/v1/quote", 500, "internal error"),
    );
    let market = market_with(Arc::clone(&client));

    let requests = vec![
        request("BTC", AssetType::Crypto),
        request("ZZZ", AssetType::Crypto),
        request("AAPL", AssetType::Stock),
    ];
    let quotes = market.get_prices(&requests).await;

    assert_eq!(quotes.len(), 3);
    assert_eq!(quotes[0].current_price, 64_000.0);
    assert_eq!(quotes[1].current_price, 0.0);
    assert_eq!(quotes[2].current_price, 0.0);
}

#[tokio::test]
async fn failed_stock_does_not_poison_its_sibling() {
    let client = Arc::new(
        CannedHttpClient::new()
            .with_json("quote?symbol=MSFT", r#"{"c":415.2,"d":3.1,"dp":0.75}"#)
            .with_status("quote?symbol=AAPL", 500, "internal error"),
    );
    let market = market_with(Arc::clone(&client));

    let requests = vec![
        request("AAPL", AssetType::Stock),
        request("MSFT", AssetType::Stock),
    ];
    let quotes = market.get_prices(&requests).await;

    assert_eq!(quotes[0].symbol.as_str(), "AAPL");
    assert_eq!(quotes[0].current_price, 0.0);
    assert_eq!(quotes[1].symbol.as_str(), "MSFT");
    assert_eq!(quotes[1].current_price, 415.2);
    assert_eq!(quotes[1].change_percent_24h, 0.75);
}

#[tokio::test]
async fn metadata_outage_falls_back_to_exchange_ticker() {
    let client = Arc::new(
        CannedHttpClient::new()
            .with_status("coins/markets", 500, "upstream down")
            .with_json(
                "ticker/price?symbol=BTCUSDT",
                r#"{"symbol":"BTCUSDT","price":"64123.45"}"#,
            ),
    );
    let market = market_with(Arc::clone(&client));

    let requests = vec![request("BTC", AssetType::Crypto)];
    let quotes = market.get_prices(&requests).await;

    // Degraded quote: exchange price without 24h change data.
    assert_eq!(quotes[0].current_price, 64_123.45);
    assert_eq!(quotes[0].change_24h, 0.0);
    assert_eq!(quotes[0].change_percent_24h, 0.0);
    assert_eq!(quotes[0].name, "BTC");

    // Fallback results are not cached: the next batch retries the
    // metadata provider.
    market.get_prices(&requests).await;
    assert_eq!(client.request_count("coins/markets"), 2);
}

#[tokio::test]
async fn cache_outage_degrades_to_fetch_through() {
    let client = Arc::new(CannedHttpClient::new().with_json("coins/markets", BTC_ONLY_MARKETS));
    let market = MarketData::new(
        Arc::new(FailingCache),
        Arc::clone(&client) as Arc<dyn HttpClient>,
        MarketConfig::new("test-key"),
    );

    let requests = vec![request("BTC", AssetType::Crypto)];
    let first = market.get_prices(&requests).await;
    let second = market.get_prices(&requests).await;

    assert_eq!(first[0].current_price, 64_000.0);
    assert_eq!(second[0].current_price, 64_000.0);
    // No cache means every batch goes upstream.
    assert_eq!(client.request_count("coins/markets"), 2);
}

#[tokio::test]
async fn crypto_history_reuses_cached_candles_but_refreshes_ticker() {
    let client = Arc::new(
        CannedHttpClient::new()
            .with_json("api/v3/klines", BTC_KLINES)
            .with_json("ticker/24hr", BTC_TICKER_24H),
    );
    let market = market_with(Arc::clone(&client));
    let symbol = Symbol::parse("BTC").expect("valid symbol");

    let first = market
        .get_history(&symbol, AssetType::Crypto, TimeRange::OneDay)
        .await;
    let second = market
        .get_history(&symbol, AssetType::Crypto, TimeRange::OneDay)
        .await;

    assert_eq!(first.candles.len(), 2);
    assert_eq!(first.candles[0].time, 1_700_000_000);
    assert_eq!(first.candles[0].open, 35_000.10);
    assert_eq!(first.ticker.price, 64_000.0);
    assert_eq!(second.candles, first.candles);

    // Candles come from cache on the second call; the ticker is always live.
    assert_eq!(client.request_count("api/v3/klines"), 1);
    assert_eq!(client.request_count("ticker/24hr"), 2);

    // The one-day range maps to 96 fifteen-minute candles.
    let kline_url = client
        .recorded_urls()
        .into_iter()
        .find(|url| url.contains("api/v3/klines"))
        .expect("klines request was recorded");
    assert!(kline_url.contains("interval=15m"));
    assert!(kline_url.contains("limit=96"));
}

#[tokio::test]
async fn every_range_reaches_the_exchange_with_its_plan() {
    let expected = [
        (TimeRange::OneDay, "15m", 96_u32),
        (TimeRange::OneWeek, "1h", 168),
        (TimeRange::OneMonth, "4h", 180),
        (TimeRange::ThreeMonths, "1d", 90),
        (TimeRange::OneYear, "1d", 365),
        (TimeRange::All, "1w", 200),
    ];
    let symbol = Symbol::parse("BTC").expect("valid symbol");

    for (range, interval, limit) in expected {
        let client = Arc::new(
            CannedHttpClient::new()
                .with_json("api/v3/klines", BTC_KLINES)
                .with_json("ticker/24hr", BTC_TICKER_24H),
        );
        let market = market_with(Arc::clone(&client));

        market.get_history(&symbol, AssetType::Crypto, range).await;

        let kline_url = client
            .recorded_urls()
            .into_iter()
            .find(|url| url.contains("api/v3/klines"))
            .unwrap_or_else(|| panic!("klines request was recorded for {range:?}"));
        assert!(
            kline_url.contains(&format!("interval={interval}&limit={limit}")),
            "range {range:?} built {kline_url}"
        );
    }
}

#[tokio::test]
async fn candle_outage_still_returns_live_ticker() {
    let client = Arc::new(
        CannedHttpClient::new()
            .with_status("api/v3/klines", 500, "upstream down")
            .with_json("ticker/24hr", BTC_TICKER_24H),
    );
    let market = market_with(Arc::clone(&client));
    let symbol = Symbol::parse("BTC").expect("valid symbol");

    let chart = market
        .get_history(&symbol, AssetType::Crypto, TimeRange::OneWeek)
        .await;

    assert!(chart.candles.is_empty());
    assert_eq!(chart.ticker.price, 64_000.0);
}

#[tokio::test]
async fn stock_history_is_ticker_only() {
    let client =
        Arc::new(CannedHttpClient::new().with_json("finnhub.io/api/v1/quote", AAPL_QUOTE));
    let market = market_with(Arc::clone(&client));
    let symbol = Symbol::parse("AAPL").expect("valid symbol");

    let chart = market
        .get_history(&symbol, AssetType::Stock, TimeRange::ThreeMonths)
        .await;

    assert!(chart.candles.is_empty());
    assert_eq!(chart.ticker.price, 212.3);
    assert_eq!(chart.ticker.change_24h, -1.2);

    // The quote landed in the shared cache, so a price batch for the same
    // symbol needs no further upstream call.
    let quotes = market
        .get_prices(&[request("AAPL", AssetType::Stock)])
        .await;
    assert_eq!(quotes[0].current_price, 212.3);
    assert_eq!(client.request_count("finnhub.io/api/v1/quote"), 1);
}

#[tokio::test]
async fn news_is_cached_between_lookups() {
    let client = Arc::new(CannedHttpClient::new().with_json("company-news", AAPL_NEWS));
    let market = market_with(Arc::clone(&client));
    let symbol = Symbol::parse("AAPL").expect("valid symbol");

    let first = market.get_news(&symbol).await;
    let second = market.get_news(&symbol).await;

    assert_eq!(first.len(), 1);
    assert_eq!(first[0].title, "Quarterly results announced");
    assert_eq!(first[0].symbols, vec!["AAPL", "MSFT"]);
    assert_eq!(second, first);
    assert_eq!(client.request_count("company-news"), 1);
}

#[tokio::test]
async fn news_outage_degrades_to_empty_feed() {
    let client =
        Arc::new(CannedHttpClient::new().with_transport_failure("company-news", "dns failure"));
    let market = market_with(Arc::clone(&client));
    let symbol = Symbol::parse("AAPL").expect("valid symbol");

    let articles = market.get_news(&symbol).await;
    assert!(articles.is_empty());
}

#[tokio::test]
async fn market_overview_is_cached_per_limit() {
    let client = Arc::new(CannedHttpClient::new().with_json("coins/markets", BTC_ETH_MARKETS));
    let market = market_with(Arc::clone(&client));

    let first = market.market_overview(10).await.expect("overview succeeds");
    let second = market.market_overview(10).await.expect("overview succeeds");

    assert_eq!(first.len(), 2);
    assert_eq!(first[0].id, "bitcoin");
    assert_eq!(second, first);
    assert_eq!(client.request_count("coins/markets"), 1);

    let overview_url = client
        .recorded_urls()
        .into_iter()
        .find(|url| url.contains("coins/markets"))
        .expect("overview request was recorded");
    assert!(overview_url.contains("per_page=10"));
}
