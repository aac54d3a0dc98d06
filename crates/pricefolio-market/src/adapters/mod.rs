mod binance;
mod coingecko;
mod finnhub;

pub use binance::BinanceAdapter;
pub use coingecko::{CoinGeckoAdapter, CoinMarket};
pub use finnhub::{FinnhubAdapter, StockQuote};
