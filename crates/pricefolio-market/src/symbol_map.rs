//! Static ticker → CoinGecko-ID table.
//!
//! The coin-metadata provider addresses assets by slug ("bitcoin"), not by
//! ticker ("BTC"). An absent entry means this layer cannot price the symbol;
//! callers resolve that to a zero-price quote without any network call.

use crate::Symbol;

/// CoinGecko slug for a supported crypto ticker.
///
/// Case-insensitivity comes for free: [`Symbol`] is always uppercase.
pub fn coingecko_id(symbol: &Symbol) -> Option<&'static str> {
    let slug = match symbol.as_str() {
        "BTC" => "bitcoin",
        "ETH" => "ethereum",
        "USDT" => "tether",
        "BNB" => "binancecoin",
        "SOL" => "solana",
        "XRP" => "ripple",
        "USDC" => "usd-coin",
        "ADA" => "cardano",
        "AVAX" => "avalanche-2",
        "DOGE" => "dogecoin",
        "DOT" => "polkadot",
        "TRX" => "tron",
        "LINK" => "chainlink",
        "MATIC" => "matic-network",
        "SHIB" => "shiba-inu",
        "LTC" => "litecoin",
        "ATOM" => "cosmos",
        "UNI" => "uniswap",
        "XLM" => "stellar",
        "NEAR" => "near",
        "APT" => "aptos",
        "ARB" => "arbitrum",
        "OP" => "optimism",
        "INJ" => "injective-protocol",
        "SUI" => "sui",
        _ => return None,
    };
    Some(slug)
}
