use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub bind_address: String,
    /// Numeric tag of the venue the generic workflow path targets.
    pub default_venue: u8,
    pub apeswap_spender: String,
    pub uniswap_v2_spender: String,
    pub uniswap_v3_spender: String,
    pub sushiswap_spender: String,
    pub one_inch_spender: String,
    pub swap_deadline_secs: u64,
    pub v3_fee_tier: u32,
    pub price_feed_url: Option<String>,
    pub price_max_age_secs: i64,
    pub strict_slippage: bool,
    pub max_slippage_pct: String,
    pub rate_limit_per_minute: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Ok(Self {
            bind_address: std::env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            default_venue: std::env::var("DEFAULT_VENUE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            apeswap_spender: std::env::var("APESWAP_SPENDER")
                .unwrap_or_else(|_| "0xC0788A3aD43d79aa53B09c2EaCc313A787d1d607".to_string()),
            uniswap_v2_spender: std::env::var("UNISWAP_V2_SPENDER")
                .unwrap_or_else(|_| "0xa5E0829CaCEd8fFDD4De3c43696c57F7D7A678ff".to_string()),
            uniswap_v3_spender: std::env::var("UNISWAP_V3_SPENDER")
                .unwrap_or_else(|_| "0xE592427A0AEce92De3Edee1F18E0157C05861564".to_string()),
            sushiswap_spender: std::env::var("SUSHISWAP_SPENDER")
                .unwrap_or_else(|_| "0x1b02dA8Cb0d097eB8D57A175b88c7D8b47997506".to_string()),
            one_inch_spender: std::env::var("ONE_INCH_SPENDER")
                .unwrap_or_else(|_| "0x1111111254fb6c44bAC0beD2854e76F90643097d".to_string()),
            swap_deadline_secs: std::env::var("SWAP_DEADLINE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            v3_fee_tier: std::env::var("V3_FEE_TIER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            price_feed_url: std::env::var("PRICE_FEED_URL").ok(),
            price_max_age_secs: std::env::var("PRICE_MAX_AGE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            strict_slippage: std::env::var("STRICT_SLIPPAGE")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            max_slippage_pct: std::env::var("MAX_SLIPPAGE_PCT")
                .unwrap_or_else(|_| "5".to_string()),
            rate_limit_per_minute: std::env::var("RATE_LIMIT_PER_MINUTE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
        })
    }
}
