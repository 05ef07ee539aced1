//! Reference price feed collaborators, polled read-only.
//!
//! One feed per deployment, used only for the optional slippage sanity
//! check; dispatch never recomputes execution price from it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{AppResult, PriceFeedError};

#[derive(Debug, Clone, Serialize)]
pub struct PricePoint {
    pub value: Decimal,
    pub timestamp: DateTime<Utc>,
}

#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn latest_price(&self) -> AppResult<PricePoint>;
}

/// JSON-over-HTTP reference feed: `{"price": "...", "timestamp": <unix secs>}`.
pub struct HttpPriceFeed {
    client: Client,
    url: String,
    max_age_secs: i64,
}

#[derive(Deserialize)]
struct FeedPayload {
    price: String,
    timestamp: i64,
}

impl HttpPriceFeed {
    pub fn new(url: String, max_age_secs: i64) -> Self {
        HttpPriceFeed {
            client: Client::new(),
            url,
            max_age_secs,
        }
    }
}

#[async_trait]
impl PriceFeed for HttpPriceFeed {
    async fn latest_price(&self) -> AppResult<PricePoint> {
        let payload: FeedPayload = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| PriceFeedError::Unavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| PriceFeedError::Unavailable(e.to_string()))?
            .json()
            .await
            .map_err(|e| PriceFeedError::Unavailable(e.to_string()))?;

        let value = Decimal::from_str(&payload.price)
            .map_err(|e| PriceFeedError::Unavailable(format!("bad price value: {e}")))?;
        let timestamp = DateTime::from_timestamp(payload.timestamp, 0)
            .ok_or_else(|| PriceFeedError::Unavailable("bad timestamp".to_string()))?;

        let age_secs = Utc::now().signed_duration_since(timestamp).num_seconds();
        if age_secs > self.max_age_secs {
            return Err(PriceFeedError::Stale { age_secs }.into());
        }

        Ok(PricePoint { value, timestamp })
    }
}

/// Fixed-price feed for the dev server and tests.
pub struct StaticPriceFeed {
    price: RwLock<Decimal>,
}

impl StaticPriceFeed {
    pub fn new(price: Decimal) -> Self {
        StaticPriceFeed {
            price: RwLock::new(price),
        }
    }

    pub fn set_price(&self, price: Decimal) {
        *self.price.write() = price;
    }
}

#[async_trait]
impl PriceFeed for StaticPriceFeed {
    async fn latest_price(&self) -> AppResult<PricePoint> {
        Ok(PricePoint {
            value: *self.price.read(),
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn static_feed_reports_the_configured_price() {
        let feed = StaticPriceFeed::new(dec!(1.25));
        assert_eq!(feed.latest_price().await.unwrap().value, dec!(1.25));

        feed.set_price(dec!(2));
        assert_eq!(feed.latest_price().await.unwrap().value, dec!(2));
    }
}
