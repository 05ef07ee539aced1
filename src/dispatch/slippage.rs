//! Pre-dispatch plausibility check of the caller's minimum-output bound
//! against the reference price feed.
//!
//! Defensive only: the venue still enforces the bound at execution, and a
//! passing check is no guarantee of execution price.

use std::sync::Arc;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tracing::warn;

use crate::error::{AppResult, ExecutionError};
use crate::pricefeed::PriceFeed;

pub struct SlippageGuard {
    feed: Arc<dyn PriceFeed>,
    max_slippage_pct: Decimal,
}

impl SlippageGuard {
    pub fn new(feed: Arc<dyn PriceFeed>, max_slippage_pct: Decimal) -> Self {
        SlippageGuard { feed, max_slippage_pct }
    }

    /// Reject a minimum-output bound implausibly far below what the
    /// reference price implies for `amount_in`.
    pub async fn check(&self, amount_in: u128, min_out: u128) -> AppResult<()> {
        let price = self.feed.latest_price().await?;

        let (Some(amount), Some(bound)) =
            (Decimal::from_u128(amount_in), Decimal::from_u128(min_out))
        else {
            warn!(amount_in, min_out, "amounts outside guard range, skipping slippage pre-check");
            return Ok(());
        };

        let expected = amount * price.value;
        let floor = expected * (Decimal::ONE - self.max_slippage_pct / Decimal::ONE_HUNDRED);
        if bound < floor {
            return Err(ExecutionError::SlippageOutOfRange {
                min_out,
                reference: price.value.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::pricefeed::StaticPriceFeed;
    use rust_decimal_macros::dec;

    fn guard(price: Decimal, max_pct: Decimal) -> SlippageGuard {
        SlippageGuard::new(Arc::new(StaticPriceFeed::new(price)), max_pct)
    }

    #[tokio::test]
    async fn plausible_bounds_pass() {
        let guard = guard(dec!(2), dec!(5));
        // 1000 in at price 2 -> expected 2000; floor at 5% is 1900.
        assert!(guard.check(1_000, 1_950).await.is_ok());
        assert!(guard.check(1_000, 1_900).await.is_ok());
    }

    #[tokio::test]
    async fn implausibly_loose_bounds_are_rejected() {
        let guard = guard(dec!(2), dec!(5));
        let err = guard.check(1_000, 100).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Execution(ExecutionError::SlippageOutOfRange { min_out: 100, .. })
        ));
    }

    #[tokio::test]
    async fn zero_amount_always_passes() {
        let guard = guard(dec!(2), dec!(5));
        assert!(guard.check(0, 0).await.is_ok());
    }
}
