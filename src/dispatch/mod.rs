//! The swap dispatcher: per-family entry points that validate the caller's
//! venue tag, forward to the resolved external venue, and record exactly one
//! completion event per settled swap.
//!
//! Each invocation is independent: Received, Validate, Dispatch, then
//! Settle or Failed, with no state carried across calls. The dispatcher never
//! grants approvals; it assumes the trader already did via the approval
//! manager.

pub mod slippage;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use crate::adapters::traits::{ExactInputSingleParams, SwapRequest, VenueClient};
use crate::error::{AppError, AppResult, RoutingError};
use crate::events::{EventLog, EventRecord, SwapDetails, SwapEvent};
use crate::types::Address;
use crate::venues::{CallVariant, VenueRegistry, VenueTag};

use self::slippage::SlippageGuard;

/// Parameters for the generic workflow path, which takes no venue tag.
#[derive(Debug, Clone)]
pub struct GenericSwapParams {
    pub trader: Address,
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: u128,
    pub slippage_param: u128,
}

/// What a settled dispatch reports back to the caller.
#[derive(Debug, Clone)]
pub struct SwapOutcome {
    pub event: EventRecord,
    pub amount_out: u128,
}

pub struct DispatchSettings {
    pub default_venue: VenueTag,
    /// Relative deadline handed to V2-style venues.
    pub deadline_secs: u64,
    /// Fee tier handed to V3-style venues.
    pub v3_fee: u32,
}

pub struct SwapDispatcher {
    registry: Arc<VenueRegistry>,
    clients: HashMap<VenueTag, VenueClient>,
    events: Arc<EventLog>,
    guard: Option<SlippageGuard>,
    settings: DispatchSettings,
}

impl SwapDispatcher {
    /// SECURITY: construction verifies every venue has a client speaking the
    /// descriptor's call interface, so dispatch never discovers a miswired
    /// venue at request time.
    pub fn new(
        registry: Arc<VenueRegistry>,
        clients: HashMap<VenueTag, VenueClient>,
        events: Arc<EventLog>,
        guard: Option<SlippageGuard>,
        settings: DispatchSettings,
    ) -> AppResult<Self> {
        for tag in VenueTag::all() {
            let descriptor = registry.resolve(tag)?;
            let client = clients
                .get(&tag)
                .ok_or_else(|| AppError::Config(format!("no venue client wired for {tag}")))?;
            if client.call_variant() != descriptor.call_variant {
                return Err(AppError::Config(format!(
                    "venue client for {tag} speaks {}, descriptor expects {}",
                    client.call_variant(),
                    descriptor.call_variant
                )));
            }
        }
        Ok(SwapDispatcher {
            registry,
            clients,
            events,
            guard,
            settings,
        })
    }

    /// Generic workflow path: single-venue convenience entry bound to the
    /// configured default venue. Emits `TokensSwapped` on settlement.
    #[instrument(skip(self, params), fields(trader = %params.trader))]
    pub async fn swap(&self, params: GenericSwapParams) -> AppResult<SwapOutcome> {
        let request = SwapRequest {
            trader: params.trader,
            token_in: params.token_in,
            token_out: params.token_out,
            amount_in: params.amount_in,
            venue: self.settings.default_venue,
            slippage_param: params.slippage_param,
        };
        let amount_out = self.dispatch(&request).await?;
        let event = self.events.append(SwapEvent::TokensSwapped(SwapDetails {
            token_in: request.token_in,
            token_out: request.token_out,
            trader: request.trader,
        }));
        info!(sequence = event.sequence, amount_out, "generic swap settled");
        Ok(SwapOutcome { event, amount_out })
    }

    /// V2-family entry point (Apeswap, UniswapV2, Sushiswap).
    pub async fn swap_v2(&self, request: SwapRequest) -> AppResult<SwapOutcome> {
        self.execute(request, CallVariant::V2Style).await
    }

    /// V3-family entry point (UniswapV3).
    pub async fn swap_v3(&self, request: SwapRequest) -> AppResult<SwapOutcome> {
        self.execute(request, CallVariant::V3Style).await
    }

    /// Aggregator-family entry point (OneInch).
    pub async fn swap_aggregator(&self, request: SwapRequest) -> AppResult<SwapOutcome> {
        self.execute(request, CallVariant::AggregatorStyle).await
    }

    #[instrument(skip(self, request), fields(venue = %request.venue, trader = %request.trader))]
    async fn execute(&self, request: SwapRequest, entry: CallVariant) -> AppResult<SwapOutcome> {
        // Validate: the supplied tag must match the entry point's bound
        // family. On mismatch nothing external runs and no event is recorded.
        if request.venue.call_variant() != entry {
            return Err(RoutingError::VenueMismatch {
                entry,
                venue: request.venue,
            }
            .into());
        }

        let amount_out = self.dispatch(&request).await?;

        // Settle: exactly one completion event per successful dispatch.
        let event = self.events.append(SwapEvent::swapped_on(
            request.venue,
            SwapDetails {
                token_in: request.token_in,
                token_out: request.token_out,
                trader: request.trader,
            },
        ));
        info!(sequence = event.sequence, amount_out, "swap settled");
        Ok(SwapOutcome { event, amount_out })
    }

    // Forward to the external venue. The venue call is atomic by contract
    // (it settles fully or leaves the ledger untouched), so a failure here
    // aborts the whole call with no event and no partial effect.
    async fn dispatch(&self, request: &SwapRequest) -> AppResult<u128> {
        let descriptor = self.registry.resolve(request.venue)?;

        if let Some(guard) = &self.guard {
            guard.check(request.amount_in, request.slippage_param).await?;
        }

        let client = self.clients.get(&request.venue).ok_or_else(|| {
            AppError::Internal(format!("venue client missing for {}", descriptor.tag))
        })?;

        // Exhaustive over call variants: adding a variant forces an arm here.
        match client {
            VenueClient::V2(router) => {
                let deadline = Utc::now().timestamp() as u64 + self.settings.deadline_secs;
                let amounts = router
                    .swap_exact_tokens_for_tokens(
                        request.trader,
                        request.amount_in,
                        request.slippage_param,
                        vec![request.token_in, request.token_out],
                        request.trader,
                        deadline,
                    )
                    .await?;
                Ok(amounts.last().copied().unwrap_or(0))
            }
            VenueClient::V3(router) => {
                router
                    .exact_input_single(
                        request.trader,
                        ExactInputSingleParams {
                            token_in: request.token_in,
                            token_out: request.token_out,
                            fee: self.settings.v3_fee,
                            recipient: request.trader,
                            amount_in: request.amount_in,
                            amount_out_minimum: request.slippage_param,
                        },
                    )
                    .await
            }
            VenueClient::Aggregator(router) => {
                router
                    .swap(
                        request.trader,
                        request.token_in,
                        request.token_out,
                        request.amount_in,
                        request.slippage_param,
                    )
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sim::{SimAggregator, SimLedger, SimV2Router, SimV3Router};
    use crate::error::ExecutionError;
    use crate::pricefeed::StaticPriceFeed;
    use crate::venues::VenueDescriptor;
    use rust_decimal_macros::dec;

    fn addr(byte: u8) -> Address {
        Address::new([byte; 20])
    }

    const WMATIC: u8 = 0xAA;
    const DAI: u8 = 0xBB;

    struct Harness {
        ledger: Arc<SimLedger>,
        events: Arc<EventLog>,
        dispatcher: SwapDispatcher,
        trader: Address,
    }

    fn spender_for(tag: VenueTag) -> Address {
        addr(0x40 + tag.as_u8())
    }

    fn harness(guard: Option<SlippageGuard>) -> Harness {
        let registry = Arc::new(
            VenueRegistry::new(
                VenueTag::all()
                    .into_iter()
                    .map(|tag| VenueDescriptor::new(tag, spender_for(tag)))
                    .collect(),
            )
            .unwrap(),
        );
        let events = Arc::new(EventLog::new());
        let ledger = Arc::new(SimLedger::new());
        let trader = addr(0x01);

        ledger.mint(addr(WMATIC), trader, 10_000_000);
        ledger.set_rate(addr(WMATIC), addr(DAI), dec!(2));
        let mut clients = HashMap::new();
        for tag in VenueTag::all() {
            ledger.mint(addr(DAI), spender_for(tag), 100_000_000);
            let client = match tag.call_variant() {
                CallVariant::V2Style => {
                    VenueClient::V2(Arc::new(SimV2Router::new(ledger.clone(), tag, spender_for(tag))))
                }
                CallVariant::V3Style => {
                    VenueClient::V3(Arc::new(SimV3Router::new(ledger.clone(), tag, spender_for(tag))))
                }
                CallVariant::AggregatorStyle => VenueClient::Aggregator(Arc::new(
                    SimAggregator::new(ledger.clone(), tag, spender_for(tag)),
                )),
            };
            clients.insert(tag, client);
        }

        let dispatcher = SwapDispatcher::new(
            registry,
            clients,
            events.clone(),
            guard,
            DispatchSettings {
                default_venue: VenueTag::UniswapV2,
                deadline_secs: 300,
                v3_fee: 3000,
            },
        )
        .unwrap();

        Harness { ledger, events, dispatcher, trader }
    }

    fn request(harness: &Harness, venue: VenueTag, amount_in: u128, min_out: u128) -> SwapRequest {
        SwapRequest {
            trader: harness.trader,
            token_in: addr(WMATIC),
            token_out: addr(DAI),
            amount_in,
            venue,
            slippage_param: min_out,
        }
    }

    async fn approve(harness: &Harness, venue: VenueTag, amount: u128) {
        use crate::adapters::traits::TokenGateway;
        harness
            .ledger
            .approve(addr(WMATIC), harness.trader, spender_for(venue), amount)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn mismatched_tags_are_rejected_on_every_entry_point() {
        let h = harness(None);

        let entries: [(&str, CallVariant); 3] = [
            ("v2", CallVariant::V2Style),
            ("v3", CallVariant::V3Style),
            ("aggregator", CallVariant::AggregatorStyle),
        ];
        for (name, entry) in entries {
            for venue in VenueTag::all() {
                if venue.call_variant() == entry {
                    continue;
                }
                let req = request(&h, venue, 100, 0);
                let result = match entry {
                    CallVariant::V2Style => h.dispatcher.swap_v2(req).await,
                    CallVariant::V3Style => h.dispatcher.swap_v3(req).await,
                    CallVariant::AggregatorStyle => h.dispatcher.swap_aggregator(req).await,
                };
                let err = result.unwrap_err();
                assert_eq!(
                    err.to_string(),
                    "Routing error: Please call a reasonable function",
                    "entry {name} accepted {venue}",
                );
                assert!(matches!(
                    err,
                    AppError::Routing(RoutingError::VenueMismatch { .. })
                ));
            }
        }
        // No external call ran and no event was recorded.
        assert!(h.events.is_empty());
        assert_eq!(h.ledger.balance(addr(WMATIC), h.trader), 10_000_000);
    }

    #[tokio::test]
    async fn matching_tag_settles_and_emits_one_completion_event() {
        let h = harness(None);
        approve(&h, VenueTag::UniswapV2, 1_000_000).await;

        let outcome = h
            .dispatcher
            .swap_v2(request(&h, VenueTag::UniswapV2, 1_000_000, 1_500_000))
            .await
            .unwrap();

        assert_eq!(outcome.amount_out, 2_000_000);
        assert_eq!(h.events.len(), 1);
        match &outcome.event.event {
            SwapEvent::TokensSwappedOnUniswapV2(details) => {
                assert_eq!(details.token_in, addr(WMATIC));
                assert_eq!(details.token_out, addr(DAI));
                assert_eq!(details.trader, h.trader);
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(h.ledger.balance(addr(DAI), h.trader), 2_000_000);
    }

    #[tokio::test]
    async fn v2_entry_accepts_every_v2_family_venue() {
        let h = harness(None);
        for venue in [VenueTag::Apeswap, VenueTag::UniswapV2, VenueTag::Sushiswap] {
            approve(&h, venue, 1_000).await;
            let outcome = h.dispatcher.swap_v2(request(&h, venue, 1_000, 0)).await.unwrap();
            assert!(outcome.event.event.name().contains(venue.as_str()));
        }
        assert_eq!(h.events.len(), 3);
    }

    #[tokio::test]
    async fn v3_entry_emits_the_v3_completion_event() {
        let h = harness(None);
        approve(&h, VenueTag::UniswapV3, 5_000).await;

        let outcome = h
            .dispatcher
            .swap_v3(request(&h, VenueTag::UniswapV3, 5_000, 9_000))
            .await
            .unwrap();

        assert_eq!(outcome.event.event.name(), "TokensSwappedOnUniswapV3");
        assert_eq!(outcome.amount_out, 10_000);
    }

    #[tokio::test]
    async fn aggregator_entry_dispatches_to_one_inch() {
        let h = harness(None);
        approve(&h, VenueTag::OneInch, 2_000).await;

        let outcome = h
            .dispatcher
            .swap_aggregator(request(&h, VenueTag::OneInch, 2_000, 0))
            .await
            .unwrap();
        assert_eq!(outcome.event.event.name(), "TokensSwappedOnOneInch");
    }

    #[tokio::test]
    async fn generic_path_targets_the_default_venue() {
        let h = harness(None);
        approve(&h, VenueTag::UniswapV2, 1_000).await;

        let outcome = h
            .dispatcher
            .swap(GenericSwapParams {
                trader: h.trader,
                token_in: addr(WMATIC),
                token_out: addr(DAI),
                amount_in: 1_000,
                slippage_param: 0,
            })
            .await
            .unwrap();

        assert_eq!(outcome.event.event.name(), "TokensSwapped");
        // Funds moved through the default venue's spender.
        assert_eq!(
            h.ledger.balance(addr(WMATIC), spender_for(VenueTag::UniswapV2)),
            1_000
        );
    }

    #[tokio::test]
    async fn failed_venue_call_emits_no_event_and_changes_nothing() {
        let h = harness(None);
        // No approval: the venue's transfer step must fail.
        let err = h
            .dispatcher
            .swap_v2(request(&h, VenueTag::UniswapV2, 1_000, 0))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Execution(ExecutionError::InsufficientAllowance { .. })
        ));
        assert!(h.events.is_empty());
        assert_eq!(h.ledger.balance(addr(WMATIC), h.trader), 10_000_000);
    }

    #[tokio::test]
    async fn slippage_bound_violation_is_surfaced_opaquely() {
        let h = harness(None);
        approve(&h, VenueTag::UniswapV2, 1_000).await;

        let err = h
            .dispatcher
            .swap_v2(request(&h, VenueTag::UniswapV2, 1_000, 5_000))
            .await
            .unwrap_err();
        match err {
            AppError::Execution(ExecutionError::VenueExecutionFailed { venue, reason }) => {
                assert_eq!(venue, VenueTag::UniswapV2);
                assert!(reason.contains("insufficient output amount"));
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(h.events.is_empty());
    }

    #[tokio::test]
    async fn zero_amount_passes_through_to_the_venue() {
        let h = harness(None);
        approve(&h, VenueTag::UniswapV2, 10).await;

        let outcome = h
            .dispatcher
            .swap_v2(request(&h, VenueTag::UniswapV2, 0, 0))
            .await
            .unwrap();
        assert_eq!(outcome.amount_out, 0);
        assert_eq!(h.events.len(), 1);
    }

    #[tokio::test]
    async fn strict_guard_rejects_implausible_bounds_before_dispatch() {
        let guard = SlippageGuard::new(Arc::new(StaticPriceFeed::new(dec!(2))), dec!(5));
        let h = harness(Some(guard));
        approve(&h, VenueTag::UniswapV2, 1_000_000).await;

        // Bound is far below the feed-implied 2x output: rejected pre-dispatch.
        let err = h
            .dispatcher
            .swap_v2(request(&h, VenueTag::UniswapV2, 1_000_000, 10))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Execution(ExecutionError::SlippageOutOfRange { .. })
        ));
        assert!(h.events.is_empty());
        assert_eq!(h.ledger.balance(addr(WMATIC), h.trader), 10_000_000);

        // A tight bound passes the guard and settles.
        let outcome = h
            .dispatcher
            .swap_v2(request(&h, VenueTag::UniswapV2, 1_000_000, 1_950_000))
            .await
            .unwrap();
        assert_eq!(outcome.amount_out, 2_000_000);
    }

    #[tokio::test]
    async fn construction_rejects_missing_clients() {
        let registry = Arc::new(
            VenueRegistry::new(
                VenueTag::all()
                    .into_iter()
                    .map(|tag| VenueDescriptor::new(tag, spender_for(tag)))
                    .collect(),
            )
            .unwrap(),
        );
        let result = SwapDispatcher::new(
            registry,
            HashMap::new(),
            Arc::new(EventLog::new()),
            None,
            DispatchSettings {
                default_venue: VenueTag::UniswapV2,
                deadline_secs: 300,
                v3_fee: 3000,
            },
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
