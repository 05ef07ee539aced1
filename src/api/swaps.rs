//! Swap entry points, one per venue family plus the generic workflow path.
//!
//! Family binding lives in the dispatcher; these handlers only parse the
//! wire shapes and convert the numeric tag at the trust boundary.

use axum::{extract::State, Json};

use crate::adapters::traits::SwapRequest;
use crate::api::handler::AppState;
use crate::api::models::{parse_amount, validated, GenericSwapRequest, SwapResponse, VenueSwapRequest};
use crate::dispatch::{GenericSwapParams, SwapOutcome};
use crate::error::AppResult;
use crate::types::Address;
use crate::venues::VenueTag;

/// POST /swap
/// Generic workflow path: always the configured default venue.
pub async fn swap_generic(
    State(state): State<AppState>,
    Json(req): Json<GenericSwapRequest>,
) -> AppResult<Json<SwapResponse>> {
    // 1. Validate shape and parse
    let req = validated(req)?;
    let params = GenericSwapParams {
        trader: req.trader.parse()?,
        token_in: req.token_in.parse()?,
        token_out: req.token_out.parse()?,
        amount_in: parse_amount(&req.amount_in)?,
        slippage_param: parse_amount(&req.slippage_param)?,
    };

    // 2. Dispatch
    let outcome = state.dispatcher.swap(params).await?;
    Ok(Json(respond(outcome)))
}

/// POST /swap/v2
pub async fn swap_on_v2(
    State(state): State<AppState>,
    Json(req): Json<VenueSwapRequest>,
) -> AppResult<Json<SwapResponse>> {
    let request = into_request(req)?;
    let outcome = state.dispatcher.swap_v2(request).await?;
    Ok(Json(respond(outcome)))
}

/// POST /swap/v3
pub async fn swap_on_v3(
    State(state): State<AppState>,
    Json(req): Json<VenueSwapRequest>,
) -> AppResult<Json<SwapResponse>> {
    let request = into_request(req)?;
    let outcome = state.dispatcher.swap_v3(request).await?;
    Ok(Json(respond(outcome)))
}

/// POST /swap/aggregator
pub async fn swap_on_aggregator(
    State(state): State<AppState>,
    Json(req): Json<VenueSwapRequest>,
) -> AppResult<Json<SwapResponse>> {
    let request = into_request(req)?;
    let outcome = state.dispatcher.swap_aggregator(request).await?;
    Ok(Json(respond(outcome)))
}

fn into_request(req: VenueSwapRequest) -> AppResult<SwapRequest> {
    // 1. Validate shape
    let req = validated(req)?;

    // 2. Parse addresses and amounts
    let trader: Address = req.trader.parse()?;
    let token_in: Address = req.token_in.parse()?;
    let token_out: Address = req.token_out.parse()?;
    let amount_in = parse_amount(&req.amount_in)?;
    let slippage_param = parse_amount(&req.slippage_param)?;

    // 3. Convert the numeric tag at the trust boundary
    let venue = VenueTag::try_from(req.venue)?;

    Ok(SwapRequest {
        trader,
        token_in,
        token_out,
        amount_in,
        venue,
        slippage_param,
    })
}

fn respond(outcome: SwapOutcome) -> SwapResponse {
    SwapResponse {
        amount_out: outcome.amount_out.to_string(),
        event: outcome.event,
    }
}
