//! Approval endpoints: authorize a venue's spender before swapping.

use axum::{extract::State, http::StatusCode, Json};

use crate::api::handler::AppState;
use crate::api::models::{parse_amount, validated, ApproveRequest, ApproveResponse, VenueApproveRequest};
use crate::error::AppResult;
use crate::types::Address;
use crate::venues::VenueTag;

/// POST /approve
/// Authorize the default venue's spender for the generic workflow path.
pub async fn approve_default(
    State(state): State<AppState>,
    Json(req): Json<ApproveRequest>,
) -> AppResult<(StatusCode, Json<ApproveResponse>)> {
    // 1. Validate shape
    let req = validated(req)?;

    // 2. Parse addresses and amount
    let owner: Address = req.owner.parse()?;
    let token: Address = req.token.parse()?;
    let amount = parse_amount(&req.amount)?;

    // 3. Issue the approval and record the event
    let event = state.approvals.approve_default(owner, token, amount).await?;

    Ok((StatusCode::CREATED, Json(ApproveResponse { event })))
}

/// POST /approve/venue
/// Authorize a specific venue's spender; the event name carries the venue.
pub async fn approve_for_venue(
    State(state): State<AppState>,
    Json(req): Json<VenueApproveRequest>,
) -> AppResult<(StatusCode, Json<ApproveResponse>)> {
    // 1. Validate shape
    let req = validated(req)?;

    // 2. Parse addresses and amount
    let owner: Address = req.owner.parse()?;
    let token: Address = req.token.parse()?;
    let amount = parse_amount(&req.amount)?;

    // 3. Convert the numeric tag at the trust boundary
    let venue = VenueTag::try_from(req.venue)?;

    // 4. Issue the approval and record the event
    let event = state
        .approvals
        .approve_for_venue(owner, token, amount, venue)
        .await?;

    Ok((StatusCode::CREATED, Json(ApproveResponse { event })))
}
