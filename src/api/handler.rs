use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::api::models::VenueListing;
use crate::approvals::ApprovalManager;
use crate::dispatch::SwapDispatcher;
use crate::error::{AppError, AppResult};
use crate::events::EventLog;
use crate::pricefeed::{PriceFeed, PricePoint};
use crate::venues::VenueRegistry;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<VenueRegistry>,
    pub approvals: Arc<ApprovalManager>,
    pub dispatcher: Arc<SwapDispatcher>,
    pub events: Arc<EventLog>,
    pub price_feed: Option<Arc<dyn PriceFeed>>,
}

/// GET /health
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "swap-resolver",
        "timestamp": Utc::now(),
    }))
}

/// GET /venues
/// The registry listing: tag, name, spender and call interface per venue.
pub async fn list_venues(State(state): State<AppState>) -> AppResult<Json<Vec<VenueListing>>> {
    let listings = state
        .registry
        .descriptors()
        .into_iter()
        .map(|d| VenueListing::new(d.tag, d.spender))
        .collect();
    Ok(Json(listings))
}

/// GET /price
/// Readout of the reference feed backing the slippage sanity check.
pub async fn get_reference_price(State(state): State<AppState>) -> AppResult<Json<PricePoint>> {
    let feed = state
        .price_feed
        .as_ref()
        .ok_or_else(|| AppError::NotFound("no reference price feed configured".to_string()))?;
    Ok(Json(feed.latest_price().await?))
}
