use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    api::{
        approvals::{approve_default, approve_for_venue},
        events::{list_events, stream_events},
        handler::{get_reference_price, health_check, list_venues, AppState},
        swaps::{swap_generic, swap_on_aggregator, swap_on_v2, swap_on_v3},
    },
    middleware::rate_limit::{enforce_rate_limit, RateLimit},
};

pub fn create_app(state: AppState, rate_limit: Arc<RateLimit>) -> Router {
    info!("⚙️ Setting up HTTP routes...");

    let app = Router::new()
        // Public health check endpoint
        .route("/health", get(health_check))
        // API v1 routes
        .nest(
            "/api/v1",
            Router::new()
                // Venue discovery
                .route("/venues", get(list_venues))
                // Approval endpoints
                .route("/approve", post(approve_default))
                .route("/approve/venue", post(approve_for_venue))
                // Swap entry points, one per venue family
                .route("/swap", post(swap_generic))
                .route("/swap/v2", post(swap_on_v2))
                .route("/swap/v3", post(swap_on_v3))
                .route("/swap/aggregator", post(swap_on_aggregator))
                // Event log
                .route("/events", get(list_events))
                .route("/events/stream", get(stream_events))
                // Reference price feed
                .route("/price", get(get_reference_price))
                .layer(axum_middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                )),
        )
        .layer(CompressionLayer::new())
        .layer(CorsLayer::very_permissive())
        // Add request tracing
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("✓ HTTP routes configured");
    app
}

pub async fn run_server(app: Router, bind_address: &str) -> Result<(), Box<dyn std::error::Error>> {
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    info!("🌐 Server listening on: {}", bind_address);

    axum::serve(listener, app).await?;
    Ok(())
}
