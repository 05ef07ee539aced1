use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swap_resolver::middleware::rate_limit::RateLimit;
use swap_resolver::{bootstrap, config, server};

// Initialize logging and tracing
fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,tower_http=debug,swap_resolver=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    init_tracing();

    info!("🚀 Starting Multi-Venue Swap Resolver");

    // Load configuration
    dotenv::dotenv().ok();
    let config = config::Config::from_env()?;

    let state = bootstrap::initialize_app_state(&config)?;
    let rate_limit = Arc::new(RateLimit::new(config.rate_limit_per_minute, 60));

    // Create HTTP server
    let app = server::create_app(state, rate_limit);

    // Run the Server
    server::run_server(app, &config.bind_address).await?;

    Ok(())
}
