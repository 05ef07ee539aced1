use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use crate::{
    adapters::{
        sim::{SimAggregator, SimLedger, SimV2Router, SimV3Router},
        traits::VenueClient,
    },
    api::handler::AppState,
    approvals::ApprovalManager,
    config::Config,
    dispatch::{slippage::SlippageGuard, DispatchSettings, SwapDispatcher},
    error::{AppError, AppResult},
    events::EventLog,
    pricefeed::{HttpPriceFeed, PriceFeed},
    types::Address,
    venues::{CallVariant, VenueDescriptor, VenueRegistry, VenueTag},
};

pub fn initialize_app_state(config: &Config) -> AppResult<AppState> {
    info!("Initializing application components ...");

    // Venue registry: one descriptor per tag, fixed for the process lifetime
    let registry = Arc::new(VenueRegistry::new(vec![
        VenueDescriptor::new(VenueTag::Apeswap, parse_spender("APESWAP_SPENDER", &config.apeswap_spender)?),
        VenueDescriptor::new(VenueTag::UniswapV2, parse_spender("UNISWAP_V2_SPENDER", &config.uniswap_v2_spender)?),
        VenueDescriptor::new(VenueTag::UniswapV3, parse_spender("UNISWAP_V3_SPENDER", &config.uniswap_v3_spender)?),
        VenueDescriptor::new(VenueTag::Sushiswap, parse_spender("SUSHISWAP_SPENDER", &config.sushiswap_spender)?),
        VenueDescriptor::new(VenueTag::OneInch, parse_spender("ONE_INCH_SPENDER", &config.one_inch_spender)?),
    ])?);
    info!("✅ Venue registry initialized: {:?}", VenueTag::all());

    // The generic workflow path's fixed target, validated at the boundary
    let default_venue = VenueTag::try_from(config.default_venue)?;

    // Append-only event log: the system of record for swap history
    let events = Arc::new(EventLog::new());
    info!("✅ Event log initialized (append-only)");

    // In-memory ledger stands in for the external token contracts and AMM
    // venues behind the collaborator traits
    let ledger = Arc::new(SimLedger::new());
    let mut clients: HashMap<VenueTag, VenueClient> = HashMap::new();
    for tag in VenueTag::all() {
        let spender = registry.resolve(tag)?.spender;
        let client = match tag.call_variant() {
            CallVariant::V2Style => {
                VenueClient::V2(Arc::new(SimV2Router::new(ledger.clone(), tag, spender)))
            }
            CallVariant::V3Style => {
                VenueClient::V3(Arc::new(SimV3Router::new(ledger.clone(), tag, spender)))
            }
            CallVariant::AggregatorStyle => {
                VenueClient::Aggregator(Arc::new(SimAggregator::new(ledger.clone(), tag, spender)))
            }
        };
        clients.insert(tag, client);
        info!("✅ {} venue client registered ({})", tag, tag.call_variant());
    }

    // Reference price feed (optional; required for the strict slippage check)
    let price_feed: Option<Arc<dyn PriceFeed>> = config.price_feed_url.as_ref().map(|url| {
        info!("✅ Reference price feed: {}", url);
        Arc::new(HttpPriceFeed::new(url.clone(), config.price_max_age_secs)) as Arc<dyn PriceFeed>
    });

    let guard = if config.strict_slippage {
        let feed = price_feed.clone().ok_or_else(|| {
            AppError::Config("STRICT_SLIPPAGE requires PRICE_FEED_URL".to_string())
        })?;
        let max_pct = Decimal::from_str(&config.max_slippage_pct)
            .map_err(|e| AppError::Config(format!("MAX_SLIPPAGE_PCT: {e}")))?;
        info!("✅ Strict slippage pre-check enabled (max {}%)", max_pct);
        Some(SlippageGuard::new(feed, max_pct))
    } else {
        None
    };

    let approvals = Arc::new(ApprovalManager::new(
        registry.clone(),
        ledger.clone(),
        events.clone(),
        default_venue,
    ));
    info!("✅ Approval manager initialized (default venue: {})", default_venue);

    let dispatcher = Arc::new(SwapDispatcher::new(
        registry.clone(),
        clients,
        events.clone(),
        guard,
        DispatchSettings {
            default_venue,
            deadline_secs: config.swap_deadline_secs,
            v3_fee: config.v3_fee_tier,
        },
    )?);
    info!("✅ Swap dispatcher initialized");

    Ok(AppState {
        registry,
        approvals,
        dispatcher,
        events,
        price_feed,
    })
}

fn parse_spender(name: &str, value: &str) -> AppResult<Address> {
    value
        .parse()
        .map_err(|_: AppError| AppError::Config(format!("{name} is not a valid address: {value}")))
}
