//! Approval lifecycle: authorize a venue's spender to draw a trader's
//! tokens, then record the committed approval in the event log.
//!
//! The allowance itself lives in the external token contract; this manager
//! only triggers the transition and never tracks running totals.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::adapters::traits::TokenGateway;
use crate::error::{AppResult, ApprovalError};
use crate::events::{ApprovalDetails, EventLog, EventRecord, SwapEvent};
use crate::types::Address;
use crate::venues::{VenueRegistry, VenueTag};

pub struct ApprovalManager {
    registry: Arc<VenueRegistry>,
    tokens: Arc<dyn TokenGateway>,
    events: Arc<EventLog>,
    default_venue: VenueTag,
}

impl ApprovalManager {
    pub fn new(
        registry: Arc<VenueRegistry>,
        tokens: Arc<dyn TokenGateway>,
        events: Arc<EventLog>,
        default_venue: VenueTag,
    ) -> Self {
        ApprovalManager {
            registry,
            tokens,
            events,
            default_venue,
        }
    }

    /// Generic-path approval: always targets the configured default venue.
    #[instrument(skip(self), fields(%owner, %token, amount))]
    pub async fn approve_default(
        &self,
        owner: Address,
        token: Address,
        amount: u128,
    ) -> AppResult<EventRecord> {
        let spender = self.registry.resolve(self.default_venue)?.spender;
        self.issue(owner, token, amount, spender).await?;
        Ok(self.events.append(SwapEvent::TokensSwapApproved(ApprovalDetails {
            spender,
            token,
            amount,
        })))
    }

    /// Venue-selected approval; the emitted event name carries the venue.
    #[instrument(skip(self), fields(%owner, %token, amount, %venue))]
    pub async fn approve_for_venue(
        &self,
        owner: Address,
        token: Address,
        amount: u128,
        venue: VenueTag,
    ) -> AppResult<EventRecord> {
        let spender = self.registry.resolve(venue)?.spender;
        self.issue(owner, token, amount, spender).await?;
        Ok(self.events.append(SwapEvent::approved_on(
            venue,
            ApprovalDetails { spender, token, amount },
        )))
    }

    // A single external call; failure propagates unchanged, no retry, and
    // nothing is recorded unless the token contract commits.
    async fn issue(
        &self,
        owner: Address,
        token: Address,
        amount: u128,
        spender: Address,
    ) -> AppResult<()> {
        let accepted = self.tokens.approve(token, owner, spender, amount).await?;
        if !accepted {
            return Err(ApprovalError::Rejected { token }.into());
        }
        info!(%spender, %token, amount, "approval committed");
        Ok(())
    }
}
