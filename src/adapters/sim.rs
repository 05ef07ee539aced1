//! In-memory stand-in for the external ledger: token balances, allowances
//! and AMM venues quoting at fixed per-pair rates.
//!
//! Backs the dev server and the test suite. Real venue connectors plug in
//! behind the same traits; nothing above this module knows the difference.
//! Every settlement commits under a single write lock, which is what makes
//! the venue-call atomicity precondition hold here.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::adapters::traits::{
    AggregatorRouter, ExactInputSingleParams, TokenGateway, V2StyleRouter, V3StyleRouter,
};
use crate::error::{AppResult, ExecutionError};
use crate::types::Address;
use crate::venues::VenueTag;

#[derive(Default)]
struct LedgerState {
    /// (token, owner) -> balance. Venue reserves are ordinary balances held
    /// by the venue's spender address.
    balances: HashMap<(Address, Address), u128>,
    /// (token, owner, spender) -> remaining allowance. Overwrite semantics.
    allowances: HashMap<(Address, Address, Address), u128>,
    /// (token_in, token_out) -> output units per input unit.
    rates: HashMap<(Address, Address), Decimal>,
}

/// Simulated external ledger shared by every sim venue.
#[derive(Default)]
pub struct SimLedger {
    state: RwLock<LedgerState>,
}

impl SimLedger {
    pub fn new() -> Self {
        SimLedger::default()
    }

    pub fn mint(&self, token: Address, owner: Address, amount: u128) {
        let mut state = self.state.write();
        *state.balances.entry((token, owner)).or_insert(0) += amount;
    }

    pub fn burn(&self, token: Address, owner: Address, amount: u128) -> AppResult<()> {
        let mut state = self.state.write();
        let held = state.balances.get(&(token, owner)).copied().unwrap_or(0);
        if held < amount {
            return Err(ExecutionError::InsufficientBalance {
                owner,
                held,
                required: amount,
            }
            .into());
        }
        state.balances.insert((token, owner), held - amount);
        Ok(())
    }

    pub fn set_rate(&self, token_in: Address, token_out: Address, rate: Decimal) {
        self.state.write().rates.insert((token_in, token_out), rate);
    }

    pub fn balance(&self, token: Address, owner: Address) -> u128 {
        self.state.read().balances.get(&(token, owner)).copied().unwrap_or(0)
    }

    pub fn remaining_allowance(&self, token: Address, owner: Address, spender: Address) -> u128 {
        self.state
            .read()
            .allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or(0)
    }

    /// Execute one swap against a venue, all-or-nothing: every check runs
    /// before any balance or allowance moves, under one write lock.
    fn settle_swap(
        &self,
        venue: VenueTag,
        spender: Address,
        trader: Address,
        token_in: Address,
        token_out: Address,
        amount_in: u128,
        min_out: u128,
        recipient: Address,
    ) -> AppResult<u128> {
        let mut state = self.state.write();

        let rate = state.rates.get(&(token_in, token_out)).copied().ok_or_else(|| {
            ExecutionError::VenueExecutionFailed {
                venue,
                reason: format!("no liquidity for pair {token_in}/{token_out}"),
            }
        })?;
        let amount_out = quote(venue, rate, amount_in)?;
        if amount_out < min_out {
            return Err(ExecutionError::VenueExecutionFailed {
                venue,
                reason: format!("insufficient output amount: {amount_out} < {min_out}"),
            }
            .into());
        }

        let allowed = state
            .allowances
            .get(&(token_in, trader, spender))
            .copied()
            .unwrap_or(0);
        if allowed < amount_in {
            return Err(ExecutionError::InsufficientAllowance {
                spender,
                allowed,
                required: amount_in,
            }
            .into());
        }

        let held_in = state.balances.get(&(token_in, trader)).copied().unwrap_or(0);
        if held_in < amount_in {
            return Err(ExecutionError::InsufficientBalance {
                owner: trader,
                held: held_in,
                required: amount_in,
            }
            .into());
        }

        let reserve = state.balances.get(&(token_out, spender)).copied().unwrap_or(0);
        if reserve < amount_out {
            return Err(ExecutionError::VenueExecutionFailed {
                venue,
                reason: format!("insufficient liquidity: reserve {reserve} < {amount_out}"),
            }
            .into());
        }

        // Commit: consume allowance, move input to the venue, pay output out.
        state
            .allowances
            .insert((token_in, trader, spender), allowed - amount_in);
        state.balances.insert((token_in, trader), held_in - amount_in);
        *state.balances.entry((token_in, spender)).or_insert(0) += amount_in;
        state.balances.insert((token_out, spender), reserve - amount_out);
        *state.balances.entry((token_out, recipient)).or_insert(0) += amount_out;

        Ok(amount_out)
    }
}

fn quote(venue: VenueTag, rate: Decimal, amount_in: u128) -> AppResult<u128> {
    let amount = Decimal::from_u128(amount_in).ok_or_else(|| ExecutionError::VenueExecutionFailed {
        venue,
        reason: format!("amount {amount_in} exceeds simulated range"),
    })?;
    (amount * rate)
        .floor()
        .to_u128()
        .ok_or_else(|| {
            ExecutionError::VenueExecutionFailed {
                venue,
                reason: "quoted output exceeds simulated range".to_string(),
            }
            .into()
        })
}

#[async_trait]
impl TokenGateway for SimLedger {
    async fn approve(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: u128,
    ) -> AppResult<bool> {
        // Overwrite, never accumulate: standard allowance semantics.
        self.state.write().allowances.insert((token, owner, spender), amount);
        Ok(true)
    }

    async fn transfer_from(
        &self,
        token: Address,
        spender: Address,
        owner: Address,
        dest: Address,
        amount: u128,
    ) -> AppResult<bool> {
        let mut state = self.state.write();
        let allowed = state
            .allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or(0);
        if allowed < amount {
            return Err(ExecutionError::InsufficientAllowance {
                spender,
                allowed,
                required: amount,
            }
            .into());
        }
        let held = state.balances.get(&(token, owner)).copied().unwrap_or(0);
        if held < amount {
            return Err(ExecutionError::InsufficientBalance {
                owner,
                held,
                required: amount,
            }
            .into());
        }
        state.allowances.insert((token, owner, spender), allowed - amount);
        state.balances.insert((token, owner), held - amount);
        *state.balances.entry((token, dest)).or_insert(0) += amount;
        Ok(true)
    }

    async fn balance_of(&self, token: Address, owner: Address) -> AppResult<u128> {
        Ok(self.balance(token, owner))
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> AppResult<u128> {
        Ok(self.remaining_allowance(token, owner, spender))
    }
}

/// V2-style sim venue: two-token path, relative deadline.
pub struct SimV2Router {
    ledger: Arc<SimLedger>,
    venue: VenueTag,
    spender: Address,
}

impl SimV2Router {
    pub fn new(ledger: Arc<SimLedger>, venue: VenueTag, spender: Address) -> Self {
        SimV2Router { ledger, venue, spender }
    }
}

#[async_trait]
impl V2StyleRouter for SimV2Router {
    async fn swap_exact_tokens_for_tokens(
        &self,
        trader: Address,
        amount_in: u128,
        amount_out_min: u128,
        path: Vec<Address>,
        to: Address,
        deadline: u64,
    ) -> AppResult<Vec<u128>> {
        if path.len() != 2 {
            return Err(ExecutionError::VenueExecutionFailed {
                venue: self.venue,
                reason: format!("unsupported path length {}", path.len()),
            }
            .into());
        }
        if deadline < Utc::now().timestamp() as u64 {
            return Err(ExecutionError::VenueExecutionFailed {
                venue: self.venue,
                reason: "deadline expired".to_string(),
            }
            .into());
        }
        let amount_out = self.ledger.settle_swap(
            self.venue,
            self.spender,
            trader,
            path[0],
            path[1],
            amount_in,
            amount_out_min,
            to,
        )?;
        Ok(vec![amount_in, amount_out])
    }
}

/// V3-style sim venue: single-hop exact input. The fee tier selects no pool
/// here; the sim quotes one rate per pair.
pub struct SimV3Router {
    ledger: Arc<SimLedger>,
    venue: VenueTag,
    spender: Address,
}

impl SimV3Router {
    pub fn new(ledger: Arc<SimLedger>, venue: VenueTag, spender: Address) -> Self {
        SimV3Router { ledger, venue, spender }
    }
}

#[async_trait]
impl V3StyleRouter for SimV3Router {
    async fn exact_input_single(
        &self,
        trader: Address,
        params: ExactInputSingleParams,
    ) -> AppResult<u128> {
        self.ledger.settle_swap(
            self.venue,
            self.spender,
            trader,
            params.token_in,
            params.token_out,
            params.amount_in,
            params.amount_out_minimum,
            params.recipient,
        )
    }
}

/// Aggregator-style sim venue.
pub struct SimAggregator {
    ledger: Arc<SimLedger>,
    venue: VenueTag,
    spender: Address,
}

impl SimAggregator {
    pub fn new(ledger: Arc<SimLedger>, venue: VenueTag, spender: Address) -> Self {
        SimAggregator { ledger, venue, spender }
    }
}

#[async_trait]
impl AggregatorRouter for SimAggregator {
    async fn swap(
        &self,
        trader: Address,
        src: Address,
        dst: Address,
        amount: u128,
        min_return: u128,
    ) -> AppResult<u128> {
        self.ledger
            .settle_swap(self.venue, self.spender, trader, src, dst, amount, min_return, trader)
    }
}
