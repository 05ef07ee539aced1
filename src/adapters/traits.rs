use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::types::Address;
use crate::venues::{CallVariant, VenueTag};

/// External token contract boundary (ERC20-style allowance ledger).
///
/// An approval OVERWRITES the previous allowance for the (owner, spender)
/// pair on that token; this layer never tracks running totals. Two approvals
/// issued concurrently for the same triple race at the token contract, not
/// here; callers sequence approve before swap.
#[async_trait]
pub trait TokenGateway: Send + Sync {
    /// Let `spender` draw up to `amount` of `token` from `owner`.
    async fn approve(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: u128,
    ) -> AppResult<bool>;

    /// Move `amount` of `token` from `owner` to `dest`, consuming
    /// `spender`'s allowance.
    async fn transfer_from(
        &self,
        token: Address,
        spender: Address,
        owner: Address,
        dest: Address,
        amount: u128,
    ) -> AppResult<bool>;

    async fn balance_of(&self, token: Address, owner: Address) -> AppResult<u128>;

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> AppResult<u128>;
}

/// Swap parameters as received by a venue-specific entry point. Transient:
/// lives only for the duration of one dispatch call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapRequest {
    pub trader: Address,
    pub token_in: Address,
    pub token_out: Address,
    #[serde(with = "crate::types::amount")]
    pub amount_in: u128,
    pub venue: VenueTag,
    /// Minimum acceptable output, forwarded unmodified; the venue enforces it.
    #[serde(with = "crate::types::amount")]
    pub slippage_param: u128,
}

/// Single-hop exact-input call shape for V3-style venues.
#[derive(Debug, Clone)]
pub struct ExactInputSingleParams {
    pub token_in: Address,
    pub token_out: Address,
    pub fee: u32,
    pub recipient: Address,
    pub amount_in: u128,
    pub amount_out_minimum: u128,
}

/// V2-family router interface (Uniswap V2 and its forks).
///
/// PRECONDITION: the call is atomic. It either settles fully or leaves no
/// side effect on the external ledger. The dispatcher relies on this to
/// guarantee that a failed swap emits no event and changes no state.
#[async_trait]
pub trait V2StyleRouter: Send + Sync {
    async fn swap_exact_tokens_for_tokens(
        &self,
        trader: Address,
        amount_in: u128,
        amount_out_min: u128,
        path: Vec<Address>,
        to: Address,
        deadline: u64,
    ) -> AppResult<Vec<u128>>;
}

/// V3-family router interface. Same atomicity precondition as V2.
#[async_trait]
pub trait V3StyleRouter: Send + Sync {
    async fn exact_input_single(
        &self,
        trader: Address,
        params: ExactInputSingleParams,
    ) -> AppResult<u128>;
}

/// Aggregator router interface. Same atomicity precondition as V2.
#[async_trait]
pub trait AggregatorRouter: Send + Sync {
    async fn swap(
        &self,
        trader: Address,
        src: Address,
        dst: Address,
        amount: u128,
        min_return: u128,
    ) -> AppResult<u128>;
}

/// The concrete call interface wired behind one venue tag. A sum type so
/// dispatch over call variants is exhaustive at compile time.
#[derive(Clone)]
pub enum VenueClient {
    V2(Arc<dyn V2StyleRouter>),
    V3(Arc<dyn V3StyleRouter>),
    Aggregator(Arc<dyn AggregatorRouter>),
}

impl VenueClient {
    pub fn call_variant(&self) -> CallVariant {
        match self {
            VenueClient::V2(_) => CallVariant::V2Style,
            VenueClient::V3(_) => CallVariant::V3Style,
            VenueClient::Aggregator(_) => CallVariant::AggregatorStyle,
        }
    }
}
