use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::events::EventRecord;
use crate::types::Address;
use crate::venues::{CallVariant, VenueTag};

// ========== REQUEST MODELS ==========

/// Generic-path approval: the default venue's spender is authorized.
#[derive(Debug, Deserialize, Validate)]
pub struct ApproveRequest {
    pub owner: String,
    pub token: String,
    #[validate(length(min = 1, message = "amount is required"))]
    pub amount: String,
}

/// Venue-selected approval. The venue crosses the wire as its numeric tag.
#[derive(Debug, Deserialize, Validate)]
pub struct VenueApproveRequest {
    pub owner: String,
    pub token: String,
    #[validate(length(min = 1, message = "amount is required"))]
    pub amount: String,
    pub venue: u8,
}

/// Generic workflow path swap: no venue tag.
#[derive(Debug, Deserialize, Validate)]
pub struct GenericSwapRequest {
    pub trader: String,
    pub token_in: String,
    pub token_out: String,
    #[validate(length(min = 1, message = "amount_in is required"))]
    pub amount_in: String,
    #[validate(length(min = 1, message = "slippage_param is required"))]
    pub slippage_param: String,
}

/// Venue-family swap entry: the numeric tag must match the entry's family.
#[derive(Debug, Deserialize, Validate)]
pub struct VenueSwapRequest {
    pub trader: String,
    pub token_in: String,
    pub token_out: String,
    #[validate(length(min = 1, message = "amount_in is required"))]
    pub amount_in: String,
    #[validate(length(min = 1, message = "slippage_param is required"))]
    pub slippage_param: String,
    pub venue: u8,
}

// ========== RESPONSE MODELS ==========

#[derive(Debug, Serialize)]
pub struct ApproveResponse {
    pub event: EventRecord,
}

#[derive(Debug, Serialize)]
pub struct SwapResponse {
    pub amount_out: String,
    pub event: EventRecord,
}

#[derive(Debug, Serialize)]
pub struct VenueListing {
    pub tag: u8,
    pub name: &'static str,
    pub spender: Address,
    pub call_variant: CallVariant,
}

impl VenueListing {
    pub fn new(tag: VenueTag, spender: Address) -> Self {
        VenueListing {
            tag: tag.as_u8(),
            name: tag.as_str(),
            spender,
            call_variant: tag.call_variant(),
        }
    }
}

// ========== PARSING HELPERS ==========

pub(crate) fn parse_amount(value: &str) -> AppResult<u128> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("invalid amount: {value}")))
}

pub(crate) fn validated<T: Validate>(request: T) -> AppResult<T> {
    request
        .validate()
        .map_err(|e| AppError::InvalidInput(format!("Validation failed: {e}")))?;
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_parse_as_base_units() {
        assert_eq!(parse_amount("1200000000000000").unwrap(), 1_200_000_000_000_000);
        assert_eq!(parse_amount(" 42 ").unwrap(), 42);
        assert!(parse_amount("1.5").is_err());
        assert!(parse_amount("-3").is_err());
        assert!(parse_amount("").is_err());
    }

    #[test]
    fn empty_amounts_fail_validation() {
        let request = ApproveRequest {
            owner: "0x6EB662716e3FF6e035Fc0c629eFD672dCb7b0341".to_string(),
            token: "0x9c3C9283D3e44854697Cd22D3Faa240Cfb032889".to_string(),
            amount: String::new(),
        };
        assert!(validated(request).is_err());
    }
}
