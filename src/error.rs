use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::types::Address;
use crate::venues::{CallVariant, VenueTag};

/// Top-level error type for the entire application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Routing error: {0}")]
    Routing(#[from] RoutingError),

    #[error("Approval error: {0}")]
    Approval(#[from] ApprovalError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Price feed error: {0}")]
    PriceFeed(#[from] PriceFeedError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Venue selection and tag validation errors
#[derive(Error, Debug)]
pub enum RoutingError {
    /// Numeric tag outside the closed venue enumeration. Only reachable for
    /// untrusted numeric input at the system boundary; enum-typed call sites
    /// cannot produce it.
    #[error("Unknown venue tag: {tag}")]
    UnknownVenue { tag: u8 },

    /// The caller invoked a venue-family entry point with a tag bound to a
    /// different family. Nothing external runs and no event is recorded.
    #[error("Please call a reasonable function")]
    VenueMismatch { entry: CallVariant, venue: VenueTag },
}

/// Approval lifecycle errors
#[derive(Error, Debug)]
pub enum ApprovalError {
    #[error("Token contract rejected approval of {token}")]
    Rejected { token: Address },
}

/// Errors surfaced by the external venue while executing a swap.
///
/// Allowance and balance shortfalls are reported verbatim from the token
/// contract; nothing here is retried, since resubmitting is a caller
/// decision once parameters may have moved.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Insufficient allowance: spender {spender} may draw {allowed}, required {required}")]
    InsufficientAllowance {
        spender: Address,
        allowed: u128,
        required: u128,
    },

    #[error("Insufficient balance: {owner} holds {held}, required {required}")]
    InsufficientBalance {
        owner: Address,
        held: u128,
        required: u128,
    },

    #[error("Swap failed on {venue}: {reason}")]
    VenueExecutionFailed { venue: VenueTag, reason: String },

    #[error("Minimum output {min_out} is implausible against reference price {reference}")]
    SlippageOutOfRange { min_out: u128, reference: String },
}

/// Reference price feed errors
#[derive(Error, Debug)]
pub enum PriceFeedError {
    #[error("Price feed unavailable: {0}")]
    Unavailable(String),

    #[error("Stale price: {age_secs}s old")]
    Stale { age_secs: i64 },
}

/// API error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match &self {
            AppError::Routing(RoutingError::UnknownVenue { tag }) => (
                StatusCode::BAD_REQUEST,
                "UNKNOWN_VENUE",
                format!("Unknown venue tag: {}", tag),
                Some(serde_json::json!({ "tag": tag })),
            ),
            AppError::Routing(RoutingError::VenueMismatch { entry, venue }) => (
                StatusCode::BAD_REQUEST,
                "VENUE_MISMATCH",
                // The fixed diagnostic callers match on.
                "Please call a reasonable function".to_string(),
                Some(serde_json::json!({
                    "entry": entry,
                    "venue": venue,
                })),
            ),
            AppError::Approval(inner @ ApprovalError::Rejected { token }) => (
                StatusCode::BAD_GATEWAY,
                "APPROVAL_REJECTED",
                inner.to_string(),
                Some(serde_json::json!({ "token": token })),
            ),
            AppError::Execution(
                inner @ ExecutionError::InsufficientAllowance { spender, allowed, required },
            ) => (
                StatusCode::CONFLICT,
                "INSUFFICIENT_ALLOWANCE",
                inner.to_string(),
                Some(serde_json::json!({
                    "spender": spender,
                    "allowed": allowed.to_string(),
                    "required": required.to_string(),
                })),
            ),
            AppError::Execution(
                inner @ ExecutionError::InsufficientBalance { owner, held, required },
            ) => (
                StatusCode::CONFLICT,
                "INSUFFICIENT_BALANCE",
                inner.to_string(),
                Some(serde_json::json!({
                    "owner": owner,
                    "held": held.to_string(),
                    "required": required.to_string(),
                })),
            ),
            AppError::Execution(inner @ ExecutionError::VenueExecutionFailed { venue, reason }) => (
                StatusCode::BAD_GATEWAY,
                "VENUE_EXECUTION_FAILED",
                inner.to_string(),
                Some(serde_json::json!({ "venue": venue, "reason": reason })),
            ),
            AppError::Execution(
                inner @ ExecutionError::SlippageOutOfRange { min_out, reference },
            ) => (
                StatusCode::BAD_REQUEST,
                "SLIPPAGE_OUT_OF_RANGE",
                inner.to_string(),
                Some(serde_json::json!({
                    "min_out": min_out.to_string(),
                    "reference": reference,
                })),
            ),
            AppError::PriceFeed(inner) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "PRICE_FEED_UNAVAILABLE",
                inner.to_string(),
                None,
            ),
            AppError::InvalidInput(message) => (
                StatusCode::BAD_REQUEST,
                "INVALID_INPUT",
                format!("Invalid input: {}", message),
                None,
            ),
            AppError::InvalidAddress(address) => (
                StatusCode::BAD_REQUEST,
                "INVALID_ADDRESS",
                format!("Invalid address: {}", address),
                None,
            ),
            AppError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("Not found: {}", what),
                None,
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
                None,
            ),
        };

        let body = Json(ErrorResponse {
            error: message,
            error_code: error_code.to_string(),
            details,
        });

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal(format!("Error converting: {:?}", error))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        AppError::PriceFeed(PriceFeedError::Unavailable(format!(
            "HTTP request error: {:?}",
            error
        )))
    }
}

/// Result type alias for the application
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn venue_mismatch_carries_the_fixed_diagnostic() {
        let err = RoutingError::VenueMismatch {
            entry: CallVariant::V2Style,
            venue: VenueTag::UniswapV3,
        };
        assert_eq!(err.to_string(), "Please call a reasonable function");
    }

    #[test]
    fn unknown_venue_names_the_offending_tag() {
        let err = RoutingError::UnknownVenue { tag: 9 };
        assert_eq!(err.to_string(), "Unknown venue tag: 9");
    }
}
