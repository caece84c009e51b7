//! Error types for the Foxtrot SDK

use crate::types::{GatewayResponse, OutboundPayload};
use thiserror::Error;

/// Result type alias for Foxtrot operations
pub type Result<T> = std::result::Result<T, FoxtrotError>;

/// Main error type for Foxtrot operations
#[derive(Error, Debug)]
pub enum FoxtrotError {
    /// An operation was attempted before a vault was set
    #[error("[Foxtrot] vault is not set")]
    PreconditionFailed,

    /// The supplied vault is missing a field or carries a malformed one
    #[error("Invalid credentials: {message}")]
    InvalidCredentials { message: String },

    /// A request field is missing or malformed
    #[error("Validation failed for `{field}`: {message}")]
    ValidationFailed { field: String, message: String },

    /// No numeric gateway code exists for the currency
    #[error("currency is not supported {currency}")]
    UnsupportedCurrency { currency: String },

    /// The gateway answered with a non-2xx status
    #[error("Transport failed with status {}: {}", .0.status, .0.message)]
    TransportFailed(Box<TransportFailure>),

    /// The gateway answered 2xx with a body that is not a response object
    #[error("Invalid gateway response with status {}: {}", .0.status, .0.message)]
    InvalidResponse(Box<TransportFailure>),

    /// HTTP client error (connect, timeout, body decoding)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered 2xx but the business status is a failure
    #[error("Gateway rejected the request: {}", .0.message)]
    GatewayRejected(Box<GatewayRejection>),

    /// An inbound callback signature did not match
    #[error("[Foxtrot Care] invalid signature received, transaction number: {transaction_number}")]
    SignatureMismatch { transaction_number: String },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Details of a non-2xx gateway answer
#[derive(Debug, Clone)]
pub struct TransportFailure {
    /// HTTP status code
    pub status: u16,
    /// Message from the body, a generic fallback, or the parse error
    pub message: String,
    /// Raw body as returned by the gateway
    pub body: String,
    /// Form that was sent
    pub payload: Option<OutboundPayload>,
}

/// Details of a business-level rejection
#[derive(Debug, Clone)]
pub struct GatewayRejection {
    /// Form that was sent
    pub payload: OutboundPayload,
    /// Parsed gateway response
    pub response: GatewayResponse,
    /// Human-readable message, `"{message} ({code})"`
    pub message: String,
    /// Whether the merchant can correct the request and retry
    pub fixable: bool,
}

impl FoxtrotError {
    /// Create an invalid credentials error
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::InvalidCredentials {
            message: message.into(),
        }
    }

    /// Create a validation error for a named field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported currency error
    pub fn unsupported_currency(currency: impl Into<String>) -> Self {
        Self::UnsupportedCurrency {
            currency: currency.into(),
        }
    }

    /// Create a signature mismatch error
    pub fn signature_mismatch(transaction_number: impl Into<String>) -> Self {
        Self::SignatureMismatch {
            transaction_number: transaction_number.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the failure happened at the transport level
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::TransportFailed(_) | Self::Http(_))
    }

    /// Whether the gateway flagged the failure as correctable by the merchant
    pub fn is_fixable(&self) -> bool {
        match self {
            Self::GatewayRejected(rejection) => rejection.fixable,
            _ => false,
        }
    }

    /// Raw gateway answer, for transport failures and unparseable replies
    pub fn transport_failure(&self) -> Option<&TransportFailure> {
        match self {
            Self::TransportFailed(failure) | Self::InvalidResponse(failure) => Some(failure),
            _ => None,
        }
    }

    /// The rejection details, if this is a gateway rejection
    pub fn rejection(&self) -> Option<&GatewayRejection> {
        match self {
            Self::GatewayRejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}
