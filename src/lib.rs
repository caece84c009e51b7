//! # foxtrot - Foxtrot card-payment gateway SDK
//!
//! A Rust client for the Foxtrot gateway. It builds signed form-encoded
//! deposit and refund requests, sends them, classifies the gateway's status
//! codes and verifies the signature of inbound callbacks.

pub mod classifier;
pub mod client;
pub mod config;
pub mod crypto;
pub mod error;
pub mod input;
pub mod payload;
pub mod types;

// Re-exports for convenience
pub use classifier::Outcome;
pub use client::{FoxtrotClient, GatewayReply};
pub use config::ClientConfig;
pub use error::{FoxtrotError, Result};
pub use input::InputSource;
pub use types::*;

/// Current version of the foxtrot library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(codes::SUCCESS, "P0001");
        assert_eq!(codes::FAILED, "P0002");
        assert_eq!(codes::PENDING, "P0004");
        assert_eq!(codes::PAYMENT_SUCCESS, "S0001");
        assert_eq!(codes::PAYMENT_FAILED, "S0002");
        assert_eq!(codes::PAYMENT_PENDING, "S0003");
        assert_eq!(codes::CHARGEBACK, "S0007");
        assert_eq!(codes::REFUND_SUCCESS, "S0004");
        assert_eq!(codes::REFUND_FAILED, "S0005");
        assert_eq!(codes::REFUNDED, "C0029");
        assert_eq!(codes::REFUND_PENDING, "S0006");
        assert_eq!(codes::SIGNATURE_ERROR, "C0014");
    }

    #[test]
    fn test_wire_constants() {
        assert_eq!(PRODUCT_INFO, "PayStage");
        assert_eq!(LANGUAGE, "EN");
        assert_eq!(client::DEPOSIT_PATH, "/carespay/pay");
        assert_eq!(client::REFUND_PATH, "/refund");
    }
}
