//! Classification of gateway responses

use crate::types::{codes, GatewayResponse};
use std::fmt;
use std::sync::Arc;

/// Type alias for the "fixable via merchant" policy: response code -> fixable
pub type FixablePolicyFn = dyn Fn(&str) -> bool + Send + Sync;

/// Fixable policy wrapped in Arc
pub type FixablePolicyArc = Arc<FixablePolicyFn>;

/// Default policy: no response code is considered fixable
pub fn never_fixable(_code: &str) -> bool {
    false
}

/// Outcome of a gateway business status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The operation completed
    Success,
    /// The gateway accepted the operation but has not finished it
    Pending,
    /// The gateway refused the operation
    Failed,
}

impl Outcome {
    /// Whether the gateway refused the operation
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => f.write_str("success"),
            Outcome::Pending => f.write_str("pending"),
            Outcome::Failed => f.write_str("failed"),
        }
    }
}

/// Classify a 2xx deposit response.
///
/// Success needs both `P0001` and `S0001`; pending needs both `P0004` and
/// `S0003`. Every other combination is a failure.
pub fn classify_deposit(response: &GatewayResponse) -> Outcome {
    match (response.code(), response.trade_status()) {
        (Some(codes::SUCCESS), Some(codes::PAYMENT_SUCCESS)) => Outcome::Success,
        (Some(codes::PENDING), Some(codes::PAYMENT_PENDING)) => Outcome::Pending,
        _ => Outcome::Failed,
    }
}

/// Classify a 2xx refund response.
///
/// Only `S0005` fails. `S0006` is reported as pending, anything else
/// succeeds.
pub fn classify_refund(response: &GatewayResponse) -> Outcome {
    match response.refund_status() {
        Some(codes::REFUND_FAILED) => Outcome::Failed,
        Some(codes::REFUND_PENDING) => Outcome::Pending,
        _ => Outcome::Success,
    }
}

/// Human-readable rejection message, `"{message} ({status})"`
pub fn rejection_message(response: &GatewayResponse, status: Option<&str>) -> String {
    format!(
        "{} ({})",
        response.message.as_deref().unwrap_or_default(),
        status.unwrap_or_default()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(code: Option<&str>, trade: Option<&str>, refund: Option<&str>) -> GatewayResponse {
        GatewayResponse {
            code: code.map(String::from),
            message: Some("declined".to_string()),
            trade_status: trade.map(String::from),
            refund_status: refund.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_deposit_success() {
        let r = response(Some("P0001"), Some("S0001"), None);
        assert_eq!(classify_deposit(&r), Outcome::Success);
    }

    #[test]
    fn test_deposit_pending() {
        let r = response(Some("P0004"), Some("S0003"), None);
        assert_eq!(classify_deposit(&r), Outcome::Pending);
    }

    #[test]
    fn test_deposit_mixed_codes_fail() {
        let cases = [
            (Some("P0001"), Some("S0003")),
            (Some("P0004"), Some("S0001")),
            (Some("P0002"), Some("S0002")),
            (Some("P0001"), Some("S0007")),
            (Some("P0001"), None),
            (None, Some("S0001")),
            (None, None),
        ];
        for (code, trade) in cases {
            let r = response(code, trade, None);
            assert_eq!(
                classify_deposit(&r),
                Outcome::Failed,
                "code={:?} trade={:?}",
                code,
                trade
            );
        }
    }

    #[test]
    fn test_refund_statuses() {
        assert_eq!(
            classify_refund(&response(None, None, Some("S0004"))),
            Outcome::Success
        );
        assert_eq!(
            classify_refund(&response(None, None, Some("S0005"))),
            Outcome::Failed
        );
        assert_eq!(
            classify_refund(&response(None, None, Some("S0006"))),
            Outcome::Pending
        );
        assert_eq!(
            classify_refund(&response(None, None, Some("C0029"))),
            Outcome::Success
        );
        assert_eq!(classify_refund(&response(None, None, None)), Outcome::Success);
    }

    #[test]
    fn test_rejection_message() {
        let r = response(Some("P0002"), Some("S0002"), None);
        assert_eq!(rejection_message(&r, r.code()), "declined (P0002)");
        assert_eq!(rejection_message(&GatewayResponse::default(), None), " ()");
    }

    #[test]
    fn test_default_policy_is_never_fixable() {
        let policy: FixablePolicyArc = Arc::new(never_fixable);
        assert!(!policy("P0002"));
        assert!(!policy(codes::SIGNATURE_ERROR));
    }
}
