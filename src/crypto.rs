//! Signing utilities for Foxtrot payloads
//!
//! The gateway authenticates requests with a keyed MD5 digest over a fixed
//! concatenation of fields. The concatenation order and the amount
//! formatting below have to match the gateway byte for byte.

use crate::{FoxtrotError, Result};
use md5::{Digest, Md5};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Lowercase hex MD5 digest of `input`
pub fn md5_hex(input: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Signature attached to a deposit as `md5Info`.
///
/// `MD5(merchantId + billNo + currencyCode + amount + returnUrl + key)`,
/// with `amount` exactly as supplied.
pub fn deposit_signature(
    merchant_id: &str,
    bill_no: &str,
    currency_code: u8,
    amount: &str,
    return_url: &str,
    signing_key: &str,
) -> String {
    md5_hex(&format!(
        "{}{}{}{}{}{}",
        merchant_id, bill_no, currency_code, amount, return_url, signing_key
    ))
}

/// Signature attached to a refund.
///
/// The key segment has no `&` in front of it; the gateway signs it that way.
pub fn refund_signature(amount: &str, merchant_id: &str, order_no: &str, signing_key: &str) -> String {
    md5_hex(&format!(
        "amount={}&merNo={}&orderNo={}key={}",
        amount, merchant_id, order_no, signing_key
    ))
}

/// Expected `md5Info` of an inbound callback
pub fn callback_signature(
    merchant_id: &str,
    transaction_number: &str,
    currency: &str,
    credit_amount: &str,
    redirect_url: &str,
    signing_key: &str,
) -> Result<String> {
    let amount = format_amount(credit_amount)?;
    Ok(md5_hex(&format!(
        "{}{}{}{}{}{}",
        merchant_id, transaction_number, currency, amount, redirect_url, signing_key
    )))
}

/// Check an inbound callback signature, failing with
/// [`FoxtrotError::SignatureMismatch`] when it differs.
pub fn verify_callback_signature(
    merchant_id: &str,
    transaction_number: &str,
    currency: &str,
    credit_amount: &str,
    redirect_url: &str,
    signing_key: &str,
    inbound_signature: &str,
) -> Result<bool> {
    let expected = callback_signature(
        merchant_id,
        transaction_number,
        currency,
        credit_amount,
        redirect_url,
        signing_key,
    )?;

    if expected != inbound_signature {
        return Err(FoxtrotError::signature_mismatch(transaction_number));
    }

    Ok(true)
}

/// Format an amount with exactly two decimals, `.` as separator and no
/// grouping. Midpoints round away from zero (`10.005` -> `10.01`).
pub fn format_amount(amount: &str) -> Result<String> {
    let value = Decimal::from_str(amount.trim())
        .or_else(|_| Decimal::from_scientific(amount.trim()))
        .map_err(|_| FoxtrotError::validation("credit_amount", "must be a decimal amount"))?;

    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    Ok(rounded.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_md5_hex_known_vector() {
        assert_eq!(md5_hex(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(md5_hex("abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn test_deposit_signature_concatenation() {
        let signature = deposit_signature(
            "100140",
            "2474193466",
            1,
            "10.00",
            "https://merchant.test/return",
            "KEY",
        );
        assert_eq!(
            signature,
            md5_hex("1001402474193466110.00https://merchant.test/returnKEY")
        );
        assert_eq!(signature.len(), 32);
        assert!(signature
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_deposit_signature_is_deterministic() {
        let a = deposit_signature("m", "b", 1, "1.00", "r", "k");
        let b = deposit_signature("m", "b", 1, "1.00", "r", "k");
        assert_eq!(a, b);
    }

    #[test]
    fn test_deposit_signature_changes_with_each_field() {
        let base = deposit_signature("m", "b", 1, "1.00", "r", "k");
        let variants = [
            deposit_signature("m2", "b", 1, "1.00", "r", "k"),
            deposit_signature("m", "b2", 1, "1.00", "r", "k"),
            deposit_signature("m", "b", 2, "1.00", "r", "k"),
            deposit_signature("m", "b", 1, "1.0", "r", "k"),
            deposit_signature("m", "b", 1, "1.00", "r2", "k"),
            deposit_signature("m", "b", 1, "1.00", "r", "k2"),
        ];
        for variant in variants {
            assert_ne!(base, variant);
        }
    }

    #[test]
    fn test_refund_signature_separators() {
        let signature = refund_signature("10.00", "100140", "ORDER1", "KEY");
        assert_eq!(
            signature,
            md5_hex("amount=10.00&merNo=100140&orderNo=ORDER1key=KEY")
        );
        assert_ne!(
            signature,
            md5_hex("amount=10.00&merNo=100140&orderNo=ORDER1&key=KEY")
        );
    }

    #[test]
    fn test_callback_signature_matches_reference() {
        let expected = md5_hex(
            "merchantidtestkeytesttxnnumber123456USD100.00http://example.commd5testkey",
        );
        let signature = callback_signature(
            "merchantidtestkey",
            "testtxnnumber123456",
            "USD",
            "100",
            "http://example.com",
            "md5testkey",
        )
        .unwrap();
        assert_eq!(signature, expected);
    }

    #[test]
    fn test_verify_callback_signature() {
        let inbound = md5_hex(
            "merchantidtestkeytesttxnnumber123456USD100.00http://example.commd5testkey",
        );
        assert!(verify_callback_signature(
            "merchantidtestkey",
            "testtxnnumber123456",
            "USD",
            "100.00",
            "http://example.com",
            "md5testkey",
            &inbound,
        )
        .unwrap());

        let err = verify_callback_signature(
            "merchantidtestkey",
            "testtxnnumber123456",
            "USD",
            "100.00",
            "http://example.com",
            "md5testkey",
            "md5infohash",
        )
        .unwrap_err();
        assert!(matches!(err, FoxtrotError::SignatureMismatch { .. }));
        assert!(err.to_string().contains("testtxnnumber123456"));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount("1").unwrap(), "1.00");
        assert_eq!(format_amount("100.00").unwrap(), "100.00");
        assert_eq!(format_amount("0.1").unwrap(), "0.10");
        assert_eq!(format_amount("1234567.891").unwrap(), "1234567.89");
        assert_eq!(format_amount(" 7.5 ").unwrap(), "7.50");
    }

    #[test]
    fn test_format_amount_rounds_half_away_from_zero() {
        assert_eq!(format_amount("10.005").unwrap(), "10.01");
        assert_eq!(format_amount("10.004").unwrap(), "10.00");
        assert_eq!(format_amount("2.675").unwrap(), "2.68");
        assert_eq!(format_amount("-10.005").unwrap(), "-10.01");
        assert_eq!(format_amount("-0.001").unwrap(), "0.00");
    }

    #[test]
    fn test_format_amount_rejects_garbage() {
        assert!(matches!(
            format_amount("ten"),
            Err(FoxtrotError::ValidationFailed { .. })
        ));
        assert!(format_amount("").is_err());
    }
}
