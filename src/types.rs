//! Core types for the Foxtrot gateway protocol

use crate::{FoxtrotError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Product description sent with every deposit
pub const PRODUCT_INFO: &str = "PayStage";

/// Language sent with every deposit
pub const LANGUAGE: &str = "EN";

/// Gateway status codes
pub mod codes {
    /// Top-level response code: success
    pub const SUCCESS: &str = "P0001";
    /// Top-level response code: failed
    pub const FAILED: &str = "P0002";
    /// Top-level response code: pending
    pub const PENDING: &str = "P0004";

    /// Trade status: payment succeeded
    pub const PAYMENT_SUCCESS: &str = "S0001";
    /// Trade status: payment failed
    pub const PAYMENT_FAILED: &str = "S0002";
    /// Trade status: payment pending
    pub const PAYMENT_PENDING: &str = "S0003";
    /// Trade status: charged back
    pub const CHARGEBACK: &str = "S0007";

    /// Refund status: refund succeeded
    pub const REFUND_SUCCESS: &str = "S0004";
    /// Refund status: refund failed
    pub const REFUND_FAILED: &str = "S0005";
    /// Refund status: already refunded
    pub const REFUNDED: &str = "C0029";
    /// Refund status: refund pending
    pub const REFUND_PENDING: &str = "S0006";

    /// Signature rejected by the gateway
    pub const SIGNATURE_ERROR: &str = "C0014";
}

/// Currencies known to the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    EUR,
    GBP,
    HKD,
    IDR,
    JPY,
    MYR,
    PHP,
    THB,
    USD,
    VND,
    KRW,
    INR,
}

impl Currency {
    /// All known currencies
    pub const ALL: [Currency; 12] = [
        Currency::EUR,
        Currency::GBP,
        Currency::HKD,
        Currency::IDR,
        Currency::JPY,
        Currency::MYR,
        Currency::PHP,
        Currency::THB,
        Currency::USD,
        Currency::VND,
        Currency::KRW,
        Currency::INR,
    ];

    /// ISO symbol
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::HKD => "HKD",
            Currency::IDR => "IDR",
            Currency::JPY => "JPY",
            Currency::MYR => "MYR",
            Currency::PHP => "PHP",
            Currency::THB => "THB",
            Currency::USD => "USD",
            Currency::VND => "VND",
            Currency::KRW => "KRW",
            Currency::INR => "INR",
        }
    }

    /// Numeric code the gateway expects in the `currency` field.
    ///
    /// Only USD, EUR, GBP and JPY have an assigned code; the rest of the
    /// enumeration fails with [`FoxtrotError::UnsupportedCurrency`].
    pub fn code(&self) -> Result<u8> {
        match self {
            Currency::USD => Ok(1),
            Currency::EUR => Ok(2),
            Currency::GBP => Ok(4),
            Currency::JPY => Ok(6),
            other => Err(FoxtrotError::unsupported_currency(other.as_str())),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = FoxtrotError;

    fn from_str(s: &str) -> Result<Self> {
        Currency::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| FoxtrotError::unsupported_currency(s))
    }
}

/// Resolve a currency symbol to its gateway code
pub fn currency_code(symbol: &str) -> Result<u8> {
    symbol.parse::<Currency>()?.code()
}

/// Merchant credentials
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vault {
    /// Merchant number issued by the gateway
    pub merchant_id: String,
    /// Shared MD5 signing key
    #[serde(rename = "md5_key")]
    pub signing_key: String,
    /// Gateway base URL
    pub api_url: String,
    /// Opaque gateway identifier
    pub payment_gateway: String,
    /// Terminal number, used by the v2 refund dialect
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal_no: Option<String>,
}

impl fmt::Debug for Vault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vault")
            .field("merchant_id", &self.merchant_id)
            .field("signing_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("payment_gateway", &self.payment_gateway)
            .field("terminal_no", &self.terminal_no)
            .finish()
    }
}

impl Vault {
    /// Create a new vault
    pub fn new(
        merchant_id: impl Into<String>,
        signing_key: impl Into<String>,
        api_url: impl Into<String>,
        payment_gateway: impl Into<String>,
    ) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            signing_key: signing_key.into(),
            api_url: api_url.into(),
            payment_gateway: payment_gateway.into(),
            terminal_no: None,
        }
    }

    /// Set the terminal number
    pub fn with_terminal_no(mut self, terminal_no: impl Into<String>) -> Self {
        self.terminal_no = Some(terminal_no.into());
        self
    }

    /// Validate the vault
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("merchant_id", &self.merchant_id),
            ("md5_key", &self.signing_key),
            ("api_url", &self.api_url),
            ("payment_gateway", &self.payment_gateway),
        ] {
            if value.trim().is_empty() {
                return Err(FoxtrotError::invalid_credentials(format!(
                    "{} is required",
                    name
                )));
            }
        }

        let url = url::Url::parse(&self.api_url).map_err(|e| {
            FoxtrotError::invalid_credentials(format!("api_url is not a valid URL: {}", e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(FoxtrotError::invalid_credentials(
                "api_url must start with http:// or https://",
            ));
        }

        Ok(())
    }

    /// Absolute URL of a gateway endpoint
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// A card charge as supplied by the caller
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepositRequest {
    pub address: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    #[serde(alias = "zip")]
    pub zip_code: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub shipping_first_name: Option<String>,
    pub shipping_last_name: Option<String>,
    pub shipping_email: Option<String>,
    /// Decimal amount, signed exactly as written
    pub amount: String,
    /// Currency symbol, e.g. `"USD"`
    pub currency: String,
    pub card_number: String,
    pub card_exp_month: String,
    pub card_exp_year: String,
    pub card_cvv2: String,
    pub return_url: String,
    /// Merchant-assigned order identifier
    pub bill_no: String,
    /// Customer IP address
    pub ip: String,
    pub notify_url: String,
}

impl fmt::Debug for DepositRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DepositRequest")
            .field("bill_no", &self.bill_no)
            .field("amount", &self.amount)
            .field("currency", &self.currency)
            .field("card_number", &mask_card_number(&self.card_number))
            .field("card_cvv2", &"<redacted>")
            .field("return_url", &self.return_url)
            .field("notify_url", &self.notify_url)
            .field("ip", &self.ip)
            .finish_non_exhaustive()
    }
}

impl DepositRequest {
    /// Check presence and shape of the required fields
    pub fn validate(&self) -> Result<()> {
        require("amount", &self.amount)?;
        require("currency", &self.currency)?;
        require("card_number", &self.card_number)?;
        require("card_exp_month", &self.card_exp_month)?;
        require("card_exp_year", &self.card_exp_year)?;
        require("card_cvv2", &self.card_cvv2)?;
        require("return_url", &self.return_url)?;
        require("bill_no", &self.bill_no)?;
        require("ip", &self.ip)?;
        require("notify_url", &self.notify_url)?;

        require_decimal("amount", &self.amount)?;

        if self.ip.parse::<IpAddr>().is_err() {
            return Err(FoxtrotError::validation(
                "ip",
                "must be a valid IP address",
            ));
        }

        if url::Url::parse(&self.notify_url).is_err() {
            return Err(FoxtrotError::validation(
                "notify_url",
                "must be a valid URL",
            ));
        }

        Ok(())
    }
}

/// Deposit form as sent on the wire
///
/// Field order is the order the gateway documents; `serde_urlencoded`
/// preserves it.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct DepositPayload {
    pub address: String,
    pub state: String,
    pub city: String,
    pub country: String,
    pub phone: String,
    #[serde(rename = "zipCode")]
    pub zip_code: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    #[serde(rename = "shippingFirstName")]
    pub shipping_first_name: String,
    #[serde(rename = "shippingLastName")]
    pub shipping_last_name: String,
    #[serde(rename = "shippingEmail")]
    pub shipping_email: String,
    pub amount: String,
    #[serde(rename = "productInfo")]
    pub product_info: String,
    #[serde(rename = "merNo")]
    pub mer_no: String,
    pub currency: u8,
    #[serde(rename = "cardNum")]
    pub card_num: String,
    pub month: String,
    pub year: String,
    pub cvv2: String,
    #[serde(rename = "returnURL")]
    pub return_url: String,
    pub language: String,
    #[serde(rename = "billNo")]
    pub bill_no: String,
    pub ip: String,
    #[serde(rename = "md5Info")]
    pub md5_info: String,
    #[serde(rename = "notifyUrl")]
    pub notify_url: String,
}

impl fmt::Debug for DepositPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DepositPayload")
            .field("merNo", &self.mer_no)
            .field("billNo", &self.bill_no)
            .field("amount", &self.amount)
            .field("currency", &self.currency)
            .field("cardNum", &mask_card_number(&self.card_num))
            .field("cvv2", &"<redacted>")
            .field("returnURL", &self.return_url)
            .field("md5Info", &self.md5_info)
            .finish_non_exhaustive()
    }
}

/// A refund as supplied by the caller
///
/// Two incompatible refund schemas exist on the gateway side. `v1` is the
/// canonical one; `v2` is the terminal-based dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "schema")]
pub enum RefundRequest {
    #[serde(rename = "v1")]
    Standard(StandardRefund),
    #[serde(rename = "v2")]
    Terminal(TerminalRefund),
}

/// Canonical refund request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StandardRefund {
    pub merchant_id: String,
    pub order_no: String,
    pub amount: String,
    pub redirect_url: String,
    pub remark: String,
}

/// Terminal-based refund request (v2 dialect)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalRefund {
    /// Falls back to the vault's terminal number when absent
    pub terminal_no: Option<String>,
    /// Caller-computed hash, carried verbatim
    pub hash: String,
    pub currency: String,
    pub order_no: String,
    pub refund_amount: String,
    pub refund_reason: String,
    pub trade_amount: String,
    pub trade_no: String,
}

impl RefundRequest {
    /// Order number the refund targets
    pub fn order_no(&self) -> &str {
        match self {
            RefundRequest::Standard(r) => &r.order_no,
            RefundRequest::Terminal(r) => &r.order_no,
        }
    }

    /// Check presence and shape of the required fields
    pub fn validate(&self, vault: &Vault) -> Result<()> {
        match self {
            RefundRequest::Standard(r) => {
                require("merchant_id", &r.merchant_id)?;
                require("order_no", &r.order_no)?;
                require("amount", &r.amount)?;
                require("redirect_url", &r.redirect_url)?;
                require("remark", &r.remark)?;
                require_decimal("amount", &r.amount)?;

                if r.merchant_id != vault.merchant_id {
                    return Err(FoxtrotError::validation(
                        "merchant_id",
                        "does not match the vault merchant",
                    ));
                }
            }
            RefundRequest::Terminal(r) => {
                let terminal_no = r
                    .terminal_no
                    .as_deref()
                    .filter(|t| !t.trim().is_empty())
                    .or(vault.terminal_no.as_deref())
                    .unwrap_or_default();
                require("terminal_no", terminal_no)?;
                require("hash", &r.hash)?;
                require("currency", &r.currency)?;
                require("order_no", &r.order_no)?;
                require("refund_amount", &r.refund_amount)?;
                require("refund_reason", &r.refund_reason)?;
                require("trade_amount", &r.trade_amount)?;
                require("trade_no", &r.trade_no)?;
                require_decimal("refund_amount", &r.refund_amount)?;
                require_decimal("trade_amount", &r.trade_amount)?;
            }
        }

        Ok(())
    }
}

/// Refund form as sent on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RefundPayload {
    Standard(StandardRefundPayload),
    Terminal(TerminalRefundPayload),
}

/// Canonical refund form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandardRefundPayload {
    #[serde(rename = "merNo")]
    pub mer_no: String,
    #[serde(rename = "orderNo")]
    pub order_no: String,
    pub amount: String,
    pub signature: String,
    #[serde(rename = "returnNotify")]
    pub return_notify: String,
    pub remark: String,
}

/// Terminal-based refund form (v2 dialect)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerminalRefundPayload {
    #[serde(rename = "terminalNo")]
    pub terminal_no: String,
    pub hash: String,
    pub currency: String,
    #[serde(rename = "orderNo")]
    pub order_no: String,
    #[serde(rename = "refundAmount")]
    pub refund_amount: String,
    #[serde(rename = "refundReason")]
    pub refund_reason: String,
    #[serde(rename = "tradeAmount")]
    pub trade_amount: String,
    #[serde(rename = "tradeNo")]
    pub trade_no: String,
}

/// Any payload the client sends
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OutboundPayload {
    Deposit(DepositPayload),
    Refund(RefundPayload),
}

/// Gateway response body
///
/// Status fields accept JSON strings or numbers; anything else lands in
/// `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayResponse {
    /// Top-level response code (`P0001`, ...)
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub code: Option<String>,
    /// Human-readable message
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub message: Option<String>,
    /// Deposit outcome (`S0001`, ...)
    #[serde(
        rename = "tradeStatus",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub trade_status: Option<String>,
    /// Refund outcome (`S0004`, ...)
    #[serde(
        rename = "refundStatus",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub refund_status: Option<String>,
    /// Gateway order number
    #[serde(
        rename = "orderNo",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub order_no: Option<String>,
    /// Merchant bill number, echoed back
    #[serde(
        rename = "billNo",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub bill_no: Option<String>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GatewayResponse {
    /// Top-level response code
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Deposit trade status
    pub fn trade_status(&self) -> Option<&str> {
        self.trade_status.as_deref()
    }

    /// Refund status
    pub fn refund_status(&self) -> Option<&str> {
        self.refund_status.as_deref()
    }

    /// Look up any field, typed or not
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or number, got {}",
            other
        ))),
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(FoxtrotError::validation(field, "is required"));
    }
    Ok(())
}

fn require_decimal(field: &str, value: &str) -> Result<()> {
    Decimal::from_str(value.trim())
        .map(|_| ())
        .map_err(|_| FoxtrotError::validation(field, "must be a decimal amount"))
}

fn mask_card_number(card_number: &str) -> String {
    let digits: Vec<char> = card_number.chars().collect();
    if digits.len() <= 4 {
        return "*".repeat(digits.len());
    }
    let tail: String = digits[digits.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(digits.len() - 4), tail)
}
