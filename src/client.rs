//! Foxtrot gateway client

use crate::classifier::{self, Outcome};
use crate::config::ClientConfig;
use crate::error::{GatewayRejection, TransportFailure};
use crate::input::{InputSource, SIGNATURE_FIELD};
use crate::payload::{build_deposit_payload, build_refund_payload};
use crate::types::*;
use crate::{crypto, FoxtrotError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Deposit endpoint, relative to the vault's `api_url`
pub const DEPOSIT_PATH: &str = "/carespay/pay";

/// Refund endpoint, relative to the vault's `api_url`
pub const REFUND_PATH: &str = "/refund";

/// Message used when a failed response carries none
pub const FALLBACK_MESSAGE: &str = "Unexpected error occurred, please try again later";

/// A non-failed gateway answer
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayReply {
    /// Success or pending
    pub outcome: Outcome,
    /// Parsed response body
    pub response: GatewayResponse,
}

/// Client for the Foxtrot gateway.
///
/// A client starts without credentials; every operation except
/// [`FoxtrotClient::set_vault`] fails with
/// [`FoxtrotError::PreconditionFailed`] until a vault is set. Use
/// [`FoxtrotClient::with_vault`] to construct a ready client directly.
///
/// `set_vault` takes `&mut self`, so credentials cannot change while a
/// request on the same instance is in flight. Clones share the vault.
#[derive(Debug, Clone)]
pub struct FoxtrotClient {
    client: Client,
    config: ClientConfig,
    vault: Option<Arc<Vault>>,
}

impl FoxtrotClient {
    /// Create a client without credentials, using the default config
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client without credentials
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let mut builder = Client::builder().default_headers(header_map(&config)?);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| FoxtrotError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            vault: None,
        })
    }

    /// Create a client that is ready to use
    pub fn with_vault(vault: Vault, config: ClientConfig) -> Result<Self> {
        let mut client = Self::with_config(config)?;
        client.set_vault(vault)?;
        Ok(client)
    }

    /// Validate and install merchant credentials
    pub fn set_vault(&mut self, vault: Vault) -> Result<()> {
        vault.validate()?;
        debug!(merchant_id = %vault.merchant_id, api_url = %vault.api_url, "vault set");
        self.vault = Some(Arc::new(vault));
        Ok(())
    }

    /// The installed vault
    pub fn vault(&self) -> Result<&Vault> {
        self.vault
            .as_deref()
            .ok_or(FoxtrotError::PreconditionFailed)
    }

    /// Whether a vault is installed
    pub fn is_ready(&self) -> bool {
        self.vault.is_some()
    }

    /// Get the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Charge a card.
    ///
    /// Returns the reply when the gateway reports success or pending;
    /// any other business status becomes [`FoxtrotError::GatewayRejected`].
    pub async fn deposit(&self, request: &DepositRequest) -> Result<GatewayReply> {
        let vault = self.vault()?;
        request.validate()?;
        let payload = build_deposit_payload(request, vault)?;

        info!(
            bill_no = %payload.bill_no,
            amount = %payload.amount,
            currency = payload.currency,
            "sending deposit"
        );

        let response = self
            .post_form(&vault.endpoint(DEPOSIT_PATH), &payload)
            .await
            .map_err(|e| with_payload(e, OutboundPayload::Deposit(payload.clone())))?;

        let outcome = classifier::classify_deposit(&response);
        info!(
            bill_no = %payload.bill_no,
            code = response.code().unwrap_or_default(),
            trade_status = response.trade_status().unwrap_or_default(),
            %outcome,
            "deposit classified"
        );

        if outcome.is_failed() {
            let message = classifier::rejection_message(&response, response.code());
            let fixable = self.is_fixable(&response);
            return Err(FoxtrotError::GatewayRejected(Box::new(GatewayRejection {
                payload: OutboundPayload::Deposit(payload),
                response,
                message,
                fixable,
            })));
        }

        Ok(GatewayReply { outcome, response })
    }

    /// Refund an order.
    ///
    /// Only a `refundStatus` of `S0005` is treated as a rejection.
    pub async fn refund(&self, request: &RefundRequest) -> Result<GatewayReply> {
        let vault = self.vault()?;
        request.validate(vault)?;
        let payload = build_refund_payload(request, vault)?;

        info!(order_no = %request.order_no(), "sending refund");

        let response = self
            .post_form(&vault.endpoint(REFUND_PATH), &payload)
            .await
            .map_err(|e| with_payload(e, OutboundPayload::Refund(payload.clone())))?;

        let outcome = classifier::classify_refund(&response);
        info!(
            order_no = %request.order_no(),
            refund_status = response.refund_status().unwrap_or_default(),
            %outcome,
            "refund classified"
        );

        if outcome.is_failed() {
            let message = classifier::rejection_message(&response, response.refund_status());
            let fixable = self.is_fixable(&response);
            return Err(FoxtrotError::GatewayRejected(Box::new(GatewayRejection {
                payload: OutboundPayload::Refund(payload),
                response,
                message,
                fixable,
            })));
        }

        Ok(GatewayReply { outcome, response })
    }

    /// Check the signature of an inbound callback
    pub fn verify_callback(
        &self,
        transaction_number: &str,
        currency: &str,
        credit_amount: &str,
        redirect_url: &str,
        inbound_signature: &str,
    ) -> Result<bool> {
        let vault = self.vault()?;

        let verified = crypto::verify_callback_signature(
            &vault.merchant_id,
            transaction_number,
            currency,
            credit_amount,
            redirect_url,
            &vault.signing_key,
            inbound_signature,
        );

        match &verified {
            Ok(_) => debug!(transaction_number, "callback signature verified"),
            Err(e) => warn!(transaction_number, error = %e, "callback signature rejected"),
        }

        verified
    }

    /// Check the `md5Info` field of an inbound callback request
    pub fn verify_callback_request<S>(
        &self,
        request: &S,
        transaction_number: &str,
        currency: &str,
        credit_amount: &str,
        redirect_url: &str,
    ) -> Result<bool>
    where
        S: InputSource + ?Sized,
    {
        self.vault()?;

        let inbound_signature = request.input(SIGNATURE_FIELD).ok_or_else(|| {
            warn!(transaction_number, "callback without {}", SIGNATURE_FIELD);
            FoxtrotError::signature_mismatch(transaction_number)
        })?;

        self.verify_callback(
            transaction_number,
            currency,
            credit_amount,
            redirect_url,
            inbound_signature,
        )
    }

    async fn post_form<T: Serialize + ?Sized>(&self, url: &str, form: &T) -> Result<GatewayResponse> {
        let response = self.client.post(url).form(form).send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!(%url, status = status.as_u16(), "gateway responded");

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(message_text))
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());

            warn!(%url, status = status.as_u16(), %message, "gateway request failed");

            return Err(FoxtrotError::TransportFailed(Box::new(TransportFailure {
                status: status.as_u16(),
                message,
                body,
                payload: None,
            })));
        }

        serde_json::from_str::<Value>(&body)
            .and_then(serde_json::from_value::<GatewayResponse>)
            .map_err(|e| {
                warn!(%url, status = status.as_u16(), error = %e, "gateway reply is not a response object");
                FoxtrotError::InvalidResponse(Box::new(TransportFailure {
                    status: status.as_u16(),
                    message: e.to_string(),
                    body,
                    payload: None,
                }))
            })
    }

    fn is_fixable(&self, response: &GatewayResponse) -> bool {
        response
            .code()
            .map(|code| (self.config.fixable_policy)(code))
            .unwrap_or(false)
    }
}

fn with_payload(error: FoxtrotError, payload: OutboundPayload) -> FoxtrotError {
    match error {
        FoxtrotError::TransportFailed(mut failure) => {
            failure.payload = Some(payload);
            FoxtrotError::TransportFailed(failure)
        }
        FoxtrotError::InvalidResponse(mut failure) => {
            failure.payload = Some(payload);
            FoxtrotError::InvalidResponse(failure)
        }
        other => other,
    }
}

fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn header_map(config: &ClientConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (key, value) in &config.headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| FoxtrotError::config(format!("Invalid header name {}: {}", key, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| FoxtrotError::config(format!("Invalid header value for {}: {}", key, e)))?;
        headers.insert(name, value);
    }
    Ok(headers)
}
