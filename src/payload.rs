//! Construction of outbound gateway forms

use crate::crypto;
use crate::types::*;
use crate::Result;

/// Build the deposit form for `request`, signed with the vault key.
///
/// Optional customer fields default to an empty string. Shipping fields
/// fall back to the billing fields when not supplied.
pub fn build_deposit_payload(request: &DepositRequest, vault: &Vault) -> Result<DepositPayload> {
    let currency = currency_code(&request.currency)?;
    let md5_info = crypto::deposit_signature(
        &vault.merchant_id,
        &request.bill_no,
        currency,
        &request.amount,
        &request.return_url,
        &vault.signing_key,
    );

    let first_name = or_empty(&request.first_name);
    let last_name = or_empty(&request.last_name);
    let email = or_empty(&request.email);

    Ok(DepositPayload {
        address: or_empty(&request.address),
        state: or_empty(&request.state),
        city: or_empty(&request.city),
        country: or_empty(&request.country),
        phone: or_empty(&request.phone),
        zip_code: or_empty(&request.zip_code),
        shipping_first_name: request
            .shipping_first_name
            .clone()
            .unwrap_or_else(|| first_name.clone()),
        shipping_last_name: request
            .shipping_last_name
            .clone()
            .unwrap_or_else(|| last_name.clone()),
        shipping_email: request
            .shipping_email
            .clone()
            .unwrap_or_else(|| email.clone()),
        first_name,
        last_name,
        email,
        amount: request.amount.clone(),
        product_info: PRODUCT_INFO.to_string(),
        mer_no: vault.merchant_id.clone(),
        currency,
        card_num: request.card_number.clone(),
        month: request.card_exp_month.clone(),
        year: request.card_exp_year.clone(),
        cvv2: request.card_cvv2.clone(),
        return_url: request.return_url.clone(),
        language: LANGUAGE.to_string(),
        bill_no: request.bill_no.clone(),
        ip: request.ip.clone(),
        md5_info,
        notify_url: request.notify_url.clone(),
    })
}

/// Build the refund form for `request`.
///
/// The canonical schema is signed here; the v2 dialect carries the
/// caller's hash as is.
pub fn build_refund_payload(request: &RefundRequest, vault: &Vault) -> Result<RefundPayload> {
    match request {
        RefundRequest::Standard(refund) => {
            let signature = crypto::refund_signature(
                &refund.amount,
                &vault.merchant_id,
                &refund.order_no,
                &vault.signing_key,
            );

            Ok(RefundPayload::Standard(StandardRefundPayload {
                mer_no: vault.merchant_id.clone(),
                order_no: refund.order_no.clone(),
                amount: refund.amount.clone(),
                signature,
                return_notify: refund.redirect_url.clone(),
                remark: refund.remark.clone(),
            }))
        }
        RefundRequest::Terminal(refund) => {
            let terminal_no = refund
                .terminal_no
                .clone()
                .filter(|t| !t.trim().is_empty())
                .or_else(|| vault.terminal_no.clone())
                .unwrap_or_default();

            Ok(RefundPayload::Terminal(TerminalRefundPayload {
                terminal_no,
                hash: refund.hash.clone(),
                currency: refund.currency.clone(),
                order_no: refund.order_no.clone(),
                refund_amount: refund.refund_amount.clone(),
                refund_reason: refund.refund_reason.clone(),
                trade_amount: refund.trade_amount.clone(),
                trade_no: refund.trade_no.clone(),
            }))
        }
    }
}

fn or_empty(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FoxtrotError;

    fn vault() -> Vault {
        Vault::new("100140", "KEY", "http://foxtrot.test/mock/api", "foxtrot")
    }

    fn deposit() -> DepositRequest {
        DepositRequest {
            first_name: Some("Juan".into()),
            last_name: Some("Cruz".into()),
            email: Some("juan@example.com".into()),
            amount: "10.00".into(),
            currency: "USD".into(),
            card_number: "4111111111111111".into(),
            card_exp_month: "12".into(),
            card_exp_year: "2030".into(),
            card_cvv2: "123".into(),
            return_url: "https://merchant.test/return".into(),
            bill_no: "2474193466".into(),
            ip: "203.0.113.7".into(),
            notify_url: "https://merchant.test/notify".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_deposit_payload_fields() {
        let payload = build_deposit_payload(&deposit(), &vault()).unwrap();

        assert_eq!(payload.mer_no, "100140");
        assert_eq!(payload.currency, 1);
        assert_eq!(payload.product_info, "PayStage");
        assert_eq!(payload.language, "EN");
        assert_eq!(payload.card_num, "4111111111111111");
        assert_eq!(payload.month, "12");
        assert_eq!(payload.year, "2030");
        assert_eq!(payload.address, "");
        assert_eq!(payload.zip_code, "");
        assert_eq!(payload.shipping_first_name, "Juan");
        assert_eq!(payload.shipping_email, "juan@example.com");
        assert_eq!(
            payload.md5_info,
            crypto::md5_hex("1001402474193466110.00https://merchant.test/returnKEY")
        );
    }

    #[test]
    fn test_deposit_payload_explicit_shipping() {
        let mut request = deposit();
        request.shipping_first_name = Some("Maria".into());
        let payload = build_deposit_payload(&request, &vault()).unwrap();
        assert_eq!(payload.first_name, "Juan");
        assert_eq!(payload.shipping_first_name, "Maria");
        assert_eq!(payload.shipping_last_name, "Cruz");
    }

    #[test]
    fn test_deposit_payload_signs_raw_amount() {
        let mut request = deposit();
        request.amount = "10".into();
        let payload = build_deposit_payload(&request, &vault()).unwrap();
        assert_eq!(payload.amount, "10");
        assert_eq!(
            payload.md5_info,
            crypto::md5_hex("1001402474193466110https://merchant.test/returnKEY")
        );
    }

    #[test]
    fn test_deposit_payload_wire_order() {
        let payload = build_deposit_payload(&deposit(), &vault()).unwrap();
        let text = serde_json::to_string(&payload).unwrap();
        let expected = [
            "address",
            "state",
            "city",
            "country",
            "phone",
            "zipCode",
            "firstName",
            "lastName",
            "email",
            "shippingFirstName",
            "shippingLastName",
            "shippingEmail",
            "amount",
            "productInfo",
            "merNo",
            "currency",
            "cardNum",
            "month",
            "year",
            "cvv2",
            "returnURL",
            "language",
            "billNo",
            "ip",
            "md5Info",
            "notifyUrl",
        ];

        let positions: Vec<usize> = expected
            .iter()
            .map(|key| text.find(&format!("\"{}\":", key)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", text);
    }

    #[test]
    fn test_deposit_payload_unsupported_currency() {
        let mut request = deposit();
        request.currency = "PHP".into();
        assert!(matches!(
            build_deposit_payload(&request, &vault()),
            Err(FoxtrotError::UnsupportedCurrency { .. })
        ));
    }

    #[test]
    fn test_standard_refund_payload() {
        let request = RefundRequest::Standard(StandardRefund {
            merchant_id: "100140".into(),
            order_no: "ORDER1".into(),
            amount: "10.00".into(),
            redirect_url: "https://merchant.test/refunded".into(),
            remark: "duplicate".into(),
        });

        match build_refund_payload(&request, &vault()).unwrap() {
            RefundPayload::Standard(payload) => {
                assert_eq!(payload.mer_no, "100140");
                assert_eq!(payload.order_no, "ORDER1");
                assert_eq!(payload.return_notify, "https://merchant.test/refunded");
                assert_eq!(payload.remark, "duplicate");
                assert_eq!(
                    payload.signature,
                    crypto::md5_hex("amount=10.00&merNo=100140&orderNo=ORDER1key=KEY")
                );
            }
            other => panic!("expected standard payload, got {:?}", other),
        }
    }

    #[test]
    fn test_terminal_refund_payload_uses_vault_terminal() {
        let request = RefundRequest::Terminal(TerminalRefund {
            terminal_no: None,
            hash: "abc123".into(),
            currency: "USD".into(),
            order_no: "ORDER2".into(),
            refund_amount: "5.00".into(),
            refund_reason: "customer request".into(),
            trade_amount: "10.00".into(),
            trade_no: "T9".into(),
        });
        let vault = vault().with_terminal_no("TERM-1");

        let payload = build_refund_payload(&request, &vault).unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["terminalNo"], "TERM-1");
        assert_eq!(json["hash"], "abc123");
        assert_eq!(json["refundAmount"], "5.00");
        assert_eq!(json["tradeNo"], "T9");
        assert!(json.get("signature").is_none());
    }

    #[test]
    fn test_terminal_refund_payload_blank_terminal_falls_back() {
        let request = RefundRequest::Terminal(TerminalRefund {
            terminal_no: Some(String::new()),
            hash: "abc123".into(),
            currency: "USD".into(),
            order_no: "ORDER2".into(),
            refund_amount: "5.00".into(),
            refund_reason: "customer request".into(),
            trade_amount: "10.00".into(),
            trade_no: "T9".into(),
        });
        let vault = vault().with_terminal_no("TERM-1");

        match build_refund_payload(&request, &vault).unwrap() {
            RefundPayload::Terminal(payload) => assert_eq!(payload.terminal_no, "TERM-1"),
            other => panic!("expected terminal payload, got {:?}", other),
        }
    }
}
