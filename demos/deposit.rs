//! Example deposit against a Foxtrot gateway
//!
//! Reads credentials from `FOXTROT_*` environment variables.

use foxtrot::{ClientConfig, DepositRequest, FoxtrotClient, FoxtrotError, Outcome, Vault};
use std::time::Duration;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let vault = Vault::from_env()?;
    let config = ClientConfig::new().with_timeout(Duration::from_secs(15));
    let client = FoxtrotClient::with_vault(vault, config)?;

    let request = DepositRequest {
        first_name: Some("Juan".into()),
        last_name: Some("Cruz".into()),
        email: Some("juan@example.com".into()),
        amount: "10.00".into(),
        currency: "USD".into(),
        card_number: "4111111111111111".into(),
        card_exp_month: "12".into(),
        card_exp_year: "2030".into(),
        card_cvv2: "123".into(),
        return_url: "https://merchant.example/return".into(),
        bill_no: "2474193466".into(),
        ip: "203.0.113.7".into(),
        notify_url: "https://merchant.example/notify".into(),
        ..Default::default()
    };

    match client.deposit(&request).await {
        Ok(reply) if reply.outcome == Outcome::Pending => {
            println!("Deposit pending, order {:?}", reply.response.order_no);
        }
        Ok(reply) => {
            println!("Deposit succeeded, order {:?}", reply.response.order_no);
        }
        Err(FoxtrotError::GatewayRejected(rejection)) => {
            println!(
                "Deposit rejected: {} (fixable: {})",
                rejection.message, rejection.fixable
            );
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
