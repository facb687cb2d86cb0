use async_trait::async_trait;
use serde::Deserialize;

use super::{CreateOrder, PaymentConfirmation, PaymentError, PaymentGateway, PaymentOrder, signature};
use crate::config::PaymentConfig;

/// Orders API client for Razorpay-compatible gateways.
pub struct RazorpayGateway {
    client: reqwest::Client,
    api_base: String,
    key_id: String,
    key_secret: String,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
    amount: i64,
    currency: String,
    receipt: Option<String>,
}

impl RazorpayGateway {
    pub fn new(config: &PaymentConfig) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
        })
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    fn key_id(&self) -> &str {
        &self.key_id
    }

    async fn create_order(&self, order: CreateOrder) -> Result<PaymentOrder, PaymentError> {
        let url = format!("{}/v1/orders", self.api_base);
        tracing::debug!(receipt = %order.receipt, amount = order.amount, "creating payment order");

        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&order)
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PaymentError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp
            .json::<OrderResponse>()
            .await
            .map_err(|e| PaymentError::Decode(e.to_string()))?;

        if body.amount != order.amount {
            return Err(PaymentError::Decode(format!(
                "order amount {} differs from requested {}",
                body.amount, order.amount
            )));
        }

        Ok(PaymentOrder {
            id: body.id,
            amount: body.amount,
            currency: body.currency,
            receipt: body.receipt,
        })
    }

    async fn verify_payment(&self, confirmation: &PaymentConfirmation) -> Result<(), PaymentError> {
        signature::verify(
            &self.key_secret,
            &confirmation.order_id,
            &confirmation.payment_id,
            &confirmation.signature,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn gateway() -> RazorpayGateway {
        RazorpayGateway::new(&PaymentConfig {
            key_id: "rzp_test_key".into(),
            key_secret: "rzp_test_secret".into(),
            api_base: "http://127.0.0.1:9/".into(),
            currency: "INR".into(),
            timeout: Duration::from_millis(200),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn verifies_signed_confirmation() {
        let gw = gateway();
        let signature = signature::sign("rzp_test_secret", "order_1", "pay_1").unwrap();
        let confirmation = PaymentConfirmation {
            order_id: "order_1".into(),
            payment_id: "pay_1".into(),
            signature,
        };
        assert!(gw.verify_payment(&confirmation).await.is_ok());
    }

    #[tokio::test]
    async fn rejects_confirmation_signed_with_other_secret() {
        let gw = gateway();
        let signature = signature::sign("someone_else", "order_1", "pay_1").unwrap();
        let confirmation = PaymentConfirmation {
            order_id: "order_1".into(),
            payment_id: "pay_1".into(),
            signature,
        };
        assert!(matches!(
            gw.verify_payment(&confirmation).await,
            Err(PaymentError::InvalidSignature)
        ));
    }

    #[tokio::test]
    async fn unreachable_gateway_is_a_transport_error() {
        let gw = gateway();
        let result = gw
            .create_order(CreateOrder {
                amount: 50_000,
                currency: "INR".into(),
                receipt: "rcpt_1".into(),
            })
            .await;
        assert!(matches!(result, Err(PaymentError::Transport(_))));
        assert_eq!(gw.api_base, "http://127.0.0.1:9");
    }
}
