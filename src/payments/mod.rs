//! Payment gateway adapter.
//!
//! The booking flow only talks to [`PaymentGateway`]; the production
//! implementation is [`razorpay::RazorpayGateway`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

pub mod razorpay;
pub mod signature;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment signature does not match")]
    InvalidSignature,

    #[error("gateway unreachable: {0}")]
    Transport(String),

    #[error("gateway rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("unexpected gateway response: {0}")]
    Decode(String),
}

/// Order creation request, amount in minor currency units.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrder {
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
}

/// Gateway-issued order correlated with one appointment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PaymentOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub receipt: Option<String>,
}

/// The triple the checkout widget hands back to the browser.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PaymentConfirmation {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Public key the browser checkout needs alongside the order id.
    fn key_id(&self) -> &str;

    async fn create_order(&self, order: CreateOrder) -> Result<PaymentOrder, PaymentError>;

    /// Succeeds only when the confirmation was signed with the gateway secret.
    async fn verify_payment(&self, confirmation: &PaymentConfirmation) -> Result<(), PaymentError>;
}
