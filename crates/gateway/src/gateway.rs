//! Payment gateway trait and wire types.

use async_trait::async_trait;
use common::Money;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Billing details sent with a gateway order submission.
///
/// Only the phone number is customer-derived; the remaining identity
/// fields are fixed placeholder values (a known limitation, kept
/// deliberately).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingAddress {
    pub email_address: String,
    pub phone_number: String,
    pub country_code: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub line_1: String,
    pub line_2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub zip_code: String,
}

/// An order-creation request submitted to the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrderRequest {
    /// Request-scoped identifier, freshly generated per submission.
    pub id: String,
    pub currency: String,
    pub amount: Money,
    pub description: String,
    pub callback_url: String,
    pub notification_id: String,
    pub billing_address: BillingAddress,
}

/// A successful gateway order submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrderResponse {
    /// Where the customer completes the payment.
    pub redirect_url: String,
    /// The gateway's tracking identifier, retained on the order row.
    pub order_tracking_id: String,
}

/// The payment gateway's two-call protocol.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Acquires a bearer token by posting the configured consumer
    /// credentials.
    async fn request_token(&self) -> Result<String>;

    /// Submits an order-creation request, bearer-authenticated.
    async fn submit_order(
        &self,
        token: &str,
        request: GatewayOrderRequest,
    ) -> Result<GatewayOrderResponse>;
}
