//! Payment-method dispatch.
//!
//! A two-state branch keyed by the request's payment method: cash orders
//! make no external call and keep the client-requested status; online
//! orders run the gateway's two-call protocol and are forced to
//! "Awaiting Payment". Dispatch happens before any persistence, so a
//! failed gateway call aborts the flow with nothing to compensate.

use common::Money;
use domain::PaymentMethod;
use uuid::Uuid;

use crate::error::{PaymentError, Result};
use crate::gateway::{BillingAddress, GatewayOrderRequest, PaymentGateway};

/// Status forced onto orders that await gateway confirmation.
pub const AWAITING_PAYMENT_STATUS: &str = "Awaiting Payment";

/// Description sent with every gateway order.
const ORDER_DESCRIPTION: &str = "Payment for food delivery";

// Billing identity other than the phone number is fixed placeholder data.
// Intentional, pending product clarification; do not substitute guesses.
const PLACEHOLDER_EMAIL: &str = "orders@placeholder.invalid";
const PLACEHOLDER_COUNTRY_CODE: &str = "UG";
const PLACEHOLDER_FIRST_NAME: &str = "Guest";
const PLACEHOLDER_LAST_NAME: &str = "Customer";

/// Gateway-facing settings carried in the service configuration.
#[derive(Debug, Clone)]
pub struct PaymentSettings {
    pub currency: String,
    pub callback_url: String,
    pub notification_id: String,
}

/// The dispatcher's verdict: the initial order status plus, for online
/// payments, where to send the customer and how to track the payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentOutcome {
    pub status: String,
    pub tracking_id: Option<String>,
    pub redirect_url: Option<String>,
}

/// Branches on the payment method and, for online payments, runs the
/// gateway protocol with the recomputed VAT-inclusive total.
#[tracing::instrument(skip(gateway, settings), fields(method = %method_raw))]
pub async fn dispatch<G: PaymentGateway>(
    gateway: &G,
    settings: &PaymentSettings,
    method_raw: &str,
    requested_status: &str,
    total_amount_vat: Money,
    phone_number: &str,
) -> Result<PaymentOutcome> {
    match PaymentMethod::parse(method_raw) {
        Some(PaymentMethod::Cash) => {
            tracing::info!("cash payment, no gateway call required");
            Ok(PaymentOutcome {
                status: requested_status.to_string(),
                tracking_id: None,
                redirect_url: None,
            })
        }
        Some(PaymentMethod::Online) => {
            let token = gateway.request_token().await?;
            let request = GatewayOrderRequest {
                id: Uuid::new_v4().to_string(),
                currency: settings.currency.clone(),
                amount: total_amount_vat,
                description: ORDER_DESCRIPTION.to_string(),
                callback_url: settings.callback_url.clone(),
                notification_id: settings.notification_id.clone(),
                billing_address: BillingAddress {
                    email_address: PLACEHOLDER_EMAIL.to_string(),
                    phone_number: phone_number.to_string(),
                    country_code: PLACEHOLDER_COUNTRY_CODE.to_string(),
                    first_name: PLACEHOLDER_FIRST_NAME.to_string(),
                    middle_name: String::new(),
                    last_name: PLACEHOLDER_LAST_NAME.to_string(),
                    line_1: String::new(),
                    line_2: String::new(),
                    city: String::new(),
                    state: String::new(),
                    postal_code: String::new(),
                    zip_code: String::new(),
                },
            };
            let response = gateway.submit_order(&token, request).await?;
            tracing::info!(tracking_id = %response.order_tracking_id, "gateway order created");
            Ok(PaymentOutcome {
                status: AWAITING_PAYMENT_STATUS.to_string(),
                tracking_id: Some(response.order_tracking_id),
                redirect_url: Some(response.redirect_url),
            })
        }
        None => Err(PaymentError::UnsupportedMethod(method_raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryGateway;

    fn settings() -> PaymentSettings {
        PaymentSettings {
            currency: "UGX".to_string(),
            callback_url: "https://example.test/callback".to_string(),
            notification_id: "notif-1".to_string(),
        }
    }

    #[tokio::test]
    async fn cash_keeps_requested_status_and_skips_gateway() {
        let gateway = InMemoryGateway::new();

        let outcome = dispatch(
            &gateway,
            &settings(),
            "cash",
            "pending",
            Money::from_minor(25960),
            "0700000001",
        )
        .await
        .unwrap();

        assert_eq!(outcome.status, "pending");
        assert!(outcome.tracking_id.is_none());
        assert!(outcome.redirect_url.is_none());
        assert_eq!(gateway.token_request_count(), 0);
        assert_eq!(gateway.submission_count(), 0);
    }

    #[tokio::test]
    async fn online_forces_awaiting_payment() {
        let gateway = InMemoryGateway::new();

        let outcome = dispatch(
            &gateway,
            &settings(),
            "Online",
            "pending",
            Money::from_minor(25960),
            "0700000001",
        )
        .await
        .unwrap();

        assert_eq!(outcome.status, AWAITING_PAYMENT_STATUS);
        assert!(outcome.tracking_id.is_some());
        assert!(outcome.redirect_url.is_some());

        let submitted = &gateway.submissions()[0];
        assert_eq!(submitted.amount.minor(), 25960);
        assert_eq!(submitted.billing_address.phone_number, "0700000001");
        assert_eq!(submitted.currency, "UGX");
    }

    #[tokio::test]
    async fn token_rejection_fails_before_submission() {
        let gateway = InMemoryGateway::new();
        gateway.set_fail_on_token(true);

        let result = dispatch(
            &gateway,
            &settings(),
            "online",
            "pending",
            Money::from_minor(1000),
            "0700000001",
        )
        .await;

        assert!(matches!(result, Err(PaymentError::Auth(_))));
        assert_eq!(gateway.submission_count(), 0);
    }

    #[tokio::test]
    async fn unknown_method_is_rejected_with_raw_value() {
        let gateway = InMemoryGateway::new();

        let result = dispatch(
            &gateway,
            &settings(),
            "crypto",
            "pending",
            Money::from_minor(1000),
            "0700000001",
        )
        .await;

        match result {
            Err(PaymentError::UnsupportedMethod(method)) => assert_eq!(method, "crypto"),
            other => panic!("expected UnsupportedMethod, got {other:?}"),
        }
        assert_eq!(gateway.token_request_count(), 0);
    }
}
