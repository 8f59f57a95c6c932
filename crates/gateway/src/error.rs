//! Payment error types.

use thiserror::Error;

/// Errors raised while dispatching payment for an order.
///
/// All of these occur before any persistence, so none require
/// compensation.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The request named a payment method the dispatcher does not support.
    #[error("Unsupported payment method: {0}")]
    UnsupportedMethod(String),

    /// Token acquisition failed (non-success response, transport error, or
    /// malformed body).
    #[error("Failed to generate payment authentication token: {0}")]
    Auth(String),

    /// Order submission to the gateway failed.
    #[error("Failed to create payment order with gateway: {0}")]
    Submit(String),
}

/// Result type for payment operations.
pub type Result<T> = std::result::Result<T, PaymentError>;
