//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::CheckoutError;

/// API-level error type that maps to the failure envelope.
#[derive(Debug)]
pub enum ApiError {
    /// Structurally invalid request payload.
    BadRequest(String),
    /// Checkout flow error.
    Checkout(CheckoutError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Checkout(err) => checkout_error_to_response(err),
        };

        let body = serde_json::json!({ "success": false, "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, String) {
    match &err {
        // Persistence-stage failures are server faults; everything before
        // the first write is the client's problem.
        CheckoutError::OrderCreate(_)
        | CheckoutError::OrderItemsCreate(_)
        | CheckoutError::OrderAddonsCreate(_)
        | CheckoutError::OrderOptionsCreate(_)
        | CheckoutError::Serialization(_) => {
            tracing::error!(error = %err, "persistence failure");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        _ => (StatusCode::BAD_REQUEST, err.to_string()),
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}
