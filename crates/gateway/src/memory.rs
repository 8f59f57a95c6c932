//! In-memory payment gateway for testing.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::{PaymentError, Result};
use crate::gateway::{GatewayOrderRequest, GatewayOrderResponse, PaymentGateway};

#[derive(Debug, Default)]
struct InMemoryGatewayState {
    token_requests: u32,
    submissions: Vec<GatewayOrderRequest>,
    next_tracking: u32,
    fail_on_token: bool,
    fail_on_submit: bool,
}

/// In-memory gateway double with failure injection and call observation.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    state: Arc<RwLock<InMemoryGatewayState>>,
}

impl InMemoryGateway {
    /// Creates a new in-memory gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the token endpoint to reject the next call.
    pub fn set_fail_on_token(&self, fail: bool) {
        self.state.write().unwrap().fail_on_token = fail;
    }

    /// Configures the order-submission endpoint to reject the next call.
    pub fn set_fail_on_submit(&self, fail: bool) {
        self.state.write().unwrap().fail_on_submit = fail;
    }

    /// Returns the number of token requests made.
    pub fn token_request_count(&self) -> u32 {
        self.state.read().unwrap().token_requests
    }

    /// Returns the number of order submissions made.
    pub fn submission_count(&self) -> usize {
        self.state.read().unwrap().submissions.len()
    }

    /// Returns the submitted gateway requests.
    pub fn submissions(&self) -> Vec<GatewayOrderRequest> {
        self.state.read().unwrap().submissions.clone()
    }
}

#[async_trait]
impl PaymentGateway for InMemoryGateway {
    async fn request_token(&self) -> Result<String> {
        let mut state = self.state.write().unwrap();
        state.token_requests += 1;
        if state.fail_on_token {
            return Err(PaymentError::Auth("token request returned 401".to_string()));
        }
        Ok("test-bearer-token".to_string())
    }

    async fn submit_order(
        &self,
        token: &str,
        request: GatewayOrderRequest,
    ) -> Result<GatewayOrderResponse> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_submit {
            return Err(PaymentError::Submit(
                "order submission returned 500".to_string(),
            ));
        }
        if token != "test-bearer-token" {
            return Err(PaymentError::Submit("invalid bearer token".to_string()));
        }

        state.next_tracking += 1;
        let tracking = format!("TRK-{:04}", state.next_tracking);
        let response = GatewayOrderResponse {
            redirect_url: format!("https://gateway.test/pay/{}", request.id),
            order_tracking_id: tracking,
        };
        state.submissions.push(request);
        Ok(response)
    }
}
