//! Pesapal HTTP implementation of the payment gateway.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{PaymentError, Result};
use crate::gateway::{GatewayOrderRequest, GatewayOrderResponse, PaymentGateway};

/// Connection settings for the Pesapal API.
#[derive(Debug, Clone)]
pub struct PesapalConfig {
    /// Base URL of the API, without a trailing slash.
    pub api_url: String,
    pub consumer_key: String,
    pub consumer_secret: String,
}

/// HTTP client for the Pesapal token and order-submission endpoints.
///
/// No retries: a single failed attempt aborts the whole order-creation
/// flow before any persistence occurs.
#[derive(Clone)]
pub struct PesapalGateway {
    client: reqwest::Client,
    config: PesapalConfig,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

impl PesapalGateway {
    /// Creates a gateway client from connection settings.
    pub fn new(config: PesapalConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl PaymentGateway for PesapalGateway {
    #[tracing::instrument(skip(self))]
    async fn request_token(&self) -> Result<String> {
        let url = format!("{}/api/Auth/RequestToken", self.config.api_url);
        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .json(&serde_json::json!({
                "consumer_key": self.config.consumer_key,
                "consumer_secret": self.config.consumer_secret,
            }))
            .send()
            .await
            .map_err(|e| PaymentError::Auth(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, %body, "gateway token request rejected");
            return Err(PaymentError::Auth(format!(
                "token request returned {status}"
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::Auth(e.to_string()))?;
        Ok(body.token)
    }

    #[tracing::instrument(skip(self, token, request), fields(request_id = %request.id))]
    async fn submit_order(
        &self,
        token: &str,
        request: GatewayOrderRequest,
    ) -> Result<GatewayOrderResponse> {
        let url = format!(
            "{}/api/Transactions/SubmitOrderRequest",
            self.config.api_url
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .map_err(|e| PaymentError::Submit(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, %body, "gateway order submission rejected");
            return Err(PaymentError::Submit(format!(
                "order submission returned {status}"
            )));
        }

        response
            .json::<GatewayOrderResponse>()
            .await
            .map_err(|e| PaymentError::Submit(e.to_string()))
    }
}
