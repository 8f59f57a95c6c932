//! Order placement endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use checkout::{CheckoutReceipt, CheckoutSaga};
use domain::OrderRequest;
use gateway::PaymentGateway;
use order_store::{CatalogStore, NotificationStore, OrderStore};
use serde::Serialize;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S, G>
where
    S: CatalogStore + OrderStore + NotificationStore,
    G: PaymentGateway,
{
    pub saga: CheckoutSaga<S, G>,
}

/// The success envelope: the persisted order plus the payment result.
#[derive(Serialize)]
pub struct OrderPlacedResponse {
    pub success: bool,
    pub data: CheckoutReceipt,
}

/// POST /orders — verify pricing, dispatch payment, persist the order.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S, G>(
    State(state): State<Arc<AppState<S, G>>>,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> Result<Json<OrderPlacedResponse>, ApiError>
where
    S: CatalogStore + OrderStore + NotificationStore + 'static,
    G: PaymentGateway + 'static,
{
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let receipt = state.saga.place_order(request).await?;
    Ok(Json(OrderPlacedResponse {
        success: true,
        data: receipt,
    }))
}
