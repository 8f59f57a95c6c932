//! HTTP API server for the food-order checkout service.
//!
//! Exposes order placement plus health and Prometheus metrics endpoints,
//! with structured logging (tracing) and permissive CORS so browser
//! clients can call the API directly.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use checkout::{CheckoutSaga, CheckoutSettings};
use gateway::PaymentGateway;
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::{CatalogStore, NotificationStore, OrderStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
///
/// The CORS layer is fully permissive and answers preflight requests
/// itself, so `OPTIONS /orders` never reaches a handler.
pub fn create_app<S, G>(state: Arc<AppState<S, G>>, metrics_handle: PrometheusHandle) -> Router
where
    S: CatalogStore + OrderStore + NotificationStore + 'static,
    G: PaymentGateway + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create::<S, G>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Builds the shared application state around a store and gateway.
pub fn create_state<S, G>(store: S, gateway: G, settings: CheckoutSettings) -> Arc<AppState<S, G>>
where
    S: CatalogStore + OrderStore + NotificationStore,
    G: PaymentGateway,
{
    Arc::new(AppState {
        saga: CheckoutSaga::new(store, gateway, settings),
    })
}
