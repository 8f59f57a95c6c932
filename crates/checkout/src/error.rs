//! Checkout error taxonomy.

use common::{AddonId, MenuOptionId};
use domain::DomainError;
use gateway::PaymentError;
use order_store::StoreError;
use thiserror::Error;

fn join_ids<T: std::fmt::Display>(ids: &[T]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors that can occur while placing an order.
///
/// The variants are ordered by the stage that raises them. Everything up
/// to and including `Payment` occurs before any write; the four
/// persistence variants after it may leave a partially written aggregate,
/// which the saga compensates by deleting the order row.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Request validation or price reconciliation failed.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A catalog query errored, or addons were requested and the
    /// availability query came back empty.
    #[error("{0}")]
    CatalogLookup(String),

    /// Requested addon ids that the availability query did not return.
    #[error(
        "Some addons were not found or are not available. Missing addon IDs: {}",
        join_ids(.0)
    )]
    MissingAddons(Vec<AddonId>),

    /// Requested option ids that the catalog query did not return.
    #[error(
        "Some menu options were not found or are not active. Missing option IDs: {}",
        join_ids(.0)
    )]
    MissingOptions(Vec<MenuOptionId>),

    /// Payment dispatch failed. Happens before persistence, so there is
    /// nothing to compensate.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Serialization of the reconciled line items failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The order row insert failed. Terminal; nothing was written.
    #[error("Failed to create order: {0}")]
    OrderCreate(StoreError),

    /// The order-items insert failed; the order row was compensated away.
    #[error("Failed to create order items: {0}")]
    OrderItemsCreate(StoreError),

    /// The addon-rows insert failed; the order row was compensated away.
    #[error("Failed to create order item addons: {0}")]
    OrderAddonsCreate(StoreError),

    /// The option-rows insert failed; the order row was compensated away.
    #[error("Failed to create order item options: {0}")]
    OrderOptionsCreate(StoreError),
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
