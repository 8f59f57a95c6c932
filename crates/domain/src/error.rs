//! Domain error types.

use common::MenuItemId;
use thiserror::Error;

/// Errors that can occur during request validation and price reconciliation.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The inbound request is missing required fields.
    #[error("Missing required fields")]
    Validation,

    /// A requested menu item id was accepted by the bulk catalog fetch but
    /// is absent from the resolved map. This signals a resolver contract
    /// violation, not a normal catalog miss.
    #[error("Menu item with id {0} not found")]
    UnknownMenuItem(MenuItemId),
}

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;
