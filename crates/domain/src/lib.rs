//! Domain layer for the checkout service.
//!
//! This crate provides the core domain model:
//! - The untrusted inbound `OrderRequest` aggregate and its validation
//! - Catalog record types resolved from server-side state
//! - The price reconciliation engine that recomputes all amounts

pub mod catalog;
pub mod error;
pub mod pricing;
pub mod request;

pub use catalog::{CatalogAddon, CatalogMenuItem, CatalogMenuOption, ResolvedCatalog};
pub use error::DomainError;
pub use pricing::{
    OrderTotals, PricedOrder, ReconciledLineItem, VerifiedAddon, VerifiedOption, reconcile,
};
pub use request::{
    AddonSelection, OptionSelection, OrderRequest, PaymentMethod, RequestedLineItem,
};
