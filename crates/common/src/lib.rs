//! Shared types for the checkout service.

pub mod ids;
pub mod money;

pub use ids::{AddonId, MenuItemId, MenuOptionId, OrderId, OrderItemId, UserId};
pub use money::Money;
