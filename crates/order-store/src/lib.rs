//! Storage layer for the checkout service.
//!
//! Three narrow interfaces, one backing store:
//! - [`CatalogStore`] — bulk catalog reads by id-set
//! - [`OrderStore`] — ordered aggregate writes plus the compensating delete
//! - [`NotificationStore`] — insert-only, fire-and-forget sink
//!
//! Two implementations are provided: [`InMemoryStore`] for tests and
//! development, and [`PostgresStore`] backed by sqlx.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod records;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use records::{
    InsertedOrderItem, NewNotification, NewOrder, NewOrderItem, NewOrderItemAddon,
    NewOrderItemOption, OrderRecord,
};
pub use store::{CatalogStore, NotificationStore, OrderStore};
