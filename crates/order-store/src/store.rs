use async_trait::async_trait;
use common::{AddonId, MenuItemId, MenuOptionId, OrderId};
use domain::{CatalogAddon, CatalogMenuItem, CatalogMenuOption};

use crate::Result;
use crate::records::{
    NewNotification, NewOrder, NewOrderItem, NewOrderItemAddon, NewOrderItemOption, OrderRecord,
    InsertedOrderItem,
};

/// Bulk catalog reads by id-set.
///
/// All methods are pure reads. Returning fewer records than requested ids
/// is not an error at this layer; the resolver validates completeness.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetches menu items matching the given ids.
    async fn menu_items_by_ids(&self, ids: &[MenuItemId]) -> Result<Vec<CatalogMenuItem>>;

    /// Fetches addons matching the given ids, restricted to those flagged
    /// available.
    async fn available_addons_by_ids(&self, ids: &[AddonId]) -> Result<Vec<CatalogAddon>>;

    /// Fetches menu options matching the given ids. Options carry no
    /// availability flag.
    async fn options_by_ids(&self, ids: &[MenuOptionId]) -> Result<Vec<CatalogMenuOption>>;
}

/// Ordered writes for the order aggregate, plus the compensating delete.
///
/// Implementations must cascade `delete_order` to previously inserted
/// child rows, or the saga's compensation orphans them.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts the order row and returns the persisted record with its
    /// generated id.
    async fn insert_order(&self, order: NewOrder) -> Result<OrderRecord>;

    /// Bulk-inserts order-item rows, returning the generated id for each
    /// alongside the catalog menu-item id it was created from.
    async fn insert_order_items(
        &self,
        items: Vec<NewOrderItem>,
    ) -> Result<Vec<InsertedOrderItem>>;

    /// Bulk-inserts order-item addon rows.
    async fn insert_item_addons(&self, rows: Vec<NewOrderItemAddon>) -> Result<()>;

    /// Bulk-inserts order-item option rows.
    async fn insert_item_options(&self, rows: Vec<NewOrderItemOption>) -> Result<()>;

    /// Deletes an order by id. This is the saga's compensation primitive.
    async fn delete_order(&self, id: OrderId) -> Result<()>;

    /// Loads an order by id. Returns `None` if it does not exist (or was
    /// compensated away).
    async fn get_order(&self, id: OrderId) -> Result<Option<OrderRecord>>;
}

/// Insert-only notification sink. Callers treat failures as non-fatal.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Inserts a notification row.
    async fn insert_notification(&self, notification: NewNotification) -> Result<()>;
}
