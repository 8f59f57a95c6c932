//! In-memory store implementation for testing and development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use common::{AddonId, MenuItemId, MenuOptionId, OrderId, OrderItemId};
use domain::{CatalogAddon, CatalogMenuItem, CatalogMenuOption};

use crate::error::{Result, StoreError};
use crate::records::{
    InsertedOrderItem, NewNotification, NewOrder, NewOrderItem, NewOrderItemAddon,
    NewOrderItemOption, OrderRecord,
};
use crate::store::{CatalogStore, NotificationStore, OrderStore};

#[derive(Debug, Default)]
struct InMemoryState {
    menu_items: HashMap<MenuItemId, CatalogMenuItem>,
    addons: HashMap<AddonId, (CatalogAddon, bool)>,
    options: HashMap<MenuOptionId, CatalogMenuOption>,

    orders: HashMap<OrderId, OrderRecord>,
    order_items: Vec<(OrderItemId, NewOrderItem)>,
    item_addons: Vec<NewOrderItemAddon>,
    item_options: Vec<NewOrderItemOption>,
    notifications: Vec<NewNotification>,

    next_order_id: i64,
    next_order_item_id: i64,

    fail_on_insert_order: bool,
    fail_on_insert_items: bool,
    fail_on_insert_addons: bool,
    fail_on_insert_options: bool,
    fail_on_notify: bool,
    fail_on_catalog_query: bool,
}

/// In-memory implementation of all three storage interfaces.
///
/// Provides failure-injection switches and observation counters so saga
/// tests can exercise every compensation path without a database. The
/// compensating delete cascades to child rows, matching the postgres
/// schema.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<InMemoryState>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a catalog menu item.
    pub fn seed_menu_item(&self, item: CatalogMenuItem) {
        self.state.write().unwrap().menu_items.insert(item.id, item);
    }

    /// Seeds a catalog addon with the given availability flag.
    pub fn seed_addon(&self, addon: CatalogAddon, available: bool) {
        self.state
            .write()
            .unwrap()
            .addons
            .insert(addon.id.clone(), (addon, available));
    }

    /// Seeds a catalog menu option.
    pub fn seed_option(&self, option: CatalogMenuOption) {
        self.state
            .write()
            .unwrap()
            .options
            .insert(option.id.clone(), option);
    }

    /// Configures catalog queries to fail.
    pub fn set_fail_on_catalog_query(&self, fail: bool) {
        self.state.write().unwrap().fail_on_catalog_query = fail;
    }

    /// Configures the order insert to fail.
    pub fn set_fail_on_insert_order(&self, fail: bool) {
        self.state.write().unwrap().fail_on_insert_order = fail;
    }

    /// Configures the order-items insert to fail.
    pub fn set_fail_on_insert_items(&self, fail: bool) {
        self.state.write().unwrap().fail_on_insert_items = fail;
    }

    /// Configures the addon-rows insert to fail.
    pub fn set_fail_on_insert_addons(&self, fail: bool) {
        self.state.write().unwrap().fail_on_insert_addons = fail;
    }

    /// Configures the option-rows insert to fail.
    pub fn set_fail_on_insert_options(&self, fail: bool) {
        self.state.write().unwrap().fail_on_insert_options = fail;
    }

    /// Configures notification inserts to fail.
    pub fn set_fail_on_notify(&self, fail: bool) {
        self.state.write().unwrap().fail_on_notify = fail;
    }

    /// Returns the number of persisted orders.
    pub fn order_count(&self) -> usize {
        self.state.read().unwrap().orders.len()
    }

    /// Returns the number of persisted order-item rows.
    pub fn order_item_count(&self) -> usize {
        self.state.read().unwrap().order_items.len()
    }

    /// Returns the number of persisted addon rows.
    pub fn item_addon_count(&self) -> usize {
        self.state.read().unwrap().item_addons.len()
    }

    /// Returns the number of persisted option rows.
    pub fn item_option_count(&self) -> usize {
        self.state.read().unwrap().item_options.len()
    }

    /// Returns the number of persisted notifications.
    pub fn notification_count(&self) -> usize {
        self.state.read().unwrap().notifications.len()
    }

    /// Returns the persisted order-item rows with their generated ids.
    pub fn order_items(&self) -> Vec<(OrderItemId, NewOrderItem)> {
        self.state.read().unwrap().order_items.clone()
    }

    /// Returns the persisted addon rows.
    pub fn item_addons(&self) -> Vec<NewOrderItemAddon> {
        self.state.read().unwrap().item_addons.clone()
    }

    /// Returns the persisted option rows.
    pub fn item_options(&self) -> Vec<NewOrderItemOption> {
        self.state.read().unwrap().item_options.clone()
    }

    /// Returns the persisted notifications.
    pub fn notifications(&self) -> Vec<NewNotification> {
        self.state.read().unwrap().notifications.clone()
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn menu_items_by_ids(&self, ids: &[MenuItemId]) -> Result<Vec<CatalogMenuItem>> {
        let state = self.state.read().unwrap();
        if state.fail_on_catalog_query {
            return Err(StoreError::Backend("catalog query failed".to_string()));
        }
        Ok(ids
            .iter()
            .filter_map(|id| state.menu_items.get(id).cloned())
            .collect())
    }

    async fn available_addons_by_ids(&self, ids: &[AddonId]) -> Result<Vec<CatalogAddon>> {
        let state = self.state.read().unwrap();
        if state.fail_on_catalog_query {
            return Err(StoreError::Backend("catalog query failed".to_string()));
        }
        Ok(ids
            .iter()
            .filter_map(|id| state.addons.get(id))
            .filter(|(_, available)| *available)
            .map(|(addon, _)| addon.clone())
            .collect())
    }

    async fn options_by_ids(&self, ids: &[MenuOptionId]) -> Result<Vec<CatalogMenuOption>> {
        let state = self.state.read().unwrap();
        if state.fail_on_catalog_query {
            return Err(StoreError::Backend("catalog query failed".to_string()));
        }
        Ok(ids
            .iter()
            .filter_map(|id| state.options.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn insert_order(&self, order: NewOrder) -> Result<OrderRecord> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_insert_order {
            return Err(StoreError::Backend("order insert failed".to_string()));
        }

        state.next_order_id += 1;
        let id = OrderId::new(state.next_order_id);
        let record = OrderRecord::from_new(id, order, Utc::now());
        state.orders.insert(id, record.clone());
        Ok(record)
    }

    async fn insert_order_items(
        &self,
        items: Vec<NewOrderItem>,
    ) -> Result<Vec<InsertedOrderItem>> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_insert_items {
            return Err(StoreError::Backend("order items insert failed".to_string()));
        }

        let mut inserted = Vec::with_capacity(items.len());
        for item in items {
            state.next_order_item_id += 1;
            let id = OrderItemId::new(state.next_order_item_id);
            inserted.push(InsertedOrderItem {
                id,
                menu_item_id: item.menu_item_id,
            });
            state.order_items.push((id, item));
        }
        Ok(inserted)
    }

    async fn insert_item_addons(&self, rows: Vec<NewOrderItemAddon>) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_insert_addons {
            return Err(StoreError::Backend("addon rows insert failed".to_string()));
        }
        state.item_addons.extend(rows);
        Ok(())
    }

    async fn insert_item_options(&self, rows: Vec<NewOrderItemOption>) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_insert_options {
            return Err(StoreError::Backend("option rows insert failed".to_string()));
        }
        state.item_options.extend(rows);
        Ok(())
    }

    async fn delete_order(&self, id: OrderId) -> Result<()> {
        let mut state = self.state.write().unwrap();
        state.orders.remove(&id);

        // Cascade to child rows, as the postgres schema does.
        let orphaned: Vec<OrderItemId> = state
            .order_items
            .iter()
            .filter(|(_, item)| item.order_id == id)
            .map(|(item_id, _)| *item_id)
            .collect();
        state.order_items.retain(|(_, item)| item.order_id != id);
        state
            .item_addons
            .retain(|row| !orphaned.contains(&row.order_item_id));
        state
            .item_options
            .retain(|row| !orphaned.contains(&row.order_item_id));
        Ok(())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<OrderRecord>> {
        Ok(self.state.read().unwrap().orders.get(&id).cloned())
    }
}

#[async_trait]
impl NotificationStore for InMemoryStore {
    async fn insert_notification(&self, notification: NewNotification) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_notify {
            return Err(StoreError::Backend("notification insert failed".to_string()));
        }
        state.notifications.push(notification);
        Ok(())
    }
}
