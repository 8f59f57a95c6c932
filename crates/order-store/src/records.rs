//! Row types for the order aggregate and the notification sink.

use chrono::{DateTime, Utc};
use common::{AddonId, MenuItemId, MenuOptionId, Money, OrderId, OrderItemId, UserId};
use serde::{Deserialize, Serialize};

/// An order row ready for insertion. All amounts are recomputed; the
/// reconciled line items are embedded as JSON for audit and display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: UserId,
    pub order_items: serde_json::Value,
    pub total_amount: Money,
    pub vat: Money,
    pub total_amount_vat: Money,
    pub status: String,
    pub payment_status: String,
    pub payment_method: String,
    pub phone_number: String,
    pub delivery_address: String,
    pub delivery_method: Option<String>,
    pub delivery_person_id: Option<i64>,
    pub order_note: Option<String>,
    pub delivery_latitude: Option<f64>,
    pub delivery_longitude: Option<f64>,
    pub delivery_location_geog: Option<String>,
    /// Gateway tracking identifier; present only for online payments.
    pub tracking_id: Option<String>,
}

/// A persisted order row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    pub user_id: UserId,
    pub order_items: serde_json::Value,
    pub total_amount: Money,
    pub vat: Money,
    pub total_amount_vat: Money,
    pub status: String,
    pub payment_status: String,
    pub payment_method: String,
    pub phone_number: String,
    pub delivery_address: String,
    pub delivery_method: Option<String>,
    pub delivery_person_id: Option<i64>,
    pub order_note: Option<String>,
    pub delivery_latitude: Option<f64>,
    pub delivery_longitude: Option<f64>,
    pub delivery_location_geog: Option<String>,
    pub tracking_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OrderRecord {
    /// Builds the persisted record from an insert row and a generated id.
    pub fn from_new(id: OrderId, new: NewOrder, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: new.user_id,
            order_items: new.order_items,
            total_amount: new.total_amount,
            vat: new.vat,
            total_amount_vat: new.total_amount_vat,
            status: new.status,
            payment_status: new.payment_status,
            payment_method: new.payment_method,
            phone_number: new.phone_number,
            delivery_address: new.delivery_address,
            delivery_method: new.delivery_method,
            delivery_person_id: new.delivery_person_id,
            order_note: new.order_note,
            delivery_latitude: new.delivery_latitude,
            delivery_longitude: new.delivery_longitude,
            delivery_location_geog: new.delivery_location_geog,
            tracking_id: new.tracking_id,
            created_at,
        }
    }
}

/// An order-item row ready for insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub order_id: OrderId,
    pub menu_item_id: MenuItemId,
    pub item_name: String,
    pub base_price: Money,
    pub quantity: u32,
    pub subtotal: Money,
    pub addon_total: Money,
    pub total_item_price: Money,
    /// Per-item VAT, recomputed independently from the order-level figure.
    pub vat: Money,
    pub special_instructions: Option<String>,
    pub is_gluten_free: bool,
    pub is_vegetarian: bool,
    pub is_vegan: bool,
    pub requires_special_preparation: bool,
}

/// Generated id returned for each inserted order item, paired with the
/// catalog id it was created from so addon/option rows can link to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertedOrderItem {
    pub id: OrderItemId,
    pub menu_item_id: MenuItemId,
}

/// An order-item addon row ready for insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderItemAddon {
    pub order_item_id: OrderItemId,
    pub addon_id: AddonId,
    pub quantity: u32,
    pub addon_price: Money,
}

/// An order-item option row ready for insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderItemOption {
    pub order_item_id: OrderItemId,
    pub menu_option_id: MenuOptionId,
    pub quantity: u32,
    pub option_price_adjustment: Money,
    pub option_name: String,
    pub selected_value: String,
}

/// A fire-and-forget notification row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: UserId,
    pub order_id: OrderId,
    pub title: String,
    pub body: String,
    pub kind: String,
    pub is_read: bool,
}
