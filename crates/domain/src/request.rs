//! The untrusted inbound order request.
//!
//! Prices, names, and totals submitted by the client are advisory only;
//! the service recomputes everything from catalog state before persisting.

use std::collections::HashSet;

use common::{AddonId, MenuItemId, MenuOptionId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};

/// Default requested status for orders that do not go through a gateway.
pub const DEFAULT_STATUS: &str = "pending";

/// Payment methods supported by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Pay on delivery, no gateway involved.
    Cash,
    /// Online payment through the gateway.
    Online,
}

impl PaymentMethod {
    /// Parses a payment method string, case-insensitively.
    ///
    /// Returns `None` for anything other than "cash" or "online"; the
    /// dispatcher turns that into an unsupported-method error carrying the
    /// raw value.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "cash" => Some(Self::Cash),
            "online" => Some(Self::Online),
            _ => None,
        }
    }
}

/// A single addon selection on a requested line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddonSelection {
    pub id: AddonId,
}

/// A single option selection on a requested line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionSelection {
    pub id: MenuOptionId,
    /// The chosen value, preserved verbatim through reconciliation.
    #[serde(default)]
    pub value: String,
}

/// A client-requested line item referencing catalog records by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestedLineItem {
    /// Catalog menu-item id.
    pub id: MenuItemId,
    pub quantity: u32,
    #[serde(default, alias = "selectedAddons")]
    pub selected_addons: Vec<AddonSelection>,
    #[serde(default, alias = "selectedOptionDetails")]
    pub selected_options: Vec<OptionSelection>,
    #[serde(default)]
    pub special_instructions: Option<String>,
    #[serde(default)]
    pub is_gluten_free: bool,
    #[serde(default)]
    pub is_vegetarian: bool,
    #[serde(default)]
    pub is_vegan: bool,
    #[serde(default)]
    pub requires_special_preparation: bool,
}

/// The client-submitted order aggregate.
///
/// The advisory totals (`total_amount`, `vat`, `total_amount_vat`) are
/// accepted for wire compatibility and then discarded; recomputed figures
/// always supersede them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    #[serde(default)]
    pub order_items: Vec<RequestedLineItem>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub total_amount: Option<i64>,
    #[serde(default)]
    pub vat: Option<i64>,
    #[serde(default)]
    pub total_amount_vat: Option<i64>,
    /// The status the client requests for the order. Honored for cash
    /// payments; overridden by the dispatcher for online payments.
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub delivery_method: Option<String>,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub delivery_person_id: Option<i64>,
    #[serde(default)]
    pub order_note: Option<String>,
    #[serde(default)]
    pub delivery_address: String,
    #[serde(default)]
    pub delivery_longitude: Option<f64>,
    #[serde(default)]
    pub delivery_latitude: Option<f64>,
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

impl OrderRequest {
    /// Validates the required request fields.
    ///
    /// Required: a non-empty line-item list, delivery address, phone
    /// number, and user identity. Fails before any downstream work begins.
    pub fn validate(&self) -> Result<()> {
        if self.order_items.is_empty()
            || self.delivery_address.trim().is_empty()
            || self.phone_number.trim().is_empty()
            || self.user_id.is_none()
        {
            return Err(DomainError::Validation);
        }
        Ok(())
    }

    /// Distinct menu-item ids referenced by the request, in request order.
    pub fn menu_item_ids(&self) -> Vec<MenuItemId> {
        let mut seen = HashSet::new();
        self.order_items
            .iter()
            .map(|item| item.id)
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Distinct non-blank addon ids referenced anywhere in the request.
    pub fn addon_ids(&self) -> Vec<AddonId> {
        let mut seen = HashSet::new();
        self.order_items
            .iter()
            .flat_map(|item| item.selected_addons.iter())
            .filter(|sel| !sel.id.is_blank())
            .map(|sel| sel.id.clone())
            .filter(|id| seen.insert(id.clone()))
            .collect()
    }

    /// Distinct non-blank option ids referenced anywhere in the request.
    pub fn option_ids(&self) -> Vec<MenuOptionId> {
        let mut seen = HashSet::new();
        self.order_items
            .iter()
            .flat_map(|item| item.selected_options.iter())
            .filter(|sel| !sel.id.is_blank())
            .map(|sel| sel.id.clone())
            .filter(|id| seen.insert(id.clone()))
            .collect()
    }

    /// Text representation of the delivery point, when both coordinates
    /// are present.
    pub fn delivery_location_geog(&self) -> Option<String> {
        match (self.delivery_longitude, self.delivery_latitude) {
            (Some(lon), Some(lat)) => Some(format!("POINT({lon} {lat})")),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_item(id: i64) -> RequestedLineItem {
        RequestedLineItem {
            id: MenuItemId::new(id),
            quantity: 1,
            selected_addons: vec![],
            selected_options: vec![],
            special_instructions: None,
            is_gluten_free: false,
            is_vegetarian: false,
            is_vegan: false,
            requires_special_preparation: false,
        }
    }

    fn valid_request() -> OrderRequest {
        OrderRequest {
            order_items: vec![line_item(1)],
            user_id: Some(UserId::new()),
            total_amount: None,
            vat: None,
            total_amount_vat: None,
            status: DEFAULT_STATUS.to_string(),
            phone_number: "0700000001".to_string(),
            delivery_method: Some("delivery".to_string()),
            payment_method: "cash".to_string(),
            delivery_person_id: None,
            order_note: None,
            delivery_address: "1 Test Lane".to_string(),
            delivery_longitude: None,
            delivery_latitude: None,
        }
    }

    #[test]
    fn validate_accepts_complete_request() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_items() {
        let mut req = valid_request();
        req.order_items.clear();
        assert!(matches!(req.validate(), Err(DomainError::Validation)));
    }

    #[test]
    fn validate_rejects_blank_address() {
        let mut req = valid_request();
        req.delivery_address = "   ".to_string();
        assert!(matches!(req.validate(), Err(DomainError::Validation)));
    }

    #[test]
    fn validate_rejects_missing_user() {
        let mut req = valid_request();
        req.user_id = None;
        assert!(matches!(req.validate(), Err(DomainError::Validation)));
    }

    #[test]
    fn addon_ids_skip_blanks_and_duplicates() {
        let mut req = valid_request();
        req.order_items[0].selected_addons = vec![
            AddonSelection { id: AddonId::new("a1") },
            AddonSelection { id: AddonId::new("  ") },
            AddonSelection { id: AddonId::new("a1") },
            AddonSelection { id: AddonId::new("a2") },
        ];
        let ids = req.addon_ids();
        assert_eq!(ids, vec![AddonId::new("a1"), AddonId::new("a2")]);
    }

    #[test]
    fn menu_item_ids_are_distinct() {
        let mut req = valid_request();
        req.order_items.push(line_item(1));
        req.order_items.push(line_item(2));
        assert_eq!(
            req.menu_item_ids(),
            vec![MenuItemId::new(1), MenuItemId::new(2)]
        );
    }

    #[test]
    fn payment_method_parse_is_case_insensitive() {
        assert_eq!(PaymentMethod::parse("Cash"), Some(PaymentMethod::Cash));
        assert_eq!(PaymentMethod::parse("ONLINE"), Some(PaymentMethod::Online));
        assert_eq!(PaymentMethod::parse("crypto"), None);
    }

    #[test]
    fn delivery_location_requires_both_coordinates() {
        let mut req = valid_request();
        assert!(req.delivery_location_geog().is_none());
        req.delivery_longitude = Some(32.58);
        assert!(req.delivery_location_geog().is_none());
        req.delivery_latitude = Some(0.31);
        assert_eq!(
            req.delivery_location_geog().as_deref(),
            Some("POINT(32.58 0.31)")
        );
    }

    #[test]
    fn deserializes_client_field_aliases() {
        let json = serde_json::json!({
            "order_items": [{
                "id": 7,
                "quantity": 2,
                "selectedAddons": [{"id": "a1"}],
                "selectedOptionDetails": [{"id": "o1", "value": "large"}]
            }],
            "user_id": uuid::Uuid::new_v4(),
            "phone_number": "0700000001",
            "delivery_address": "1 Test Lane",
            "payment_method": "cash"
        });
        let req: OrderRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.order_items[0].selected_addons.len(), 1);
        assert_eq!(req.order_items[0].selected_options[0].value, "large");
        assert_eq!(req.status, DEFAULT_STATUS);
    }
}
