//! Catalog records resolved from server-side state.
//!
//! These are immutable-for-this-request snapshots; they are the source of
//! truth for every price that ends up on a persisted order.

use std::collections::HashMap;

use common::{AddonId, MenuItemId, MenuOptionId, Money};
use serde::{Deserialize, Serialize};

/// A menu item as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogMenuItem {
    pub id: MenuItemId,
    pub name: String,
    pub price: Money,
}

/// An addon as stored in the catalog. Only addons flagged available are
/// ever resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogAddon {
    pub id: AddonId,
    pub name: String,
    pub price: Money,
}

/// A menu option as stored in the catalog. The adjustment may be negative,
/// zero, or positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogMenuOption {
    pub id: MenuOptionId,
    pub name: String,
    pub price_adjustment: Money,
}

/// The three lookup maps produced by catalog resolution.
///
/// Every entry was present and eligible in the catalog at resolution time.
#[derive(Debug, Clone, Default)]
pub struct ResolvedCatalog {
    pub menu_items: HashMap<MenuItemId, CatalogMenuItem>,
    pub addons: HashMap<AddonId, CatalogAddon>,
    pub options: HashMap<MenuOptionId, CatalogMenuOption>,
}

impl ResolvedCatalog {
    /// Builds a resolved catalog from record lists.
    pub fn new(
        menu_items: Vec<CatalogMenuItem>,
        addons: Vec<CatalogAddon>,
        options: Vec<CatalogMenuOption>,
    ) -> Self {
        Self {
            menu_items: menu_items.into_iter().map(|m| (m.id, m)).collect(),
            addons: addons.into_iter().map(|a| (a.id.clone(), a)).collect(),
            options: options.into_iter().map(|o| (o.id.clone(), o)).collect(),
        }
    }
}
