//! Price reconciliation engine.
//!
//! Combines resolved catalog state with the client's requested line items
//! to compute trusted per-item and order-level totals. Client-submitted
//! amounts never survive this step.

use common::{AddonId, MenuItemId, MenuOptionId, Money};
use serde::{Deserialize, Serialize};

use crate::catalog::ResolvedCatalog;
use crate::error::{DomainError, Result};
use crate::request::RequestedLineItem;

/// An addon selection verified against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedAddon {
    pub addon_id: AddonId,
    pub name: String,
    pub price: Money,
    /// Always 1: the model does not support addon multiplicity beyond
    /// repeated selections.
    pub quantity: u32,
}

/// An option selection verified against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedOption {
    pub menu_option_id: MenuOptionId,
    pub name: String,
    pub price_adjustment: Money,
    /// The client's chosen value, preserved verbatim.
    pub selected_value: String,
    pub quantity: u32,
}

/// A line item with all amounts recomputed from catalog state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledLineItem {
    pub menu_item_id: MenuItemId,
    /// Catalog name; the client-submitted name is discarded.
    pub name: String,
    pub quantity: u32,
    pub base_price: Money,
    pub addon_total: Money,
    pub options_total: Money,
    /// base_price + addon_total + options_total, not floored at zero.
    pub unit_price: Money,
    /// unit_price × quantity.
    pub subtotal: Money,
    pub verified_addons: Vec<VerifiedAddon>,
    pub verified_options: Vec<VerifiedOption>,
    pub special_instructions: Option<String>,
    pub is_gluten_free: bool,
    pub is_vegetarian: bool,
    pub is_vegan: bool,
    pub requires_special_preparation: bool,
}

/// Order-level recomputed totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub total_amount: Money,
    pub vat: Money,
    pub total_amount_vat: Money,
}

/// The fully reconciled order: line items plus order-level totals.
#[derive(Debug, Clone)]
pub struct PricedOrder {
    pub items: Vec<ReconciledLineItem>,
    pub totals: OrderTotals,
}

/// Reconciles requested line items against the resolved catalog.
///
/// `vat_rate` is a whole-number percentage applied once at order level;
/// per-item VAT is recomputed independently by the persistence step and may
/// differ by rounding.
pub fn reconcile(
    items: &[RequestedLineItem],
    catalog: &ResolvedCatalog,
    vat_rate: u32,
) -> Result<PricedOrder> {
    let reconciled: Vec<ReconciledLineItem> = items
        .iter()
        .map(|item| reconcile_item(item, catalog))
        .collect::<Result<_>>()?;

    let total_amount: Money = reconciled.iter().map(|item| item.subtotal).sum();
    let vat = total_amount.percent(vat_rate);

    Ok(PricedOrder {
        items: reconciled,
        totals: OrderTotals {
            total_amount,
            vat,
            total_amount_vat: total_amount + vat,
        },
    })
}

fn reconcile_item(
    item: &RequestedLineItem,
    catalog: &ResolvedCatalog,
) -> Result<ReconciledLineItem> {
    let menu_item = catalog
        .menu_items
        .get(&item.id)
        .ok_or(DomainError::UnknownMenuItem(item.id))?;

    // Post-resolution every selection should be in the map; a selection that
    // is not contributes zero rather than erroring. The source treats this
    // boundary inconsistency as benign.
    let mut addon_total = Money::zero();
    let mut verified_addons = Vec::new();
    for sel in item
        .selected_addons
        .iter()
        .filter(|sel| !sel.id.is_blank())
    {
        if let Some(addon) = catalog.addons.get(&sel.id) {
            addon_total += addon.price;
            verified_addons.push(VerifiedAddon {
                addon_id: addon.id.clone(),
                name: addon.name.clone(),
                price: addon.price,
                quantity: 1,
            });
        }
    }

    let mut options_total = Money::zero();
    let mut verified_options = Vec::new();
    for sel in item
        .selected_options
        .iter()
        .filter(|sel| !sel.id.is_blank())
    {
        if let Some(option) = catalog.options.get(&sel.id) {
            options_total += option.price_adjustment;
            verified_options.push(VerifiedOption {
                menu_option_id: option.id.clone(),
                name: option.name.clone(),
                price_adjustment: option.price_adjustment,
                selected_value: sel.value.clone(),
                quantity: 1,
            });
        }
    }

    let unit_price = menu_item.price + addon_total + options_total;

    Ok(ReconciledLineItem {
        menu_item_id: item.id,
        name: menu_item.name.clone(),
        quantity: item.quantity,
        base_price: menu_item.price,
        addon_total,
        options_total,
        unit_price,
        subtotal: unit_price.multiply(item.quantity),
        verified_addons,
        verified_options,
        special_instructions: item.special_instructions.clone(),
        is_gluten_free: item.is_gluten_free,
        is_vegetarian: item.is_vegetarian,
        is_vegan: item.is_vegan,
        requires_special_preparation: item.requires_special_preparation,
    })
}
