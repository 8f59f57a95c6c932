//! Catalog resolver.
//!
//! Pure read phase: turns the id sets referenced by a request into typed
//! catalog maps, validating completeness for addons and options. Menu-item
//! completeness is validated downstream by reconciliation, which knows
//! which line item referenced the missing id.

use std::collections::HashSet;

use domain::{OrderRequest, ResolvedCatalog};
use order_store::CatalogStore;

use crate::error::{CheckoutError, Result};

/// Resolves the catalog records referenced by the request.
///
/// Addons are restricted to those flagged available; a non-empty addon
/// request answered with an empty result set is a hard failure rather
/// than "zero matches". Options carry no availability flag. For both,
/// a partial miss fails naming every missing id.
#[tracing::instrument(skip(store, request))]
pub async fn resolve<C: CatalogStore>(
    store: &C,
    request: &OrderRequest,
) -> Result<ResolvedCatalog> {
    let menu_items = store
        .menu_items_by_ids(&request.menu_item_ids())
        .await
        .map_err(|e| CheckoutError::CatalogLookup(format!("Failed to fetch menu items: {e}")))?;

    let addon_ids = request.addon_ids();
    let addons = if addon_ids.is_empty() {
        Vec::new()
    } else {
        let found = store.available_addons_by_ids(&addon_ids).await.map_err(|e| {
            CheckoutError::CatalogLookup(format!("Failed to fetch addon prices: {e}"))
        })?;
        if found.is_empty() {
            return Err(CheckoutError::CatalogLookup(
                "No addons found in the database".to_string(),
            ));
        }
        let found_ids: HashSet<_> = found.iter().map(|addon| addon.id.clone()).collect();
        let missing: Vec<_> = addon_ids
            .into_iter()
            .filter(|id| !found_ids.contains(id))
            .collect();
        if !missing.is_empty() {
            return Err(CheckoutError::MissingAddons(missing));
        }
        found
    };

    let option_ids = request.option_ids();
    let options = if option_ids.is_empty() {
        Vec::new()
    } else {
        let found = store.options_by_ids(&option_ids).await.map_err(|e| {
            CheckoutError::CatalogLookup(format!("Failed to fetch menu options: {e}"))
        })?;
        let found_ids: HashSet<_> = found.iter().map(|option| option.id.clone()).collect();
        let missing: Vec<_> = option_ids
            .into_iter()
            .filter(|id| !found_ids.contains(id))
            .collect();
        if !missing.is_empty() {
            return Err(CheckoutError::MissingOptions(missing));
        }
        found
    };

    Ok(ResolvedCatalog::new(menu_items, addons, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{AddonId, MenuItemId, MenuOptionId, Money, UserId};
    use domain::{
        AddonSelection, CatalogAddon, CatalogMenuItem, CatalogMenuOption, OptionSelection,
        RequestedLineItem,
    };
    use order_store::InMemoryStore;

    fn request_with(
        addons: Vec<AddonSelection>,
        options: Vec<OptionSelection>,
    ) -> OrderRequest {
        OrderRequest {
            order_items: vec![RequestedLineItem {
                id: MenuItemId::new(1),
                quantity: 1,
                selected_addons: addons,
                selected_options: options,
                special_instructions: None,
                is_gluten_free: false,
                is_vegetarian: false,
                is_vegan: false,
                requires_special_preparation: false,
            }],
            user_id: Some(UserId::new()),
            total_amount: None,
            vat: None,
            total_amount_vat: None,
            status: "pending".to_string(),
            phone_number: "0700000001".to_string(),
            delivery_method: None,
            payment_method: "cash".to_string(),
            delivery_person_id: None,
            order_note: None,
            delivery_address: "1 Test Lane".to_string(),
            delivery_longitude: None,
            delivery_latitude: None,
        }
    }

    fn seeded_store() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.seed_menu_item(CatalogMenuItem {
            id: MenuItemId::new(1),
            name: "Grilled Chicken".to_string(),
            price: Money::from_minor(10000),
        });
        store.seed_addon(
            CatalogAddon {
                id: AddonId::new("a1"),
                name: "Extra Cheese".to_string(),
                price: Money::from_minor(1500),
            },
            true,
        );
        store.seed_option(CatalogMenuOption {
            id: MenuOptionId::new("o1"),
            name: "Portion".to_string(),
            price_adjustment: Money::from_minor(-500),
        });
        store
    }

    #[tokio::test]
    async fn resolves_all_three_maps() {
        let store = seeded_store();
        let request = request_with(
            vec![AddonSelection { id: AddonId::new("a1") }],
            vec![OptionSelection {
                id: MenuOptionId::new("o1"),
                value: "half".to_string(),
            }],
        );

        let catalog = resolve(&store, &request).await.unwrap();
        assert_eq!(catalog.menu_items.len(), 1);
        assert_eq!(catalog.addons.len(), 1);
        assert_eq!(catalog.options.len(), 1);
    }

    #[tokio::test]
    async fn skips_addon_and_option_queries_when_none_requested() {
        let store = seeded_store();
        store.set_fail_on_catalog_query(false);
        let request = request_with(vec![], vec![]);

        let catalog = resolve(&store, &request).await.unwrap();
        assert!(catalog.addons.is_empty());
        assert!(catalog.options.is_empty());
    }

    #[tokio::test]
    async fn partial_addon_miss_names_missing_ids() {
        let store = seeded_store();
        let request = request_with(
            vec![
                AddonSelection { id: AddonId::new("a1") },
                AddonSelection { id: AddonId::new("a9") },
            ],
            vec![],
        );

        let err = resolve(&store, &request).await.unwrap_err();
        match err {
            CheckoutError::MissingAddons(ids) => assert_eq!(ids, vec![AddonId::new("a9")]),
            other => panic!("expected MissingAddons, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unavailable_addon_counts_as_missing() {
        let store = seeded_store();
        store.seed_addon(
            CatalogAddon {
                id: AddonId::new("a2"),
                name: "Bacon".to_string(),
                price: Money::from_minor(2000),
            },
            false,
        );
        let request = request_with(
            vec![
                AddonSelection { id: AddonId::new("a1") },
                AddonSelection { id: AddonId::new("a2") },
            ],
            vec![],
        );

        let err = resolve(&store, &request).await.unwrap_err();
        assert!(matches!(err, CheckoutError::MissingAddons(ids) if ids == vec![AddonId::new("a2")]));
    }

    #[tokio::test]
    async fn empty_addon_result_is_a_hard_failure() {
        let store = seeded_store();
        let request = request_with(vec![AddonSelection { id: AddonId::new("zzz") }], vec![]);

        let err = resolve(&store, &request).await.unwrap_err();
        assert!(matches!(err, CheckoutError::CatalogLookup(_)));
    }

    #[tokio::test]
    async fn partial_option_miss_names_missing_ids() {
        let store = seeded_store();
        let request = request_with(
            vec![],
            vec![
                OptionSelection {
                    id: MenuOptionId::new("o1"),
                    value: String::new(),
                },
                OptionSelection {
                    id: MenuOptionId::new("o9"),
                    value: String::new(),
                },
            ],
        );

        let err = resolve(&store, &request).await.unwrap_err();
        match err {
            CheckoutError::MissingOptions(ids) => {
                assert_eq!(ids, vec![MenuOptionId::new("o9")]);
            }
            other => panic!("expected MissingOptions, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn query_error_surfaces_as_catalog_lookup() {
        let store = seeded_store();
        store.set_fail_on_catalog_query(true);
        let request = request_with(vec![], vec![]);

        let err = resolve(&store, &request).await.unwrap_err();
        assert!(matches!(err, CheckoutError::CatalogLookup(_)));
    }
}
