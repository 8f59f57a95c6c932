//! Checkout saga coordinator.
//!
//! Drives the whole order-placement flow: validation, catalog resolution,
//! price reconciliation, payment dispatch, then the strictly ordered
//! persistence writes with best-effort compensation. Payment dispatch runs
//! before the first write, so payment failures never need compensation;
//! a failure in any write after the order row deletes that row (the
//! backing schema cascades the delete to child rows).

use std::collections::HashMap;

use common::{MenuItemId, OrderId, OrderItemId};
use domain::{OrderRequest, reconcile};
use gateway::{PaymentGateway, PaymentOutcome, PaymentSettings, dispatch};
use order_store::{
    CatalogStore, NewNotification, NewOrder, NewOrderItem, NewOrderItemAddon, NewOrderItemOption,
    NotificationStore, OrderRecord, OrderStore,
};
use serde::Serialize;

use crate::error::{CheckoutError, Result};
use crate::resolver;

/// Notification content for a freshly placed order.
const NOTIFICATION_TITLE: &str = "Order Placed Successfully!";
const NOTIFICATION_KIND: &str = "ORDER_PLACED";

/// Cash confirmation returned in the receipt.
const CASH_PAYMENT_STATUS: &str = "cash_payment";
const CASH_PAYMENT_MESSAGE: &str =
    "Order placed successfully. Payment will be collected on delivery.";

/// Checkout-wide settings, built once at startup.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    /// Whole-number VAT percentage applied to recomputed totals.
    pub vat_rate: u32,
    pub payment: PaymentSettings,
}

/// The payment half of a successful checkout.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PaymentReceipt {
    /// Online payment: the customer completes it at `payment_url`.
    Online {
        payment_url: String,
        tracking_id: String,
    },
    /// Cash payment: collected on delivery, nothing further to do.
    Cash { status: String, message: String },
}

/// Terminal success: the persisted order plus the payment result.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    pub order: OrderRecord,
    pub payment: PaymentReceipt,
}

/// Orchestrates order placement end to end.
///
/// Generic over one store implementing all three storage interfaces and
/// a payment gateway, so tests run against the in-memory doubles.
pub struct CheckoutSaga<S, G>
where
    S: CatalogStore + OrderStore + NotificationStore,
    G: PaymentGateway,
{
    store: S,
    gateway: G,
    settings: CheckoutSettings,
}

impl<S, G> CheckoutSaga<S, G>
where
    S: CatalogStore + OrderStore + NotificationStore,
    G: PaymentGateway,
{
    /// Creates a new checkout saga coordinator.
    pub fn new(store: S, gateway: G, settings: CheckoutSettings) -> Self {
        Self {
            store,
            gateway,
            settings,
        }
    }

    /// Places an order: verifies pricing, dispatches payment, persists the
    /// aggregate, and emits the best-effort notification.
    #[tracing::instrument(skip(self, request), fields(payment_method = %request.payment_method))]
    pub async fn place_order(&self, request: OrderRequest) -> Result<CheckoutReceipt> {
        metrics::counter!("checkout_executions_total").increment(1);
        let start = std::time::Instant::now();

        let result = self.run(request).await;
        let duration = start.elapsed().as_secs_f64();
        metrics::histogram!("checkout_duration_seconds").record(duration);
        match &result {
            Ok(receipt) => {
                metrics::counter!("checkout_completed").increment(1);
                tracing::info!(order_id = %receipt.order.id, duration, "checkout completed");
            }
            Err(e) => {
                metrics::counter!("checkout_failed").increment(1);
                tracing::warn!(error = %e, "checkout failed");
            }
        }
        result
    }

    async fn run(&self, request: OrderRequest) -> Result<CheckoutReceipt> {
        request.validate()?;
        let user_id = request
            .user_id
            .ok_or(domain::DomainError::Validation)?;

        // Pure read + compute phase: no writes yet, any failure is clean.
        let catalog = resolver::resolve(&self.store, &request).await?;
        let priced = reconcile(&request.order_items, &catalog, self.settings.vat_rate)?;

        // Payment dispatch precedes persistence; its failures need no
        // compensation.
        let outcome = dispatch(
            &self.gateway,
            &self.settings.payment,
            &request.payment_method,
            &request.status,
            priced.totals.total_amount_vat,
            &request.phone_number,
        )
        .await?;

        // Step 1: order row. Failure here is terminal.
        let new_order = NewOrder {
            user_id,
            order_items: serde_json::to_value(&priced.items)?,
            total_amount: priced.totals.total_amount,
            vat: priced.totals.vat,
            total_amount_vat: priced.totals.total_amount_vat,
            status: outcome.status.clone(),
            payment_status: outcome.status.clone(),
            payment_method: request.payment_method.clone(),
            phone_number: request.phone_number.clone(),
            delivery_address: request.delivery_address.clone(),
            delivery_method: request.delivery_method.clone(),
            delivery_person_id: request.delivery_person_id,
            order_note: request.order_note.clone(),
            delivery_latitude: request.delivery_latitude,
            delivery_longitude: request.delivery_longitude,
            delivery_location_geog: request.delivery_location_geog(),
            tracking_id: outcome.tracking_id.clone(),
        };
        let order = self
            .store
            .insert_order(new_order)
            .await
            .map_err(CheckoutError::OrderCreate)?;

        // Step 2: best-effort notification. Never part of the success
        // criteria.
        self.notify_order_placed(&order).await;

        // Step 3: order-item rows. Per-item VAT is recomputed from the
        // item subtotal and may differ from the order-level figure by
        // rounding.
        let item_rows: Vec<NewOrderItem> = priced
            .items
            .iter()
            .map(|item| NewOrderItem {
                order_id: order.id,
                menu_item_id: item.menu_item_id,
                item_name: item.name.clone(),
                base_price: item.base_price,
                quantity: item.quantity,
                subtotal: item.subtotal,
                addon_total: item.addon_total,
                total_item_price: item.unit_price,
                vat: item.subtotal.percent(self.settings.vat_rate),
                special_instructions: item.special_instructions.clone(),
                is_gluten_free: item.is_gluten_free,
                is_vegetarian: item.is_vegetarian,
                is_vegan: item.is_vegan,
                requires_special_preparation: item.requires_special_preparation,
            })
            .collect();
        let inserted = match self.store.insert_order_items(item_rows).await {
            Ok(rows) => rows,
            Err(e) => {
                self.compensate(order.id).await;
                return Err(CheckoutError::OrderItemsCreate(e));
            }
        };

        // Duplicate catalog ids within one order collide here; only the
        // last insert's generated id is retained.
        let item_ids: HashMap<MenuItemId, OrderItemId> = inserted
            .iter()
            .map(|row| (row.menu_item_id, row.id))
            .collect();

        // Step 4: addon rows, skipped entirely when there are none.
        let addon_rows: Vec<NewOrderItemAddon> = priced
            .items
            .iter()
            .flat_map(|item| {
                let order_item_id = item_ids.get(&item.menu_item_id).copied();
                item.verified_addons.iter().filter_map(move |addon| {
                    order_item_id.map(|id| NewOrderItemAddon {
                        order_item_id: id,
                        addon_id: addon.addon_id.clone(),
                        quantity: addon.quantity,
                        addon_price: addon.price,
                    })
                })
            })
            .collect();
        if !addon_rows.is_empty() {
            if let Err(e) = self.store.insert_item_addons(addon_rows).await {
                self.compensate(order.id).await;
                return Err(CheckoutError::OrderAddonsCreate(e));
            }
        }

        // Step 5: option rows, same skip-if-empty rule.
        let option_rows: Vec<NewOrderItemOption> = priced
            .items
            .iter()
            .flat_map(|item| {
                let order_item_id = item_ids.get(&item.menu_item_id).copied();
                item.verified_options.iter().filter_map(move |option| {
                    order_item_id.map(|id| NewOrderItemOption {
                        order_item_id: id,
                        menu_option_id: option.menu_option_id.clone(),
                        quantity: option.quantity,
                        option_price_adjustment: option.price_adjustment,
                        option_name: option.name.clone(),
                        selected_value: option.selected_value.clone(),
                    })
                })
            })
            .collect();
        if !option_rows.is_empty() {
            if let Err(e) = self.store.insert_item_options(option_rows).await {
                self.compensate(order.id).await;
                return Err(CheckoutError::OrderOptionsCreate(e));
            }
        }

        let payment = match outcome {
            PaymentOutcome {
                tracking_id: Some(tracking_id),
                redirect_url: Some(payment_url),
                ..
            } => PaymentReceipt::Online {
                payment_url,
                tracking_id,
            },
            _ => PaymentReceipt::Cash {
                status: CASH_PAYMENT_STATUS.to_string(),
                message: CASH_PAYMENT_MESSAGE.to_string(),
            },
        };

        Ok(CheckoutReceipt { order, payment })
    }

    /// Emits the order-placed notification; failures are logged and
    /// swallowed.
    async fn notify_order_placed(&self, order: &OrderRecord) {
        let notification = NewNotification {
            user_id: order.user_id,
            order_id: order.id,
            title: NOTIFICATION_TITLE.to_string(),
            body: format!(
                "Your payment for order #{} will be collected on delivery.",
                order.id
            ),
            kind: NOTIFICATION_KIND.to_string(),
            is_read: false,
        };
        if let Err(e) = self.store.insert_notification(notification).await {
            tracing::warn!(order_id = %order.id, error = %e, "notification insert failed");
        }
    }

    /// Deletes the order row after a persistence-step failure. The only
    /// explicit compensating action; child rows go with it via the
    /// store's cascading delete.
    #[tracing::instrument(skip(self))]
    async fn compensate(&self, order_id: OrderId) {
        metrics::counter!("checkout_compensations_total").increment(1);
        match self.store.delete_order(order_id).await {
            Ok(()) => tracing::warn!(%order_id, "order deleted after persistence failure"),
            Err(e) => {
                tracing::error!(%order_id, error = %e, "compensating delete failed, order row orphaned");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{AddonId, MenuItemId, MenuOptionId, Money, UserId};
    use domain::{
        AddonSelection, CatalogAddon, CatalogMenuItem, CatalogMenuOption, OptionSelection,
        RequestedLineItem,
    };
    use gateway::InMemoryGateway;
    use order_store::InMemoryStore;

    fn settings() -> CheckoutSettings {
        CheckoutSettings {
            vat_rate: 18,
            payment: PaymentSettings {
                currency: "UGX".to_string(),
                callback_url: "https://example.test/callback".to_string(),
                notification_id: "notif-1".to_string(),
            },
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

    fn full_request(payment_method: &str) -> OrderRequest {
        OrderRequest {
            order_items: vec![RequestedLineItem {
                id: MenuItemId::new(1),
                quantity: 2,
                selected_addons: vec![AddonSelection { id: AddonId::new("a1") }],
                selected_options: vec![OptionSelection {
                    id: MenuOptionId::new("o1"),
                    value: "half".to_string(),
                }],
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
            delivery_method: Some("delivery".to_string()),
            payment_method: payment_method.to_string(),
            delivery_person_id: None,
            order_note: None,
            delivery_address: "1 Test Lane".to_string(),
            delivery_longitude: Some(32.58),
            delivery_latitude: Some(0.31),
        }
    }

    fn saga(
        store: &InMemoryStore,
        gateway: &InMemoryGateway,
    ) -> CheckoutSaga<InMemoryStore, InMemoryGateway> {
        CheckoutSaga::new(store.clone(), gateway.clone(), settings())
    }

    #[tokio::test]
    async fn cash_happy_path_persists_full_aggregate() {
        let store = seeded_store();
        let gateway = InMemoryGateway::new();

        let receipt = saga(&store, &gateway)
            .place_order(full_request("cash"))
            .await
            .unwrap();

        assert_eq!(receipt.order.total_amount.minor(), 22000);
        assert_eq!(receipt.order.vat.minor(), 3960);
        assert_eq!(receipt.order.total_amount_vat.minor(), 25960);
        assert_eq!(receipt.order.status, "pending");
        assert_eq!(receipt.order.payment_status, "pending");
        assert!(receipt.order.tracking_id.is_none());
        assert_eq!(
            receipt.order.delivery_location_geog.as_deref(),
            Some("POINT(32.58 0.31)")
        );
        assert!(matches!(receipt.payment, PaymentReceipt::Cash { .. }));

        assert_eq!(store.order_count(), 1);
        assert_eq!(store.order_item_count(), 1);
        assert_eq!(store.item_addon_count(), 1);
        assert_eq!(store.item_option_count(), 1);
        assert_eq!(store.notification_count(), 1);
        assert_eq!(gateway.token_request_count(), 0);
        assert_eq!(gateway.submission_count(), 0);
    }

    #[tokio::test]
    async fn online_happy_path_forces_awaiting_payment() {
        let store = seeded_store();
        let gateway = InMemoryGateway::new();

        let receipt = saga(&store, &gateway)
            .place_order(full_request("online"))
            .await
            .unwrap();

        assert_eq!(receipt.order.status, gateway::AWAITING_PAYMENT_STATUS);
        assert!(receipt.order.tracking_id.is_some());
        match receipt.payment {
            PaymentReceipt::Online {
                tracking_id,
                payment_url,
            } => {
                assert_eq!(receipt.order.tracking_id.as_deref(), Some(tracking_id.as_str()));
                assert!(!payment_url.is_empty());
            }
            other => panic!("expected online receipt, got {other:?}"),
        }
        assert_eq!(gateway.submissions()[0].amount.minor(), 25960);
    }

    #[tokio::test]
    async fn validation_failure_has_no_side_effects() {
        let store = seeded_store();
        let gateway = InMemoryGateway::new();
        let mut request = full_request("cash");
        request.delivery_address = String::new();

        let err = saga(&store, &gateway).place_order(request).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields");
        assert_eq!(store.order_count(), 0);
        assert_eq!(store.notification_count(), 0);
    }

    #[tokio::test]
    async fn missing_addon_fails_with_zero_writes() {
        let store = seeded_store();
        let gateway = InMemoryGateway::new();
        let mut request = full_request("cash");
        request.order_items[0]
            .selected_addons
            .push(AddonSelection { id: AddonId::new("a9") });

        let err = saga(&store, &gateway).place_order(request).await.unwrap_err();
        match err {
            CheckoutError::MissingAddons(ids) => assert_eq!(ids, vec![AddonId::new("a9")]),
            other => panic!("expected MissingAddons, got {other:?}"),
        }
        assert_eq!(store.order_count(), 0);
        assert_eq!(store.order_item_count(), 0);
    }

    #[tokio::test]
    async fn missing_option_fails_before_any_insert() {
        let store = seeded_store();
        let gateway = InMemoryGateway::new();
        let mut request = full_request("cash");
        request.order_items[0].selected_options = vec![OptionSelection {
            id: MenuOptionId::new("o9"),
            value: String::new(),
        }];

        let err = saga(&store, &gateway).place_order(request).await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::MissingOptions(ids) if ids == vec![MenuOptionId::new("o9")]
        ));
        assert_eq!(store.order_count(), 0);
    }

    #[tokio::test]
    async fn token_rejection_leaves_zero_writes() {
        let store = seeded_store();
        let gateway = InMemoryGateway::new();
        gateway.set_fail_on_token(true);

        let err = saga(&store, &gateway)
            .place_order(full_request("online"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Payment(gateway::PaymentError::Auth(_))
        ));
        assert_eq!(store.order_count(), 0);
        assert_eq!(store.order_item_count(), 0);
        assert_eq!(store.notification_count(), 0);
    }

    #[tokio::test]
    async fn unsupported_method_is_rejected() {
        let store = seeded_store();
        let gateway = InMemoryGateway::new();

        let err = saga(&store, &gateway)
            .place_order(full_request("crypto"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Payment(gateway::PaymentError::UnsupportedMethod(_))
        ));
        assert_eq!(store.order_count(), 0);
    }

    #[tokio::test]
    async fn item_insert_failure_compensates_order_row() {
        let store = seeded_store();
        let gateway = InMemoryGateway::new();
        store.set_fail_on_insert_items(true);

        let err = saga(&store, &gateway)
            .place_order(full_request("cash"))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::OrderItemsCreate(_)));

        // Compensating delete removed the just-created order row.
        assert_eq!(store.order_count(), 0);
        assert_eq!(store.order_item_count(), 0);
    }

    #[tokio::test]
    async fn addon_insert_failure_compensates_order_row() {
        let store = seeded_store();
        let gateway = InMemoryGateway::new();
        store.set_fail_on_insert_addons(true);

        let err = saga(&store, &gateway)
            .place_order(full_request("cash"))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::OrderAddonsCreate(_)));
        assert_eq!(store.order_count(), 0);
        assert_eq!(store.order_item_count(), 0);
        assert_eq!(store.item_addon_count(), 0);
    }

    #[tokio::test]
    async fn option_insert_failure_compensates_order_row() {
        let store = seeded_store();
        let gateway = InMemoryGateway::new();
        store.set_fail_on_insert_options(true);

        let err = saga(&store, &gateway)
            .place_order(full_request("cash"))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::OrderOptionsCreate(_)));
        assert_eq!(store.order_count(), 0);
    }

    #[tokio::test]
    async fn duplicate_menu_item_lines_attach_children_to_last_row() {
        let store = seeded_store();
        let gateway = InMemoryGateway::new();

        // Two lines for the same catalog item: the first carries the
        // addon, the second the option.
        let mut request = full_request("cash");
        let mut second = request.order_items[0].clone();
        request.order_items[0].selected_options.clear();
        second.selected_addons.clear();
        request.order_items.push(second);

        saga(&store, &gateway).place_order(request).await.unwrap();

        let rows = store.order_items();
        assert_eq!(rows.len(), 2);
        let first_id = rows[0].0;
        let last_id = rows[1].0;
        assert_ne!(first_id, last_id);

        // The item-id map keys on catalog id, so both child rows land on
        // the last inserted item row, including the addon selected on the
        // first line.
        let addons = store.item_addons();
        let options = store.item_options();
        assert_eq!(addons.len(), 1);
        assert_eq!(options.len(), 1);
        assert_eq!(addons[0].order_item_id, last_id);
        assert_eq!(options[0].order_item_id, last_id);
    }

    #[tokio::test]
    async fn per_item_vat_rounds_independently_of_order_vat() {
        let store = InMemoryStore::new();
        store.seed_menu_item(CatalogMenuItem {
            id: MenuItemId::new(7),
            name: "Samosa".to_string(),
            price: Money::from_minor(105),
        });
        store.seed_menu_item(CatalogMenuItem {
            id: MenuItemId::new(8),
            name: "Chapati".to_string(),
            price: Money::from_minor(105),
        });
        let gateway = InMemoryGateway::new();

        let bare_line = |id: i64| RequestedLineItem {
            id: MenuItemId::new(id),
            quantity: 1,
            selected_addons: vec![],
            selected_options: vec![],
            special_instructions: None,
            is_gluten_free: false,
            is_vegetarian: false,
            is_vegan: false,
            requires_special_preparation: false,
        };
        let mut request = full_request("cash");
        request.order_items = vec![bare_line(7), bare_line(8)];

        let receipt = saga(&store, &gateway).place_order(request).await.unwrap();

        // Order-level VAT truncates once over the full total; per-item VAT
        // truncates per subtotal, so the persisted rows sum to one minor
        // unit less here.
        assert_eq!(receipt.order.total_amount.minor(), 210);
        assert_eq!(receipt.order.vat.minor(), 37);
        let rows = store.order_items();
        assert_eq!(rows.len(), 2);
        for (_, item) in &rows {
            assert_eq!(item.subtotal.minor(), 105);
            assert_eq!(item.vat.minor(), 18);
        }
        let item_vat_sum: i64 = rows.iter().map(|(_, item)| item.vat.minor()).sum();
        assert_eq!(item_vat_sum, 36);
        assert_ne!(item_vat_sum, receipt.order.vat.minor());
    }

    #[tokio::test]
    async fn notification_failure_is_swallowed() {
        let store = seeded_store();
        let gateway = InMemoryGateway::new();
        store.set_fail_on_notify(true);

        let receipt = saga(&store, &gateway)
            .place_order(full_request("cash"))
            .await
            .unwrap();
        assert_eq!(store.notification_count(), 0);
        assert_eq!(store.order_count(), 1);
        assert!(matches!(receipt.payment, PaymentReceipt::Cash { .. }));
    }

    #[tokio::test]
    async fn addon_and_option_inserts_skipped_when_empty() {
        let store = seeded_store();
        let gateway = InMemoryGateway::new();
        // Make the skipped inserts fail loudly if they are ever called.
        store.set_fail_on_insert_addons(true);
        store.set_fail_on_insert_options(true);

        let mut request = full_request("cash");
        request.order_items[0].selected_addons.clear();
        request.order_items[0].selected_options.clear();

        let receipt = saga(&store, &gateway).place_order(request).await.unwrap();
        assert_eq!(receipt.order.total_amount.minor(), 20000);
        assert_eq!(store.item_addon_count(), 0);
        assert_eq!(store.item_option_count(), 0);
    }
}
