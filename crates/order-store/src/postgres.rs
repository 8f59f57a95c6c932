use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{AddonId, MenuItemId, MenuOptionId, Money, OrderId, OrderItemId, UserId};
use domain::{CatalogAddon, CatalogMenuItem, CatalogMenuOption};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::error::Result;
use crate::records::{
    InsertedOrderItem, NewNotification, NewOrder, NewOrderItem, NewOrderItemAddon,
    NewOrderItemOption, OrderRecord,
};
use crate::store::{CatalogStore, NotificationStore, OrderStore};

/// PostgreSQL-backed store implementation.
///
/// The schema (see the workspace `migrations/` directory) cascades deletes
/// from orders to order items and from order items to addon/option rows,
/// so the compensating `delete_order` removes the whole aggregate.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database at the given URL and wraps the pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_order(row: PgRow) -> Result<OrderRecord> {
        Ok(OrderRecord {
            id: OrderId::new(row.try_get("id")?),
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            order_items: row.try_get("order_items")?,
            total_amount: Money::from_minor(row.try_get("total_amount")?),
            vat: Money::from_minor(row.try_get("vat")?),
            total_amount_vat: Money::from_minor(row.try_get("total_amount_vat")?),
            status: row.try_get("status")?,
            payment_status: row.try_get("payment_status")?,
            payment_method: row.try_get("payment_method")?,
            phone_number: row.try_get("phone_number")?,
            delivery_address: row.try_get("delivery_address")?,
            delivery_method: row.try_get("delivery_method")?,
            delivery_person_id: row.try_get("delivery_person_id")?,
            order_note: row.try_get("order_note")?,
            delivery_latitude: row.try_get("delivery_latitude")?,
            delivery_longitude: row.try_get("delivery_longitude")?,
            delivery_location_geog: row.try_get("delivery_location_geog")?,
            tracking_id: row.try_get("tracking_id")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }
}

#[async_trait]
impl CatalogStore for PostgresStore {
    async fn menu_items_by_ids(&self, ids: &[MenuItemId]) -> Result<Vec<CatalogMenuItem>> {
        let raw_ids: Vec<i64> = ids.iter().map(MenuItemId::as_i64).collect();
        let rows = sqlx::query("SELECT id, name, price FROM menus WHERE id = ANY($1)")
            .bind(&raw_ids)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                Ok(CatalogMenuItem {
                    id: MenuItemId::new(row.try_get("id")?),
                    name: row.try_get("name")?,
                    price: Money::from_minor(row.try_get("price")?),
                })
            })
            .collect()
    }

    async fn available_addons_by_ids(&self, ids: &[AddonId]) -> Result<Vec<CatalogAddon>> {
        let raw_ids: Vec<String> = ids.iter().map(|id| id.as_str().to_string()).collect();
        let rows = sqlx::query(
            "SELECT id, name, price FROM addons WHERE id = ANY($1) AND is_available = TRUE",
        )
        .bind(&raw_ids)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(CatalogAddon {
                    id: AddonId::new(row.try_get::<String, _>("id")?),
                    name: row.try_get("name")?,
                    price: Money::from_minor(row.try_get("price")?),
                })
            })
            .collect()
    }

    async fn options_by_ids(&self, ids: &[MenuOptionId]) -> Result<Vec<CatalogMenuOption>> {
        let raw_ids: Vec<String> = ids.iter().map(|id| id.as_str().to_string()).collect();
        let rows =
            sqlx::query("SELECT id, name, price_adjustment FROM menu_options WHERE id = ANY($1)")
                .bind(&raw_ids)
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter()
            .map(|row| {
                Ok(CatalogMenuOption {
                    id: MenuOptionId::new(row.try_get::<String, _>("id")?),
                    name: row.try_get("name")?,
                    price_adjustment: Money::from_minor(row.try_get("price_adjustment")?),
                })
            })
            .collect()
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn insert_order(&self, order: NewOrder) -> Result<OrderRecord> {
        let row = sqlx::query(
            r#"
            INSERT INTO orders (
                user_id, order_items, total_amount, vat, total_amount_vat,
                status, payment_status, payment_method, phone_number,
                delivery_address, delivery_method, delivery_person_id,
                order_note, delivery_latitude, delivery_longitude,
                delivery_location_geog, tracking_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING id, created_at
            "#,
        )
        .bind(order.user_id.as_uuid())
        .bind(&order.order_items)
        .bind(order.total_amount.minor())
        .bind(order.vat.minor())
        .bind(order.total_amount_vat.minor())
        .bind(&order.status)
        .bind(&order.payment_status)
        .bind(&order.payment_method)
        .bind(&order.phone_number)
        .bind(&order.delivery_address)
        .bind(&order.delivery_method)
        .bind(order.delivery_person_id)
        .bind(&order.order_note)
        .bind(order.delivery_latitude)
        .bind(order.delivery_longitude)
        .bind(&order.delivery_location_geog)
        .bind(&order.tracking_id)
        .fetch_one(&self.pool)
        .await?;

        let id = OrderId::new(row.try_get("id")?);
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        Ok(OrderRecord::from_new(id, order, created_at))
    }

    async fn insert_order_items(
        &self,
        items: Vec<NewOrderItem>,
    ) -> Result<Vec<InsertedOrderItem>> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(items.len());

        for item in &items {
            let row = sqlx::query(
                r#"
                INSERT INTO order_items (
                    order_id, menu_item_id, item_name, base_price, quantity,
                    subtotal, addon_total, total_item_price, vat,
                    special_instructions, is_gluten_free, is_vegetarian,
                    is_vegan, requires_special_preparation
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                RETURNING id
                "#,
            )
            .bind(item.order_id.as_i64())
            .bind(item.menu_item_id.as_i64())
            .bind(&item.item_name)
            .bind(item.base_price.minor())
            .bind(item.quantity as i32)
            .bind(item.subtotal.minor())
            .bind(item.addon_total.minor())
            .bind(item.total_item_price.minor())
            .bind(item.vat.minor())
            .bind(&item.special_instructions)
            .bind(item.is_gluten_free)
            .bind(item.is_vegetarian)
            .bind(item.is_vegan)
            .bind(item.requires_special_preparation)
            .fetch_one(&mut *tx)
            .await?;

            inserted.push(InsertedOrderItem {
                id: OrderItemId::new(row.try_get("id")?),
                menu_item_id: item.menu_item_id,
            });
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn insert_item_addons(&self, rows: Vec<NewOrderItemAddon>) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for row in &rows {
            sqlx::query(
                r#"
                INSERT INTO order_item_addons (order_item_id, addon_id, quantity, addon_price)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(row.order_item_id.as_i64())
            .bind(row.addon_id.as_str())
            .bind(row.quantity as i32)
            .bind(row.addon_price.minor())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn insert_item_options(&self, rows: Vec<NewOrderItemOption>) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for row in &rows {
            sqlx::query(
                r#"
                INSERT INTO order_item_options (
                    order_item_id, menu_option_id, quantity,
                    option_price_adjustment, option_name, selected_value
                )
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(row.order_item_id.as_i64())
            .bind(row.menu_option_id.as_str())
            .bind(row.quantity as i32)
            .bind(row.option_price_adjustment.minor())
            .bind(&row.option_name)
            .bind(&row.selected_value)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_order(&self, id: OrderId) -> Result<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;
        tracing::debug!(order_id = %id, rows = result.rows_affected(), "order deleted");
        Ok(())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<OrderRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, order_items, total_amount, vat, total_amount_vat,
                   status, payment_status, payment_method, phone_number,
                   delivery_address, delivery_method, delivery_person_id,
                   order_note, delivery_latitude, delivery_longitude,
                   delivery_location_geog, tracking_id, created_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_order).transpose()
    }
}

#[async_trait]
impl NotificationStore for PostgresStore {
    async fn insert_notification(&self, notification: NewNotification) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (user_id, order_id, title, body, type, is_read)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(notification.user_id.as_uuid())
        .bind(notification.order_id.as_i64())
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(&notification.kind)
        .bind(notification.is_read)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
