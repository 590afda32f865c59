//! Order creation and history.
//!
//! An order and its items are written in one transaction, so a failed item
//! insert never leaves a half-created order. Stock is adjusted afterwards and
//! separately; see [`OrderRepository::decrement_stock`].

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{instrument, warn};
use uuid::Uuid;

use i1fashion_core::{
    NewOrder, NewOrderItem, Order, OrderId, OrderItem, OrderItemId, OrderNumber, OrderWithItems,
    UserId,
};

use super::RepositoryError;

/// How many order numbers to try before giving up on a collision streak.
pub const MAX_ORDER_NUMBER_ATTEMPTS: usize = 3;

const ORDER_NUMBER_CONSTRAINT: &str = "orders_order_number_key";

pub(crate) const ORDER_COLUMNS: &str = "id, user_id, order_number, status, subtotal, tax_amount, \
     shipping_amount, discount_amount, total_amount, payment_method, payment_status, \
     customer_name, customer_email, customer_phone, shipping_address, shipping_city, \
     shipping_state, shipping_postal_code, shipping_country, tracking_number, carrier, \
     created_at, updated_at";

const ITEM_COLUMNS: &str = "id, order_id, product_id, variant_id, product_name, variant_name, \
     variant_color, variant_size, quantity, unit_price, total_price, image_url, created_at";

/// Why a single insert attempt failed.
enum InsertError {
    NumberTaken,
    Other(RepositoryError),
}

impl From<sqlx::Error> for InsertError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() && db_err.constraint() == Some(ORDER_NUMBER_CONSTRAINT)
            {
                return Self::NumberTaken;
            }
            if db_err.is_foreign_key_violation() {
                return Self::Other(RepositoryError::Conflict(
                    "order references an unknown user".to_owned(),
                ));
            }
        }
        Self::Other(RepositoryError::Database(e))
    }
}

/// Repository for customer orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order and all of its items atomically.
    ///
    /// `order_number` is tried first; if another order already holds it, a
    /// fresh number is generated, up to [`MAX_ORDER_NUMBER_ATTEMPTS`] in total.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user does not exist or every
    /// attempted number was taken.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, order), fields(user_id = %order.user_id, items = order.items.len()))]
    pub async fn create(
        &self,
        order: &NewOrder,
        order_number: OrderNumber,
    ) -> Result<OrderWithItems, RepositoryError> {
        let mut number = order_number;
        for attempt in 1..=MAX_ORDER_NUMBER_ATTEMPTS {
            match self.try_insert(order, &number).await {
                Ok(created) => return Ok(created),
                Err(InsertError::NumberTaken) => {
                    warn!(attempt, order_number = %number, "Order number already taken, retrying");
                    number = OrderNumber::generate(Utc::now());
                }
                Err(InsertError::Other(e)) => return Err(e),
            }
        }

        Err(RepositoryError::Conflict(
            "could not allocate a unique order number".to_owned(),
        ))
    }

    async fn try_insert(
        &self,
        order: &NewOrder,
        number: &OrderNumber,
    ) -> Result<OrderWithItems, InsertError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO orders (id, user_id, order_number, subtotal, tax_amount, shipping_amount, \
                 discount_amount, total_amount, payment_method, customer_name, customer_email, \
                 customer_phone, shipping_address, shipping_city, shipping_state, \
                 shipping_postal_code, shipping_country) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(OrderId::generate())
        .bind(order.user_id)
        .bind(number)
        .bind(order.subtotal)
        .bind(order.tax_amount)
        .bind(order.shipping_amount)
        .bind(order.discount_amount)
        .bind(order.total_amount)
        .bind(order.payment_method)
        .bind(order.shipping.customer_name.trim())
        .bind(order.shipping.customer_email.trim())
        .bind(order.shipping.customer_phone.trim())
        .bind(order.shipping.shipping_address.trim())
        .bind(order.shipping.shipping_city.trim())
        .bind(order.shipping.shipping_state.trim())
        .bind(order.shipping.shipping_postal_code.trim())
        .bind(order.shipping.country())
        .fetch_one(&mut *tx)
        .await?;

        let mut order_items = Vec::with_capacity(order.items.len());
        for item in &order.items {
            order_items.push(insert_item(&mut tx, created.id, item).await?);
        }

        tx.commit().await?;

        Ok(OrderWithItems {
            order: created,
            order_items,
        })
    }

    /// A user's orders with their items, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        attach_items(self.pool, orders).await
    }

    /// Take ordered quantities out of variant stock.
    ///
    /// Runs after the order has committed. Each line is clamped at zero in
    /// the database; a failed line is logged and skipped. Returns how many
    /// lines were applied.
    #[instrument(skip(self, items), fields(lines = items.len()))]
    pub async fn decrement_stock(&self, items: &[OrderItem]) -> usize {
        let mut applied = 0;
        for item in items {
            let Some(variant_id) = item.variant_id else {
                continue;
            };
            let result = sqlx::query(
                "UPDATE product_variants \
                 SET stock_quantity = GREATEST(stock_quantity - $1, 0) \
                 WHERE id = $2",
            )
            .bind(item.quantity)
            .bind(variant_id)
            .execute(self.pool)
            .await;

            match result {
                Ok(_) => applied += 1,
                Err(e) => warn!(%variant_id, error = %e, "Failed to decrement variant stock"),
            }
        }
        applied
    }
}

async fn insert_item(
    tx: &mut Transaction<'_, Postgres>,
    order_id: OrderId,
    item: &NewOrderItem,
) -> Result<OrderItem, sqlx::Error> {
    let total_price = item
        .total_price()
        .ok_or_else(|| sqlx::Error::Protocol("order line total overflows".to_owned()))?;
    sqlx::query_as::<_, OrderItem>(&format!(
        "INSERT INTO order_items (id, order_id, product_id, variant_id, product_name, \
             variant_name, variant_color, variant_size, quantity, unit_price, total_price, \
             image_url) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
         RETURNING {ITEM_COLUMNS}"
    ))
    .bind(OrderItemId::generate())
    .bind(order_id)
    .bind(item.product_id)
    .bind(item.variant_id)
    .bind(&item.product_name)
    .bind(item.variant_name())
    .bind(&item.variant_color)
    .bind(&item.variant_size)
    .bind(item.quantity)
    .bind(item.unit_price)
    .bind(total_price)
    .bind(item.image_url.as_deref())
    .fetch_one(&mut **tx)
    .await
}

/// Load the items of `orders` in one query and nest them, keeping order.
pub(crate) async fn attach_items(
    pool: &PgPool,
    orders: Vec<Order>,
) -> Result<Vec<OrderWithItems>, RepositoryError> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = orders.iter().map(|o| o.id.as_uuid()).collect();
    let items = sqlx::query_as::<_, OrderItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ANY($1) ORDER BY created_at, id"
    ))
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(item);
    }

    Ok(orders
        .into_iter()
        .map(|order| OrderWithItems {
            order_items: by_order.remove(&order.id).unwrap_or_default(),
            order,
        })
        .collect())
}
