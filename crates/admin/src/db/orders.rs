//! Order administration: the full order list and status/shipping updates.

use std::collections::HashMap;

use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use i1fashion_core::{Order, OrderId, OrderItem, OrderStatus, OrderWithItems};

use super::RepositoryError;

const ORDER_COLUMNS: &str = "id, user_id, order_number, status, subtotal, tax_amount, \
     shipping_amount, discount_amount, total_amount, payment_method, payment_status, \
     customer_name, customer_email, customer_phone, shipping_address, shipping_city, \
     shipping_state, shipping_postal_code, shipping_country, tracking_number, carrier, \
     created_at, updated_at";

const ITEM_COLUMNS: &str = "id, order_id, product_id, variant_id, product_name, variant_name, \
     variant_color, variant_size, quantity, unit_price, total_price, image_url, created_at";

/// Fields an admin may change on an order. `None` leaves a field as is.
///
/// An empty tracking number or carrier clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,
}

impl OrderUpdate {
    /// Whether the update would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none() && self.tracking_number.is_none() && self.carrier.is_none()
    }
}

/// Repository for order administration.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every order with its items, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(&self) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        attach_items(self.pool, orders).await
    }

    /// Get one order with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this ID.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<OrderWithItems, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        attach_items(self.pool, vec![order])
            .await?
            .pop()
            .ok_or(RepositoryError::NotFound)
    }

    /// Apply `update` to an order whose status is still `expected_status`.
    ///
    /// The status guard makes a concurrent update fail instead of silently
    /// bypassing the transition check done by the caller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order no longer has
    /// `expected_status` (or was deleted).
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, update), fields(order_id = %id))]
    pub async fn update(
        &self,
        id: OrderId,
        expected_status: OrderStatus,
        update: &OrderUpdate,
    ) -> Result<Order, RepositoryError> {
        sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET \
                 status = COALESCE($3, status), \
                 tracking_number = CASE WHEN $4::text IS NULL THEN tracking_number \
                     ELSE NULLIF(BTRIM($4), '') END, \
                 carrier = CASE WHEN $5::text IS NULL THEN carrier \
                     ELSE NULLIF(BTRIM($5), '') END, \
                 updated_at = NOW() \
             WHERE id = $1 AND status = $2 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(expected_status)
        .bind(update.status)
        .bind(update.tracking_number.as_deref())
        .bind(update.carrier.as_deref())
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| RepositoryError::Conflict("Order was modified by another request".to_owned()))
    }
}

/// Load the items of `orders` in one query and nest them, keeping order.
async fn attach_items(
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_update_is_empty() {
        assert!(OrderUpdate::default().is_empty());
        assert!(
            !OrderUpdate {
                carrier: Some(String::new()),
                ..OrderUpdate::default()
            }
            .is_empty()
        );
    }
}
