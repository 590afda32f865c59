//! Order placement and history.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use i1fashion_core::{
    CreateOrderResponse, NewOrder, OrderNumber, OrderSummary, OrdersResponse, UserId,
};

use crate::db::OrderRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub user_id: Option<String>,
}

/// `POST /api/orders` - place an order.
///
/// The order and its items are created atomically. Stock is then decremented
/// and the confirmation email sent; neither can fail the request.
#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewOrder>, JsonRejection>,
) -> Result<Json<CreateOrderResponse>> {
    let Json(order) = payload?;
    order.validate()?;

    let number = order
        .order_number
        .clone()
        .unwrap_or_else(|| OrderNumber::generate(Utc::now()));

    let repo = OrderRepository::new(state.pool());
    let placed = repo.create(&order, number).await?;

    let applied = repo.decrement_stock(&placed.order_items).await;
    if applied < placed.order_items.len() {
        warn!(
            order_number = %placed.order.order_number,
            applied,
            lines = placed.order_items.len(),
            "Stock not decremented for every line"
        );
    }

    info!(
        order_number = %placed.order.order_number,
        total = %placed.order.total_amount,
        "Order placed"
    );
    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[("order_number", placed.order.order_number.as_str())]),
    );

    let summary = OrderSummary::from(&placed.order);

    if let Some(email) = state.email().cloned() {
        tokio::spawn(async move {
            if let Err(e) = email.send_order_confirmation(&placed).await {
                warn!(
                    order_number = %placed.order.order_number,
                    error = %e,
                    "Failed to send order confirmation"
                );
            }
        });
    }

    Ok(Json(CreateOrderResponse {
        success: true,
        order: summary,
    }))
}

/// `GET /api/orders?user_id=` - a customer's orders, newest first.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<OrdersResponse>> {
    let user_id = query
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("User ID is required".to_string()))?;
    let user_id: UserId = user_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid user ID".to_string()))?;

    let orders = OrderRepository::new(state.pool())
        .list_for_user(user_id)
        .await?;

    Ok(Json(OrdersResponse {
        success: true,
        orders,
    }))
}
