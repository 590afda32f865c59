//! Order list and order updates.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use i1fashion_core::{Order, OrderId, OrderStatus, OrdersResponse};

use crate::db::{OrderRepository, OrderUpdate, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// `PATCH /api/admin/orders` body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateOrderRequest {
    pub id: Option<String>,
    pub status: Option<String>,
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,
}

impl UpdateOrderRequest {
    /// Parse into the order ID and the requested changes.
    fn parse(self) -> Result<(OrderId, OrderUpdate)> {
        let id = self
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::BadRequest("Order id is required".to_string()))?;
        let id: OrderId = id
            .parse()
            .map_err(|_| AppError::BadRequest("Invalid order id".to_string()))?;

        let status = self
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<OrderStatus>()
                    .map_err(|_| AppError::BadRequest(format!("Invalid order status: {s}")))
            })
            .transpose()?;

        let update = OrderUpdate {
            status,
            tracking_number: self.tracking_number,
            carrier: self.carrier,
        };
        if update.is_empty() {
            return Err(AppError::BadRequest(
                "Provide status, tracking_number or carrier".to_string(),
            ));
        }
        Ok((id, update))
    }
}

/// `PATCH /api/admin/orders` response.
#[derive(Debug, Serialize)]
pub struct UpdateOrderResponse {
    pub success: bool,
    pub order: Order,
}

/// `GET /api/admin/orders` - every order with its items, newest first.
#[instrument(skip_all)]
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<OrdersResponse>> {
    let orders = OrderRepository::new(state.pool()).list_all().await?;

    Ok(Json(OrdersResponse {
        success: true,
        orders,
    }))
}

/// `PATCH /api/admin/orders` - change status, tracking number or carrier.
///
/// Status changes must follow the order lifecycle. When the status actually
/// changes the customer is emailed in the background; a failed email does
/// not fail the update.
#[instrument(skip_all)]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    payload: std::result::Result<Json<UpdateOrderRequest>, JsonRejection>,
) -> Result<Json<UpdateOrderResponse>> {
    let Json(request) = payload?;
    let (id, changes) = request.parse()?;

    let repo = OrderRepository::new(state.pool());
    let current = repo.get(id).await.map_err(|e| match e {
        RepositoryError::NotFound => AppError::NotFound("Order not found".to_string()),
        other => other.into(),
    })?;
    let previous = current.order.status;

    if let Some(next) = changes.status {
        if !previous.can_transition_to(next) {
            return Err(AppError::BadRequest(format!(
                "Cannot change order status from {previous} to {next}"
            )));
        }
    }

    let order = repo.update(id, previous, &changes).await?;
    info!(
        admin_id = %admin.id,
        order_number = %order.order_number,
        from = %previous,
        to = %order.status,
        "Order updated"
    );

    if order.status != previous {
        if let Some(email) = state.email().cloned() {
            let notified = order.clone();
            tokio::spawn(async move {
                if let Err(e) = email.send_status_update(&notified).await {
                    warn!(
                        order_number = %notified.order_number,
                        error = %e,
                        "Failed to send order status email"
                    );
                }
            });
        }
    }

    Ok(Json(UpdateOrderResponse {
        success: true,
        order,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(body: &str) -> UpdateOrderRequest {
        serde_json::from_str(body).unwrap()
    }

    fn bad_request_message(result: Result<(OrderId, OrderUpdate)>) -> String {
        match result {
            Err(AppError::BadRequest(msg)) => msg,
            other => panic!("expected bad request, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_requires_id() {
        assert_eq!(
            bad_request_message(request(r#"{"status":"shipped"}"#).parse()),
            "Order id is required"
        );
        assert_eq!(
            bad_request_message(request(r#"{"id":"ord-1","status":"shipped"}"#).parse()),
            "Invalid order id"
        );
    }

    #[test]
    fn test_parse_rejects_unknown_status() {
        let id = OrderId::generate();
        let body = format!(r#"{{"id":"{id}","status":"lost"}}"#);
        assert_eq!(
            bad_request_message(request(&body).parse()),
            "Invalid order status: lost"
        );
    }

    #[test]
    fn test_parse_requires_a_change() {
        let id = OrderId::generate();
        let body = format!(r#"{{"id":"{id}"}}"#);
        assert_eq!(
            bad_request_message(request(&body).parse()),
            "Provide status, tracking_number or carrier"
        );
    }

    #[test]
    fn test_parse_tracking_only() {
        let id = OrderId::generate();
        let body = format!(r#"{{"id":"{id}","tracking_number":"DL123","carrier":"Delhivery"}}"#);
        let (parsed_id, update) = request(&body).parse().unwrap();

        assert_eq!(parsed_id, id);
        assert_eq!(update.status, None);
        assert_eq!(update.tracking_number.as_deref(), Some("DL123"));
        assert_eq!(update.carrier.as_deref(), Some("Delhivery"));
    }
}
