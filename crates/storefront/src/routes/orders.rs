//! Order history screen and the cancel fragment.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
};
use serde::Deserialize;

use greenbasket_core::{OrderId, Price};

use crate::middleware::RequireBuyer;
use crate::services::orders::Order;
use crate::state::AppState;

use super::IdentityView;

/// The status block of one order card, also rendered standalone as the
/// cancel fragment.
pub struct OrderStatusView {
    pub order_id: i64,
    pub label: String,
    pub cancelled: bool,
    pub error: Option<String>,
}

/// One order as the history screen renders it.
pub struct OrderView {
    pub status: OrderStatusView,
    pub name: String,
    pub desc: String,
    pub total_price: Price,
    pub quantity: u32,
    pub image_url: Option<String>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            status: OrderStatusView {
                order_id: order.order_id.as_i64(),
                label: order.status.to_string(),
                cancelled: order.status.is_cancelled(),
                error: None,
            },
            name: order.product_name.clone(),
            desc: order.product_desc.clone(),
            total_price: Price::new(order.total_price),
            quantity: order.total_quantity,
            image_url: order.image_url.clone(),
        }
    }
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub identity: IdentityView,
    pub orders: Vec<OrderView>,
    pub error: Option<String>,
}

/// Order status fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/order_status.html")]
pub struct OrderStatusTemplate {
    pub status: OrderStatusView,
}

/// Display the order history, newest response order as the service returns
/// it. An order service outage degrades to an empty list with an inline
/// error.
pub async fn index(
    RequireBuyer(identity): RequireBuyer,
    State(state): State<AppState>,
) -> OrdersTemplate {
    let (orders, error) = match state.orders().list_orders(identity.user_id).await {
        Ok(orders) => (orders, None),
        Err(err) => {
            tracing::warn!(error = %err, user_id = %identity.user_id, "Order listing failed");
            (
                Vec::new(),
                Some("Failed to fetch your orders. Please try again.".to_owned()),
            )
        }
    };

    OrdersTemplate {
        identity: IdentityView::from(&identity),
        orders: orders.iter().map(OrderView::from).collect(),
        error,
    }
}

/// Current status label, echoed back unchanged when the cancel fails.
#[derive(Debug, Deserialize)]
pub struct CancelForm {
    #[serde(default)]
    pub status: String,
}

/// Cancel an order and swap the card's status block.
///
/// On acknowledgement the status flips to Cancelled without a re-fetch; on
/// failure the previous status is kept and an error shown in place.
pub async fn cancel(
    RequireBuyer(identity): RequireBuyer,
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
    Form(form): Form<CancelForm>,
) -> OrderStatusTemplate {
    let order_id = OrderId::new(order_id);

    match state.orders().cancel_order(order_id).await {
        Ok(()) => {
            tracing::info!(user_id = %identity.user_id, order_id = %order_id, "Order cancelled");
            OrderStatusTemplate {
                status: OrderStatusView {
                    order_id: order_id.as_i64(),
                    label: "Cancelled".to_owned(),
                    cancelled: true,
                    error: None,
                },
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, order_id = %order_id, "Order cancel failed");
            OrderStatusTemplate {
                status: OrderStatusView {
                    order_id: order_id.as_i64(),
                    label: if form.status.is_empty() {
                        "Placed".to_owned()
                    } else {
                        form.status
                    },
                    cancelled: false,
                    error: Some("Failed to cancel the order. Please try again.".to_owned()),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenbasket_core::OrderStatus;
    use rust_decimal::Decimal;

    #[test]
    fn view_flags_cancelled_orders() {
        let order = Order {
            order_id: OrderId::new(4),
            product_name: "Tea".to_owned(),
            total_price: Decimal::new(120, 0),
            total_quantity: 2,
            status: OrderStatus::Cancelled,
            product_desc: String::new(),
            image_url: None,
        };

        let view = OrderView::from(&order);
        assert!(view.status.cancelled);
        assert_eq!(view.status.label, "Cancelled");
        assert_eq!(view.total_price, Price::from_rupees(120));
    }

    #[test]
    fn view_keeps_unknown_status_labels() {
        let order = Order {
            order_id: OrderId::new(4),
            product_name: "Tea".to_owned(),
            total_price: Decimal::new(120, 0),
            total_quantity: 2,
            status: OrderStatus::from("In Transit".to_owned()),
            product_desc: String::new(),
            image_url: None,
        };

        let view = OrderView::from(&order);
        assert!(!view.status.cancelled);
        assert_eq!(view.status.label, "In Transit");
    }
}
