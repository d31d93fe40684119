//! Order service client: order listing and cancellation.

use rust_decimal::Decimal;
use serde::Deserialize;
use url::Url;

use greenbasket_core::{OrderId, OrderStatus, UserId};

use super::{ServiceError, api_error};

/// One order as the order service returns it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub product_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    pub total_quantity: u32,
    pub status: OrderStatus,
    #[serde(default)]
    pub product_desc: String,
    #[serde(rename = "imageURL", default)]
    pub image_url: Option<String>,
}

/// Client for the order service.
#[derive(Clone)]
pub struct OrderClient {
    client: reqwest::Client,
    base_url: Url,
}

impl OrderClient {
    #[must_use]
    pub const fn new(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    /// List a user's orders via `GET /order/{userId}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the orders do not decode.
    pub async fn list_orders(&self, user_id: UserId) -> Result<Vec<Order>, ServiceError> {
        let response = self
            .client
            .get(self.endpoint(&format!("/order/{user_id}")))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))
    }

    /// Cancel an order via `PUT /order/cancel/{orderId}`.
    ///
    /// The order screen flips the displayed status to Cancelled once this
    /// returns `Ok`, without re-fetching.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<(), ServiceError> {
        let response = self
            .client
            .put(self.endpoint(&format!("/order/cancel/{order_id}")))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }
}
