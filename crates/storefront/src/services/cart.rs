//! Cart service client: cart read, add, line-item remove.
//!
//! The cart endpoints take no auth header, per the service contract.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::Url;

use greenbasket_core::{CartRecordId, Price, ProductId, UserId};

use crate::cart::CartRecord;

use super::{ServiceError, api_error};

/// One cart record as the cart service returns it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRecordWire {
    pub id: CartRecordId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub product_qty: BTreeMap<ProductId, u32>,
    pub total_quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub product_desc: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub product_price: Option<Decimal>,
    #[serde(default)]
    pub prod_cat: Option<String>,
    #[serde(rename = "imageURL", default)]
    pub image_url: Option<String>,
}

impl From<CartRecordWire> for CartRecord {
    fn from(wire: CartRecordWire) -> Self {
        Self {
            id: wire.id,
            owner_id: wire.user_id,
            quantities: wire.product_qty,
            total_quantity: wire.total_quantity,
            total_price: Price::new(wire.total_price),
            product_name: wire.product_name.unwrap_or_else(|| "Product".to_owned()),
            product_desc: wire.product_desc.unwrap_or_default(),
            unit_price: wire.product_price.map(Price::new).unwrap_or_default(),
            category: wire.prod_cat.unwrap_or_default(),
            image_url: wire.image_url,
        }
    }
}

/// Add-to-cart payload: `{ userId, productQty: { productId: qty } }`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub user_id: UserId,
    pub product_qty: BTreeMap<ProductId, u32>,
}

impl AddToCartRequest {
    /// Single-product payload, the only shape the home screen sends.
    #[must_use]
    pub fn single(user_id: UserId, product: ProductId, quantity: u32) -> Self {
        Self {
            user_id,
            product_qty: BTreeMap::from([(product, quantity)]),
        }
    }
}

/// Client for the cart service.
#[derive(Clone)]
pub struct CartClient {
    client: reqwest::Client,
    base_url: Url,
}

impl CartClient {
    #[must_use]
    pub const fn new(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    /// Fetch a user's cart records via `GET /cart/{userId}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the records do not decode.
    pub async fn fetch_cart(&self, user_id: UserId) -> Result<Vec<CartRecord>, ServiceError> {
        let response = self
            .client
            .get(self.endpoint(&format!("/cart/{user_id}")))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let records: Vec<CartRecordWire> = response
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))?;
        Ok(records.into_iter().map(CartRecord::from).collect())
    }

    /// Add line items via `POST /cart`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn add_lines(&self, request: &AddToCartRequest) -> Result<(), ServiceError> {
        let response = self
            .client
            .post(self.endpoint("/cart"))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }

    /// Remove one line item via `DELETE /cart/{cartId}/{productId}`.
    ///
    /// The caller applies the matching local reconciliation only after this
    /// returns `Ok`; on any error the working copy stays untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn remove_line(
        &self,
        record: &CartRecordId,
        product: ProductId,
    ) -> Result<(), ServiceError> {
        let response = self
            .client
            .delete(self.endpoint(&format!("/cart/{record}/{product}")))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_record_decodes_and_converts() {
        let wire: CartRecordWire = serde_json::from_str(
            r#"{
                "id": "cart-3",
                "userId": 7,
                "productQty": { "1": 2, "4": 1 },
                "totalQuantity": 3,
                "totalPrice": 300.0,
                "productName": "Green Tea",
                "productDesc": "Loose leaf",
                "productPrice": 100.0,
                "prodCat": "Beverage",
                "imageURL": "https://img.example/tea.jpg"
            }"#,
        )
        .unwrap();

        let record = CartRecord::from(wire);
        assert_eq!(record.id, CartRecordId::from("cart-3"));
        assert_eq!(record.quantities[&ProductId::new(1)], 2);
        assert_eq!(record.unit_price, Price::from_rupees(100));
        assert_eq!(record.total_price, Price::from_rupees(300));
    }

    #[test]
    fn wire_record_tolerates_missing_display_fields() {
        let wire: CartRecordWire = serde_json::from_str(
            r#"{"id":"c1","productQty":{"9":1},"totalQuantity":1,"totalPrice":0.0}"#,
        )
        .unwrap();

        let record = CartRecord::from(wire);
        assert_eq!(record.product_name, "Product");
        assert_eq!(record.unit_price, Price::ZERO);
        assert!(record.owner_id.is_none());
    }

    #[test]
    fn add_request_maps_product_to_quantity() {
        let request = AddToCartRequest::single(UserId::new(7), ProductId::new(12), 3);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["userId"], 7);
        assert_eq!(json["productQty"]["12"], 3);
    }
}
