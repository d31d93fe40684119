//! Catalog service client: product CRUD, token-gated.
//!
//! The product listing is cached in-memory for five minutes (the catalog
//! changes rarely and the home screen filters locally); every catalog
//! mutation invalidates the cache so the dashboard always re-reads fresh
//! data after a write.

use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use reqwest::header::AUTHORIZATION;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::Url;

use greenbasket_core::ProductId;

use super::{ApiEnvelope, ServiceError, api_error};

/// Listing cache TTL.
const LISTING_TTL: Duration = Duration::from_secs(5 * 60);

/// A catalog product, field names per the catalog service contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub product_name: String,
    #[serde(default)]
    pub product_desc: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub product_price: Decimal,
    #[serde(default)]
    pub prod_cat: String,
    pub product_quantity: i64,
    #[serde(default)]
    pub uom: String,
    /// 0-5 star rating.
    #[serde(default)]
    pub prod_rating: u8,
    #[serde(rename = "imageURL", default)]
    pub image_url: String,
    #[serde(default)]
    pub create_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modify_date: Option<DateTime<Utc>>,
}

/// Create/update payload for a product.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub product_name: String,
    pub product_desc: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub product_price: Decimal,
    pub prod_cat: String,
    pub product_quantity: i64,
    pub uom: String,
    pub prod_rating: u8,
    #[serde(rename = "imageURL")]
    pub image_url: String,
}

/// Client for the catalog service.
#[derive(Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: Url,
    listing: Cache<(), Vec<Product>>,
}

impl CatalogClient {
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: Url) -> Self {
        let listing = Cache::builder()
            .max_capacity(1)
            .time_to_live(LISTING_TTL)
            .build();

        Self {
            client,
            base_url,
            listing,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    fn authorized(
        &self,
        request: reqwest::RequestBuilder,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        match token {
            Some(token) => request.header(AUTHORIZATION, token),
            None => request,
        }
    }

    /// Fetch the product listing via `GET /product`, served from cache when
    /// fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the listing does not decode.
    pub async fn list_products(&self, token: Option<&str>) -> Result<Vec<Product>, ServiceError> {
        if let Some(products) = self.listing.get(&()).await {
            return Ok(products);
        }

        let request = self.authorized(self.client.get(self.endpoint("/product")), token);
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let envelope: ApiEnvelope<Vec<Product>> = response
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))?;

        self.listing.insert((), envelope.data.clone()).await;
        Ok(envelope.data)
    }

    /// Fetch one product via `GET /product/{id}`. Not cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the product does not decode.
    pub async fn get_product(
        &self,
        id: ProductId,
        token: Option<&str>,
    ) -> Result<Product, ServiceError> {
        let request = self.authorized(
            self.client.get(self.endpoint(&format!("/product/{id}"))),
            token,
        );
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))
    }

    /// Create a product via `POST /product`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn create_product(
        &self,
        product: &ProductRequest,
        token: Option<&str>,
    ) -> Result<(), ServiceError> {
        let request = self.authorized(
            self.client.post(self.endpoint("/product")).json(product),
            token,
        );
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        self.listing.invalidate(&()).await;
        Ok(())
    }

    /// Update a product via `PUT /product/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn update_product(
        &self,
        id: ProductId,
        product: &ProductRequest,
        token: Option<&str>,
    ) -> Result<(), ServiceError> {
        let request = self.authorized(
            self.client
                .put(self.endpoint(&format!("/product/{id}")))
                .json(product),
            token,
        );
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        self.listing.invalidate(&()).await;
        Ok(())
    }

    /// Delete a product via `DELETE /product/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn delete_product(
        &self,
        id: ProductId,
        token: Option<&str>,
    ) -> Result<(), ServiceError> {
        let request = self.authorized(
            self.client.delete(self.endpoint(&format!("/product/{id}"))),
            token,
        );
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        self.listing.invalidate(&()).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_decodes_the_service_payload() {
        let product: Product = serde_json::from_str(
            r#"{
                "id": 5,
                "productName": "Basmati Rice",
                "productDesc": "5kg bag",
                "productPrice": 499.5,
                "prodCat": "Grocery",
                "productQuantity": 20,
                "uom": "bag",
                "prodRating": 4,
                "imageURL": "https://img.example/rice.jpg",
                "createDate": "2025-01-15T10:00:00Z",
                "modifyDate": null,
                "totProdPrice": 9990.0
            }"#,
        )
        .unwrap();

        assert_eq!(product.id, ProductId::new(5));
        assert_eq!(product.product_price, Decimal::new(4995, 1));
        assert_eq!(product.prod_rating, 4);
        assert!(product.modify_date.is_none());
    }

    #[test]
    fn product_request_serializes_numeric_fields_as_numbers() {
        let request = ProductRequest {
            product_name: "Tea".to_owned(),
            product_desc: String::new(),
            product_price: Decimal::new(1255, 2),
            prod_cat: "Beverage".to_owned(),
            product_quantity: 3,
            uom: "box".to_owned(),
            prod_rating: 5,
            image_url: String::new(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert!(json["productPrice"].is_number());
        assert!(json["productQuantity"].is_number());
        assert!(json.get("imageURL").is_some());
    }
}
