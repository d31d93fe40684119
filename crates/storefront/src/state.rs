//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::services::{CartClient, CatalogClient, OrderClient, UserClient};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the upstream service clients.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    users: UserClient,
    catalog: CatalogClient,
    cart: CartClient,
    orders: OrderClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// All service clients share one `reqwest::Client` connection pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: StorefrontConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;
        let endpoints = &config.services;

        let users = UserClient::new(client.clone(), endpoints.user.clone());
        let catalog = CatalogClient::new(client.clone(), endpoints.catalog.clone());
        let cart = CartClient::new(client.clone(), endpoints.cart.clone());
        let orders = OrderClient::new(client, endpoints.order.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                users,
                catalog,
                cart,
                orders,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the user service client.
    #[must_use]
    pub fn users(&self) -> &UserClient {
        &self.inner.users
    }

    /// Get a reference to the catalog service client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Get a reference to the cart service client.
    #[must_use]
    pub fn cart(&self) -> &CartClient {
        &self.inner.cart
    }

    /// Get a reference to the order service client.
    #[must_use]
    pub fn orders(&self) -> &OrderClient {
        &self.inner.orders
    }
}
