//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Redirect to login
//! GET  /health                 - Health check
//! GET  /unauthorized           - Access denied screen
//!
//! # Auth (rate limited)
//! GET  /login                  - Login page
//! POST /login                  - Login action
//! GET  /register               - Registration page
//! POST /register               - Registration action
//! POST /logout                 - Logout action
//!
//! # Catalog (buyer)
//! GET  /home                   - Product listing with search/filter
//! POST /cart/add               - Add a product to the cart
//!
//! # Cart (buyer, htmx fragments)
//! GET  /cart                   - Cart page (seeds the working copy)
//! POST /cart/select            - Toggle a line's selection (fragment)
//! POST /cart/increase          - Quantity +1 (fragment)
//! POST /cart/decrease          - Quantity -1, floored at 1 (fragment)
//! POST /cart/delete            - Remove a line via the cart service (fragment)
//!
//! # Orders (buyer)
//! GET  /orders                 - Order history
//! POST /orders/{id}/cancel     - Cancel an order (fragment)
//!
//! # Profile (buyer or seller)
//! GET  /profile/{id}           - Profile view / edit form
//! POST /profile                - Profile update
//!
//! # Dashboard (seller)
//! GET  /dashboard                       - Product management grid
//! GET  /dashboard/products/new          - Create form
//! POST /dashboard/products              - Create action
//! GET  /dashboard/products/{id}/edit    - Update form
//! POST /dashboard/products/{id}         - Update action
//! POST /dashboard/products/{id}/delete  - Delete action
//! ```

pub mod auth;
pub mod cart;
pub mod dashboard;
pub mod home;
pub mod orders;
pub mod profile;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use greenbasket_core::Role;

use crate::middleware::auth_rate_limiter;
use crate::models::Identity;
use crate::state::AppState;

/// Identity display data for the navigation chrome.
#[derive(Clone)]
pub struct IdentityView {
    pub user_id: i64,
    pub full_name: String,
    pub is_buyer: bool,
    pub is_seller: bool,
}

impl From<&Identity> for IdentityView {
    fn from(identity: &Identity) -> Self {
        Self {
            user_id: identity.user_id.as_i64(),
            full_name: identity.full_name.clone(),
            is_buyer: identity.role == Role::Buyer,
            is_seller: identity.role == Role::Seller,
        }
    }
}

/// Access denied screen template.
#[derive(Template, WebTemplate)]
#[template(path = "unauthorized.html")]
pub struct UnauthorizedTemplate;

/// Landing redirect: everything starts at the login screen.
async fn root() -> Redirect {
    Redirect::to("/login")
}

/// Display the access denied screen.
async fn unauthorized() -> UnauthorizedTemplate {
    UnauthorizedTemplate
}

/// Create the auth routes router (rate limited).
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .layer(auth_rate_limiter())
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(home::add_to_cart))
        .route("/select", post(cart::select))
        .route("/increase", post(cart::increase))
        .route("/decrease", post(cart::decrease))
        .route("/delete", post(cart::delete))
}

/// Create the dashboard routes router.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/products/new", get(dashboard::new_product))
        .route("/products", post(dashboard::create))
        .route("/products/{id}/edit", get(dashboard::edit_product))
        .route("/products/{id}", post(dashboard::update))
        .route("/products/{id}/delete", post(dashboard::delete))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/unauthorized", get(unauthorized))
        .merge(auth_routes())
        .route("/home", get(home::index))
        .nest("/cart", cart_routes())
        .route("/orders", get(orders::index))
        .route("/orders/{id}/cancel", post(orders::cancel))
        .route("/profile/{id}", get(profile::show))
        .route("/profile", post(profile::update))
        .nest("/dashboard", dashboard_routes())
}
