//! Buyer home screen: product listing with search and category filter.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use greenbasket_core::{Price, ProductId};

use crate::middleware::RequireBuyer;
use crate::services::cart::AddToCartRequest;
use crate::services::catalog::Product;
use crate::state::AppState;

use super::IdentityView;

/// One product as the listing and dashboard grids render it.
#[derive(Clone)]
pub struct ProductView {
    pub id: i64,
    pub name: String,
    pub desc: String,
    pub price: Price,
    pub category: String,
    pub quantity: i64,
    pub uom: String,
    pub rating: u8,
    pub image_url: String,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i64(),
            name: product.product_name.clone(),
            desc: product.product_desc.clone(),
            price: Price::new(product.product_price),
            category: product.prod_cat.clone(),
            quantity: product.product_quantity,
            uom: product.uom.clone(),
            rating: product.prod_rating.min(5),
            image_url: product.image_url.clone(),
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home/index.html")]
pub struct HomeTemplate {
    pub identity: IdentityView,
    pub products: Vec<ProductView>,
    pub categories: Vec<String>,
    pub q: String,
    pub category: String,
    pub notice: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub notice: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    /// Product name carried alongside the `added` notice.
    #[serde(default)]
    pub name: Option<String>,
}

/// Case-insensitive name search combined with an exact category filter.
///
/// Both filters are conjunctive; an empty or absent value means "no
/// restriction". Listing order is preserved.
fn filter_products<'a>(
    products: &'a [Product],
    q: Option<&str>,
    category: Option<&str>,
) -> Vec<&'a Product> {
    let needle = q.map(str::to_lowercase).filter(|s| !s.trim().is_empty());
    let category = category.filter(|s| !s.trim().is_empty());

    products
        .iter()
        .filter(|product| {
            needle.as_ref().is_none_or(|needle| {
                product.product_name.to_lowercase().contains(needle.trim())
            })
        })
        .filter(|product| category.is_none_or(|cat| product.prod_cat == cat))
        .collect()
}

/// Distinct categories in first-seen order, for the filter dropdown.
fn categories(products: &[Product]) -> Vec<String> {
    let mut seen = Vec::new();
    for product in products {
        if !product.prod_cat.is_empty() && !seen.contains(&product.prod_cat) {
            seen.push(product.prod_cat.clone());
        }
    }
    seen
}

fn notice_message(code: &str, name: Option<&str>) -> Option<String> {
    match code {
        "added" => Some(format!(
            "{} added to cart successfully!",
            name.unwrap_or("Product")
        )),
        _ => None,
    }
}

fn error_message(code: &str) -> Option<String> {
    match code {
        "qty" => Some("Quantity must be at least 1.".to_owned()),
        "cart" => Some("Failed to add the product to your cart. Please try again.".to_owned()),
        _ => None,
    }
}

/// Display the product listing, filtered by the query parameters.
///
/// A catalog outage degrades to an empty grid with an inline error rather
/// than an error page.
pub async fn index(
    RequireBuyer(identity): RequireBuyer,
    State(state): State<AppState>,
    Query(query): Query<HomeQuery>,
) -> HomeTemplate {
    let (products, mut error) = match state.catalog().list_products(identity.bearer()).await {
        Ok(products) => (products, None),
        Err(err) => {
            tracing::warn!(error = %err, "Catalog listing failed");
            (
                Vec::new(),
                Some("Failed to load products. Please try again.".to_owned()),
            )
        }
    };

    if error.is_none() {
        error = query.error.as_deref().and_then(error_message);
    }
    let notice = query
        .notice
        .as_deref()
        .and_then(|code| notice_message(code, query.name.as_deref()));

    let filtered = filter_products(&products, query.q.as_deref(), query.category.as_deref());

    HomeTemplate {
        identity: IdentityView::from(&identity),
        products: filtered.into_iter().map(ProductView::from).collect(),
        categories: categories(&products),
        q: query.q.unwrap_or_default(),
        category: query.category.unwrap_or_default(),
        notice,
        error,
    }
}

#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i64,
    pub quantity: u32,
    #[serde(default)]
    pub product_name: String,
}

/// Add one product to the cart via the cart service, then bounce back to
/// the listing with a notice.
pub async fn add_to_cart(
    RequireBuyer(identity): RequireBuyer,
    State(state): State<AppState>,
    Form(form): Form<AddToCartForm>,
) -> Response {
    if form.quantity == 0 {
        return Redirect::to("/home?error=qty").into_response();
    }

    let request = AddToCartRequest::single(
        identity.user_id,
        ProductId::new(form.product_id),
        form.quantity,
    );

    match state.cart().add_lines(&request).await {
        Ok(()) => {
            tracing::info!(
                user_id = %identity.user_id,
                product_id = form.product_id,
                quantity = form.quantity,
                "Added product to cart"
            );
            let name = urlencoding::encode(&form.product_name);
            Redirect::to(&format!("/home?notice=added&name={name}")).into_response()
        }
        Err(err) => {
            tracing::warn!(error = %err, "Add to cart failed");
            Redirect::to("/home?error=cart").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product(name: &str, category: &str) -> Product {
        Product {
            id: ProductId::new(1),
            product_name: name.to_owned(),
            product_desc: String::new(),
            product_price: Decimal::new(100, 0),
            prod_cat: category.to_owned(),
            product_quantity: 10,
            uom: "kg".to_owned(),
            prod_rating: 4,
            image_url: String::new(),
            create_date: None,
            modify_date: None,
        }
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let products = vec![
            product("Basmati Rice", "Grocery"),
            product("Green Tea", "Beverage"),
        ];
        let hits = filter_products(&products, Some("rice"), None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].product_name, "Basmati Rice");
    }

    #[test]
    fn filters_are_conjunctive() {
        let products = vec![
            product("Basmati Rice", "Grocery"),
            product("Rice Crackers", "Snacks"),
        ];
        let hits = filter_products(&products, Some("rice"), Some("Snacks"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].product_name, "Rice Crackers");
    }

    #[test]
    fn empty_filters_return_everything() {
        let products = vec![product("A", "X"), product("B", "Y")];
        assert_eq!(filter_products(&products, None, None).len(), 2);
        assert_eq!(filter_products(&products, Some("  "), Some("")).len(), 2);
    }

    #[test]
    fn categories_are_distinct_in_first_seen_order() {
        let products = vec![
            product("A", "Grocery"),
            product("B", "Beverage"),
            product("C", "Grocery"),
            product("D", ""),
        ];
        assert_eq!(categories(&products), vec!["Grocery", "Beverage"]);
    }

    #[test]
    fn rating_is_clamped_to_five_stars() {
        let mut p = product("A", "X");
        p.prod_rating = 9;
        assert_eq!(ProductView::from(&p).rating, 5);
    }
}
