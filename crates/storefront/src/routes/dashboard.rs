//! Seller dashboard: product management grid and the create/update/delete
//! actions behind it.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use greenbasket_core::ProductId;

use crate::error::Result;
use crate::middleware::RequireSeller;
use crate::services::catalog::{Product, ProductRequest};
use crate::state::AppState;

use super::IdentityView;
use super::home::ProductView;

/// Dashboard grid template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/index.html")]
pub struct DashboardTemplate {
    pub identity: IdentityView,
    pub products: Vec<ProductView>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

/// Product create/update form template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/product_form.html")]
pub struct ProductFormTemplate {
    pub identity: IdentityView,
    pub form: ProductForm,
    pub action: String,
    pub editing: bool,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub notice: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Display the product management grid.
pub async fn index(
    RequireSeller(identity): RequireSeller,
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> DashboardTemplate {
    let (products, mut error) = match state.catalog().list_products(identity.bearer()).await {
        Ok(products) => (products, None),
        Err(err) => {
            tracing::warn!(error = %err, "Dashboard listing failed");
            (
                Vec::new(),
                Some("Failed to load products. Please try again.".to_owned()),
            )
        }
    };

    if error.is_none() {
        error = query.error.as_deref().and_then(|code| match code {
            "delete" => Some("Failed to delete the product. Please try again.".to_owned()),
            _ => None,
        });
    }
    let notice = query.notice.as_deref().and_then(|code| match code {
        "created" => Some("Product created successfully.".to_owned()),
        "updated" => Some("Product updated successfully.".to_owned()),
        "deleted" => Some("Product deleted successfully.".to_owned()),
        _ => None,
    });

    DashboardTemplate {
        identity: IdentityView::from(&identity),
        products: products.iter().map(ProductView::from).collect(),
        notice,
        error,
    }
}

/// Product form fields, kept as strings so invalid input can be echoed
/// back verbatim.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub product_desc: String,
    #[serde(default)]
    pub product_price: String,
    #[serde(default)]
    pub prod_cat: String,
    #[serde(default)]
    pub product_quantity: String,
    #[serde(default)]
    pub uom: String,
    #[serde(default)]
    pub prod_rating: String,
    #[serde(default)]
    pub image_url: String,
}

impl From<Product> for ProductForm {
    fn from(product: Product) -> Self {
        Self {
            product_name: product.product_name,
            product_desc: product.product_desc,
            product_price: product.product_price.normalize().to_string(),
            prod_cat: product.prod_cat,
            product_quantity: product.product_quantity.to_string(),
            uom: product.uom,
            prod_rating: product.prod_rating.to_string(),
            image_url: product.image_url,
        }
    }
}

/// Validate and convert the form into a catalog payload.
fn parse_product_form(form: &ProductForm) -> std::result::Result<ProductRequest, String> {
    let name = form.product_name.trim();
    if name.is_empty() {
        return Err("Product name is required.".to_owned());
    }
    if form.prod_cat.trim().is_empty() {
        return Err("Category is required.".to_owned());
    }

    let price: Decimal = form
        .product_price
        .trim()
        .parse()
        .map_err(|_| "Price must be a number.".to_owned())?;
    if price < Decimal::ZERO {
        return Err("Price cannot be negative.".to_owned());
    }

    let quantity: i64 = form
        .product_quantity
        .trim()
        .parse()
        .map_err(|_| "Quantity must be a whole number.".to_owned())?;
    if quantity < 0 {
        return Err("Quantity cannot be negative.".to_owned());
    }

    let rating: u8 = if form.prod_rating.trim().is_empty() {
        0
    } else {
        form.prod_rating
            .trim()
            .parse()
            .map_err(|_| "Rating must be a whole number.".to_owned())?
    };
    if rating > 5 {
        return Err("Rating is out of range (0-5).".to_owned());
    }

    Ok(ProductRequest {
        product_name: name.to_owned(),
        product_desc: form.product_desc.trim().to_owned(),
        product_price: price,
        prod_cat: form.prod_cat.trim().to_owned(),
        product_quantity: quantity,
        uom: form.uom.trim().to_owned(),
        prod_rating: rating,
        image_url: form.image_url.trim().to_owned(),
    })
}

/// Display an empty product form.
pub async fn new_product(RequireSeller(identity): RequireSeller) -> ProductFormTemplate {
    ProductFormTemplate {
        identity: IdentityView::from(&identity),
        form: ProductForm::default(),
        action: "/dashboard/products".to_owned(),
        editing: false,
        error: None,
    }
}

/// Handle a product create submission.
pub async fn create(
    RequireSeller(identity): RequireSeller,
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> Response {
    let identity_view = IdentityView::from(&identity);
    let request = match parse_product_form(&form) {
        Ok(request) => request,
        Err(message) => {
            return ProductFormTemplate {
                identity: identity_view,
                form,
                action: "/dashboard/products".to_owned(),
                editing: false,
                error: Some(message),
            }
            .into_response();
        }
    };

    match state.catalog().create_product(&request, identity.bearer()).await {
        Ok(()) => {
            tracing::info!(product = %request.product_name, "Product created");
            Redirect::to("/dashboard?notice=created").into_response()
        }
        Err(err) => {
            let message = err.rejection_message().map_or_else(
                || {
                    tracing::warn!(error = %err, "Product create failed");
                    "Failed to create the product. Please try again.".to_owned()
                },
                String::from,
            );
            ProductFormTemplate {
                identity: identity_view,
                form,
                action: "/dashboard/products".to_owned(),
                editing: false,
                error: Some(message),
            }
            .into_response()
        }
    }
}

/// Display the update form, pre-filled from the catalog.
pub async fn edit_product(
    RequireSeller(identity): RequireSeller,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ProductFormTemplate> {
    let product = state
        .catalog()
        .get_product(ProductId::new(id), identity.bearer())
        .await?;

    Ok(ProductFormTemplate {
        identity: IdentityView::from(&identity),
        form: ProductForm::from(product),
        action: format!("/dashboard/products/{id}"),
        editing: true,
        error: None,
    })
}

/// Handle a product update submission.
pub async fn update(
    RequireSeller(identity): RequireSeller,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<ProductForm>,
) -> Response {
    let identity_view = IdentityView::from(&identity);
    let action = format!("/dashboard/products/{id}");

    let request = match parse_product_form(&form) {
        Ok(request) => request,
        Err(message) => {
            return ProductFormTemplate {
                identity: identity_view,
                form,
                action,
                editing: true,
                error: Some(message),
            }
            .into_response();
        }
    };

    match state
        .catalog()
        .update_product(ProductId::new(id), &request, identity.bearer())
        .await
    {
        Ok(()) => {
            tracing::info!(product_id = id, "Product updated");
            Redirect::to("/dashboard?notice=updated").into_response()
        }
        Err(err) => {
            let message = err.rejection_message().map_or_else(
                || {
                    tracing::warn!(error = %err, product_id = id, "Product update failed");
                    "Failed to update the product. Please try again.".to_owned()
                },
                String::from,
            );
            ProductFormTemplate {
                identity: identity_view,
                form,
                action,
                editing: true,
                error: Some(message),
            }
            .into_response()
        }
    }
}

/// Handle a product delete.
pub async fn delete(
    RequireSeller(identity): RequireSeller,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Redirect {
    match state
        .catalog()
        .delete_product(ProductId::new(id), identity.bearer())
        .await
    {
        Ok(()) => {
            tracing::info!(product_id = id, "Product deleted");
            Redirect::to("/dashboard?notice=deleted")
        }
        Err(err) => {
            tracing::warn!(error = %err, product_id = id, "Product delete failed");
            Redirect::to("/dashboard?error=delete")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> ProductForm {
        ProductForm {
            product_name: "Green Tea".to_owned(),
            product_desc: "Loose leaf".to_owned(),
            product_price: "125.50".to_owned(),
            prod_cat: "Beverage".to_owned(),
            product_quantity: "30".to_owned(),
            uom: "box".to_owned(),
            prod_rating: "4".to_owned(),
            image_url: String::new(),
        }
    }

    #[test]
    fn valid_form_parses() {
        let request = parse_product_form(&valid_form()).unwrap();
        assert_eq!(request.product_price, Decimal::new(12550, 2));
        assert_eq!(request.product_quantity, 30);
        assert_eq!(request.prod_rating, 4);
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut form = valid_form();
        form.product_name = "   ".to_owned();
        assert!(parse_product_form(&form).is_err());
    }

    #[test]
    fn non_numeric_price_is_rejected() {
        let mut form = valid_form();
        form.product_price = "abc".to_owned();
        assert_eq!(
            parse_product_form(&form).unwrap_err(),
            "Price must be a number."
        );
    }

    #[test]
    fn negative_values_are_rejected() {
        let mut form = valid_form();
        form.product_price = "-1".to_owned();
        assert!(parse_product_form(&form).is_err());

        let mut form = valid_form();
        form.product_quantity = "-2".to_owned();
        assert!(parse_product_form(&form).is_err());
    }

    #[test]
    fn rating_defaults_to_zero_and_caps_at_five() {
        let mut form = valid_form();
        form.prod_rating = String::new();
        assert_eq!(parse_product_form(&form).unwrap().prod_rating, 0);

        form.prod_rating = "6".to_owned();
        assert!(parse_product_form(&form).is_err());
    }

    #[test]
    fn form_round_trips_from_a_product() {
        let product = Product {
            id: ProductId::new(9),
            product_name: "Rice".to_owned(),
            product_desc: String::new(),
            product_price: Decimal::new(4990, 1),
            prod_cat: "Grocery".to_owned(),
            product_quantity: 12,
            uom: "bag".to_owned(),
            prod_rating: 5,
            image_url: String::new(),
            create_date: None,
            modify_date: None,
        };

        let form = ProductForm::from(product);
        assert_eq!(form.product_price, "499");
        let request = parse_product_form(&form).unwrap();
        assert_eq!(request.product_quantity, 12);
    }
}
