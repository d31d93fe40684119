//! Cart screen: seeds the working copy, serves the htmx fragments that
//! mutate it.
//!
//! Selection and quantity changes touch the session only; the cart service
//! is called for line-item deletes alone, and the local state is reconciled
//! only after it acknowledges.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderValue,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use greenbasket_core::{CartRecordId, Price, ProductId};

use crate::cart::WorkingCart;
use crate::error::Result;
use crate::middleware::RequireBuyer;
use crate::models::session_keys;
use crate::state::AppState;

use super::IdentityView;

/// An on-screen notice rendered inside the cart fragment.
pub struct Notice {
    pub message: String,
    pub failure: bool,
}

impl Notice {
    fn success(message: String) -> Self {
        Self {
            message,
            failure: false,
        }
    }

    fn failure(message: String) -> Self {
        Self {
            message,
            failure: true,
        }
    }
}

/// One line item as the cart card renders it.
pub struct LineView {
    pub product_id: i64,
    pub quantity: u32,
    pub selected: bool,
    pub line_total: Price,
}

/// One cart record as the cart screen renders it.
pub struct CartRecordView {
    pub id: String,
    pub name: String,
    pub desc: String,
    pub category: String,
    pub unit_price: Price,
    pub image_url: Option<String>,
    pub total_quantity: u32,
    pub total_price: Price,
    pub lines: Vec<LineView>,
}

/// Render-ready projection of the working copy.
pub struct CartView {
    pub records: Vec<CartRecordView>,
    pub selected_total: Price,
    pub is_empty: bool,
}

impl From<&WorkingCart> for CartView {
    fn from(cart: &WorkingCart) -> Self {
        let records = cart
            .records()
            .iter()
            .map(|record| CartRecordView {
                id: record.id.as_str().to_owned(),
                name: record.product_name.clone(),
                desc: record.product_desc.clone(),
                category: record.category.clone(),
                unit_price: record.unit_price,
                image_url: record.image_url.clone(),
                total_quantity: record.total_quantity,
                total_price: record.total_price,
                lines: record
                    .lines()
                    .map(|(product, quantity)| LineView {
                        product_id: product.as_i64(),
                        quantity,
                        selected: cart.is_selected(&record.id, product),
                        line_total: record.unit_price.times(quantity),
                    })
                    .collect(),
            })
            .collect();

        Self {
            records,
            selected_total: cart.selected_total(),
            is_empty: cart.is_empty(),
        }
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub identity: IdentityView,
    pub cart: CartView,
    pub notice: Option<Notice>,
}

/// Cart items fragment template, swapped in by the htmx posts.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
    pub notice: Option<Notice>,
}

/// Display the cart page.
///
/// Every visit re-fetches the persisted cart and re-seeds the working copy,
/// so quantity edits abandoned on a previous visit are discarded. A cart
/// service outage degrades to an empty cart with an inline notice.
pub async fn show(
    RequireBuyer(identity): RequireBuyer,
    State(state): State<AppState>,
    session: Session,
) -> Result<CartTemplate> {
    let (records, notice) = match state.cart().fetch_cart(identity.user_id).await {
        Ok(records) => (records, None),
        Err(err) => {
            tracing::warn!(error = %err, user_id = %identity.user_id, "Cart fetch failed");
            (
                Vec::new(),
                Some(Notice::failure(
                    "Failed to load your cart. Please try again.".to_owned(),
                )),
            )
        }
    };

    let working = WorkingCart::seed(records);
    session
        .insert(session_keys::WORKING_CART, &working)
        .await?;

    Ok(CartTemplate {
        identity: IdentityView::from(&identity),
        cart: CartView::from(&working),
        notice,
    })
}

/// Line item address posted by every cart fragment.
#[derive(Debug, Deserialize)]
pub struct LineForm {
    pub record_id: String,
    pub product_id: i64,
    #[serde(default)]
    pub product_name: String,
}

impl LineForm {
    fn record(&self) -> CartRecordId {
        CartRecordId::from(self.record_id.as_str())
    }

    fn product(&self) -> ProductId {
        ProductId::new(self.product_id)
    }
}

/// Load the session's working copy, or signal a full-page reload when it is
/// gone (expired session, server restart).
async fn load_working(session: &Session) -> Result<std::result::Result<WorkingCart, Response>> {
    let working = session
        .get::<WorkingCart>(session_keys::WORKING_CART)
        .await?;
    Ok(working.ok_or_else(reload_cart_page))
}

/// An htmx-aware redirect: the `HX-Redirect` header makes the client
/// navigate instead of swapping the fragment.
fn reload_cart_page() -> Response {
    let mut response = ().into_response();
    response
        .headers_mut()
        .insert("HX-Redirect", HeaderValue::from_static("/cart"));
    response
}

async fn store_and_render(
    session: &Session,
    working: WorkingCart,
    notice: Option<Notice>,
) -> Result<Response> {
    session
        .insert(session_keys::WORKING_CART, &working)
        .await?;
    Ok(CartItemsTemplate {
        cart: CartView::from(&working),
        notice,
    }
    .into_response())
}

/// Toggle a line's inclusion in the running subtotal.
pub async fn select(
    RequireBuyer(_identity): RequireBuyer,
    session: Session,
    Form(form): Form<LineForm>,
) -> Result<Response> {
    let mut working = match load_working(&session).await? {
        Ok(working) => working,
        Err(redirect) => return Ok(redirect),
    };

    working.toggle_select(form.record(), form.product());
    store_and_render(&session, working, None).await
}

/// Bump a line's quantity by one. Local only; nothing is persisted upstream
/// until checkout.
pub async fn increase(
    RequireBuyer(_identity): RequireBuyer,
    session: Session,
    Form(form): Form<LineForm>,
) -> Result<Response> {
    let mut working = match load_working(&session).await? {
        Ok(working) => working,
        Err(redirect) => return Ok(redirect),
    };

    working.increase(&form.record(), form.product());
    store_and_render(&session, working, None).await
}

/// Drop a line's quantity by one, flooring at 1.
pub async fn decrease(
    RequireBuyer(_identity): RequireBuyer,
    session: Session,
    Form(form): Form<LineForm>,
) -> Result<Response> {
    let mut working = match load_working(&session).await? {
        Ok(working) => working,
        Err(redirect) => return Ok(redirect),
    };

    working.decrease(&form.record(), form.product());
    store_and_render(&session, working, None).await
}

/// Remove a line item for good: the cart service first, the working copy
/// only on acknowledgement.
pub async fn delete(
    RequireBuyer(identity): RequireBuyer,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LineForm>,
) -> Result<Response> {
    let mut working = match load_working(&session).await? {
        Ok(working) => working,
        Err(redirect) => return Ok(redirect),
    };

    let record = form.record();
    let product = form.product();

    match state.cart().remove_line(&record, product).await {
        Ok(()) => {
            working.remove_line(&record, product);
            tracing::info!(
                user_id = %identity.user_id,
                record_id = %record,
                product_id = %product,
                "Removed cart line"
            );
            let name = if form.product_name.is_empty() {
                "Product".to_owned()
            } else {
                form.product_name
            };
            store_and_render(
                &session,
                working,
                Some(Notice::success(format!("{name} removed from cart."))),
            )
            .await
        }
        Err(err) => {
            // Upstream refused or is down: the working copy stays as-is so
            // the screen keeps matching the persisted cart.
            tracing::warn!(error = %err, record_id = %record, "Cart delete failed");
            store_and_render(
                &session,
                working,
                Some(Notice::failure(
                    "Failed to remove the item. Please try again.".to_owned(),
                )),
            )
            .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartRecord;
    use std::collections::BTreeMap;

    fn working() -> WorkingCart {
        WorkingCart::seed(vec![CartRecord {
            id: CartRecordId::from("c1"),
            owner_id: None,
            quantities: BTreeMap::from([(ProductId::new(1), 2), (ProductId::new(2), 1)]),
            total_quantity: 3,
            total_price: Price::from_rupees(250),
            product_name: "Green Tea".to_owned(),
            product_desc: String::new(),
            unit_price: Price::from_rupees(50),
            category: "Beverage".to_owned(),
            image_url: None,
        }])
    }

    #[test]
    fn view_projects_lines_with_selection_state() {
        let mut cart = working();
        cart.toggle_select(CartRecordId::from("c1"), ProductId::new(2));

        let view = CartView::from(&cart);
        assert_eq!(view.records.len(), 1);
        let lines = &view.records[0].lines;
        assert_eq!(lines.len(), 2);
        assert!(lines[0].selected);
        assert!(!lines[1].selected);
        assert_eq!(lines[0].line_total, Price::from_rupees(100));
    }

    #[test]
    fn view_subtotal_tracks_the_selection() {
        let mut cart = working();
        assert_eq!(CartView::from(&cart).selected_total, Price::from_rupees(150));

        cart.toggle_select(CartRecordId::from("c1"), ProductId::new(1));
        assert_eq!(CartView::from(&cart).selected_total, Price::from_rupees(50));
    }

    #[test]
    fn reload_response_carries_the_htmx_redirect() {
        let response = reload_cart_page();
        assert_eq!(
            response.headers().get("HX-Redirect").unwrap(),
            "/cart"
        );
    }
}
