//! Router-level tests for the session guard: every protected screen must
//! bounce an anonymous request to the unauthorized page without touching
//! any upstream service.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header::LOCATION};
use tower::ServiceExt;

use greenbasket_storefront::config::StorefrontConfig;
use greenbasket_storefront::middleware::create_session_layer;
use greenbasket_storefront::routes;
use greenbasket_storefront::state::AppState;

fn app() -> Router {
    let config = StorefrontConfig::from_env().expect("default config loads");
    let session_layer = create_session_layer(&config);
    let state = AppState::new(config).expect("state builds");

    Router::new()
        .merge(routes::routes())
        .layer(session_layer)
        .with_state(state)
}

async fn get(path: &str) -> axum::response::Response {
    app()
        .oneshot(
            Request::builder()
                .uri(path)
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds")
}

#[tokio::test]
async fn protected_screens_redirect_anonymous_visitors() {
    for path in ["/home", "/cart", "/orders", "/dashboard", "/profile/1"] {
        let response = get(path).await;
        assert_eq!(
            response.status(),
            StatusCode::SEE_OTHER,
            "expected redirect for {path}"
        );
        assert_eq!(
            response.headers().get(LOCATION).expect("location header"),
            "/unauthorized",
            "wrong redirect target for {path}"
        );
    }
}

#[tokio::test]
async fn seller_screens_are_guarded_too() {
    for path in ["/dashboard/products/new", "/dashboard/products/5/edit"] {
        let response = get(path).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }
}

#[tokio::test]
async fn landing_redirects_to_login() {
    let response = get("/").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(LOCATION).expect("location header"), "/login");
}

#[tokio::test]
async fn unauthorized_page_is_public() {
    let response = get("/unauthorized").await;
    assert_eq!(response.status(), StatusCode::OK);
}
