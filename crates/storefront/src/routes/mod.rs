//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                               - Product listing (search, grid, cart sidebar)
//! GET  /products/search?value=         - Debounced search (product grid fragment)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                           - Re-fetch cart (sidebar fragment)
//! POST /cart/add                       - Add a new product with qty 1
//! POST /cart/quantity                  - Increment or decrement a line
//!
//! # Checkout (requires auth)
//! GET  /checkout                       - Addresses, read-only cart, balance
//! POST /checkout                       - Place order
//! POST /checkout/addresses             - Add address
//! POST /checkout/addresses/{id}/delete - Delete address
//! GET  /thanks                         - Order confirmation
//!
//! # Auth
//! GET  /login                          - Login page
//! POST /login                          - Login action (rate limited)
//! GET  /register                       - Register page
//! POST /register                       - Register action (rate limited)
//! POST /logout                         - Logout action
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod layout;
pub mod products;

use axum::{
    Router,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tower_sessions::Session;

use crate::middleware::{auth_rate_limiter, set_flash};
use crate::models::Notice;
use crate::state::AppState;

/// Attach a `notify` event to an HTMX response.
pub(crate) fn notify(notice: &Notice, body: impl IntoResponse) -> Response {
    (AppendHeaders([("HX-Trigger", notice.hx_trigger())]), body).into_response()
}

/// Queue a flash notice and redirect, logging if the session write fails.
pub(crate) async fn redirect_with(session: &Session, notice: Notice, to: &str) -> Response {
    if let Err(e) = set_flash(session, &notice).await {
        tracing::error!("Failed to set flash: {e}");
    }
    Redirect::to(to).into_response()
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new().route("/search", get(products::search))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/quantity", post(cart::quantity))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show).post(checkout::place_order))
        .route("/addresses", post(checkout::add_address))
        .route("/addresses/{id}/delete", post(checkout::delete_address))
}

/// Create the auth routes router.
///
/// Form submissions are rate limited per client IP.
pub fn auth_routes() -> Router<AppState> {
    let submissions = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .layer(auth_rate_limiter());

    Router::new()
        .route("/login", get(auth::login_page))
        .route("/register", get(auth::register_page))
        .route("/logout", post(auth::logout))
        .merge(submissions)
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .route("/thanks", get(checkout::thanks))
        .merge(auth_routes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn test_notify_sets_hx_trigger() {
        let response = notify(&Notice::warning("Login to add an item to the Cart"), StatusCode::NO_CONTENT);

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let trigger = response.headers().get("HX-Trigger").unwrap().to_str().unwrap();
        assert!(trigger.contains("\"notify\""));
        assert!(trigger.contains("Login to add an item to the Cart"));
    }
}
