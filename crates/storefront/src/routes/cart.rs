//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Every handler answers with the sidebar fragment, or with `204` plus a
//! `notify` trigger when there is nothing to swap.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use qkart_core::{CartRecord, CartSummary, Product, ProductId, QuantityChange, find_record, reconcile};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::layout::CartItemView;
use super::notify;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::session_keys;
use crate::services::CartService;
use crate::state::AppState;

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u32,
    /// Checkout shows quantities without +/- buttons.
    pub read_only: bool,
}

impl CartView {
    /// Reconcile records against the catalog.
    ///
    /// Records for products missing from the catalog are left out.
    #[must_use]
    pub fn build(records: &[CartRecord], products: &[Product], read_only: bool) -> Self {
        let items = reconcile(records, products);

        let dropped = records.len() - items.len();
        if dropped > 0 {
            tracing::debug!(dropped, "Cart records without a matching product");
        }

        let summary = CartSummary::of(&items);
        Self {
            items: items.iter().map(CartItemView::from).collect(),
            total: summary.total.to_string(),
            item_count: summary.item_count,
            read_only,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Cart records last returned by the backend for this session.
pub(crate) async fn session_records(session: &Session) -> Vec<CartRecord> {
    session
        .get::<Vec<CartRecord>>(session_keys::CART)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Replace the session's cart records.
pub(crate) async fn store_records(
    session: &Session,
    records: &[CartRecord],
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, records).await
}

/// Store records, logging instead of failing the request.
async fn remember(session: &Session, records: &[CartRecord]) {
    if let Err(e) = store_records(session, records).await {
        tracing::error!("Failed to save cart to session: {e}");
    }
}

/// Catalog for reconciling, or empty if the backend is unavailable.
pub(crate) async fn catalog_or_empty(state: &AppState) -> std::sync::Arc<Vec<Product>> {
    match state.api().get_products().await {
        Ok(products) => products,
        Err(e) => {
            tracing::warn!("Failed to load catalog for cart: {e}");
            std::sync::Arc::default()
        }
    }
}

// =============================================================================
// Forms & Templates
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
}

/// Direction of a quantity button.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantityAction {
    Increment,
    Decrement,
}

impl From<QuantityAction> for QuantityChange {
    fn from(action: QuantityAction) -> Self {
        match action {
            QuantityAction::Increment => Self::Increment,
            QuantityAction::Decrement => Self::Decrement,
        }
    }
}

/// Quantity form data.
#[derive(Debug, Deserialize)]
pub struct QuantityForm {
    pub product_id: String,
    /// Quantity shown on the button's line, used if the session has none.
    pub qty: u32,
    pub action: QuantityAction,
}

/// Cart sidebar fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart.html")]
pub struct CartTemplate {
    pub cart: CartView,
}

async fn fragment(state: &AppState, records: &[CartRecord]) -> CartTemplate {
    let products = catalog_or_empty(state).await;
    CartTemplate {
        cart: CartView::build(records, &products, false),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Re-fetch the cart and render the sidebar (HTMX).
#[instrument(skip(state, session, user), fields(username = %user.username))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Response {
    match CartService::new(state.api()).fetch(&user).await {
        Ok(records) => {
            remember(&session, &records).await;
            fragment(&state, &records).await.into_response()
        }
        Err(notice) => {
            let records = session_records(&session).await;
            notify(&notice, fragment(&state, &records).await)
        }
    }
}

/// Add a product to the cart (HTMX).
///
/// Refused adds answer `204` with a warning and send nothing to the backend.
#[instrument(skip(state, session, user))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let records = session_records(&session).await;
    let product_id = ProductId::new(form.product_id);

    match CartService::new(state.api())
        .add(user.as_ref(), &records, &product_id)
        .await
    {
        Ok(records) => {
            remember(&session, &records).await;
            fragment(&state, &records).await.into_response()
        }
        Err(notice) => notify(&notice, StatusCode::NO_CONTENT),
    }
}

/// Increment or decrement a cart line (HTMX).
#[instrument(skip(state, session, user), fields(username = %user.username))]
pub async fn quantity(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<QuantityForm>,
) -> Response {
    let records = session_records(&session).await;
    let product_id = ProductId::new(form.product_id);
    let current = find_record(&records, &product_id).map_or(form.qty, |r| r.qty);

    match CartService::new(state.api())
        .change_quantity(&user, &product_id, current, form.action.into())
        .await
    {
        Ok(records) => {
            remember(&session, &records).await;
            fragment(&state, &records).await.into_response()
        }
        Err(notice) => notify(&notice, StatusCode::NO_CONTENT),
    }
}

#[cfg(test)]
mod tests {
    use qkart_core::Cost;

    use super::*;

    fn product(id: &str, cost: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            category: "Misc".to_string(),
            cost: Cost::from_units(cost),
            rating: 3,
            image: String::new(),
        }
    }

    #[test]
    fn test_cart_view_totals() {
        let records = [CartRecord::new("A", 2), CartRecord::new("B", 1)];
        let products = [product("A", 10), product("B", 5)];

        let view = CartView::build(&records, &products, false);
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.item_count, 3);
        assert_eq!(view.total, "$25");
    }

    #[test]
    fn test_cart_view_drops_unknown_products() {
        let records = [CartRecord::new("A", 2), CartRecord::new("gone", 4)];
        let products = [product("A", 10)];

        let view = CartView::build(&records, &products, true);
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].product_id, "A");
        assert!(view.read_only);
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::build(&[], &[product("A", 10)], false);
        assert!(view.is_empty());
        assert_eq!(view.total, "$0");
    }

    #[test]
    fn test_quantity_action_maps_to_change() {
        assert_eq!(
            QuantityChange::from(QuantityAction::Decrement),
            QuantityChange::Decrement
        );
    }
}
