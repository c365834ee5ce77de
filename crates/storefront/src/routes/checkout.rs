//! Checkout route handlers.
//!
//! Checkout is a plain form flow: every POST redirects back to a page and
//! carries its outcome as a flash notice.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use qkart_core::{Address, AddressId, CheckoutError, Cost, reconcile, validate_checkout};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::cart::{CartView, catalog_or_empty, session_records, store_records};
use super::layout::Chrome;
use super::redirect_with;
use crate::error::{Result, add_breadcrumb};
use crate::middleware::{Flash, RequireAuth};
use crate::models::{Notice, SessionUser, session_keys};
use crate::services::CartService;
use crate::state::AppState;

/// Shown when addresses cannot be loaded or changed.
pub const ADDRESSES_FAILED: &str = "Could not fetch addresses. Check that the backend is running, reachable and returns valid JSON.";

/// Shown when the order request gets no structured answer.
pub const ORDER_FAILED: &str =
    "Could not place order. Check that the backend is running, reachable and returns valid JSON.";

/// Address display data for templates.
#[derive(Clone)]
pub struct AddressView {
    pub id: String,
    pub address: String,
}

impl From<&Address> for AddressView {
    fn from(address: &Address) -> Self {
        Self {
            id: address.id.to_string(),
            address: address.address.clone(),
        }
    }
}

/// New address form data.
#[derive(Debug, Deserialize)]
pub struct AddressForm {
    #[serde(default)]
    pub address: String,
}

/// Place order form data.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderForm {
    pub address_id: Option<String>,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub chrome: Chrome,
    pub cart: CartView,
    pub addresses: Vec<AddressView>,
    pub balance: String,
}

/// Order confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/thanks.html")]
pub struct ThanksTemplate {
    pub chrome: Chrome,
    pub balance: String,
}

/// Display the checkout page.
#[instrument(skip(state, session, user, flash), fields(username = %user.username))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Flash(flash): Flash,
) -> Result<Response> {
    let mut chrome = Chrome::without_auth_buttons(Some(&user), flash);

    let records = match CartService::new(state.api()).fetch(&user).await {
        Ok(records) => {
            store_records(&session, &records).await?;
            records
        }
        Err(notice) => {
            chrome.push(notice);
            session_records(&session).await
        }
    };
    let products = catalog_or_empty(&state).await;

    let addresses = match state.api().get_addresses(&user.token).await {
        Ok(addresses) => addresses,
        Err(e) => {
            tracing::warn!("Failed to fetch addresses: {e}");
            chrome.push(Notice::error(e.user_message(ADDRESSES_FAILED)));
            Vec::new()
        }
    };

    Ok(CheckoutTemplate {
        chrome,
        cart: CartView::build(&records, &products, true),
        addresses: addresses.iter().map(AddressView::from).collect(),
        balance: user.balance.to_string(),
    }
    .into_response())
}

/// Add a shipping address.
#[instrument(skip(state, session, user, form), fields(username = %user.username))]
pub async fn add_address(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddressForm>,
) -> Response {
    let address = form.address.trim();
    if address.is_empty() {
        return redirect_with(&session, Notice::warning("Please enter an address"), "/checkout")
            .await;
    }

    match state.api().add_address(&user.token, address).await {
        Ok(_) => Redirect::to("/checkout").into_response(),
        Err(e) => {
            tracing::warn!("Failed to add address: {e}");
            redirect_with(
                &session,
                Notice::error(e.user_message(ADDRESSES_FAILED)),
                "/checkout",
            )
            .await
        }
    }
}

/// Delete a shipping address.
#[instrument(skip(state, session, user), fields(username = %user.username))]
pub async fn delete_address(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Response {
    match state
        .api()
        .delete_address(&user.token, &AddressId::new(id))
        .await
    {
        Ok(_) => Redirect::to("/checkout").into_response(),
        Err(e) => {
            tracing::warn!("Failed to delete address: {e}");
            redirect_with(
                &session,
                Notice::error(e.user_message(ADDRESSES_FAILED)),
                "/checkout",
            )
            .await
        }
    }
}

/// Validate and place the order.
///
/// Nothing is sent to the backend unless every check passes.
#[instrument(skip(state, session, user, form), fields(username = %user.username))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<PlaceOrderForm>,
) -> Result<Response> {
    // Validate against the backend's cart, not the session mirror
    let records = match CartService::new(state.api()).fetch(&user).await {
        Ok(records) => records,
        Err(notice) => return Ok(redirect_with(&session, notice, "/checkout").await),
    };
    store_records(&session, &records).await?;
    let products = catalog_or_empty(&state).await;
    let items = reconcile(&records, &products);

    let addresses = match state.api().get_addresses(&user.token).await {
        Ok(addresses) => addresses,
        Err(e) => {
            tracing::warn!("Failed to fetch addresses: {e}");
            return Ok(redirect_with(
                &session,
                Notice::error(e.user_message(ADDRESSES_FAILED)),
                "/checkout",
            )
            .await);
        }
    };

    let selected = form
        .address_id
        .filter(|id| !id.is_empty())
        .map(AddressId::new);

    let checked = validate_checkout(&items, user.balance, &addresses, selected.as_ref())
        .and_then(|total| {
            selected
                .ok_or(CheckoutError::NoAddressSelected)
                .map(|id| (total, id))
        });
    let (total, address_id) = match checked {
        Ok(order) => order,
        Err(e) => {
            return Ok(redirect_with(&session, Notice::warning(e.to_string()), "/checkout").await);
        }
    };

    add_breadcrumb("checkout", "Placing order");

    if let Err(e) = state.api().checkout(&user.token, &address_id).await {
        tracing::warn!("Order failed: {e}");
        return Ok(redirect_with(
            &session,
            Notice::error(e.user_message(ORDER_FAILED)),
            "/checkout",
        )
        .await);
    }

    let updated = SessionUser {
        balance: user.balance.checked_spend(total).unwrap_or(Cost::ZERO),
        ..user
    };
    session.insert(session_keys::CURRENT_USER, &updated).await?;
    store_records(&session, &[]).await?;

    tracing::info!(total = %total, "Order placed");
    Ok(redirect_with(&session, Notice::success("Order placed successfully"), "/thanks").await)
}

/// Display the order confirmation page.
#[instrument(skip(user, flash), fields(username = %user.username))]
pub async fn thanks(RequireAuth(user): RequireAuth, Flash(flash): Flash) -> impl IntoResponse {
    ThanksTemplate {
        chrome: Chrome::without_auth_buttons(Some(&user), flash),
        balance: user.balance.to_string(),
    }
}
