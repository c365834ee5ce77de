//! Product route handlers.
//!
//! `GET /` renders the catalog page; `GET /products/search` returns just the
//! product grid for the live search box. Search requests are debounced per
//! session, and a request superseded by a newer one answers `204` so HTMX
//! leaves the grid alone.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use qkart_core::Product;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::cart::{CartView, session_records, store_records};
use super::layout::{Chrome, ProductView};
use super::notify;
use crate::error::Result;
use crate::middleware::{Flash, OptionalAuth};
use crate::models::{Notice, session_keys};
use crate::services::CartService;
use crate::state::AppState;

/// Shown when the catalog or a search cannot be loaded.
pub const CATALOG_FAILED: &str = "Something went wrong. Check the backend console for more details";

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub value: String,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub chrome: Chrome,
    pub products: Vec<ProductView>,
    /// Sidebar for logged-in users.
    pub cart: Option<CartView>,
}

/// Product grid fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_grid.html")]
pub struct ProductGridTemplate {
    pub products: Vec<ProductView>,
}

fn views(products: &[Product]) -> Vec<ProductView> {
    products.iter().map(ProductView::from).collect()
}

/// Key identifying this browser's search debouncer, created on first use.
async fn search_key(session: &Session) -> Result<String> {
    if let Some(key) = session.get::<String>(session_keys::SEARCH_KEY).await? {
        return Ok(key);
    }

    let key = uuid::Uuid::new_v4().to_string();
    session.insert(session_keys::SEARCH_KEY, &key).await?;
    Ok(key)
}

/// Display the product listing page.
#[instrument(skip(state, session, user, flash))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Flash(flash): Flash,
) -> Result<Response> {
    search_key(&session).await?;

    let mut chrome = Chrome::new(user.as_ref(), flash);

    let products = match state.api().get_products().await {
        Ok(products) => products,
        Err(e) => {
            tracing::error!("Failed to load catalog: {e}");
            chrome.push(Notice::error(CATALOG_FAILED));
            std::sync::Arc::default()
        }
    };

    let cart = match &user {
        Some(user) => {
            let records = match CartService::new(state.api()).fetch(user).await {
                Ok(records) => {
                    store_records(&session, &records).await?;
                    records
                }
                Err(notice) => {
                    chrome.push(notice);
                    session_records(&session).await
                }
            };
            Some(CartView::build(&records, &products, false))
        }
        None => None,
    };

    Ok(ProductsIndexTemplate {
        chrome,
        products: views(&products),
        cart,
    }
    .into_response())
}

/// Live search (HTMX), debounced per session.
#[instrument(skip(state, session))]
pub async fn search(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<SearchQuery>,
) -> Result<Response> {
    let key = search_key(&session).await?;
    let debouncer = state.searches().for_key(&key).await;

    let outcome = debouncer
        .call(query.value, |value| run_search(&state, value))
        .await;

    let Some((products, notice)) = outcome else {
        tracing::debug!("Search superseded");
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let grid = ProductGridTemplate {
        products: views(&products),
    };

    Ok(match notice {
        Some(notice) => notify(&notice, grid),
        None => grid.into_response(),
    })
}

/// Run one search against the backend.
///
/// A `404` means nothing matched and is not an error.
async fn run_search(state: &AppState, value: String) -> (Vec<Product>, Option<Notice>) {
    let value = value.trim();

    let result = if value.is_empty() {
        state.api().get_products().await.map(|p| p.as_ref().clone())
    } else {
        state.api().search_products(value).await
    };

    match result {
        Ok(products) => (products, None),
        Err(e) if e.is_not_found() => (Vec::new(), None),
        Err(e) => {
            tracing::error!("Search failed: {e}");
            (Vec::new(), Some(Notice::error(CATALOG_FAILED)))
        }
    }
}
