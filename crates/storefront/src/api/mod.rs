//! QKart REST API client.
//!
//! # Architecture
//!
//! - The backend is the source of truth for products, carts, users, addresses,
//!   and orders. The storefront keeps no database of its own.
//! - Direct JSON-over-HTTP calls with `reqwest`; bearer token auth.
//! - In-memory caching of the product catalog via `moka`.
//!
//! # Endpoints
//!
//! ```text
//! GET    /products                 - Full catalog
//! GET    /products/search?value=   - Catalog search (404 when nothing matches)
//! GET    /cart                     - Cart records for the token's user
//! POST   /cart                     - Set a product's quantity (0 removes it)
//! POST   /cart/checkout            - Place an order for the current cart
//! POST   /auth/register            - Create a user
//! POST   /auth/login               - Exchange credentials for a token
//! GET    /user/addresses           - Saved addresses
//! POST   /user/addresses           - Add an address
//! DELETE /user/addresses/{id}      - Remove an address
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use qkart_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config.api)?;
//! let products = client.get_products().await?;
//! let cart = client.get_cart(&user.token).await?;
//! ```

mod cache;
mod client;
pub mod types;

use std::future::Future;

use qkart_core::CartRecord;
use reqwest::StatusCode;
use thiserror::Error;

pub use client::ApiClient;

use crate::models::AuthToken;

/// Errors that can occur when talking to the QKart backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a non-success status.
    ///
    /// `message` is the `message` field of a structured error body, if the
    /// body had one.
    #[error("HTTP {status}: {}", message.as_deref().unwrap_or("(no message)"))]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    /// No response was received (connection refused, timeout, TLS, ...).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success response did not contain the expected JSON.
    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Text to show the user.
    ///
    /// Structured server messages are shown verbatim; everything else falls
    /// back to the caller's connectivity message.
    #[must_use]
    pub fn user_message<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self {
            Self::Status {
                message: Some(message),
                ..
            } => message,
            _ => fallback,
        }
    }

    /// HTTP status, if the backend responded.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend responded with 404.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

/// Cart operations used by the add/update-cart flow.
///
/// Implemented by [`ApiClient`]; the flow is generic over it so that it can
/// be exercised without a network.
pub trait CartApi: Send + Sync {
    /// Fetch the user's cart records.
    fn get_cart(
        &self,
        token: &AuthToken,
    ) -> impl Future<Output = Result<Vec<CartRecord>, ApiError>> + Send;

    /// Set a product's quantity and return the full updated cart.
    fn update_cart(
        &self,
        token: &AuthToken,
        record: &CartRecord,
    ) -> impl Future<Output = Result<Vec<CartRecord>, ApiError>> + Send;
}
