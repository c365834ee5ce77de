//! Session-related types.
//!
//! The session plays the part of browser local storage: it holds the login
//! token, username, and wallet balance, plus the last known cart records.

use std::fmt;

use qkart_core::Cost;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Bearer token issued by `POST /auth/login`.
///
/// `Debug` output is redacted.
#[derive(Clone)]
pub struct AuthToken(SecretString);

impl AuthToken {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Expose the raw token for an `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

impl Serialize for AuthToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose())
    }
}

impl<'de> Deserialize<'de> for AuthToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Session-stored login state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    /// Username shown in the header.
    pub username: String,
    /// Token for authenticated backend calls.
    pub token: AuthToken,
    /// Wallet balance as of login or the last order.
    pub balance: Cost,
}

/// Session keys.
pub mod keys {
    /// Key for the logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the last cart records returned by the backend.
    pub const CART: &str = "cart";

    /// Key for a one-shot notice shown on the next full page render.
    pub const FLASH: &str = "flash";

    /// Key identifying this browser's search debouncer.
    pub const SEARCH_KEY: &str = "search_key";
}
