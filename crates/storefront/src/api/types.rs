//! Request and response bodies for the QKart REST API.

use qkart_core::{AddressId, Cost};
use serde::{Deserialize, Serialize};

/// Body for `POST /auth/register` and `POST /auth/login`.
#[derive(Debug, Serialize)]
pub struct CredentialsRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Successful `POST /auth/login` response.
///
/// ```json
/// { "success": true, "token": "eyJhbGci...", "username": "crio.do", "balance": 5000 }
/// ```
#[derive(Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub balance: Cost,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"[REDACTED]")
            .field("username", &self.username)
            .field("balance", &self.balance)
            .finish()
    }
}

/// Body for `POST /user/addresses`.
#[derive(Debug, Serialize)]
pub struct AddressRequest<'a> {
    pub address: &'a str,
}

/// Body for `POST /cart/checkout`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest<'a> {
    pub address_id: &'a AddressId,
}

/// Error body returned with non-success statuses.
///
/// ```json
/// { "success": false, "message": "Protected route, Oauth2 Bearer token not found" }
/// ```
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
}
