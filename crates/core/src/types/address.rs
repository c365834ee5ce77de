//! Shipping addresses stored by the backend.

use serde::{Deserialize, Serialize};

use super::id::AddressId;

/// A saved shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Backend identifier.
    #[serde(rename = "_id")]
    pub id: AddressId,
    /// Free-form address text.
    pub address: String,
}
