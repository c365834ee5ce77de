//! Catalog and cart records as exchanged with the QKart backend.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Cost;

/// A product in the catalog.
///
/// Example backend payload:
///
/// ```json
/// {
///     "name": "iPhone XR",
///     "category": "Phones",
///     "cost": 100,
///     "rating": 4,
///     "image": "https://i.imgur.com/lulqWzW.jpg",
///     "_id": "v4sLtEcMpzabRyfx"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Backend identifier.
    #[serde(rename = "_id")]
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Category the product belongs to.
    #[serde(default)]
    pub category: String,
    /// Unit price.
    pub cost: Cost,
    /// Aggregate rating, an integer out of five.
    #[serde(default)]
    pub rating: u8,
    /// Image URL.
    #[serde(default)]
    pub image: String,
}

impl Product {
    /// Highest rating a product can carry.
    pub const MAX_RATING: u8 = 5;

    /// Rating clamped to `0..=MAX_RATING`.
    #[must_use]
    pub fn stars(&self) -> u8 {
        self.rating.min(Self::MAX_RATING)
    }
}

/// A server-side cart entry: how many of a product are in the cart.
///
/// A quantity of zero sent to the backend removes the entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRecord {
    /// Product this entry refers to.
    pub product_id: ProductId,
    /// Number of units.
    pub qty: u32,
}

impl CartRecord {
    /// Create a new cart record.
    #[must_use]
    pub fn new(product_id: impl Into<ProductId>, qty: u32) -> Self {
        Self {
            product_id: product_id.into(),
            qty,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_deserializes_backend_shape() {
        let json = r#"{
            "name": "Basketball",
            "category": "Sports",
            "cost": 100,
            "rating": 5,
            "image": "https://i.imgur.com/lulqWzW.jpg",
            "_id": "upLK9JbQ4rMhTwt4"
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_str(), "upLK9JbQ4rMhTwt4");
        assert_eq!(product.name, "Basketball");
        assert_eq!(product.cost, Cost::from_units(100));
        assert_eq!(product.stars(), 5);
    }

    #[test]
    fn test_cart_record_uses_camel_case() {
        let record: CartRecord =
            serde_json::from_str(r#"{"productId":"KCRwjF7lN97HnEaY","qty":3}"#).unwrap();
        assert_eq!(record, CartRecord::new("KCRwjF7lN97HnEaY", 3));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["productId"], "KCRwjF7lN97HnEaY");
        assert_eq!(json["qty"], 3);
    }

    #[test]
    fn test_stars_are_clamped() {
        let product = Product {
            id: ProductId::new("p"),
            name: "Odd".to_string(),
            category: String::new(),
            cost: Cost::ZERO,
            rating: 9,
            image: String::new(),
        };
        assert_eq!(product.stars(), 5);
    }
}
