//! Cart reconciliation.
//!
//! The backend stores a cart as a list of [`CartRecord`]s (`{productId, qty}`)
//! and knows nothing about how to display them. [`reconcile`] joins those
//! records with the product catalog to produce display-ready [`CartItem`]s.
//!
//! Records whose product is not in the catalog are dropped silently. The
//! output never contains an item whose product the caller cannot render.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{CartRecord, Cost, Product, ProductId};

/// A cart record joined with the product fields needed for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product this line refers to.
    pub product_id: ProductId,
    /// Number of units in the cart.
    pub qty: u32,
    /// Product name.
    pub name: String,
    /// Product category.
    pub category: String,
    /// Unit price.
    pub cost: Cost,
    /// Aggregate rating out of five.
    pub rating: u8,
    /// Image URL.
    pub image: String,
}

impl CartItem {
    /// Join a record with its product.
    #[must_use]
    pub fn from_parts(record: &CartRecord, product: &Product) -> Self {
        Self {
            product_id: record.product_id.clone(),
            qty: record.qty,
            name: product.name.clone(),
            category: product.category.clone(),
            cost: product.cost,
            rating: product.rating,
            image: product.image.clone(),
        }
    }

    /// Cost of this line (`cost × qty`).
    #[must_use]
    pub fn line_total(&self) -> Cost {
        self.cost.times(self.qty)
    }
}

/// Merge server cart records with the product catalog.
///
/// Returns one [`CartItem`] per record whose `product_id` matches a product,
/// in record order. Unmatched records are excluded.
#[must_use]
pub fn reconcile(records: &[CartRecord], products: &[Product]) -> Vec<CartItem> {
    if records.is_empty() || products.is_empty() {
        return Vec::new();
    }

    let by_id: HashMap<&ProductId, &Product> = products.iter().map(|p| (&p.id, p)).collect();

    records
        .iter()
        .filter_map(|record| {
            by_id
                .get(&record.product_id)
                .map(|product| CartItem::from_parts(record, product))
        })
        .collect()
}

/// Find the record for a product, if it is already in the cart.
#[must_use]
pub fn find_record<'a>(records: &'a [CartRecord], product_id: &ProductId) -> Option<&'a CartRecord> {
    records.iter().find(|record| &record.product_id == product_id)
}

/// Totals over a reconciled cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartSummary {
    /// Sum of quantities.
    pub item_count: u32,
    /// Sum of `cost × qty`.
    pub total: Cost,
}

impl CartSummary {
    /// Compute totals for a list of cart items.
    #[must_use]
    pub fn of(items: &[CartItem]) -> Self {
        Self {
            item_count: items.iter().map(|item| item.qty).sum(),
            total: items.iter().map(CartItem::line_total).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, name: &str, cost: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            category: "Misc".to_string(),
            cost: Cost::from_units(cost),
            rating: 4,
            image: format!("https://img.example/{id}.jpg"),
        }
    }

    #[test]
    fn test_reconcile_joins_product_fields() {
        let records = vec![CartRecord::new("A", 2)];
        let products = vec![product("A", "X", 10)];

        let items = reconcile(&records, &products);

        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.product_id.as_str(), "A");
        assert_eq!(item.qty, 2);
        assert_eq!(item.name, "X");
        assert_eq!(item.cost, Cost::from_units(10));
    }

    #[test]
    fn test_reconcile_drops_orphaned_records() {
        let records = vec![
            CartRecord::new("A", 1),
            CartRecord::new("ghost", 4),
            CartRecord::new("B", 3),
        ];
        let products = vec![product("B", "Bat", 20), product("A", "Ace", 5)];

        let items = reconcile(&records, &products);

        let ids: Vec<&str> = items.iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[test]
    fn test_reconcile_preserves_record_order_not_catalog_order() {
        let records = vec![CartRecord::new("C", 1), CartRecord::new("A", 1)];
        let products = vec![product("A", "a", 1), product("B", "b", 1), product("C", "c", 1)];

        let names: Vec<String> = reconcile(&records, &products)
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["c", "a"]);
    }

    #[test]
    fn test_reconcile_empty_catalog_yields_nothing() {
        let records = vec![CartRecord::new("A", 1)];
        assert!(reconcile(&records, &[]).is_empty());
    }

    #[test]
    fn test_reconcile_output_is_bounded_and_known() {
        // Every combination of a small id pool: output never exceeds the input
        // and never mentions a product outside the catalog.
        let pool = ["A", "B", "C", "D"];
        let products = vec![product("A", "a", 1), product("C", "c", 2)];

        for mask in 0u32..(1 << pool.len()) {
            let records: Vec<CartRecord> = pool
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(i, id)| CartRecord::new(*id, u32::try_from(i).unwrap_or(0) + 1))
                .collect();

            let items = reconcile(&records, &products);

            assert!(items.len() <= records.len());
            for item in &items {
                assert!(products.iter().any(|p| p.id == item.product_id));
            }
        }
    }

    #[test]
    fn test_reconcile_keeps_duplicate_records() {
        let records = vec![CartRecord::new("A", 1), CartRecord::new("A", 2)];
        let products = vec![product("A", "a", 3)];

        let qtys: Vec<u32> = reconcile(&records, &products).iter().map(|i| i.qty).collect();
        assert_eq!(qtys, vec![1, 2]);
    }

    #[test]
    fn test_find_record() {
        let records = vec![CartRecord::new("A", 1), CartRecord::new("B", 5)];
        assert_eq!(find_record(&records, &ProductId::new("B")).map(|r| r.qty), Some(5));
        assert!(find_record(&records, &ProductId::new("Z")).is_none());
    }

    #[test]
    fn test_summary_totals() {
        let products = vec![product("A", "a", 10), product("B", "b", 25)];
        let items = reconcile(
            &[CartRecord::new("A", 3), CartRecord::new("B", 2)],
            &products,
        );

        let summary = CartSummary::of(&items);
        assert_eq!(summary.item_count, 5);
        assert_eq!(summary.total, Cost::from_units(80));
        assert_eq!(CartSummary::of(&[]), CartSummary::default());
    }
}
