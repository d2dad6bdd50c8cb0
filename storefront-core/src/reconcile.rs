//! Pure derivation of cart items from raw cart entries and the catalog.
//!
//! Nothing here fails: missing inputs produce an empty cart and stale
//! references are dropped.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::{CartEntry, CartItem, Product};

/// Join `entries` with `catalog`.
///
/// - Each entry is matched to the first product with the same id.
/// - Entries with an unknown id, or a quantity of zero, are skipped.
/// - Output order follows `entries`.
/// - Repeated entries for one product are kept as separate items.
pub fn reconcile(entries: &[CartEntry], catalog: &[Product]) -> Vec<CartItem> {
    if entries.is_empty() || catalog.is_empty() {
        return Vec::new();
    }

    let mut index: HashMap<&str, &Product> = HashMap::with_capacity(catalog.len());
    for product in catalog {
        index.entry(product.id.as_str()).or_insert(product);
    }

    entries
        .iter()
        .filter(|entry| entry.qty > 0)
        .filter_map(|entry| {
            index
                .get(entry.product_id.as_str())
                .map(|product| CartItem::new((*product).clone(), entry.qty))
        })
        .collect()
}

/// Sum of `cost * qty` over all items.
pub fn total_value(items: &[CartItem]) -> f64 {
    items.iter().map(CartItem::line_total).sum()
}

/// Sum of `qty` over all items.
pub fn total_quantity(items: &[CartItem]) -> u64 {
    items.iter().map(|item| u64::from(item.qty())).sum()
}

pub fn is_item_in_cart(items: &[CartItem], product_id: &str) -> bool {
    items.iter().any(|item| item.id() == product_id)
}

/// Figures shown on the checkout page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartSummary {
    /// Number of units across all lines.
    pub products: u64,
    pub subtotal: f64,
    pub shipping: f64,
    pub total: f64,
}

impl CartSummary {
    pub fn from_items(items: &[CartItem]) -> Self {
        let subtotal = total_value(items);
        let shipping = 0.0;
        Self {
            products: total_quantity(items),
            subtotal,
            shipping,
            total: subtotal + shipping,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, cost: f64) -> Product {
        Product {
            id: id.into(),
            name: format!("Product {id}"),
            category: "Misc".into(),
            cost,
            rating: 4.0,
            image_url: format!("https://img/{id}.png"),
        }
    }

    #[test]
    fn zero_quantity_entries_are_not_items() {
        let catalog = vec![product("1", 10.0)];
        let items = reconcile(&[CartEntry::new("1", 0)], &catalog);
        assert!(items.is_empty());
    }

    #[test]
    fn first_catalog_match_wins() {
        let mut shadow = product("1", 999.0);
        shadow.name = "Shadow".into();
        let catalog = vec![product("1", 10.0), shadow];
        let items = reconcile(&[CartEntry::new("1", 1)], &catalog);
        assert_eq!(items[0].product().cost, 10.0);
    }

    #[test]
    fn summary_has_free_shipping() {
        let catalog = vec![product("1", 100.0), product("2", 50.0)];
        let items = reconcile(&[CartEntry::new("1", 2), CartEntry::new("2", 3)], &catalog);
        let summary = CartSummary::from_items(&items);
        assert_eq!(summary.products, 5);
        assert_eq!(summary.subtotal, 350.0);
        assert_eq!(summary.shipping, 0.0);
        assert_eq!(summary.total, 350.0);
    }

    fn lines(items: &[CartItem]) -> Vec<(&str, u32)> {
        items.iter().map(|item| (item.id(), item.qty())).collect()
    }

    #[test]
    fn order_follows_entries_and_duplicates_stay_separate() {
        let catalog = vec![product("1", 100.0), product("2", 50.0)];
        let entries = [
            CartEntry::new("2", 1),
            CartEntry::new("1", 2),
            CartEntry::new("2", 3),
            CartEntry::new("3", 1),
        ];

        let items = reconcile(&entries, &catalog);

        assert_eq!(lines(&items), vec![("2", 1), ("1", 2), ("2", 3)]);
        assert_eq!(total_value(&items), 400.0);
        assert_eq!(total_quantity(&items), 6);
    }

    #[test]
    fn reconciling_twice_gives_the_same_items() {
        let catalog = vec![product("1", 100.0), product("2", 50.0)];
        let entries = [CartEntry::new("2", 1), CartEntry::new("1", 2)];
        assert_eq!(reconcile(&entries, &catalog), reconcile(&entries, &catalog));
    }

    #[test]
    fn empty_inputs_give_an_empty_cart() {
        let catalog = vec![product("1", 100.0)];
        assert!(reconcile(&[], &catalog).is_empty());
        assert!(reconcile(&[CartEntry::new("1", 2)], &[]).is_empty());
        assert_eq!(total_value(&[]), 0.0);
        assert_eq!(total_quantity(&[]), 0);
    }

    #[test]
    fn unknown_product_is_dropped_from_totals() {
        let catalog = vec![product("1", 100.0), product("2", 50.0)];
        let items = reconcile(&[CartEntry::new("1", 2), CartEntry::new("3", 1)], &catalog);

        assert_eq!(lines(&items), vec![("1", 2)]);
        assert_eq!(total_value(&items), 200.0);
        assert_eq!(total_quantity(&items), 2);
        assert!(is_item_in_cart(&items, "1"));
        assert!(!is_item_in_cart(&items, "3"));
    }
}
