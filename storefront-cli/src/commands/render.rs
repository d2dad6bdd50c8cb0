use colored::Colorize;
use storefront::{CartItem, CartSummary, Product};

pub fn price(amount: f64) -> String {
    format!("${amount}")
}

/// One product per line: id, name, category, cost and rating.
pub fn product_table(products: &[Product]) -> String {
    if products.is_empty() {
        return "No products found".to_string();
    }
    let width = products.iter().map(|p| p.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for product in products {
        out.push_str(&format!(
            "{}  {:<width$}  {:<16}  {:>8}  {}\n",
            product.id.dimmed(),
            product.name,
            product.category,
            price(product.cost),
            stars(product.rating),
        ));
    }
    out
}

/// Cart lines with quantity and line total, followed by the cart totals.
pub fn cart_table(items: &[CartItem], summary: &CartSummary) -> String {
    if items.is_empty() {
        return "Cart is empty. Add more items to the cart to checkout".to_string();
    }
    let mut out = String::new();
    for item in items {
        out.push_str(&format!(
            "{}  {}  x{}  {}\n",
            item.id().dimmed(),
            item.product().name,
            item.qty(),
            price(item.line_total()),
        ));
    }
    out.push_str(&format!(
        "{} {}\n",
        "Total:".bold(),
        price(summary.subtotal)
    ));
    out
}

/// The checkout page's order details.
pub fn order_details(summary: &CartSummary) -> String {
    format!(
        "{}\nProducts  {}\nSubtotal  {}\nShipping  {}\n{}     {}\n",
        "Order Details".bold(),
        summary.products,
        price(summary.subtotal),
        price(summary.shipping),
        "Total".bold(),
        price(summary.total),
    )
}

fn stars(rating: f64) -> String {
    let filled = rating.round().clamp(0.0, 5.0) as usize;
    format!("{}{}", "*".repeat(filled), ".".repeat(5 - filled))
}
