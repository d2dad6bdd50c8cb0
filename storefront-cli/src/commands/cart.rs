use colored::Colorize;
use storefront::storefront_cart::QuantityStep;
use storefront::{Storefront, StorefrontError};

use super::render;

async fn load(shop: &Storefront) -> Result<(), StorefrontError> {
    shop.catalog().load().await?;
    shop.cart().load_cart(shop.token()).await?;
    Ok(())
}

fn current_cart(shop: &Storefront) -> String {
    render::cart_table(&shop.store().cart_items(), &shop.store().cart_summary())
}

/// `storefront cart`
pub async fn show(shop: &Storefront) -> Result<String, StorefrontError> {
    load(shop).await?;
    Ok(current_cart(shop))
}

/// `storefront add <product-id> [--qty N]`
pub async fn add(shop: &Storefront, product_id: &str, qty: u32) -> Result<String, StorefrontError> {
    load(shop).await?;
    shop.cart().add_to_cart(shop.token(), product_id, qty).await?;
    Ok(format!(
        "{}\n{}",
        "Item added to cart".green(),
        current_cart(shop)
    ))
}

/// `storefront inc <product-id>` and `storefront dec <product-id>`
pub async fn step(
    shop: &Storefront,
    product_id: &str,
    step: QuantityStep,
) -> Result<String, StorefrontError> {
    load(shop).await?;
    shop.cart()
        .adjust_quantity(shop.token(), product_id, step)
        .await?;
    Ok(current_cart(shop))
}

/// `storefront checkout`
pub async fn checkout(shop: &Storefront) -> Result<String, StorefrontError> {
    load(shop).await?;
    let summary = shop.store().cart_summary();
    Ok(format!(
        "{}\n{}",
        render::cart_table(&shop.store().cart_items(), &summary),
        render::order_details(&summary)
    ))
}
