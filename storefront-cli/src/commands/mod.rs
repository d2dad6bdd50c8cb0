//! Command implementations for the `storefront` CLI.

/// Catalog browsing: `storefront products`, `storefront search <text>`.
pub mod catalog;

/// Cart commands: `cart`, `add`, `inc`, `dec`, `checkout`.
///
/// Cart mutations need `storefront.token` to be configured.
pub mod cart;

/// Account creation: `storefront register`.
pub mod register;

/// Plain-text tables for products, cart lines and totals.
pub mod render;

use storefront::StorefrontError;

/// Message printed for a failed command.
pub fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    match err.downcast_ref::<StorefrontError>() {
        Some(err) => err.user_message(),
        None => err.to_string(),
    }
}
