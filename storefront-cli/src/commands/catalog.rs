use storefront::storefront_search::SearchEvent;
use storefront::{Storefront, StorefrontError};
use tokio::sync::mpsc::UnboundedReceiver;

use super::render;

/// `storefront products`
pub async fn products(shop: &Storefront) -> Result<String, StorefrontError> {
    let products = shop.catalog().load().await?;
    Ok(render::product_table(&products))
}

/// `storefront search <text>`
///
/// Feeds `text` to the search controller as a single keystroke and waits for
/// the debounced search to settle.
pub async fn search(
    shop: &Storefront,
    events: &mut UnboundedReceiver<SearchEvent>,
    text: &str,
) -> Result<String, StorefrontError> {
    shop.catalog().load().await?;
    shop.search().on_input_changed(text);

    while let Some(event) = events.recv().await {
        match event {
            SearchEvent::Applied { .. } | SearchEvent::NoMatches { .. } => {
                return Ok(render::product_table(&shop.store().displayed()));
            }
            SearchEvent::Failed { error, .. } => return Err(error),
            SearchEvent::Discarded { .. } => continue,
        }
    }
    Err(StorefrontError::NetworkFailure(
        "search stopped before answering".into(),
    ))
}
