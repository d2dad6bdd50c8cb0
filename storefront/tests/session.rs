use std::sync::Arc;
use std::time::Duration;

use storefront::prelude::*;
use storefront::ConfigValue;
use storefront_test::{sample_catalog, ApiCall, FakeBackend, RecordingApi};

const BASKETBALL: &str = "KCRwjF7lN97HnEaY";

fn config_with_token(token: Option<&str>) -> StorefrontConfig {
    let mut config = StorefrontConfig::empty();
    if let Some(token) = token {
        config.set("storefront.token", ConfigValue::String(token.into()));
    }
    config
}

#[tokio::test]
async fn start_loads_catalog_then_cart() {
    let api = RecordingApi::with_catalog(sample_catalog());
    api.set_cart(vec![CartEntry::new(BASKETBALL, 2)]);
    let (shop, _events) =
        Storefront::with_api(Arc::new(api.clone()), &config_with_token(Some("abc"))).unwrap();

    shop.start().await.unwrap();

    assert_eq!(api.calls(), vec![ApiCall::ListProducts, ApiCall::FetchCart]);
    assert_eq!(shop.catalog().products().len(), 5);
    assert_eq!(shop.store().cart_summary().total, 100.0);
}

#[tokio::test]
async fn start_without_token_skips_cart() {
    let api = RecordingApi::with_catalog(sample_catalog());
    let (shop, _events) =
        Storefront::with_api(Arc::new(api.clone()), &config_with_token(None)).unwrap();

    shop.start().await.unwrap();

    assert_eq!(api.calls(), vec![ApiCall::ListProducts]);
    assert!(shop.token().is_none());
    let err = shop
        .cart()
        .add_to_cart(shop.token(), BASKETBALL, 1)
        .await
        .unwrap_err();
    assert_eq!(err, StorefrontError::AuthRequired);
}

#[tokio::test]
async fn catalog_failure_aborts_start() {
    let api = RecordingApi::with_catalog(sample_catalog());
    api.fail_products(StorefrontError::NetworkFailure("refused".into()));
    let (shop, _events) =
        Storefront::with_api(Arc::new(api.clone()), &config_with_token(Some("abc"))).unwrap();

    let err = shop.start().await.unwrap_err();
    assert_eq!(err.user_message(), storefront::CONNECTIVITY_MESSAGE);
    assert_eq!(api.calls(), vec![ApiCall::ListProducts]);
}

#[tokio::test]
async fn bad_config_is_a_setup_error() {
    let mut config = StorefrontConfig::empty();
    config.set("storefront.search.debounce.ms", ConfigValue::String("soon".into()));

    let result = Storefront::with_api(Arc::new(RecordingApi::new()), &config);
    assert!(matches!(result, Err(SetupError::Config(_))));
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_search() {
    let api = RecordingApi::with_catalog(sample_catalog());
    let (shop, mut events) =
        Storefront::with_api(Arc::new(api.clone()), &config_with_token(None)).unwrap();
    shop.start().await.unwrap();

    shop.search().on_input_changed("sports");
    shop.shutdown();
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert!(api.search_calls().is_empty());
    assert!(events.try_recv().is_err());
    assert_eq!(shop.store().displayed().len(), 5);
}

#[tokio::test]
async fn end_to_end_over_http() {
    let backend = FakeBackend::new(sample_catalog());
    backend.set_cart("alice", vec![CartEntry::new(BASKETBALL, 1)]);
    let running = backend.serve().await.unwrap();

    let mut config = config_with_token(Some("alice"));
    config.set("storefront.endpoint", ConfigValue::String(running.endpoint()));
    let (shop, _events) = Storefront::connect(&config).unwrap();
    shop.start().await.unwrap();

    shop.cart()
        .adjust_quantity(shop.token(), BASKETBALL, QuantityStep::Increment)
        .await
        .unwrap();

    assert_eq!(backend.cart("alice"), vec![CartEntry::new(BASKETBALL, 2)]);
    let summary = shop.store().cart_summary();
    assert_eq!(summary.subtotal, 100.0);
    assert_eq!(summary.products, 2);
}
