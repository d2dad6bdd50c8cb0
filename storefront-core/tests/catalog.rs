use std::sync::Arc;

use storefront_core::{CartEntry, ProductCatalog, SessionStore, StorefrontError};
use storefront_test::{product, sample_catalog, ApiCall, RecordingApi};

fn catalog(api: &RecordingApi) -> ProductCatalog {
    ProductCatalog::new(Arc::new(api.clone()), SessionStore::new())
}

#[tokio::test]
async fn load_seeds_catalog_and_displayed_view() {
    let api = RecordingApi::with_catalog(sample_catalog());
    let catalog = catalog(&api);

    let products = catalog.load().await.unwrap();

    assert_eq!(products.len(), 5);
    assert_eq!(catalog.displayed(), products);
    assert!(catalog.store().is_catalog_loaded());
}

#[tokio::test]
async fn second_load_is_served_from_the_store() {
    let api = RecordingApi::with_catalog(sample_catalog());
    let catalog = catalog(&api);

    catalog.load().await.unwrap();
    catalog.load().await.unwrap();

    assert_eq!(api.calls(), vec![ApiCall::ListProducts]);
}

#[tokio::test]
async fn failed_load_leaves_store_empty_and_can_be_retried() {
    let api = RecordingApi::with_catalog(sample_catalog());
    api.fail_products(StorefrontError::ServerFailure {
        status: 500,
        message: "Database unavailable".into(),
    });
    let catalog = catalog(&api);

    let err = catalog.load().await.unwrap_err();
    assert_eq!(err.user_message(), "Database unavailable");
    assert!(catalog.products().is_empty());
    assert!(!catalog.store().is_catalog_loaded());
    assert_eq!(catalog.store().revision(), 0);
}

#[tokio::test]
async fn not_found_is_an_error_for_the_catalog() {
    let api = RecordingApi::new();
    api.fail_products(StorefrontError::NotFound);

    let err = catalog(&api).load().await.unwrap_err();
    assert!(matches!(err, StorefrontError::Rejected { status: 404, .. }));
}

#[tokio::test]
async fn cart_fetched_before_catalog_reconciles_on_load() {
    let api = RecordingApi::with_catalog(vec![product("1", 100.0), product("2", 50.0)]);
    let catalog = catalog(&api);
    catalog
        .store()
        .apply_cart(vec![CartEntry::new("1", 2), CartEntry::new("3", 1)]);
    assert!(catalog.store().cart_items().is_empty());

    catalog.load().await.unwrap();

    let summary = catalog.store().cart_summary();
    assert_eq!(summary.products, 2);
    assert_eq!(summary.total, 200.0);
}
