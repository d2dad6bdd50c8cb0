use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use storefront_core::{
    ApiFuture, AuthToken, CartEntry, Product, RegisterRequest, StorefrontApi, StorefrontError,
};

/// One call made against a [`RecordingApi`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    ListProducts,
    Search(String),
    FetchCart,
    Upsert(CartEntry),
    Register(String),
}

#[derive(Clone)]
struct ScriptedSearch {
    delay: Duration,
    result: Result<Vec<Product>, StorefrontError>,
}

#[derive(Default)]
struct Inner {
    catalog: Vec<Product>,
    list_failure: Option<StorefrontError>,
    searches: HashMap<String, ScriptedSearch>,
    cart: Vec<CartEntry>,
    cart_failure: Option<StorefrontError>,
    upsert_delay: Duration,
    product_delays: HashMap<String, Duration>,
    register_failure: Option<StorefrontError>,
    calls: Vec<ApiCall>,
    in_flight: HashMap<String, usize>,
    max_in_flight: usize,
}

/// In-memory [`StorefrontApi`] that records every call.
///
/// By default it behaves like a well-formed service over the configured
/// catalog: search matches name or category case-insensitively and answers
/// `NotFound` when nothing matches, and cart upserts edit a single in-memory
/// cart (quantity zero removes the entry). Individual responses can be
/// scripted to fail or to take time.
///
/// Clones share state, so a test can keep one handle for assertions while
/// the engine owns another.
#[derive(Clone, Default)]
pub struct RecordingApi {
    inner: Arc<Mutex<Inner>>,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(catalog: Vec<Product>) -> Self {
        let api = Self::new();
        api.lock().catalog = catalog;
        api
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: ApiCall) {
        self.lock().calls.push(call);
    }

    // ── Scripting ──────────────────────────────────────────────────────

    /// Make `list_products` fail with `error`.
    pub fn fail_products(&self, error: StorefrontError) -> &Self {
        self.lock().list_failure = Some(error);
        self
    }

    /// Answer searches for `text` with `result`.
    pub fn on_search(&self, text: &str, result: Result<Vec<Product>, StorefrontError>) -> &Self {
        self.on_search_delayed(text, Duration::ZERO, result)
    }

    /// Answer searches for `text` with `result` after `delay`.
    pub fn on_search_delayed(
        &self,
        text: &str,
        delay: Duration,
        result: Result<Vec<Product>, StorefrontError>,
    ) -> &Self {
        self.lock()
            .searches
            .insert(text.to_string(), ScriptedSearch { delay, result });
        self
    }

    /// Seed the server-side cart.
    pub fn set_cart(&self, entries: Vec<CartEntry>) -> &Self {
        self.lock().cart = entries;
        self
    }

    /// Make `fetch_cart` and `upsert_cart_entry` fail with `error`.
    pub fn fail_cart(&self, error: StorefrontError) -> &Self {
        self.lock().cart_failure = Some(error);
        self
    }

    /// Delay every upsert by `delay`.
    pub fn delay_upserts(&self, delay: Duration) -> &Self {
        self.lock().upsert_delay = delay;
        self
    }

    /// Delay upserts of `product_id` by `delay`, overriding
    /// [`delay_upserts`](Self::delay_upserts) for that product.
    pub fn delay_upserts_of(&self, product_id: &str, delay: Duration) -> &Self {
        self.lock()
            .product_delays
            .insert(product_id.to_string(), delay);
        self
    }

    pub fn fail_register(&self, error: StorefrontError) -> &Self {
        self.lock().register_failure = Some(error);
        self
    }

    // ── Assertions ─────────────────────────────────────────────────────

    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    /// Total number of calls of any kind.
    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Texts of every search, in dispatch order.
    pub fn search_calls(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                ApiCall::Search(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn upsert_calls(&self) -> Vec<CartEntry> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                ApiCall::Upsert(entry) => Some(entry.clone()),
                _ => None,
            })
            .collect()
    }

    /// The server-side cart as it stands.
    pub fn cart(&self) -> Vec<CartEntry> {
        self.lock().cart.clone()
    }

    /// Highest number of upserts ever in flight at once for a single product.
    pub fn max_concurrent_upserts(&self) -> usize {
        self.lock().max_in_flight
    }

    fn default_search(&self, text: &str) -> Result<Vec<Product>, StorefrontError> {
        let needle = text.to_lowercase();
        let found: Vec<Product> = self
            .lock()
            .catalog
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.category.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        if found.is_empty() {
            Err(StorefrontError::NotFound)
        } else {
            Ok(found)
        }
    }
}

impl StorefrontApi for RecordingApi {
    fn list_products(&self) -> ApiFuture<'_, Vec<Product>> {
        Box::pin(async move {
            self.record(ApiCall::ListProducts);
            let inner = self.lock();
            match &inner.list_failure {
                Some(err) => Err(err.clone()),
                None => Ok(inner.catalog.clone()),
            }
        })
    }

    fn search_products<'a>(&'a self, text: &'a str) -> ApiFuture<'a, Vec<Product>> {
        Box::pin(async move {
            self.record(ApiCall::Search(text.to_string()));
            let scripted = self.lock().searches.get(text).cloned();
            match scripted {
                Some(script) => {
                    if !script.delay.is_zero() {
                        tokio::time::sleep(script.delay).await;
                    }
                    script.result
                }
                None => self.default_search(text),
            }
        })
    }

    fn fetch_cart<'a>(&'a self, _token: &'a AuthToken) -> ApiFuture<'a, Vec<CartEntry>> {
        Box::pin(async move {
            self.record(ApiCall::FetchCart);
            let inner = self.lock();
            match &inner.cart_failure {
                Some(err) => Err(err.clone()),
                None => Ok(inner.cart.clone()),
            }
        })
    }

    fn upsert_cart_entry<'a>(
        &'a self,
        _token: &'a AuthToken,
        entry: &'a CartEntry,
    ) -> ApiFuture<'a, Vec<CartEntry>> {
        Box::pin(async move {
            self.record(ApiCall::Upsert(entry.clone()));
            // The cart is edited on receipt; only the reply is delayed.
            let (reply, delay) = {
                let mut inner = self.lock();
                if let Some(err) = &inner.cart_failure {
                    return Err(err.clone());
                }
                let position = inner
                    .cart
                    .iter()
                    .position(|e| e.product_id == entry.product_id);
                match (position, entry.qty) {
                    (Some(i), 0) => {
                        inner.cart.remove(i);
                    }
                    (Some(i), qty) => inner.cart[i].qty = qty,
                    (None, 0) => {}
                    (None, _) => inner.cart.push(entry.clone()),
                }

                let now = {
                    let count = inner.in_flight.entry(entry.product_id.clone()).or_insert(0);
                    *count += 1;
                    *count
                };
                inner.max_in_flight = inner.max_in_flight.max(now);
                let delay = inner
                    .product_delays
                    .get(&entry.product_id)
                    .copied()
                    .unwrap_or(inner.upsert_delay);
                (inner.cart.clone(), delay)
            };

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            if let Some(count) = self.lock().in_flight.get_mut(&entry.product_id) {
                *count -= 1;
            }
            Ok(reply)
        })
    }

    fn register<'a>(&'a self, request: &'a RegisterRequest) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            self.record(ApiCall::Register(request.username.clone()));
            match &self.lock().register_failure {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        })
    }
}
