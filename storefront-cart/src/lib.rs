//! Cart mutations under the storefront's authentication and duplicate
//! policies.
//!
//! Every successful mutation hands the service's updated entry list to the
//! [`SessionStore`], which re-derives the cart items against the catalog.
//! Failed mutations leave the store as it was. Requests are numbered when
//! issued, and a reply older than one already applied is not shown.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use storefront_core::{
    is_item_in_cart, AuthToken, CartEntry, CartItem, CartSummary, SessionStore, StorefrontApi,
    StorefrontError,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Options for [`CartService::add_or_update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddOptions {
    /// Refuse to touch a product that is already in the cart.
    pub prevent_duplicate: bool,
}

impl AddOptions {
    pub fn prevent_duplicate() -> Self {
        Self {
            prevent_duplicate: true,
        }
    }

    pub fn allow_duplicate() -> Self {
        Self {
            prevent_duplicate: false,
        }
    }
}

/// One click on the cart's quantity stepper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityStep {
    Increment,
    Decrement,
}

/// Orchestrates cart loading and mutation.
///
/// Mutations of the same product are serialised: a second request for a
/// product waits until the first has been answered and applied. Mutations of
/// different products run concurrently.
#[derive(Clone)]
pub struct CartService {
    api: Arc<dyn StorefrontApi>,
    store: SessionStore,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    issued: Arc<AtomicU64>,
}

impl CartService {
    pub fn new(api: Arc<dyn StorefrontApi>, store: SessionStore) -> Self {
        Self {
            api,
            store,
            locks: Arc::new(DashMap::new()),
            issued: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Current cart items, reconciled against the catalog.
    pub fn items(&self) -> Arc<Vec<CartItem>> {
        self.store.cart_items()
    }

    pub fn summary(&self) -> CartSummary {
        self.store.cart_summary()
    }

    /// Fetch the user's cart and reconcile it.
    ///
    /// Without a token the cart is empty and no request is made.
    pub async fn load_cart(
        &self,
        token: Option<&AuthToken>,
    ) -> Result<Arc<Vec<CartItem>>, StorefrontError> {
        let seq = self.next_seq();
        let Some(token) = token else {
            tracing::debug!("No token, cart is empty");
            return Ok(self.apply(seq, Vec::new()));
        };

        match self.api.fetch_cart(token).await {
            Ok(entries) => {
                let items = self.apply(seq, entries);
                tracing::info!(seq, items = items.len(), "Cart loaded");
                Ok(items)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Cart load failed");
                Err(err)
            }
        }
    }

    /// Set `product_id` to the absolute quantity `qty`.
    ///
    /// Refuses without a request when there is no token, or when
    /// `options.prevent_duplicate` is set and the product is already among
    /// `current`. Otherwise returns the service's updated entry list, which
    /// has also been applied to the store.
    pub async fn add_or_update(
        &self,
        token: Option<&AuthToken>,
        current: &[CartItem],
        product_id: &str,
        qty: u32,
        options: AddOptions,
    ) -> Result<Vec<CartEntry>, StorefrontError> {
        let token = token.ok_or(StorefrontError::AuthRequired)?;
        if options.prevent_duplicate && is_item_in_cart(current, product_id) {
            tracing::debug!(product_id, "Duplicate add refused");
            return Err(StorefrontError::DuplicateItem(product_id.to_string()));
        }

        let guard = self.lock_product(product_id).await;
        let result = self.upsert(token, CartEntry::new(product_id, qty)).await;
        self.release(product_id, guard);
        result
    }

    /// Add a product from the catalog. Products already in the cart are
    /// refused; their quantity is changed with the stepper instead.
    pub async fn add_to_cart(
        &self,
        token: Option<&AuthToken>,
        product_id: &str,
        qty: u32,
    ) -> Result<Vec<CartEntry>, StorefrontError> {
        let current = self.store.cart_items();
        self.add_or_update(token, &current, product_id, qty, AddOptions::prevent_duplicate())
            .await
    }

    /// Move the quantity of a product already in the cart by one.
    ///
    /// Decrementing from 1 requests quantity 0 and leaves removal to the
    /// service.
    pub async fn adjust_quantity(
        &self,
        token: Option<&AuthToken>,
        product_id: &str,
        step: QuantityStep,
    ) -> Result<Vec<CartEntry>, StorefrontError> {
        let token = token.ok_or(StorefrontError::AuthRequired)?;

        // The current quantity is read under the product lock, so queued
        // steps build on each other.
        let guard = self.lock_product(product_id).await;
        let current = self
            .store
            .cart_items()
            .iter()
            .find(|item| item.id() == product_id)
            .map(CartItem::qty);

        let result = match current {
            None => Err(StorefrontError::NotInCart(product_id.to_string())),
            Some(qty) => {
                let qty = match step {
                    QuantityStep::Increment => qty.saturating_add(1),
                    QuantityStep::Decrement => qty.saturating_sub(1),
                };
                self.upsert(token, CartEntry::new(product_id, qty)).await
            }
        };
        self.release(product_id, guard);
        result
    }

    async fn upsert(
        &self,
        token: &AuthToken,
        entry: CartEntry,
    ) -> Result<Vec<CartEntry>, StorefrontError> {
        let seq = self.next_seq();
        tracing::debug!(seq, product_id = %entry.product_id, qty = entry.qty, "Updating cart");
        match self.api.upsert_cart_entry(token, &entry).await {
            Ok(entries) => {
                let items = self.apply(seq, entries.clone());
                tracing::info!(
                    seq,
                    product_id = %entry.product_id,
                    qty = entry.qty,
                    items = items.len(),
                    "Cart updated"
                );
                Ok(entries)
            }
            Err(err) => {
                tracing::warn!(product_id = %entry.product_id, error = %err, "Cart update failed");
                Err(err)
            }
        }
    }

    fn next_seq(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Apply the reply to request `seq`, or keep the newer cart already
    /// shown.
    fn apply(&self, seq: u64, entries: Vec<CartEntry>) -> Arc<Vec<CartItem>> {
        self.store
            .apply_cart_in_order(seq, entries)
            .unwrap_or_else(|| self.store.cart_items())
    }

    async fn lock_product(&self, product_id: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(product_id.to_string())
            .or_default()
            .clone();
        lock.lock_owned().await
    }

    fn release(&self, product_id: &str, guard: OwnedMutexGuard<()>) {
        drop(guard);
        // Forget the lock once nobody else holds or waits on it.
        self.locks
            .remove_if(product_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
