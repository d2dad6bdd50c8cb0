use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::watch;

use crate::model::{CartEntry, CartItem, Product};
use crate::reconcile::{self, CartSummary};

#[derive(Default)]
struct SessionState {
    catalog: Option<Arc<Vec<Product>>>,
    displayed: Arc<Vec<Product>>,
    entries: Vec<CartEntry>,
    items: Arc<Vec<CartItem>>,
    cart_seq: u64,
}

impl SessionState {
    fn catalog_slice(&self) -> &[Product] {
        self.catalog.as_deref().map(Vec::as_slice).unwrap_or(&[])
    }

    fn rederive_items(&mut self) {
        self.items = Arc::new(reconcile::reconcile(&self.entries, self.catalog_slice()));
    }
}

/// Single owner of the session's catalog and cart state.
///
/// Cloning yields another handle to the same state. Every write goes through
/// one of the named operations below, is serialised on one lock, and bumps
/// the revision published by [`SessionStore::changes`].
///
/// Cart items are never written directly: they are re-derived from the raw
/// entries and the catalog whenever either changes.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<RwLock<SessionState>>,
    revision: Arc<watch::Sender<u64>>,
}

impl SessionStore {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            state: Arc::new(RwLock::new(SessionState::default())),
            revision: Arc::new(revision),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    // ── Catalog ────────────────────────────────────────────────────────

    /// Install the full catalog. Only the first call has any effect; the
    /// catalog is fixed for the rest of the session.
    ///
    /// Also resets the displayed view to the full catalog and re-derives the
    /// cart, in case the cart arrived first. Returns the session's catalog.
    pub fn install_catalog(&self, products: Vec<Product>) -> Arc<Vec<Product>> {
        let installed = {
            let mut state = self.write();
            if let Some(existing) = &state.catalog {
                return Arc::clone(existing);
            }
            let products = Arc::new(products);
            state.displayed = Arc::clone(&products);
            state.catalog = Some(Arc::clone(&products));
            state.rederive_items();
            products
        };
        self.bump();
        installed
    }

    /// The full catalog, or `None` before it was loaded.
    pub fn catalog(&self) -> Option<Arc<Vec<Product>>> {
        self.read().catalog.clone()
    }

    pub fn is_catalog_loaded(&self) -> bool {
        self.read().catalog.is_some()
    }

    // ── Displayed (filtered) view ──────────────────────────────────────

    /// Products currently shown in the product grid.
    pub fn displayed(&self) -> Arc<Vec<Product>> {
        Arc::clone(&self.read().displayed)
    }

    /// Replace the displayed products with a search result.
    pub fn show_products(&self, products: Vec<Product>) {
        self.write().displayed = Arc::new(products);
        self.bump();
    }

    /// Show the full, unfiltered catalog again.
    pub fn show_full_catalog(&self) {
        {
            let mut state = self.write();
            state.displayed = state.catalog.clone().unwrap_or_default();
        }
        self.bump();
    }

    // ── Cart ───────────────────────────────────────────────────────────

    /// Replace the raw cart with what the service returned and re-derive
    /// the cart items against the current catalog.
    pub fn apply_cart(&self, entries: Vec<CartEntry>) -> Arc<Vec<CartItem>> {
        let items = {
            let mut state = self.write();
            state.entries = entries;
            state.rederive_items();
            Arc::clone(&state.items)
        };
        tracing::debug!(items = items.len(), "Cart reconciled");
        self.bump();
        items
    }

    /// Like [`apply_cart`](Self::apply_cart), for a response to the request
    /// numbered `seq`. A response older than the last one applied is
    /// dropped and `None` is returned.
    pub fn apply_cart_in_order(
        &self,
        seq: u64,
        entries: Vec<CartEntry>,
    ) -> Option<Arc<Vec<CartItem>>> {
        let items = {
            let mut state = self.write();
            if seq <= state.cart_seq {
                tracing::debug!(seq, applied = state.cart_seq, "Stale cart response dropped");
                return None;
            }
            state.cart_seq = seq;
            state.entries = entries;
            state.rederive_items();
            Arc::clone(&state.items)
        };
        tracing::debug!(seq, items = items.len(), "Cart reconciled");
        self.bump();
        Some(items)
    }

    /// Raw entries as last returned by the service, unknown products included.
    pub fn cart_entries(&self) -> Vec<CartEntry> {
        self.read().entries.clone()
    }

    pub fn cart_items(&self) -> Arc<Vec<CartItem>> {
        Arc::clone(&self.read().items)
    }

    pub fn cart_summary(&self) -> CartSummary {
        CartSummary::from_items(&self.read().items)
    }

    // ── Change notification ────────────────────────────────────────────

    /// Current revision; increases by one on every write.
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Receiver that is notified whenever the state changes.
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
