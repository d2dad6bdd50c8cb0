//! Debounced catalog search.
//!
//! [`SearchController`] turns a stream of keystrokes into at most one search
//! request per pause in typing, and applies responses in the order the
//! requests were issued. Results land in the [`SessionStore`]'s displayed
//! view; the full catalog and the cart are never touched.
//!
//! ```ignore
//! let (search, mut events) = SearchController::new(api, store, SearchConfig::default());
//! search.on_input_changed("app");
//! while let Some(event) = events.recv().await {
//!     // re-render, show a toast on SearchEvent::Failed, ...
//! }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use storefront_core::{SearchConfig, SessionStore, StorefrontApi, StorefrontError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Where the controller stands with respect to the debounce timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    /// A timer is armed; its search has not been dispatched yet.
    PendingSearch,
}

/// Outcome of one dispatched search, in issue order.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    /// The displayed view now holds `count` results for `text`.
    Applied { seq: u64, text: String, count: usize },
    /// The service found nothing; the displayed view is empty.
    NoMatches { seq: u64, text: String },
    /// The search failed. On a server failure the full catalog is shown again.
    Failed { seq: u64, error: StorefrontError },
    /// A newer search was issued before this one answered; its response was dropped.
    Discarded { seq: u64 },
}

struct Inner {
    api: Arc<dyn StorefrontApi>,
    store: SessionStore,
    debounce: Duration,
    shutdown: CancellationToken,
    // The armed timer, if any. Also serialises sequence checks with store writes.
    timer: Mutex<Option<CancellationToken>>,
    issued: AtomicU64,
    events: mpsc::UnboundedSender<SearchEvent>,
}

impl Inner {
    fn timer(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: SearchEvent) {
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }

    async fn dispatch(&self, text: String, armed: CancellationToken) {
        let seq = {
            let mut timer = self.timer();
            if armed.is_cancelled() {
                return;
            }
            *timer = None;
            self.issued.fetch_add(1, Ordering::SeqCst) + 1
        };
        tracing::debug!(seq, text = %text, "Search dispatched");

        let result = tokio::select! {
            _ = self.shutdown.cancelled() => {
                tracing::debug!(seq, "Search abandoned on shutdown");
                return;
            }
            result = self.api.search_products(&text) => result,
        };

        let _guard = self.timer();
        if self.shutdown.is_cancelled() {
            return;
        }
        if seq != self.issued.load(Ordering::SeqCst) {
            tracing::debug!(seq, "Stale search response discarded");
            self.emit(SearchEvent::Discarded { seq });
            return;
        }

        match result {
            Ok(products) => {
                let count = products.len();
                self.store.show_products(products);
                tracing::debug!(seq, count, "Search results applied");
                self.emit(SearchEvent::Applied { seq, text, count });
            }
            Err(StorefrontError::NotFound) => {
                self.store.show_products(Vec::new());
                self.emit(SearchEvent::NoMatches { seq, text });
            }
            Err(error @ StorefrontError::ServerFailure { .. }) => {
                tracing::warn!(seq, error = %error, "Search failed, showing full catalog");
                self.store.show_full_catalog();
                self.emit(SearchEvent::Failed { seq, error });
            }
            Err(error) => {
                tracing::warn!(seq, error = %error, "Search failed");
                self.emit(SearchEvent::Failed { seq, error });
            }
        }
    }
}

/// Debounces search input and keeps the displayed view in issue order.
///
/// At most one debounce timer is armed at a time: every call to
/// [`on_input_changed`](Self::on_input_changed) cancels the previous timer
/// and arms a new one under the same lock. Each dispatched search takes the
/// next sequence number, and a response is applied only if no newer search
/// has been issued since.
///
/// Dropping the controller (or calling [`shutdown`](Self::shutdown))
/// cancels the pending timer and abandons in-flight requests, so nothing
/// writes to the store after teardown.
pub struct SearchController {
    inner: Arc<Inner>,
}

impl SearchController {
    /// Create a controller and the receiver for its [`SearchEvent`]s.
    pub fn new(
        api: Arc<dyn StorefrontApi>,
        store: SessionStore,
        config: SearchConfig,
    ) -> (Self, mpsc::UnboundedReceiver<SearchEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let inner = Inner {
            api,
            store,
            debounce: config.debounce,
            shutdown: CancellationToken::new(),
            timer: Mutex::new(None),
            issued: AtomicU64::new(0),
            events,
        };
        (
            Self {
                inner: Arc::new(inner),
            },
            rx,
        )
    }

    /// Record a change of the search text. Must be called within a Tokio runtime.
    pub fn on_input_changed(&self, text: impl Into<String>) {
        let text = text.into();
        if self.inner.shutdown.is_cancelled() {
            return;
        }

        let armed = self.inner.shutdown.child_token();
        if let Some(previous) = self.inner.timer().replace(armed.clone()) {
            previous.cancel();
        }

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let fired = tokio::select! {
                _ = armed.cancelled() => false,
                _ = tokio::time::sleep(inner.debounce) => true,
            };
            if fired {
                inner.dispatch(text, armed).await;
            }
        });
    }

    pub fn state(&self) -> SearchState {
        match self.inner.timer().as_ref() {
            Some(_) => SearchState::PendingSearch,
            None => SearchState::Idle,
        }
    }

    /// Sequence number of the most recently dispatched search (0 before any).
    pub fn last_issued(&self) -> u64 {
        self.inner.issued.load(Ordering::SeqCst)
    }

    /// Cancel the pending timer and abandon in-flight searches. Later input
    /// is ignored.
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
        self.inner.timer().take();
        tracing::debug!("Search controller shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.inner.shutdown.cancel();
    }
}
