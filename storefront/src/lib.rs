//! Storefront engine: catalog, debounced search and a policy-checked cart
//! over a remote storefront service.
//!
//! This facade re-exports the sub-crates and wires them into a [`Storefront`]
//! session:
//!
//! ```ignore
//! use storefront::prelude::*;
//!
//! let config = StorefrontConfig::load("dev")?;
//! init_tracing(&config.section::<LogConfig>()?);
//! let (mut shop, mut search_events) = Storefront::connect(&config)?;
//! shop.start().await?;
//! shop.search().on_input_changed("apple");
//! ```
//!
//! # Feature flags
//!
//! | Feature | Default | Crate               |
//! |---------|---------|---------------------|
//! | `http`  | **yes** | `storefront-client` |

use std::sync::Arc;

pub use storefront_cart;
pub use storefront_core;
pub use storefront_core::*;
pub use storefront_search;

#[cfg(feature = "http")]
pub use storefront_client;

use storefront_cart::CartService;
use storefront_search::{SearchController, SearchEvent};
use tokio::sync::mpsc;

/// Everything needed to drive a storefront session.
pub mod prelude {
    pub use crate::{SetupError, Storefront};
    pub use storefront_cart::{AddOptions, CartService, QuantityStep};
    pub use storefront_core::{
        init_tracing, AuthToken, CartEntry, CartItem, CartSummary, ClientConfig, ConfigSection,
        LogConfig, Product, ProductCatalog, Registration, RegistrationForm, SearchConfig,
        SessionConfig, SessionStore, StorefrontApi, StorefrontConfig, StorefrontError,
    };
    pub use storefront_search::{SearchController, SearchEvent, SearchState};

    #[cfg(feature = "http")]
    pub use storefront_client::HttpStorefrontApi;
}

/// A storefront session: one store shared by the catalog, search controller,
/// cart service and registration form.
pub struct Storefront {
    api: Arc<dyn StorefrontApi>,
    store: SessionStore,
    catalog: ProductCatalog,
    search: SearchController,
    cart: CartService,
    registration: Registration,
    token: Option<AuthToken>,
}

impl Storefront {
    /// Build a session talking HTTP to the configured endpoint.
    #[cfg(feature = "http")]
    pub fn connect(
        config: &StorefrontConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SearchEvent>), SetupError> {
        let client = config.section::<ClientConfig>()?;
        let api = storefront_client::HttpStorefrontApi::new(&client)?;
        tracing::debug!(endpoint = %client.endpoint, "Storefront client ready");
        Self::with_api(Arc::new(api), config)
    }

    /// Build a session over any [`StorefrontApi`] implementation.
    pub fn with_api(
        api: Arc<dyn StorefrontApi>,
        config: &StorefrontConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SearchEvent>), SetupError> {
        let search_config = config.section::<SearchConfig>()?;
        let session = config.section::<SessionConfig>()?;

        let store = SessionStore::new();
        let (search, events) =
            SearchController::new(Arc::clone(&api), store.clone(), search_config);
        let shop = Self {
            catalog: ProductCatalog::new(Arc::clone(&api), store.clone()),
            cart: CartService::new(Arc::clone(&api), store.clone()),
            registration: Registration::new(Arc::clone(&api)),
            token: AuthToken::from_optional(session.token),
            api,
            store,
            search,
        };
        Ok((shop, events))
    }

    /// Load the catalog, then the cart when a token is set.
    pub async fn start(&self) -> Result<(), StorefrontError> {
        self.catalog.load().await?;
        if self.token.is_some() {
            self.cart.load_cart(self.token.as_ref()).await?;
        }
        tracing::info!(
            products = self.catalog.products().len(),
            cart_items = self.store.cart_items().len(),
            logged_in = self.token.is_some(),
            "Storefront started"
        );
        Ok(())
    }

    /// Stop the search controller. Pending and in-flight searches are dropped.
    pub fn shutdown(&self) {
        self.search.shutdown();
        tracing::info!("Storefront shut down");
    }

    pub fn api(&self) -> &Arc<dyn StorefrontApi> {
        &self.api
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    pub fn search(&self) -> &SearchController {
        &self.search
    }

    pub fn cart(&self) -> &CartService {
        &self.cart
    }

    pub fn registration(&self) -> &Registration {
        &self.registration
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    /// Log in (or out, with `None`) for subsequent cart operations.
    pub fn set_token(&mut self, token: Option<AuthToken>) {
        self.token = token;
    }
}

/// Failure to assemble a [`Storefront`] session.
#[derive(Debug)]
pub enum SetupError {
    Config(ConfigError),
    Client(StorefrontError),
}

impl std::fmt::Display for SetupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetupError::Config(e) => write!(f, "Invalid configuration: {e}"),
            SetupError::Client(e) => write!(f, "Client setup failed: {e}"),
        }
    }
}

impl std::error::Error for SetupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SetupError::Config(e) => Some(e),
            SetupError::Client(e) => Some(e),
        }
    }
}

impl From<ConfigError> for SetupError {
    fn from(err: ConfigError) -> Self {
        SetupError::Config(err)
    }
}

impl From<StorefrontError> for SetupError {
    fn from(err: StorefrontError) -> Self {
        SetupError::Client(err)
    }
}
