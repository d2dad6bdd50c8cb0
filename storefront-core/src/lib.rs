//! Core of the storefront engine.
//!
//! Holds everything the catalog page, cart sidebar, checkout view and
//! registration form need besides rendering: the data model, the session
//! store, cart reconciliation, catalog loading, registration, the error
//! taxonomy, configuration and tracing setup.
//!
//! The remote service is reached only through [`StorefrontApi`]; the HTTP
//! implementation lives in `storefront-client`.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod reconcile;
pub mod registration;
pub mod store;
pub mod telemetry;

pub use api::{ApiFuture, StorefrontApi};
pub use catalog::ProductCatalog;
pub use config::{
    ClientConfig, ConfigError, ConfigSection, ConfigValue, DefaultSecretResolver,
    FromConfigValue, LogConfig, SearchConfig, SecretResolver, SessionConfig, StorefrontConfig,
};
pub use error::{FieldError, Severity, StorefrontError, CONNECTIVITY_MESSAGE};
pub use model::{AuthToken, CartEntry, CartItem, Product, RegisterRequest, ServiceReply};
pub use reconcile::{is_item_in_cart, reconcile, total_quantity, total_value, CartSummary};
pub use registration::{Registration, RegistrationForm};
pub use store::SessionStore;
pub use telemetry::init_tracing;
