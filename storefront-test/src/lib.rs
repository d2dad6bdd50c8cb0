//! Test utilities for the storefront engine.
//!
//! - [`RecordingApi`]: an in-memory [`StorefrontApi`](storefront_core::StorefrontApi)
//!   that records every call, for asserting how many requests an operation made
//! - [`FakeBackend`]: an axum app speaking the service's HTTP contract,
//!   served on a loopback port for client tests
//! - [`fixtures`]: sample products

pub mod backend;
pub mod fixtures;
pub mod recording;

pub use backend::{FakeBackend, FailureMode, RunningBackend};
pub use fixtures::{product, sample_catalog};
pub use recording::{ApiCall, RecordingApi};
