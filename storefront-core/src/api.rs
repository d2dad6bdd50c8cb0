use std::future::Future;
use std::pin::Pin;

use crate::error::StorefrontError;
use crate::model::{AuthToken, CartEntry, Product, RegisterRequest};

/// Boxed future returned by [`StorefrontApi`] methods.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorefrontError>> + Send + 'a>>;

/// The remote catalog / cart / auth service.
///
/// The engine only ever talks to the service through this trait, so it can
/// be backed by HTTP in production and by an in-memory double in tests.
pub trait StorefrontApi: Send + Sync + 'static {
    /// `GET /products`
    fn list_products(&self) -> ApiFuture<'_, Vec<Product>>;

    /// `GET /products/search?value=<text>`. No matches is
    /// [`StorefrontError::NotFound`].
    fn search_products<'a>(&'a self, text: &'a str) -> ApiFuture<'a, Vec<Product>>;

    /// `GET /cart`
    fn fetch_cart<'a>(&'a self, token: &'a AuthToken) -> ApiFuture<'a, Vec<CartEntry>>;

    /// `POST /cart`. `entry.qty` is the new absolute quantity; zero asks the
    /// service to drop the entry. Returns the whole updated cart.
    fn upsert_cart_entry<'a>(
        &'a self,
        token: &'a AuthToken,
        entry: &'a CartEntry,
    ) -> ApiFuture<'a, Vec<CartEntry>>;

    /// `POST /auth/register`
    fn register<'a>(&'a self, request: &'a RegisterRequest) -> ApiFuture<'a, ()>;
}
