//! HTTP implementation of [`StorefrontApi`].
//!
//! Talks JSON to the storefront service:
//!
//! | Operation           | Request                              |
//! |---------------------|--------------------------------------|
//! | `list_products`     | `GET  {endpoint}/products`           |
//! | `search_products`   | `GET  {endpoint}/products/search`    |
//! | `fetch_cart`        | `GET  {endpoint}/cart` (Bearer)      |
//! | `upsert_cart_entry` | `POST {endpoint}/cart` (Bearer)      |
//! | `register`          | `POST {endpoint}/auth/register`      |
//!
//! Status codes map onto [`StorefrontError`]: 5xx is `ServerFailure` with the
//! service's `message`, other error statuses are `Rejected` (or `NotFound`
//! for a search without matches), and anything that never produced a usable
//! response (connection refused, timeout, body that is not the expected JSON)
//! is `NetworkFailure`.

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use storefront_core::{
    ApiFuture, AuthToken, CartEntry, ClientConfig, Product, RegisterRequest, ServiceReply,
    StorefrontApi, StorefrontError,
};

/// Message used when a 5xx response carries no `message` of its own.
pub const DEFAULT_SERVER_MESSAGE: &str =
    "Something went wrong. Check the backend console for more details";

/// Message used when registration fails without an explanation.
pub const DEFAULT_REGISTER_MESSAGE: &str = "Registration failed!";

/// How a 404 should be read for a given route.
#[derive(Clone, Copy)]
enum NotFoundMeans {
    NoMatches,
    Error,
}

/// [`StorefrontApi`] over HTTP, backed by `reqwest`.
#[derive(Clone)]
pub struct HttpStorefrontApi {
    client: reqwest::Client,
    base: String,
}

impl HttpStorefrontApi {
    /// Build a client for the service at `config.endpoint`.
    pub fn new(config: &ClientConfig) -> Result<Self, StorefrontError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                StorefrontError::NetworkFailure(format!("Failed to build HTTP client: {e}"))
            })?;
        Ok(Self::with_client(client, &config.endpoint))
    }

    /// Use an existing `reqwest::Client` (shared connection pool, custom TLS).
    pub fn with_client(client: reqwest::Client, endpoint: &str) -> Self {
        Self {
            client,
            base: endpoint.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn send(&self, path: &str, request: RequestBuilder) -> Result<Response, StorefrontError> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(path, error = %e, "Service unreachable");
            StorefrontError::NetworkFailure(e.to_string())
        })?;
        tracing::debug!(path, status = response.status().as_u16(), "Service responded");
        Ok(response)
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        path: &str,
        request: RequestBuilder,
        not_found: NotFoundMeans,
    ) -> Result<T, StorefrontError> {
        let response = self.send(path, request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(error_for(status, response, not_found, None).await);
        }
        response.json::<T>().await.map_err(|e| {
            tracing::warn!(path, error = %e, "Undecodable response body");
            StorefrontError::NetworkFailure(format!("Invalid response body: {e}"))
        })
    }
}

/// Turn a non-2xx response into the matching error.
async fn error_for(
    status: StatusCode,
    response: Response,
    not_found: NotFoundMeans,
    default_message: Option<&str>,
) -> StorefrontError {
    if status == StatusCode::NOT_FOUND {
        if let NotFoundMeans::NoMatches = not_found {
            return StorefrontError::NotFound;
        }
    }

    // Error bodies are best effort; a missing or odd body just means no message.
    let reply: ServiceReply = response.json().await.unwrap_or_default();
    let code = status.as_u16();
    if status.is_server_error() {
        StorefrontError::ServerFailure {
            status: code,
            message: reply
                .message
                .unwrap_or_else(|| DEFAULT_SERVER_MESSAGE.to_string()),
        }
    } else {
        let fallback = default_message
            .or_else(|| status.canonical_reason())
            .unwrap_or("Request rejected");
        StorefrontError::Rejected {
            status: code,
            message: reply.message.unwrap_or_else(|| fallback.to_string()),
        }
    }
}

impl StorefrontApi for HttpStorefrontApi {
    fn list_products(&self) -> ApiFuture<'_, Vec<Product>> {
        Box::pin(async move {
            let path = "/products";
            let request = self.client.get(self.url(path));
            self.fetch_json(path, request, NotFoundMeans::Error).await
        })
    }

    fn search_products<'a>(&'a self, text: &'a str) -> ApiFuture<'a, Vec<Product>> {
        Box::pin(async move {
            let path = "/products/search";
            let request = self.client.get(self.url(path)).query(&[("value", text)]);
            self.fetch_json(path, request, NotFoundMeans::NoMatches).await
        })
    }

    fn fetch_cart<'a>(&'a self, token: &'a AuthToken) -> ApiFuture<'a, Vec<CartEntry>> {
        Box::pin(async move {
            let path = "/cart";
            let request = self.client.get(self.url(path)).bearer_auth(token.as_str());
            self.fetch_json(path, request, NotFoundMeans::Error).await
        })
    }

    fn upsert_cart_entry<'a>(
        &'a self,
        token: &'a AuthToken,
        entry: &'a CartEntry,
    ) -> ApiFuture<'a, Vec<CartEntry>> {
        Box::pin(async move {
            let path = "/cart";
            let request = self
                .client
                .post(self.url(path))
                .bearer_auth(token.as_str())
                .json(entry);
            self.fetch_json(path, request, NotFoundMeans::Error).await
        })
    }

    fn register<'a>(&'a self, request: &'a RegisterRequest) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            let path = "/auth/register";
            let response = self
                .send(path, self.client.post(self.url(path)).json(request))
                .await?;
            let status = response.status();
            if !status.is_success() {
                return Err(error_for(
                    status,
                    response,
                    NotFoundMeans::Error,
                    Some(DEFAULT_REGISTER_MESSAGE),
                )
                .await);
            }

            let reply: ServiceReply = response.json().await.map_err(|e| {
                StorefrontError::NetworkFailure(format!("Invalid response body: {e}"))
            })?;
            if reply.success == Some(false) {
                return Err(StorefrontError::Rejected {
                    status: status.as_u16(),
                    message: reply
                        .message
                        .unwrap_or_else(|| DEFAULT_REGISTER_MESSAGE.to_string()),
                });
            }
            Ok(())
        })
    }
}
