use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Query, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use storefront_core::{CartEntry, Product, RegisterRequest, ServiceReply};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// How the fake service misbehaves on catalog routes.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FailureMode {
    #[default]
    Healthy,
    /// Answer 500 with `{ success: false, message }`.
    ServerError(String),
    /// Answer 200 with a body that is not JSON.
    Garbage,
}

struct BackendState {
    products: Vec<Product>,
    carts: Mutex<HashMap<String, Vec<CartEntry>>>,
    users: Mutex<HashSet<String>>,
    mode: Mutex<FailureMode>,
    requests: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An in-process implementation of the storefront HTTP service.
///
/// Routes live under `/api/v1`, matching the default endpoint layout:
/// `GET /products`, `GET /products/search`, `GET|POST /cart`,
/// `POST /auth/register`. Any non-empty bearer token is accepted and owns
/// its own cart.
#[derive(Clone)]
pub struct FakeBackend {
    state: Arc<BackendState>,
}

impl FakeBackend {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            state: Arc::new(BackendState {
                products,
                carts: Mutex::new(HashMap::new()),
                users: Mutex::new(HashSet::new()),
                mode: Mutex::new(FailureMode::Healthy),
                requests: AtomicUsize::new(0),
            }),
        }
    }

    pub fn set_failure_mode(&self, mode: FailureMode) {
        *lock(&self.state.mode) = mode;
    }

    /// Seed the cart owned by `token`.
    pub fn set_cart(&self, token: &str, entries: Vec<CartEntry>) {
        lock(&self.state.carts).insert(token.to_string(), entries);
    }

    pub fn cart(&self, token: &str) -> Vec<CartEntry> {
        lock(&self.state.carts).get(token).cloned().unwrap_or_default()
    }

    /// Pretend `username` already has an account.
    pub fn add_user(&self, username: &str) {
        lock(&self.state.users).insert(username.to_string());
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    pub fn router(&self) -> Router {
        let api = Router::new()
            .route("/products", get(list_products))
            .route("/products/search", get(search_products))
            .route("/cart", get(get_cart).post(post_cart))
            .route("/auth/register", post(register))
            .with_state(Arc::clone(&self.state));
        Router::new().nest("/api/v1", api)
    }

    /// Serve on an ephemeral loopback port until the returned handle drops.
    pub async fn serve(&self) -> std::io::Result<RunningBackend> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let router = self.router();
        let handle = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, router).await {
                tracing::error!(error = %err, "fake backend stopped");
            }
        });
        Ok(RunningBackend { addr, handle })
    }
}

/// A [`FakeBackend`] bound to a socket. Dropping it stops the server.
pub struct RunningBackend {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl RunningBackend {
    /// Base URL to hand to the HTTP client, e.g. `http://127.0.0.1:4321/api/v1`.
    pub fn endpoint(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Drop for RunningBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ── Handlers ───────────────────────────────────────────────────────────

fn reply(status: StatusCode, body: ServiceReply) -> Response {
    (status, Json(body)).into_response()
}

fn failure(state: &BackendState) -> Option<Response> {
    match &*lock(&state.mode) {
        FailureMode::Healthy => None,
        FailureMode::ServerError(message) => Some(reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            ServiceReply::failure(message.clone()),
        )),
        FailureMode::Garbage => Some((StatusCode::OK, "<html>oops</html>").into_response()),
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn unauthorized() -> Response {
    reply(
        StatusCode::UNAUTHORIZED,
        ServiceReply::failure("Protected route, Oauth2 Bearer token not found"),
    )
}

async fn list_products(State(state): State<Arc<BackendState>>) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if let Some(resp) = failure(&state) {
        return resp;
    }
    Json(state.products.clone()).into_response()
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    value: String,
}

async fn search_products(
    State(state): State<Arc<BackendState>>,
    Query(params): Query<SearchParams>,
) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if let Some(resp) = failure(&state) {
        return resp;
    }
    let needle = params.value.to_lowercase();
    let found: Vec<Product> = state
        .products
        .iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&needle) || p.category.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();
    if found.is_empty() {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(found).into_response()
}

async fn get_cart(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let Some(token) = bearer(&headers) else {
        return unauthorized();
    };
    let cart = lock(&state.carts).get(&token).cloned().unwrap_or_default();
    Json(cart).into_response()
}

async fn post_cart(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(entry): Json<CartEntry>,
) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let Some(token) = bearer(&headers) else {
        return unauthorized();
    };
    if !state.products.iter().any(|p| p.id == entry.product_id) {
        return reply(
            StatusCode::BAD_REQUEST,
            ServiceReply::failure("Product doesn't exist"),
        );
    }

    let mut carts = lock(&state.carts);
    let cart = carts.entry(token).or_default();
    match cart.iter().position(|e| e.product_id == entry.product_id) {
        Some(i) if entry.qty == 0 => {
            cart.remove(i);
        }
        Some(i) => cart[i].qty = entry.qty,
        None if entry.qty == 0 => {}
        None => cart.push(entry),
    }
    Json(cart.clone()).into_response()
}

async fn register(
    State(state): State<Arc<BackendState>>,
    Json(request): Json<RegisterRequest>,
) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let mut users = lock(&state.users);
    if !users.insert(request.username) {
        return reply(
            StatusCode::BAD_REQUEST,
            ServiceReply::failure("Username is already taken"),
        );
    }
    reply(StatusCode::CREATED, ServiceReply::ok())
}
