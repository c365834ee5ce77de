//! Integration tests for the QKart storefront.
//!
//! Each test starts two in-process servers on ephemeral ports:
//!
//! - [`FakeBackend`], an axum app speaking the QKart REST API with one
//!   user, a fixed catalog, and call counters
//! - the real storefront router, pointed at the fake backend
//!
//! and drives the storefront with a cookie-keeping `reqwest` client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p qkart-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use qkart_storefront::config::{ApiConfig, StorefrontConfig};
use qkart_storefront::state::AppState;
use serde::Deserialize;
use serde_json::{Value, json};

/// Username accepted by the fake backend.
pub const USERNAME: &str = "crio.do";
/// Password accepted by the fake backend.
pub const PASSWORD: &str = "learnbydoing";
/// Token issued on login.
pub const TOKEN: &str = "test-token";
/// Wallet balance issued on login.
pub const BALANCE: i64 = 5000;
/// Quiet period used for search in tests.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(100);

// =============================================================================
// Fake backend
// =============================================================================

/// Calls the fake backend has received, by endpoint.
#[derive(Default)]
pub struct Calls {
    pub search: AtomicUsize,
    pub cart_update: AtomicUsize,
    pub register: AtomicUsize,
    pub checkout: AtomicUsize,
}

#[derive(Default)]
struct Store {
    cart: Vec<(String, u32)>,
    addresses: Vec<(String, String)>,
    next_address: usize,
    last_cart_update: Option<Value>,
}

/// In-process stand-in for the QKart REST API.
#[derive(Clone, Default)]
pub struct FakeBackend {
    pub calls: Arc<Calls>,
    store: Arc<Mutex<Store>>,
}

impl FakeBackend {
    /// The body of the most recent `POST /cart`.
    #[must_use]
    pub fn last_cart_update(&self) -> Option<Value> {
        self.store.lock().unwrap().last_cart_update.clone()
    }

    /// Replace the stored cart without going through the storefront.
    pub fn set_cart(&self, items: &[(&str, u32)]) {
        self.store.lock().unwrap().cart = items
            .iter()
            .map(|(id, qty)| ((*id).to_string(), *qty))
            .collect();
    }

    fn router(self) -> Router {
        Router::new()
            .route("/api/v1/products", get(products))
            .route("/api/v1/products/search", get(search))
            .route("/api/v1/auth/login", post(login))
            .route("/api/v1/auth/register", post(register))
            .route("/api/v1/cart", get(get_cart).post(update_cart))
            .route("/api/v1/cart/checkout", post(checkout))
            .route("/api/v1/user/addresses", get(addresses).post(add_address))
            .route("/api/v1/user/addresses/{id}", delete(delete_address))
            .with_state(self)
    }
}

/// The catalog served by the fake backend.
#[must_use]
pub fn catalog() -> Value {
    json!([
        {
            "_id": "BW0jAAeDJmlZCF8i",
            "name": "Tan Leatherette Weekender Duffle",
            "category": "Fashion",
            "cost": 100,
            "rating": 4,
            "image": "https://example.com/duffle.png"
        },
        {
            "_id": "KCRwjF7lXBzPnLnz",
            "name": "YONEX Smash Badminton Racquet",
            "category": "Sports",
            "cost": 250,
            "rating": 5,
            "image": "https://example.com/racquet.png"
        }
    ])
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "message": message }))).into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn cart_json(store: &Store) -> Value {
    Value::Array(
        store
            .cart
            .iter()
            .map(|(id, qty)| json!({ "productId": id, "qty": qty }))
            .collect(),
    )
}

fn addresses_json(store: &Store) -> Value {
    Value::Array(
        store
            .addresses
            .iter()
            .map(|(id, address)| json!({ "_id": id, "address": address }))
            .collect(),
    )
}

async fn products() -> Json<Value> {
    Json(catalog())
}

#[derive(Deserialize)]
struct SearchQuery {
    value: String,
}

async fn search(State(backend): State<FakeBackend>, Query(query): Query<SearchQuery>) -> Response {
    backend.calls.search.fetch_add(1, Ordering::SeqCst);
    let needle = query.value.to_lowercase();

    let Value::Array(all) = catalog() else {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "bad catalog");
    };
    let found: Vec<Value> = all
        .into_iter()
        .filter(|p| {
            ["name", "category"].iter().any(|field| {
                p[*field]
                    .as_str()
                    .is_some_and(|s| s.to_lowercase().contains(&needle))
            })
        })
        .collect();

    if found.is_empty() {
        return (StatusCode::NOT_FOUND, Json(json!([]))).into_response();
    }
    Json(Value::Array(found)).into_response()
}

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

async fn login(Json(body): Json<Credentials>) -> Response {
    if body.username != USERNAME {
        return error(StatusCode::BAD_REQUEST, "Username does not exist");
    }
    if body.password != PASSWORD {
        return error(StatusCode::BAD_REQUEST, "Password is incorrect");
    }
    Json(json!({
        "success": true,
        "token": TOKEN,
        "username": USERNAME,
        "balance": BALANCE
    }))
    .into_response()
}

async fn register(State(backend): State<FakeBackend>, Json(body): Json<Credentials>) -> Response {
    backend.calls.register.fetch_add(1, Ordering::SeqCst);
    if body.username == USERNAME {
        return error(StatusCode::BAD_REQUEST, "Username is already taken");
    }
    (StatusCode::CREATED, Json(json!({ "success": true }))).into_response()
}

async fn get_cart(State(backend): State<FakeBackend>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Protected route, Oauth2 Bearer token not found");
    }
    Json(cart_json(&backend.store.lock().unwrap())).into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartUpdate {
    product_id: String,
    qty: u32,
}

async fn update_cart(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    backend.calls.cart_update.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Protected route, Oauth2 Bearer token not found");
    }

    let mut store = backend.store.lock().unwrap();
    store.last_cart_update = Some(body.clone());

    let Ok(update) = serde_json::from_value::<CartUpdate>(body) else {
        return error(StatusCode::BAD_REQUEST, "Invalid cart update");
    };

    let known = catalog()
        .as_array()
        .is_some_and(|all| all.iter().any(|p| p["_id"] == update.product_id));
    if !known {
        return error(StatusCode::BAD_REQUEST, "Product doesn't exist");
    }

    store.cart.retain(|(id, _)| id != &update.product_id);
    if update.qty > 0 {
        store.cart.push((update.product_id, update.qty));
    }

    Json(cart_json(&store)).into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutBody {
    address_id: String,
}

async fn checkout(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<CheckoutBody>,
) -> Response {
    backend.calls.checkout.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Protected route, Oauth2 Bearer token not found");
    }

    let mut store = backend.store.lock().unwrap();
    if !store.addresses.iter().any(|(id, _)| id == &body.address_id) {
        return error(StatusCode::BAD_REQUEST, "Bad address specified");
    }
    store.cart.clear();
    Json(json!({ "success": true })).into_response()
}

async fn addresses(State(backend): State<FakeBackend>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Protected route, Oauth2 Bearer token not found");
    }
    Json(addresses_json(&backend.store.lock().unwrap())).into_response()
}

#[derive(Deserialize)]
struct NewAddress {
    address: String,
}

async fn add_address(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<NewAddress>,
) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Protected route, Oauth2 Bearer token not found");
    }
    let mut store = backend.store.lock().unwrap();
    store.next_address += 1;
    let id = format!("addr-{}", store.next_address);
    store.addresses.push((id, body.address));
    Json(addresses_json(&store)).into_response()
}

async fn delete_address(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Protected route, Oauth2 Bearer token not found");
    }
    let mut store = backend.store.lock().unwrap();
    store.addresses.retain(|(existing, _)| existing != &id);
    Json(addresses_json(&store)).into_response()
}

// =============================================================================
// Test context
// =============================================================================

/// A running storefront wired to a fresh fake backend.
pub struct TestContext {
    /// Client that keeps the session cookie and does not follow redirects.
    pub client: reqwest::Client,
    /// Base URL of the storefront.
    pub base_url: String,
    /// The fake backend, for inspecting calls.
    pub backend: FakeBackend,
}

impl TestContext {
    /// Start a fake backend and a storefront pointed at it.
    pub async fn start() -> Self {
        let backend = FakeBackend::default();
        let backend_addr = serve(backend.clone().router()).await;

        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            base_url: "http://127.0.0.1".to_string(),
            api: ApiConfig {
                endpoint: format!("http://{backend_addr}/api/v1"),
                timeout: Duration::from_secs(5),
                catalog_ttl: Duration::from_secs(60),
            },
            search_debounce: SEARCH_DEBOUNCE,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        let app = qkart_storefront::app(AppState::new(config).unwrap());
        let storefront_addr = serve(app).await;

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            client,
            base_url: format!("http://{storefront_addr}"),
            backend,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET` a full page and return its status and body.
    pub async fn page(&self, path: &str) -> (reqwest::StatusCode, String) {
        let response = self.client.get(self.url(path)).send().await.unwrap();
        let status = response.status();
        (status, response.text().await.unwrap())
    }

    /// Submit a plain form and return the redirect target.
    pub async fn submit(&self, path: &str, form: &[(&str, &str)]) -> String {
        let response = self
            .client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .unwrap();
        assert!(
            response.status().is_redirection(),
            "expected redirect from {path}, got {}",
            response.status()
        );
        response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string()
    }

    /// Submit an HTMX form.
    pub async fn htmx(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .header("hx-request", "true")
            .form(form)
            .send()
            .await
            .unwrap()
    }

    /// Log in as the fake backend's user.
    pub async fn login(&self) {
        let location = self
            .submit("/login", &[("username", USERNAME), ("password", PASSWORD)])
            .await;
        assert_eq!(location, "/");
    }
}

/// `HX-Trigger` header of an HTMX response, if any.
#[must_use]
pub fn hx_trigger(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get("hx-trigger")
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });
    addr
}
