//! Integration tests for the RocketShoes cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocket-shoes-integration-tests
//! ```
//!
//! No external services are needed: every test starts a [`MockInventory`]
//! (an `axum` server on an ephemeral loopback port) and persists the cart
//! into a [`TempStorage`] file that is removed on drop.
//!
//! # Test Categories
//!
//! - `cart_operations` - add/remove/update against the HTTP inventory
//! - `cart_persistence` - slot file contents and reopening a saved cart

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path as UrlPath, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rocket_shoes_cart::{
    CartConfig, CartContext, CartStore, FileSlot, InventoryClient, Notifier, StorageError,
};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

/// Slot key used by every test cart.
pub const CART_KEY: &str = "@RocketShoes:cart";

// =============================================================================
// Mock inventory service
// =============================================================================

#[derive(Default)]
struct MockState {
    stock: Mutex<HashMap<i32, u32>>,
    products: Mutex<HashMap<i32, Value>>,
    failing: Mutex<HashSet<i32>>,
    stock_hits: AtomicUsize,
    product_hits: AtomicUsize,
}

/// An in-process inventory API serving `stock/{id}` and `products/{id}`.
///
/// The server task is aborted when the handle is dropped.
pub struct MockInventory {
    addr: SocketAddr,
    prefix: String,
    state: Arc<MockState>,
    server: JoinHandle<()>,
}

impl MockInventory {
    /// Serve the API at the root path.
    pub async fn start() -> Self {
        Self::start_at("").await
    }

    /// Serve the API below `prefix` (e.g. `/api`).
    pub async fn start_at(prefix: &str) -> Self {
        let state = Arc::new(MockState::default());

        let api = Router::new()
            .route("/stock/{id}", get(stock))
            .route("/products/{id}", get(product))
            .with_state(Arc::clone(&state));
        let app = if prefix.is_empty() {
            api
        } else {
            Router::new().nest(prefix, api)
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock inventory");
        let addr = listener.local_addr().expect("Mock inventory has no address");

        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Mock inventory server error");
        });

        Self {
            addr,
            prefix: prefix.to_string(),
            state,
            server,
        }
    }

    /// Base URL to configure the client with.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}{}", self.addr, self.prefix)
    }

    /// Register a catalog entry with the given stock level.
    pub fn add_product(&self, id: i32, title: &str, price: f64, stock: u32) {
        self.put_record(
            id,
            json!({
                "id": id,
                "title": title,
                "price": price,
                "image": format!("https://rocketshoes.example/{id}.jpg"),
            }),
        );
        self.set_stock(id, stock);
    }

    /// Serve `record` verbatim from `products/{id}`.
    pub fn put_record(&self, id: i32, record: Value) {
        self.state
            .products
            .lock()
            .expect("poisoned")
            .insert(id, record);
    }

    /// Set (or create) the stock record for a product.
    pub fn set_stock(&self, id: i32, amount: u32) {
        self.state
            .stock
            .lock()
            .expect("poisoned")
            .insert(id, amount);
    }

    /// Make `stock/{id}` answer 500.
    pub fn fail_stock(&self, id: i32) {
        self.state.failing.lock().expect("poisoned").insert(id);
    }

    #[must_use]
    pub fn stock_hits(&self) -> usize {
        self.state.stock_hits.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn product_hits(&self) -> usize {
        self.state.product_hits.load(Ordering::SeqCst)
    }
}

impl Drop for MockInventory {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn stock(State(state): State<Arc<MockState>>, UrlPath(id): UrlPath<i32>) -> Response {
    state.stock_hits.fetch_add(1, Ordering::SeqCst);

    if state.failing.lock().expect("poisoned").contains(&id) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "stock service exploded").into_response();
    }

    let amount = state.stock.lock().expect("poisoned").get(&id).copied();
    match amount {
        Some(amount) => Json(json!({ "id": id, "amount": amount })).into_response(),
        // json-server answers unknown ids with an empty object
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}

async fn product(State(state): State<Arc<MockState>>, UrlPath(id): UrlPath<i32>) -> Response {
    state.product_hits.fetch_add(1, Ordering::SeqCst);

    let product = state.products.lock().expect("poisoned").get(&id).cloned();
    match product {
        Some(product) => Json(product).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}

// =============================================================================
// Storage and notifications
// =============================================================================

/// A storage file in a unique temporary directory, removed on drop.
pub struct TempStorage {
    dir: PathBuf,
}

impl TempStorage {
    #[must_use]
    pub fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("rocket-shoes-it-{}", uuid::Uuid::new_v4()));
        Self { dir }
    }

    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join("storage.json")
    }

    /// Raw document on disk, if written.
    #[must_use]
    pub fn document(&self) -> Option<Value> {
        let raw = std::fs::read_to_string(self.path()).ok()?;
        Some(serde_json::from_str(&raw).expect("Storage document is not JSON"))
    }

    /// The cart string stored under [`CART_KEY`], if any.
    #[must_use]
    pub fn saved_cart(&self) -> Option<String> {
        self.document()?
            .get(CART_KEY)?
            .as_str()
            .map(ToString::to_string)
    }

    /// Overwrite the document with a raw cart string.
    pub fn write_cart(&self, raw: &str) {
        std::fs::create_dir_all(&self.dir).expect("Failed to create storage dir");
        let document = json!({ CART_KEY: raw });
        std::fs::write(self.path(), document.to_string()).expect("Failed to write storage");
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Default for TempStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TempStorage {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

/// Collects every notification message.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("poisoned").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        self.messages
            .lock()
            .expect("poisoned")
            .push(message.to_string());
    }
}

// =============================================================================
// Cart fixtures
// =============================================================================

/// Cart context wired to real HTTP and file storage.
pub type TestContext = CartContext<InventoryClient, FileSlot, Arc<RecordingNotifier>>;

/// Open the cart persisted in `storage`, talking to the API at `base_url`.
///
/// # Errors
///
/// Returns the store-open error (e.g. a malformed saved cart).
pub fn open_cart(
    base_url: &str,
    storage: &TempStorage,
) -> Result<(TestContext, Arc<RecordingNotifier>), StorageError> {
    let storage_path = storage.path().display().to_string();
    let config = CartConfig::from_lookup(|key| match key {
        "ROCKETSHOES_API_URL" => Some(base_url.to_string()),
        "ROCKETSHOES_STORAGE_PATH" => Some(storage_path.clone()),
        "ROCKETSHOES_STORAGE_KEY" => Some(CART_KEY.to_string()),
        _ => None,
    })
    .expect("Invalid test configuration");

    let inventory =
        InventoryClient::new(&config.inventory).expect("Failed to build inventory client");
    let store = CartStore::open(
        inventory,
        FileSlot::new(&config.storage.path),
        config.storage.key.as_str(),
    )?;

    let notifier = Arc::new(RecordingNotifier::default());
    Ok((CartContext::new(store, Arc::clone(&notifier)), notifier))
}
