//! Integration tests for the Shop Backend API.
//!
//! These tests require the API server to be running. Configure the server URL
//! via the `API_BASE_URL` environment variable (default: `http://localhost:5000`).
//!
//! Tests share one server, so they create their own products and never
//! clear the store.

use shop_client::{
    ClientConfig, CreateOrderRequest, Customer, OrderItemRequest, Product, ProductInput,
    ShopClient,
};
use std::time::Duration;

/// Gets the API base URL from environment or uses default.
#[must_use]
pub fn get_api_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

/// Creates a test client configured for the API.
///
/// # Errors
/// Returns error if client creation fails.
pub fn create_test_client() -> Result<ShopClient, shop_client::Error> {
    ShopClient::new(ClientConfig {
        base_url: get_api_url(),
        timeout: Duration::from_secs(10),
    })
}

/// Creates a client logged in as the seeded admin account.
///
/// # Errors
/// Returns error if the client cannot be built or login fails.
pub async fn create_admin_client() -> Result<ShopClient, shop_client::Error> {
    let client = create_test_client()?;
    let session = client.login("admin", "admin123").await?;
    Ok(client.with_token(&session.token))
}

/// Generates a unique name to avoid conflicts between tests.
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);

    format!("{}_{}_{}", prefix, ts, counter)
}

/// Creates a product owned by one test.
///
/// # Errors
/// Returns error if the admin calls fail.
pub async fn create_test_product(
    admin: &ShopClient,
    category: &str,
    price: f64,
    stock: i32,
) -> Result<Product, shop_client::Error> {
    admin
        .create_product(&ProductInput {
            name: unique_name("Test Product"),
            description: "Integration test product".to_string(),
            price,
            category: category.to_string(),
            image: String::new(),
            stock,
        })
        .await
}

/// Builds a valid order for the given `(product id, quantity)` lines.
#[must_use]
pub fn order_request(items: &[(i32, i32)]) -> CreateOrderRequest {
    CreateOrderRequest {
        customer: Customer {
            name: "Grace Hopper".to_string(),
            email: "grace@example.com".to_string(),
            address: "42 Compiler Ave".to_string(),
        },
        items: items
            .iter()
            .map(|&(id, quantity)| OrderItemRequest { id, quantity })
            .collect(),
        subtotal: 10.0,
        shipping: 5.0,
        tax: 0.8,
        total: 15.8,
    }
}
