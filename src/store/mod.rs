//! Storage abstraction with a PostgreSQL and an in-memory implementation.
//!
//! The backend is chosen once at start-up and held as `Arc<dyn Store>`;
//! handlers never branch on which one is active.

mod memory;
mod postgres;
pub mod seed;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::catalog::ProductQuery;
use crate::models::{
    AdminStats, Customer, ExportData, Order, OrderStatus, Product, ProductInput, User,
};
use crate::orders::OrderNumbering;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

/// Storage error types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An order line references a product that does not exist.
    #[error("product with ID {0} does not exist")]
    ProductNotFound(i32),

    /// Not enough stock to satisfy an order line.
    #[error("product {product_id} only has {available} items in stock ({requested} requested)")]
    InsufficientStock {
        /// Product identifier.
        product_id: i32,
        /// Units currently in stock.
        available: i32,
        /// Units requested across the order.
        requested: i64,
    },

    /// The backing store cannot be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Query or transaction failure.
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// Stored data could not be mapped back to the domain.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// Failure outside the store itself (e.g. password hashing while seeding).
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Identifies the active backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// PostgreSQL via sqlx.
    Postgres,
    /// Process memory, no durability.
    Memory,
}

impl Backend {
    /// Short backend name used in health output and logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Memory => "memory",
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated order waiting to be placed. Identity, numbering and the
/// catalog snapshot are assigned by the store inside its critical section.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    /// Customer details.
    pub customer: Customer,
    /// Requested `(product_id, quantity)` lines in request order.
    pub lines: Vec<(i32, i32)>,
    /// Client-supplied subtotal.
    pub subtotal: Decimal,
    /// Client-supplied shipping.
    pub shipping: Decimal,
    /// Client-supplied tax.
    pub tax: Decimal,
    /// Client-supplied total.
    pub total: Decimal,
}

impl OrderDraft {
    /// Total quantity requested per product. Summed in `i64` so repeated
    /// lines for one product cannot wrap.
    #[must_use]
    pub fn requested_quantities(&self) -> BTreeMap<i32, i64> {
        let mut totals = BTreeMap::new();
        for &(product_id, quantity) in &self.lines {
            *totals.entry(product_id).or_insert(0) += i64::from(quantity);
        }
        totals
    }

    /// Builds the stored order once stock has been checked, snapshotting
    /// name and price from the catalog lookup.
    pub(crate) fn into_order<F>(
        self,
        order_number: String,
        now: DateTime<Utc>,
        mut lookup: F,
    ) -> StoreResult<Order>
    where
        F: FnMut(i32) -> Option<(String, Decimal)>,
    {
        let mut items = Vec::with_capacity(self.lines.len());
        for (product_id, quantity) in self.lines {
            let (name, price) = lookup(product_id).ok_or(StoreError::ProductNotFound(product_id))?;
            items.push(crate::models::OrderItem {
                id: product_id,
                name,
                price,
                quantity,
            });
        }

        Ok(Order {
            id: Uuid::new_v4(),
            order_number,
            customer: self.customer,
            items,
            subtotal: self.subtotal,
            shipping: self.shipping,
            tax: self.tax,
            total: self.total,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Checks requested quantities against current stock, reporting the first
/// offending line in request order. Nothing is mutated.
pub(crate) fn check_stock<F>(draft: &OrderDraft, mut stock_of: F) -> StoreResult<()>
where
    F: FnMut(i32) -> Option<i32>,
{
    let requested = draft.requested_quantities();
    for &(product_id, _) in &draft.lines {
        let available = stock_of(product_id).ok_or(StoreError::ProductNotFound(product_id))?;
        let wanted = requested.get(&product_id).copied().unwrap_or_default();
        if i64::from(available) < wanted {
            return Err(StoreError::InsufficientStock {
                product_id,
                available,
                requested: wanted,
            });
        }
    }
    Ok(())
}

/// A user record together with its password hash.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    /// Public user data.
    pub user: User,
    /// Argon2 PHC string.
    pub password_hash: String,
}

/// Outcome of a seed run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    /// Products inserted.
    pub products: usize,
    /// Users inserted.
    pub users: usize,
}

/// Storage operations used by the API.
#[async_trait]
pub trait Store: Send + Sync {
    /// Which backend this is.
    fn backend(&self) -> Backend;

    // ------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------

    /// Lists products matching the query.
    async fn list_products(&self, query: &ProductQuery) -> StoreResult<Vec<Product>>;

    /// Gets a product by id.
    async fn get_product(&self, id: i32) -> StoreResult<Option<Product>>;

    /// Distinct categories, alphabetical.
    async fn list_categories(&self) -> StoreResult<Vec<String>>;

    /// Creates a product and returns it with its assigned id.
    async fn create_product(&self, input: ProductInput) -> StoreResult<Product>;

    /// Replaces a product's fields. Returns `None` if it does not exist.
    async fn update_product(&self, id: i32, input: ProductInput) -> StoreResult<Option<Product>>;

    /// Deletes a product. Returns false if it did not exist.
    async fn delete_product(&self, id: i32) -> StoreResult<bool>;

    // ------------------------------------------------------------------
    // Orders
    // ------------------------------------------------------------------

    /// Validates stock, numbers, records and decrements atomically.
    async fn place_order(&self, draft: OrderDraft, numbering: &OrderNumbering)
    -> StoreResult<Order>;

    /// All orders, newest first.
    async fn list_orders(&self) -> StoreResult<Vec<Order>>;

    /// Looks up an order by its human-facing number.
    async fn get_order_by_number(&self, order_number: &str) -> StoreResult<Option<Order>>;

    /// Sets an order's status and bumps `updated_at`.
    async fn update_order_status(&self, id: Uuid, status: OrderStatus)
    -> StoreResult<Option<Order>>;

    /// Deletes an order. Returns false if it did not exist.
    async fn delete_order(&self, id: Uuid) -> StoreResult<bool>;

    /// Highest sequence already used with the given order number prefix.
    async fn max_order_sequence(&self, prefix: &str) -> StoreResult<Option<u64>>;

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Fetches a user and password hash by username.
    async fn find_credentials(&self, username: &str) -> StoreResult<Option<UserCredentials>>;

    /// All users ordered by id.
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    /// Deletes a user. Returns false if it did not exist.
    async fn delete_user(&self, id: i32) -> StoreResult<bool>;

    // ------------------------------------------------------------------
    // Admin
    // ------------------------------------------------------------------

    /// Store-wide counters.
    async fn stats(&self) -> StoreResult<AdminStats>;

    /// Inserts the mock catalog and users, skipping existing names.
    async fn seed(&self) -> StoreResult<SeedReport>;

    /// Removes all orders, products and users.
    async fn clear(&self) -> StoreResult<()>;

    /// Dumps every entity.
    async fn export(&self) -> StoreResult<ExportData>;
}
