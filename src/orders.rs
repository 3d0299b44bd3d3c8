//! Order placement: request validation and order numbering.
//!
//! Stock checks and the atomic write live in the [`Store`] implementations;
//! this module decides what a well-formed order is and hands out order
//! numbers.

use crate::catalog::is_storable_amount;
use crate::models::{CreateOrderRequest, Customer, Order};
use crate::store::{OrderDraft, Store, StoreError, StoreResult};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::info;

/// Default order number prefix.
pub const DEFAULT_ORDER_PREFIX: &str = "VUE";

/// Default sequence base; the first order gets `base + 1`.
pub const DEFAULT_SEQUENCE_BASE: u64 = 1000;

/// Validation failures for an incoming order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderValidationError {
    /// A customer field is blank.
    #[error("customer {0} is required")]
    MissingCustomerField(&'static str),
    /// The email address is not of the form `local@domain.tld`.
    #[error("customer email '{0}' is not a valid address")]
    InvalidEmail(String),
    /// The order has no lines.
    #[error("order must contain at least one item")]
    NoItems,
    /// A line has a quantity below one.
    #[error("item {product_id} has invalid quantity {quantity}, minimum is 1")]
    InvalidQuantity {
        /// Product identifier.
        product_id: i32,
        /// Rejected quantity.
        quantity: i32,
    },
    /// A monetary total is negative.
    #[error("{0} must not be negative")]
    NegativeAmount(&'static str),
    /// A monetary total has sub-cent precision or does not fit the amount
    /// columns.
    #[error("{0} must have at most two decimal places and be below 100000000")]
    UnstorableAmount(&'static str),
}

/// Process-wide order number generator.
#[derive(Debug)]
pub struct OrderNumbering {
    prefix: String,
    counter: AtomicU64,
}

impl OrderNumbering {
    /// Creates a generator whose first number is `prefix-(base + 1)`.
    #[must_use]
    pub fn new(prefix: impl Into<String>, base: u64) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(base),
        }
    }

    /// Number prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Last sequence value handed out (or the base if none).
    #[must_use]
    pub fn current(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    /// Ensures future numbers are greater than `sequence`.
    pub fn advance_past(&self, sequence: u64) {
        self.counter.fetch_max(sequence, Ordering::SeqCst);
    }

    /// Allocates the next order number.
    pub fn next_number(&self) -> String {
        let sequence = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.format(sequence)
    }

    /// Formats a sequence value with this generator's prefix.
    #[must_use]
    pub fn format(&self, sequence: u64) -> String {
        format!("{}-{}", self.prefix, sequence)
    }

    /// Extracts the sequence from an order number carrying this prefix.
    #[must_use]
    pub fn parse_sequence(&self, order_number: &str) -> Option<u64> {
        order_number
            .strip_prefix(self.prefix.as_str())?
            .strip_prefix('-')?
            .parse()
            .ok()
    }
}

impl Default for OrderNumbering {
    fn default() -> Self {
        Self::new(DEFAULT_ORDER_PREFIX, DEFAULT_SEQUENCE_BASE)
    }
}

/// Returns true for addresses shaped like `local@domain.tld`.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty() && !domain.starts_with('.'),
        None => false,
    }
}

fn validate_customer(customer: &Customer) -> Result<(), OrderValidationError> {
    if customer.name.trim().is_empty() {
        return Err(OrderValidationError::MissingCustomerField("name"));
    }
    if customer.email.trim().is_empty() {
        return Err(OrderValidationError::MissingCustomerField("email"));
    }
    if customer.address.trim().is_empty() {
        return Err(OrderValidationError::MissingCustomerField("address"));
    }
    if !is_valid_email(customer.email.trim()) {
        return Err(OrderValidationError::InvalidEmail(customer.email.clone()));
    }
    Ok(())
}

/// Validates an order request and turns it into a draft for the store.
///
/// # Errors
/// Returns the first validation failure found.
pub fn validate(request: CreateOrderRequest) -> Result<OrderDraft, OrderValidationError> {
    validate_customer(&request.customer)?;

    if request.items.is_empty() {
        return Err(OrderValidationError::NoItems);
    }
    if let Some(item) = request.items.iter().find(|item| item.quantity < 1) {
        return Err(OrderValidationError::InvalidQuantity {
            product_id: item.id,
            quantity: item.quantity,
        });
    }

    for (field, amount) in [
        ("subtotal", request.subtotal),
        ("shipping", request.shipping),
        ("tax", request.tax),
        ("total", request.total),
    ] {
        if amount < Decimal::ZERO {
            return Err(OrderValidationError::NegativeAmount(field));
        }
        if !is_storable_amount(amount) {
            return Err(OrderValidationError::UnstorableAmount(field));
        }
    }

    let customer = Customer {
        name: request.customer.name.trim().to_string(),
        email: request.customer.email.trim().to_string(),
        address: request.customer.address.trim().to_string(),
    };

    Ok(OrderDraft {
        customer,
        lines: request
            .items
            .into_iter()
            .map(|item| (item.id, item.quantity))
            .collect(),
        subtotal: request.subtotal,
        shipping: request.shipping,
        tax: request.tax,
        total: request.total,
    })
}

/// Errors from [`OrderProcessor::place`].
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    /// The request was malformed.
    #[error(transparent)]
    Invalid(#[from] OrderValidationError),
    /// The store rejected or failed the placement.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Places orders against a store using a shared number sequence.
#[derive(Debug, Default)]
pub struct OrderProcessor {
    numbering: OrderNumbering,
}

impl OrderProcessor {
    /// Creates a processor with the given numbering.
    #[must_use]
    pub fn new(numbering: OrderNumbering) -> Self {
        Self { numbering }
    }

    /// The order number generator.
    #[must_use]
    pub fn numbering(&self) -> &OrderNumbering {
        &self.numbering
    }

    /// Moves the sequence past any number already persisted in the store.
    ///
    /// # Errors
    /// Returns an error if the store cannot be queried.
    pub async fn sync_with(&self, store: &dyn Store) -> StoreResult<()> {
        if let Some(highest) = store.max_order_sequence(self.numbering.prefix()).await? {
            self.numbering.advance_past(highest);
            info!(
                "Order numbering resumes after {}",
                self.numbering.format(highest)
            );
        }
        Ok(())
    }

    /// Validates and places an order.
    ///
    /// # Errors
    /// Returns a validation error, a stock error from the store, or a store
    /// failure. On any error no stock has been decremented.
    pub async fn place(
        &self,
        store: &dyn Store,
        request: CreateOrderRequest,
    ) -> Result<Order, PlaceOrderError> {
        let draft = validate(request)?;
        let order = store.place_order(draft, &self.numbering).await?;

        info!(
            order_number = %order.order_number,
            items = order.items.len(),
            total = %order.total,
            "Order placed"
        );

        Ok(order)
    }
}
