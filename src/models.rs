//! Domain entities and request/response models for the REST API.
//!
//! Every JSON payload uses camelCase field names and the common
//! `{success, data, total, error, message}` envelope.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;


// ============================================================================
// Catalog
// ============================================================================

/// A purchasable product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Product identifier.
    pub id: i32,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Unit price.
    #[schema(value_type = f64)]
    pub price: Decimal,
    /// Category name.
    pub category: String,
    /// Image URL.
    pub image: String,
    /// Units in stock.
    pub stock: i32,
}

/// Product fields supplied by admins when creating or updating a product.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductInput {
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Unit price.
    #[schema(value_type = f64)]
    pub price: Decimal,
    /// Category name.
    pub category: String,
    /// Image URL.
    #[serde(default)]
    pub image: String,
    /// Units in stock.
    pub stock: i32,
}

impl ProductInput {
    /// Builds the product this input describes under the given id.
    #[must_use]
    pub fn into_product(self, id: i32) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            category: self.category,
            image: self.image,
            stock: self.stock,
        }
    }
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            category: product.category.clone(),
            image: product.image.clone(),
            stock: product.stock,
        }
    }
}

/// Query parameters accepted by the product listing.
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductListParams {
    /// Exact category, or `all` for every category.
    pub category: Option<String>,
    /// Case-insensitive search over name and description.
    pub search: Option<String>,
    /// One of `price-asc`, `price-desc`, `name-asc`, `name-desc`.
    pub sort: Option<String>,
}

// ============================================================================
// Orders
// ============================================================================

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, not yet processed.
    #[default]
    Pending,
    /// Being prepared.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Received by the customer.
    Delivered,
    /// Cancelled.
    Cancelled,
}

impl OrderStatus {
    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!(
                "unknown status '{}', expected one of pending, processing, shipped, delivered, cancelled",
                other
            )),
        }
    }
}

/// Customer contact and shipping details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Shipping address.
    pub address: String,
}

/// A line of a stored order, snapshotted from the catalog at placement time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    /// Product identifier.
    pub id: i32,
    /// Product name at placement time.
    pub name: String,
    /// Unit price at placement time.
    #[schema(value_type = f64)]
    pub price: Decimal,
    /// Ordered quantity.
    pub quantity: i32,
}

/// A stored order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Opaque order identifier.
    pub id: Uuid,
    /// Human-facing sequential number, e.g. `VUE-1001`.
    pub order_number: String,
    /// Customer details.
    pub customer: Customer,
    /// Ordered lines.
    pub items: Vec<OrderItem>,
    /// Items subtotal as supplied by the client.
    #[schema(value_type = f64)]
    pub subtotal: Decimal,
    /// Shipping cost as supplied by the client.
    #[schema(value_type = f64)]
    pub shipping: Decimal,
    /// Tax as supplied by the client.
    #[schema(value_type = f64)]
    pub tax: Decimal,
    /// Grand total as supplied by the client.
    #[schema(value_type = f64)]
    pub total: Decimal,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// A requested order line. Only `id` and `quantity` are trusted; any name or
/// price sent by the client is ignored in favour of the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    /// Product identifier.
    pub id: i32,
    /// Requested quantity.
    pub quantity: i32,
}

/// Request body for placing an order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    /// Customer details.
    pub customer: Customer,
    /// Requested lines.
    pub items: Vec<OrderItemRequest>,
    /// Items subtotal.
    #[schema(value_type = f64)]
    pub subtotal: Decimal,
    /// Shipping cost.
    #[schema(value_type = f64)]
    pub shipping: Decimal,
    /// Tax.
    #[schema(value_type = f64)]
    pub tax: Decimal,
    /// Grand total.
    #[schema(value_type = f64)]
    pub total: Decimal,
}

/// Summary returned after an order is placed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    /// Opaque order identifier.
    pub order_id: Uuid,
    /// Human-facing order number.
    pub order_number: String,
    /// Grand total.
    #[schema(value_type = f64)]
    pub total: Decimal,
    /// Initial status.
    pub status: OrderStatus,
}

impl From<&Order> for OrderConfirmation {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id,
            order_number: order.order_number.clone(),
            total: order.total,
            status: order.status,
        }
    }
}

/// Request body for changing an order's status.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// New status name.
    pub status: String,
}

// ============================================================================
// Users and authentication
// ============================================================================

/// User role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Shop administrator.
    Admin,
    /// Regular customer.
    Customer,
}

impl Role {
    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Customer => "customer",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "customer" => Ok(Self::Customer),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// A user as exposed by the API. The password hash never leaves the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// User identifier.
    pub id: i32,
    /// Unique login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Role.
    pub role: Role,
}

/// Login credentials.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

/// Payload returned on successful login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginData {
    /// Authenticated user.
    pub user: User,
    /// Bearer token for subsequent requests.
    pub token: String,
}

// ============================================================================
// Admin
// ============================================================================

/// Store-wide counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    /// Number of products.
    pub products: i64,
    /// Number of users.
    pub users: i64,
    /// Number of orders.
    pub orders: i64,
    /// Sum of all order totals.
    #[schema(value_type = f64)]
    pub total_value: Decimal,
}

/// Full data dump returned by the export endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExportData {
    /// All products.
    pub products: Vec<Product>,
    /// All users, without password hashes.
    pub users: Vec<User>,
    /// All orders.
    pub orders: Vec<Order>,
}

/// Credentials for probing an arbitrary PostgreSQL server.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConnectionTestRequest {
    /// Server host name.
    pub host: String,
    /// Server port.
    pub port: String,
    /// Database name.
    pub database: String,
    /// Login role.
    pub username: String,
    /// Password.
    #[serde(default)]
    pub password: String,
}

// ============================================================================
// Response envelopes
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Human-readable message.
    pub message: String,
    /// Active storage backend (`postgres` or `memory`).
    pub backend: String,
    /// Service version.
    pub version: String,
}

/// Envelope carrying a single payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct DataResponse<T> {
    /// Always `true`.
    pub success: bool,
    /// Payload.
    pub data: T,
    /// Optional human-readable message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> DataResponse<T> {
    /// Wraps a payload.
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    /// Wraps a payload with a message.
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: Some(message.into()),
        }
    }
}

/// Envelope carrying a list and its length.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListResponse<T> {
    /// Always `true`.
    pub success: bool,
    /// Items.
    pub data: Vec<T>,
    /// Number of items.
    pub total: usize,
}

impl<T> ListResponse<T> {
    /// Wraps a list.
    pub fn new(data: Vec<T>) -> Self {
        let total = data.len();
        Self {
            success: true,
            data,
            total,
        }
    }
}

/// Envelope for operations without a payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Always `true`.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
}

impl MessageResponse {
    /// Builds a success message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
