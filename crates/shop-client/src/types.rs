//! Request and response types for the shop API.

use serde::{Deserialize, Serialize};


/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, not yet processed.
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

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Shipped => write!(f, "shipped"),
            Self::Delivered => write!(f, "delivered"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Administrator.
    Admin,
    /// Regular shopper.
    Customer,
}

// ============================================================================
// Envelopes
// ============================================================================

/// `{success, data, message?}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    /// Always `true` on success.
    pub success: bool,
    /// Payload.
    pub data: T,
    /// Optional human-readable message.
    #[serde(default)]
    pub message: Option<String>,
}

/// `{success, data, total}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    /// Always `true` on success.
    pub success: bool,
    /// Items.
    pub data: Vec<T>,
    /// Number of items in `data`.
    pub total: usize,
}

/// `{success, message}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Always `true` on success.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
}

/// Error body returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Short error label.
    pub error: String,
    /// Error detail.
    pub message: String,
    /// Machine-readable error code.
    #[serde(default)]
    pub code: String,
}

// ============================================================================
// Health
// ============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Status message.
    pub message: String,
    /// Active storage backend (`postgres` or `memory`).
    pub backend: String,
    /// Service version.
    pub version: String,
}

// ============================================================================
// Products
// ============================================================================

/// Catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier.
    pub id: i32,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Unit price.
    pub price: f64,
    /// Category.
    pub category: String,
    /// Image URL.
    pub image: String,
    /// Units in stock.
    pub stock: i32,
}

/// Product fields for admin create and update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductInput {
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Unit price.
    pub price: f64,
    /// Category.
    pub category: String,
    /// Image URL.
    pub image: String,
    /// Units in stock.
    pub stock: i32,
}

/// Query parameters for listing products.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductQuery {
    /// Category filter; `all` disables it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Case-insensitive search over name and description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// One of `price-asc`, `price-desc`, `name-asc`, `name-desc`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

impl ProductQuery {
    /// Query filtering by category.
    #[must_use]
    pub fn category(category: &str) -> Self {
        Self {
            category: Some(category.to_string()),
            ..Default::default()
        }
    }

    /// Query searching name and description.
    #[must_use]
    pub fn search(term: &str) -> Self {
        Self {
            search: Some(term.to_string()),
            ..Default::default()
        }
    }

    /// Adds a sort order.
    #[must_use]
    pub fn sorted(mut self, sort: &str) -> Self {
        self.sort = Some(sort.to_string());
        self
    }
}

// ============================================================================
// Orders
// ============================================================================

/// Customer details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Shipping address.
    pub address: String,
}

/// Requested order line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderItemRequest {
    /// Product identifier.
    pub id: i32,
    /// Units requested.
    pub quantity: i32,
}

/// Order placement request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    /// Customer details.
    pub customer: Customer,
    /// Order lines.
    pub items: Vec<OrderItemRequest>,
    /// Items total.
    pub subtotal: f64,
    /// Shipping cost.
    pub shipping: f64,
    /// Tax.
    pub tax: f64,
    /// Grand total.
    pub total: f64,
}

/// Confirmation returned when an order is placed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    /// Order identifier (UUID).
    pub order_id: String,
    /// Human-facing order number.
    pub order_number: String,
    /// Grand total.
    pub total: f64,
    /// Initial status.
    pub status: OrderStatus,
}

/// Order line snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product identifier.
    pub id: i32,
    /// Product name at order time.
    pub name: String,
    /// Unit price at order time.
    pub price: f64,
    /// Units ordered.
    pub quantity: i32,
}

/// Stored order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order identifier (UUID).
    pub id: String,
    /// Human-facing order number.
    pub order_number: String,
    /// Customer details.
    pub customer: Customer,
    /// Order lines.
    pub items: Vec<OrderItem>,
    /// Items total.
    pub subtotal: f64,
    /// Shipping cost.
    pub shipping: f64,
    /// Tax.
    pub tax: f64,
    /// Grand total.
    pub total: f64,
    /// Current status.
    pub status: OrderStatus,
    /// Creation time (RFC 3339).
    pub created_at: String,
    /// Last update time (RFC 3339).
    pub updated_at: String,
}

/// Status update request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    /// New status.
    pub status: String,
}

// ============================================================================
// Auth
// ============================================================================

/// Public user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// User identifier.
    pub id: i32,
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Role.
    pub role: Role,
}

/// Login request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Successful login payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginData {
    /// Authenticated user.
    pub user: User,
    /// Bearer token.
    pub token: String,
}

// ============================================================================
// Admin
// ============================================================================

/// Store-wide counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    /// Number of products.
    pub products: i64,
    /// Number of users.
    pub users: i64,
    /// Number of orders.
    pub orders: i64,
    /// Sum of order totals.
    pub total_value: f64,
}

/// Full data dump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportData {
    /// All products.
    pub products: Vec<Product>,
    /// All users.
    pub users: Vec<User>,
    /// All orders.
    pub orders: Vec<Order>,
}

/// Credentials for the connection probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
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
    pub password: String,
}
