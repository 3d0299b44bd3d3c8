//! Database row types and their mapping to domain models.

use crate::models::{Customer, Order, OrderItem, OrderStatus, Product, Role, User};
use crate::store::UserCredentials;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// Column list selected for products.
pub const PRODUCT_COLUMNS: &str = "id, name, description, price, category, image, stock";

/// Column list selected for orders.
pub const ORDER_COLUMNS: &str = "id, order_number, customer_name, customer_email, \
     customer_address, subtotal, shipping, tax, total, status, created_at, updated_at";

/// Product record from the database.
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    /// Unique identifier.
    pub id: i32,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Unit price.
    pub price: Decimal,
    /// Category.
    pub category: String,
    /// Image URL.
    pub image: String,
    /// Units in stock.
    pub stock: i32,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            category: row.category,
            image: row.image,
            stock: row.stock,
        }
    }
}

/// User record from the database, including the password hash.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    /// Unique identifier.
    pub id: i32,
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Role name.
    pub role: String,
    /// Argon2 PHC string.
    pub password_hash: String,
}

impl UserRow {
    /// Splits the row into the public user and its hash.
    ///
    /// # Errors
    /// Returns a description of the problem if the stored role is unknown.
    pub fn into_credentials(self) -> Result<UserCredentials, String> {
        let role: Role = self.role.parse()?;
        Ok(UserCredentials {
            user: User {
                id: self.id,
                username: self.username,
                email: self.email,
                name: self.name,
                role,
            },
            password_hash: self.password_hash,
        })
    }
}

/// Order header record from the database.
#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
    /// Unique identifier.
    pub id: Uuid,
    /// Human-facing number.
    pub order_number: String,
    /// Customer name.
    pub customer_name: String,
    /// Customer email.
    pub customer_email: String,
    /// Shipping address.
    pub customer_address: String,
    /// Subtotal.
    pub subtotal: Decimal,
    /// Shipping.
    pub shipping: Decimal,
    /// Tax.
    pub tax: Decimal,
    /// Total.
    pub total: Decimal,
    /// Status name.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl OrderRow {
    /// Combines the header with its lines.
    ///
    /// # Errors
    /// Returns a description of the problem if the stored status is unknown.
    pub fn into_order(self, items: Vec<OrderItem>) -> Result<Order, String> {
        let status: OrderStatus = self.status.parse()?;
        Ok(Order {
            id: self.id,
            order_number: self.order_number,
            customer: Customer {
                name: self.customer_name,
                email: self.customer_email,
                address: self.customer_address,
            },
            items,
            subtotal: self.subtotal,
            shipping: self.shipping,
            tax: self.tax,
            total: self.total,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Order line record from the database.
#[derive(Debug, Clone, FromRow)]
pub struct OrderItemRow {
    /// Owning order.
    pub order_id: Uuid,
    /// Product identifier at placement time.
    pub product_id: i32,
    /// Product name at placement time.
    pub name: String,
    /// Unit price at placement time.
    pub price: Decimal,
    /// Quantity.
    pub quantity: i32,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: row.product_id,
            name: row.name,
            price: row.price,
            quantity: row.quantity,
        }
    }
}
