//! Error types for the REST API.

use crate::auth::AuthError;
use crate::orders::{OrderValidationError, PlaceOrderError};
use crate::store::StoreError;
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

#[cfg(test)]
mod tests;

/// API error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Short error label.
    pub error: String,
    /// Error detail.
    pub message: String,
    /// Machine-readable error code.
    pub code: String,
}

/// API error types.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or invalid request.
    #[error("{0}")]
    Validation(String),

    /// An order line references a product that does not exist.
    #[error("Product with ID {0} does not exist")]
    UnknownProduct(i32),

    /// Not enough stock for an order line.
    #[error("Product {product_id} only has {available} items in stock ({requested} requested)")]
    InsufficientStock {
        /// Product identifier.
        product_id: i32,
        /// Units in stock.
        available: i32,
        /// Units requested.
        requested: i64,
    },

    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// User not found.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Missing or invalid credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("{0}")]
    Forbidden(String),

    /// The store cannot be reached.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status, short label and code for this error.
    #[must_use]
    pub fn parts(&self) -> (StatusCode, &'static str, &'static str) {
        match self {
            ApiError::Validation(_) => {
                (StatusCode::BAD_REQUEST, "Invalid request", "VALIDATION_ERROR")
            }
            ApiError::UnknownProduct(_) => {
                (StatusCode::BAD_REQUEST, "Product not found", "UNKNOWN_PRODUCT")
            }
            ApiError::InsufficientStock { .. } => {
                (StatusCode::BAD_REQUEST, "Insufficient stock", "INSUFFICIENT_STOCK")
            }
            ApiError::ProductNotFound(_) => {
                (StatusCode::NOT_FOUND, "Product not found", "PRODUCT_NOT_FOUND")
            }
            ApiError::OrderNotFound(_) => {
                (StatusCode::NOT_FOUND, "Order not found", "ORDER_NOT_FOUND")
            }
            ApiError::UserNotFound(_) => {
                (StatusCode::NOT_FOUND, "User not found", "USER_NOT_FOUND")
            }
            ApiError::Unauthorized(_) => {
                (StatusCode::UNAUTHORIZED, "Unauthorized", "UNAUTHORIZED")
            }
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "Forbidden", "FORBIDDEN"),
            ApiError::StoreUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Database not connected",
                "STORE_UNAVAILABLE",
            ),
            ApiError::Database(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "DB error", "DATABASE_ERROR")
            }
            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                "INTERNAL_ERROR",
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, label, code) = self.parts();

        if status.is_server_error() {
            error!(code, "{}", self);
        }

        let body = Json(ErrorResponse {
            success: false,
            error: label.to_string(),
            message: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ProductNotFound(id) => ApiError::UnknownProduct(id),
            StoreError::InsufficientStock {
                product_id,
                available,
                requested,
            } => ApiError::InsufficientStock {
                product_id,
                available,
                requested,
            },
            StoreError::Unavailable(msg) => ApiError::StoreUnavailable(msg),
            StoreError::Database(e) => ApiError::Database(e.to_string()),
            StoreError::Corrupt(msg) => ApiError::Database(msg),
            StoreError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<OrderValidationError> for ApiError {
    fn from(err: OrderValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<PlaceOrderError> for ApiError {
    fn from(err: PlaceOrderError) -> Self {
        match err {
            PlaceOrderError::Invalid(e) => e.into(),
            PlaceOrderError::Store(e) => e.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid credentials".to_string())
            }
            AuthError::Hash(msg) => ApiError::Internal(msg),
            AuthError::Store(e) => e.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}
