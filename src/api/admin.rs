//! Admin handlers: catalog maintenance, users, bulk data operations and
//! connection probing.

use crate::catalog::validate_product_input;
use crate::db::probe;
use crate::error::{ApiError, ErrorResponse};
use crate::models::{
    AdminStats, ConnectionTestRequest, DataResponse, ExportData, ListResponse, MessageResponse,
    Product, ProductInput, User,
};
use crate::state::AppState;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Path, State},
    http::StatusCode,
};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[cfg(test)]
mod tests;

fn product_id(id: Result<Path<i32>, PathRejection>) -> Result<i32, ApiError> {
    id.map(|Path(id)| id)
        .map_err(|_| ApiError::Validation("Invalid product ID".to_string()))
}

// ============================================================================
// Connection Test
// ============================================================================

/// Probe arbitrary PostgreSQL credentials.
#[utoipa::path(
    post,
    path = "/api/admin/test-connection",
    request_body = ConnectionTestRequest,
    responses(
        (status = 200, description = "Connection succeeded; data is the server version", body = DataResponse<String>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Connection test failed", body = ErrorResponse)
    ),
    tag = "Admin"
)]
pub async fn test_connection(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ConnectionTestRequest>, JsonRejection>,
) -> Result<Json<DataResponse<String>>, ApiError> {
    let Json(request) = body?;
    if request.host.trim().is_empty() || request.database.trim().is_empty() {
        return Err(ApiError::Validation(
            "host and database are required".to_string(),
        ));
    }
    let port: u16 = request
        .port
        .trim()
        .parse()
        .map_err(|_| ApiError::Validation(format!("'{}' is not a valid port", request.port)))?;

    let options = PgConnectOptions::new()
        .host(request.host.trim())
        .port(port)
        .username(&request.username)
        .password(&request.password)
        .database(request.database.trim())
        .ssl_mode(PgSslMode::Disable);
    let timeout = Duration::from_secs(state.config.database.connect_timeout_secs);

    match probe(options, timeout).await {
        Ok(version) => Ok(Json(DataResponse::with_message(
            version,
            "Database connection successful",
        ))),
        Err(e) => {
            warn!(host = %request.host, port, "Connection test failed: {}", e);
            Err(ApiError::Database(format!("Connection test failed: {}", e)))
        }
    }
}

// ============================================================================
// Statistics and Export
// ============================================================================

/// Store-wide counters.
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Counters", body = DataResponse<AdminStats>)
    ),
    tag = "Admin"
)]
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DataResponse<AdminStats>>, ApiError> {
    Ok(Json(DataResponse::new(state.store.stats().await?)))
}

/// Dump every product, user and order.
#[utoipa::path(
    get,
    path = "/api/admin/export",
    responses(
        (status = 200, description = "Full export", body = DataResponse<ExportData>)
    ),
    tag = "Admin"
)]
pub async fn export_data(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DataResponse<ExportData>>, ApiError> {
    Ok(Json(DataResponse::new(state.store.export().await?)))
}

// ============================================================================
// Users
// ============================================================================

/// List users ordered by id.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "Users", body = ListResponse<User>)
    ),
    tag = "Admin"
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListResponse<User>>, ApiError> {
    Ok(Json(ListResponse::new(state.store.list_users().await?)))
}

/// Delete a user and close their sessions.
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, description = "Invalid user ID", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Admin"
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = id.map_err(|_| ApiError::Validation("Invalid user ID".to_string()))?;
    if !state.store.delete_user(id).await? {
        return Err(ApiError::UserNotFound(id.to_string()));
    }
    let revoked = state.sessions.revoke_user(id);
    info!(user_id = id, revoked, "User deleted");
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

// ============================================================================
// Products
// ============================================================================

/// Create a product.
#[utoipa::path(
    post,
    path = "/api/admin/products",
    request_body = ProductInput,
    responses(
        (status = 201, description = "Product created", body = DataResponse<Product>),
        (status = 400, description = "Invalid product data", body = ErrorResponse)
    ),
    tag = "Admin"
)]
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ProductInput>, JsonRejection>,
) -> Result<(StatusCode, Json<DataResponse<Product>>), ApiError> {
    let Json(input) = body?;
    validate_product_input(&input).map_err(ApiError::Validation)?;

    let product = state.store.create_product(input).await?;
    info!(id = product.id, name = %product.name, "Product created");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(
            product,
            "Product created successfully",
        )),
    ))
}

/// Replace a product's fields.
#[utoipa::path(
    put,
    path = "/api/admin/products/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    request_body = ProductInput,
    responses(
        (status = 200, description = "Product updated", body = DataResponse<Product>),
        (status = 400, description = "Invalid product data", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    tag = "Admin"
)]
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
    body: Result<Json<ProductInput>, JsonRejection>,
) -> Result<Json<DataResponse<Product>>, ApiError> {
    let id = product_id(id)?;
    let Json(input) = body?;
    validate_product_input(&input).map_err(ApiError::Validation)?;

    let product = state
        .store
        .update_product(id, input)
        .await?
        .ok_or_else(|| ApiError::ProductNotFound(id.to_string()))?;
    info!(id, "Product updated");
    Ok(Json(DataResponse::with_message(
        product,
        "Product updated successfully",
    )))
}

/// Delete a product. Historical order lines are unaffected.
#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    tag = "Admin"
)]
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = product_id(id)?;
    if !state.store.delete_product(id).await? {
        return Err(ApiError::ProductNotFound(id.to_string()));
    }
    info!(id, "Product deleted");
    Ok(Json(MessageResponse::new("Product deleted successfully")))
}

// ============================================================================
// Bulk Operations
// ============================================================================

/// Insert the mock catalog and demo users, skipping existing ones.
#[utoipa::path(
    post,
    path = "/api/admin/seed",
    responses(
        (status = 200, description = "Seeded", body = MessageResponse)
    ),
    tag = "Admin"
)]
pub async fn seed_data(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let report = state.store.seed().await?;
    Ok(Json(MessageResponse::new(format!(
        "Database seeded successfully ({} products, {} users added)",
        report.products, report.users
    ))))
}

/// Delete all orders, products and users, and close every session.
#[utoipa::path(
    post,
    path = "/api/admin/clear",
    responses(
        (status = 200, description = "Cleared", body = MessageResponse)
    ),
    tag = "Admin"
)]
pub async fn clear_data(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.store.clear().await?;
    state.sessions.clear();
    warn!("All shop data cleared");
    Ok(Json(MessageResponse::new("Database cleared successfully")))
}
