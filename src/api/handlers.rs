//! HTTP request handlers for the public API.

use crate::api::middleware::{CurrentUser, authorization_header};
use crate::auth::authenticate;
use crate::catalog::ProductQuery;
use crate::error::{ApiError, ErrorResponse};
use crate::models::{
    CreateOrderRequest, DataResponse, HealthResponse, ListResponse, LoginData, LoginRequest,
    MessageResponse, Order, OrderConfirmation, OrderStatus, Product, ProductListParams,
    UpdateStatusRequest, User,
};
use crate::state::AppState;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;


/// Parses an order id path segment. Anything that is not a UUID cannot name
/// an order.
fn parse_order_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::OrderNotFound(raw.to_string()))
}

// ============================================================================
// Health Check
// ============================================================================

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "Shop backend is running".to_string(),
        backend: state.backend_name().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Products
// ============================================================================

/// List products with optional filtering and sorting.
#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductListParams),
    responses(
        (status = 200, description = "Matching products", body = ListResponse<Product>),
        (status = 503, description = "Store unavailable", body = ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProductListParams>,
) -> Result<Json<ListResponse<Product>>, ApiError> {
    let query = ProductQuery::from_params(&params);
    debug!(?query, "Listing products");
    let products = state.store.list_products(&query).await?;
    Ok(Json(ListResponse::new(products)))
}

/// Get a single product.
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product", body = DataResponse<Product>),
        (status = 400, description = "Invalid product ID", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<DataResponse<Product>>, ApiError> {
    let Path(id) = id.map_err(|_| ApiError::Validation("Invalid product ID".to_string()))?;
    let product = state
        .store
        .get_product(id)
        .await?
        .ok_or_else(|| ApiError::ProductNotFound(id.to_string()))?;
    Ok(Json(DataResponse::new(product)))
}

/// List distinct product categories.
#[utoipa::path(
    get,
    path = "/api/products/categories",
    responses(
        (status = 200, description = "Categories in alphabetical order", body = DataResponse<Vec<String>>)
    ),
    tag = "Products"
)]
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DataResponse<Vec<String>>>, ApiError> {
    let categories = state.store.list_categories().await?;
    Ok(Json(DataResponse::new(categories)))
}

// ============================================================================
// Orders
// ============================================================================

/// Place an order.
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = DataResponse<OrderConfirmation>),
        (status = 400, description = "Invalid order, unknown product or insufficient stock", body = ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DataResponse<OrderConfirmation>>), ApiError> {
    let Json(request) = body?;
    let order = state.orders.place(state.store.as_ref(), request).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(
            OrderConfirmation::from(&order),
            "Order created successfully",
        )),
    ))
}

/// List all orders, newest first.
#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "All orders", body = ListResponse<Order>)
    ),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListResponse<Order>>, ApiError> {
    let orders = state.store.list_orders().await?;
    Ok(Json(ListResponse::new(orders)))
}

/// Get an order by its order number.
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = String, Path, description = "Order number, e.g. VUE-1001")
    ),
    responses(
        (status = 200, description = "Order", body = DataResponse<Order>),
        (status = 404, description = "Order not found", body = ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(order_number): Path<String>,
) -> Result<Json<DataResponse<Order>>, ApiError> {
    let order = state
        .store
        .get_order_by_number(&order_number)
        .await?
        .ok_or(ApiError::OrderNotFound(order_number))?;
    Ok(Json(DataResponse::new(order)))
}

/// Update an order's status.
#[utoipa::path(
    put,
    path = "/api/orders/{id}/status",
    params(
        ("id" = String, Path, description = "Order ID (UUID)")
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Updated order", body = DataResponse<Order>),
        (status = 400, description = "Unknown status", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
    body: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<DataResponse<Order>>, ApiError> {
    let Json(request) = body?;
    let status: OrderStatus = request.status.parse().map_err(ApiError::Validation)?;
    let id = parse_order_id(&order_id)?;

    let order = state
        .store
        .update_order_status(id, status)
        .await?
        .ok_or(ApiError::OrderNotFound(order_id))?;

    info!(order_number = %order.order_number, %status, "Order status updated");
    Ok(Json(DataResponse::new(order)))
}

/// Delete an order.
#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    params(
        ("id" = String, Path, description = "Order ID (UUID)")
    ),
    responses(
        (status = 200, description = "Order deleted", body = MessageResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn delete_order(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_order_id(&order_id)?;
    if !state.store.delete_order(id).await? {
        return Err(ApiError::OrderNotFound(order_id));
    }
    info!(%id, "Order deleted");
    Ok(Json(MessageResponse::new("Order deleted successfully")))
}

// ============================================================================
// Authentication
// ============================================================================

/// Log in with username and password.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = DataResponse<LoginData>),
        (status = 400, description = "Missing username or password", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<DataResponse<LoginData>>, ApiError> {
    let Json(request) = body?;
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::Validation(
            "username and password are required".to_string(),
        ));
    }

    let user = authenticate(
        state.store.as_ref(),
        request.username.trim(),
        &request.password,
    )
    .await?;
    let token = state.sessions.open(user.clone());
    info!(username = %user.username, role = user.role.as_str(), "Login successful");

    Ok(Json(DataResponse::with_message(
        LoginData { user, token },
        "Login successful",
    )))
}

/// Log out. Always succeeds.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse)
    ),
    security(("bearer" = [])),
    tag = "Auth"
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<MessageResponse> {
    if let Some(token) = authorization_header(&headers)
        && state.sessions.close(token)
    {
        debug!("Session closed");
    }
    Json(MessageResponse::new("Logout successful"))
}

/// Get the user behind the bearer token.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = DataResponse<User>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "Auth"
)]
pub async fn current_user(CurrentUser(user): CurrentUser) -> Json<DataResponse<User>> {
    Json(DataResponse::new(user))
}
