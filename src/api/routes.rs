//! Route configuration.

use crate::api::middleware::require_admin;
use crate::api::{admin, handlers};
use crate::state::AppState;
use axum::Router;
use axum::routing::{delete, get, post, put};
use std::sync::Arc;

/// Creates the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Products
        .route("/api/products", get(handlers::list_products))
        .route("/api/products/categories", get(handlers::list_categories))
        .route("/api/products/{id}", get(handlers::get_product))
        // Orders
        .route(
            "/api/orders",
            post(handlers::create_order).get(handlers::list_orders),
        )
        // GET takes an order number, DELETE an order id
        .route(
            "/api/orders/{id}",
            get(handlers::get_order).delete(handlers::delete_order),
        )
        .route(
            "/api/orders/{id}/status",
            put(handlers::update_order_status),
        )
        // Authentication
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/auth/me", get(handlers::current_user))
        // Administration
        .nest("/api/admin", admin_router(state.clone()))
        .with_state(state)
}

fn admin_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/test-connection", post(admin::test_connection))
        .route("/stats", get(admin::get_stats))
        .route("/users", get(admin::list_users))
        .route("/users/{id}", delete(admin::delete_user))
        .route("/products", post(admin::create_product))
        .route(
            "/products/{id}",
            put(admin::update_product).delete(admin::delete_product),
        )
        .route("/seed", post(admin::seed_data))
        .route("/clear", post(admin::clear_data))
        .route("/export", get(admin::export_data))
        .route_layer(axum::middleware::from_fn_with_state(state, require_admin))
}
