//! Shop Backend Server
//!
//! REST API server for the web shop. Uses PostgreSQL when reachable and
//! falls back to a seeded in-memory store otherwise.

use axum::http::{HeaderValue, Method, header};
use shop_backend::api::create_router;
use shop_backend::config::Config;
use shop_backend::db::DatabasePool;
use shop_backend::state::AppState;
use shop_backend::store::{MemoryStore, PgStore, Store};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use shop_backend::error::ErrorResponse;
use shop_backend::models::{
    AdminStats, ConnectionTestRequest, CreateOrderRequest, Customer, ExportData, HealthResponse,
    LoginData, LoginRequest, MessageResponse, Order, OrderConfirmation, OrderItem,
    OrderItemRequest, OrderStatus, Product, ProductInput, Role, UpdateStatusRequest, User,
};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        shop_backend::api::handlers::health_check,
        shop_backend::api::handlers::list_products,
        shop_backend::api::handlers::get_product,
        shop_backend::api::handlers::list_categories,
        shop_backend::api::handlers::create_order,
        shop_backend::api::handlers::list_orders,
        shop_backend::api::handlers::get_order,
        shop_backend::api::handlers::update_order_status,
        shop_backend::api::handlers::delete_order,
        shop_backend::api::handlers::login,
        shop_backend::api::handlers::logout,
        shop_backend::api::handlers::current_user,
        shop_backend::api::admin::test_connection,
        shop_backend::api::admin::get_stats,
        shop_backend::api::admin::export_data,
        shop_backend::api::admin::list_users,
        shop_backend::api::admin::delete_user,
        shop_backend::api::admin::create_product,
        shop_backend::api::admin::update_product,
        shop_backend::api::admin::delete_product,
        shop_backend::api::admin::seed_data,
        shop_backend::api::admin::clear_data,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            MessageResponse,
            Product,
            ProductInput,
            Customer,
            OrderItem,
            OrderItemRequest,
            OrderStatus,
            Order,
            CreateOrderRequest,
            OrderConfirmation,
            UpdateStatusRequest,
            Role,
            User,
            LoginRequest,
            LoginData,
            AdminStats,
            ExportData,
            ConnectionTestRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Products", description = "Product catalog"),
        (name = "Orders", description = "Order placement and management"),
        (name = "Auth", description = "Login, logout and current user"),
        (name = "Admin", description = "Administration"),
    ),
    info(
        title = "Shop Backend API",
        version = "0.1.0",
        description = "REST API for a small web shop",
        license(name = "MIT"),
        contact(name = "Joaquin Bejar", email = "jb@taunais.com")
    )
)]
struct ApiDoc;

/// Registers the bearer token scheme referenced by the auth paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

/// Loads `CONFIG_PATH` (default `config.toml`) if present, then applies
/// environment overrides.
fn load_config() -> anyhow::Result<Config> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    let mut config = if Path::new(&path).exists() {
        info!("Loading configuration from {}", path);
        Config::load(&path)?
    } else {
        info!("No configuration file at {}, using defaults", path);
        Config::default()
    };
    config.apply_env()?;
    Ok(config)
}

/// Connects to PostgreSQL, migrates and seeds an empty database.
async fn connect_postgres(config: &Config) -> anyhow::Result<Arc<dyn Store>> {
    let db = DatabasePool::connect(&config.database).await?;
    db.run_migrations().await?;
    let store = PgStore::new(db);

    let stats = store.stats().await?;
    if stats.products == 0 && stats.users == 0 {
        let report = store.seed().await?;
        info!(
            products = report.products,
            users = report.users,
            "Seeded empty database"
        );
    }

    Ok(Arc::new(store))
}

/// Picks the storage backend once. Any database failure selects the
/// in-memory store.
async fn select_store(config: &Config) -> Arc<dyn Store> {
    match connect_postgres(config).await {
        Ok(store) => {
            info!("Using PostgreSQL backend");
            store
        }
        Err(e) => {
            warn!("Database unavailable ({}), falling back to in-memory store", e);
            Arc::new(MemoryStore::seeded())
        }
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if config.cors.allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(methods)
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ORIGIN,
        ])
        .allow_credentials(true)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config()?;
    let store = select_store(&config).await;

    let state = Arc::new(AppState::new(store, config));
    state.orders.sync_with(state.store.as_ref()).await?;
    info!(
        backend = state.backend_name(),
        next_order = %state.orders.numbering().format(state.orders.numbering().current() + 1),
        "Store ready"
    );

    let host = state.config.server.host.clone();
    let port = state.config.server.port;
    info!("Starting Shop Backend on {}:{}", host, port);
    info!("Swagger UI available at http://{}:{}/swagger-ui/", host, port);

    let cors = cors_layer(&state.config);

    // Build the router
    let app = create_router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start the server
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
