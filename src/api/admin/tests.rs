//! Admin handler tests against an in-memory state.

use super::*;
use crate::models::{Customer, CreateOrderRequest, OrderItemRequest, Role};
use rust_decimal_macros::dec;

fn create_test_state() -> Arc<AppState> {
    Arc::new(AppState::in_memory())
}

fn input(name: &str, stock: i32) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        description: "Limited edition".to_string(),
        price: dec!(59.00),
        category: "clothing".to_string(),
        image: String::new(),
        stock,
    }
}

async fn place_order(state: &Arc<AppState>) {
    let request = CreateOrderRequest {
        customer: Customer {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            address: "1 Engine Rd".to_string(),
        },
        items: vec![OrderItemRequest { id: 2, quantity: 1 }],
        subtotal: dec!(39.99),
        shipping: dec!(5),
        tax: dec!(3.20),
        total: dec!(48.19),
    };
    state
        .orders
        .place(state.store.as_ref(), request)
        .await
        .unwrap();
}

// ============================================================================
// Stats / Users / Export
// ============================================================================

#[tokio::test]
async fn test_stats_counts_everything() {
    let state = create_test_state();
    place_order(&state).await;

    let stats = get_stats(State(state)).await.unwrap().0.data;
    assert_eq!(stats.products, 9);
    assert_eq!(stats.users, 3);
    assert_eq!(stats.orders, 1);
    assert_eq!(stats.total_value, dec!(48.19));
}

#[tokio::test]
async fn test_list_users_has_no_hashes() {
    let response = list_users(State(create_test_state())).await.unwrap().0;
    assert_eq!(response.total, 3);
    assert_eq!(response.data[0].username, "admin");
    assert_eq!(response.data[0].role, Role::Admin);

    let json = serde_json::to_string(&response).unwrap();
    assert!(!json.contains("argon2"));
    assert!(!json.contains("password"));
}

#[tokio::test]
async fn test_delete_user_revokes_sessions() {
    let state = create_test_state();
    let john = state
        .store
        .find_credentials("john")
        .await
        .unwrap()
        .unwrap()
        .user;
    let token = state.sessions.open(john.clone());

    delete_user(State(state.clone()), Ok(Path(john.id)))
        .await
        .unwrap();
    assert!(state.sessions.resolve(&token).is_none());

    let again = delete_user(State(state), Ok(Path(john.id))).await;
    assert!(matches!(again, Err(ApiError::UserNotFound(_))));
}

#[tokio::test]
async fn test_export_contains_all_entities() {
    let state = create_test_state();
    place_order(&state).await;

    let export = export_data(State(state)).await.unwrap().0.data;
    assert_eq!(export.products.len(), 9);
    assert_eq!(export.users.len(), 3);
    assert_eq!(export.orders.len(), 1);
}

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
async fn test_product_crud() {
    let state = create_test_state();

    let (status, Json(created)) =
        create_product(State(state.clone()), Ok(Json(input("Ferris Plush", 12))))
            .await
            .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    let id = created.data.id;
    assert_eq!(id, 10);

    let updated = update_product(
        State(state.clone()),
        Ok(Path(id)),
        Ok(Json(input("Ferris Plush XL", 4))),
    )
    .await
    .unwrap()
    .0
    .data;
    assert_eq!(updated.name, "Ferris Plush XL");
    assert_eq!(updated.stock, 4);

    delete_product(State(state.clone()), Ok(Path(id)))
        .await
        .unwrap();
    assert!(state.store.get_product(id).await.unwrap().is_none());

    let missing = delete_product(State(state), Ok(Path(id))).await;
    assert!(matches!(missing, Err(ApiError::ProductNotFound(_))));
}

#[tokio::test]
async fn test_create_product_rejects_negative_stock() {
    let result =
        create_product(State(create_test_state()), Ok(Json(input("Broken", -1)))).await;
    assert!(matches!(result, Err(ApiError::Validation(_))));
}

#[tokio::test]
async fn test_create_product_rejects_sub_cent_price() {
    let mut product = input("Fractional", 1);
    product.price = dec!(12.345);
    let result = create_product(State(create_test_state()), Ok(Json(product))).await;
    assert!(matches!(result, Err(ApiError::Validation(_))));
}

#[tokio::test]
async fn test_update_missing_product() {
    let result = update_product(
        State(create_test_state()),
        Ok(Path(999)),
        Ok(Json(input("Ghost", 1))),
    )
    .await;
    assert!(matches!(result, Err(ApiError::ProductNotFound(_))));
}

#[tokio::test]
async fn test_deleting_product_keeps_order_snapshot() {
    let state = create_test_state();
    place_order(&state).await;

    delete_product(State(state.clone()), Ok(Path(2)))
        .await
        .unwrap();

    let orders = state.store.list_orders().await.unwrap();
    assert_eq!(orders[0].items[0].id, 2);
    assert_eq!(orders[0].items[0].name, "JavaScript Book");
}

// ============================================================================
// Seed / Clear
// ============================================================================

#[tokio::test]
async fn test_clear_then_seed() {
    let state = create_test_state();
    place_order(&state).await;
    let token = state.sessions.open(
        state
            .store
            .find_credentials("jane")
            .await
            .unwrap()
            .unwrap()
            .user,
    );

    clear_data(State(state.clone())).await.unwrap();
    let stats = state.store.stats().await.unwrap();
    assert_eq!((stats.products, stats.users, stats.orders), (0, 0, 0));
    assert!(state.sessions.resolve(&token).is_none());

    let response = seed_data(State(state.clone())).await.unwrap().0;
    assert!(response.message.contains("9 products"));
    assert!(response.message.contains("3 users"));

    let response = seed_data(State(state)).await.unwrap().0;
    assert!(response.message.contains("0 products"));
}

// ============================================================================
// Connection Test
// ============================================================================

#[tokio::test]
async fn test_connection_rejects_bad_port() {
    let request = ConnectionTestRequest {
        host: "localhost".to_string(),
        port: "fifty-four".to_string(),
        database: "shop".to_string(),
        username: "postgres".to_string(),
        password: String::new(),
    };
    let result = test_connection(State(create_test_state()), Ok(Json(request))).await;
    assert!(matches!(result, Err(ApiError::Validation(_))));
}

#[tokio::test]
async fn test_connection_rejects_missing_host() {
    let request = ConnectionTestRequest {
        host: " ".to_string(),
        port: "5432".to_string(),
        database: "shop".to_string(),
        username: "postgres".to_string(),
        password: String::new(),
    };
    let result = test_connection(State(create_test_state()), Ok(Json(request))).await;
    assert!(matches!(result, Err(ApiError::Validation(_))));
}
