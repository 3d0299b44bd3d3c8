//! Unit tests for error module.

use super::*;
use axum::body::to_bytes;

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// ErrorResponse Tests
// ============================================================================

#[test]
fn test_error_response_serialization() {
    let response = ErrorResponse {
        success: false,
        error: "Order not found".to_string(),
        message: "Order not found: VUE-9999".to_string(),
        code: "ORDER_NOT_FOUND".to_string(),
    };

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("\"success\":false"));
    assert!(json.contains("\"error\":\"Order not found\""));
    assert!(json.contains("\"message\":\"Order not found: VUE-9999\""));
    assert!(json.contains("\"code\":\"ORDER_NOT_FOUND\""));
}

// ============================================================================
// ApiError Display Tests
// ============================================================================

#[test]
fn test_api_error_unknown_product_display() {
    let error = ApiError::UnknownProduct(42);
    assert_eq!(format!("{}", error), "Product with ID 42 does not exist");
}

#[test]
fn test_api_error_insufficient_stock_display() {
    let error = ApiError::InsufficientStock {
        product_id: 3,
        available: 15,
        requested: 20,
    };
    assert_eq!(
        format!("{}", error),
        "Product 3 only has 15 items in stock (20 requested)"
    );
}

#[test]
fn test_api_error_validation_display() {
    let error = ApiError::Validation("order must contain at least one item".to_string());
    assert_eq!(format!("{}", error), "order must contain at least one item");
}

#[test]
fn test_api_error_database_display() {
    let error = ApiError::Database("connection reset".to_string());
    assert_eq!(format!("{}", error), "Database error: connection reset");
}

// ============================================================================
// ApiError IntoResponse Tests
// ============================================================================

#[test]
fn test_api_error_status_codes() {
    let cases = [
        (ApiError::Validation(String::new()), StatusCode::BAD_REQUEST),
        (ApiError::UnknownProduct(1), StatusCode::BAD_REQUEST),
        (
            ApiError::InsufficientStock {
                product_id: 1,
                available: 0,
                requested: 1,
            },
            StatusCode::BAD_REQUEST,
        ),
        (ApiError::ProductNotFound("1".to_string()), StatusCode::NOT_FOUND),
        (ApiError::OrderNotFound("x".to_string()), StatusCode::NOT_FOUND),
        (ApiError::UserNotFound("1".to_string()), StatusCode::NOT_FOUND),
        (ApiError::Unauthorized(String::new()), StatusCode::UNAUTHORIZED),
        (ApiError::Forbidden(String::new()), StatusCode::FORBIDDEN),
        (
            ApiError::StoreUnavailable(String::new()),
            StatusCode::SERVICE_UNAVAILABLE,
        ),
        (
            ApiError::Database(String::new()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        (
            ApiError::Internal(String::new()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (error, status) in cases {
        assert_eq!(error.into_response().status(), status);
    }
}

#[tokio::test]
async fn test_api_error_into_response_body() {
    let response = ApiError::OrderNotFound("VUE-9999".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Order not found");
    assert_eq!(body["message"], "Order not found: VUE-9999");
    assert_eq!(body["code"], "ORDER_NOT_FOUND");
}

#[tokio::test]
async fn test_unknown_product_uses_product_not_found_label() {
    let body = body_json(ApiError::UnknownProduct(99).into_response()).await;
    assert_eq!(body["error"], "Product not found");
    assert_eq!(body["code"], "UNKNOWN_PRODUCT");
}

// ============================================================================
// Conversion Tests
// ============================================================================

#[test]
fn test_from_store_error() {
    assert!(matches!(
        ApiError::from(StoreError::ProductNotFound(7)),
        ApiError::UnknownProduct(7)
    ));
    assert!(matches!(
        ApiError::from(StoreError::Unavailable("down".to_string())),
        ApiError::StoreUnavailable(_)
    ));
    assert!(matches!(
        ApiError::from(StoreError::Corrupt("bad status".to_string())),
        ApiError::Database(_)
    ));
    assert!(matches!(
        ApiError::from(StoreError::from(sqlx::Error::PoolTimedOut)),
        ApiError::StoreUnavailable(_)
    ));
}

#[test]
fn test_from_place_order_error() {
    let error: ApiError = PlaceOrderError::Invalid(OrderValidationError::NoItems).into();
    assert!(matches!(error, ApiError::Validation(ref msg) if msg.contains("at least one item")));

    let error: ApiError = PlaceOrderError::Store(StoreError::InsufficientStock {
        product_id: 3,
        available: 15,
        requested: 20,
    })
    .into();
    assert!(matches!(
        error,
        ApiError::InsufficientStock {
            product_id: 3,
            available: 15,
            requested: 20
        }
    ));
}

#[test]
fn test_from_auth_error() {
    assert!(matches!(
        ApiError::from(AuthError::InvalidCredentials),
        ApiError::Unauthorized(_)
    ));
    assert!(matches!(
        ApiError::from(AuthError::Hash("boom".to_string())),
        ApiError::Internal(_)
    ));
}

#[test]
fn test_api_error_debug() {
    let error = ApiError::UserNotFound("12".to_string());
    let debug = format!("{:?}", error);
    assert!(debug.contains("UserNotFound"));
}
