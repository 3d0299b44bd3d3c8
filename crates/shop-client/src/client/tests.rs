//! Unit tests for client module.

use super::*;

// ============================================================================
// ClientConfig Tests
// ============================================================================

#[test]
fn test_client_config_default() {
    let config = ClientConfig::default();

    assert_eq!(config.base_url, "http://localhost:5000");
    assert_eq!(config.timeout, Duration::from_secs(30));
}

#[test]
fn test_client_config_custom() {
    let config = ClientConfig {
        base_url: "http://shop.example.com:9000".to_string(),
        timeout: Duration::from_secs(60),
    };

    assert_eq!(config.base_url, "http://shop.example.com:9000");
    assert_eq!(config.timeout, Duration::from_secs(60));
}

// ============================================================================
// ShopClient Creation Tests
// ============================================================================

#[test]
fn test_shop_client_new() {
    assert!(ShopClient::new(ClientConfig::default()).is_ok());
}

#[test]
fn test_shop_client_invalid_base_url() {
    let result = ShopClient::with_base_url("not a url");
    assert!(matches!(result, Err(Error::InvalidUrl(_))));
}

#[test]
fn test_endpoint_trailing_slash_trimmed() {
    let client = ShopClient::with_base_url("http://localhost:5000/").unwrap();

    assert_eq!(
        client.endpoint("/api/products").unwrap().as_str(),
        "http://localhost:5000/api/products"
    );
}

#[test]
fn test_endpoint_keeps_base_path() {
    let client = ShopClient::with_base_url("https://example.com/shop").unwrap();

    assert_eq!(
        client.endpoint("/api/orders/VUE-1001").unwrap().as_str(),
        "https://example.com/shop/api/orders/VUE-1001"
    );
}

#[test]
fn test_with_token_does_not_mutate_original() {
    let client = ShopClient::with_base_url("http://localhost:5000").unwrap();
    let authed = client.with_token("abc123");

    assert_eq!(authed.token(), Some("abc123"));
    assert_eq!(client.token(), None);
}

// ============================================================================
// Error Body Tests
// ============================================================================

#[test]
fn test_error_message_from_envelope() {
    let body = r#"{"success":false,"error":"Order not found","message":"Order not found: VUE-9999","code":"ORDER_NOT_FOUND"}"#;
    assert_eq!(error_message(body), "Order not found: VUE-9999");
}

#[test]
fn test_error_message_falls_back_to_text() {
    assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
}
