//! Health check endpoint tests.

use shop_tests::create_test_client;

#[tokio::test]
async fn test_health_check() {
    let client = create_test_client().expect("Failed to create client");

    let health = client.health_check().await.expect("Health check failed");

    assert_eq!(health.status, "OK");
    assert!(health.backend == "postgres" || health.backend == "memory");
    assert!(!health.version.is_empty());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let client = create_test_client().expect("Failed to create client");
    let url = client.endpoint("/api/nope").expect("Invalid URL");

    let resp = reqwest::get(url).await.expect("Request failed");
    assert_eq!(resp.status().as_u16(), 404);
}
