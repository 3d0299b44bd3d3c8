//! Order placement, stock and lifecycle tests.

use futures::future::join_all;
use shop_client::{Error, OrderStatus};
use shop_tests::{create_admin_client, create_test_client, create_test_product, order_request};

#[tokio::test]
async fn test_insufficient_stock_changes_nothing() {
    let admin = create_admin_client().await.expect("Failed to log in");
    let product = create_test_product(&admin, "electronics", 89.99, 15)
        .await
        .expect("Failed to create product");
    let client = create_test_client().expect("Failed to create client");

    let rejected = client.create_order(&order_request(&[(product.id, 20)])).await;
    match rejected {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 400);
            assert!(message.contains("15"));
        }
        other => panic!("Expected insufficient stock, got {:?}", other),
    }
    let unchanged = client.get_product(product.id).await.expect("Failed to get product");
    assert_eq!(unchanged.stock, 15);

    let confirmation = client
        .create_order(&order_request(&[(product.id, 5)]))
        .await
        .expect("Failed to place order");
    assert_eq!(confirmation.status, OrderStatus::Pending);
    assert!(confirmation.order_number.contains('-'));

    let after = client.get_product(product.id).await.expect("Failed to get product");
    assert_eq!(after.stock, 10);

    admin.delete_product(product.id).await.expect("Cleanup failed");
}

#[tokio::test]
async fn test_failed_line_rolls_back_whole_order() {
    let admin = create_admin_client().await.expect("Failed to log in");
    let plenty = create_test_product(&admin, "books", 5.0, 50)
        .await
        .expect("Failed to create product");
    let scarce = create_test_product(&admin, "books", 5.0, 1)
        .await
        .expect("Failed to create product");
    let client = create_test_client().expect("Failed to create client");

    let result = client
        .create_order(&order_request(&[(plenty.id, 3), (scarce.id, 2)]))
        .await;
    assert!(result.is_err());

    let plenty_after = client.get_product(plenty.id).await.expect("Failed to get product");
    assert_eq!(plenty_after.stock, 50);

    admin.delete_product(plenty.id).await.expect("Cleanup failed");
    admin.delete_product(scarce.id).await.expect("Cleanup failed");
}

#[tokio::test]
async fn test_unknown_product_is_bad_request() {
    let client = create_test_client().expect("Failed to create client");

    let result = client.create_order(&order_request(&[(i32::MAX, 1)])).await;
    assert!(matches!(result, Err(Error::Api { status: 400, .. })));
}

#[tokio::test]
async fn test_invalid_email_is_bad_request() {
    let client = create_test_client().expect("Failed to create client");
    let mut request = order_request(&[(1, 1)]);
    request.customer.email = "nope".to_string();

    let result = client.create_order(&request).await;
    assert!(matches!(result, Err(Error::Api { status: 400, .. })));
}

#[tokio::test]
async fn test_order_round_trip() {
    let admin = create_admin_client().await.expect("Failed to log in");
    let product = create_test_product(&admin, "clothing", 25.99, 10)
        .await
        .expect("Failed to create product");
    let client = create_test_client().expect("Failed to create client");

    let confirmation = client
        .create_order(&order_request(&[(product.id, 2)]))
        .await
        .expect("Failed to place order");

    let order = client
        .get_order(&confirmation.order_number)
        .await
        .expect("Failed to get order");
    assert_eq!(order.id, confirmation.order_id);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].name, product.name);
    assert_eq!(order.items[0].quantity, 2);
    assert!((order.items[0].price - 25.99).abs() < 1e-9);
    assert_eq!(order.customer.email, "grace@example.com");

    let listed = client.list_orders().await.expect("Failed to list orders");
    assert!(listed.data.iter().any(|o| o.id == order.id));

    admin.delete_product(product.id).await.expect("Cleanup failed");

    // The order keeps its snapshot after the product is gone
    let still = client
        .get_order(&confirmation.order_number)
        .await
        .expect("Failed to get order");
    assert_eq!(still.items[0].name, product.name);
}

#[tokio::test]
async fn test_update_status_and_delete() {
    let client = create_test_client().expect("Failed to create client");
    let admin = create_admin_client().await.expect("Failed to log in");
    let product = create_test_product(&admin, "books", 3.0, 5)
        .await
        .expect("Failed to create product");

    let confirmation = client
        .create_order(&order_request(&[(product.id, 1)]))
        .await
        .expect("Failed to place order");

    let updated = client
        .update_order_status(&confirmation.order_id, "shipped")
        .await
        .expect("Failed to update status");
    assert_eq!(updated.status, OrderStatus::Shipped);

    let bad = client
        .update_order_status(&confirmation.order_id, "teleported")
        .await;
    assert!(matches!(bad, Err(Error::Api { status: 400, .. })));

    client
        .delete_order(&confirmation.order_id)
        .await
        .expect("Failed to delete order");
    let gone = client.get_order(&confirmation.order_number).await;
    assert!(matches!(gone, Err(Error::NotFound(_))));

    let again = client.delete_order(&confirmation.order_id).await;
    assert!(matches!(again, Err(Error::NotFound(_))));

    admin.delete_product(product.id).await.expect("Cleanup failed");
}

#[tokio::test]
async fn test_concurrent_orders_never_oversell() {
    let admin = create_admin_client().await.expect("Failed to log in");
    let product = create_test_product(&admin, "electronics", 1.0, 10)
        .await
        .expect("Failed to create product");
    let client = create_test_client().expect("Failed to create client");

    let attempts = (0..20).map(|_| {
        let client = client.clone();
        let request = order_request(&[(product.id, 1)]);
        async move { client.create_order(&request).await }
    });
    let results = join_all(attempts).await;

    let placed: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(placed.len(), 10);

    let mut numbers: Vec<&str> = placed.iter().map(|c| c.order_number.as_str()).collect();
    numbers.sort_unstable();
    numbers.dedup();
    assert_eq!(numbers.len(), 10);

    let after = client.get_product(product.id).await.expect("Failed to get product");
    assert_eq!(after.stock, 0);

    admin.delete_product(product.id).await.expect("Cleanup failed");
}
