//! Product listing, filtering and lookup tests.

use shop_client::{Error, ProductQuery};
use shop_tests::{create_admin_client, create_test_client, create_test_product, unique_name};

#[tokio::test]
async fn test_list_products_total_matches() {
    let client = create_test_client().expect("Failed to create client");

    let products = client
        .list_products(&ProductQuery::default())
        .await
        .expect("Failed to list products");

    assert!(products.success);
    assert_eq!(products.total, products.data.len());
}

#[tokio::test]
async fn test_category_filter_and_price_sort() {
    let client = create_test_client().expect("Failed to create client");

    let books = client
        .list_products(&ProductQuery::category("books").sorted("price-asc"))
        .await
        .expect("Failed to list books");

    assert!(books.data.iter().all(|p| p.category == "books"));
    assert!(books.data.windows(2).all(|w| w[0].price <= w[1].price));
}

#[tokio::test]
async fn test_category_all_is_no_filter() {
    let client = create_test_client().expect("Failed to create client");

    let all = client
        .list_products(&ProductQuery::category("all"))
        .await
        .expect("Failed to list products");
    let unfiltered = client
        .list_products(&ProductQuery::default())
        .await
        .expect("Failed to list products");

    assert_eq!(all.total, unfiltered.total);
}

#[tokio::test]
async fn test_search_is_case_insensitive() {
    let admin = create_admin_client().await.expect("Failed to log in");
    let product = create_test_product(&admin, "gadgets", 12.5, 3)
        .await
        .expect("Failed to create product");

    let client = create_test_client().expect("Failed to create client");
    let found = client
        .list_products(&ProductQuery::search(&product.name.to_uppercase()))
        .await
        .expect("Failed to search");

    assert!(found.data.iter().any(|p| p.id == product.id));

    admin.delete_product(product.id).await.expect("Cleanup failed");
}

#[tokio::test]
async fn test_get_product_and_missing() {
    let admin = create_admin_client().await.expect("Failed to log in");
    let product = create_test_product(&admin, "books", 9.99, 7)
        .await
        .expect("Failed to create product");

    let client = create_test_client().expect("Failed to create client");
    let fetched = client
        .get_product(product.id)
        .await
        .expect("Failed to get product");
    assert_eq!(fetched, product);

    admin.delete_product(product.id).await.expect("Cleanup failed");
    let missing = client.get_product(product.id).await;
    assert!(matches!(missing, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_non_numeric_product_id_is_bad_request() {
    let client = create_test_client().expect("Failed to create client");
    let url = client.endpoint("/api/products/abc").expect("Invalid URL");

    let resp = reqwest::get(url).await.expect("Request failed");
    assert_eq!(resp.status().as_u16(), 400);

    let body: serde_json::Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_categories_sorted_and_distinct() {
    let admin = create_admin_client().await.expect("Failed to log in");
    let category = unique_name("cat");
    let product = create_test_product(&admin, &category, 1.0, 1)
        .await
        .expect("Failed to create product");

    let client = create_test_client().expect("Failed to create client");
    let categories = client
        .list_categories()
        .await
        .expect("Failed to list categories");

    assert_eq!(categories.iter().filter(|c| **c == category).count(), 1);
    assert!(categories.contains(&"books".to_string()));

    admin.delete_product(product.id).await.expect("Cleanup failed");
}
