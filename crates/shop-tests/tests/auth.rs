//! Login, session and current-user tests.

use shop_client::{Error, Role};
use shop_tests::create_test_client;

#[tokio::test]
async fn test_login_me_logout() {
    let client = create_test_client().expect("Failed to create client");

    let session = client
        .login("jane", "password456")
        .await
        .expect("Login failed");
    assert_eq!(session.user.username, "jane");
    assert_eq!(session.user.role, Role::Customer);
    assert_eq!(session.token.len(), 64);

    let authed = client.with_token(&session.token);
    let me = authed.me().await.expect("Failed to get current user");
    assert_eq!(me, session.user);

    let bye = authed.logout().await.expect("Logout failed");
    assert!(bye.success);

    let after = authed.me().await;
    assert!(matches!(after, Err(Error::Unauthorized(_))));
}

#[tokio::test]
async fn test_admin_login_has_admin_role() {
    let client = create_test_client().expect("Failed to create client");

    let session = client.login("admin", "admin123").await.expect("Login failed");
    assert_eq!(session.user.role, Role::Admin);
    assert_eq!(session.user.email, "admin@vueshop.com");
}

#[tokio::test]
async fn test_tokens_are_unique_per_login() {
    let client = create_test_client().expect("Failed to create client");

    let first = client.login("john", "password123").await.expect("Login failed");
    let second = client.login("john", "password123").await.expect("Login failed");
    assert_ne!(first.token, second.token);

    // Logging out one session leaves the other valid
    client.with_token(&first.token).logout().await.expect("Logout failed");
    assert!(client.with_token(&second.token).me().await.is_ok());
}

#[tokio::test]
async fn test_wrong_password_and_unknown_user() {
    let client = create_test_client().expect("Failed to create client");

    let wrong = client.login("admin", "admin124").await;
    assert!(matches!(wrong, Err(Error::Unauthorized(_))));

    let unknown = client.login("nobody", "admin123").await;
    assert!(matches!(unknown, Err(Error::Unauthorized(_))));
}

#[tokio::test]
async fn test_me_requires_token() {
    let client = create_test_client().expect("Failed to create client");

    let anonymous = client.me().await;
    assert!(matches!(anonymous, Err(Error::Unauthorized(_))));

    let forged = client.with_token("deadbeef").me().await;
    assert!(matches!(forged, Err(Error::Unauthorized(_))));
}

#[tokio::test]
async fn test_logout_without_token_succeeds() {
    let client = create_test_client().expect("Failed to create client");

    let response = client.logout().await.expect("Logout failed");
    assert!(response.success);
}
