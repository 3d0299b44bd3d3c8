//! Mock catalog and demo accounts.
//!
//! Used as the initial data of the in-memory backend, to fill empty
//! PostgreSQL tables at start-up, and by the admin seed endpoint.

use crate::auth::hash_password;
use crate::models::{ProductInput, Role};
use rust_decimal_macros::dec;
use std::sync::LazyLock;

/// A demo account with its plaintext password.
#[derive(Debug, Clone, Copy)]
pub struct SeedUser {
    /// Login name.
    pub username: &'static str,
    /// Email address.
    pub email: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Role.
    pub role: Role,
    /// Plaintext password.
    pub password: &'static str,
}

/// Demo accounts.
pub const SEED_USERS: [SeedUser; 3] = [
    SeedUser {
        username: "admin",
        email: "admin@vueshop.com",
        name: "Admin User",
        role: Role::Admin,
        password: "admin123",
    },
    SeedUser {
        username: "john",
        email: "john@example.com",
        name: "John Doe",
        role: Role::Customer,
        password: "password123",
    },
    SeedUser {
        username: "jane",
        email: "jane@example.com",
        name: "Jane Smith",
        role: Role::Customer,
        password: "password456",
    },
];

/// Argon2 hashes of the demo passwords, computed once per process.
static SEED_HASHES: LazyLock<Vec<Option<String>>> = LazyLock::new(|| {
    SEED_USERS
        .iter()
        .map(|user| hash_password(user.password).ok())
        .collect()
});

/// Demo accounts paired with their password hashes. Accounts whose hash
/// could not be computed are skipped.
pub fn seed_users() -> Vec<(SeedUser, String)> {
    SEED_USERS
        .iter()
        .zip(SEED_HASHES.iter())
        .filter_map(|(user, hash)| hash.clone().map(|h| (*user, h)))
        .collect()
}

fn product(
    name: &str,
    description: &str,
    price: rust_decimal::Decimal,
    category: &str,
    image: &str,
    stock: i32,
) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        description: description.to_string(),
        price,
        category: category.to_string(),
        image: image.to_string(),
        stock,
    }
}

/// The mock catalog, in id order (ids 1 to 9 on a fresh store).
#[must_use]
pub fn seed_products() -> Vec<ProductInput> {
    vec![
        product(
            "Vue.js T-Shirt",
            "Comfortable cotton t-shirt with Vue.js logo",
            dec!(25.99),
            "clothing",
            "https://images.unsplash.com/photo-1521572163474-6864f9cf17ab?w=400&h=300&fit=crop&bg=white",
            50,
        ),
        product(
            "JavaScript Book",
            "Comprehensive guide to modern JavaScript",
            dec!(39.99),
            "books",
            "https://images.unsplash.com/photo-1544947950-fa07a98d237f?w=400&h=300&fit=crop&bg=white",
            25,
        ),
        product(
            "Wireless Headphones",
            "High-quality wireless headphones with noise cancellation",
            dec!(89.99),
            "electronics",
            "https://images.unsplash.com/photo-1505740420928-5e560c06d30e?w=400&h=300&fit=crop&bg=white",
            15,
        ),
        product(
            "Vue Hoodie",
            "Warm and cozy hoodie perfect for Vue developers",
            dec!(45.99),
            "clothing",
            "https://images.unsplash.com/photo-1556821840-3a63f95609a7?w=400&h=300&fit=crop&bg=white",
            30,
        ),
        product(
            "Laptop Stand",
            "Ergonomic laptop stand for better posture",
            dec!(29.99),
            "electronics",
            "https://images.unsplash.com/photo-1586953208448-b95a79798f07?w=400&h=300&fit=crop&bg=white",
            20,
        ),
        product(
            "Vue.js Guide",
            "Complete Vue.js 3 tutorial and reference",
            dec!(19.99),
            "books",
            "https://images.unsplash.com/photo-1481627834876-b7833e8f5570?w=400&h=300&fit=crop&bg=white",
            40,
        ),
        product(
            "Mechanical Keyboard",
            "Premium mechanical keyboard with RGB backlighting",
            dec!(129.99),
            "electronics",
            "https://images.unsplash.com/photo-1541140532154-b024d705b90a?w=400&h=300&fit=crop&bg=white",
            10,
        ),
        product(
            "Developer Mug",
            "Ceramic coffee mug perfect for coding sessions",
            dec!(12.99),
            "clothing",
            "https://images.unsplash.com/photo-1578662996442-48f60103fc96?w=400&h=300&fit=crop&bg=white",
            100,
        ),
        product(
            "React vs Vue Book",
            "In-depth comparison of modern JavaScript frameworks",
            dec!(34.99),
            "books",
            "https://images.unsplash.com/photo-1589829085413-56de8ae18c73?w=400&h=300&fit=crop&bg=white",
            35,
        ),
    ]
}
