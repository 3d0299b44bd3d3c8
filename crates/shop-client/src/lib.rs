//! HTTP client library for the Shop Backend API.
//!
//! This crate provides a typed HTTP client for the shop's REST endpoints. The
//! `{success, data}` envelope is unwrapped for single-item responses; list
//! responses keep their `total`.
//!
//! # Example
//!
//! ```no_run
//! use shop_client::{ClientConfig, ProductQuery, ShopClient};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), shop_client::Error> {
//!     let client = ShopClient::new(ClientConfig {
//!         base_url: "http://localhost:5000".into(),
//!         timeout: Duration::from_secs(30),
//!     })?;
//!
//!     let books = client
//!         .list_products(&ProductQuery::category("books").sorted("price-asc"))
//!         .await?;
//!     println!("{} books", books.total);
//!
//!     let session = client.login("admin", "admin123").await?;
//!     let admin = client.with_token(&session.token);
//!     println!("{:?}", admin.stats().await?);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::{ClientConfig, ShopClient};
pub use error::Error;
pub use types::*;
