//! Database module for PostgreSQL connection and row mapping.

mod pool;
mod schema;

pub use pool::{DatabasePool, connect_options, probe};
pub use schema::*;
