//! Database abstraction layer
//!
//! This module provides the interface the routes use for schema discovery,
//! content listing and row deletion, and its SQLite implementation.

pub mod sqlite;
pub mod traits;

// Re-export the main trait
pub use traits::{DatabaseError, DatabaseProvider};
