//! # db-navigator
//!
//! A pluggable web panel for browsing SQLite tables and pruning rows, mounted
//! into an existing Axum application.
//!
//! ## Features
//!
//! - Table index, column structure and foreign keys for any SQLite file
//! - Table content with single-column sorting (`?sort=name`, `?sort=-name`)
//! - Row deletion by rowid, disabled in read-only mode
//! - Optional login with a shared password or a delegated check function,
//!   remembered in a cookie
//!
//! ## Security Notes
//!
//! - The password is compared as plain text and stored in the client's cookie
//! - Serve it behind TLS; transport security is left to the host
//! - Tables declared `WITHOUT ROWID` cannot be browsed by rowid
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use axum::{Router, routing::get};
//! use db_navigator::{DbNavigator, NavigatorConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = NavigatorConfig::new("data/app.db")
//!         .prefix("/db")
//!         .password("s3cret")
//!         .read_only(true);
//!
//!     let app = Router::new()
//!         .route("/", get(|| async { "Hello, World!" }))
//!         .merge(DbNavigator::open(config).await?.into_router());
//!
//!     // Serve the application...
//!     # let _ = app;
//!     Ok(())
//! }
//! ```

// Public modules
pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod frontend;
pub mod guard;
pub mod layer;
pub mod schema;
pub mod templates;
pub mod view;

// Public exports
pub use auth::{AccessPolicy, LoginCheck};
pub use config::NavigatorConfig;
pub use guard::{RowIds, SortDirection, SortSpec, TableName};
pub use layer::DbNavigator;
pub use schema::{ColumnInfo, ForeignKey, RowRecord, TableContent, TableStructure};
pub use templates::HtmlRenderer;
pub use view::{Renderer, View};

// Re-export database providers
pub use database::sqlite::SqliteProvider;
pub use database::traits::{DatabaseError, DatabaseProvider};

// Error type
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Database file not found: {}", .0.display())]
    DatabaseNotFound(PathBuf),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Render error: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, Error>;
