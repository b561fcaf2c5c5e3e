//! Database provider trait
//!
//! This trait defines the interface that the navigator's routes run against.

use crate::guard::{RowIds, SortSpec, TableName};
use crate::schema::{TableContent, TableStructure};
use async_trait::async_trait;
use thiserror::Error;

/// Database provider trait for schema discovery, content listing and row
/// deletion
///
/// Table arguments are [`TableName`]s, which can only be obtained by resolving
/// a raw name against [`DatabaseProvider::list_tables`].
#[async_trait]
pub trait DatabaseProvider: Send + Sync + 'static {
    /// Display name of the database, usually the file name
    fn database_name(&self) -> &str;

    /// Whether mutating operations are refused
    fn is_read_only(&self) -> bool;

    /// List all table names in engine order
    async fn list_tables(&self) -> Result<Vec<String>, DatabaseError>;

    /// Get columns and foreign keys for a table
    ///
    /// # Arguments
    ///
    /// * `table` - Name of the table
    async fn describe_table(&self, table: &TableName) -> Result<TableStructure, DatabaseError>;

    /// Fetch every row of a table together with its rowid
    ///
    /// # Arguments
    ///
    /// * `table` - Name of the table
    /// * `sort` - Optional ordering; the column must be one of the table's
    ///   declared columns or the call fails with [`DatabaseError::InvalidColumn`]
    async fn list_rows(
        &self,
        table: &TableName,
        sort: Option<&SortSpec>,
    ) -> Result<TableContent, DatabaseError>;

    /// Get total row count for a table
    async fn count_rows(&self, table: &TableName) -> Result<u64, DatabaseError>;

    /// Delete the rows with the given rowids and commit
    ///
    /// Fails with [`DatabaseError::ReadOnly`] without touching the database
    /// when the provider is read-only. Ids that do not exist are ignored.
    ///
    /// # Returns
    ///
    /// Number of rows removed
    async fn delete_rows(&self, table: &TableName, rows: &RowIds) -> Result<u64, DatabaseError>;
}

/// Database error type
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Generic database error
    #[error("Database error: {0}")]
    Query(String),

    /// Table not found
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Invalid column name
    #[error("Invalid column: {0}")]
    InvalidColumn(String),

    /// Row id that is not an integer
    #[error("Invalid row id: {0:?}")]
    InvalidRowId(String),

    /// Write attempted on a read-only database
    #[error("Database is read-only")]
    ReadOnly,
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        DatabaseError::Query(error.to_string())
    }
}
