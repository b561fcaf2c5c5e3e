//! Schema types for dynamic database introspection
//!
//! These types represent table structure and content discovered at runtime.

use serde::Serialize;

/// Columns and foreign keys of a single table
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableStructure {
    /// Columns in the order the engine reports them
    pub columns: Vec<ColumnInfo>,

    /// Foreign key constraints
    pub foreign_keys: Vec<ForeignKey>,
}

/// Information about a single column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    /// Column name
    pub name: String,

    /// Declared type (e.g., "INTEGER", "TEXT", "VARCHAR(255)"), empty when undeclared
    pub data_type: String,

    /// Whether the column allows NULL values
    pub nullable: bool,

    /// Default value expression (if any)
    pub default_value: Option<String>,

    /// Whether this column is part of the primary key
    pub is_primary_key: bool,
}

/// Foreign key constraint information
///
/// Composite keys are reported as several entries sharing an `id`, ordered by
/// `seq`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    pub id: i64,
    pub seq: i64,

    /// Column name in this table
    pub column: String,

    /// Referenced table name
    pub references_table: String,

    /// Referenced column name, `None` when the parent's primary key is implied
    pub references_column: Option<String>,

    pub on_update: String,
    pub on_delete: String,
    pub match_rule: String,
}

/// A single row of table content
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowRecord {
    /// Engine-assigned row identifier
    pub rowid: i64,

    /// Cell values aligned with [`TableContent::column_names`]
    pub values: Vec<serde_json::Value>,
}

/// Rows of a table together with the column names they are aligned to
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableContent {
    pub column_names: Vec<String>,
    pub rows: Vec<RowRecord>,
}
