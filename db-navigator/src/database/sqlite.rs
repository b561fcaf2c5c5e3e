//! SQLite database provider implementation

use crate::database::traits::{DatabaseError, DatabaseProvider};
use crate::guard::{placeholders, rowid_alias, RowIds, SortSpec, TableName};
use crate::schema::{ColumnInfo, ForeignKey, RowRecord, TableContent, TableStructure};
use async_trait::async_trait;
use base64::Engine;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool, TypeInfo, ValueRef};
use std::path::Path;

/// Upper bound on bind parameters per DELETE statement
const DELETE_CHUNK_SIZE: usize = 500;

/// Bytes of a BLOB shown in its preview
const BLOB_PREVIEW_BYTES: usize = 64;

/// SQLite database provider
///
/// Holds a pool capped at a single connection, so statements issued by
/// concurrent requests are executed one after another.
pub struct SqliteProvider {
    pool: SqlitePool,
    name: String,
    read_only: bool,
}

impl SqliteProvider {
    /// Create a provider over an existing pool
    ///
    /// # Arguments
    ///
    /// * `pool` - SQLite connection pool
    /// * `name` - Display name of the database
    /// * `read_only` - Refuse row deletion
    pub fn new(pool: SqlitePool, name: impl Into<String>, read_only: bool) -> Self {
        Self {
            pool,
            name: name.into(),
            read_only,
        }
    }

    /// Open the database file at `path`
    ///
    /// The file must already exist; it is never created. In read-only mode the
    /// connection itself is opened read-only as well.
    pub async fn connect(path: &Path, read_only: bool) -> crate::Result<Self> {
        if !path.exists() {
            return Err(crate::Error::DatabaseNotFound(path.to_path_buf()));
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(false)
            .read_only(read_only);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(DatabaseError::from)?;

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        tracing::info!(database = %path.display(), read_only, "Opened SQLite database");

        Ok(Self::new(pool, name, read_only))
    }

    /// The underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Names of the columns `SELECT *` returns for `table`, in order
    async fn column_names(&self, table: &TableName) -> Result<Vec<String>, DatabaseError> {
        let structure = self.describe_table(table).await?;
        Ok(structure
            .columns
            .into_iter()
            .map(|column| column.name)
            .collect())
    }

    /// Row id alias usable for `table`, given its declared columns
    fn rowid_column(
        table: &TableName,
        column_names: &[String],
    ) -> Result<&'static str, DatabaseError> {
        rowid_alias(column_names.iter().map(String::as_str)).ok_or_else(|| {
            DatabaseError::Query(format!(
                "table {} declares every rowid alias as a column",
                table
            ))
        })
    }

    /// Convert a content row into a [`RowRecord`]
    ///
    /// Column 0 holds the rowid, the remaining columns the table's cells.
    fn row_to_record(row: &SqliteRow) -> Result<RowRecord, DatabaseError> {
        let rowid: i64 = row.try_get(0)?;

        let values = (1..row.len())
            .map(|index| Self::extract_column_value(row, index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RowRecord { rowid, values })
    }

    /// Extract a cell and convert it to JSON
    ///
    /// SQLite is dynamically typed, so the storage class of the value itself
    /// decides the conversion rather than the declared column type.
    fn extract_column_value(row: &SqliteRow, index: usize) -> Result<Value, DatabaseError> {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            return Ok(Value::Null);
        }
        let storage_class = raw.type_info().name().to_string();

        match storage_class.as_str() {
            "INTEGER" => {
                if let Ok(value) = row.try_get::<i64, _>(index) {
                    return Ok(Value::Number(value.into()));
                }
            }
            "REAL" => {
                if let Ok(value) = row.try_get::<f64, _>(index) {
                    return Ok(serde_json::Number::from_f64(value)
                        .map(Value::Number)
                        .unwrap_or(Value::Null));
                }
            }
            "TEXT" => {
                if let Ok(value) = row.try_get::<String, _>(index) {
                    return Ok(Value::String(value));
                }
            }
            "BLOB" => {
                if let Ok(value) = row.try_get::<Vec<u8>, _>(index) {
                    return Ok(Value::String(blob_preview(&value)));
                }
            }
            _ => {}
        }

        // Fallback: try common types in order
        if let Ok(value) = row.try_get::<i64, _>(index) {
            return Ok(Value::Number(value.into()));
        }
        if let Ok(value) = row.try_get::<String, _>(index) {
            return Ok(Value::String(value));
        }
        if let Ok(value) = row.try_get::<Vec<u8>, _>(index) {
            return Ok(Value::String(blob_preview(&value)));
        }

        Ok(Value::Null)
    }
}

#[async_trait]
impl DatabaseProvider for SqliteProvider {
    fn database_name(&self) -> &str {
        &self.name
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    async fn list_tables(&self) -> Result<Vec<String>, DatabaseError> {
        let tables = sqlx::query_scalar::<_, String>(
            "SELECT name FROM sqlite_master WHERE type='table'",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tables)
    }

    async fn describe_table(&self, table: &TableName) -> Result<TableStructure, DatabaseError> {
        // table_xinfo also reports generated columns, which SELECT * returns
        let table_info_query = format!("PRAGMA table_xinfo({})", table.quoted());
        let column_rows = sqlx::query(&table_info_query)
            .fetch_all(&self.pool)
            .await?;

        if column_rows.is_empty() {
            return Err(DatabaseError::TableNotFound(table.to_string()));
        }

        let mut columns = Vec::with_capacity(column_rows.len());
        for row in column_rows {
            // PRAGMA table_xinfo returns: cid, name, type, notnull, dflt_value, pk, hidden
            // hidden: 0 normal, 1 hidden virtual table column, 2/3 generated
            let hidden: i64 = row.try_get("hidden")?;
            if hidden == 1 {
                continue;
            }

            let not_null: i64 = row.try_get("notnull")?;
            let primary_key: i64 = row.try_get("pk")?;

            columns.push(ColumnInfo {
                name: row.try_get("name")?,
                data_type: row.try_get("type")?,
                nullable: not_null == 0,
                default_value: row.try_get("dflt_value")?,
                is_primary_key: primary_key > 0,
            });
        }

        let foreign_key_query = format!("PRAGMA foreign_key_list({})", table.quoted());
        let foreign_key_rows = sqlx::query(&foreign_key_query)
            .fetch_all(&self.pool)
            .await?;

        let mut foreign_keys = Vec::with_capacity(foreign_key_rows.len());
        for row in foreign_key_rows {
            // PRAGMA foreign_key_list returns: id, seq, table, from, to, on_update, on_delete, match
            foreign_keys.push(ForeignKey {
                id: row.try_get("id")?,
                seq: row.try_get("seq")?,
                column: row.try_get("from")?,
                references_table: row.try_get("table")?,
                references_column: row.try_get("to")?,
                on_update: row.try_get("on_update")?,
                on_delete: row.try_get("on_delete")?,
                match_rule: row.try_get("match")?,
            });
        }

        Ok(TableStructure {
            columns,
            foreign_keys,
        })
    }

    async fn list_rows(
        &self,
        table: &TableName,
        sort: Option<&SortSpec>,
    ) -> Result<TableContent, DatabaseError> {
        // Declared columns name the result even when the table is empty, and
        // are the whitelist for the sort column
        let column_names = self.column_names(table).await?;

        let order_clause = match sort {
            Some(sort) => sort.order_clause(column_names.iter().map(String::as_str))?,
            None => String::new(),
        };

        let rowid_name = Self::rowid_column(table, &column_names)?;
        let select_query = format!(
            "SELECT {}, * FROM {}{}",
            rowid_name,
            table.quoted(),
            order_clause
        );

        let rows = sqlx::query(&select_query).fetch_all(&self.pool).await?;

        let rows = rows
            .iter()
            .map(Self::row_to_record)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TableContent { column_names, rows })
    }

    async fn count_rows(&self, table: &TableName) -> Result<u64, DatabaseError> {
        let count_query = format!("SELECT COUNT(*) FROM {}", table.quoted());
        let count: i64 = sqlx::query_scalar(&count_query)
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }

    async fn delete_rows(&self, table: &TableName, rows: &RowIds) -> Result<u64, DatabaseError> {
        if self.read_only {
            return Err(DatabaseError::ReadOnly);
        }

        let column_names = self.column_names(table).await?;
        let rowid_name = Self::rowid_column(table, &column_names)?;

        let mut transaction = self.pool.begin().await?;
        let mut deleted = 0;

        for chunk in rows.as_slice().chunks(DELETE_CHUNK_SIZE) {
            let delete_query = format!(
                "DELETE FROM {} WHERE {} IN ({})",
                table.quoted(),
                rowid_name,
                placeholders(chunk.len())
            );

            let mut query = sqlx::query(&delete_query);
            for rowid in chunk {
                query = query.bind(*rowid);
            }

            deleted += query.execute(&mut *transaction).await?.rows_affected();
        }

        transaction.commit().await?;

        tracing::debug!(table = %table, requested = rows.as_slice().len(), deleted, "Deleted rows");
        Ok(deleted)
    }
}

/// Short textual preview of BLOB data
fn blob_preview(data: &[u8]) -> String {
    let shown = &data[..data.len().min(BLOB_PREVIEW_BYTES)];
    let mut encoded = base64::engine::general_purpose::STANDARD.encode(shown);
    if data.len() > BLOB_PREVIEW_BYTES {
        encoded.push_str("...");
    }

    format!("[BLOB: {} bytes, base64: {}]", data.len(), encoded)
}
