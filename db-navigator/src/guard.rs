//! Request-to-SQL boundary
//!
//! Every identifier or value that travels from a URL into SQL text passes
//! through this module. Table names are resolved against the live table list,
//! sort tokens are parsed into a [`SortSpec`] whose column is later checked
//! against the table's declared columns, and row id lists are parsed strictly
//! into integers so they can be bound as parameters.

use serde::Serialize;
use std::fmt;

use crate::database::traits::DatabaseError;

/// Quote an identifier (table or column name) for SQLite
///
/// SQLite uses double quotes for identifiers. Embedded double quotes are
/// escaped by doubling them.
pub fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// A table name known to exist in the database
///
/// The only way to obtain one is [`TableName::resolve`], so any query taking a
/// `&TableName` operates on a table that was present when the request was
/// handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName(String);

impl TableName {
    /// Resolve a raw name against the current table list
    pub fn resolve(name: &str, tables: &[String]) -> Option<Self> {
        tables
            .iter()
            .find(|table| table.as_str() == name)
            .map(|table| Self(table.clone()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name quoted for interpolation into SQL text
    pub fn quoted(&self) -> String {
        quote_identifier(&self.0)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Sort direction for content queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    fn keyword(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Column and direction parsed from a single `sort` query token
///
/// `name` sorts ascending, `-name` sorts descending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn ascending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Parse a sort token, returning `None` for an empty token or a bare `-`
    pub fn parse(token: &str) -> Option<Self> {
        let (column, direction) = match token.strip_prefix('-') {
            Some(rest) => (rest, SortDirection::Descending),
            None => (token, SortDirection::Ascending),
        };

        if column.is_empty() {
            return None;
        }

        Some(Self {
            column: column.to_string(),
            direction,
        })
    }

    /// Encode back into the query token form
    pub fn token(&self) -> String {
        match self.direction {
            SortDirection::Ascending => self.column.clone(),
            SortDirection::Descending => format!("-{}", self.column),
        }
    }

    /// Build the ORDER BY clause after checking the column is one of `columns`
    pub fn order_clause<'a>(
        &self,
        mut columns: impl Iterator<Item = &'a str>,
    ) -> Result<String, DatabaseError> {
        if !columns.any(|column| column == self.column) {
            return Err(DatabaseError::InvalidColumn(self.column.clone()));
        }

        Ok(format!(
            " ORDER BY {} {}",
            quote_identifier(&self.column),
            self.direction.keyword()
        ))
    }
}

/// Sorted, deduplicated row ids parsed from a comma-separated token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIds(Vec<i64>);

impl RowIds {
    /// Parse `"1,2,3"` strictly; any token that is not an integer rejects the
    /// whole list
    pub fn parse(token: &str) -> Result<Self, DatabaseError> {
        let mut ids = Vec::new();
        for part in token.split(',') {
            let part = part.trim();
            let id = part
                .parse::<i64>()
                .map_err(|_| DatabaseError::InvalidRowId(part.to_string()))?;
            ids.push(id);
        }

        ids.sort_unstable();
        ids.dedup();
        Ok(Self(ids))
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }
}

/// Names SQLite accepts for the engine row id, in order of preference
const ROWID_ALIASES: [&str; 3] = ["rowid", "_rowid_", "oid"];

/// The first row id alias not taken by a declared column
///
/// A column named `rowid` hides the engine row id behind that name, so the
/// next alias has to be used instead. `None` when all three are declared.
pub fn rowid_alias<'a>(
    columns: impl IntoIterator<Item = &'a str> + Clone,
) -> Option<&'static str> {
    ROWID_ALIASES.into_iter().find(|alias| {
        !columns
            .clone()
            .into_iter()
            .any(|column| column.eq_ignore_ascii_case(alias))
    })
}

/// `?, ?, ?` with `count` bind placeholders
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
