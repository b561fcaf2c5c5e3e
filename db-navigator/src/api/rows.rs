//! Row listing and deletion for the table routes

use axum::response::Response;

use crate::api::{found, is_local_path};
use crate::database::traits::DatabaseProvider;
use crate::guard::{RowIds, SortSpec, TableName};
use crate::layer::NavigatorContext;
use crate::view::TableMode;

/// Content mode: rows ordered by the optional `sort` token, plus the total
/// row count
pub(crate) async fn content<DB: DatabaseProvider>(
    context: &NavigatorContext<DB>,
    table: &TableName,
    sort: Option<&str>,
) -> crate::Result<TableMode> {
    let sort = sort.and_then(SortSpec::parse);

    let content = context.database.list_rows(table, sort.as_ref()).await?;
    let rows_count = context.database.count_rows(table).await?;

    Ok(TableMode::Content {
        content,
        rows_count,
        sort,
    })
}

/// Delete mode: remove the rows listed in `rows` and redirect
///
/// The client is sent to `redirect` when it is a local path, otherwise to the
/// table's structure page. A missing or malformed `rows` list is rejected
/// before anything is deleted.
pub(crate) async fn delete<DB: DatabaseProvider>(
    context: &NavigatorContext<DB>,
    table: &TableName,
    rows: Option<&str>,
    redirect: Option<&str>,
) -> crate::Result<Response> {
    let rows = RowIds::parse(rows.unwrap_or_default())?;
    let deleted = context.database.delete_rows(table, &rows).await?;

    tracing::info!(table = %table, deleted, "Rows deleted through navigator");

    let target = redirect
        .filter(|url| is_local_path(url))
        .map(str::to_string)
        .unwrap_or_else(|| context.page.table_url(table.as_str(), ""));

    Ok(found(&target))
}
