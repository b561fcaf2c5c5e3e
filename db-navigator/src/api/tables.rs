//! Table listing and table page endpoints

use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::rows;
use crate::database::traits::{DatabaseError, DatabaseProvider};
use crate::guard::TableName;
use crate::layer::NavigatorContext;
use crate::view::{IndexPage, TableMode, TablePage, View};

/// Query parameters understood by the table routes
///
/// `sort` is used by the content view, `rows` and `redirect` by delete.
#[derive(Debug, Default, Deserialize)]
pub struct TableQuery {
    pub sort: Option<String>,
    pub rows: Option<String>,
    pub redirect: Option<String>,
}

/// Handler for GET /
///
/// Renders the list of all tables in the database.
pub async fn index_handler<DB: DatabaseProvider>(
    State(context): State<Arc<NavigatorContext<DB>>>,
) -> crate::Result<Html<String>> {
    let tables = context.database.list_tables().await?;

    context.render(View::Index(IndexPage {
        context: context.page.clone(),
        db_name: context.database.database_name().to_string(),
        tables,
    }))
}

/// Handler for GET /table/{table_name}/
pub async fn table_structure_handler<DB: DatabaseProvider>(
    State(context): State<Arc<NavigatorContext<DB>>>,
    Path(table_name): Path<String>,
    Query(query): Query<TableQuery>,
) -> crate::Result<Response> {
    dispatch(&context, &table_name, "", query).await
}

/// Handler for GET /table/{table_name}/{target}
///
/// `target` selects the mode: `content` lists rows, `delete` removes rows
/// unless the navigator is read-only, anything else shows the structure.
pub async fn table_handler<DB: DatabaseProvider>(
    State(context): State<Arc<NavigatorContext<DB>>>,
    Path((table_name, target)): Path<(String, String)>,
    Query(query): Query<TableQuery>,
) -> crate::Result<Response> {
    dispatch(&context, &table_name, &target, query).await
}

async fn dispatch<DB: DatabaseProvider>(
    context: &NavigatorContext<DB>,
    table_name: &str,
    target: &str,
    query: TableQuery,
) -> crate::Result<Response> {
    let tables = context.database.list_tables().await?;
    let table = TableName::resolve(table_name, &tables)
        .ok_or_else(|| DatabaseError::TableNotFound(table_name.to_string()))?;

    // A read-only navigator treats "delete" like any unknown target and falls
    // through to the structure view
    let mode = match target {
        "content" => rows::content(context, &table, query.sort.as_deref()).await?,
        "delete" if !context.page.read_only => {
            return rows::delete(
                context,
                &table,
                query.rows.as_deref(),
                query.redirect.as_deref(),
            )
            .await;
        }
        _ => TableMode::Structure(context.database.describe_table(&table).await?),
    };

    let page = context.render(View::Table(TablePage {
        context: context.page.clone(),
        db_name: context.database.database_name().to_string(),
        table_name: table.to_string(),
        tables,
        current_tab: target.to_string(),
        mode,
    }))?;

    Ok(page.into_response())
}
