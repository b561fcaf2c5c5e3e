//! Built-in HTML renderer
//!
//! Plain server-rendered pages styled by the embedded `navigator.css`, with
//! `navigator.js` handling row selection for bulk deletion.

use serde_json::Value;

use crate::guard::{SortDirection, SortSpec};
use crate::schema::{TableContent, TableStructure};
use crate::view::{IndexPage, LoginPage, PageContext, Renderer, TableMode, TablePage, View};

/// Default [`Renderer`] producing standalone HTML documents
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render(&self, view: &View) -> crate::Result<String> {
        Ok(match view {
            View::Index(page) => index_page(page),
            View::Table(page) => table_page(page),
            View::Login(page) => login_page(page),
        })
    }
}

/// Base HTML layout wrapper
fn layout(context: &PageContext, title: &str, header: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="{stylesheet}">
    <script src="{script}" defer></script>
</head>
<body>
{header}{body}
</body>
</html>
"#,
        title = html_escape(title),
        stylesheet = html_escape(&context.url("/files/navigator.css")),
        script = html_escape(&context.url("/files/navigator.js")),
        header = header,
        body = body,
    )
}

fn header_bar(context: &PageContext, db_name: &str) -> String {
    let mut header = format!(
        r#"<header><a class="brand" href="{index}">{db_name}</a>"#,
        index = html_escape(&context.url("/")),
        db_name = html_escape(db_name),
    );

    if context.read_only {
        header.push_str(r#"<span class="badge read-only">read-only</span>"#);
    }
    header.push_str(r#"<span class="spacer"></span>"#);
    if context.show_logout {
        header.push_str(&format!(
            r#"<a href="{}">Log out</a>"#,
            html_escape(&context.url("/logout"))
        ));
    }
    header.push_str("</header>\n");
    header
}

fn table_list(context: &PageContext, tables: &[String], current: Option<&str>) -> String {
    if tables.is_empty() {
        return r#"<p class="empty">This database has no tables.</p>"#.to_string();
    }

    let mut list = String::from("<ul>");
    for table in tables {
        let class = if Some(table.as_str()) == current {
            r#" class="current""#
        } else {
            ""
        };
        list.push_str(&format!(
            r#"<li><a{class} href="{href}">{name}</a></li>"#,
            class = class,
            href = html_escape(&context.table_url(table, "")),
            name = html_escape(table),
        ));
    }
    list.push_str("</ul>");
    list
}

fn index_page(page: &IndexPage) -> String {
    let body = format!(
        r#"<div class="layout"><main><h1>Tables</h1>{tables}</main></div>"#,
        tables = table_list(&page.context, &page.tables, None),
    );

    layout(
        &page.context,
        &page.db_name,
        &header_bar(&page.context, &page.db_name),
        &body,
    )
}

fn table_page(page: &TablePage) -> String {
    let context = &page.context;
    let table = page.table_name.as_str();
    let is_content = matches!(page.mode, TableMode::Content { .. });

    let tab = |target: &str, label: &str, active: bool| {
        format!(
            r#"<a class="{class}" href="{href}">{label}</a>"#,
            class = if active { "active" } else { "" },
            href = html_escape(&context.table_url(table, target)),
            label = label,
        )
    };

    let content = match &page.mode {
        TableMode::Structure(structure) => structure_section(structure),
        TableMode::Content {
            content,
            rows_count,
            sort,
        } => content_section(context, table, content, *rows_count, sort.as_ref()),
    };

    let body = format!(
        r#"<div class="layout"><nav class="tables">{tables}</nav><main><h1>{name}</h1><div class="tabs">{structure_tab}{content_tab}</div>{content}</main></div>"#,
        tables = table_list(context, &page.tables, Some(table)),
        name = html_escape(table),
        structure_tab = tab("", "Structure", !is_content),
        content_tab = tab("content", "Content", is_content),
        content = content,
    );

    layout(
        context,
        &format!("{} - {}", table, page.db_name),
        &header_bar(context, &page.db_name),
        &body,
    )
}

fn structure_section(structure: &TableStructure) -> String {
    let mut html = String::from(
        "<h2>Columns</h2><table class=\"grid\"><thead><tr><th>#</th><th>Name</th><th>Type</th><th>Not null</th><th>Default</th><th>Primary key</th></tr></thead><tbody>",
    );

    for (position, column) in structure.columns.iter().enumerate() {
        html.push_str(&format!(
            "<tr><td>{position}</td><td>{name}</td><td>{data_type}</td><td>{not_null}</td><td>{default}</td><td>{primary_key}</td></tr>",
            position = position,
            name = html_escape(&column.name),
            data_type = html_escape(&column.data_type),
            not_null = yes_no(!column.nullable),
            default = column
                .default_value
                .as_deref()
                .map(html_escape)
                .unwrap_or_else(null_marker),
            primary_key = yes_no(column.is_primary_key),
        ));
    }
    html.push_str("</tbody></table>");

    html.push_str("<h2>Foreign keys</h2>");
    if structure.foreign_keys.is_empty() {
        html.push_str(r#"<p class="empty">No foreign keys.</p>"#);
        return html;
    }

    html.push_str(
        "<table class=\"grid\"><thead><tr><th>Id</th><th>Seq</th><th>Column</th><th>References</th><th>On update</th><th>On delete</th><th>Match</th></tr></thead><tbody>",
    );
    for foreign_key in &structure.foreign_keys {
        let target = match &foreign_key.references_column {
            Some(column) => format!("{}.{}", foreign_key.references_table, column),
            None => foreign_key.references_table.clone(),
        };
        html.push_str(&format!(
            "<tr><td>{id}</td><td>{seq}</td><td>{column}</td><td>{target}</td><td>{on_update}</td><td>{on_delete}</td><td>{match_rule}</td></tr>",
            id = foreign_key.id,
            seq = foreign_key.seq,
            column = html_escape(&foreign_key.column),
            target = html_escape(&target),
            on_update = html_escape(&foreign_key.on_update),
            on_delete = html_escape(&foreign_key.on_delete),
            match_rule = html_escape(&foreign_key.match_rule),
        ));
    }
    html.push_str("</tbody></table>");
    html
}

fn content_section(
    context: &PageContext,
    table: &str,
    content: &TableContent,
    rows_count: u64,
    sort: Option<&SortSpec>,
) -> String {
    let content_url = context.table_url(table, "content");
    let current_url = match sort {
        Some(sort) => format!("{}?sort={}", content_url, urlencoding::encode(&sort.token())),
        None => content_url.clone(),
    };
    let delete_url = context.table_url(table, "delete");
    let writable = !context.read_only;

    let mut html = format!(
        r#"<div class="toolbar"><span>{rows_count} rows</span>"#,
        rows_count = rows_count
    );
    if writable {
        html.push_str(&format!(
            r#"<button id="delete-selected" class="danger" data-delete-url="{delete_url}" data-redirect="{redirect}" disabled>Delete selected</button>"#,
            delete_url = html_escape(&delete_url),
            redirect = html_escape(&current_url),
        ));
    }
    html.push_str("</div>");

    html.push_str("<table class=\"grid\"><thead><tr>");
    if writable {
        html.push_str(r#"<th><input type="checkbox" id="select-all"></th>"#);
    }
    for column in &content.column_names {
        let sorted = sort.filter(|sort| &sort.column == column);
        let (next, marker) = match sorted.map(|sort| sort.direction) {
            Some(SortDirection::Ascending) => (SortSpec::descending(column.as_str()), " &#9650;"),
            Some(SortDirection::Descending) => (SortSpec::ascending(column.as_str()), " &#9660;"),
            None => (SortSpec::ascending(column.as_str()), ""),
        };
        html.push_str(&format!(
            r#"<th{class}><a href="{href}">{name}</a>{marker}</th>"#,
            class = if sorted.is_some() { r#" class="sorted""# } else { "" },
            href = html_escape(&format!(
                "{}?sort={}",
                content_url,
                urlencoding::encode(&next.token())
            )),
            name = html_escape(column),
            marker = marker,
        ));
    }
    if writable {
        html.push_str("<th></th>");
    }
    html.push_str("</tr></thead><tbody>");

    for row in &content.rows {
        html.push_str("<tr>");
        if writable {
            html.push_str(&format!(
                r#"<td><input type="checkbox" class="row-select" value="{}"></td>"#,
                row.rowid
            ));
        }
        for value in &row.values {
            html.push_str(&format!("<td>{}</td>", cell(value)));
        }
        if writable {
            html.push_str(&format!(
                r#"<td><a class="danger delete-row" href="{href}">Delete</a></td>"#,
                href = html_escape(&format!(
                    "{}?rows={}&redirect={}",
                    delete_url,
                    row.rowid,
                    urlencoding::encode(&current_url)
                )),
            ));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");

    if content.rows.is_empty() {
        html.push_str(r#"<p class="empty">This table is empty.</p>"#);
    }
    html
}

fn login_page(page: &LoginPage) -> String {
    let message = page
        .message
        .as_deref()
        .map(|message| format!(r#"<p class="message">{}</p>"#, html_escape(message)))
        .unwrap_or_default();

    let body = format!(
        r#"<form class="login" method="post" action="{action}"><h1>Log in</h1>{message}<label for="password">Password</label><input type="password" id="password" name="password" autofocus required><button type="submit">Log in</button></form>"#,
        action = html_escape(&page.context.url("/login")),
        message = message,
    );

    layout(&page.context, "Log in", "", &body)
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => null_marker(),
        Value::String(text) => html_escape(text),
        other => html_escape(&other.to_string()),
    }
}

fn null_marker() -> String {
    r#"<span class="null">NULL</span>"#.to_string()
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Simple HTML escape function
fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
