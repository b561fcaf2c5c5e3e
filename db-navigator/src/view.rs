//! View models handed to the renderer
//!
//! The navigator assembles one [`View`] per rendered page and passes it to a
//! [`Renderer`]. [`HtmlRenderer`](crate::HtmlRenderer) is used unless the
//! host installs its own, e.g. one backed by its template engine. All view
//! types serialize with serde so they can be fed to such engines directly.

use serde::Serialize;

use crate::guard::SortSpec;
use crate::schema::{TableContent, TableStructure};

/// Values every page receives
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
    /// URL prefix the navigator is mounted under
    pub prefix: String,

    /// Whether an access policy is configured, so a logout link makes sense
    pub show_logout: bool,

    pub read_only: bool,
}

impl PageContext {
    /// Absolute URL of a navigator path such as `/table/users/`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.prefix, path)
    }

    /// Absolute URL of a table page; `target` is `""`, `"content"` or `"delete"`
    pub fn table_url(&self, table: &str, target: &str) -> String {
        self.url(&format!("/table/{}/{}", urlencoding::encode(table), target))
    }
}

/// Table index
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexPage {
    pub context: PageContext,
    pub db_name: String,
    pub tables: Vec<String>,
}

/// Structure or content of one table
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TablePage {
    pub context: PageContext,
    pub db_name: String,
    pub table_name: String,
    pub tables: Vec<String>,

    /// The `target` path segment exactly as requested
    pub current_tab: String,

    pub mode: TableMode,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TableMode {
    Structure(TableStructure),
    #[serde(rename_all = "camelCase")]
    Content {
        content: TableContent,
        rows_count: u64,
        sort: Option<SortSpec>,
    },
}

/// Login form
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPage {
    pub context: PageContext,

    /// Error shown above the form
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum View {
    Index(IndexPage),
    Table(TablePage),
    Login(LoginPage),
}

/// Turns a [`View`] into an HTML document
pub trait Renderer: Send + Sync + 'static {
    fn render(&self, view: &View) -> crate::Result<String>;
}

impl<F> Renderer for F
where
    F: Fn(&View) -> crate::Result<String> + Send + Sync + 'static,
{
    fn render(&self, view: &View) -> crate::Result<String> {
        self(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(prefix: &str) -> PageContext {
        PageContext {
            prefix: prefix.to_string(),
            show_logout: false,
            read_only: false,
        }
    }

    #[test]
    fn test_table_url_encodes_name() {
        assert_eq!(context("/db").table_url("users", ""), "/db/table/users/");
        assert_eq!(
            context("").table_url("order items", "content"),
            "/table/order%20items/content"
        );
    }

    #[test]
    fn test_view_serializes_with_tag() {
        let view = View::Login(LoginPage {
            context: context("/db"),
            message: Some("Invalid password!".to_string()),
        });

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["view"], "login");
        assert_eq!(json["message"], "Invalid password!");
        assert_eq!(json["context"]["showLogout"], false);
    }
}
