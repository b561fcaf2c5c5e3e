//! DbNavigator - Main Axum integration point
//!
//! This module provides the entry point for mounting the navigator into an
//! Axum application.

use axum::{middleware, response::Html, routing::get, Router};
use std::sync::Arc;

use crate::api::{found, index_handler, table_handler, table_structure_handler};
use crate::auth::{login_page, login_submit, logout, require_login, AccessPolicy};
use crate::config::NavigatorConfig;
use crate::database::sqlite::SqliteProvider;
use crate::database::traits::DatabaseProvider;
use crate::frontend::serve_static_file;
use crate::templates::HtmlRenderer;
use crate::view::{PageContext, Renderer, View};

/// State shared by every navigator route
pub struct NavigatorContext<DB> {
    pub(crate) database: DB,
    pub(crate) policy: Option<AccessPolicy>,
    pub(crate) page: PageContext,
    pub(crate) renderer: Arc<dyn Renderer>,
}

impl<DB: DatabaseProvider> NavigatorContext<DB> {
    pub(crate) fn render(&self, view: View) -> crate::Result<Html<String>> {
        self.renderer.render(&view).map(Html)
    }
}

/// Database navigator that can be merged into an Axum router
///
/// # Example
///
/// ```rust,no_run
/// use axum::Router;
/// use db_navigator::{DbNavigator, NavigatorConfig};
///
/// # async fn example() -> db_navigator::Result<()> {
/// let navigator = DbNavigator::open(NavigatorConfig::new("app.db").prefix("/db")).await?;
/// let app: Router = Router::new().merge(navigator.into_router());
/// # Ok(())
/// # }
/// ```
pub struct DbNavigator<DB: DatabaseProvider> {
    database: DB,
    config: NavigatorConfig,
    renderer: Arc<dyn Renderer>,
}

impl DbNavigator<SqliteProvider> {
    /// Open the SQLite file named in `config`
    ///
    /// Fails with [`Error::DatabaseNotFound`](crate::Error::DatabaseNotFound)
    /// before anything else is set up when the file does not exist.
    pub async fn open(config: NavigatorConfig) -> crate::Result<Self> {
        let database = SqliteProvider::connect(&config.database, config.read_only).await?;
        Ok(Self::with_provider(database, config))
    }
}

impl<DB: DatabaseProvider> DbNavigator<DB> {
    /// Create a navigator over any database provider
    ///
    /// `config.database` is not used; the provider is already connected. The
    /// navigator is read-only if either the config or the provider says so.
    pub fn with_provider(database: DB, config: NavigatorConfig) -> Self {
        Self {
            database,
            config,
            renderer: Arc::new(HtmlRenderer),
        }
    }

    /// Replace the built-in HTML renderer
    pub fn renderer(mut self, renderer: impl Renderer) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    /// Convert into an Axum Router that can be merged
    ///
    /// The returned router serves, relative to the configured prefix:
    /// - `GET /files/{*path}` - embedded static files, never gated
    /// - `GET /` - table index
    /// - `GET /table/{table_name}/` and `GET /table/{table_name}/{target}`
    /// - `GET|POST /login` and `GET /logout` when an access policy is configured
    ///
    /// With an access policy, every route except the login form and the static
    /// files requires the session cookie.
    pub fn into_router(self) -> Router {
        let policy = self.config.access_policy();
        let prefix = self.config.prefix.clone();
        let read_only = self.config.read_only || self.database.is_read_only();

        let context = Arc::new(NavigatorContext {
            database: self.database,
            page: PageContext {
                prefix: prefix.clone(),
                show_logout: policy.is_some(),
                read_only,
            },
            policy,
            renderer: self.renderer,
        });

        tracing::debug!(
            prefix = %prefix,
            read_only,
            protected = context.policy.is_some(),
            "Mounting database navigator"
        );

        // Note: Axum 0.8 uses {param} syntax instead of :param
        let mut protected = Router::new()
            .route(&format!("{}/", prefix), get(index_handler::<DB>))
            .route(
                &format!("{}/table/{{table_name}}/", prefix),
                get(table_structure_handler::<DB>),
            )
            .route(
                &format!("{}/table/{{table_name}}/{{target}}", prefix),
                get(table_handler::<DB>),
            );

        let mut public =
            Router::new().route(&format!("{}/files/{{*path}}", prefix), get(serve_static_file));

        if !prefix.is_empty() {
            let index = format!("{}/", prefix);
            public = public.route(&prefix, get(move || async move { found(&index) }));
        }

        if context.policy.is_some() {
            protected = protected
                .route(&format!("{}/logout", prefix), get(logout::<DB>))
                .route_layer(middleware::from_fn_with_state(
                    context.clone(),
                    require_login::<DB>,
                ));

            public = public.route(
                &format!("{}/login", prefix),
                get(login_page::<DB>).post(login_submit::<DB>),
            );
        }

        protected.merge(public).with_state(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::TableName;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use tempfile::NamedTempFile;
    use tower::ServiceExt;

    async fn database() -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        let provider = SqliteProvider::connect(file.path(), false).await.unwrap();

        for statement in [
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL)",
            "INSERT INTO users (id, name) VALUES (1, 'Grace'), (2, 'Ada'), (3, 'Linus')",
        ] {
            sqlx::query(statement).execute(provider.pool()).await.unwrap();
        }
        provider.pool().close().await;

        file
    }

    async fn app(
        file: &NamedTempFile,
        configure: impl FnOnce(NavigatorConfig) -> NavigatorConfig,
    ) -> Router {
        let config = configure(NavigatorConfig::new(file.path()).prefix("/db"));
        DbNavigator::open(config).await.unwrap().into_router()
    }

    async fn user_count(file: &NamedTempFile) -> u64 {
        let provider = SqliteProvider::connect(file.path(), true).await.unwrap();
        let tables = provider.list_tables().await.unwrap();
        let users = TableName::resolve("users", &tables).unwrap();
        provider.count_rows(&users).await.unwrap()
    }

    async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        app.clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_login(app: &Router, password: &str, cookie: Option<&str>) -> Response {
        let mut request = Request::builder()
            .method("POST")
            .uri("/db/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let body = format!("password={}", urlencoding::encode(password));
        app.clone()
            .oneshot(request.body(Body::from(body)).unwrap())
            .await
            .unwrap()
    }

    async fn body(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    fn set_cookies(response: &Response) -> Vec<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|value| value.to_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_open_fails_for_missing_file() {
        let directory = tempfile::tempdir().unwrap();
        let result = DbNavigator::open(NavigatorConfig::new(directory.path().join("none.db"))).await;
        assert!(matches!(result, Err(crate::Error::DatabaseNotFound(_))));
    }

    #[tokio::test]
    async fn test_empty_database_index() {
        let file = NamedTempFile::new().unwrap();
        let app = app(&file, |config| config).await;

        let response = get(&app, "/db/", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body(response).await.contains("This database has no tables."));
    }

    #[tokio::test]
    async fn test_prefix_without_slash_redirects_to_index() {
        let file = database().await;
        let app = app(&file, |config| config).await;

        let response = get(&app, "/db", None).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/db/");
    }

    #[tokio::test]
    async fn test_root_mount() {
        let file = database().await;
        let app = app(&file, |config| config.prefix("")).await;

        let response = get(&app, "/", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body(response).await.contains(r#"href="/table/users/""#));
    }

    #[tokio::test]
    async fn test_unknown_table_is_not_found() {
        let file = database().await;
        let app = app(&file, |config| config).await;

        for uri in [
            "/db/table/ghost_table/",
            "/db/table/ghost_table/content",
            "/db/table/ghost_table/delete?rows=1",
        ] {
            let response = get(&app, uri, None).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        }
        assert_eq!(user_count(&file).await, 3);
    }

    #[tokio::test]
    async fn test_structure_view() {
        let file = database().await;
        let app = app(&file, |config| config).await;

        let response = get(&app, "/db/table/users/", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body(response).await;
        assert!(html.contains("<h2>Columns</h2>"));
        assert!(html.contains("<td>name</td>"));
    }

    #[tokio::test]
    async fn test_unknown_target_falls_through_to_structure() {
        let file = database().await;
        let app = app(&file, |config| config).await;

        let response = get(&app, "/db/table/users/indexes", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body(response).await.contains("<h2>Columns</h2>"));
    }

    #[tokio::test]
    async fn test_content_view_sorts_descending() {
        let file = database().await;
        let app = app(&file, |config| config).await;

        let response = get(&app, "/db/table/users/content?sort=-name", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body(response).await;

        assert!(html.contains("3 rows"));
        let linus = html.find("<td>Linus</td>").unwrap();
        let grace = html.find("<td>Grace</td>").unwrap();
        let ada = html.find("<td>Ada</td>").unwrap();
        assert!(linus < grace && grace < ada);
    }

    #[tokio::test]
    async fn test_content_view_rejects_unknown_sort_column() {
        let file = database().await;
        let app = app(&file, |config| config).await;

        let response = get(&app, "/db/table/users/content?sort=missing", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_redirects_and_is_idempotent() {
        let file = database().await;
        let app = app(&file, |config| config).await;
        let uri = "/db/table/users/delete?rows=1,2&redirect=%2Fdb%2Ftable%2Fusers%2Fcontent";

        let response = get(&app, uri, None).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/db/table/users/content");
        assert_eq!(user_count(&file).await, 1);

        let response = get(&app, uri, None).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(user_count(&file).await, 1);
    }

    #[tokio::test]
    async fn test_delete_ignores_foreign_redirect() {
        let file = database().await;
        let app = app(&file, |config| config).await;

        for uri in [
            "/db/table/users/delete?rows=3",
            "/db/table/users/delete?rows=3&redirect=https%3A%2F%2Fevil.example%2F",
            "/db/table/users/delete?rows=3&redirect=%2F%2Fevil.example%2F",
        ] {
            let response = get(&app, uri, None).await;
            assert_eq!(response.status(), StatusCode::FOUND);
            assert_eq!(location(&response), "/db/table/users/");
        }
    }

    #[tokio::test]
    async fn test_delete_rejects_malformed_rows() {
        let file = database().await;
        let app = app(&file, |config| config).await;

        for uri in [
            "/db/table/users/delete",
            "/db/table/users/delete?rows=",
            "/db/table/users/delete?rows=1%29%20OR%20%281%3D1",
            "/db/table/users/delete?rows=1,two",
        ] {
            let response = get(&app, uri, None).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        }
        assert_eq!(user_count(&file).await, 3);
    }

    // Read-only mode does not reject "delete"; it shows the structure page
    // instead, like any other unrecognized target
    #[tokio::test]
    async fn test_read_only_delete_falls_through_to_structure() {
        let file = database().await;
        let app = app(&file, |config| config.read_only(true)).await;

        let response = get(&app, "/db/table/users/delete?rows=1,2,3", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body(response).await.contains("<h2>Columns</h2>"));
        assert_eq!(user_count(&file).await, 3);
    }

    #[tokio::test]
    async fn test_open_panel_has_no_login_routes() {
        let file = database().await;
        let app = app(&file, |config| config).await;

        assert_eq!(get(&app, "/db/login", None).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(get(&app, "/db/logout", None).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(get(&app, "/db/", None).await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unauthenticated_request_redirects_to_login() {
        let file = database().await;
        let app = app(&file, |config| config.password("abc123")).await;

        let response = get(&app, "/db/table/users/content?sort=name", None).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/db/login");

        let cookies = set_cookies(&response);
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].starts_with("url_next=%2Fdb%2Ftable%2Fusers%2Fcontent%3Fsort%3Dname;"));

        let response = get(&app, "/db/", Some("db_navigator_password=wrong")).await;
        assert_eq!(response.status(), StatusCode::FOUND);
    }

    #[tokio::test]
    async fn test_session_cookie_grants_access() {
        let file = database().await;
        let app = app(&file, |config| config.password("abc123")).await;

        let response = get(&app, "/db/table/users/", Some("db_navigator_password=abc123")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_login_page_and_static_files_are_public() {
        let file = database().await;
        let app = app(&file, |config| config.password("abc123")).await;

        let response = get(&app, "/db/login", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body(response).await.contains(r#"name="password""#));

        let response = get(&app, "/db/files/navigator.css", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = get(&app, "/db/files/missing.css", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let file = database().await;
        let app = app(&file, |config| config.password("abc123")).await;

        let response = post_login(&app, "abc12", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(set_cookies(&response).is_empty());
        assert!(body(response).await.contains("Invalid password!"));
    }

    #[tokio::test]
    async fn test_login_with_correct_password() {
        let file = database().await;
        let app = app(&file, |config| config.password("abc123")).await;

        let response = post_login(&app, "abc123", None).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/db/");

        let cookies = set_cookies(&response);
        assert!(cookies.iter().any(|c| c.starts_with("db_navigator_password=abc123;")));
        assert!(cookies
            .iter()
            .any(|c| c.starts_with("url_next=;") && c.contains("Max-Age=0")));
    }

    #[tokio::test]
    async fn test_login_returns_to_pending_url() {
        let file = database().await;
        let app = app(&file, |config| config.password("abc123")).await;

        let pending = Some("url_next=%2Fdb%2Ftable%2Fusers%2Fcontent");
        let response = post_login(&app, "abc123", pending).await;
        assert_eq!(location(&response), "/db/table/users/content");

        let foreign = Some("url_next=https%3A%2F%2Fevil.example%2F");
        let response = post_login(&app, "abc123", foreign).await;
        assert_eq!(location(&response), "/db/");
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let file = database().await;
        let app = app(&file, |config| config.password("abc123")).await;

        let response = get(&app, "/db/logout", Some("db_navigator_password=abc123")).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/db/login");

        let cookies = set_cookies(&response);
        assert!(cookies
            .iter()
            .any(|c| c.starts_with("db_navigator_password=;") && c.contains("Max-Age=0")));
    }

    #[tokio::test]
    async fn test_delegated_login_check() {
        let file = database().await;
        let app = app(&file, |config| {
            config.login_check(|credential| credential == Some("token-1"))
        })
        .await;

        let response = get(&app, "/db/", Some("db_navigator_password=token-1")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = get(&app, "/db/", Some("db_navigator_password=token-2")).await;
        assert_eq!(response.status(), StatusCode::FOUND);

        let response = post_login(&app, "token-1", None).await;
        assert_eq!(response.status(), StatusCode::FOUND);
    }

    #[tokio::test]
    async fn test_custom_renderer() {
        let file = database().await;
        let config = NavigatorConfig::new(file.path());
        let app = DbNavigator::open(config)
            .await
            .unwrap()
            .renderer(|view: &View| {
                serde_json::to_string(view).map_err(|error| crate::Error::Render(error.to_string()))
            })
            .into_router();

        let response = get(&app, "/", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body(response).await).unwrap();
        assert_eq!(json["view"], "index");
        assert_eq!(json["tables"], serde_json::json!(["users"]));
    }
}
