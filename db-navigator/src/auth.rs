//! Access control for the navigator
//!
//! When a password or a login check is configured, every route except the
//! login form and the static files goes through [`require_login`]. The
//! credential lives entirely in the `db_navigator_password` cookie; there is
//! no server-side session.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

use crate::api::{found_with_cookies, is_local_path};
use crate::database::traits::DatabaseProvider;
use crate::layer::NavigatorContext;
use crate::view::{LoginPage, View};

/// Cookie holding the credential of a logged-in client
pub const SESSION_COOKIE: &str = "db_navigator_password";

/// Cookie remembering where to go after a successful login
pub const NEXT_URL_COOKIE: &str = "url_next";

/// Message shown when a login attempt is rejected
pub const INVALID_PASSWORD_MESSAGE: &str = "Invalid password!";

/// Delegated credential check
///
/// Receives the submitted password on login and the cookie value on every
/// protected request (`None` when the cookie is missing).
pub type LoginCheck = Arc<dyn Fn(Option<&str>) -> bool + Send + Sync>;

/// How credentials are verified
#[derive(Clone)]
pub enum AccessPolicy {
    /// A shared password compared as plain text
    Password(String),

    /// A host-provided check function
    Delegated(LoginCheck),
}

impl AccessPolicy {
    pub fn authorize(&self, credential: Option<&str>) -> bool {
        match self {
            AccessPolicy::Delegated(check) => check(credential),
            AccessPolicy::Password(password) => credential == Some(password.as_str()),
        }
    }
}

impl fmt::Debug for AccessPolicy {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessPolicy::Password(_) => formatter.write_str("Password(<redacted>)"),
            AccessPolicy::Delegated(_) => formatter.write_str("Delegated(<function>)"),
        }
    }
}

/// Read and percent-decode a cookie from the request headers
pub(crate) fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| cookie.trim().strip_prefix(prefix.as_str()))
        .and_then(|value| urlencoding::decode(value).ok())
        .map(|value| value.into_owned())
}

/// `Set-Cookie` value for a session-lifetime cookie
pub(crate) fn set_cookie(name: &str, value: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        name,
        urlencoding::encode(value)
    )
}

/// `Set-Cookie` value that removes a cookie
pub(crate) fn clear_cookie(name: &str) -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", name)
}

/// Middleware redirecting unauthenticated requests to the login form
///
/// The requested path is stored in the `url_next` cookie so the login handler
/// can send the client back to it.
pub async fn require_login<DB: DatabaseProvider>(
    State(context): State<Arc<NavigatorContext<DB>>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(policy) = &context.policy else {
        return next.run(request).await;
    };

    let credential = read_cookie(request.headers(), SESSION_COOKIE);
    if policy.authorize(credential.as_deref()) {
        return next.run(request).await;
    }

    let requested = request
        .uri()
        .path_and_query()
        .map(|path_and_query| path_and_query.as_str())
        .unwrap_or_else(|| request.uri().path())
        .to_string();

    tracing::debug!(path = %requested, "Unauthenticated request, redirecting to login");

    found_with_cookies(
        &context.page.url("/login"),
        [set_cookie(NEXT_URL_COOKIE, &requested)],
    )
}

/// Login form data
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub password: Option<String>,
}

/// Handler for GET /login
pub async fn login_page<DB: DatabaseProvider>(
    State(context): State<Arc<NavigatorContext<DB>>>,
) -> crate::Result<Html<String>> {
    context.render(View::Login(LoginPage {
        context: context.page.clone(),
        message: None,
    }))
}

/// Handler for POST /login
///
/// On success the submitted credential becomes the session cookie and the
/// client is sent to the pending `url_next` target or the index. On failure
/// the form is shown again with status 200 and no cookie is set.
pub async fn login_submit<DB: DatabaseProvider>(
    State(context): State<Arc<NavigatorContext<DB>>>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> crate::Result<Response> {
    let authorized = context
        .policy
        .as_ref()
        .is_some_and(|policy| policy.authorize(form.password.as_deref()));

    if !authorized {
        tracing::warn!("Rejected login attempt");
        let page = context.render(View::Login(LoginPage {
            context: context.page.clone(),
            message: Some(INVALID_PASSWORD_MESSAGE.to_string()),
        }))?;
        return Ok(page.into_response());
    }

    let target = read_cookie(&headers, NEXT_URL_COOKIE)
        .filter(|url| is_local_path(url))
        .unwrap_or_else(|| context.page.url("/"));

    tracing::info!("Login accepted");

    Ok(found_with_cookies(
        &target,
        [
            clear_cookie(NEXT_URL_COOKIE),
            set_cookie(SESSION_COOKIE, form.password.as_deref().unwrap_or_default()),
        ],
    ))
}

/// Handler for GET /logout
pub async fn logout<DB: DatabaseProvider>(
    State(context): State<Arc<NavigatorContext<DB>>>,
) -> Response {
    found_with_cookies(&context.page.url("/login"), [clear_cookie(SESSION_COOKIE)])
}
