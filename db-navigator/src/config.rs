//! Navigator configuration

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::{AccessPolicy, LoginCheck};

/// Construction-time settings for a [`DbNavigator`](crate::DbNavigator)
///
/// # Example
///
/// ```rust
/// use db_navigator::NavigatorConfig;
///
/// let config = NavigatorConfig::new("app.db")
///     .prefix("/admin/db/")
///     .login_check(|credential| credential == Some("token-1"));
///
/// assert_eq!(config.prefix, "/admin/db");
/// ```
#[derive(Clone)]
pub struct NavigatorConfig {
    /// Path of the SQLite file; it must exist
    pub database: PathBuf,

    /// URL prefix all routes are mounted under, without a trailing slash
    pub prefix: String,

    /// Shared password, ignored when empty
    pub password: Option<String>,

    /// Delegated credential check, takes precedence over `password`
    pub login_check: Option<LoginCheck>,

    /// Disable row deletion
    pub read_only: bool,
}

impl NavigatorConfig {
    pub fn new(database: impl Into<PathBuf>) -> Self {
        Self {
            database: database.into(),
            prefix: String::new(),
            password: None,
            login_check: None,
            read_only: false,
        }
    }

    /// Mount point such as `/db`; trailing slashes are removed and a missing
    /// leading slash is added
    pub fn prefix(mut self, prefix: impl AsRef<str>) -> Self {
        let trimmed = prefix.as_ref().trim_end_matches('/');
        self.prefix = if trimmed.is_empty() || trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{}", trimmed)
        };
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Install a check function receiving the credential from the login form
    /// or the session cookie (`None` when the cookie is absent)
    pub fn login_check<F>(mut self, check: F) -> Self
    where
        F: Fn(Option<&str>) -> bool + Send + Sync + 'static,
    {
        self.login_check = Some(Arc::new(check));
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// The access policy these settings describe, `None` when the panel is open
    pub fn access_policy(&self) -> Option<AccessPolicy> {
        if let Some(check) = &self.login_check {
            return Some(AccessPolicy::Delegated(check.clone()));
        }

        self.password
            .as_ref()
            .filter(|password| !password.is_empty())
            .map(|password| AccessPolicy::Password(password.clone()))
    }
}

impl fmt::Debug for NavigatorConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("NavigatorConfig")
            .field("database", &self.database)
            .field("prefix", &self.prefix)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("login_check", &self.login_check.as_ref().map(|_| "<function>"))
            .field("read_only", &self.read_only)
            .finish()
    }
}
