//! Page endpoints
//!
//! This module contains the handlers behind the index and table routes, and
//! the response helpers shared with the login routes.

use axum::{
    http::{header, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
};

use crate::database::traits::DatabaseError;
use crate::Error;

pub mod rows;
pub mod tables;

// Re-export handlers for convenience
pub use tables::{index_handler, table_handler, table_structure_handler};

/// `302 Found` redirect
pub(crate) fn found(location: &str) -> Response {
    found_with_cookies(location, Vec::new())
}

/// `302 Found` redirect carrying `Set-Cookie` headers
pub(crate) fn found_with_cookies(
    location: &str,
    cookies: impl IntoIterator<Item = String>,
) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_string())],
        AppendHeaders(
            cookies
                .into_iter()
                .map(|cookie| (header::SET_COOKIE, cookie)),
        ),
    )
        .into_response()
}

/// Whether `url` is a path on this host, usable as a redirect target
///
/// Rejects absolute and scheme-relative URLs (`//host`, `/\host`).
pub(crate) fn is_local_path(url: &str) -> bool {
    url.starts_with('/') && !url.starts_with("//") && !url.starts_with("/\\")
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Database(DatabaseError::TableNotFound(_)) => StatusCode::NOT_FOUND,
            Error::Database(DatabaseError::InvalidColumn(_))
            | Error::Database(DatabaseError::InvalidRowId(_)) => StatusCode::BAD_REQUEST,
            Error::Database(DatabaseError::ReadOnly) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_local_path() {
        assert!(is_local_path("/"));
        assert!(is_local_path("/db/table/users/content?sort=-id"));

        assert!(!is_local_path(""));
        assert!(!is_local_path("https://example.com/"));
        assert!(!is_local_path("//example.com/"));
        assert!(!is_local_path("/\\example.com"));
        assert!(!is_local_path("table/users/"));
    }

    #[test]
    fn test_found_sets_location_and_cookies() {
        let response = found_with_cookies(
            "/db/",
            ["a=1; Path=/".to_string(), "b=; Max-Age=0".to_string()],
        );

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/db/");
        assert_eq!(response.headers().get_all(header::SET_COOKIE).iter().count(), 2);

        let response = found("/db/login");
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (Error::Database(DatabaseError::TableNotFound("t".into())), StatusCode::NOT_FOUND),
            (Error::Database(DatabaseError::InvalidColumn("c".into())), StatusCode::BAD_REQUEST),
            (Error::Database(DatabaseError::InvalidRowId("x".into())), StatusCode::BAD_REQUEST),
            (Error::Database(DatabaseError::ReadOnly), StatusCode::FORBIDDEN),
            (Error::Database(DatabaseError::Query("boom".into())), StatusCode::INTERNAL_SERVER_ERROR),
            (Error::Render("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
