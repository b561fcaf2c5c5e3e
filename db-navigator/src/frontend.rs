//! Static asset serving
//!
//! The stylesheet and script used by the built-in renderer are embedded at
//! compile time and served under `{prefix}/files/`.

use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use include_dir::{include_dir, Dir};

// Embed the static directory at compile time
static STATIC_FILES: Dir = include_dir!("$CARGO_MANIFEST_DIR/static");

/// Look up an embedded file by its path relative to the static directory
pub fn static_file(path: &str) -> Option<&'static [u8]> {
    STATIC_FILES.get_file(path).map(|file| file.contents())
}

/// Handler for GET /files/{*path}
///
/// Serves embedded files with a content type guessed from the extension, or
/// 404 when no such file is embedded.
pub async fn serve_static_file(Path(path): Path<String>) -> Response {
    match static_file(&path) {
        Some(contents) => {
            let mime_type = mime_guess::from_path(&path)
                .first_or_octet_stream()
                .to_string();

            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, mime_type),
                    (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
                ],
                contents,
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, format!("File not found: {}", path)).into_response(),
    }
}
