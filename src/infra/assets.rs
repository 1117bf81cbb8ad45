//! Embedded static asset serving.

use axum::{
    body::Body,
    extract::Path,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use include_dir::{Dir, File, include_dir};

use crate::application::error::ErrorReport;

static STATIC_ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/static");

const SOURCE: &str = "infra::assets::serve_static";

/// Serve a file from the embedded `static/` tree.
pub async fn serve_static(Path(path): Path<String>) -> Response {
    match resolve_asset(&STATIC_ASSETS, &path) {
        Some(file) => asset_response(file),
        None => {
            let mut response = StatusCode::NOT_FOUND.into_response();
            ErrorReport::from_message(SOURCE, StatusCode::NOT_FOUND, "Static asset not found")
                .attach(&mut response);
            response
        }
    }
}

fn resolve_asset(bundle: &'static Dir<'static>, path: &str) -> Option<&'static File<'static>> {
    let candidate = path.trim_start_matches('/');

    // No traversal and no directory listings.
    if candidate.is_empty() || candidate.ends_with('/') || candidate.contains("..") {
        return None;
    }

    bundle.get_file(candidate)
}

fn asset_response(file: &'static File<'static>) -> Response {
    let mime = mime_guess::from_path(file.path()).first_or_octet_stream();
    let bytes = Bytes::from_static(file.contents());
    let len = bytes.len();

    let mut response = Response::new(Body::from(bytes));
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=31536000, immutable"),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_embedded_stylesheet() {
        let file = resolve_asset(&STATIC_ASSETS, "css/site.css").expect("stylesheet embedded");
        assert!(!file.contents().is_empty());
    }

    #[test]
    fn rejects_traversal_and_directories() {
        assert!(resolve_asset(&STATIC_ASSETS, "../Cargo.toml").is_none());
        assert!(resolve_asset(&STATIC_ASSETS, "css/").is_none());
        assert!(resolve_asset(&STATIC_ASSETS, "").is_none());
    }

    #[tokio::test]
    async fn stylesheet_response_has_css_type_and_cache_headers() {
        let response = serve_static(Path("css/site.css".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).map(|v| v.as_bytes()),
            Some(&b"text/css"[..])
        );
        assert!(response.headers().contains_key(header::CACHE_CONTROL));
    }

    #[tokio::test]
    async fn missing_asset_is_404() {
        let response = serve_static(Path("css/missing.css".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
