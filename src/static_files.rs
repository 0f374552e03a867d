//! The `static` endpoint: files under the static folder.

use std::path::{Component, Path, PathBuf};

use http::StatusCode;
use tracing::{debug, warn};

use crate::error::{Error, abort};
use crate::request::Request;
use crate::response::{ContentType, Response};

pub(crate) const ENDPOINT: &str = "static";

/// Serves `<static_url_path>/<path:filename>`.
pub(crate) async fn serve(req: Request) -> Result<Response, Error> {
    let filename = req.param("filename").unwrap_or_default();
    let Some(folder) = req.config().static_folder.as_deref() else {
        return Err(abort(StatusCode::NOT_FOUND));
    };
    let Some(path) = safe_join(folder, filename) else {
        warn!(filename, "path traversal attempt blocked");
        return Err(abort(StatusCode::NOT_FOUND));
    };

    match tokio::fs::read(&path).await {
        Ok(content) => {
            let extension = path.extension().and_then(|e| e.to_str());
            Ok(Response::builder().raw(content_type(extension), content))
        }
        Err(err) => {
            debug!(path = %path.display(), error = %err, "static file unavailable");
            Err(abort(StatusCode::NOT_FOUND))
        }
    }
}

/// Joins `filename` under `folder`, refusing anything that could escape it.
fn safe_join(folder: &Path, filename: &str) -> Option<PathBuf> {
    if filename.is_empty() || filename.contains('\\') {
        return None;
    }
    let relative = Path::new(filename);
    if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
        return None;
    }
    Some(folder.join(relative))
}

/// Content-Type by file extension. Types the response module names come
/// from [`ContentType`].
fn content_type(extension: Option<&str>) -> &'static str {
    match extension {
        Some("html" | "htm") => ContentType::Html.as_str(),
        Some("css") => ContentType::Css.as_str(),
        Some("txt" | "md") => ContentType::Text.as_str(),
        Some("xml") => "application/xml",
        Some("js" | "mjs") => "application/javascript",
        Some("json") => ContentType::Json.as_str(),
        Some("wasm") => "application/wasm",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("pdf") => "application/pdf",
        _ => ContentType::OctetStream.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_join_blocks_traversal() {
        let folder = Path::new("static");
        assert_eq!(safe_join(folder, "style.css"), Some(PathBuf::from("static/style.css")));
        assert_eq!(safe_join(folder, "css/site.css"), Some(PathBuf::from("static/css/site.css")));
        assert_eq!(safe_join(folder, "../Cargo.toml"), None);
        assert_eq!(safe_join(folder, "/etc/passwd"), None);
        assert_eq!(safe_join(folder, "a/./b"), Some(PathBuf::from("static/a/b")));
        assert_eq!(safe_join(folder, "..\\secret"), None);
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type(Some("css")), "text/css");
        assert_eq!(content_type(Some("png")), "image/png");
        assert_eq!(content_type(Some("htm")), "text/html; charset=utf-8");
        assert_eq!(content_type(Some("md")), "text/plain; charset=utf-8");
        assert_eq!(content_type(None), "application/octet-stream");
    }
}
