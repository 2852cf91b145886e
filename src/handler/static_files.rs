//! Static file serving module
//!
//! Serves the portfolio site from the configured root. The backup directory
//! is never served even when it sits inside the root.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::config::StaticFilesConfig;
use crate::http::{self, cache, mime};
use crate::logger;

/// The parts of a GET/HEAD request static serving cares about
pub struct StaticRequest<'a> {
    pub path: &'a str,
    pub if_none_match: Option<&'a str>,
}

/// Serve `req.path` from the static root, or 404
pub async fn serve(
    req: &StaticRequest<'_>,
    config: &StaticFilesConfig,
    backup_dir: &Path,
) -> Response<Full<Bytes>> {
    let Some(file_path) = resolve(&config.root, req.path, &config.index_file, backup_dir).await
    else {
        return http::build_404_response();
    };

    let content = match fs::read(&file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                file_path.display()
            ));
            return http::build_404_response();
        }
    };

    let etag = cache::generate_etag(&content);
    if cache::check_etag_match(req.if_none_match, &etag) {
        return http::build_304_response(&etag);
    }

    let content_type = mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));
    http::response::build_cached_response(Bytes::from(content), content_type, &etag)
}

/// Map a request path to a file under `root`
///
/// Directories (and `/`) resolve to their index file. Returns `None` for
/// anything missing, outside the root, or inside the backup directory.
pub async fn resolve(
    root: &Path,
    request_path: &str,
    index_file: &str,
    backup_dir: &Path,
) -> Option<PathBuf> {
    let relative = request_path.trim_start_matches('/');
    let mut file_path = root.join(relative);

    let root_canonical = match fs::canonicalize(root).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static root not found or inaccessible '{}': {e}",
                root.display()
            ));
            return None;
        }
    };

    if relative.is_empty() || fs::metadata(&file_path).await.is_ok_and(|m| m.is_dir()) {
        file_path = file_path.join(index_file);
    }

    // Missing files are ordinary 404s
    let canonical = fs::canonicalize(&file_path).await.ok()?;
    if !canonical.starts_with(&root_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {request_path} -> {}",
            canonical.display()
        ));
        return None;
    }
    if let Ok(backup_canonical) = fs::canonicalize(backup_dir).await {
        if canonical.starts_with(&backup_canonical) {
            logger::log_warning(&format!(
                "Refusing to serve backup record: {request_path}"
            ));
            return None;
        }
    }
    if !fs::metadata(&canonical).await.is_ok_and(|m| m.is_file()) {
        return None;
    }

    Some(canonical)
}
