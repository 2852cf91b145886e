//! Read-only admin endpoints
//!
//! `GET /admin/submissions` has no authentication. Keep it behind a trusted
//! network boundary.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use crate::config::AppState;
use crate::http;
use crate::logger;

/// Every backed-up submission, oldest file first
pub async fn list_submissions(state: &AppState) -> Response<Full<Bytes>> {
    match state.backup.list().await {
        Ok(submissions) => http::json_response(StatusCode::OK, &submissions),
        Err(e) => {
            logger::log_error(&format!("Error retrieving submissions: {e}"));
            http::internal_error()
        }
    }
}
