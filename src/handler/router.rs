//! Request routing dispatch module
//!
//! Entry point for every HTTP request: dispatch by method and path, then
//! apply the cross-cutting bits (HEAD, CORS, Server header, access log).

use chrono::Local;
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderName, HeaderValue, IF_NONE_MATCH, REFERER, SERVER, USER_AGENT};
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppState;
use crate::handler::{admin, form, static_files};
use crate::http;
use crate::logger::{self, AccessLogEntry};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let started = Instant::now();
    let is_head = req.method() == Method::HEAD;
    let pending_log = state
        .config
        .logging
        .access_log
        .then(|| access_entry(&req, peer_addr));

    let mut response = route_request(req, &state).await;

    let body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    if is_head {
        response = http::strip_body(response);
    }
    if state.config.http.enable_cors {
        http::apply_cors(&mut response);
    }
    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }

    if let Some(mut entry) = pending_log {
        entry.status = response.status().as_u16();
        entry.body_bytes = if is_head { 0 } else { body_bytes };
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route request based on method and path
async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match (method, path.as_str()) {
        (Method::OPTIONS, _) => http::build_options_response(state.config.http.enable_cors),
        (Method::POST, "/submit-form") => form::submit_form(req, state).await,
        (Method::GET | Method::HEAD, "/health") => health(),
        (Method::GET | Method::HEAD, "/admin/submissions") => {
            admin::list_submissions(state).await
        }
        (Method::GET | Method::HEAD, _) => {
            let static_req = static_files::StaticRequest {
                path: &path,
                if_none_match: req
                    .headers()
                    .get(IF_NONE_MATCH)
                    .and_then(|v| v.to_str().ok()),
            };
            static_files::serve(&static_req, &state.config.static_files, state.backup.dir()).await
        }
        (method, _) => {
            logger::log_warning(&format!("Method not allowed: {method} {path}"));
            http::build_405_response()
        }
    }
}

/// Liveness probe
fn health() -> Response<Full<Bytes>> {
    http::json_response(
        StatusCode::OK,
        &serde_json::json!({
            "status": "healthy",
            "timestamp": Local::now().naive_local(),
        }),
    )
}

fn access_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry
}
