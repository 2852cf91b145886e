//! Contact form submission
//!
//! `Received → Validated → BackedUp → Notified → Responded`. Only the first
//! transition can fail the request; backup and notification outcomes are
//! logged and dropped.

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_LENGTH;
use hyper::{HeaderMap, Request, Response, StatusCode};
use std::sync::Arc;

use crate::config::AppState;
use crate::contact::{self, NotificationError, SubmitError};
use crate::http;
use crate::logger;

pub const SUCCESS_MESSAGE: &str = "Form submitted successfully";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// `POST /submit-form`
pub async fn submit_form<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let max_body_size = state.config.http.max_body_size;
    if let Some(resp) = check_body_size(req.headers(), max_body_size) {
        return resp;
    }

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let outcome = match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => process_submission(&collected.to_bytes(), state).await,
        Err(e) if e.is::<LengthLimitError>() => return http::build_413_response(),
        Err(e) => Err(SubmitError::Unexpected(format!(
            "failed to read request body: {e}"
        ))),
    };

    match outcome {
        Ok(()) => http::json_response(
            StatusCode::OK,
            &serde_json::json!({ "message": SUCCESS_MESSAGE }),
        ),
        Err(SubmitError::Validation(e)) => {
            logger::log_submission_rejected(&e);
            http::error_response(StatusCode::BAD_REQUEST, &e.to_string())
        }
        Err(SubmitError::Unexpected(e)) => {
            logger::log_error(&format!("Error processing form submission: {e}"));
            http::internal_error()
        }
    }
}

/// Run the pipeline for one request body
pub async fn process_submission(body: &[u8], state: &AppState) -> Result<(), SubmitError> {
    let payload: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(body)
        .map_err(|e| SubmitError::Unexpected(format!("body is not a JSON object: {e}")))?;
    let form = contact::validate(&payload)?;

    logger::log_submission_received(&form.name, &form.email);

    // Deliberately discarded: a failed backup does not fail the submission.
    match state.backup.save(&form).await {
        Ok(saved) => logger::log_backup_saved(&saved.path, &saved.submission.timestamp),
        Err(e) => logger::log_backup_failed(&e),
    }

    // Deliberately discarded: notification is best-effort.
    let notifier = Arc::clone(&state.notifier);
    let name = form.name.clone();
    match tokio::task::spawn_blocking(move || notifier.notify(&form)).await {
        Ok(Ok(())) => logger::log_notification_sent(&name),
        Ok(Err(e)) => logger::log_notification_failed(&e),
        Err(e) => logger::log_notification_failed(&NotificationError::Task(e.to_string())),
    }

    Ok(())
}

/// Reject early when the declared Content-Length exceeds the limit
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let value = headers.get(CONTENT_LENGTH)?;
    match value.to_str().ok().and_then(|s| s.parse::<u64>().ok()) {
        Some(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(http::build_413_response())
        }
        Some(_) => None,
        None => {
            logger::log_warning("Invalid Content-Length header, relying on streamed limit");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::contact::submission::ContactForm;
    use crate::contact::Notifier;
    use chrono::Local;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls and optionally fails them
    struct StubNotifier {
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubNotifier {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
            })
        }
    }

    impl Notifier for StubNotifier {
        fn notify(&self, _form: &ContactForm) -> Result<(), NotificationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(NotificationError::Task("mail transport unreachable".to_string()))
            } else {
                Ok(())
            }
        }
    }

    struct PanickingNotifier;

    impl Notifier for PanickingNotifier {
        fn notify(&self, _form: &ContactForm) -> Result<(), NotificationError> {
            panic!("notifier blew up");
        }
    }

    fn state_with(backup_dir: &Path, notifier: Arc<dyn Notifier>) -> AppState {
        let mut config = Config::load_with("does-not-exist", config::Map::new()).unwrap();
        config.backup.dir = backup_dir.to_path_buf();
        config.http.max_body_size = 1024;
        AppState::new(&config, notifier)
    }

    fn post(body: &str) -> Request<Full<Bytes>> {
        Request::post("/submit-form")
            .header("Content-Type", "application/json")
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }

    async fn call(state: &AppState, body: &str) -> (StatusCode, serde_json::Value) {
        let response = submit_form(post(body), state).await;
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn backup_files(dir: &Path) -> usize {
        std::fs::read_dir(dir).map_or(0, Iterator::count)
    }

    const VALID: &str =
        r#"{"name":"Ada","email":"ada@example.com","subject":"Hi","message":"Hello there"}"#;

    #[tokio::test]
    async fn test_valid_submission() {
        let tmp = tempfile::tempdir().unwrap();
        let notifier = StubNotifier::new(false);
        let state = state_with(tmp.path(), notifier.clone());

        let before = Local::now().naive_local().and_utc().timestamp();
        let (status, body) = call(&state, VALID).await;
        let after = Local::now().naive_local().and_utc().timestamp();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "message": SUCCESS_MESSAGE }));
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);

        let listed = state.backup.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Ada");
        assert_eq!(listed[0].message, "Hello there");
        let stamped = listed[0].timestamp.and_utc().timestamp();
        assert!((before..=after).contains(&stamped));
    }

    #[tokio::test]
    async fn test_duplicate_key_keeps_last_value() {
        for body in [
            r#"{"name":"Ada","email":"ada@example.com","subject":"Hi","subject":"Hi","message":"Hello there"}"#,
            r#"{"name":"Ada","email":"ada@example.com","subject":"","subject":"Hi","message":"Hello there"}"#,
        ] {
            let tmp = tempfile::tempdir().unwrap();
            let notifier = StubNotifier::new(false);
            let state = state_with(tmp.path(), notifier.clone());

            let (status, reply) = call(&state, body).await;

            assert_eq!(status, StatusCode::OK, "body = {body}");
            assert_eq!(reply, serde_json::json!({ "message": SUCCESS_MESSAGE }));
            assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);
            let listed = state.backup.list().await.unwrap();
            assert_eq!(listed.len(), 1);
            assert_eq!(listed[0].name, "Ada");
            assert_eq!(listed[0].subject, "Hi");
            assert_eq!(listed[0].message, "Hello there");
        }
    }

    #[tokio::test]
    async fn test_invalid_email() {
        let tmp = tempfile::tempdir().unwrap();
        let notifier = StubNotifier::new(false);
        let state = state_with(tmp.path(), notifier.clone());

        let (status, body) = call(
            &state,
            r#"{"name":"Ada","email":"not-an-email","subject":"Hi","message":"Hello"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({ "error": "Invalid email format" }));
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 0);
        assert_eq!(backup_files(tmp.path()), 0);
    }

    #[tokio::test]
    async fn test_missing_field_named_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state_with(tmp.path(), StubNotifier::new(false));

        let (status, body) = call(&state, r#"{"name":"Ada","email":"bad","message":""}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            serde_json::json!({ "error": "Missing required field: subject" })
        );

        let (status, body) = call(&state, "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({ "error": "Missing required field: name" }));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_opaque_500() {
        let tmp = tempfile::tempdir().unwrap();
        let notifier = StubNotifier::new(false);
        let state = state_with(tmp.path(), notifier.clone());

        for body in ["name=Ada", "null", "[1, 2]", r#""hi""#, ""] {
            let (status, reply) = call(&state, body).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "body = {body:?}");
            assert_eq!(
                reply,
                serde_json::json!({ "error": "Internal server error" }),
                "body = {body:?}"
            );
        }
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 0);
        assert_eq!(backup_files(tmp.path()), 0);
    }

    #[tokio::test]
    async fn test_backup_failure_still_succeeds() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let notifier = StubNotifier::new(false);
        let state = state_with(&blocker.join("submissions"), notifier.clone());

        let (status, body) = call(&state, VALID).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], SUCCESS_MESSAGE);
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_notification_failure_still_succeeds() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state_with(tmp.path(), StubNotifier::new(true));

        let (status, _) = call(&state, VALID).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(backup_files(tmp.path()), 1);
    }

    #[tokio::test]
    async fn test_unreachable_smtp_still_succeeds() {
        let tmp = tempfile::tempdir().unwrap();
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let mut config = Config::load_with("does-not-exist", config::Map::new()).unwrap();
        config.mail.smtp_server = "127.0.0.1".to_string();
        config.mail.smtp_port = port;
        config.mail.timeout_secs = 2;
        let notifier = contact::SmtpNotifier::new(&config.mail).unwrap();
        let state = state_with(tmp.path(), Arc::new(notifier));

        let (status, _) = call(&state, VALID).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_panicking_notifier_still_succeeds() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state_with(tmp.path(), Arc::new(PanickingNotifier));

        let (status, _) = call(&state, VALID).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_listing_grows_by_one_per_submission() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state_with(tmp.path(), StubNotifier::new(false));

        for (i, sender) in ["Ada", "Grace"].iter().enumerate() {
            if i > 0 {
                // File names have second resolution.
                tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
            }
            let body = VALID.replace("Ada", sender);
            assert_eq!(call(&state, &body).await.0, StatusCode::OK);
            assert_eq!(state.backup.list().await.unwrap().len(), i + 1);
        }

        let names: Vec<_> = state
            .backup
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, ["Ada", "Grace"]);
    }

    #[tokio::test]
    async fn test_oversized_body() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state_with(tmp.path(), StubNotifier::new(false));

        let big = format!(
            r#"{{"name":"Ada","email":"ada@example.com","subject":"Hi","message":"{}"}}"#,
            "x".repeat(2048)
        );
        let response = submit_form(post(&big), &state).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let declared = Request::post("/submit-form")
            .header("Content-Length", "999999")
            .body(Full::new(Bytes::from_static(b"{}")))
            .unwrap();
        let response = submit_form(declared, &state).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(backup_files(tmp.path()), 0);
    }
}
