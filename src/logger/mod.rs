//! Logger module
//!
//! Server lifecycle, submission pipeline and access logging. Before
//! [`init`] runs (e.g. in unit tests) lines go straight to stdout/stderr.

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::Level;

use crate::config::Config;
use std::net::SocketAddr;
use std::path::Path;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    let level = if config.server.debug {
        Level::Debug
    } else {
        config.logging.level.parse().unwrap_or_else(|e| {
            eprintln!("{}", writer::format_line(Level::Warn, &format!("{e}, using info")));
            Level::Info
        })
    };
    writer::init(
        level,
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn write(level: Level, message: &str) {
    match writer::get() {
        Some(w) => w.write(level, message),
        None if level >= Level::Warn => eprintln!("{}", writer::format_line(level, message)),
        None => println!("{}", writer::format_line(level, message)),
    }
}

pub fn log_debug(message: &str) {
    write(Level::Debug, message);
}

pub fn log_info(message: &str) {
    write(Level::Info, message);
}

pub fn log_warning(message: &str) {
    write(Level::Warn, message);
}

pub fn log_error(message: &str) {
    write(Level::Error, message);
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    log_info("======================================");
    log_info("Contact form server started");
    log_info(&format!("Listening on: http://{addr}"));
    log_info(&format!("Static root: {}", config.static_files.root.display()));
    log_info(&format!("Backup directory: {}", config.backup.dir.display()));
    log_info(&format!(
        "Notifications: {} -> {} via {}:{}",
        config.mail.sender, config.mail.recipient, config.mail.smtp_server, config.mail.smtp_port
    ));
    if let Some(workers) = config.server.workers {
        log_info(&format!("Worker threads: {workers}"));
    }
    if config.server.debug {
        log_info("Debug mode enabled");
    }
    log_info("======================================");
}

pub fn log_shutdown() {
    log_info("Shutdown requested, no longer accepting connections");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    log_error(&format!("Failed to serve connection: {err:?}"));
}

pub fn log_submission_received(name: &str, email: &str) {
    log_info(&format!("Form submission from {name} ({email})"));
}

pub fn log_submission_rejected(reason: &impl std::fmt::Display) {
    log_debug(&format!("Form submission rejected: {reason}"));
}

pub fn log_backup_saved(path: &Path, timestamp: &impl std::fmt::Display) {
    log_info(&format!("Form data saved to {} (stamped {timestamp})", path.display()));
}

pub fn log_backup_failed(err: &impl std::fmt::Display) {
    log_error(&format!("Error saving form data: {err}"));
}

pub fn log_notification_sent(name: &str) {
    log_info(&format!("Email notification sent for submission from {name}"));
}

pub fn log_notification_failed(err: &impl std::fmt::Display) {
    log_error(&format!("Error sending email notification: {err}"));
}

/// Write a formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    let line = entry.format(format);
    match writer::get() {
        Some(w) => w.write_access(&line),
        None => println!("{line}"),
    }
}
