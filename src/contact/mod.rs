//! Contact form domain
//!
//! Validation, file-backed persistence and mail notification for form
//! submissions. HTTP concerns live in [`crate::handler`].

pub mod backup;
pub mod error;
pub mod notifier;
pub mod submission;
pub mod validator;

pub use backup::BackupStore;
pub use error::{NotificationError, SubmitError};
pub use notifier::{Notifier, SmtpNotifier};
pub use validator::validate;
