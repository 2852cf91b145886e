// Submission records

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A contact form that passed validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// A persisted contact form plus its server-assigned timestamp
///
/// The timestamp is local wall-clock time serialized as ISO-8601 without an
/// offset, e.g. `2025-03-14T09:26:53.589793`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub timestamp: NaiveDateTime,
}

impl Submission {
    pub(crate) fn stamp(form: ContactForm, timestamp: NaiveDateTime) -> Self {
        Self {
            name: form.name,
            email: form.email,
            subject: form.subject,
            message: form.message,
            timestamp,
        }
    }
}
