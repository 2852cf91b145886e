// Submission validator
// Required fields first, in a fixed order, then the email shape

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

use super::error::ValidationError;
use super::submission::ContactForm;

/// Checked in this order; the first missing one is reported
pub const REQUIRED_FIELDS: [&str; 4] = ["name", "email", "subject", "message"];

fn email_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"))
}

/// Validate a decoded JSON object into a [`ContactForm`].
///
/// A field counts as missing when it is absent, `null`, not a string, or the
/// empty string. Values are taken verbatim: no trimming or case folding.
pub fn validate(object: &Map<String, Value>) -> Result<ContactForm, ValidationError> {
    let mut values: [&str; 4] = [""; 4];
    for (slot, field) in values.iter_mut().zip(REQUIRED_FIELDS) {
        *slot = object
            .get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or(ValidationError::MissingField(field))?;
    }
    let [name, email, subject, message] = values;

    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }

    Ok(ContactForm {
        name: name.to_string(),
        email: email.to_string(),
        subject: subject.to_string(),
        message: message.to_string(),
    })
}

/// `local@domain.tld` with no whitespace and a single `@`
pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}
