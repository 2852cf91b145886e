//! Submission notifications
//!
//! [`SmtpNotifier`] mails a plain-text summary of each submission to a fixed
//! recipient through an authenticated STARTTLS session. Sending blocks, so the
//! request handler runs it on the blocking pool.

use chrono::{Local, NaiveDateTime};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::time::Duration;

use super::error::NotificationError;
use super::submission::ContactForm;
use crate::config::MailConfig;

const SUBJECT_PREFIX: &str = "New Portfolio Contact: ";

/// Delivers a notice about an accepted submission
pub trait Notifier: Send + Sync {
    fn notify(&self, form: &ContactForm) -> Result<(), NotificationError>;
}

/// SMTP-backed notifier
pub struct SmtpNotifier {
    from: Mailbox,
    to: Mailbox,
    transport: SmtpTransport,
}

impl SmtpNotifier {
    /// Build the notifier and its (lazily connecting) transport
    pub fn new(config: &MailConfig) -> Result<Self, NotificationError> {
        let transport = SmtpTransport::starttls_relay(&config.smtp_server)?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.sender.clone(),
                config.password.clone(),
            ))
            .timeout(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        Ok(Self {
            from: config.sender.parse()?,
            to: config.recipient.parse()?,
            transport,
        })
    }

    fn compose(
        &self,
        form: &ContactForm,
        sent_at: NaiveDateTime,
    ) -> Result<Message, NotificationError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(format!("{SUBJECT_PREFIX}{}", form.subject))
            .header(ContentType::TEXT_PLAIN)
            .body(compose_body(form, sent_at))?;
        Ok(message)
    }
}

impl Notifier for SmtpNotifier {
    fn notify(&self, form: &ContactForm) -> Result<(), NotificationError> {
        let message = self.compose(form, Local::now().naive_local())?;
        self.transport.send(&message)?;
        Ok(())
    }
}

/// Plain-text body of the notification mail
pub fn compose_body(form: &ContactForm, sent_at: NaiveDateTime) -> String {
    format!(
        "New contact form submission from your portfolio website:\n\
         \n\
         Name: {}\n\
         Email: {}\n\
         Subject: {}\n\
         \n\
         Message:\n\
         {}\n\
         \n\
         Submitted at: {}\n",
        form.name,
        form.email,
        form.subject,
        form.message,
        sent_at.format("%Y-%m-%d %H:%M:%S"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn form() -> ContactForm {
        ContactForm {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            subject: "Hi".to_string(),
            message: "Hello there".to_string(),
        }
    }

    fn mail_config(port: u16) -> MailConfig {
        MailConfig {
            smtp_server: "127.0.0.1".to_string(),
            smtp_port: port,
            sender: "site@example.com".to_string(),
            password: "secret".to_string(),
            recipient: "owner@example.com".to_string(),
            timeout_secs: 2,
        }
    }

    fn sent_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_micro_opt(9, 26, 53, 589_793)
            .unwrap()
    }

    #[test]
    fn test_body_layout() {
        let body = compose_body(&form(), sent_at());
        assert!(body.starts_with("New contact form submission from your portfolio website:\n\n"));
        assert!(body.contains("Name: Ada\n"));
        assert!(body.contains("Email: ada@example.com\n"));
        assert!(body.contains("Subject: Hi\n"));
        assert!(body.contains("Message:\nHello there\n"));
        assert!(body.ends_with("Submitted at: 2025-03-14 09:26:53\n"));
    }

    #[test]
    fn test_message_headers() {
        let notifier = SmtpNotifier::new(&mail_config(2525)).unwrap();
        let message = notifier.compose(&form(), sent_at()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: New Portfolio Contact: Hi"));
        assert!(raw.contains("From: site@example.com"));
        assert!(raw.contains("To: owner@example.com"));
    }

    #[test]
    fn test_bad_recipient_rejected_at_build() {
        let mut config = mail_config(2525);
        config.recipient = "not an address".to_string();
        assert!(matches!(
            SmtpNotifier::new(&config),
            Err(NotificationError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_unreachable_server_is_an_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let notifier = SmtpNotifier::new(&mail_config(port)).unwrap();
        assert!(matches!(
            notifier.notify(&form()),
            Err(NotificationError::Smtp(_))
        ));
    }
}
