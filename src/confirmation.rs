//! Confirmation email sent after a contact/registration form is submitted.
//!
//! Delivery goes through the `Mailer` trait. No email provider is wired in:
//! `LogMailer` records the composed email in the log and reports success.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

pub const CONFIRMATION_SUBJECT: &str = "お問い合わせありがとうございます";

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
    #[error("Recipient name is empty")]
    MissingName,
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Body of `POST /api/confirmation`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmationRequest {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmationEmail {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub text: String,
}

impl ConfirmationEmail {
    /// Validate the request and build the email.
    pub fn compose(request: &ConfirmationRequest, from: &str) -> Result<Self, MailError> {
        let to = request.email.trim();
        if !is_valid_email(to) {
            return Err(MailError::InvalidAddress(to.to_string()));
        }
        let name = request.name.trim();
        if name.is_empty() {
            return Err(MailError::MissingName);
        }

        Ok(Self {
            to: to.to_string(),
            from: from.to_string(),
            subject: CONFIRMATION_SUBJECT.to_string(),
            text: format!(
                "{name}様\n\nこの度はお問い合わせいただきありがとうございます。\n\
                 担当者より改めてご連絡いたします。\n\nTheta Clinical Support"
            ),
        })
    }
}

pub fn is_valid_email(address: &str) -> bool {
    EMAIL_PATTERN.is_match(address)
}

/// Outbound email delivery.
pub trait Mailer: Send + Sync {
    fn send(&self, email: &ConfirmationEmail) -> Result<(), MailError>;
}

/// Mailer that only logs. Stands in until an email provider is configured.
#[derive(Debug, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, email: &ConfirmationEmail) -> Result<(), MailError> {
        tracing::info!(
            to = %email.to,
            from = %email.from,
            subject = %email.subject,
            "Confirmation email recorded (no mail provider configured)"
        );
        Ok(())
    }
}
