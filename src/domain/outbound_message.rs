use rinja_axum::Template;

use super::{RecipientEmail, RecipientRecord};

pub const WELCOME_SUBJECT: &str = "Welcome to Our Service";

#[derive(Template)]
#[template(path = "welcome_email.html")]
struct WelcomeEmailHtml<'a> {
    name: &'a str,
    year: i32,
}

#[derive(Template)]
#[template(path = "welcome_email.txt")]
struct WelcomeEmailText<'a> {
    name: &'a str,
    year: i32,
}

/// A rendered message for a single recipient, ready to hand to a mail transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub recipient: RecipientEmail,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

impl OutboundMessage {
    /// Renders the welcome email for `record`. No I/O happens here, the
    /// copyright year is supplied by the caller.
    pub fn welcome(record: &RecipientRecord, year: i32) -> Result<Self, RenderError> {
        let recipient =
            RecipientEmail::parse(record.email.clone()).map_err(RenderError::InvalidRecipient)?;
        let name = record.name.trim();

        let html_body = WelcomeEmailHtml { name, year }
            .render()
            .map_err(|e| RenderError::Template(e.to_string()))?;
        let text_body = WelcomeEmailText { name, year }
            .render()
            .map_err(|e| RenderError::Template(e.to_string()))?;

        Ok(Self {
            recipient,
            subject: WELCOME_SUBJECT.to_string(),
            html_body,
            text_body,
        })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("invalid recipient, {0}")]
    InvalidRecipient(String),
    #[error("couldn't render the welcome email, {0}")]
    Template(String),
}
