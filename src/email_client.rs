use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::{OutboundMessage, RecipientEmail};

/// Anything able to deliver a rendered message. The dispatch worker only cares
/// whether the call itself failed, delivery receipts are never inspected.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<(), TransportError>;
}

#[derive(thiserror::Error, Debug)]
#[error("couldn't send email, reqwest error {0}")]
pub struct TransportError(#[from] pub reqwest::Error);

/// Client for a Postmark-style HTTP email API.
pub struct EmailClient {
    http_client: Client,
    base_url: String,
    sender: RecipientEmail,
    authorization_token: SecretString,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
}

impl EmailClient {
    pub fn new(
        sender: RecipientEmail,
        base_url: String,
        authorization_token: SecretString,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url,
            sender,
            authorization_token,
        })
    }

    #[tracing::instrument(
        name = "Sending an email",
        skip(self, recipient, subject, html_content, text_content),
        fields(recipient = %recipient)
    )]
    pub async fn send_email(
        &self,
        recipient: &RecipientEmail,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<(), reqwest::Error> {
        let url = format!("{}/email", self.base_url);
        let request_body = SendEmailRequest {
            from: self.sender.as_ref(),
            to: recipient.as_ref(),
            subject,
            html_body: html_content,
            text_body: text_content,
        };
        self.http_client
            .post(&url)
            .header(
                "X-Postmark-Server-Token",
                self.authorization_token.expose_secret(),
            )
            .json(&request_body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl MailTransport for EmailClient {
    async fn send(&self, message: &OutboundMessage) -> Result<(), TransportError> {
        self.send_email(
            &message.recipient,
            &message.subject,
            &message.html_body,
            &message.text_body,
        )
        .await?;
        Ok(())
    }
}
