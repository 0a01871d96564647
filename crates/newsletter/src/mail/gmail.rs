//! Email sender using the Gmail API.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use lettre::message::{header::ContentType, Mailbox, MultiPart, SinglePart};
use lettre::Message;
use serde::Serialize;

use super::oauth::TokenClient;
use super::MailSender;
use crate::config::OAuthCredentials;
use crate::digest::Digest;
use crate::error::{NewsletterError, Result};

/// Gmail API base URL
const GMAIL_API_URL: &str = "https://gmail.googleapis.com";

/// Request timeout for the send call.
const SEND_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    raw: &'a str,
}

/// Sends digests from one Gmail account to one recipient.
pub struct GmailSender {
    client: reqwest::Client,
    tokens: TokenClient,
    credentials: OAuthCredentials,
    from_email: String,
    to_email: String,
    api_base: String,
}

impl GmailSender {
    /// Create a sender for the given account and recipient.
    pub fn new(
        credentials: OAuthCredentials,
        from_email: impl Into<String>,
        to_email: impl Into<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(SEND_TIMEOUT).build()?;
        Ok(Self {
            client,
            tokens: TokenClient::new()?,
            credentials,
            from_email: from_email.into(),
            to_email: to_email.into(),
            api_base: GMAIL_API_URL.to_string(),
        })
    }

    /// Point the Gmail API and the token endpoint at custom URLs.
    #[must_use]
    pub fn with_endpoints(
        mut self,
        api_base: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self.tokens = self.tokens.with_token_url(token_url);
        self
    }

    /// Build the multipart/alternative MIME message for a digest.
    pub fn build_message(&self, digest: &Digest) -> Result<Message> {
        let from: Mailbox = self
            .from_email
            .trim()
            .parse()
            .map_err(|e| NewsletterError::Mail(format!("Invalid from email address: {e}")))?;

        let to: Mailbox = self
            .to_email
            .trim()
            .parse()
            .map_err(|e| NewsletterError::Mail(format!("Invalid to email address: {e}")))?;

        // Build multipart message with both plain text and HTML
        Message::builder()
            .from(from)
            .to(to)
            .subject(digest.subject.as_str())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(digest.text_body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(digest.html_body.clone()),
                    ),
            )
            .map_err(|e| NewsletterError::Mail(format!("Failed to build email message: {e}")))
    }
}

/// Encode an RFC 5322 message for the Gmail `raw` field.
pub fn encode_raw_message(message: &Message) -> String {
    URL_SAFE.encode(message.formatted())
}

#[async_trait]
impl MailSender for GmailSender {
    async fn send(&self, digest: &Digest) -> Result<()> {
        let message = self.build_message(digest)?;
        let raw = encode_raw_message(&message);

        let token = self.tokens.refresh(&self.credentials).await?;

        let url = format!("{}/gmail/v1/users/me/messages/send", self.api_base);
        let response = self
            .client
            .post(&url)
            .bearer_auth(token.token.expose())
            .json(&SendRequest { raw: &raw })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NewsletterError::Mail(format!(
                "Gmail API error ({status}): {body}"
            )));
        }

        tracing::info!(
            to = %self.to_email,
            subject = %digest.subject,
            "Email sent successfully"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Secret;

    fn credentials() -> OAuthCredentials {
        OAuthCredentials {
            client_id: "id".to_string(),
            client_secret: Secret::new("secret"),
            refresh_token: Secret::new("refresh"),
        }
    }

    fn digest() -> Digest {
        Digest {
            subject: "[Test] Last 24h Digest".to_string(),
            text_body: "plain body".to_string(),
            html_body: "<p>html body</p>".to_string(),
            identifiers: vec!["https://t.example/1".to_string()],
        }
    }

    #[test]
    fn test_build_message_is_multipart_alternative() {
        let sender = GmailSender::new(credentials(), "from@gmail.com", "to@example.com").unwrap();
        let message = sender.build_message(&digest()).unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();

        assert!(formatted.contains("From: from@gmail.com"));
        assert!(formatted.contains("To: to@example.com"));
        assert!(formatted.contains("Subject: [Test] Last 24h Digest"));
        assert!(formatted.contains("multipart/alternative"));
        assert!(formatted.contains("text/plain"));
        assert!(formatted.contains("text/html"));
    }

    #[test]
    fn test_invalid_address_is_mail_error() {
        let sender = GmailSender::new(credentials(), "not an address", "to@example.com").unwrap();
        let err = sender.build_message(&digest()).unwrap_err();
        assert!(matches!(err, NewsletterError::Mail(_)));
    }

    #[test]
    fn test_raw_encoding_round_trips() {
        let sender = GmailSender::new(credentials(), "from@gmail.com", "to@example.com").unwrap();
        let message = sender.build_message(&digest()).unwrap();
        let raw = encode_raw_message(&message);

        assert!(!raw.contains('+') && !raw.contains('/'));
        let decoded = URL_SAFE.decode(raw.as_bytes()).unwrap();
        assert_eq!(decoded, message.formatted());
    }
}
