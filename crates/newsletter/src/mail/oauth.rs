//! OAuth refresh-token exchange against Google's token endpoint.

use std::time::Duration;

use serde::Deserialize;

use crate::config::{OAuthCredentials, Secret};
use crate::error::{NewsletterError, Result};

/// Google OAuth token endpoint
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Scope the refresh token must carry.
pub const GMAIL_SEND_SCOPE: &str = "https://www.googleapis.com/auth/gmail.send";

/// Request timeout for the token exchange.
const TOKEN_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// A short-lived bearer token.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: Secret,
}

/// Exchanges a refresh token for an access token.
pub struct TokenClient {
    client: reqwest::Client,
    token_url: String,
}

impl TokenClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder().timeout(TOKEN_TIMEOUT).build()?;
        Ok(Self {
            client,
            token_url: GOOGLE_TOKEN_URL.to_string(),
        })
    }

    /// Set a custom token endpoint.
    #[must_use]
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Run the `refresh_token` grant.
    pub async fn refresh(&self, credentials: &OAuthCredentials) -> Result<AccessToken> {
        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.expose()),
            ("refresh_token", credentials.refresh_token.expose()),
        ];

        tracing::debug!("Refreshing Gmail access token");
        let response = self.client.post(&self.token_url).form(&params).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(token_error(status, &body));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| NewsletterError::OAuth(format!("invalid token response: {e}")))?;

        if let Some(scope) = token.scope.as_deref() {
            if !grants_send_scope(scope) {
                tracing::warn!(scope, "Access token does not list the gmail.send scope");
            }
        }
        tracing::debug!(expires_in = token.expires_in, "Got Gmail access token");

        Ok(AccessToken {
            token: Secret::new(token.access_token),
        })
    }
}

/// Map a non-2xx token response to an error, preferring Google's error body.
fn token_error(status: reqwest::StatusCode, body: &str) -> NewsletterError {
    match serde_json::from_str::<TokenErrorResponse>(body) {
        Ok(err) => NewsletterError::OAuth(format!(
            "{} - {}",
            err.error,
            err.error_description.unwrap_or_default()
        )),
        Err(_) => NewsletterError::OAuth(format!("HTTP {status}: {body}")),
    }
}

/// Whether a space-separated scope list includes `gmail.send`.
fn grants_send_scope(scope: &str) -> bool {
    scope.split_whitespace().any(|s| s == GMAIL_SEND_SCOPE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_token_error_uses_google_error_body() {
        let body = r#"{"error": "invalid_grant", "error_description": "Token has been expired or revoked."}"#;
        match token_error(StatusCode::BAD_REQUEST, body) {
            NewsletterError::OAuth(msg) => {
                assert_eq!(msg, "invalid_grant - Token has been expired or revoked.");
            }
            other => panic!("expected OAuth error, got {other:?}"),
        }
    }

    #[test]
    fn test_token_error_falls_back_to_status() {
        match token_error(StatusCode::BAD_GATEWAY, "upstream down") {
            NewsletterError::OAuth(msg) => {
                assert!(msg.starts_with("HTTP 502"));
                assert!(msg.ends_with("upstream down"));
            }
            other => panic!("expected OAuth error, got {other:?}"),
        }
    }

    #[test]
    fn test_send_scope_detection() {
        assert!(grants_send_scope(GMAIL_SEND_SCOPE));
        assert!(grants_send_scope(&format!(
            "openid {GMAIL_SEND_SCOPE} https://www.googleapis.com/auth/userinfo.email"
        )));
        assert!(!grants_send_scope("https://www.googleapis.com/auth/gmail.readonly"));
        assert!(!grants_send_scope(""));
    }

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken {
            token: Secret::new("ya29.secret"),
        };
        assert!(!format!("{token:?}").contains("ya29.secret"));
    }
}
