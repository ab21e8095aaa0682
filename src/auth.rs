//! OAuth2 client-credentials session.
//!
//! The session exchanges the client id and secret for a bearer token at
//! construction and re-runs the grant whenever the token is about to expire.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::config::Credentials;
use crate::error::{EveractiveError, Result};
use crate::transport::{error_message, send_with_retries};

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    /// Lifetime in seconds.
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Clone)]
struct AccessToken {
    value: String,
    /// `None` when the server did not say; such tokens are never refreshed.
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    fn expires_within(&self, buffer: chrono::Duration) -> bool {
        self.expires_at
            .map(|at| Utc::now() + buffer >= at)
            .unwrap_or(false)
    }
}

/// Bearer token source for one connection.
///
/// Not meant to be shared between connections; the internal lock only
/// serializes refreshes for the owning [`ApiConnection`](crate::ApiConnection).
pub(crate) struct TokenSession {
    token_url: Url,
    credentials: Credentials,
    refresh_buffer: chrono::Duration,
    token: Mutex<AccessToken>,
}

impl TokenSession {
    /// Run the client-credentials grant and hold on to the resulting token.
    ///
    /// # Errors
    ///
    /// Returns [`EveractiveError::Authentication`] if the token endpoint is
    /// unreachable, rejects the credentials, or answers with something that
    /// is not a bearer token.
    pub(crate) fn fetch(
        http: &Client,
        token_url: Url,
        credentials: Credentials,
        refresh_buffer: Duration,
    ) -> Result<Self> {
        let token = request_token(http, &token_url, &credentials)?;
        Ok(Self {
            token_url,
            credentials,
            refresh_buffer: chrono::Duration::from_std(refresh_buffer)
                .unwrap_or_else(|_| chrono::Duration::zero()),
            token: Mutex::new(token),
        })
    }

    /// A valid bearer token, refreshed first if it is about to expire.
    pub(crate) fn bearer(&self, http: &Client) -> Result<String> {
        let mut token = self.token.lock().unwrap_or_else(PoisonError::into_inner);
        if token.expires_within(self.refresh_buffer) {
            debug!(token_url = %self.token_url, "Access token expiring, refreshing");
            *token = request_token(http, &self.token_url, &self.credentials)?;
        }
        Ok(token.value.clone())
    }

    /// When the current token expires, if the server said.
    pub(crate) fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .expires_at
    }

    pub(crate) fn client_id(&self) -> &str {
        self.credentials.client_id()
    }
}

#[tracing::instrument(skip(http, credentials), fields(client_id = credentials.client_id()))]
fn request_token(http: &Client, token_url: &Url, credentials: &Credentials) -> Result<AccessToken> {
    let failed = |reason: String| EveractiveError::Authentication {
        url: token_url.to_string(),
        reason,
    };

    debug!("Fetching oauth token");

    let fields = [
        ("grant_type", "client_credentials"),
        ("client_id", credentials.client_id()),
        ("client_secret", credentials.client_secret()),
    ];

    let response = send_with_retries(|| http.post(token_url.clone()).form(&fields))
        .map_err(|e| failed(format!("token request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let message = error_message(response, status);
        return Err(failed(format!("token endpoint returned {status}: {message}")));
    }

    let token: TokenResponse = response
        .json()
        .map_err(|e| failed(format!("malformed token response: {e}")))?;

    if let Some(token_type) = token.token_type.as_deref() {
        if !token_type.eq_ignore_ascii_case("bearer") {
            return Err(failed(format!("unsupported token type '{token_type}'")));
        }
    }

    let expires_at = token
        .expires_in
        .and_then(|secs| i64::try_from(secs).ok())
        .and_then(chrono::Duration::try_seconds)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl));

    Ok(AccessToken {
        value: token.access_token,
        expires_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_without_expiry_never_expires() {
        let token = AccessToken {
            value: "t".to_string(),
            expires_at: None,
        };
        assert!(!token.expires_within(chrono::Duration::days(365)));
    }

    #[test]
    fn test_token_expiring_inside_buffer() {
        let token = AccessToken {
            value: "t".to_string(),
            expires_at: Some(Utc::now() + chrono::Duration::seconds(30)),
        };
        assert!(token.expires_within(chrono::Duration::seconds(60)));
        assert!(!token.expires_within(chrono::Duration::zero()));
    }

    #[test]
    fn test_token_response_minimal() {
        let token: TokenResponse = serde_json::from_str(r#"{"access_token": "abc"}"#).unwrap();
        assert_eq!(token.access_token, "abc");
        assert!(token.token_type.is_none());
        assert!(token.expires_in.is_none());
    }
}
