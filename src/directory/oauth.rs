//! OAuth2 client restored from stored user tokens.
//!
//! Requests are made on the user's behalf with their access token. When the
//! stored access token is missing or expired, a single refresh-token grant
//! is made against the token endpoint. Nothing is retried.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::credentials::WorkspaceTokens;
use crate::config::AppKeys;
use crate::error::DirectoryError;

/// Tokens closer than this to expiry are refreshed before use.
const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// OAuth2 client bound to one application and one user's tokens.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    client_id: String,
    client_secret: SecretString,
    token_url: String,
    credentials: WorkspaceTokens,
}

impl OAuthClient {
    pub fn new(app: &AppKeys, token_url: impl Into<String>) -> Self {
        Self {
            client_id: app.client_id.clone(),
            client_secret: app.client_secret.clone(),
            token_url: token_url.into(),
            credentials: WorkspaceTokens::default(),
        }
    }

    /// Use the user's tokens instead of the application's own identity.
    pub fn set_credentials(&mut self, credentials: WorkspaceTokens) {
        self.credentials = credentials;
    }

    pub fn with_credentials(mut self, credentials: WorkspaceTokens) -> Self {
        self.set_credentials(credentials);
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn credentials(&self) -> &WorkspaceTokens {
        &self.credentials
    }

    /// Bearer token for the next request.
    pub async fn access_token(&self, http: &reqwest::Client) -> Result<SecretString, DirectoryError> {
        let skew = chrono::Duration::seconds(EXPIRY_SKEW_SECS);
        if let Some(token) = self.credentials.usable_access_token(Utc::now(), skew) {
            return Ok(SecretString::from(token.to_string()));
        }

        let token = self.refresh(http).await?;
        let expires_at = token.expires_in.and_then(|secs| expiry_after(Utc::now(), secs));
        tracing::debug!(?expires_at, "Workspace access token refreshed");
        Ok(SecretString::from(token.access_token))
    }

    /// Single refresh-token grant against the token endpoint.
    async fn refresh(&self, http: &reqwest::Client) -> Result<TokenResponse, DirectoryError> {
        let refresh_token = self
            .credentials
            .refresh_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                DirectoryError::Token("access token expired and no refresh token stored".into())
            })?;

        tracing::debug!(client_id = %self.client_id, "Refreshing workspace access token");

        let resp = http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose_secret()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "Workspace token refresh rejected");
            return Err(DirectoryError::Token(format!("token endpoint returned {status}: {body}")));
        }

        Ok(resp.json().await?)
    }
}

/// Epoch-millisecond expiry `secs` after `now`, or `None` when out of range.
fn expiry_after(now: DateTime<Utc>, secs: i64) -> Option<i64> {
    chrono::Duration::try_seconds(secs)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .map(|at| at.timestamp_millis())
}
