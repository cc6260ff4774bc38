//! Admin SDK directory client.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use super::oauth::OAuthClient;
use crate::config::DirectoryConfig;
use crate::error::DirectoryError;

/// Parameters for `users.list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    pub max_results: u32,
    pub customer: String,
}

impl From<&DirectoryConfig> for ListUsersQuery {
    fn from(config: &DirectoryConfig) -> Self {
        Self {
            max_results: config.max_results,
            customer: config.customer.clone(),
        }
    }
}

/// A directory user. Only the fields this service reads are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryUser {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub primary_email: Option<String>,
}

/// One page of `users.list`. `users` is omitted by the API when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersPage {
    #[serde(default)]
    pub users: Option<Vec<DirectoryUser>>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Remote directory operations.
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    /// List users visible to the authorized client.
    async fn list_users(
        &self,
        auth: &OAuthClient,
        query: &ListUsersQuery,
    ) -> Result<UsersPage, DirectoryError>;
}

/// `reqwest`-backed Admin SDK Directory client.
pub struct GoogleDirectoryClient {
    http: reqwest::Client,
    api_base: String,
}

impl GoogleDirectoryClient {
    pub fn new(config: &DirectoryConfig) -> Result<Self, DirectoryError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_http(http, &config.api_base))
    }

    pub fn with_http(http: reqwest::Client, api_base: &str) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn users_url(&self) -> String {
        format!("{}/admin/directory/v1/users", self.api_base)
    }
}

#[async_trait]
impl DirectoryApi for GoogleDirectoryClient {
    async fn list_users(
        &self,
        auth: &OAuthClient,
        query: &ListUsersQuery,
    ) -> Result<UsersPage, DirectoryError> {
        let token = auth.access_token(&self.http).await?;

        let resp = self
            .http
            .get(self.users_url())
            .bearer_auth(token.expose_secret())
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "Directory users.list failed");
            return Err(DirectoryError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let page: UsersPage = resp.json().await?;
        tracing::debug!(
            users = page.users.as_ref().map_or(0, Vec::len),
            has_more = page.next_page_token.is_some(),
            "Directory users.list returned"
        );
        Ok(page)
    }
}
