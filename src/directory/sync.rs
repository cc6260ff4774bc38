//! Workspace directory sync — fetch member emails for the caller's workspace.

use std::sync::Arc;

use secrecy::ExposeSecret;
use tracing::{debug, info};

use super::client::{DirectoryApi, DirectoryUser, ListUsersQuery};
use super::credentials::{WORKSPACE_DIRECTORY_CREDENTIAL, WorkspaceTokens};
use super::oauth::OAuthClient;
use crate::config::{AppKeys, DirectoryConfig, GOOGLE_APP_SLUG};
use crate::context::SessionUser;
use crate::error::{ConfigError, DirectoryError, Result};
use crate::store::Database;

/// Looks up stored workspace credentials and queries the directory.
///
/// Application keys are read from the store on every call; nothing is
/// cached between requests.
pub struct DirectorySync {
    db: Arc<dyn Database>,
    api: Arc<dyn DirectoryApi>,
    config: DirectoryConfig,
}

impl DirectorySync {
    pub fn new(db: Arc<dyn Database>, api: Arc<dyn DirectoryApi>, config: DirectoryConfig) -> Self {
        Self { db, api, config }
    }

    /// Id of the caller's directory credential, if one exists.
    pub async fn check_for_workspace(&self, user: &SessionUser) -> Result<Option<i64>> {
        let record = self
            .db
            .find_credential(WORKSPACE_DIRECTORY_CREDENTIAL, user.id)
            .await?;
        Ok(record.map(|r| r.id))
    }

    /// Resolve the provider application keys from the keyed app config.
    pub async fn app_keys(&self) -> Result<AppKeys> {
        let stored = self
            .db
            .get_app_keys(GOOGLE_APP_SLUG)
            .await?
            .unwrap_or_else(|| serde_json::json!({}));
        Ok(AppKeys::from_value(GOOGLE_APP_SLUG, &stored)?)
    }

    /// Resolve app keys, then fetch the caller's directory emails.
    pub async fn sync(&self, user: &SessionUser) -> Result<Vec<String>> {
        let app = self.app_keys().await?;
        self.users_from_workspace(user, &app).await
    }

    /// Primary emails of every user in the caller's workspace directory,
    /// in provider order.
    ///
    /// Fails with `NotFound` before any network call when the caller has no
    /// stored directory credential.
    pub async fn users_from_workspace(&self, user: &SessionUser, app: &AppKeys) -> Result<Vec<String>> {
        // Same rule as `AppKeys::from_value`: blank counts as missing.
        if app.client_id.trim().is_empty() {
            return Err(missing_key("client_id").into());
        }
        if app.client_secret.expose_secret().trim().is_empty() {
            return Err(missing_key("client_secret").into());
        }

        let record = self
            .db
            .find_credential(WORKSPACE_DIRECTORY_CREDENTIAL, user.id)
            .await?
            .ok_or(DirectoryError::NotFound { user_id: user.id })?;

        let tokens = WorkspaceTokens::from_record(&record)?;
        let auth = OAuthClient::new(app, &self.config.token_url).with_credentials(tokens);

        let query = ListUsersQuery::from(&self.config);
        debug!(user_id = user.id, credential_id = record.id, "Listing workspace users");
        let page = self.api.list_users(&auth, &query).await?;

        let emails = primary_emails(page.users.unwrap_or_default());
        info!(user_id = user.id, count = emails.len(), "Fetched workspace directory users");
        Ok(emails)
    }
}

fn missing_key(field: &str) -> ConfigError {
    ConfigError::MissingRequired {
        key: format!("{GOOGLE_APP_SLUG}.{field}"),
        hint: format!("Google {field} missing."),
    }
}

/// Project users to their primary emails, skipping users without one.
fn primary_emails(users: Vec<DirectoryUser>) -> Vec<String> {
    users
        .into_iter()
        .filter_map(|u| {
            if u.primary_email.is_none() {
                debug!(user = ?u.id, "Directory user without primary email skipped");
            }
            u.primary_email
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use secrecy::SecretString;
    use serde_json::json;

    use super::*;
    use crate::directory::client::UsersPage;
    use crate::error::Error;
    use crate::store::LibSqlBackend;

    /// Stub directory that records calls and returns a canned page.
    struct StubDirectory {
        page: UsersPage,
        calls: AtomicUsize,
        seen: Mutex<Vec<(ListUsersQuery, WorkspaceTokens)>>,
    }

    impl StubDirectory {
        fn new(page: UsersPage) -> Arc<Self> {
            Arc::new(Self {
                page,
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DirectoryApi for StubDirectory {
        async fn list_users(
            &self,
            auth: &OAuthClient,
            query: &ListUsersQuery,
        ) -> std::result::Result<UsersPage, DirectoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen
                .lock()
                .unwrap()
                .push((query.clone(), auth.credentials().clone()));
            Ok(self.page.clone())
        }
    }

    fn users(emails: &[&str]) -> UsersPage {
        UsersPage {
            users: Some(
                emails
                    .iter()
                    .enumerate()
                    .map(|(i, e)| DirectoryUser {
                        id: Some(i.to_string()),
                        primary_email: Some(e.to_string()),
                    })
                    .collect(),
            ),
            next_page_token: None,
        }
    }

    async fn setup(page: UsersPage) -> (Arc<LibSqlBackend>, Arc<StubDirectory>, DirectorySync) {
        let db = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        let api = StubDirectory::new(page);
        let sync = DirectorySync::new(db.clone(), api.clone(), DirectoryConfig::default());
        (db, api, sync)
    }

    fn app() -> AppKeys {
        AppKeys {
            client_id: "client".into(),
            client_secret: SecretString::from("secret"),
        }
    }

    #[tokio::test]
    async fn returns_emails_in_provider_order() {
        let (db, api, sync) = setup(users(&["c@x.com", "a@x.com", "b@x.com"])).await;
        db.insert_credential(
            WORKSPACE_DIRECTORY_CREDENTIAL,
            1,
            &json!({"refresh_token": "r", "access_token": "a"}),
        )
        .await
        .unwrap();

        let emails = sync.users_from_workspace(&SessionUser::new(1), &app()).await.unwrap();
        assert_eq!(emails, vec!["c@x.com", "a@x.com", "b@x.com"]);
        assert_eq!(api.calls(), 1);

        let seen = api.seen.lock().unwrap();
        let (query, tokens) = &seen[0];
        assert_eq!(query.max_results, 200);
        assert_eq!(query.customer, "my_customer");
        assert_eq!(tokens.refresh_token.as_deref(), Some("r"));
        assert_eq!(tokens.access_token.as_deref(), Some("a"));
        assert!(tokens.scope.is_none());
    }

    #[tokio::test]
    async fn no_users_yields_empty_list() {
        let (db, _api, sync) = setup(UsersPage::default()).await;
        db.insert_credential(WORKSPACE_DIRECTORY_CREDENTIAL, 1, &json!({}))
            .await
            .unwrap();

        let emails = sync.users_from_workspace(&SessionUser::new(1), &app()).await.unwrap();
        assert!(emails.is_empty());
    }

    #[tokio::test]
    async fn users_without_primary_email_are_skipped() {
        let page = UsersPage {
            users: Some(vec![
                DirectoryUser {
                    id: Some("1".into()),
                    primary_email: None,
                },
                DirectoryUser {
                    id: Some("2".into()),
                    primary_email: Some("z@x.com".into()),
                },
            ]),
            next_page_token: None,
        };
        let (db, _api, sync) = setup(page).await;
        db.insert_credential(WORKSPACE_DIRECTORY_CREDENTIAL, 1, &json!({}))
            .await
            .unwrap();

        let emails = sync.users_from_workspace(&SessionUser::new(1), &app()).await.unwrap();
        assert_eq!(emails, vec!["z@x.com"]);
    }

    #[tokio::test]
    async fn missing_credential_is_not_found_before_network() {
        let (db, api, sync) = setup(users(&["a@x.com"])).await;
        // Another user's credential must not be used.
        db.insert_credential(WORKSPACE_DIRECTORY_CREDENTIAL, 2, &json!({}))
            .await
            .unwrap();

        let err = sync
            .users_from_workspace(&SessionUser::new(1), &app())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Directory(DirectoryError::NotFound { user_id: 1 })
        ));
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn missing_client_id_is_config_error_before_network() {
        let (db, api, sync) = setup(users(&["a@x.com"])).await;
        db.insert_credential(WORKSPACE_DIRECTORY_CREDENTIAL, 1, &json!({}))
            .await
            .unwrap();
        db.set_app_keys(GOOGLE_APP_SLUG, &json!({"client_secret": "s"}))
            .await
            .unwrap();

        let err = sync.sync(&SessionUser::new(1)).await.unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::MissingRequired { .. })));
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn missing_app_keys_row_is_config_error() {
        let (db, api, sync) = setup(users(&["a@x.com"])).await;
        db.insert_credential(WORKSPACE_DIRECTORY_CREDENTIAL, 1, &json!({}))
            .await
            .unwrap();

        let err = sync.sync(&SessionUser::new(1)).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(api.calls(), 0);
    }

    // Regression: a missing client secret used to be ignored and the call
    // went out with an empty secret.
    #[tokio::test]
    async fn missing_client_secret_is_config_error_before_network() {
        let (db, api, sync) = setup(users(&["a@x.com"])).await;
        db.insert_credential(WORKSPACE_DIRECTORY_CREDENTIAL, 1, &json!({}))
            .await
            .unwrap();
        db.set_app_keys(GOOGLE_APP_SLUG, &json!({"client_id": "id", "client_secret": ""}))
            .await
            .unwrap();

        let err = sync.sync(&SessionUser::new(1)).await.unwrap_err();
        match err {
            Error::Config(ConfigError::MissingRequired { key, .. }) => {
                assert_eq!(key, "google-calendar.client_secret")
            }
            other => panic!("expected missing client_secret, got {other:?}"),
        }
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn explicit_keys_with_empty_secret_are_rejected() {
        let (db, api, sync) = setup(users(&["a@x.com"])).await;
        db.insert_credential(WORKSPACE_DIRECTORY_CREDENTIAL, 1, &json!({}))
            .await
            .unwrap();
        let keys = AppKeys {
            client_id: "id".into(),
            client_secret: SecretString::from(""),
        };

        let err = sync
            .users_from_workspace(&SessionUser::new(1), &keys)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::MissingRequired { .. })));
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn explicit_keys_with_blank_values_are_rejected() {
        let (db, api, sync) = setup(users(&["a@x.com"])).await;
        db.insert_credential(WORKSPACE_DIRECTORY_CREDENTIAL, 1, &json!({}))
            .await
            .unwrap();

        let blank_id = AppKeys {
            client_id: "  ".into(),
            client_secret: SecretString::from("secret"),
        };
        let err = sync
            .users_from_workspace(&SessionUser::new(1), &blank_id)
            .await
            .unwrap_err();
        match err {
            Error::Config(ConfigError::MissingRequired { key, .. }) => {
                assert_eq!(key, "google-calendar.client_id")
            }
            other => panic!("expected missing client_id, got {other:?}"),
        }

        let blank_secret = AppKeys {
            client_id: "id".into(),
            client_secret: SecretString::from("\t "),
        };
        let err = sync
            .users_from_workspace(&SessionUser::new(1), &blank_secret)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingRequired { key, .. }) if key == "google-calendar.client_secret"
        ));
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn sync_uses_stored_app_keys() {
        let (db, api, sync) = setup(users(&["a@x.com"])).await;
        db.insert_credential(WORKSPACE_DIRECTORY_CREDENTIAL, 1, &json!({"access_token": "t"}))
            .await
            .unwrap();
        db.set_app_keys(GOOGLE_APP_SLUG, &app().to_value())
            .await
            .unwrap();

        let emails = sync.sync(&SessionUser::new(1)).await.unwrap();
        assert_eq!(emails, vec!["a@x.com"]);
        assert_eq!(api.calls(), 1);
    }

    #[tokio::test]
    async fn malformed_credential_is_reported() {
        let (db, api, sync) = setup(users(&["a@x.com"])).await;
        db.insert_credential(WORKSPACE_DIRECTORY_CREDENTIAL, 1, &json!(["nope"]))
            .await
            .unwrap();

        let err = sync
            .users_from_workspace(&SessionUser::new(1), &app())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Directory(DirectoryError::MalformedCredential { .. })
        ));
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn check_for_workspace_returns_credential_id() {
        let (db, _api, sync) = setup(UsersPage::default()).await;
        assert_eq!(
            sync.check_for_workspace(&SessionUser::new(3)).await.unwrap(),
            None
        );

        let id = db
            .insert_credential(WORKSPACE_DIRECTORY_CREDENTIAL, 3, &json!({}))
            .await
            .unwrap();
        assert_eq!(
            sync.check_for_workspace(&SessionUser::new(3)).await.unwrap(),
            Some(id)
        );
    }
}
