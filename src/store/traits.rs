//! `Database` trait — async interface for the records this service reads.

use async_trait::async_trait;

use crate::error::DatabaseError;

/// A persisted OAuth credential bundle for one user and provider type.
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialRecord {
    pub id: i64,
    /// Provider-type tag, e.g. `google_workspace_directory`.
    pub kind: String,
    pub user_id: i64,
    /// Raw token payload as stored.
    pub key: serde_json::Value,
}

/// Backend-agnostic database trait covering credentials and app keys.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;

    // ── Credentials ─────────────────────────────────────────────────

    /// First credential of `kind` belonging to `user_id`, if any.
    async fn find_credential(
        &self,
        kind: &str,
        user_id: i64,
    ) -> Result<Option<CredentialRecord>, DatabaseError>;

    /// Store a credential and return its id.
    async fn insert_credential(
        &self,
        kind: &str,
        user_id: i64,
        key: &serde_json::Value,
    ) -> Result<i64, DatabaseError>;

    // ── App keys ────────────────────────────────────────────────────

    /// Key object configured for an app slug, if any.
    async fn get_app_keys(&self, slug: &str) -> Result<Option<serde_json::Value>, DatabaseError>;

    /// Insert or replace the key object for an app slug.
    async fn set_app_keys(&self, slug: &str, keys: &serde_json::Value)
    -> Result<(), DatabaseError>;
}
