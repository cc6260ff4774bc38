//! libSQL backend — async `Database` trait implementation.
//!
//! Supports local file and in-memory databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};

use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::{CredentialRecord, Database};

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        Ok(backend)
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Parse a stored JSON column.
fn parse_json(column: &str, raw: &str) -> Result<serde_json::Value, DatabaseError> {
    serde_json::from_str(raw)
        .map_err(|e| DatabaseError::Serialization(format!("{column} is not valid JSON: {e}")))
}

fn row_to_credential(row: &libsql::Row) -> Result<CredentialRecord, DatabaseError> {
    let read = |e: libsql::Error| DatabaseError::Query(format!("credential row parse: {e}"));
    let id: i64 = row.get(0).map_err(read)?;
    let kind: String = row.get(1).map_err(read)?;
    let user_id: i64 = row.get(2).map_err(read)?;
    let key: String = row.get(3).map_err(read)?;

    Ok(CredentialRecord {
        id,
        kind,
        user_id,
        key: parse_json("credentials.key", &key)?,
    })
}

#[async_trait]
impl Database for LibSqlBackend {
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    // ── Credentials ─────────────────────────────────────────────────

    async fn find_credential(
        &self,
        kind: &str,
        user_id: i64,
    ) -> Result<Option<CredentialRecord>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, type, user_id, key FROM credentials
                 WHERE type = ?1 AND user_id = ?2
                 ORDER BY id ASC LIMIT 1",
                params![kind, user_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("find_credential: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let record = row_to_credential(&row)?;
                debug!(credential_id = record.id, kind, user_id, "Credential found");
                Ok(Some(record))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("find_credential: {e}"))),
        }
    }

    async fn insert_credential(
        &self,
        kind: &str,
        user_id: i64,
        key: &serde_json::Value,
    ) -> Result<i64, DatabaseError> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO credentials (type, user_id, key) VALUES (?1, ?2, ?3)",
            params![kind, user_id, key.to_string()],
        )
        .await
        .map_err(|e| DatabaseError::Query(format!("insert_credential: {e}")))?;

        let id = conn.last_insert_rowid();
        debug!(credential_id = id, kind, user_id, "Credential stored");
        Ok(id)
    }

    // ── App keys ────────────────────────────────────────────────────

    async fn get_app_keys(&self, slug: &str) -> Result<Option<serde_json::Value>, DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT keys FROM app_keys WHERE slug = ?1", params![slug])
            .await
            .map_err(|e| DatabaseError::Query(format!("get_app_keys: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let raw: String = row
                    .get(0)
                    .map_err(|e| DatabaseError::Query(format!("get_app_keys row parse: {e}")))?;
                Ok(Some(parse_json("app_keys.keys", &raw)?))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_app_keys: {e}"))),
        }
    }

    async fn set_app_keys(
        &self,
        slug: &str,
        keys: &serde_json::Value,
    ) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO app_keys (slug, keys, updated_at) VALUES (?1, ?2, datetime('now'))
                 ON CONFLICT(slug) DO UPDATE SET keys = excluded.keys, updated_at = excluded.updated_at",
                params![slug, keys.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("set_app_keys: {e}")))?;

        debug!(slug, "App keys updated");
        Ok(())
    }
}
