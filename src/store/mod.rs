//! Persistence layer — libSQL-backed storage for credentials and app keys.

pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use traits::{CredentialRecord, Database};
