//! Google Workspace directory integration.
//!
//! Reads a user's stored `google_workspace_directory` OAuth credential,
//! restores an OAuth2 client from it and the provider app's keys, and lists
//! the workspace's users through the Admin SDK Directory API. Single-domain
//! only (`customer=my_customer`).

pub mod client;
pub mod credentials;
pub mod oauth;
pub mod routes;
pub mod sync;

pub use client::{DirectoryApi, DirectoryUser, GoogleDirectoryClient, ListUsersQuery, UsersPage};
pub use credentials::{WORKSPACE_DIRECTORY_CREDENTIAL, WorkspaceTokens};
pub use oauth::OAuthClient;
pub use routes::{DirectoryRouteState, directory_routes};
pub use sync::DirectorySync;
