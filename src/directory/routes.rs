//! REST endpoints for the workspace directory integration.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use super::sync::DirectorySync;
use crate::context::SessionUser;
use crate::error::Error;

/// Shared state for directory routes.
#[derive(Clone)]
pub struct DirectoryRouteState {
    pub sync: Arc<DirectorySync>,
}

#[derive(Debug, Serialize)]
struct CheckResponse {
    id: Option<i64>,
}

/// GET /api/apps/google-workspace/check
async fn check(
    State(state): State<DirectoryRouteState>,
    user: SessionUser,
) -> Result<Json<CheckResponse>, Error> {
    let id = state.sync.check_for_workspace(&user).await?;
    Ok(Json(CheckResponse { id }))
}

/// GET /api/apps/google-workspace/users
async fn users(
    State(state): State<DirectoryRouteState>,
    user: SessionUser,
) -> Result<Json<Vec<String>>, Error> {
    Ok(Json(state.sync.sync(&user).await?))
}

/// Build the directory REST routes.
pub fn directory_routes(state: DirectoryRouteState) -> Router {
    Router::new()
        .route("/api/apps/google-workspace/check", get(check))
        .route("/api/apps/google-workspace/users", get(users))
        .with_state(state)
}
