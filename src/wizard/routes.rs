//! REST endpoints for the team creation wizard.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use super::controller::{StepSubmission, Wizard};
use super::draft::TeamDraft;
use crate::error::Error;

/// Shared state for wizard routes.
#[derive(Clone, Default)]
pub struct WizardRouteState {
    pub wizard: Wizard,
}

#[derive(Debug, Deserialize)]
struct NavigateRequest {
    index: usize,
}

#[derive(Debug, Deserialize)]
struct SubmitRequest {
    #[serde(default)]
    draft: TeamDraft,
    submission: StepSubmission,
}

/// GET /settings/teams/new
async fn initial_view(State(state): State<WizardRouteState>) -> Response {
    step_view(&state.wizard, None)
}

/// GET /settings/teams/new/{*step}
///
/// The remainder must be exactly one known step. Extra segments make the whole
/// path an unknown step, which follows the configured fallback policy.
async fn view(State(state): State<WizardRouteState>, Path(rest): Path<String>) -> Response {
    let requested = rest.strip_suffix('/').unwrap_or(rest.as_str());
    step_view(&state.wizard, Some(requested))
}

fn step_view(wizard: &Wizard, requested: Option<&str>) -> Response {
    match wizard.resolve(requested) {
        Ok(step) => Json(wizard.view(step)).into_response(),
        Err(e) => Error::from(e).into_response(),
    }
}

/// POST /api/teams/new/navigate
///
/// Returns the navigation command, or 204 when the index is out of range.
async fn navigate(
    State(state): State<WizardRouteState>,
    Json(req): Json<NavigateRequest>,
) -> Response {
    match state.wizard.go_to_index(req.index) {
        Some(nav) => Json(nav).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// POST /api/teams/new/{step}/submit
async fn submit(
    State(state): State<WizardRouteState>,
    Path(step): Path<String>,
    Json(req): Json<SubmitRequest>,
) -> Result<Response, Error> {
    let step = state.wizard.resolve(Some(&step))?;
    let outcome = state.wizard.submit(step, req.draft, req.submission)?;
    Ok(Json(outcome).into_response())
}

/// Build the wizard routes.
pub fn wizard_routes(state: WizardRouteState) -> Router {
    Router::new()
        .route("/settings/teams/new", get(initial_view))
        .route("/settings/teams/new/", get(initial_view))
        .route("/settings/teams/new/{*step}", get(view))
        .route("/api/teams/new/navigate", post(navigate))
        .route("/api/teams/new/{step}/submit", post(submit))
        .with_state(state)
}
