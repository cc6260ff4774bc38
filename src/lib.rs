//! Team setup — team creation wizard and workspace directory sync.

pub mod config;
pub mod context;
pub mod directory;
pub mod error;
pub mod store;
pub mod wizard;

use axum::Router;
use axum::response::IntoResponse;
use axum::routing::get;

/// GET /health
async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
        "service": "team-setup"
    }))
}

/// Merge every feature router behind a shared health endpoint.
pub fn app_router(
    wizard: wizard::WizardRouteState,
    directory: directory::DirectoryRouteState,
) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(wizard::wizard_routes(wizard))
        .merge(directory::directory_routes(directory))
        .layer(tower_http::cors::CorsLayer::permissive())
}
