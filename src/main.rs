use std::sync::Arc;

use team_setup::config::{AppKeys, DirectoryConfig, GOOGLE_APP_SLUG, ServerConfig};
use team_setup::directory::{DirectoryRouteState, DirectorySync, GoogleDirectoryClient};
use team_setup::store::{Database, LibSqlBackend};
use team_setup::wizard::{Wizard, WizardRouteState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| "Failed to install rustls crypto provider")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let server_config = ServerConfig::from_env()?;
    let directory_config = DirectoryConfig::from_env();

    eprintln!("👥 team-setup v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Wizard: http://0.0.0.0:{}/settings/teams/new", server_config.port);
    eprintln!("   Directory API: {}", directory_config.api_base);

    // ── Database ─────────────────────────────────────────────────────────
    let db: Arc<dyn Database> = Arc::new(LibSqlBackend::new_local(&server_config.db_path).await?);
    eprintln!("   Database: {}", server_config.db_path.display());

    if let Some(keys) = AppKeys::google_from_env() {
        db.set_app_keys(GOOGLE_APP_SLUG, &keys.to_value()).await?;
        tracing::info!(slug = GOOGLE_APP_SLUG, "Seeded app keys from environment");
    }

    // ── Features ─────────────────────────────────────────────────────────
    let api = Arc::new(GoogleDirectoryClient::new(&directory_config)?);
    let sync = Arc::new(DirectorySync::new(Arc::clone(&db), api, directory_config));

    let wizard = Wizard::new(server_config.step_fallback);
    eprintln!("   Unknown wizard steps: {:?}\n", wizard.fallback());

    let app = team_setup::app_router(WizardRouteState { wizard }, DirectoryRouteState { sync });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", server_config.port)).await?;
    tracing::info!(port = server_config.port, "HTTP server started");
    axum::serve(listener, app).await?;

    Ok(())
}
