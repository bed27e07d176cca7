use std::sync::Arc;

use axum::http::HeaderName;
use onboarding_prefs::config::ServerConfig;
use onboarding_prefs::error::{ConfigError, Result};
use onboarding_prefs::server;
use onboarding_prefs::store::{LibSqlBackend, PreferenceStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServerConfig::from_env()?;
    let identity_header = HeaderName::from_bytes(config.identity_header.as_bytes()).map_err(|e| {
        ConfigError::InvalidValue {
            key: "ONBOARDING_IDENTITY_HEADER".into(),
            message: e.to_string(),
        }
    })?;

    // ── Database ─────────────────────────────────────────────────────────
    let store: Arc<dyn PreferenceStore> = Arc::new(LibSqlBackend::new_local(&config.db_path).await?);

    // ── HTTP ─────────────────────────────────────────────────────────────
    let app = server::app(store, identity_header);
    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        %addr,
        db_path = %config.db_path.display(),
        identity_header = %config.identity_header,
        "Onboarding preferences server started"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
