use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use health_track_api::config::ServerConfig;
use health_track_api::{create_application, AppState};
use health_track_data::database::{initialize_database_pool, DatabaseConfig};
use health_track_domain::advice::{AdviceProvider, LlmAdvisor, LlmConfig};
use health_track_domain::auth::{TokenConfig, TokenService};
use health_track_domain::security::CredentialCipher;

/// The main entry point for the HealthTrack API server
///
/// This function:
/// 1. Initializes environment variables from .env file
/// 2. Sets up tracing for logging
/// 3. Opens the database and runs migrations
/// 4. Builds the services and the Axum application
/// 5. Serves until Ctrl+C or SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(false)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stdout),
        )
        .with(env_filter)
        .init();

    info!("🚀 Starting HealthTrack API server");

    let config = ServerConfig::from_env()?;

    if !config.data_dir.exists() {
        info!("Creating data directory: {}", config.data_dir.display());
        std::fs::create_dir_all(&config.data_dir)
            .with_context(|| format!("failed to create data directory {}", config.data_dir.display()))?;
    }

    let mut db_config = DatabaseConfig::from_env()?;
    if env::var("DB_SQLITE_PATH").is_err() {
        db_config.sqlite_path = config.default_database_path().to_string_lossy().into_owned();
    }

    let pool = initialize_database_pool(&db_config).map_err(|e| {
        error!("Failed to initialize database pool: {}", e);
        e
    })?;
    info!("Using SQLite database at {}", db_config.sqlite_path);

    let token_config = TokenConfig::from_env().context("JWT configuration is incomplete")?;
    let cipher = CredentialCipher::from_env(&token_config.secret)?;
    info!("Credential cipher ready with key id {}", cipher.key_id());

    let advisor: Option<Arc<dyn AdviceProvider>> = match LlmConfig::from_env() {
        Some(llm_config) => {
            info!("LLM advisor enabled with model {}", llm_config.model);
            Some(Arc::new(LlmAdvisor::new(llm_config)?))
        }
        None => {
            warn!("LLM_API_URL or LLM_API_KEY not set; recommendations use built-in rules");
            None
        }
    };

    let tokens = Arc::new(TokenService::new(token_config));
    let state = AppState::new(pool, tokens, cipher, advisor);
    let app = create_application(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {} ({})", addr, config.environment);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down server...");
}
