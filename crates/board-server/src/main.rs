mod config;

use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use board_api::{AppStateInner, Templates, TokenIssuer};
use board_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "board=debug,board_api=debug,board_db=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: {e}");
            eprintln!("       Check your .env file and restart.");
            std::process::exit(1);
        }
    };

    // Init database
    let db = Database::open(&config.db_path)?;

    // Shared state
    let tokens = TokenIssuer::new(&config.jwt_secret, config.token_ttl);
    let templates = Templates::new()?;
    let state = AppStateInner::new(db, tokens, templates);

    let app = board_api::router(state).layer(TraceLayer::new_for_http());

    info!("Message board listening on {}", config.addr);
    info!("Session tokens valid for {} hours", config.token_ttl.num_hours());

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("SIGTERM handler unavailable, only Ctrl+C will stop the server: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!("Ctrl+C handler failed: {}", e);
            }
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
