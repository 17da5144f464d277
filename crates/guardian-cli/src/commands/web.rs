use crate::cli::WebArgs;
use anyhow::Result;
use guardian_server::AppState;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{info, warn};

pub async fn run(args: WebArgs) -> Result<()> {
    if args.reload {
        warn!("--reload is not supported, starting without hot reload");
    }

    let settings = super::load_settings(&args.model)?;
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    info!("Starting Guardian API server on {}", addr);
    info!("Model path: {}", settings.model_path.display());
    info!("Vectorizer path: {}", settings.vectorizer_path.display());

    let state = tokio::task::spawn_blocking(move || AppState::load(settings)).await??;

    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    guardian_server::serve(state, addr, shutdown).await?;
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
