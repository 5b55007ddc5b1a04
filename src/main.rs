//! gemproxy - A Gemini proxy for Bearblog sites

use anyhow::Context;
use tokio::signal;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gemproxy::admin::create_admin_router;
use gemproxy::gemini::serve;
use gemproxy::{AppState, Config};

/// Main entry point for the proxy.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the shared cache and upstream client
/// 4. Start the admin HTTP endpoint if configured
/// 5. Serve Gemini until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gemproxy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting gemproxy");

    let config = Config::from_env().context("failed to load configuration")?;
    info!(
        "Configuration loaded: upstream={}, feed_ttl={}s, document_ttl={}s, cache_max_size={}",
        config.upstream_url,
        config.feed_ttl.as_secs(),
        config.document_ttl.as_secs(),
        config.cache_max_size
    );

    let gemini_addr = format!("{}:{}", config.host, config.port);
    let admin_port = config.admin_port;

    let state = AppState::from_config(config).context("failed to build HTTP client")?;
    info!("Cache and upstream client initialized");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let admin_handle = match admin_port {
        Some(port) => {
            let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
                .await
                .with_context(|| format!("failed to bind admin port {}", port))?;
            info!("Admin endpoint listening on http://0.0.0.0:{}", port);

            let app = create_admin_router(state.clone());
            let mut rx = shutdown_rx.clone();
            Some(tokio::spawn(async move {
                axum::serve(listener, app)
                    .with_graceful_shutdown(async move {
                        let _ = rx.changed().await;
                    })
                    .await
            }))
        }
        None => None,
    };

    let listener = tokio::net::TcpListener::bind(&gemini_addr)
        .await
        .with_context(|| format!("failed to bind {}", gemini_addr))?;
    info!("Gemini listener on {}", gemini_addr);

    serve(listener, state, shutdown_signal())
        .await
        .context("Gemini listener failed")?;

    let _ = shutdown_tx.send(true);
    if let Some(handle) = admin_handle {
        handle
            .await
            .context("admin task panicked")?
            .context("admin endpoint failed")?;
    }

    info!("Shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
