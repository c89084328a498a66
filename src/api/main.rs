use anyhow::Context;
use std::net::SocketAddr;
use tracing::{error, info};

use model_api::config::Config;
use model_api::middleware::{init_observability, shutdown_observability};
use model_api::routes::{AppState, create_app};

// Panic hook to catch and log panics
fn setup_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("PANIC occurred!");
        if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            eprintln!("Panic message: {}", s);
        }
        if let Some(location) = panic_info.location() {
            eprintln!(
                "Panic location: {}:{}:{}",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!("Backtrace:\n{:?}", std::backtrace::Backtrace::capture());
    }));
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    setup_panic_hook();

    let config = Config::from_env().context("invalid configuration")?;
    init_observability(&config);
    info!("Application starting...");

    let (app_state, change_feed) = AppState::from_config(&config)
        .await
        .context("failed to initialize storage")?;

    // The in-memory store publishes its own change feed; PostgreSQL changes
    // arrive through POST /api/streams/records instead.
    if let Some(feed) = change_feed {
        let dispatcher = app_state.dispatcher.clone();
        tokio::spawn(dispatcher.run(feed, config.change_feed_batch_size));
    }

    let app = create_app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on {}", addr);
    info!("Health check available at http://{}/health", addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server shutdown complete");
    shutdown_observability().await;
    Ok(())
}

// Handle both SIGINT (Ctrl+C) and SIGTERM (container stop)
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        info!("SIGINT received, shutting down gracefully");
                    }
                    _ = sigterm.recv() => {
                        info!("SIGTERM received, shutting down gracefully");
                    }
                }
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
                info!("SIGINT received, shutting down gracefully");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutdown signal received");
    }
}
