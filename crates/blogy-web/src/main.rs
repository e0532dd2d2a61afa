use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use blogy_core::MemoryUserStore;
use blogy_web::config::ServerConfig;
use blogy_web::state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blogy_web=debug,blogy_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::load()?;
    let bind_addr = config.bind_addr;
    tracing::info!(
        "Rate limit: {} requests/minute, burst {}",
        config.rate_limit.requests_per_minute,
        config.rate_limit.burst
    );
    if config.rate_limit.trust_proxy_headers {
        tracing::info!("Keying clients by X-Forwarded-For / X-Real-IP");
    }

    let metrics = blogy_web::middleware::metrics::install_recorder()?;
    let store = Arc::new(MemoryUserStore::new());
    let state = AppState::new(config, store, metrics)?;

    // Idle rate-limit bucket cleanup and histogram upkeep
    let limiter = state.limiter.clone();
    let metrics = state.metrics.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            limiter.purge_idle();
            metrics.run_upkeep();
        }
    });

    let app = blogy_web::build_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("blogy-web listening on http://{}", bind_addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server exited");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
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

    tracing::info!("Shutting down server...");
}
