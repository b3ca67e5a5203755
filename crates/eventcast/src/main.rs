mod aggregate;
mod app;
mod cache;
mod config;
mod handlers;
mod sources;
mod state;
#[cfg(test)]
mod test_support;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use listenfd::ListenFd;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eventcast_core::cache::Cache;

use crate::{app::create_app, config::Config, sources::ReqwestFetcher, state::AppState};

/// eventcast - Cached, rate-limited aggregation of community event listings
#[derive(Parser, Debug)]
#[command(name = "eventcast")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Host address to bind the server to
    #[arg(long, short = 'H', default_value = "0.0.0.0", env = "HOST")]
    host: String,

    /// Port to listen on
    #[arg(long, short, default_value = "3000", env = "PORT")]
    port: u16,

    /// Path to the YAML configuration file
    #[arg(long, short, default_value = "config.yaml", env = "EVENTCAST_CONFIG")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eventcast=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    tracing::info!(
        title = %config.metadata.title,
        description = %config.metadata.description,
        feeds = config.feeds.len(),
        timezone = %config.default_timezone,
        "Loaded configuration"
    );

    let store = create_store(&config).await?;
    let http = Arc::new(ReqwestFetcher::new(config.user_agent().as_deref())?);
    let state = AppState::from_config(&config, store, http)?;

    // Build the application router
    let app = create_app(state);

    // Auto-reload support via listenfd
    let mut listenfd = ListenFd::from_env();
    let listener = match listenfd.take_tcp_listener(0)? {
        // If we are given a tcp listener on listen fd 0, use that one
        Some(listener) => {
            listener.set_nonblocking(true)?;
            TcpListener::from_std(listener)?
        }
        // Otherwise fall back to CLI-specified host:port
        None => {
            let addr = format!("{}:{}", cli.host, cli.port);
            TcpListener::bind(&addr).await?
        }
    };

    tracing::info!("listening on {}", listener.local_addr()?);

    // Run the server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Creates the in-memory cache store.
#[cfg(feature = "memory")]
async fn create_store(config: &Config) -> Result<Arc<dyn Cache>> {
    use crate::cache::MemoryCache;

    if config.redis_url.is_some() {
        tracing::warn!("REDIS_URL is set but this build uses the memory backend");
    }
    tracing::info!(max_entries = config.cache.max_entries, "Using in-memory cache");
    Ok(Arc::new(MemoryCache::new(config.cache.max_entries)))
}

/// Creates the Redis cache store from `REDIS_URL`.
#[cfg(feature = "redis")]
async fn create_store(config: &Config) -> Result<Arc<dyn Cache>> {
    use crate::cache::RedisCache;

    let url = config
        .redis_url
        .as_deref()
        .context("REDIS_URL must be set for the redis backend")?;
    tracing::info!("Connecting to Redis cache");
    Ok(Arc::new(RedisCache::new(url).await?))
}

/// Wait for shutdown signals (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
