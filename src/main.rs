// hubcache: caching HTTP proxy for GitHub issues and pull requests.
// Wires config, client, cache, and router together and serves until SIGINT.

mod cache;
mod config;
mod error;
mod github;
mod http;
mod repo;

use std::sync::Arc;

use tracing::info;

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::error::Result;
use crate::github::GitHubClient;
use crate::http::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::from_env();
    let client = GitHubClient::new(&config)?;
    let cache = ResponseCache::new(config.cache_ttl);
    let state = Arc::new(AppState { client, cache });

    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(
        addr = %config.bind_addr,
        ttl_secs = config.cache_ttl.as_secs(),
        authenticated = config.github_token.is_some(),
        "hubcache listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("hubcache=info,tower_http=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
