use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flux_gateway::{AppConfig, WorkersAiClient, build_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Arc::new(AppConfig::from_env()?);
    let client = Arc::new(WorkersAiClient::new(config.as_ref())?);
    tracing::info!(url = %client.url(), timeout = ?config.upstream_timeout, "Workers AI client configured");

    let router = build_router(config.clone(), client);

    let listener = TcpListener::bind(config.listen_addr).await?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "gateway ready");

    axum::serve(listener, router).await?;

    Ok(())
}

const DEFAULT_LOG_FILTER: &str = "info,flux_gateway=debug,hyper=warn,axum::rejection=trace";

fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
