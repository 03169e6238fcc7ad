use anyhow::{Context, Result};
use std::sync::Arc;
use synopsis::{api, config, logging, processing};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Arc::new(config::init_config().context("failed to load configuration")?);
    logging::init_tracing(&config.log_file);
    config.log_summary();
    if config.api_key.is_none() {
        tracing::warn!("API_KEY is not set; every summary will report a generation failure");
    }

    let service = processing::SummaryService::new(config.clone())
        .context("failed to build summarization client")?;
    let app = api::create_router(Arc::new(service), config.max_upload_bytes);

    let listener = bind_listener(config.server_port).await?;
    tracing::info!("Listening on http://0.0.0.0:{}", config.server_port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated unexpectedly")?;
    Ok(())
}

async fn bind_listener(port: u16) -> Result<TcpListener> {
    use std::net::Ipv4Addr;

    TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
        .await
        .with_context(|| format!("failed to bind port {port}"))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
