use clap::Parser;
use minecraft_offline_server::{Server, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::parse();
    let server = Server::bind(config).await?;
    tracing::info!("Listening on {}", server.local_addr()?);

    let shutdown = server.shutdown_token();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutting down");
                shutdown.cancel();
            }
            Err(e) => tracing::warn!("Failed to listen for Ctrl-C: {e}"),
        }
    });

    server.run().await
}
