//! Accept loop and per-connection workers.

use crate::{
    config::ServerConfig,
    session::{Outcome, Session},
};
use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpListener,
    select,
};
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::Instrument;

/// A bound listener plus the token that stops it and every worker it spawned.
pub struct Server {
    listener: TcpListener,
    config: Arc<ServerConfig>,
    shutdown: CancellationToken,
}

impl Server {
    pub async fn bind(config: ServerConfig) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(config.bind)
            .await
            .with_context(|| format!("failed to bind {}", config.bind))?;
        Ok(Self {
            listener,
            config: Arc::new(config),
            shutdown: CancellationToken::new(),
        })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Cancelling the returned token stops accepting and ends all open sessions.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Accepts connections until shut down, then waits for the workers to exit.
    pub async fn run(self) -> anyhow::Result<()> {
        let workers = TaskTracker::new();

        loop {
            let (stream, peer) = select! {
                _ = self.shutdown.cancelled() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        tracing::warn!("Failed to accept connection: {e}");
                        continue;
                    }
                },
            };

            tracing::debug!("Accepted connection from {peer}");
            stream.set_nodelay(true).ok();
            workers.spawn(
                drive_connection(stream, self.config.clone(), self.shutdown.clone())
                    .instrument(tracing::info_span!("connection", %peer)),
            );
        }

        workers.close();
        workers.wait().await;
        tracing::info!("Server stopped");
        Ok(())
    }
}

/// Runs one session to completion or until shutdown.
pub async fn drive_connection<Io>(io: Io, config: Arc<ServerConfig>, shutdown: CancellationToken)
where
    Io: AsyncRead + AsyncWrite + Unpin,
{
    let result = select! {
        _ = shutdown.cancelled() => {
            tracing::debug!("Dropping connection on shutdown");
            return;
        }
        result = Session::new(io, config).run() => result,
    };

    match result {
        Ok(Outcome::Status) => tracing::debug!("Served status"),
        Ok(Outcome::Joined { username, .. }) => tracing::info!("{username} joined"),
        Err(e) if e.is_disconnect() => tracing::debug!("Connection lost: {e}"),
        Err(e) => tracing::info!("Closing connection: {e}"),
    }
}
