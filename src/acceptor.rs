//! The acceptor: a single task that listens on the configured TCP port and
//! spawns a session for every accepted connection.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::session;
use crate::world::World;

/// Binds `0.0.0.0:{world.config.port}` and accepts connections until
/// `shutdown` is cancelled or `accept` fails. A listener failure other than
/// shutdown is treated as fatal, matching the process exiting non-zero on
/// an unrecoverable bind/accept failure.
pub async fn run(world: Arc<World>, shutdown: CancellationToken) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", world.config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind relay socket on {addr}"))?;

    tracing::warn!(%addr, "listening for connections");

    loop {
        let accepted = tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => accepted,
        };

        match accepted {
            Ok((stream, addr)) => {
                tracing::warn!(%addr, "new connection");
                let world = world.clone();
                tokio::spawn(async move {
                    session::admit(stream, addr, world).await;
                });
            }
            Err(error) => {
                tracing::error!(%error, "accept failed");
                break;
            }
        }
    }

    Ok(())
}
