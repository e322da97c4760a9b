//! Top-level server instance: owns the world, the acceptor, and the
//! liveness ticker, and coordinates graceful shutdown between them.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::world::World;
use crate::{acceptor, liveness};

async fn signal_listener(token: CancellationToken) -> anyhow::Result<()> {
    tokio::select! {
        _ = token.cancelled() => (),
        _ = tokio::signal::ctrl_c() => (),
    }

    Ok(())
}

pub struct Instance {
    world: Arc<World>,
    shutdown: CancellationToken,
}

impl Instance {
    pub fn new(config: ServerConfig) -> Instance {
        Instance { world: Arc::new(World::new(Arc::new(config))), shutdown: CancellationToken::new() }
    }

    /// Runs the acceptor, the liveness ticker, and the shutdown signal
    /// listener concurrently until any of them calls for shutdown, then
    /// disconnects every still-connected session.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        let acceptor_token = self.shutdown.clone();
        let acceptor_world = self.world.clone();
        let acceptor_handle =
            tokio::spawn(async move { acceptor::run(acceptor_world, acceptor_token).await });

        let liveness_token = self.shutdown.clone();
        let liveness_world = self.world.clone();
        let liveness_handle =
            tokio::spawn(async move { liveness::run(liveness_world, liveness_token).await });

        signal_listener(self.shutdown.clone()).await?;
        self.shutdown.cancel();

        tracing::warn!("shutting down, disconnecting all clients");
        for session in self.world.all_sessions() {
            session.disconnect();
        }

        let _ = acceptor_handle.await;
        let _ = liveness_handle.await;

        Ok(())
    }
}
