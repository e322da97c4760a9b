//! One session per connected client.

mod admission;
mod pong;
mod position;
mod read_loop;

pub use admission::admit;

use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::wire::{Frame, MapId, Nick};
use crate::world::World;

/// Bound on the per-session outbound queue. A session's own writer task
/// drains it in order, so this only needs to absorb a burst, not a
/// sustained mismatch between producer and consumer rate.
const OUTBOUND_QUEUE_DEPTH: usize = 256;

struct SessionState {
    map_id: Option<MapId>,
    last_spos: Option<Frame>,
    latency: [u8; 4],
    unresponded_pings: u32,
}

/// A single connected client.
///
/// The socket itself is owned exclusively by a dedicated writer task that
/// drains `outbound`; `Session` holds only the sending half of that
/// channel, which gives single-writer-per-connection ordering for free
/// without a lock the read loop would have to contend on.
pub struct Session {
    nick: Nick,
    remote_addr: SocketAddr,
    version: u32,
    outbound: mpsc::Sender<Frame>,
    state: Mutex<SessionState>,
    running: AtomicBool,
    shutdown: CancellationToken,
}

impl Session {
    fn new(
        nick: Nick,
        remote_addr: SocketAddr,
        version: u32,
        outbound: mpsc::Sender<Frame>,
        shutdown: CancellationToken,
    ) -> Session {
        Session {
            nick,
            remote_addr,
            version,
            outbound,
            state: Mutex::new(SessionState {
                map_id: None,
                last_spos: None,
                latency: *b"0000",
                unresponded_pings: 0,
            }),
            running: AtomicBool::new(true),
            shutdown,
        }
    }

    pub fn nick(&self) -> Nick {
        self.nick
    }

    pub fn remote_ip(&self) -> IpAddr {
        self.remote_addr.ip()
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn map_id(&self) -> Option<MapId> {
        self.state.lock().map_id
    }

    pub fn last_spos(&self) -> Option<Frame> {
        self.state.lock().last_spos
    }

    pub fn latency(&self) -> [u8; 4] {
        self.state.lock().latency
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Queues `frame` for delivery on this session's socket. Never performs
    /// the write itself — that happens on the dedicated writer task — so
    /// callers may call this while still holding the world lock only in
    /// tests; production call sites always release the lock first.
    pub async fn send(&self, frame: Frame) {
        if self.outbound.send(frame).await.is_err() {
            tracing::debug!(nick = %self.nick, "dropped outbound frame, writer task is gone");
        }
    }

    /// Increments the unresponded-ping counter and requests a `PING`,
    /// or tears the session down if too many pings have gone unanswered.
    /// Called by the liveness ticker against a snapshot of all sessions.
    pub async fn tick_liveness(self: &Arc<Self>, world: &World, now_millis: u64) {
        let exceeded = {
            let mut state = self.state.lock();
            if state.unresponded_pings >= world.config.max_missed_pongs {
                true
            } else {
                state.unresponded_pings += 1;
                false
            }
        };

        if exceeded {
            tracing::warn!(nick = %self.nick, "disconnecting due to inactivity");
            self.teardown(world).await;
            return;
        }

        let payload = now_millis.to_string();
        let frame = Frame::control(&world.config.server_nick, &crate::wire::TYPE_PING, payload.as_bytes());
        self.send(frame).await;
    }

    /// Resets the unresponded-ping counter, matching every `PONG` receipt
    /// regardless of whether its timestamp parsed.
    fn reset_unresponded_pings(&self) {
        self.state.lock().unresponded_pings = 0;
    }

    fn set_latency(&self, latency: [u8; 4]) {
        self.state.lock().latency = latency;
    }

    fn set_map_id(&self, map_id: MapId) {
        self.state.lock().map_id = Some(map_id);
    }

    fn set_last_spos(&self, frame: Frame) {
        self.state.lock().last_spos = Some(frame);
    }

    /// Requests that this session stop, without deregistering it or fanning
    /// out exit bulletins. Used on process shutdown, where every session is
    /// going away at once and there is no one left to tell.
    pub fn disconnect(&self) {
        self.running.store(false, Ordering::Release);
        self.shutdown.cancel();
    }

    /// Stops the read loop, closes the connection, deregisters from both
    /// registry indexes, and fans out `EXIT` bulletins to the session's
    /// last neighborhood. Idempotent: the registry only removes an entry
    /// that still points at this exact session, so repeated teardown is a
    /// no-op past the first call.
    pub async fn teardown(self: &Arc<Self>, world: &World) {
        self.running.store(false, Ordering::Release);
        self.shutdown.cancel();
        tracing::warn!(nick = %self.nick, addr = %self.remote_addr, "removing client");

        world.deregister(self);

        if let Some(map_id) = self.map_id() {
            let targets = world.fanout_targets(map_id, self);
            for peer in targets {
                peer.send(Frame::exit(&self.nick)).await;
            }
        }
    }
}
