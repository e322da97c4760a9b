//! Process-wide shared state.
//!
//! The session registry and adjacency graph are threaded as a single owned
//! `World` value instead of living behind globals, per the process-wide
//! mutable state strategy: one owned value, handed to the acceptor and to
//! every session, with its own internal mutex standing in for what would
//! otherwise be a flat global namespace.

mod graph;
mod registry;

pub use graph::AdjacencyGraph;
pub use registry::{RegisterOutcome, SessionRegistry};

use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::ServerConfig;
use crate::session::Session;
use crate::wire::{MapId, Nick, TransitionKind};

/// Registry and graph behind the single coarse lock the concurrency model
/// calls for: both are mutated by every session task and read by the
/// fan-out paths, and the two must move together (a map transition touches
/// both), so one lock over both is simpler and sufficient at this scale.
struct Inner {
    registry: SessionRegistry,
    graph: AdjacencyGraph,
}

pub struct World {
    inner: Mutex<Inner>,
    pub config: Arc<ServerConfig>,
}

/// What a completed map transition leaves the caller needing to do, once
/// the lock has been released. Socket writes never happen while the world
/// lock is held.
pub struct MapChangeEffects {
    /// Peers whose last neighborhood no longer includes the session's new
    /// neighborhood (and vice versa); both sides exchange an `EXIT`.
    pub exit_peers: Vec<Arc<Session>>,
    /// Peers now visible to the session, whose last known position should
    /// be replayed so the client can render them immediately.
    pub replay_peers: Vec<Arc<Session>>,
}

impl World {
    pub fn new(config: Arc<ServerConfig>) -> World {
        World {
            inner: Mutex::new(Inner { registry: SessionRegistry::new(), graph: AdjacencyGraph::new() }),
            config,
        }
    }

    pub fn try_register(
        &self,
        nick: Nick,
        session: Arc<Session>,
        remote_ip: IpAddr,
    ) -> RegisterOutcome {
        let mut inner = self.inner.lock();
        let outcome = inner.registry.try_register(nick, session, self.config.max_players, remote_ip);
        tracing::debug!(occupants = inner.registry.len(), max = self.config.max_players, "total players");
        outcome
    }

    pub fn deregister(&self, session: &Arc<Session>) {
        let mut inner = self.inner.lock();
        inner.registry.deregister(session);
        tracing::debug!(occupants = inner.registry.len(), max = self.config.max_players, "total players");
    }

    pub fn lookup_by_nick(&self, nick: &Nick) -> Option<Arc<Session>> {
        self.inner.lock().registry.lookup_by_nick(nick)
    }

    /// Snapshot of everyone currently visible from `map_id` (inclusive of
    /// `map_id` itself, exclusive of `exclude`), taken under the lock and
    /// handed back owned so the caller can write to sockets after
    /// releasing it.
    pub fn fanout_targets(&self, map_id: MapId, exclude: &Arc<Session>) -> Vec<Arc<Session>> {
        let inner = self.inner.lock();
        inner
            .graph
            .neighbors_of(map_id)
            .into_iter()
            .flat_map(|m| inner.registry.occupants_of(m).to_vec())
            .filter(|peer| !Arc::ptr_eq(peer, exclude))
            .collect()
    }

    pub fn neighbors_of(&self, map_id: MapId) -> HashSet<MapId> {
        self.inner.lock().graph.neighbors_of(map_id)
    }

    /// Snapshot of every registered session, for the liveness ticker.
    pub fn all_sessions(&self) -> Vec<Arc<Session>> {
        self.inner.lock().registry.all()
    }

    /// Applies a map transition for `session`: computes who it must
    /// exchange `EXIT` bulletins with, records the transition in the
    /// adjacency graph, moves the session's registry bucket, and computes
    /// who it should replay position bulletins from — all under one lock
    /// acquisition, per the ordering in the position-update design.
    pub fn apply_map_change(
        &self,
        session: &Arc<Session>,
        old_map: Option<MapId>,
        new_map: MapId,
        transition: TransitionKind,
    ) -> MapChangeEffects {
        let mut inner = self.inner.lock();

        let mut exit_peers = Vec::new();
        if let Some(old_map) = old_map {
            let new_neighbors = inner.graph.neighbors_of(new_map);
            let old_neighbors = inner.graph.neighbors_of(old_map);
            for departing_map in old_neighbors.difference(&new_neighbors) {
                for peer in inner.registry.occupants_of(*departing_map) {
                    if !Arc::ptr_eq(peer, session) {
                        exit_peers.push(peer.clone());
                    }
                }
            }
            inner.graph.observe_transition(new_map, old_map, transition);
        }

        inner.registry.move_to(session, old_map, new_map);

        let replay_peers = inner
            .graph
            .neighbors_of(new_map)
            .into_iter()
            .flat_map(|m| inner.registry.occupants_of(m).to_vec())
            .filter(|peer| !Arc::ptr_eq(peer, session))
            .collect();

        MapChangeEffects { exit_peers, replay_peers }
    }
}
