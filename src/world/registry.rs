use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

use crate::session::Session;
use crate::wire::{MapId, Nick};

/// Outcome of attempting to seat a new session under a nick.
pub enum RegisterOutcome {
    /// The nick was free and the session is now registered.
    Ok,
    /// The nick is held by a session from the same peer IP; the caller
    /// tears down the stale session and retries registration itself.
    Reconnect(Arc<Session>),
    /// The nick is held by a session from a different peer IP.
    NameTaken,
    /// The nick was free but the registry is already at capacity.
    Full,
}

/// Process-wide mapping from nick to session, and from map to the sessions
/// currently on it.
///
/// `byNick` is injective: a session registered under `N` always satisfies
/// `session.nick() == N`. A session with a set map appears in exactly one
/// `byMap` bucket. Both invariants are maintained entirely by this type —
/// callers never mutate the maps directly.
#[derive(Default)]
pub struct SessionRegistry {
    by_nick: HashMap<Nick, Arc<Session>>,
    by_map: HashMap<MapId, Vec<Arc<Session>>>,
}

impl SessionRegistry {
    pub fn new() -> SessionRegistry {
        SessionRegistry::default()
    }

    pub fn len(&self) -> usize {
        self.by_nick.len()
    }

    /// Attempts to seat `session` under `nick`. Does not itself tear down a
    /// stale reconnecting session — see [`RegisterOutcome::Reconnect`].
    pub fn try_register(
        &mut self,
        nick: Nick,
        session: Arc<Session>,
        max_players: usize,
        remote_ip: IpAddr,
    ) -> RegisterOutcome {
        if let Some(existing) = self.by_nick.get(&nick) {
            return if existing.remote_ip() == remote_ip {
                RegisterOutcome::Reconnect(existing.clone())
            } else {
                RegisterOutcome::NameTaken
            };
        }

        if self.by_nick.len() >= max_players {
            return RegisterOutcome::Full;
        }

        self.by_nick.insert(nick, session);
        RegisterOutcome::Ok
    }

    /// Removes `session` from `byNick` if it is still the occupant under its
    /// own nick, and from its map bucket if it has one. Idempotent: a
    /// session already removed causes no further change.
    pub fn deregister(&mut self, session: &Arc<Session>) {
        let nick = session.nick();
        if let Some(occupant) = self.by_nick.get(&nick) {
            if Arc::ptr_eq(occupant, session) {
                self.by_nick.remove(&nick);
            }
        }

        if let Some(map_id) = session.map_id() {
            if let Some(bucket) = self.by_map.get_mut(&map_id) {
                bucket.retain(|s| !Arc::ptr_eq(s, session));
                if bucket.is_empty() {
                    self.by_map.remove(&map_id);
                }
            }
        }
    }

    /// Moves `session` from its current map bucket (if any) into
    /// `new_map`'s bucket. The session's own `map_id` is updated by the
    /// caller, which holds the world lock across both steps.
    pub fn move_to(&mut self, session: &Arc<Session>, old_map: Option<MapId>, new_map: MapId) {
        if let Some(old_map) = old_map {
            if let Some(bucket) = self.by_map.get_mut(&old_map) {
                bucket.retain(|s| !Arc::ptr_eq(s, session));
                if bucket.is_empty() {
                    self.by_map.remove(&old_map);
                }
            }
        }
        self.by_map.entry(new_map).or_default().push(session.clone());
    }

    pub fn lookup_by_nick(&self, nick: &Nick) -> Option<Arc<Session>> {
        self.by_nick.get(nick).cloned()
    }

    pub fn occupants_of(&self, map_id: MapId) -> &[Arc<Session>] {
        self.by_map.get(&map_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Snapshot of every registered session, for the liveness ticker's
    /// per-interval sweep.
    pub fn all(&self) -> Vec<Arc<Session>> {
        self.by_nick.values().cloned().collect()
    }
}
