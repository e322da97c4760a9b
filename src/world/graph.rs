use std::collections::{HashMap, HashSet};

use crate::wire::{MapId, TransitionKind};

/// Process-wide map-adjacency graph.
///
/// `walkable` and `not_walkable` are both stored as a map from a map id to
/// the set of map ids it has been observed adjacent to; every insertion is
/// mirrored on both sides so membership tests never need to check both
/// orderings of a pair.
#[derive(Default)]
pub struct AdjacencyGraph {
    walkable: HashMap<MapId, HashSet<MapId>>,
    not_walkable: HashMap<MapId, HashSet<MapId>>,
}

impl AdjacencyGraph {
    pub fn new() -> AdjacencyGraph {
        AdjacencyGraph::default()
    }

    fn is_not_walkable(&self, a: MapId, b: MapId) -> bool {
        self.not_walkable.get(&a).is_some_and(|set| set.contains(&b))
    }

    fn promote_walkable(&mut self, a: MapId, b: MapId) {
        self.walkable.entry(a).or_default().insert(b);
        self.walkable.entry(b).or_default().insert(a);
    }

    fn demote_to_not_walkable(&mut self, a: MapId, b: MapId) {
        if let Some(set) = self.walkable.get_mut(&a) {
            set.remove(&b);
        }
        if let Some(set) = self.walkable.get_mut(&b) {
            set.remove(&a);
        }
        self.not_walkable.entry(a).or_default().insert(b);
        self.not_walkable.entry(b).or_default().insert(a);
    }

    /// Records an observed transition between `current_map` and
    /// `previous_map`. `not_walkable` wins permanently: once a pair is
    /// absorbed into it, no later observation can restore walkability.
    pub fn observe_transition(
        &mut self,
        current_map: MapId,
        previous_map: MapId,
        transition: TransitionKind,
    ) {
        if self.is_not_walkable(current_map, previous_map) {
            tracing::info!(current = %current_map, previous = %previous_map, "transition already marked non-walkable, skipping");
            return;
        }

        match transition {
            TransitionKind::Normal => {
                self.promote_walkable(current_map, previous_map);
            }
            TransitionKind::Fadeout => {
                self.demote_to_not_walkable(current_map, previous_map);
            }
            TransitionKind::Other(byte) => {
                tracing::warn!(kind = byte, "unknown transition kind");
            }
        }
    }

    /// `{map_id} ∪ { m | (map_id, m) ∈ walkable }`.
    pub fn neighbors_of(&self, map_id: MapId) -> HashSet<MapId> {
        let mut neighbors = self.walkable.get(&map_id).cloned().unwrap_or_default();
        neighbors.insert(map_id);
        neighbors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(tag: &[u8; 6]) -> MapId {
        MapId::from_wire(*tag)
    }

    #[test]
    fn normal_transition_promotes_symmetrically() {
        let mut graph = AdjacencyGraph::new();
        graph.observe_transition(map(b"M00002"), map(b"M00001"), TransitionKind::Normal);

        let neighbors_of_2 = graph.neighbors_of(map(b"M00002"));
        assert!(neighbors_of_2.contains(&map(b"M00001")));

        let neighbors_of_1 = graph.neighbors_of(map(b"M00001"));
        assert!(neighbors_of_1.contains(&map(b"M00002")));
    }

    #[test]
    fn repeated_normal_observation_is_idempotent() {
        let mut graph = AdjacencyGraph::new();
        graph.observe_transition(map(b"M00002"), map(b"M00001"), TransitionKind::Normal);
        graph.observe_transition(map(b"M00002"), map(b"M00001"), TransitionKind::Normal);

        assert_eq!(graph.neighbors_of(map(b"M00002")).len(), 2);
    }

    #[test]
    fn fadeout_absorbs_and_blocks_future_promotion() {
        let mut graph = AdjacencyGraph::new();
        graph.observe_transition(map(b"M00002"), map(b"M00001"), TransitionKind::Normal);
        graph.observe_transition(map(b"M00002"), map(b"M00001"), TransitionKind::Fadeout);

        assert!(!graph.neighbors_of(map(b"M00002")).contains(&map(b"M00001")));

        graph.observe_transition(map(b"M00002"), map(b"M00001"), TransitionKind::Normal);
        assert!(
            !graph.neighbors_of(map(b"M00002")).contains(&map(b"M00001")),
            "non-walkable must win permanently"
        );
    }

    #[test]
    fn unknown_transition_kind_is_ignored() {
        let mut graph = AdjacencyGraph::new();
        graph.observe_transition(map(b"M00002"), map(b"M00001"), TransitionKind::Other(b'9'));

        assert_eq!(graph.neighbors_of(map(b"M00002")).len(), 1);
    }
}
