use std::sync::Arc;

use crate::wire::{Frame, PositionFields};
use crate::world::World;

use super::Session;

/// Applies a position update carried either by a steady-state `SPOS` frame
/// or by the initial position payload riding along with `JOIN`.
///
/// `payload_start` is the frame offset at which the position payload
/// begins — [`crate::wire::SPOS_PAYLOAD_OFFSET`] or
/// [`crate::wire::JOIN_PAYLOAD_OFFSET`] — kept as one explicit parameter
/// rather than two call paths with independently hand-shifted offsets.
pub async fn apply_position_update(
    session: &Arc<Session>,
    world: &World,
    frame: &Frame,
    payload_start: usize,
) {
    let fields = PositionFields::parse(frame, payload_start);
    let old_map = session.map_id();

    if old_map != Some(fields.map_id) {
        let effects = world.apply_map_change(session, old_map, fields.map_id, fields.transition);
        session.set_map_id(fields.map_id);

        for peer in effects.exit_peers {
            session.send(Frame::exit(&peer.nick())).await;
            peer.send(Frame::exit(&session.nick())).await;
        }

        for peer in effects.replay_peers {
            if let Some(spos) = peer.last_spos() {
                session.send(spos).await;
            }
        }
    }

    let latency = session.latency();
    let payload_tail = frame.tail_from(payload_start);
    let outbound = Frame::position(&frame.sender_nick(), &latency, payload_tail);
    session.set_last_spos(outbound);

    let targets = world.fanout_targets(fields.map_id, session);
    for peer in targets {
        peer.send(outbound).await;
    }
}
