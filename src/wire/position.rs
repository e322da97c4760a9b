use super::Frame;
use super::nick::MapId;

/// Classification of a map transition as reported by the client.
///
/// The client's flag is unreliable — it reports `Normal` even through
/// doors, and not reliably `Fadeout` when it should. The graph's promotion
/// policy accounts for that; this type only captures what was on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Normal,
    Fadeout,
    Other(u8),
}

impl TransitionKind {
    pub fn from_byte(b: u8) -> TransitionKind {
        match b {
            b'0' => TransitionKind::Normal,
            b'1' => TransitionKind::Fadeout,
            other => TransitionKind::Other(other),
        }
    }
}

/// The current/previous map and transition kind extracted from a position
/// payload, relative to wherever that payload starts in its containing
/// frame.
#[derive(Debug, Clone, Copy)]
pub struct PositionFields {
    pub map_id: MapId,
    pub map_id_prev: MapId,
    pub transition: TransitionKind,
}

/// Offset of the map-id field within a position payload, regardless of
/// whether that payload started life inside a `JOIN` frame or a
/// steady-state `SPOS` frame. Keeping one function with an explicit
/// `payload_start` parameter (see the two offset constants in
/// `wire::mod`) avoids the original's ad-hoc per-call-site shift.
const MAP_ID_PAYLOAD_INDEX: usize = 21;

impl PositionFields {
    /// Parses the position fields out of `frame`, treating `payload_start`
    /// as the offset (within the frame) at which the position payload
    /// begins. Use [`super::SPOS_PAYLOAD_OFFSET`] for steady-state frames
    /// and [`super::JOIN_PAYLOAD_OFFSET`] for the payload riding along with
    /// a `JOIN`.
    pub fn parse(frame: &Frame, payload_start: usize) -> PositionFields {
        let bytes = frame.as_bytes();
        let base = payload_start + MAP_ID_PAYLOAD_INDEX;

        let mut map_id = [0u8; 6];
        map_id.copy_from_slice(&bytes[base..base + 6]);

        let mut map_id_prev = [0u8; 6];
        map_id_prev.copy_from_slice(&bytes[base + 6..base + 12]);

        let transition = TransitionKind::from_byte(bytes[base + 12]);

        PositionFields {
            map_id: MapId::from_wire(map_id),
            map_id_prev: MapId::from_wire(map_id_prev),
            transition,
        }
    }
}
