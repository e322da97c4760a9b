//! Fixed-width ASCII wire protocol.
//!
//! Every frame on the socket is exactly 64 bytes of 7-bit ASCII, ending in
//! the literal byte `U`. Fields are parsed by fixed byte offset, never by
//! tokenizing; see the offset tables this module encodes directly in its
//! constants.

mod frame;
mod nick;
mod position;

pub use frame::Frame;
pub use nick::{MapId, Nick};
pub use position::{PositionFields, TransitionKind};

/// Width of every frame on the wire.
pub const FRAME_LEN: usize = 64;

pub const TYPE_JOIN: [u8; 4] = *b"JOIN";
pub const TYPE_STRT: [u8; 4] = *b"STRT";
pub const TYPE_DENY: [u8; 4] = *b"DENY";
pub const TYPE_EXIT: [u8; 4] = *b"EXIT";
pub const TYPE_PING: [u8; 4] = *b"PING";
pub const TYPE_PONG: [u8; 4] = *b"PONG";
pub const TYPE_PNPN: [u8; 4] = *b"PNPN";
pub const TYPE_SPOS: [u8; 4] = *b"SPOS";

pub const DENY_MALFORMED: [u8; 4] = *b"MALF";
pub const DENY_BAD_CHARS: [u8; 4] = *b"CHRS";
pub const DENY_GAME: [u8; 4] = *b"GAME";
pub const DENY_NAME_TAKEN: [u8; 4] = *b"NAME";
pub const DENY_SERVER_FULL: [u8; 4] = *b"FULL";

/// Offset of the type field within any frame.
pub const TYPE_OFFSET: usize = 8;
/// Offset of the directed-relay recipient field (shared by every non
/// position/pong/ping/join frame).
pub const RECIPIENT_OFFSET: usize = 12;
/// Offset at which the position payload begins when dispatched from a
/// steady-state `SPOS` frame.
pub const SPOS_PAYLOAD_OFFSET: usize = 12;
/// Offset at which the initial position payload begins inside a `JOIN`
/// frame. Shifted 8 bytes relative to [`SPOS_PAYLOAD_OFFSET`] because the
/// version and game-tag fields occupy the space the steady-state frame
/// spends on latency and the first coordinate pair.
pub const JOIN_PAYLOAD_OFFSET: usize = 20;
