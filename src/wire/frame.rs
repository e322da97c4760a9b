use super::{FRAME_LEN, RECIPIENT_OFFSET, TYPE_OFFSET};
use super::nick::Nick;

/// One 64-byte wire frame.
///
/// A `Frame` is always exactly [`FRAME_LEN`] bytes; the type makes that
/// invariant structural instead of something every caller has to check.
#[derive(Clone, Copy)]
pub struct Frame([u8; FRAME_LEN]);

impl Frame {
    /// Validates a raw read off the socket: correct length and a trailing
    /// `U` terminator. Both conditions are checked here rather than left to
    /// callers, matching the read loop's "validate on every read, reject
    /// early" discipline.
    pub fn from_wire(bytes: &[u8]) -> Option<Frame> {
        if bytes.len() != FRAME_LEN {
            return None;
        }
        if bytes[FRAME_LEN - 1] != b'U' {
            return None;
        }
        let mut buf = [0u8; FRAME_LEN];
        buf.copy_from_slice(bytes);
        Some(Frame(buf))
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    pub fn type_tag(&self) -> [u8; 4] {
        let mut tag = [0u8; 4];
        tag.copy_from_slice(&self.0[TYPE_OFFSET..TYPE_OFFSET + 4]);
        tag
    }

    pub fn sender_nick(&self) -> Nick {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.0[0..8]);
        Nick::from_wire(bytes)
    }

    pub fn recipient_nick(&self) -> Nick {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.0[RECIPIENT_OFFSET..RECIPIENT_OFFSET + 8]);
        Nick::from_wire(bytes)
    }

    /// Bytes from `offset` to the end of the frame, exclusive of the `U`
    /// terminator, for callers that parse payload fields by further offset.
    pub fn tail_from(&self, offset: usize) -> &[u8] {
        &self.0[offset..FRAME_LEN]
    }

    /// Finds the first padding byte (`needle`) at or after `from`, matching
    /// the pong frame's timestamp-terminated-by-padding encoding.
    pub fn find_from(&self, needle: u8, from: usize) -> Option<usize> {
        self.0[from..].iter().position(|&b| b == needle).map(|i| i + from)
    }

    /// Builds a server control frame: sender nick, 4-byte type, then
    /// `payload`, `F`-padded up to byte 63, terminated with `U`.
    pub fn control(sender: &Nick, packet_type: &[u8; 4], payload: &[u8]) -> Frame {
        let mut buf = [b'F'; FRAME_LEN];
        buf[0..8].copy_from_slice(sender.as_bytes());
        buf[8..12].copy_from_slice(packet_type);
        let payload_end = 12 + payload.len();
        assert!(payload_end <= FRAME_LEN - 1, "control payload overflowed the frame");
        buf[12..payload_end].copy_from_slice(payload);
        buf[FRAME_LEN - 1] = b'U';
        Frame(buf)
    }

    /// Builds an `EXIT` bulletin announcing that `departing` is no longer
    /// visible: sender nick, `EXIT`, 50 zero bytes, `F`, `U`.
    pub fn exit(departing: &Nick) -> Frame {
        let mut buf = [0u8; FRAME_LEN];
        buf[0..8].copy_from_slice(departing.as_bytes());
        buf[8..12].copy_from_slice(b"EXIT");
        buf[12..62].fill(b'0');
        buf[62] = b'F';
        buf[63] = b'U';
        Frame(buf)
    }

    /// Rewrites an inbound position payload into an outbound `SPOS`
    /// bulletin: originating nick, `SPOS`, the session's current latency,
    /// then the payload tail starting four bytes past `payload`'s head
    /// (those four bytes held the client-sent latency, which the server
    /// always overwrites). Padded with `U`, not `F` — the original source's
    /// literal padding choice for this one frame kind, preserved here.
    pub fn position(originating: &Nick, latency: &[u8; 4], payload: &[u8]) -> Frame {
        let mut buf = [b'U'; FRAME_LEN];
        buf[0..8].copy_from_slice(originating.as_bytes());
        buf[8..12].copy_from_slice(b"SPOS");
        buf[12..16].copy_from_slice(latency);
        let rest = &payload[4.min(payload.len())..];
        let rest_end = (16 + rest.len()).min(FRAME_LEN);
        let copy_len = rest_end - 16;
        buf[16..rest_end].copy_from_slice(&rest[..copy_len]);
        buf[FRAME_LEN - 1] = b'U';
        Frame(buf)
    }
}
