use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::wire::{Frame, TYPE_PNPN};
use crate::world::World;

use super::Session;

/// Handles a `PONG` reply: parses the timestamp the server stamped into the
/// matching `PING` (terminated by the first `F` padding byte starting at
/// byte 12), computes latency clamped to `[0, 9999]`, stores it, and
/// replies with a `PNPN` bulletin. A non-numeric timestamp is logged and
/// otherwise ignored — the unresponded-ping counter still resets.
pub async fn handle_pong(session: &Arc<Session>, world: &World, frame: &Frame) {
    if let Some(padding_at) = frame.find_from(b'F', 12) {
        let timestamp_bytes = &frame.as_bytes()[12..padding_at];
        match std::str::from_utf8(timestamp_bytes).ok().and_then(|s| s.parse::<i64>().ok()) {
            Some(sent_millis) => {
                let now_millis = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_millis() as i64)
                    .unwrap_or(0);
                let latency = (now_millis - sent_millis).clamp(0, 9999);
                let formatted = format!("{latency:04}");
                let mut latency_bytes = [0u8; 4];
                latency_bytes.copy_from_slice(formatted.as_bytes());

                session.set_latency(latency_bytes);
                let reply = Frame::control(&world.config.server_nick, &TYPE_PNPN, &latency_bytes);
                session.send(reply).await;
            }
            None => {
                tracing::warn!(nick = %session.nick(), "received PONG with a non-numeric timestamp");
            }
        }
    }

    session.reset_unresponded_pings();
}
