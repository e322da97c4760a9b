use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::tcp::OwnedReadHalf;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::wire::{Frame, FRAME_LEN, TYPE_PONG, TYPE_SPOS, SPOS_PAYLOAD_OFFSET};
use crate::world::World;

use super::pong::handle_pong;
use super::position::apply_position_update;
use super::Session;

/// Upper bound on read-side latency before a peer is declared dead.
const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Drives one session's steady-state read loop until a socket error, EOF,
/// read timeout, or cooperative shutdown, then tears the session down.
pub async fn run(
    session: Arc<Session>,
    world: Arc<World>,
    mut reader: OwnedReadHalf,
    shutdown: CancellationToken,
) {
    loop {
        let mut buf = [0u8; FRAME_LEN];

        let read = tokio::select! {
            _ = shutdown.cancelled() => break,
            read = timeout(READ_TIMEOUT, reader.read(&mut buf)) => read,
        };

        let n = match read {
            Ok(Ok(0)) => break, // EOF
            Ok(Ok(n)) => n,
            Ok(Err(_)) | Err(_) => break, // socket error or read timeout
        };

        let Some(frame) = Frame::from_wire(&buf[..n]) else {
            tracing::warn!(nick = %session.nick(), "dropped frame: too short or missing U terminator");
            continue;
        };

        match frame.type_tag() {
            TYPE_SPOS => apply_position_update(&session, &world, &frame, SPOS_PAYLOAD_OFFSET).await,
            TYPE_PONG => handle_pong(&session, &world, &frame).await,
            _ => relay_directed(&session, &world, &frame).await,
        }
    }

    session.teardown(&world).await;
}

async fn relay_directed(session: &Arc<Session>, world: &World, frame: &Frame) {
    let recipient = frame.recipient_nick();
    match world.lookup_by_nick(&recipient) {
        Some(target) => target.send(*frame).await,
        None => {
            tracing::warn!(
                nick = %session.nick(),
                recipient = %recipient,
                type_tag = %String::from_utf8_lossy(&frame.type_tag()),
                "received packet for unknown player",
            );
        }
    }
}
