use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::wire::{
    Frame, FRAME_LEN, JOIN_PAYLOAD_OFFSET, TYPE_DENY, TYPE_JOIN, TYPE_STRT, DENY_BAD_CHARS,
    DENY_GAME, DENY_MALFORMED, DENY_NAME_TAKEN, DENY_SERVER_FULL,
};
use crate::world::{RegisterOutcome, World};

use super::position::apply_position_update;
use super::{read_loop, Session, OUTBOUND_QUEUE_DEPTH};

const MIN_SUPPORTED_CLIENT_VERSION: u32 = 1020;
const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Accepts one connection through admission and, if admitted, runs its
/// steady-state read loop until teardown. Mirrors the original's
/// `setup()` followed by its per-client run loop, but spread across a
/// dedicated writer task (spawned once admission succeeds) instead of a
/// single blocking socket shared between reads and writes.
pub async fn admit(mut stream: TcpStream, addr: SocketAddr, world: Arc<World>) {
    let mut buf = [0u8; FRAME_LEN];
    let read = timeout(READ_TIMEOUT, stream.read(&mut buf)).await;
    let n = match read {
        Ok(Ok(n)) if n > 0 => n,
        _ => {
            tracing::warn!(%addr, "client turned away, no initial packet received");
            return;
        }
    };

    let Some(frame) = Frame::from_wire(&buf[..n]) else {
        tracing::warn!(%addr, "client turned away, initial packet malformed");
        deny(&mut stream, &world, &DENY_MALFORMED).await;
        return;
    };

    if frame.type_tag() != TYPE_JOIN {
        tracing::warn!(%addr, "client turned away, initial packet malformed");
        deny(&mut stream, &world, &DENY_MALFORMED).await;
        return;
    }

    // Version check goes first: once it's known, we know what to expect
    // from the rest of this client's frames.
    let bytes = frame.as_bytes();
    let version: u32 = match std::str::from_utf8(&bytes[12..16]).ok().and_then(|s| s.parse().ok()) {
        Some(v) => v,
        None => {
            tracing::warn!(%addr, "client turned away, initial packet malformed");
            deny(&mut stream, &world, &DENY_MALFORMED).await;
            return;
        }
    };

    if version < MIN_SUPPORTED_CLIENT_VERSION {
        tracing::warn!(%addr, version, minimum = MIN_SUPPORTED_CLIENT_VERSION, "client turned away, client version outdated");
        deny(&mut stream, &world, MIN_SUPPORTED_CLIENT_VERSION.to_string().as_bytes()).await;
        return;
    }

    let nick = frame.sender_nick();
    if !nick.has_valid_chars() {
        tracing::warn!(%addr, nick = %nick, "client turned away, name contained invalid characters");
        deny(&mut stream, &world, &DENY_BAD_CHARS).await;
        return;
    }

    let mut game = [0u8; 4];
    game.copy_from_slice(&bytes[16..20]);
    if !world.config.supported_games.contains(&game) {
        tracing::warn!(%addr, nick = %nick, game = %String::from_utf8_lossy(&game), "client turned away, game not supported");
        deny(&mut stream, &world, &DENY_GAME).await;
        return;
    }

    let (read_half, write_half) = stream.into_split();
    let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE_DEPTH);
    let shutdown = CancellationToken::new();
    let session = Arc::new(Session::new(nick, addr, version, tx, shutdown.clone()));

    tokio::spawn(run_writer(write_half, rx, shutdown.clone()));

    loop {
        match world.try_register(nick, session.clone(), addr.ip()) {
            RegisterOutcome::Ok => break,
            RegisterOutcome::Reconnect(stale) => {
                tracing::warn!(%addr, nick = %nick, "client is reconnecting, replacing stale session");
                stale.teardown(&world).await;
            }
            RegisterOutcome::NameTaken => {
                tracing::warn!(%addr, nick = %nick, "client turned away, name is in use by someone else");
                session.send(Frame::control(&world.config.server_nick, &TYPE_DENY, &DENY_NAME_TAKEN)).await;
                return;
            }
            RegisterOutcome::Full => {
                tracing::warn!(%addr, nick = %nick, "client turned away, the server is full");
                session.send(Frame::control(&world.config.server_nick, &TYPE_DENY, &DENY_SERVER_FULL)).await;
                return;
            }
        }
    }

    session.send(Frame::control(&world.config.server_nick, &TYPE_STRT, &[])).await;
    tracing::warn!(%addr, nick = %nick, "adding client");

    // The initial position payload rides along with JOIN.
    apply_position_update(&session, &world, &frame, JOIN_PAYLOAD_OFFSET).await;

    read_loop::run(session, world, read_half, shutdown).await;
}

async fn deny(stream: &mut TcpStream, world: &World, reason: &[u8]) {
    let frame = Frame::control(&world.config.server_nick, &TYPE_DENY, reason);
    let _ = stream.write_all(frame.as_bytes()).await;
}

/// Owns the write half of a session's socket and serializes every outbound
/// frame onto it, giving single-writer-per-connection ordering without a
/// lock the read loop would contend on. Exits (closing the socket) once
/// its channel is drained and closed, or on the first write failure.
async fn run_writer(
    mut write_half: OwnedWriteHalf,
    mut rx: mpsc::Receiver<Frame>,
    shutdown: CancellationToken,
) {
    while let Some(frame) = rx.recv().await {
        if write_half.write_all(frame.as_bytes()).await.is_err() {
            shutdown.cancel();
            break;
        }
    }
}
