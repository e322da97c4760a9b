use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use relay_world::config::ServerConfig;
use relay_world::session;
use relay_world::world::World;

pub fn test_config() -> ServerConfig {
    let mut supported_games = HashSet::new();
    supported_games.insert(*b"BPR1");

    ServerConfig {
        logging_level: "WARNING".to_string(),
        server_nick: relay_world::wire::Nick::from_wire(*b"servname"),
        ping_interval: Duration::from_secs(5),
        max_missed_pongs: 2,
        supported_games,
        max_players: 9,
        port: 0,
    }
}

/// Binds an ephemeral listener and drives admission exactly the way the
/// real acceptor does, without needing a fixed configured port.
pub async fn spawn_test_server(config: ServerConfig) -> (SocketAddr, Arc<World>) {
    let world = Arc::new(World::new(Arc::new(config)));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    let accept_world = world.clone();
    tokio::spawn(async move {
        loop {
            let (stream, peer_addr) = match listener.accept().await {
                Ok(pair) => pair,
                Err(_) => break,
            };
            let world = accept_world.clone();
            tokio::spawn(async move {
                session::admit(stream, peer_addr, world).await;
            });
        }
    });

    (addr, world)
}

pub async fn connect(addr: SocketAddr) -> TcpStream {
    TcpStream::connect(addr).await.expect("connect to test server")
}

pub async fn read_frame(stream: &mut TcpStream) -> [u8; 64] {
    let mut buf = [0u8; 64];
    stream.read_exact(&mut buf).await.expect("read full frame");
    buf
}

pub async fn send_frame(stream: &mut TcpStream, frame: &[u8; 64]) {
    stream.write_all(frame).await.expect("write frame");
}

/// Reads and discards `n` frames, for setup steps whose exact contents
/// another test already pins down.
pub async fn drain_frames(stream: &mut TcpStream, n: usize) {
    for _ in 0..n {
        read_frame(stream).await;
    }
}

pub fn nick8(s: &str) -> [u8; 8] {
    let mut bytes = [b' '; 8];
    let src = s.as_bytes();
    bytes[..src.len()].copy_from_slice(src);
    bytes
}

/// Builds a 64-byte `JOIN` frame. `map_id` and `prev_map` are each 6-byte
/// ASCII map tags; `transition` is the single-character transition kind
/// byte (`'0'` normal, `'1'` fadeout).
pub fn join_frame(
    nick: &str,
    version: u32,
    game: &[u8; 4],
    map_id: &[u8; 6],
    prev_map: &[u8; 6],
    transition: u8,
) -> [u8; 64] {
    let mut buf = [b'F'; 64];
    buf[0..8].copy_from_slice(&nick8(nick));
    buf[8..12].copy_from_slice(b"JOIN");
    buf[12..16].copy_from_slice(format!("{version:04}").as_bytes());
    buf[16..20].copy_from_slice(game);
    // Position payload starts at offset 20; map-id field sits 21 bytes in.
    buf[41..47].copy_from_slice(map_id);
    buf[47..53].copy_from_slice(prev_map);
    buf[53] = transition;
    buf[63] = b'U';
    buf
}

/// Builds a steady-state `SPOS` frame as a client would send it: sender
/// nick, type, a placeholder latency the server always overwrites, then
/// the position payload with map-id fields 21 bytes past the payload's
/// start (offset 12).
pub fn spos_frame(
    sender: &str,
    x: &str,
    y: &str,
    map_id: &[u8; 6],
    prev_map: &[u8; 6],
    transition: u8,
) -> [u8; 64] {
    let mut buf = [b'F'; 64];
    buf[0..8].copy_from_slice(&nick8(sender));
    buf[8..12].copy_from_slice(b"SPOS");
    buf[12..16].copy_from_slice(b"0000");
    buf[16..20].copy_from_slice(x.as_bytes());
    buf[20..24].copy_from_slice(y.as_bytes());
    buf[33..39].copy_from_slice(map_id);
    buf[39..45].copy_from_slice(prev_map);
    buf[45] = transition;
    buf[63] = b'U';
    buf
}

/// Builds a `PONG` frame echoing `sent_millis`, terminated by the first `F`
/// padding byte as the server's parser expects.
pub fn pong_frame(sent_millis: u64) -> [u8; 64] {
    let mut buf = [b'F'; 64];
    buf[0..8].copy_from_slice(&nick8(""));
    buf[8..12].copy_from_slice(b"PONG");
    let stamp = sent_millis.to_string();
    buf[12..12 + stamp.len()].copy_from_slice(stamp.as_bytes());
    buf[63] = b'U';
    buf
}

pub fn type_tag(frame: &[u8; 64]) -> &[u8] {
    &frame[8..12]
}

pub fn sender_nick(frame: &[u8; 64]) -> &[u8] {
    &frame[0..8]
}
