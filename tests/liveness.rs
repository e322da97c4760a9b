mod common;

use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn unanswered_pings_tear_the_session_down() {
    let mut config = common::test_config();
    config.ping_interval = Duration::from_millis(40);
    config.max_missed_pongs = 1;

    let (addr, world) = common::spawn_test_server(config).await;
    let shutdown = CancellationToken::new();
    tokio::spawn(relay_world::liveness::run(world, shutdown.clone()));

    let mut client = common::connect(addr).await;
    common::send_frame(
        &mut client,
        &common::join_frame("alice", 1020, b"BPR1", b"M00001", b"000000", b'0'),
    )
    .await;
    let _strt = common::read_frame(&mut client).await;

    // First tick: one PING, unresponded count goes from 0 to 1 (not yet
    // over the configured limit of 1 missed pong).
    let ping = common::read_frame(&mut client).await;
    assert_eq!(common::type_tag(&ping), b"PING");

    // The client never answers. Second tick: the count (1) meets the
    // limit, so the session is torn down and the socket closes.
    let mut probe = [0u8; 1];
    let n = tokio::time::timeout(Duration::from_secs(5), client.read(&mut probe))
        .await
        .expect("server should close the connection after missed pongs")
        .expect("closing the connection should not be a read error");
    assert_eq!(n, 0, "expected EOF once the session is torn down");

    shutdown.cancel();
}

#[tokio::test]
async fn answering_pings_keeps_the_session_alive() {
    let mut config = common::test_config();
    config.ping_interval = Duration::from_millis(40);
    config.max_missed_pongs = 1;

    let (addr, world) = common::spawn_test_server(config).await;
    let shutdown = CancellationToken::new();
    tokio::spawn(relay_world::liveness::run(world, shutdown.clone()));

    let mut client = common::connect(addr).await;
    common::send_frame(
        &mut client,
        &common::join_frame("alice", 1020, b"BPR1", b"M00001", b"000000", b'0'),
    )
    .await;
    let _strt = common::read_frame(&mut client).await;

    for _ in 0..3 {
        let ping = common::read_frame(&mut client).await;
        assert_eq!(common::type_tag(&ping), b"PING");
        let tail = &ping[12..];
        let f_at = tail.iter().position(|&b| b == b'F').unwrap_or(tail.len());
        let sent: u64 = std::str::from_utf8(&tail[..f_at]).unwrap().parse().unwrap();
        common::send_frame(&mut client, &common::pong_frame(sent)).await;

        let pnpn = common::read_frame(&mut client).await;
        assert_eq!(common::type_tag(&pnpn), b"PNPN");
    }

    shutdown.cancel();
}
