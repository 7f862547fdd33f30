//! Cancellation and teardown tests
//!
//! Verifies the cooperative shutdown contract: a triggered stop token ends
//! an idle relay within its observation latency (one poll interval for the
//! threaded strategy, the next wake for the multiplexed one), both
//! connections are closed exactly once afterwards, and data already in
//! flight is neither lost nor duplicated.

use std::time::{Duration, Instant};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

use wirejam_core::{Direction, Endpoint, NoiseParams, RelayMode};
use wirejam_noise::Corruptor;
use wirejam_relay::{
    connect_pair, MultiplexedRelay, RelayOutcome, StopCause, StopChannel, StopFlag, ThreadedRelay,
    POLL_INTERVAL,
};
use wirejam_trace::TrafficDump;

const TEARDOWN: Duration = Duration::from_secs(2);

enum Stop {
    Flag(StopFlag),
    Channel(StopChannel),
}

impl Stop {
    fn trigger(&self) {
        match self {
            Stop::Flag(flag) => flag.trigger(),
            Stop::Channel(channel) => channel.trigger(),
        }
    }
}

struct Harness {
    peer_a: TcpStream,
    peer_b: TcpStream,
    relay: tokio::task::JoinHandle<RelayOutcome>,
    stop: Stop,
}

async fn start_relay(mode: RelayMode) -> Harness {
    let params = NoiseParams::new(0.0, 0.0).unwrap();
    let listener_a = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let listener_b = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let a = Endpoint::new("127.0.0.1", listener_a.local_addr().unwrap().port());
    let b = Endpoint::new("127.0.0.1", listener_b.local_addr().unwrap().port());

    let (conn_a, conn_b) = connect_pair(&a, &b).await.unwrap();
    let (peer_a, _) = listener_a.accept().await.unwrap();
    let (peer_b, _) = listener_b.accept().await.unwrap();

    let noise_ab = Corruptor::new(params, 1);
    let noise_ba = Corruptor::new(params, 2);
    let dump_ab = TrafficDump::disabled(Direction::AtoB);
    let dump_ba = TrafficDump::disabled(Direction::BtoA);

    let (relay, stop) = match mode {
        RelayMode::Threaded => {
            let stop = StopFlag::new();
            let relay = ThreadedRelay::new(
                conn_a,
                conn_b,
                noise_ab,
                noise_ba,
                dump_ab,
                dump_ba,
                stop.clone(),
            );
            (tokio::spawn(relay.run()), Stop::Flag(stop))
        }
        RelayMode::Multiplexed => {
            let (stop, stop_rx) = StopChannel::new();
            let relay = MultiplexedRelay::new(
                conn_a, conn_b, noise_ab, noise_ba, dump_ab, dump_ba, stop_rx,
            );
            (tokio::spawn(relay.run()), Stop::Channel(stop))
        }
    };

    Harness {
        peer_a,
        peer_b,
        relay,
        stop,
    }
}

#[tokio::test]
async fn idle_threaded_relay_stops_within_one_poll_interval() {
    let harness = start_relay(RelayMode::Threaded).await;

    // Let both workers settle into their receive waits.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let started = Instant::now();
    harness.stop.trigger();
    let outcome = timeout(TEARDOWN, harness.relay)
        .await
        .expect("relay did not honor cancellation")
        .unwrap();

    assert_eq!(outcome, RelayOutcome::both(StopCause::Cancelled));
    // Each worker observes the flag within one wait interval; allow
    // scheduling slack on top.
    assert!(started.elapsed() < POLL_INTERVAL * 3);
}

#[tokio::test]
async fn idle_multiplexed_relay_stops_on_next_wake() {
    let harness = start_relay(RelayMode::Multiplexed).await;

    tokio::time::sleep(Duration::from_millis(50)).await;

    let started = Instant::now();
    harness.stop.trigger();
    let outcome = timeout(TEARDOWN, harness.relay)
        .await
        .expect("relay did not honor cancellation")
        .unwrap();

    assert_eq!(outcome, RelayOutcome::both(StopCause::Cancelled));
    // The stop channel is part of the readiness wait itself; no polling
    // latency is involved.
    assert!(started.elapsed() < Duration::from_millis(100));
}

async fn assert_peers_observe_close(mode: RelayMode) {
    let harness = start_relay(mode).await;
    let mut peer_a = harness.peer_a;
    let mut peer_b = harness.peer_b;

    harness.stop.trigger();
    timeout(TEARDOWN, harness.relay)
        .await
        .expect("relay did not honor cancellation")
        .unwrap();

    // After the strategy returns, both connections are closed: each peer
    // sees a clean end-of-stream.
    let n = timeout(TEARDOWN, peer_a.read(&mut [0u8; 8]))
        .await
        .expect("peer A never observed the close")
        .unwrap();
    assert_eq!(n, 0);
    let n = timeout(TEARDOWN, peer_b.read(&mut [0u8; 8]))
        .await
        .expect("peer B never observed the close")
        .unwrap();
    assert_eq!(n, 0);
}

#[tokio::test]
async fn cancellation_closes_both_connections_threaded() {
    assert_peers_observe_close(RelayMode::Threaded).await;
}

#[tokio::test]
async fn cancellation_closes_both_connections_multiplexed() {
    assert_peers_observe_close(RelayMode::Multiplexed).await;
}

#[tokio::test]
async fn in_flight_data_survives_cancellation_multiplexed() {
    let mut harness = start_relay(RelayMode::Multiplexed).await;

    harness.peer_a.write_all(b"last words").await.unwrap();
    let mut received = [0u8; 10];
    timeout(TEARDOWN, harness.peer_b.read_exact(&mut received))
        .await
        .expect("delivery timed out")
        .unwrap();
    assert_eq!(&received, b"last words");

    harness.stop.trigger();
    timeout(TEARDOWN, harness.relay)
        .await
        .expect("relay did not honor cancellation")
        .unwrap();

    // Nothing further arrives: no duplication, just the close.
    let n = timeout(TEARDOWN, harness.peer_b.read(&mut [0u8; 8]))
        .await
        .expect("peer B never observed the close")
        .unwrap();
    assert_eq!(n, 0);
}
