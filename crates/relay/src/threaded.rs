//! Worker-per-direction relay strategy
//!
//! Two spawned tasks, one per direction. Each exclusively owns its source
//! read half, destination write half, noise generator and trace sink, plus
//! a clone of the shared [`StopFlag`] — the only shared mutable state.
//! A worker that stops for any reason triggers the flag so the sibling
//! direction winds down too.
//!
//! Workers never close connections. The halves travel back to [`run`],
//! which reunites and drops both streams only after both workers have
//! returned, so neither side can close a connection the other is still
//! using.
//!
//! [`run`]: ThreadedRelay::run

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{error, info, warn};

use wirejam_core::Direction;
use wirejam_noise::Corruptor;
use wirejam_trace::TrafficDump;

use crate::{RelayOutcome, StopCause, StopFlag, POLL_INTERVAL, READ_BUF_SIZE};

/// Worker-per-direction relay over one pair of established connections.
pub struct ThreadedRelay {
    conn_a: TcpStream,
    conn_b: TcpStream,
    noise_ab: Corruptor,
    noise_ba: Corruptor,
    dump_ab: TrafficDump,
    dump_ba: TrafficDump,
    stop: StopFlag,
}

/// What a worker hands back: its halves, for the coordinated close, and
/// why it stopped.
struct WorkerExit {
    src: OwnedReadHalf,
    dst: OwnedWriteHalf,
    cause: StopCause,
}

impl ThreadedRelay {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        conn_a: TcpStream,
        conn_b: TcpStream,
        noise_ab: Corruptor,
        noise_ba: Corruptor,
        dump_ab: TrafficDump,
        dump_ba: TrafficDump,
        stop: StopFlag,
    ) -> Self {
        Self {
            conn_a,
            conn_b,
            noise_ab,
            noise_ba,
            dump_ab,
            dump_ba,
            stop,
        }
    }

    /// Pump both directions until a peer disconnects, a worker fails, or
    /// the stop flag fires. Never returns an error: relay failures are
    /// logged and folded into the outcome.
    pub async fn run(self) -> RelayOutcome {
        let (read_a, write_a) = self.conn_a.into_split();
        let (read_b, write_b) = self.conn_b.into_split();

        let ab = tokio::spawn(pump(
            Direction::AtoB,
            read_a,
            write_b,
            self.noise_ab,
            self.dump_ab,
            self.stop.clone(),
        ));
        let ba = tokio::spawn(pump(
            Direction::BtoA,
            read_b,
            write_a,
            self.noise_ba,
            self.dump_ba,
            self.stop.clone(),
        ));

        let (exit_ab, exit_ba) = (ab.await, ba.await);
        info!("Both workers have terminated");

        match (exit_ab, exit_ba) {
            (Ok(ab), Ok(ba)) => {
                // Both workers have returned: close each connection
                // exactly once.
                if let Ok(conn_a) = ab.src.reunite(ba.dst) {
                    drop(conn_a);
                }
                if let Ok(conn_b) = ba.src.reunite(ab.dst) {
                    drop(conn_b);
                }
                info!("close sockets A and B");
                RelayOutcome {
                    a_to_b: ab.cause,
                    b_to_a: ba.cause,
                }
            }
            (ab, ba) => {
                // A panicked worker already dropped its halves; report the
                // run as failed on that direction.
                error!("relay worker panicked");
                RelayOutcome {
                    a_to_b: ab.map(|e| e.cause).unwrap_or(StopCause::IoError),
                    b_to_a: ba.map(|e| e.cause).unwrap_or(StopCause::IoError),
                }
            }
        }
    }
}

/// One direction's pump loop.
async fn pump(
    direction: Direction,
    mut src: OwnedReadHalf,
    mut dst: OwnedWriteHalf,
    mut noise: Corruptor,
    dump: TrafficDump,
    stop: StopFlag,
) -> WorkerExit {
    info!("{} worker started", direction);
    let mut buf = vec![0u8; READ_BUF_SIZE];
    let mut offset: u64 = 0;

    let cause = loop {
        // Once the flag is up, no new receive is issued.
        if stop.is_triggered() {
            break StopCause::Cancelled;
        }

        let n = match timeout(POLL_INTERVAL, src.read(&mut buf)).await {
            // Wait expired with no data: re-check the flag and wait again.
            Err(_) => continue,
            Ok(Ok(0)) => {
                info!("{} peer closed the connection", direction);
                break StopCause::PeerClosed;
            }
            Ok(Ok(n)) => n,
            Ok(Err(e)) => {
                error!("{} receive failed at offset {}: {}", direction, offset, e);
                break StopCause::IoError;
            }
        };

        let disturbed = noise.corrupt(&buf[..n]);
        dump.record(offset, &disturbed);
        if let Err(e) = dst.write_all(&disturbed).await {
            error!("{} send failed at offset {}: {}", direction, offset, e);
            break StopCause::IoError;
        }
        offset += disturbed.len() as u64;
    };

    // Fate-sharing: one direction stopping ends both.
    stop.trigger();
    warn!("{} worker stopped: {}", direction, cause);
    WorkerExit { src, dst, cause }
}
