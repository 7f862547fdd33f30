//! Single-loop relay strategy
//!
//! One task owns both connections, both noise generators and the stop
//! channel's receiving end, all serviced from a single readiness wait.
//! The wait is biased to a fixed order — stop channel first, then A, then
//! B — so a stop request is honored on the very next wake rather than
//! polled. No locks anywhere: nothing is touched by more than one task.
//!
//! Unlike the threaded strategy, a peer close here has no sibling
//! direction left to fail independently, so it is logged as an error
//! before the loop terminates rather than treated as a silent success.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tracing::{error, info};

use wirejam_core::Direction;
use wirejam_noise::Corruptor;
use wirejam_trace::TrafficDump;

use crate::{RelayOutcome, StopCause, StopReceiver, READ_BUF_SIZE};

/// Single-loop relay over one pair of established connections.
pub struct MultiplexedRelay {
    conn_a: TcpStream,
    conn_b: TcpStream,
    noise_ab: Corruptor,
    noise_ba: Corruptor,
    dump_ab: TrafficDump,
    dump_ba: TrafficDump,
    stop: StopReceiver,
}

/// Per-direction loop state: generator, sink, and outgoing byte offset.
struct Flow {
    direction: Direction,
    noise: Corruptor,
    dump: TrafficDump,
    offset: u64,
}

impl Flow {
    /// Corrupt a received chunk and write it fully to the destination.
    async fn forward(&mut self, chunk: &[u8], dst: &mut OwnedWriteHalf) -> std::io::Result<()> {
        let disturbed = self.noise.corrupt(chunk);
        self.dump.record(self.offset, &disturbed);
        dst.write_all(&disturbed).await?;
        self.offset += disturbed.len() as u64;
        Ok(())
    }
}

impl MultiplexedRelay {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        conn_a: TcpStream,
        conn_b: TcpStream,
        noise_ab: Corruptor,
        noise_ba: Corruptor,
        dump_ab: TrafficDump,
        dump_ba: TrafficDump,
        stop: StopReceiver,
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

    /// Service both directions until the stop channel fires, a peer
    /// disconnects, or an I/O failure occurs. Returning from the loop is
    /// the single point at which both connections are closed.
    pub async fn run(self) -> RelayOutcome {
        let MultiplexedRelay {
            conn_a,
            conn_b,
            noise_ab,
            noise_ba,
            dump_ab,
            dump_ba,
            mut stop,
        } = self;

        let (mut read_a, mut write_a) = conn_a.into_split();
        let (mut read_b, mut write_b) = conn_b.into_split();
        let mut flow_ab = Flow {
            direction: Direction::AtoB,
            noise: noise_ab,
            dump: dump_ab,
            offset: 0,
        };
        let mut flow_ba = Flow {
            direction: Direction::BtoA,
            noise: noise_ba,
            dump: dump_ba,
            offset: 0,
        };
        let mut buf_a = vec![0u8; READ_BUF_SIZE];
        let mut buf_b = vec![0u8; READ_BUF_SIZE];

        info!("relay loop started");
        let cause = loop {
            tokio::select! {
                // Fixed service order per wake: stop channel, then A, then B.
                biased;

                _ = stop.triggered() => {
                    info!("Stop signal received");
                    break StopCause::Cancelled;
                }
                res = read_a.read(&mut buf_a) => {
                    if let Some(cause) = service(res, &buf_a, &mut flow_ab, &mut write_b).await {
                        break cause;
                    }
                }
                res = read_b.read(&mut buf_b) => {
                    if let Some(cause) = service(res, &buf_b, &mut flow_ba, &mut write_a).await {
                        break cause;
                    }
                }
            }
        };

        // Single close point, after the loop has fully stopped.
        if let Ok(conn_a) = read_a.reunite(write_a) {
            drop(conn_a);
        }
        if let Ok(conn_b) = read_b.reunite(write_b) {
            drop(conn_b);
        }
        drop(stop);
        info!("relay loop stopped: {}", cause);
        RelayOutcome::both(cause)
    }
}

/// Handle one ready read result for a direction. Returns the cause that
/// terminates the loop, or `None` to keep servicing.
async fn service(
    res: std::io::Result<usize>,
    buf: &[u8],
    flow: &mut Flow,
    dst: &mut OwnedWriteHalf,
) -> Option<StopCause> {
    match res {
        Ok(0) => {
            error!(
                "{} no data received, peer possibly disconnected",
                flow.direction
            );
            Some(StopCause::PeerClosed)
        }
        Ok(n) => match flow.forward(&buf[..n], dst).await {
            Ok(()) => None,
            Err(e) => {
                error!(
                    "{} send failed at offset {}: {}",
                    flow.direction, flow.offset, e
                );
                Some(StopCause::IoError)
            }
        },
        Err(e) => {
            error!(
                "{} receive failed at offset {}: {}",
                flow.direction, flow.offset, e
            );
            Some(StopCause::IoError)
        }
    }
}
