//! Wirejam Relay
//!
//! The bidirectional byte pump between two established TCP connections,
//! with per-direction noise injection and cancellable, coordinated
//! shutdown.
//!
//! Two interchangeable strategies implement the same relay semantics:
//!
//! - [`ThreadedRelay`] — one worker task per direction, each polling a
//!   shared [`StopFlag`] between bounded receive waits.
//! - [`MultiplexedRelay`] — one cooperative loop servicing both directions
//!   and a [`StopChannel`] from a single readiness wait.
//!
//! The two directions are fate-shared: one stopping, for any reason, winds
//! down the other, because a one-way relay without its return path is not
//! useful. Connections are closed exactly once, by the strategy itself,
//! after both directions have stopped.

mod cancel;
mod connect;
mod multiplexed;
mod threaded;

pub use cancel::{StopChannel, StopFlag, StopReceiver};
pub use connect::connect_pair;
pub use multiplexed::MultiplexedRelay;
pub use threaded::ThreadedRelay;

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use wirejam_core::Endpoint;

/// Read buffer size for both strategies.
pub const READ_BUF_SIZE: usize = 1024;

/// Bounded receive wait used by the threaded strategy. A stopped worker is
/// observed within one interval of its next receive attempt.
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Bound on each outbound connection attempt.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: Endpoint,
        source: std::io::Error,
    },

    #[error("Connection to {endpoint} timed out")]
    ConnectTimeout { endpoint: Endpoint },
}

pub type Result<T> = std::result::Result<T, RelayError>;

/// Why a direction stopped pumping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCause {
    /// The stop token fired: user signal, or the sibling direction
    /// winding down.
    Cancelled,
    /// The source peer closed its end of the stream.
    PeerClosed,
    /// An unexpected receive/send failure, already logged.
    IoError,
}

impl fmt::Display for StopCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopCause::Cancelled => f.write_str("cancelled"),
            StopCause::PeerClosed => f.write_str("peer closed"),
            StopCause::IoError => f.write_str("I/O error"),
        }
    }
}

/// Per-direction outcome of a relay run.
///
/// Relay failures are logged inside the strategies and folded in here;
/// they never propagate as errors. Only connection establishment fails
/// loudly, before any relay work begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayOutcome {
    pub a_to_b: StopCause,
    pub b_to_a: StopCause,
}

impl RelayOutcome {
    /// Outcome for the single-loop strategy, where one cause ends both
    /// directions at once.
    pub fn both(cause: StopCause) -> Self {
        Self {
            a_to_b: cause,
            b_to_a: cause,
        }
    }
}
