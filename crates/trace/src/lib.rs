//! Wirejam Trace
//!
//! Traffic dump sink for relayed chunks. The relay hands the sink the
//! post-corruption bytes plus their starting byte offset; the sink alone
//! decides rendering — plain UTF-8 text, a 16-byte-per-line hex dump, or
//! hex with a printable-ASCII column when both toggles are on. The relay
//! never inspects or depends on the sink's output.

mod dump;

pub use dump::TrafficDump;
