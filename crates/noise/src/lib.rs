//! Wirejam Noise
//!
//! Per-byte probabilistic corruption of a relayed byte stream. Each
//! [`Corruptor`] owns a seeded generator, so a direction's corruption
//! pattern is a pure function of its seed and the total byte sequence it
//! has processed — independent of how the transport chunked that sequence.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use wirejam_core::NoiseParams;

/// Seeded per-direction byte corruptor.
///
/// For each input byte, in order: with probability `error_rate` the byte is
/// injected with an error; an injected error deletes the byte with
/// probability `deletion_chance`, otherwise it flips exactly one bit chosen
/// uniformly among the 8 positions. All other bytes pass through unchanged,
/// and relative order of retained bytes is preserved.
#[derive(Debug)]
pub struct Corruptor {
    params: NoiseParams,
    rng: SmallRng,
}

impl Corruptor {
    pub fn new(params: NoiseParams, seed: u64) -> Self {
        Self {
            params,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Corrupt one chunk.
    ///
    /// Generator draws are consumed strictly per input byte, and the
    /// generator state carries over between calls: splitting a stream into
    /// different chunks yields the same corrupted output.
    pub fn corrupt(&mut self, chunk: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(chunk.len());
        for &byte in chunk {
            if self.rng.gen::<f64>() < self.params.error_rate {
                if self.rng.gen::<f64>() < self.params.deletion_chance {
                    continue;
                }
                out.push(byte ^ (1u8 << self.rng.gen_range(0..8)));
            } else {
                out.push(byte);
            }
        }
        out
    }
}
