use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseError;

/// One of the two unidirectional flows composing the bidirectional relay.
///
/// Each direction owns its own noise generator, seeded independently; the
/// generators are never shared across directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    AtoB,
    BtoA,
}

impl Direction {
    /// Single-character label used in traffic dump headers.
    pub fn label(&self) -> char {
        match self {
            Direction::AtoB => '>',
            Direction::BtoA => '<',
        }
    }

    /// Worker name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Direction::AtoB => "A->B",
            Direction::BtoA => "B->A",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-byte corruption probabilities.
///
/// Shared by value across both directions; each direction consumes the
/// rates against its own generator. `error_rate` is the probability that a
/// byte is injected with an error, i.e. the reciprocal of the mean number
/// of bytes that pass untouched between errors. `deletion_chance` is the
/// probability that an injected error deletes the byte instead of flipping
/// one of its bits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseParams {
    pub error_rate: f64,
    pub deletion_chance: f64,
}

impl NoiseParams {
    /// Build validated parameters; both rates must be in [0-1].
    pub fn new(error_rate: f64, deletion_chance: f64) -> Result<Self, ParseError> {
        check_probability(error_rate)?;
        check_probability(deletion_chance)?;
        Ok(Self {
            error_rate,
            deletion_chance,
        })
    }
}

fn check_probability(prob: f64) -> Result<f64, ParseError> {
    if !(0.0..=1.0).contains(&prob) {
        return Err(ParseError::ProbabilityOutOfRange(prob));
    }
    Ok(prob)
}

/// Parse and validate a probability given as text.
pub fn parse_probability(s: &str) -> Result<f64, ParseError> {
    let prob: f64 = s
        .parse()
        .map_err(|_| ParseError::InvalidProbability(s.to_string()))?;
    check_probability(prob)
}

/// Concurrency strategy driving the two directions.
///
/// Both strategies implement the same relay semantics; they differ only in
/// how the two directions and the stop signal are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayMode {
    /// Two parallel workers, one per direction, polling a shared stop flag.
    #[default]
    Threaded,
    /// One cooperative loop servicing both directions and a stop channel.
    Multiplexed,
}

impl FromStr for RelayMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, ParseError> {
        match s {
            "threaded" => Ok(RelayMode::Threaded),
            "multiplexed" => Ok(RelayMode::Multiplexed),
            other => Err(ParseError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for RelayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayMode::Threaded => f.write_str("threaded"),
            RelayMode::Multiplexed => f.write_str("multiplexed"),
        }
    }
}
