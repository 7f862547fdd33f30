use thiserror::Error;

/// Validation errors for values coming in from the CLI or a config file.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("format must be [host:]port")]
    EndpointFormat,

    #[error("invalid port number: {0}")]
    InvalidPort(String),

    #[error("Port number {0} is out of the allowed range [1-65535]")]
    PortOutOfRange(u64),

    #[error("invalid probability: {0}")]
    InvalidProbability(String),

    #[error("probability {0} is out of the allowed range [0-1]")]
    ProbabilityOutOfRange(f64),

    #[error("unknown relay mode: {0} (expected 'threaded' or 'multiplexed')")]
    UnknownMode(String),
}

/// Errors loading the optional JSON config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(serde_json::Error),

    #[error("Invalid config value: {0}")]
    InvalidValue(#[from] ParseError),
}
