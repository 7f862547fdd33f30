//! Endpoint address parsing
//!
//! Endpoints are given as `[host:]port`. The host part is optional and may
//! be an IP or hostname; if omitted the host is `localhost`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseError;

/// One of the two TCP endpoints the relay connects out to.
///
/// Immutable once parsed: the port is guaranteed to be in [1-65535].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl FromStr for Endpoint {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, ParseError> {
        let parts: Vec<&str> = s.split(':').collect();
        let (host, port_str) = match parts.as_slice() {
            [port] => ("localhost", *port),
            [host, port] => (*host, *port),
            _ => return Err(ParseError::EndpointFormat),
        };

        let port: u64 = port_str
            .parse()
            .map_err(|_| ParseError::InvalidPort(port_str.to_string()))?;
        if !(1..=65535).contains(&port) {
            return Err(ParseError::PortOutOfRange(port));
        }

        Ok(Self::new(host, port as u16))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
