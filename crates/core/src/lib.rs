//! Wirejam Core Types
//!
//! This crate defines the shared vocabulary used throughout wirejam:
//! endpoint addresses, noise parameters, relay directions, and the
//! resolved run configuration.

mod config;
mod endpoint;
mod error;
mod types;

pub use config::*;
pub use endpoint::*;
pub use error::*;
pub use types::*;
