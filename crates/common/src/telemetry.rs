//! Tracing and OpenTelemetry setup.

mod config;
mod init;

pub use config::*;
pub use init::*;
