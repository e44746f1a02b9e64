//! Shared building blocks for climon: domain types, the device registry, reading
//! storage and telemetry setup.

pub mod domain;
pub mod garde;
pub mod postgres;
pub mod telemetry;

pub use domain::*;
pub use postgres::*;
pub use telemetry::*;
