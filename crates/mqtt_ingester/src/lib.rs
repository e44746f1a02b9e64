//! Broker → store ingestion for DHT temperature/humidity telemetry.

pub mod domain;
pub mod mqtt;
pub mod mqtt_ingester;

pub use domain::*;
pub use mqtt_ingester::*;
