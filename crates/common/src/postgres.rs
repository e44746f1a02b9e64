mod client;
mod config;
mod reading_repository;

pub use client::*;
pub use config::*;
pub use reading_repository::*;
