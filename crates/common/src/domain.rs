mod clock;
mod device_registry;
mod in_memory_reading_repository;
mod reading;
mod result;
mod telemetry_message;

pub use clock::*;
pub use device_registry::*;
pub use in_memory_reading_repository::*;
pub use reading::*;
pub use result::*;
pub use telemetry_message::*;
