use common::domain::{
    decode_telemetry, AppendReadingRepoInput, DeviceRegistry, DomainResult, ReadingRepository,
};
use std::sync::Arc;
use tracing::{debug, instrument, Span};

/// Turns one broker payload into at most one stored reading
///
/// Flow:
/// 1. Decode and validate the JSON payload
/// 2. Resolve the device to its location
/// 3. Append the reading; the store assigns id and timestamp
pub struct ReadingIngestService {
    registry: Arc<DeviceRegistry>,
    repository: Arc<dyn ReadingRepository>,
}

impl ReadingIngestService {
    pub fn new(registry: Arc<DeviceRegistry>, repository: Arc<dyn ReadingRepository>) -> Self {
        Self {
            registry,
            repository,
        }
    }

    /// Returns the id of the stored reading
    #[instrument(skip_all, fields(payload_size = payload.len(), device_id = tracing::field::Empty))]
    pub async fn ingest(&self, payload: &[u8]) -> DomainResult<i64> {
        let message = decode_telemetry(payload)?;
        Span::current().record("device_id", message.device.as_str());

        let location = self.registry.resolve(&message.device)?;

        debug!(
            location = %location,
            temperature = message.temperature,
            humidity = message.humidity,
            "storing reading"
        );

        self.repository
            .append(AppendReadingRepoInput {
                temperature: message.temperature,
                humidity: message.humidity,
                location: location.to_string(),
            })
            .await
    }
}
