use crate::domain::{IngestionConfig, IngestionPipeline, ReadingIngestService};
use crate::mqtt::{BrokerAddress, MqttConnectionOptions, RumqttTransport};
use climon_runner::{AppProcess, BoxedTask};
use common::domain::{DeviceRegistry, ReadingRepository};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub struct MqttIngesterConfig {
    pub broker_url: String,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub keep_alive_secs: u64,
    pub ingestion: IngestionConfig,
}

/// Wires the MQTT transport, device registry and reading store into a pipeline
pub struct MqttIngester {
    pipeline: Arc<IngestionPipeline>,
}

impl MqttIngester {
    pub fn new(
        repository: Arc<dyn ReadingRepository>,
        registry: Arc<DeviceRegistry>,
        config: MqttIngesterConfig,
    ) -> anyhow::Result<Self> {
        debug!(
            broker_url = %config.broker_url,
            devices = registry.len(),
            "initializing MQTT ingester"
        );

        let address = BrokerAddress::parse(&config.broker_url)?;
        let mut options = MqttConnectionOptions::new(address, config.client_id)
            .with_keep_alive(Duration::from_secs(config.keep_alive_secs))?;
        if let Some(username) = config.username {
            options = options.with_credentials(username, config.password.unwrap_or_default());
        }

        let ingest_service = Arc::new(ReadingIngestService::new(registry, repository));
        let pipeline = Arc::new(IngestionPipeline::new(
            Arc::new(RumqttTransport::new(options)),
            ingest_service,
            config.ingestion,
        ));

        Ok(Self { pipeline })
    }

    pub fn pipeline(&self) -> Arc<IngestionPipeline> {
        Arc::clone(&self.pipeline)
    }

    pub fn into_runner_process(self) -> AppProcess {
        let pipeline = self.pipeline;
        Box::new(move |ctx: CancellationToken| -> BoxedTask {
            Box::pin(async move {
                pipeline.run(ctx).await;
                Ok::<(), anyhow::Error>(())
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PipelineState;
    use common::domain::{InMemoryReadingRepository, DEFAULT_DEVICE_TABLE};

    fn config(broker_url: &str) -> MqttIngesterConfig {
        MqttIngesterConfig {
            broker_url: broker_url.to_string(),
            client_id: "climon-test".to_string(),
            username: Some("flask".to_string()),
            password: Some("waiter".to_string()),
            keep_alive_secs: 60,
            ingestion: IngestionConfig::default(),
        }
    }

    fn deps() -> (Arc<dyn ReadingRepository>, Arc<DeviceRegistry>) {
        (
            Arc::new(InMemoryReadingRepository::new()),
            Arc::new(DeviceRegistry::parse(DEFAULT_DEVICE_TABLE).unwrap()),
        )
    }

    #[test]
    fn test_new_starts_disconnected() {
        let (repo, registry) = deps();
        let ingester = MqttIngester::new(repo, registry, config("mqtt://localhost:1883")).unwrap();
        assert_eq!(ingester.pipeline().state(), PipelineState::Disconnected);
    }

    #[test]
    fn test_new_rejects_invalid_broker_url() {
        let (repo, registry) = deps();
        assert!(MqttIngester::new(repo, registry, config("mqtt://localhost:abc")).is_err());
    }
}
