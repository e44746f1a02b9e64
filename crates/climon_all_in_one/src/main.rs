use climon_all_in_one::config::ServiceConfig;
use climon_all_in_one::store::build_reading_store;
use climon_runner::Runner;
use common::domain::DeviceRegistry;
use common::telemetry::{
    init_telemetry, shutdown_telemetry, LogWriter, TelemetryConfig, TelemetryProviders,
};
use mqtt_ingester::MqttIngester;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let telemetry_providers: Option<TelemetryProviders> = match init_telemetry(&TelemetryConfig {
        service_name: config.otel_service_name.clone(),
        otel_endpoint: config.otel_endpoint.clone(),
        otel_enabled: config.otel_enabled,
        log_level: config.log_level.clone(),
        log_writer: LogWriter::Stdout,
    }) {
        Ok(providers) => providers,
        Err(e) => {
            eprintln!("Failed to initialize telemetry: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        otel_enabled = config.otel_enabled,
        store_backend = %config.store_backend,
        "Starting climon"
    );
    debug!("Configuration: {:?}", config);

    let registry = match DeviceRegistry::parse(&config.devices) {
        Ok(registry) => Arc::new(registry),
        Err(e) => {
            error!("Invalid device table: {}", e);
            std::process::exit(1);
        }
    };
    for (device, location) in registry.entries() {
        debug!(device, location, "registered device");
    }

    let repository = match build_reading_store(&config).await {
        Ok(repository) => repository,
        Err(e) => {
            error!("Failed to initialize reading store: {:#}", e);
            std::process::exit(1);
        }
    };

    let mqtt_ingester =
        match MqttIngester::new(repository, registry, config.mqtt_ingester_config()) {
            Ok(ingester) => ingester,
            Err(e) => {
                error!("Failed to initialize MQTT ingester: {}", e);
                std::process::exit(1);
            }
        };

    let runner = Runner::new()
        .with_boxed_process("mqtt_ingester", mqtt_ingester.into_runner_process())
        .with_closer(move || async move {
            info!("Running cleanup tasks...");
            shutdown_telemetry(telemetry_providers);
            info!("Cleanup complete");
            Ok(())
        })
        .with_closer_timeout(Duration::from_secs(10));

    runner.run().await;
}
