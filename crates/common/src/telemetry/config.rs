use opentelemetry_sdk::trace::TracerProvider as SdkTracerProvider;

/// Where JSON log lines are written
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogWriter {
    #[default]
    Stdout,
    /// For tools whose stdout is their output
    Stderr,
}

/// Configuration for telemetry initialization
#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub otel_endpoint: String,
    pub otel_enabled: bool,
    pub log_level: String,
    pub log_writer: LogWriter,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "climon".to_string(),
            otel_endpoint: "http://localhost:4317".to_string(),
            otel_enabled: false,
            log_level: "info".to_string(),
            log_writer: LogWriter::Stdout,
        }
    }
}

/// Providers returned from telemetry initialization, kept for shutdown
pub struct TelemetryProviders {
    pub tracer_provider: SdkTracerProvider,
}
