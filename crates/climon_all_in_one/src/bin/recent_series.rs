//! Prints the recent table and chart views as JSON.
//!
//! Reads the same `CLIMON_*` environment as the service. An optional argument
//! overrides the window in hours. Logs go to stderr, stdout is only the document.
//! With the memory backend the store is private to this process, so the views are
//! empty.

use anyhow::Context;
use chrono::Local;
use climon_all_in_one::config::ServiceConfig;
use climon_all_in_one::store::build_reading_store;
use common::telemetry::{init_telemetry, shutdown_telemetry, LogWriter, TelemetryConfig};
use serde::Serialize;
use series_query::{to_table_rows, SeriesQueryResult, SeriesQueryService, TableRow};
use std::time::Duration;

#[derive(Serialize)]
struct RecentSeriesOutput {
    window_hours: u64,
    table: Vec<TableRow>,
    chart: SeriesQueryResult,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_env()?;

    let providers = init_telemetry(&TelemetryConfig {
        service_name: format!("{}-recent-series", config.otel_service_name),
        otel_endpoint: config.otel_endpoint.clone(),
        otel_enabled: config.otel_enabled,
        log_level: config.log_level.clone(),
        log_writer: LogWriter::Stderr,
    })?;

    let window_hours = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<u64>()
            .with_context(|| format!("window must be a whole number of hours, got '{}'", arg))?,
        None => config.query_window_hours,
    };

    let repository = build_reading_store(&config).await?;
    let service = SeriesQueryService::new(repository);

    let window = Duration::from_secs(window_hours.saturating_mul(3600));
    let view = service.recent_view(window).await?;

    let output = RecentSeriesOutput {
        window_hours,
        table: to_table_rows(&view.table, &Local),
        chart: view.chart,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    shutdown_telemetry(providers);
    Ok(())
}
