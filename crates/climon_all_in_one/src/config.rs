use common::domain::DEFAULT_DEVICE_TABLE;
use common::postgres::PostgresConfig;
use config::{Config, ConfigError, Environment};
use mqtt_ingester::{IngestionConfig, MqttIngesterConfig, DEFAULT_TELEMETRY_TOPIC};
use serde::{Deserialize, Serialize};
use std::fmt;

const REDACTED: &str = "***";

#[derive(Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    // OpenTelemetry configuration
    /// Export spans over OTLP
    #[serde(default = "default_otel_enabled")]
    pub otel_enabled: bool,

    /// OTLP gRPC endpoint
    #[serde(default = "default_otel_endpoint")]
    pub otel_endpoint: String,

    /// Service name reported to the collector
    #[serde(default = "default_otel_service_name")]
    pub otel_service_name: String,

    // MQTT configuration
    /// Broker address, e.g. mqtt://localhost:1883
    #[serde(default = "default_mqtt_broker_url")]
    pub mqtt_broker_url: String,

    #[serde(default = "default_mqtt_client_id")]
    pub mqtt_client_id: String,

    #[serde(default)]
    pub mqtt_username: Option<String>,

    #[serde(default)]
    pub mqtt_password: Option<String>,

    /// Topic filter for telemetry, may contain + and # wildcards
    #[serde(default = "default_mqtt_topic")]
    pub mqtt_topic: String,

    #[serde(default = "default_mqtt_keep_alive_secs")]
    pub mqtt_keep_alive_secs: u64,

    /// First reconnect delay after losing the broker
    #[serde(default = "default_reconnect_initial_delay_ms")]
    pub reconnect_initial_delay_ms: u64,

    /// Upper bound for the reconnect delay
    #[serde(default = "default_reconnect_max_delay_ms")]
    pub reconnect_max_delay_ms: u64,

    // Store configuration
    /// Reading store backend: postgres or memory
    #[serde(default = "default_store_backend")]
    pub store_backend: String,

    /// PostgreSQL host
    #[serde(default = "default_postgres_host")]
    pub postgres_host: String,

    /// PostgreSQL port
    #[serde(default = "default_postgres_port")]
    pub postgres_port: u16,

    /// PostgreSQL database name
    #[serde(default = "default_postgres_database")]
    pub postgres_database: String,

    /// PostgreSQL username
    #[serde(default = "default_postgres_username")]
    pub postgres_username: String,

    /// PostgreSQL password
    #[serde(default = "default_postgres_password")]
    pub postgres_password: String,

    #[serde(default = "default_postgres_max_pool_size")]
    pub postgres_max_pool_size: usize,

    /// Path to PostgreSQL migrations directory
    #[serde(default = "default_postgres_migrations_dir")]
    pub postgres_migrations_dir: String,

    /// Path to goose binary
    #[serde(default = "default_postgres_goose_binary_path")]
    pub postgres_goose_binary_path: String,

    /// Apply migrations on startup
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,

    // Domain configuration
    /// Device table as `DEVICE=Location` pairs separated by commas
    #[serde(default = "default_devices")]
    pub devices: String,

    /// Window used by the recent_series binary
    #[serde(default = "default_query_window_hours")]
    pub query_window_hours: u64,
}

// Passwords are redacted so the config can be logged.
impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("log_level", &self.log_level)
            .field("otel_enabled", &self.otel_enabled)
            .field("otel_endpoint", &self.otel_endpoint)
            .field("otel_service_name", &self.otel_service_name)
            .field("mqtt_broker_url", &self.mqtt_broker_url)
            .field("mqtt_client_id", &self.mqtt_client_id)
            .field("mqtt_username", &self.mqtt_username)
            .field("mqtt_password", &self.mqtt_password.as_ref().map(|_| REDACTED))
            .field("mqtt_topic", &self.mqtt_topic)
            .field("mqtt_keep_alive_secs", &self.mqtt_keep_alive_secs)
            .field("reconnect_initial_delay_ms", &self.reconnect_initial_delay_ms)
            .field("reconnect_max_delay_ms", &self.reconnect_max_delay_ms)
            .field("store_backend", &self.store_backend)
            .field("postgres_host", &self.postgres_host)
            .field("postgres_port", &self.postgres_port)
            .field("postgres_database", &self.postgres_database)
            .field("postgres_username", &self.postgres_username)
            .field("postgres_password", &REDACTED)
            .field("postgres_max_pool_size", &self.postgres_max_pool_size)
            .field("postgres_migrations_dir", &self.postgres_migrations_dir)
            .field("postgres_goose_binary_path", &self.postgres_goose_binary_path)
            .field("run_migrations", &self.run_migrations)
            .field("devices", &self.devices)
            .field("query_window_hours", &self.query_window_hours)
            .finish()
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_otel_enabled() -> bool {
    false
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_otel_service_name() -> String {
    "climon".to_string()
}

fn default_mqtt_broker_url() -> String {
    "mqtt://localhost:1883".to_string()
}

fn default_mqtt_client_id() -> String {
    "climon-ingester".to_string()
}

fn default_mqtt_topic() -> String {
    DEFAULT_TELEMETRY_TOPIC.to_string()
}

fn default_mqtt_keep_alive_secs() -> u64 {
    60
}

fn default_reconnect_initial_delay_ms() -> u64 {
    500
}

fn default_reconnect_max_delay_ms() -> u64 {
    30_000
}

fn default_store_backend() -> String {
    "postgres".to_string()
}

fn default_postgres_host() -> String {
    "localhost".to_string()
}

fn default_postgres_port() -> u16 {
    5432
}

fn default_postgres_database() -> String {
    "climon".to_string()
}

fn default_postgres_username() -> String {
    "climon".to_string()
}

fn default_postgres_password() -> String {
    "climon".to_string()
}

fn default_postgres_max_pool_size() -> usize {
    8
}

fn default_postgres_migrations_dir() -> String {
    "crates/common/migrations/postgres".to_string()
}

fn default_postgres_goose_binary_path() -> String {
    "goose".to_string()
}

fn default_run_migrations() -> bool {
    true
}

fn default_devices() -> String {
    DEFAULT_DEVICE_TABLE.to_string()
}

fn default_query_window_hours() -> u64 {
    168
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("CLIMON"))
            .build()?
            .try_deserialize()
    }

    pub fn postgres_config(&self) -> PostgresConfig {
        PostgresConfig {
            host: self.postgres_host.clone(),
            port: self.postgres_port,
            database: self.postgres_database.clone(),
            username: self.postgres_username.clone(),
            password: self.postgres_password.clone(),
            max_pool_size: self.postgres_max_pool_size,
            migrations_dir: self.postgres_migrations_dir.clone(),
            goose_binary_path: self.postgres_goose_binary_path.clone(),
        }
    }

    pub fn mqtt_ingester_config(&self) -> MqttIngesterConfig {
        MqttIngesterConfig {
            broker_url: self.mqtt_broker_url.clone(),
            client_id: self.mqtt_client_id.clone(),
            username: self.mqtt_username.clone(),
            password: self.mqtt_password.clone(),
            keep_alive_secs: self.mqtt_keep_alive_secs,
            ingestion: IngestionConfig {
                topic: self.mqtt_topic.clone(),
                reconnect_initial_delay_ms: self.reconnect_initial_delay_ms,
                reconnect_max_delay_ms: self.reconnect_max_delay_ms,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // env vars are process-wide
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "CLIMON_LOG_LEVEL",
        "CLIMON_MQTT_BROKER_URL",
        "CLIMON_MQTT_USERNAME",
        "CLIMON_MQTT_PASSWORD",
        "CLIMON_STORE_BACKEND",
        "CLIMON_POSTGRES_PORT",
        "CLIMON_POSTGRES_PASSWORD",
        "CLIMON_DEVICES",
    ];

    fn clear_env() {
        for var in VARS {
            // SAFETY: callers hold TEST_LOCK
            unsafe {
                std::env::remove_var(var);
            }
        }
    }

    #[test]
    fn test_default_config() {
        let _lock = TEST_LOCK.lock().unwrap();
        clear_env();

        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.mqtt_broker_url, "mqtt://localhost:1883");
        assert_eq!(config.mqtt_topic, "/esp8266/dhtreadings");
        assert_eq!(config.mqtt_keep_alive_secs, 60);
        assert!(config.mqtt_username.is_none());
        assert_eq!(config.store_backend, "postgres");
        assert_eq!(config.devices, DEFAULT_DEVICE_TABLE);
        assert_eq!(config.query_window_hours, 168);
    }

    #[test]
    fn test_custom_config() {
        let _lock = TEST_LOCK.lock().unwrap();
        clear_env();

        // SAFETY: Test runs with mutex lock to prevent concurrent env access
        unsafe {
            std::env::set_var("CLIMON_LOG_LEVEL", "debug");
            std::env::set_var("CLIMON_MQTT_BROKER_URL", "mqtt://broker.lan:1884");
            std::env::set_var("CLIMON_MQTT_USERNAME", "flask");
            std::env::set_var("CLIMON_MQTT_PASSWORD", "waiter");
            std::env::set_var("CLIMON_STORE_BACKEND", "memory");
            std::env::set_var("CLIMON_POSTGRES_PORT", "6543");
            std::env::set_var("CLIMON_DEVICES", "A1=Garage");
        }

        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.mqtt_broker_url, "mqtt://broker.lan:1884");
        assert_eq!(config.mqtt_username.as_deref(), Some("flask"));
        assert_eq!(config.store_backend, "memory");
        assert_eq!(config.postgres_port, 6543);
        assert_eq!(config.devices, "A1=Garage");

        let mqtt = config.mqtt_ingester_config();
        assert_eq!(mqtt.password.as_deref(), Some("waiter"));
        assert_eq!(config.postgres_config().port, 6543);

        clear_env();
    }

    #[test]
    fn test_debug_output_hides_passwords() {
        let _lock = TEST_LOCK.lock().unwrap();
        clear_env();

        // SAFETY: Test runs with mutex lock to prevent concurrent env access
        unsafe {
            std::env::set_var("CLIMON_MQTT_USERNAME", "flask");
            std::env::set_var("CLIMON_MQTT_PASSWORD", "waiter-secret");
            std::env::set_var("CLIMON_POSTGRES_PASSWORD", "pg-secret");
        }

        let config = ServiceConfig::from_env().unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("waiter-secret"));
        assert!(!rendered.contains("pg-secret"));
        assert!(rendered.contains("flask"));
        assert!(rendered.contains("mqtt_password: Some(\"***\")"));

        // the secrets still reach the components
        assert_eq!(config.postgres_config().password, "pg-secret");
        assert_eq!(
            config.mqtt_ingester_config().password.as_deref(),
            Some("waiter-secret")
        );

        clear_env();
    }
}
