use crate::config::ServiceConfig;
use anyhow::Context;
use common::domain::{InMemoryReadingRepository, ReadingRepository};
use common::postgres::{PostgresClient, PostgresConfig, PostgresReadingRepository};
use goose::MigrationRunner;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

/// Where readings are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    /// Lost on restart
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" | "in-memory" => Ok(Self::Memory),
            other => {
                anyhow::bail!("unknown store backend '{}', expected postgres or memory", other)
            }
        }
    }
}

/// Build the reading store selected by configuration
///
/// For Postgres this applies pending migrations (unless disabled) and checks the
/// database is reachable before returning.
pub async fn build_reading_store(
    config: &ServiceConfig,
) -> anyhow::Result<Arc<dyn ReadingRepository>> {
    match config.store_backend.parse::<StoreBackend>()? {
        StoreBackend::Memory => {
            warn!("using in-memory reading store, readings will not survive a restart");
            Ok(Arc::new(InMemoryReadingRepository::new()))
        }
        StoreBackend::Postgres => {
            let pg_config = config.postgres_config();
            if config.run_migrations {
                run_postgres_migrations(&pg_config).await?;
            }

            let client = PostgresClient::from_config(&pg_config)?;
            client.ping().await.with_context(|| {
                format!(
                    "postgres at {}:{} is unreachable",
                    pg_config.host, pg_config.port
                )
            })?;
            info!(
                host = %pg_config.host,
                database = %pg_config.database,
                "postgres reading store ready"
            );

            Ok(Arc::new(PostgresReadingRepository::new(client)))
        }
    }
}

async fn run_postgres_migrations(config: &PostgresConfig) -> anyhow::Result<()> {
    info!(migrations_dir = %config.migrations_dir, "running postgres migrations");
    let runner = MigrationRunner::new(
        config.goose_binary_path.clone(),
        config.migrations_dir.clone(),
        "postgres".to_string(),
        config.dsn(),
    );
    runner.run_migrations().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_store_backend() {
        assert_eq!("postgres".parse::<StoreBackend>().unwrap(), StoreBackend::Postgres);
        assert_eq!(" Memory ".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert!("sqlite".parse::<StoreBackend>().is_err());
    }
}
