use crate::domain::{
    AppendReadingRepoInput, DomainError, DomainResult, QueryReadingsRepoInput, Reading,
    ReadingRepository,
};
use crate::postgres::PostgresClient;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error};

const INSERT_READING: &str = "INSERT INTO dht_readings (temperature, humidity, location)
     VALUES ($1, $2, $3)
     RETURNING id";

const SELECT_READINGS_SINCE: &str =
    "SELECT id, recorded_at, temperature, humidity, location
     FROM dht_readings
     WHERE recorded_at > $1
     ORDER BY id DESC";

const SELECT_CLOCK: &str = "SELECT clock_timestamp()";

/// Reading row as stored in `dht_readings`
#[derive(Debug, Clone)]
pub struct ReadingRow {
    pub id: i64,
    pub recorded_at: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: f64,
    pub location: String,
}

impl From<ReadingRow> for Reading {
    fn from(row: ReadingRow) -> Self {
        Reading {
            id: row.id,
            recorded_at: row.recorded_at,
            temperature: row.temperature,
            humidity: row.humidity,
            location: row.location,
        }
    }
}

/// PostgreSQL implementation of ReadingRepository
///
/// `id` comes from a BIGSERIAL and `recorded_at` from `clock_timestamp()` on the server,
/// which is also the clock `current_time` reads.
/// Appends from this process are serialized by a writer lock so ids commit in the
/// order they are handed out; readers never take the lock.
#[derive(Clone)]
pub struct PostgresReadingRepository {
    client: PostgresClient,
    write_lock: Arc<Mutex<()>>,
}

impl PostgresReadingRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self {
            client,
            write_lock: Arc::new(Mutex::new(())),
        }
    }
}

fn storage_unavailable(context: &str, err: impl Into<anyhow::Error>) -> DomainError {
    let err = err.into();
    error!(error = %err, "{}", context);
    DomainError::StorageUnavailable(err.context(context.to_string()))
}

#[async_trait]
impl ReadingRepository for PostgresReadingRepository {
    async fn append(&self, input: AppendReadingRepoInput) -> DomainResult<i64> {
        debug!(location = %input.location, "appending reading to database");

        let conn = self
            .client
            .get_connection()
            .await
            .map_err(|e| storage_unavailable("failed to get database connection", e))?;

        let _guard = self.write_lock.lock().await;

        let row = conn
            .query_one(
                INSERT_READING,
                &[&input.temperature, &input.humidity, &input.location],
            )
            .await
            .map_err(|e| storage_unavailable("failed to insert reading", e))?;

        let id: i64 = row.get(0);
        debug!(id, "reading appended");

        Ok(id)
    }

    async fn query_range(&self, input: QueryReadingsRepoInput) -> DomainResult<Vec<Reading>> {
        debug!(since = %input.since, "querying readings from database");

        let conn = self
            .client
            .get_connection()
            .await
            .map_err(|e| storage_unavailable("failed to get database connection", e))?;

        let rows = conn
            .query(SELECT_READINGS_SINCE, &[&input.since])
            .await
            .map_err(|e| storage_unavailable("failed to query readings", e))?;

        let readings = rows
            .into_iter()
            .map(|row| {
                ReadingRow {
                    id: row.get(0),
                    recorded_at: row.get(1),
                    temperature: row.get(2),
                    humidity: row.get(3),
                    location: row.get(4),
                }
                .into()
            })
            .collect::<Vec<Reading>>();

        debug!(count = readings.len(), "readings loaded");
        Ok(readings)
    }

    async fn current_time(&self) -> DomainResult<DateTime<Utc>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(|e| storage_unavailable("failed to get database connection", e))?;

        let row = conn
            .query_one(SELECT_CLOCK, &[])
            .await
            .map_err(|e| storage_unavailable("failed to read database clock", e))?;

        Ok(row.get(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_row_to_domain_conversion() {
        let recorded_at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
        let row = ReadingRow {
            id: 42,
            recorded_at,
            temperature: 21.5,
            humidity: 40.0,
            location: "Kitchen".to_string(),
        };

        let reading: Reading = row.into();
        assert_eq!(reading.id, 42);
        assert_eq!(reading.recorded_at, recorded_at);
        assert_eq!(reading.location, "Kitchen");
    }

    #[tokio::test]
    async fn test_append_fails_with_storage_unavailable_when_unreachable() {
        // nothing listens on port 1
        let client = PostgresClient::new("127.0.0.1", 1, "climon", "climon", "climon", 1).unwrap();
        let repo = PostgresReadingRepository::new(client);

        let result = repo
            .append(AppendReadingRepoInput {
                temperature: 21.5,
                humidity: 40.0,
                location: "Kitchen".to_string(),
            })
            .await;

        assert!(matches!(result, Err(DomainError::StorageUnavailable(_))));
    }

    #[tokio::test]
    async fn test_current_time_fails_with_storage_unavailable_when_unreachable() {
        let client = PostgresClient::new("127.0.0.1", 1, "climon", "climon", "climon", 1).unwrap();
        let repo = PostgresReadingRepository::new(client);

        let result = repo.current_time().await;

        assert!(matches!(result, Err(DomainError::StorageUnavailable(_))));
    }
}
