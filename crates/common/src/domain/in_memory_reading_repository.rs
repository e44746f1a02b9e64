use crate::domain::{
    AppendReadingRepoInput, Clock, DomainResult, QueryReadingsRepoInput, Reading, ReadingRepository,
    SystemClock,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory implementation of ReadingRepository
///
/// Readings are kept in id order. Since `recorded_at` never goes backwards between
/// appends, the same vector is also sorted by time and range queries are a binary
/// search. Contents are lost when the process exits.
pub struct InMemoryReadingRepository {
    readings: Arc<RwLock<Vec<Reading>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryReadingRepository {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            readings: Arc::new(RwLock::new(Vec::new())),
            clock,
        }
    }

    pub async fn len(&self) -> usize {
        self.readings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.readings.read().await.is_empty()
    }
}

impl Default for InMemoryReadingRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReadingRepository for InMemoryReadingRepository {
    async fn append(&self, input: AppendReadingRepoInput) -> DomainResult<i64> {
        let mut readings = self.readings.write().await;

        let (id, recorded_at) = match readings.last() {
            Some(last) => (last.id + 1, self.clock.now().max(last.recorded_at)),
            None => (1, self.clock.now()),
        };

        debug!(id, location = %input.location, "appending reading");

        readings.push(Reading {
            id,
            recorded_at,
            temperature: input.temperature,
            humidity: input.humidity,
            location: input.location,
        });

        Ok(id)
    }

    async fn query_range(&self, input: QueryReadingsRepoInput) -> DomainResult<Vec<Reading>> {
        let readings = self.readings.read().await;
        let start = readings.partition_point(|r| r.recorded_at <= input.since);

        Ok(readings[start..].iter().rev().cloned().collect())
    }

    async fn current_time(&self) -> DomainResult<DateTime<Utc>> {
        Ok(self.clock.now())
    }
}
