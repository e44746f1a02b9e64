use crate::domain::result::DomainResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored temperature/humidity reading
///
/// `id` and `recorded_at` are assigned by the store at insertion time. `recorded_at`
/// never comes from the device, so device clock skew cannot reorder history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub id: i64,
    pub recorded_at: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: f64,
    pub location: String,
}

/// Input for appending a single reading
#[derive(Debug, Clone, PartialEq)]
pub struct AppendReadingRepoInput {
    pub temperature: f64,
    pub humidity: f64,
    pub location: String,
}

/// Input for a rolling-window range query (exclusive lower bound)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryReadingsRepoInput {
    pub since: DateTime<Utc>,
}

/// Repository trait for reading storage
/// Infrastructure layer (postgres, in-memory) implements this trait
///
/// Implementations must:
/// - assign `id` strictly increasing across all appends, never reused
/// - assign `recorded_at` from their own clock, and report it through `current_time`
/// - make each append atomic: readers see either the whole row or nothing
/// - return `DomainError::StorageUnavailable` when the medium cannot be reached or written
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ReadingRepository: Send + Sync {
    /// Persist one reading and return its assigned id
    async fn append(&self, input: AppendReadingRepoInput) -> DomainResult<i64>;

    /// All readings with `recorded_at > since`, newest first (id descending)
    async fn query_range(&self, input: QueryReadingsRepoInput) -> DomainResult<Vec<Reading>>;

    /// Now, by the clock that stamps `recorded_at`
    async fn current_time(&self) -> DomainResult<DateTime<Utc>>;
}
