use crate::domain::{group_by_location, RecentReadings, SeriesQueryResult};
use chrono::{DateTime, Utc};
use common::domain::{DomainError, DomainResult, QueryReadingsRepoInput, Reading, ReadingRepository};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Read-only views over the most recent readings
///
/// The window is measured against the store's own clock, the one that stamps
/// `recorded_at`. Every operation issues exactly one range query, so results are
/// consistent with a single point in the store's history even while ingestion keeps
/// appending.
pub struct SeriesQueryService {
    repository: Arc<dyn ReadingRepository>,
}

impl SeriesQueryService {
    pub fn new(repository: Arc<dyn ReadingRepository>) -> Self {
        Self { repository }
    }

    /// Per-location series for readings newer than `now - window`
    #[instrument(skip(self), fields(window_secs = window.as_secs()))]
    pub async fn get_recent_series(&self, window: Duration) -> DomainResult<SeriesQueryResult> {
        let readings = self.readings_within(window).await?;
        let series = group_by_location(&readings);
        debug!(
            readings = readings.len(),
            locations = series.len(),
            "built recent series"
        );
        Ok(series)
    }

    /// Readings newer than `now - window`, newest first
    #[instrument(skip(self), fields(window_secs = window.as_secs()))]
    pub async fn list_recent(&self, window: Duration) -> DomainResult<Vec<Reading>> {
        self.readings_within(window).await
    }

    /// Table and chart views from one range query
    #[instrument(skip(self), fields(window_secs = window.as_secs()))]
    pub async fn recent_view(&self, window: Duration) -> DomainResult<RecentReadings> {
        let table = self.readings_within(window).await?;
        let chart = group_by_location(&table);
        Ok(RecentReadings { table, chart })
    }

    async fn readings_within(&self, window: Duration) -> DomainResult<Vec<Reading>> {
        let span = window_span(window)?;
        let now = self.repository.current_time().await.map_err(query_failed)?;
        let since = now.checked_sub_signed(span).ok_or_else(|| out_of_range(window))?;

        self.repository
            .query_range(QueryReadingsRepoInput { since })
            .await
            .map_err(query_failed)
    }
}

fn window_span(window: Duration) -> DomainResult<chrono::Duration> {
    if window.is_zero() {
        return Err(DomainError::InvalidQueryWindow(
            "window must be positive".to_string(),
        ));
    }

    chrono::Duration::from_std(window).map_err(|_| out_of_range(window))
}

fn out_of_range(window: Duration) -> DomainError {
    DomainError::InvalidQueryWindow(format!("window of {:?} is out of range", window))
}

fn query_failed(err: DomainError) -> DomainError {
    match err {
        DomainError::StorageUnavailable(source) => DomainError::QueryFailed(source),
        other => other,
    }
}
