use chrono::{DateTime, TimeZone, Utc};
use common::domain::Reading;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;

/// One point of a per-location chart series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub recorded_at: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: f64,
}

impl From<&Reading> for SeriesPoint {
    fn from(reading: &Reading) -> Self {
        Self {
            recorded_at: reading.recorded_at,
            temperature: reading.temperature,
            humidity: reading.humidity,
        }
    }
}

/// Location → series, each ascending by `recorded_at`
pub type SeriesQueryResult = BTreeMap<String, Vec<SeriesPoint>>;

/// Chart and table views computed from the same range query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentReadings {
    /// Newest first
    pub table: Vec<Reading>,
    pub chart: SeriesQueryResult,
}

/// Reading rendered for a table with local date and time columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub id: i64,
    pub date: String,
    pub time: String,
    pub temperature: f64,
    pub humidity: f64,
    pub location: String,
}

/// Partition readings by location
///
/// Each series is ascending by `recorded_at`, ties broken by `id`. Locations without
/// readings do not appear.
pub fn group_by_location(readings: &[Reading]) -> SeriesQueryResult {
    let mut ordered: Vec<&Reading> = readings.iter().collect();
    ordered.sort_by(|a, b| a.recorded_at.cmp(&b.recorded_at).then(a.id.cmp(&b.id)));

    let mut series = SeriesQueryResult::new();
    for reading in ordered {
        series
            .entry(reading.location.clone())
            .or_insert_with(Vec::new)
            .push(SeriesPoint::from(reading));
    }
    series
}

/// Render readings as table rows in the given time zone, keeping their order
pub fn to_table_rows<Tz>(readings: &[Reading], tz: &Tz) -> Vec<TableRow>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    readings
        .iter()
        .map(|reading| {
            let local = reading.recorded_at.with_timezone(tz);
            TableRow {
                id: reading.id,
                date: local.format("%Y-%m-%d").to_string(),
                time: local.format("%H:%M:%S").to_string(),
                temperature: reading.temperature,
                humidity: reading.humidity,
                location: reading.location.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn reading(id: i64, at: &str, location: &str) -> Reading {
        Reading {
            id,
            recorded_at: at.parse().unwrap(),
            temperature: 20.0 + id as f64,
            humidity: 40.0,
            location: location.to_string(),
        }
    }

    #[test]
    fn test_group_by_location_orders_each_series_ascending() {
        let readings = vec![
            reading(4, "2024-03-01T10:03:00Z", "Office"),
            reading(3, "2024-03-01T10:02:00Z", "Kitchen"),
            reading(2, "2024-03-01T10:01:00Z", "Office"),
            reading(1, "2024-03-01T10:00:00Z", "Kitchen"),
        ];

        let series = group_by_location(&readings);

        assert_eq!(series.len(), 2);
        let kitchen: Vec<f64> = series["Kitchen"].iter().map(|p| p.temperature).collect();
        let office: Vec<f64> = series["Office"].iter().map(|p| p.temperature).collect();
        assert_eq!(kitchen, vec![21.0, 23.0]);
        assert_eq!(office, vec![22.0, 24.0]);
    }

    #[test]
    fn test_group_by_location_breaks_timestamp_ties_by_id() {
        let readings = vec![
            reading(7, "2024-03-01T10:00:00Z", "Office"),
            reading(6, "2024-03-01T10:00:00Z", "Office"),
        ];

        let series = group_by_location(&readings);

        let temps: Vec<f64> = series["Office"].iter().map(|p| p.temperature).collect();
        assert_eq!(temps, vec![26.0, 27.0]);
    }

    #[test]
    fn test_group_by_location_empty() {
        assert!(group_by_location(&[]).is_empty());
    }

    #[test]
    fn test_to_table_rows_uses_local_time() {
        let readings = vec![reading(1, "2024-03-01T23:30:15Z", "Bedroom")];
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();

        let rows = to_table_rows(&readings, &tz);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, "2024-03-02");
        assert_eq!(rows[0].time, "01:30:15");
        assert_eq!(rows[0].location, "Bedroom");
        assert_eq!(rows[0].id, 1);
    }
}
