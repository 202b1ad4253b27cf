use chrono::{DateTime, Duration, NaiveDate, NaiveTime, SecondsFormat, Utc};
use health_track_data::repository::RecordQuery;

use crate::error::ServiceError;

/// Page size used when a caller does not ask for one
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Largest page a caller may request
pub const MAX_PAGE_SIZE: usize = 1000;

/// History window used when a caller gives no start date
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Readings may be stamped slightly ahead of the server clock
const FUTURE_TOLERANCE_MINUTES: i64 = 5;

/// Format a UTC instant the way every record stores it (`2024-03-01T08:00:00Z`)
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse an RFC 3339 timestamp into UTC
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ServiceError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            ServiceError::Validation(format!(
                "Invalid timestamp '{}'. Use RFC 3339 (e.g. 2024-03-15T08:30:00Z)",
                value
            ))
        })
}

/// Parse a calendar date (YYYY-MM-DD)
pub fn parse_date(value: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ServiceError::Validation(format!("Invalid date '{}'. Use YYYY-MM-DD", value)))
}

/// Resolve an optional measurement time: default to now, reject times in the future
pub fn measurement_time(value: Option<&str>, now: DateTime<Utc>) -> Result<String, ServiceError> {
    let instant = match value {
        Some(raw) => parse_timestamp(raw)?,
        None => now,
    };

    if instant > now + Duration::minutes(FUTURE_TOLERANCE_MINUTES) {
        return Err(ServiceError::Validation(
            "Timestamp cannot be in the future".to_string(),
        ));
    }

    Ok(format_timestamp(instant))
}

/// Accept either an RFC 3339 timestamp or a bare date for a range bound.
/// A bare date covers the whole day: start of day for `start`, end of day otherwise.
fn parse_bound(value: &str, is_start: bool) -> Result<DateTime<Utc>, ServiceError> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        ServiceError::Validation(format!(
            "Invalid date '{}'. Use YYYY-MM-DD or RFC 3339 (e.g. 2024-03-15T08:30:00Z)",
            value
        ))
    })?;

    let time = if is_start {
        NaiveTime::MIN
    } else {
        NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
    };
    Ok(date.and_time(time).and_utc())
}

/// History listing options as received from a caller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    /// RFC 3339 timestamp or YYYY-MM-DD; defaults to 30 days ago
    pub start_date: Option<String>,
    /// RFC 3339 timestamp or YYYY-MM-DD; defaults to now plus the clock tolerance
    pub end_date: Option<String>,
    /// Page size (default 100, capped at 1000)
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    /// Oldest first when true
    pub ascending: bool,
}

impl HistoryFilter {
    /// Effective page size
    pub fn page_size(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Resolve defaults and normalize bounds into a repository query
    pub fn to_record_query(&self, now: DateTime<Utc>) -> Result<RecordQuery, ServiceError> {
        let start = match &self.start_date {
            Some(raw) => parse_bound(raw, true)?,
            None => now - Duration::days(DEFAULT_WINDOW_DAYS),
        };
        let end = match &self.end_date {
            Some(raw) => parse_bound(raw, false)?,
            // Matches what `measurement_time` accepts so fresh readings stay listed
            None => now + Duration::minutes(FUTURE_TOLERANCE_MINUTES),
        };

        if start > end {
            return Err(ServiceError::Validation(
                "start_date must not be after end_date".to_string(),
            ));
        }

        Ok(RecordQuery {
            start: Some(format_timestamp(start)),
            end: Some(format_timestamp(end)),
            limit: Some(self.page_size()),
            offset: Some(self.offset.unwrap_or(0)),
            sort_desc: !self.ascending,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_default_window_is_last_thirty_days() {
        let query = HistoryFilter::default().to_record_query(now()).unwrap();
        assert_eq!(query.start.as_deref(), Some("2024-02-14T12:00:00Z"));
        assert_eq!(query.end.as_deref(), Some("2024-03-15T12:05:00Z"));
        assert_eq!(query.limit, Some(DEFAULT_PAGE_SIZE));
        assert!(query.sort_desc);
    }

    #[test]
    fn test_bare_dates_cover_whole_days() {
        let filter = HistoryFilter {
            start_date: Some("2024-03-01".to_string()),
            end_date: Some("2024-03-02".to_string()),
            limit: Some(5000),
            ..HistoryFilter::default()
        };
        let query = filter.to_record_query(now()).unwrap();
        assert_eq!(query.start.as_deref(), Some("2024-03-01T00:00:00Z"));
        assert_eq!(query.end.as_deref(), Some("2024-03-02T23:59:59Z"));
        assert_eq!(query.limit, Some(MAX_PAGE_SIZE));
    }

    #[test]
    fn test_offset_timestamps_are_normalized_to_utc() {
        let filter = HistoryFilter {
            start_date: Some("2024-03-01T08:00:00+08:00".to_string()),
            ..HistoryFilter::default()
        };
        let query = filter.to_record_query(now()).unwrap();
        assert_eq!(query.start.as_deref(), Some("2024-03-01T00:00:00Z"));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let filter = HistoryFilter {
            start_date: Some("2024-03-10".to_string()),
            end_date: Some("2024-03-01".to_string()),
            ..HistoryFilter::default()
        };
        assert!(matches!(
            filter.to_record_query(now()),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_measurement_time_rejects_future() {
        assert_eq!(measurement_time(None, now()).unwrap(), "2024-03-15T12:00:00Z");
        assert!(measurement_time(Some("2024-03-15T12:04:00Z"), now()).is_ok());
        assert!(measurement_time(Some("2024-03-16T12:00:00Z"), now()).is_err());
        assert!(measurement_time(Some("yesterday"), now()).is_err());
    }

    #[test]
    fn test_default_window_includes_slightly_ahead_readings() {
        let stamped = measurement_time(Some("2024-03-15T12:04:00Z"), now()).unwrap();
        let query = HistoryFilter::default().to_record_query(now()).unwrap();
        let end = query.end.unwrap();
        assert!(stamped.as_str() <= end.as_str());
    }
}
