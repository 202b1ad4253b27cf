use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use health_track_domain::entities::blood_pressure::BloodPressureReading;
use health_track_domain::entities::diet::DietRecord;
use health_track_domain::entities::heart_rate::HeartRateReading;

use super::query::HistoryQueryParams;

/// Paginated response for record history
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[aliases(
    BloodPressurePage = PaginatedResponse<BloodPressureReading>,
    HeartRatePage = PaginatedResponse<HeartRateReading>,
    DietRecordPage = PaginatedResponse<DietRecord>
)]
pub struct PaginatedResponse<T> {
    /// Total count of items matching the filter
    pub total_count: usize,

    pub offset: usize,

    pub limit: usize,

    /// URL for the next page (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,

    /// URL for the previous page (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,

    pub data: Vec<T>,
}

impl<T> PaginatedResponse<T> {
    /// Wrap one page of `data`, linking neighbours under `base_url`
    pub fn page(
        data: Vec<T>,
        total_count: usize,
        limit: usize,
        offset: usize,
        base_url: &str,
        query: &HistoryQueryParams,
    ) -> Self {
        let (next, previous) = generate_pagination_links(total_count, limit, offset, base_url, query);
        Self {
            total_count,
            offset,
            limit,
            next,
            previous,
            data,
        }
    }
}

fn page_url(base_url: &str, query: &HistoryQueryParams, limit: usize, offset: usize) -> String {
    let mut parts = Vec::new();

    if let Some(start) = &query.start_date {
        parts.push(format!("start_date={}", urlencoding::encode(start)));
    }
    if let Some(end) = &query.end_date {
        parts.push(format!("end_date={}", urlencoding::encode(end)));
    }
    parts.push(format!("limit={}", limit));
    parts.push(format!("offset={}", offset));
    if let Some(sort) = &query.sort {
        parts.push(format!("sort={}", urlencoding::encode(sort)));
    }

    format!("{}?{}", base_url, parts.join("&"))
}

/// Generate next/previous links for the current page
pub fn generate_pagination_links(
    total_count: usize,
    limit: usize,
    offset: usize,
    base_url: &str,
    query: &HistoryQueryParams,
) -> (Option<String>, Option<String>) {
    let next = if offset + limit < total_count {
        Some(page_url(base_url, query, limit, offset + limit))
    } else {
        None
    };

    let previous = if offset > 0 {
        Some(page_url(base_url, query, limit, offset.saturating_sub(limit)))
    } else {
        None
    };

    (next, previous)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_link_generation() {
        let query = HistoryQueryParams {
            start_date: Some("2024-01-01T00:00:00+08:00".to_string()),
            end_date: Some("2024-02-01".to_string()),
            limit: Some(10),
            offset: Some(20),
            sort: Some("desc".to_string()),
        };

        let (next, prev) = generate_pagination_links(50, 10, 20, "/api/v1/bloodpressure", &query);
        let next = next.unwrap();
        let prev = prev.unwrap();
        assert!(next.contains("offset=30"));
        assert!(prev.contains("offset=10"));
        assert!(next.contains("start_date=2024-01-01T00%3A00%3A00%2B08%3A00"));
        assert!(next.starts_with("/api/v1/bloodpressure?"));

        // First page
        let (next, prev) = generate_pagination_links(50, 10, 0, "/api/v1/bloodpressure", &query);
        assert!(next.is_some());
        assert!(prev.is_none());

        // Last page
        let (next, prev) = generate_pagination_links(50, 10, 40, "/api/v1/bloodpressure", &query);
        assert!(next.is_none());
        assert!(prev.is_some());
    }

    #[test]
    fn test_previous_link_never_goes_negative() {
        let (_, prev) = generate_pagination_links(50, 10, 5, "/api/v1/diet", &HistoryQueryParams::default());
        assert!(prev.unwrap().contains("offset=0"));
    }
}
