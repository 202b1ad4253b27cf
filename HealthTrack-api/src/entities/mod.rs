// Public entities for the HealthTrack API
// Wire-level types that only exist at the HTTP boundary. Record types come
// straight from the domain crate.

// Pagination envelope and link building
pub mod common;

// Query string parameters
pub mod query;

// Request and response bodies specific to the HTTP surface
pub mod payload;

pub use common::{
    generate_pagination_links, BloodPressurePage, DietRecordPage, HeartRatePage, PaginatedResponse,
};
pub use payload::{ArchiveHabitRequest, DietSummaryResponse};
pub use query::{
    CheckinRangeParams, GoalListParams, HabitListParams, HistoryQueryParams, InsightsQueryParams,
    PeriodQueryParams, RecommendationHistoryParams,
};
