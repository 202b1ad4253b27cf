use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use health_track_domain::entities::common::HistoryFilter;
use health_track_domain::entities::goal::GoalStatus;

use crate::api::error::ErrorResponse;

/// Query parameters for record history
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct HistoryQueryParams {
    /// RFC 3339 timestamp or YYYY-MM-DD (default: 30 days ago)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    /// RFC 3339 timestamp or YYYY-MM-DD (default: now)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,

    /// Maximum number of results (default: 100, max: 1000)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,

    /// Pagination offset (default: 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,

    /// Sort direction (asc/desc, default: desc)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

impl HistoryQueryParams {
    pub fn to_filter(&self) -> Result<HistoryFilter, ErrorResponse> {
        let ascending = match self.sort.as_deref() {
            None | Some("desc") => false,
            Some("asc") => true,
            Some(other) => {
                return Err(ErrorResponse::bad_request(format!(
                    "Invalid sort '{}'. Use asc or desc",
                    other
                )))
            }
        };

        Ok(HistoryFilter {
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            limit: self.limit,
            offset: self.offset,
            ascending,
        })
    }
}

/// Query parameters for insights
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct InsightsQueryParams {
    /// Analysis period in days (default: 30, max: 365)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<u32>,
}

/// Query parameters for summaries over a number of days
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PeriodQueryParams {
    /// Number of days to cover (default: 30, max: 365)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct GoalListParams {
    /// Only goals with this status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<GoalStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct HabitListParams {
    /// Include archived habits (default: false)
    #[serde(default)]
    pub include_archived: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct CheckinRangeParams {
    /// First day, YYYY-MM-DD
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    /// Last day, YYYY-MM-DD
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct RecommendationHistoryParams {
    /// Maximum number of entries (default: 20, max: 100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}
