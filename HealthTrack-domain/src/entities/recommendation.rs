use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Which advisor produced a set of advice
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AdviceSource {
    Rules,
    Llm,
}

impl AdviceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdviceSource::Rules => "rules",
            AdviceSource::Llm => "llm",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "llm" => AdviceSource::Llm,
            _ => AdviceSource::Rules,
        }
    }
}

/// Stored advice
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Recommendation {
    pub id: String,
    pub source: AdviceSource,
    pub advice: Vec<String>,

    /// Days of data the advice was based on
    pub period_days: u32,

    pub created_at: String,
}

/// Request payload for generating advice
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct GenerateRecommendationRequest {
    /// Days of history to analyze (default 30)
    #[validate(range(min = 1, max = 365, message = "Period must be between 1 and 365 days"))]
    pub period_days: Option<u32>,
}
