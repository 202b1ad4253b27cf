//! Advice generation from a health analysis.
//!
//! Two providers exist: [`RuleBasedAdvisor`] turns categories and rates into
//! fixed advice lines, and [`LlmAdvisor`] asks an OpenAI-compatible chat
//! endpoint. The recommendation service prefers the LLM when configured and
//! falls back to the rules whenever it fails.

use async_trait::async_trait;
use thiserror::Error;

use crate::entities::analysis::HealthAnalysis;
use crate::entities::recommendation::AdviceSource;

pub mod llm;
pub mod rules;

pub use llm::{LlmAdvisor, LlmConfig};
pub use rules::RuleBasedAdvisor;

#[derive(Debug, Error)]
pub enum AdviceError {
    #[error("LLM request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("LLM response contained no advice")]
    EmptyResponse,

    #[error("Failed to encode analysis: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Something that can turn an analysis into advice lines
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdviceProvider: Send + Sync {
    fn source(&self) -> AdviceSource;

    async fn advise(&self, analysis: &HealthAnalysis) -> Result<Vec<String>, AdviceError>;
}
