use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::entities::analysis::HealthAnalysis;
use crate::entities::recommendation::AdviceSource;

use super::{AdviceError, AdviceProvider};

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECONDS: u64 = 20;

const SYSTEM_PROMPT: &str = "You are a careful health coach. Given a JSON summary of a user's \
recent blood pressure, heart rate, diet, goals and habits, reply with 3 to 6 short, practical \
advice lines, one per line, without numbering. Do not diagnose. Recommend seeing a doctor when \
readings are in a hypertension grade.";

/// Settings for an OpenAI-compatible chat completions endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    /// Base URL, e.g. `https://api.openai.com/v1`
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_seconds: u64,
}

impl LlmConfig {
    /// Read `LLM_API_URL`, `LLM_API_KEY`, `LLM_MODEL` and `LLM_TIMEOUT_SECONDS`.
    /// Returns `None` unless both the URL and the key are set.
    pub fn from_env() -> Option<Self> {
        let api_url = non_empty_var("LLM_API_URL")?;
        let api_key = non_empty_var("LLM_API_KEY")?;
        let model = non_empty_var("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let timeout_seconds = env::var("LLM_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS);

        info!("LLM advice enabled: url={}, model={}, timeout={}s", api_url, model, timeout_seconds);
        Some(Self {
            api_url,
            api_key,
            model,
            timeout_seconds,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_url.trim_end_matches('/'))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Advice from a chat completions endpoint
#[derive(Debug, Clone)]
pub struct LlmAdvisor {
    client: Client,
    config: LlmConfig,
}

impl LlmAdvisor {
    pub fn new(config: LlmConfig) -> Result<Self, AdviceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self { client, config })
    }
}

/// Split a completion into advice lines, dropping list markers and blanks
pub fn parse_advice_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| {
            let line = line.trim();
            let line = line.trim_start_matches(|c: char| c == '-' || c == '*' || c == '•').trim_start();
            let without_number = line.trim_start_matches(|c: char| c.is_ascii_digit());
            if without_number.len() < line.len() {
                if let Some(rest) = without_number.strip_prefix(['.', ')']) {
                    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                        return rest.trim().to_string();
                    }
                }
            }
            line.to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

#[async_trait]
impl AdviceProvider for LlmAdvisor {
    fn source(&self) -> AdviceSource {
        AdviceSource::Llm
    }

    async fn advise(&self, analysis: &HealthAnalysis) -> Result<Vec<String>, AdviceError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: serde_json::to_string(analysis)?,
                },
            ],
            temperature: 0.3,
        };

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdviceError::Status {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(AdviceError::EmptyResponse)?;

        let advice = parse_advice_lines(&content);
        debug!("LLM returned {} advice lines", advice.len());
        if advice.is_empty() {
            return Err(AdviceError::EmptyResponse);
        }
        Ok(advice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use chrono::Utc;
    use serde_json::{json, Value};

    fn analysis() -> HealthAnalysis {
        HealthAnalysis {
            period_days: 30,
            generated_at: Utc::now(),
            blood_pressure: None,
            heart_rate: None,
            diet: None,
            goals: Vec::new(),
            habits: Vec::new(),
        }
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/v1", addr)
    }

    fn config(api_url: String) -> LlmConfig {
        LlmConfig {
            api_url,
            api_key: "test-key".to_string(),
            model: "test-model".to_string(),
            timeout_seconds: 5,
        }
    }

    #[test]
    fn test_parse_advice_lines() {
        let lines = parse_advice_lines("1. Walk daily\n- Less salt\n\n* Sleep 8 hours\n2) Drink water\nPlain line");
        assert_eq!(
            lines,
            vec!["Walk daily", "Less salt", "Sleep 8 hours", "Drink water", "Plain line"]
        );
        // Leading numbers that are not list markers stay
        assert_eq!(parse_advice_lines("8 hours of sleep helps"), vec!["8 hours of sleep helps"]);
    }

    #[test]
    fn test_parse_advice_lines_keeps_decimal_numbers() {
        let lines = parse_advice_lines("3.5 liters of water a day keeps you hydrated\n1. Walk daily\n2)Stretch");
        assert_eq!(
            lines,
            vec!["3.5 liters of water a day keeps you hydrated", "Walk daily", "2)Stretch"]
        );
    }

    #[tokio::test]
    async fn test_advise_calls_chat_completions() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(headers["authorization"], "Bearer test-key");
                assert_eq!(body["model"], "test-model");
                Json(json!({
                    "choices": [{"message": {"role": "assistant", "content": "- Walk 30 minutes\n- Cut back on salt"}}]
                }))
            }),
        );
        let advisor = LlmAdvisor::new(config(serve(router).await)).unwrap();

        let advice = advisor.advise(&analysis()).await.unwrap();
        assert_eq!(advice, vec!["Walk 30 minutes", "Cut back on salt"]);
        assert_eq!(advisor.source(), AdviceSource::Llm);
    }

    #[tokio::test]
    async fn test_upstream_error_status() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let advisor = LlmAdvisor::new(config(serve(router).await)).unwrap();

        match advisor.advise(&analysis()).await {
            Err(AdviceError::Status { status, body }) => {
                assert_eq!(status, 429);
                assert_eq!(body, "slow down");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_choices() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({"choices": []})) }),
        );
        let advisor = LlmAdvisor::new(config(serve(router).await)).unwrap();
        assert!(matches!(advisor.advise(&analysis()).await, Err(AdviceError::EmptyResponse)));
    }
}
