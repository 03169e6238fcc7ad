//! Abstractive summaries via the Gemini `generateContent` API.
//!
//! The client issues one POST per input text and never retries. Every failure is returned as a
//! [`SummarizationClientError`], which carries both a structured [`SummaryErrorKind`] and the
//! fixed user-facing message the orchestrator places in the response.

mod prompt;

pub use prompt::{SummaryType, build_prompt};

use crate::config::Config;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

/// Message returned when the provider reports quota exhaustion.
pub const RATE_LIMIT_MESSAGE: &str = "⚠️ API quota exceeded — please retry after some time.";
/// Message returned when the provider answers with an error or the key is missing.
pub const GENERATION_FAILED_MESSAGE: &str =
    "Error generating summary. Please check your API key or model.";
/// Message returned for transport failures, timeouts, and undecodable responses.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred during summarization.";

/// Errors surfaced while requesting a summary.
#[derive(Debug, Error)]
pub enum SummarizationClientError {
    /// No API key was configured, so no request was attempted.
    #[error("Gemini API key is not configured")]
    MissingApiKey,
    /// Provider reported error code 429.
    #[error("Gemini API quota exceeded")]
    RateLimited,
    /// Provider answered without candidates.
    #[error("Failed to generate summary: {0}")]
    GenerationFailed(String),
    /// The request could not be delivered or the response body could not be read.
    #[error("Failed to reach Gemini: {0}")]
    Transport(String),
    /// The request exceeded the configured timeout.
    #[error("Gemini request timed out")]
    Timeout,
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Structured classification of a failed summary, exposed to API consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryErrorKind {
    /// Provider quota exhausted.
    RateLimited,
    /// Provider rejected the request, or no key was configured.
    GenerationFailed,
    /// Transport failure, timeout, or malformed response.
    UnexpectedError,
}

impl SummarizationClientError {
    /// Structured kind of this failure.
    pub fn kind(&self) -> SummaryErrorKind {
        match self {
            Self::RateLimited => SummaryErrorKind::RateLimited,
            Self::MissingApiKey | Self::GenerationFailed(_) => SummaryErrorKind::GenerationFailed,
            Self::Transport(_) | Self::Timeout | Self::InvalidResponse(_) => {
                SummaryErrorKind::UnexpectedError
            }
        }
    }

    /// Fixed human-readable message shown in place of a summary.
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            SummaryErrorKind::RateLimited => RATE_LIMIT_MESSAGE,
            SummaryErrorKind::GenerationFailed => GENERATION_FAILED_MESSAGE,
            SummaryErrorKind::UnexpectedError => UNEXPECTED_ERROR_MESSAGE,
        }
    }
}

/// Interface implemented by summarization providers.
#[async_trait]
pub trait SummarizationClient: Send + Sync {
    /// Summarize `text` at the requested granularity.
    async fn summarize(
        &self,
        text: &str,
        summary_type: SummaryType,
    ) -> Result<String, SummarizationClientError>;
}

/// Build the summarization client for the given configuration.
pub fn get_summarization_client(
    config: &Config,
) -> Result<Box<dyn SummarizationClient>, SummarizationClientError> {
    Ok(Box::new(GeminiSummarizationClient::new(config)?))
}

/// Gemini-backed summarization client.
pub struct GeminiSummarizationClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiSummarizationClient {
    /// Construct a client whose requests are bounded by the configured timeout.
    pub fn new(config: &Config) -> Result<Self, SummarizationClientError> {
        let http = Client::builder()
            .user_agent(concat!("synopsis/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()
            .map_err(|error| SummarizationClientError::Transport(error.to_string()))?;
        Ok(Self {
            http,
            base_url: config.gemini_base_url.clone(),
            model: config.gemini_model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl SummarizationClient for GeminiSummarizationClient {
    async fn summarize(
        &self,
        text: &str,
        summary_type: SummaryType,
    ) -> Result<String, SummarizationClientError> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!("Summarization requested without a configured API key");
            return Err(SummarizationClientError::MissingApiKey);
        };

        let payload = json!({
            "contents": [{
                "parts": [{ "text": build_prompt(text, summary_type) }]
            }]
        });

        tracing::debug!(
            model = %self.model,
            summary_type = summary_type.as_str(),
            chars = text.chars().count(),
            "Requesting summary"
        );

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&payload)
            .send()
            .await
            .map_err(|error| transport_error(&error))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| transport_error(&error))?;

        let value: Value = serde_json::from_str(&body).map_err(|error| {
            tracing::warn!(%status, %error, "Gemini returned a non-JSON body");
            SummarizationClientError::InvalidResponse(format!(
                "failed to decode Gemini response ({status}): {error}"
            ))
        })?;

        interpret_response(&value)
    }
}

fn transport_error(error: &reqwest::Error) -> SummarizationClientError {
    if error.is_timeout() {
        tracing::warn!(%error, "Gemini request timed out");
        SummarizationClientError::Timeout
    } else {
        tracing::warn!(%error, "Gemini request failed");
        SummarizationClientError::Transport(error.to_string())
    }
}

/// Turn a decoded `generateContent` body into a summary or a classified error.
///
/// `candidates` wins over `error`; an `error.code` of 429 is a rate limit and anything else
/// is a generation failure.
pub fn interpret_response(body: &Value) -> Result<String, SummarizationClientError> {
    if let Some(candidates) = body.get("candidates") {
        return candidates
            .pointer("/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(|text| text.trim().to_string())
            .ok_or_else(|| {
                tracing::warn!(body = %body, "Gemini candidate carried no text");
                SummarizationClientError::InvalidResponse(
                    "first candidate has no text part".into(),
                )
            });
    }

    if body.pointer("/error/code").and_then(Value::as_i64) == Some(429) {
        tracing::warn!("Gemini quota exceeded");
        return Err(SummarizationClientError::RateLimited);
    }

    tracing::warn!(body = %body, "Error generating summary");
    Err(SummarizationClientError::GenerationFailed(body.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};
    use std::time::Duration;

    const ENDPOINT: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

    fn client_for(server: &MockServer, api_key: Option<&str>) -> GeminiSummarizationClient {
        let config = Config {
            api_key: api_key.map(str::to_string),
            gemini_base_url: server.base_url(),
            request_timeout: Duration::from_secs(5),
            ..Config::default()
        };
        GeminiSummarizationClient::new(&config).expect("client")
    }

    #[test]
    fn candidate_text_is_trimmed() {
        let body = json!({"candidates":[{"content":{"parts":[{"text":"  Summary.  "}]}}]});
        assert_eq!(interpret_response(&body).expect("summary"), "Summary.");
    }

    #[test]
    fn quota_errors_map_to_rate_limit_message() {
        let error = interpret_response(&json!({"error":{"code":429}})).expect_err("rate limit");
        assert_eq!(error.kind(), SummaryErrorKind::RateLimited);
        assert_eq!(
            error.user_message(),
            "⚠️ API quota exceeded — please retry after some time."
        );
    }

    #[test]
    fn other_errors_map_to_generation_failure() {
        let error = interpret_response(&json!({"error":{"code":400,"message":"API key not valid"}}))
            .expect_err("failure");
        assert_eq!(error.kind(), SummaryErrorKind::GenerationFailed);
        assert_eq!(error.user_message(), GENERATION_FAILED_MESSAGE);

        let error = interpret_response(&json!({})).expect_err("empty body");
        assert_eq!(error.user_message(), GENERATION_FAILED_MESSAGE);
    }

    #[test]
    fn candidates_without_text_are_invalid() {
        let error =
            interpret_response(&json!({"candidates": []})).expect_err("no candidate text");
        assert_eq!(error.kind(), SummaryErrorKind::UnexpectedError);
        assert_eq!(error.user_message(), UNEXPECTED_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn gemini_client_posts_prompt_with_key() {
        let server = MockServer::start_async().await;
        let client = client_for(&server, Some("test-key"));

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(ENDPOINT)
                    .query_param("key", "test-key")
                    .body_contains("in three concise lines")
                    .body_contains("Do NOT start with phrases like");
                then.status(200).json_body(json!({
                    "candidates": [{"content": {"parts": [{"text": "  Summary.  "}]}}]
                }));
            })
            .await;

        let summary = client
            .summarize("Long source text", SummaryType::ThreeLine)
            .await
            .expect("summary");

        mock.assert_async().await;
        assert_eq!(summary, "Summary.");
    }

    #[tokio::test]
    async fn gemini_client_reports_rate_limit_from_error_body() {
        let server = MockServer::start_async().await;
        let client = client_for(&server, Some("test-key"));

        server
            .mock_async(|when, then| {
                when.method(POST).path(ENDPOINT);
                then.status(429).json_body(json!({"error": {"code": 429}}));
            })
            .await;

        for summary_type in [SummaryType::OneLine, SummaryType::Paragraph] {
            let error = client
                .summarize("text", summary_type)
                .await
                .expect_err("rate limited");
            assert!(matches!(error, SummarizationClientError::RateLimited));
        }
    }

    #[tokio::test]
    async fn gemini_client_rejects_non_json_bodies() {
        let server = MockServer::start_async().await;
        let client = client_for(&server, Some("test-key"));

        server
            .mock_async(|when, then| {
                when.method(POST).path(ENDPOINT);
                then.status(502).body("bad gateway");
            })
            .await;

        let error = client
            .summarize("text", SummaryType::Paragraph)
            .await
            .expect_err("invalid body");
        assert!(matches!(error, SummarizationClientError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn missing_key_skips_the_request() {
        let server = MockServer::start_async().await;
        let client = client_for(&server, None);

        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path(ENDPOINT);
                then.status(200).json_body(json!({}));
            })
            .await;

        let error = client
            .summarize("Hello world", SummaryType::Paragraph)
            .await
            .expect_err("missing key");

        assert!(matches!(error, SummarizationClientError::MissingApiKey));
        assert_eq!(error.user_message(), GENERATION_FAILED_MESSAGE);
        mock.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn slow_responses_time_out() {
        let server = MockServer::start_async().await;
        let config = Config {
            api_key: Some("test-key".into()),
            gemini_base_url: server.base_url(),
            request_timeout: Duration::from_millis(100),
            ..Config::default()
        };
        let client = GeminiSummarizationClient::new(&config).expect("client");

        server
            .mock_async(|when, then| {
                when.method(POST).path(ENDPOINT);
                then.status(200)
                    .delay(Duration::from_secs(2))
                    .json_body(json!({"candidates": []}));
            })
            .await;

        let error = client
            .summarize("text", SummaryType::Paragraph)
            .await
            .expect_err("timeout");
        assert!(matches!(error, SummarizationClientError::Timeout));
        assert_eq!(error.user_message(), UNEXPECTED_ERROR_MESSAGE);
    }
}
