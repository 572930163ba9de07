//! Optional natural-language synopsis of a session report
//!
//! Summarization is best-effort: every failure path collapses to `None` so the
//! master bundle is always built with at least the plain report.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable holding the Gemini API key
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const GEMINI_MODEL: &str = "gemini-2.5-flash";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_SUMMARY_WORDS: usize = 50;

/// Produces a short synopsis of a report, or nothing
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, report: &str) -> Option<String>;
}

/// Summarizer that never produces a synopsis
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSummarizer;

#[async_trait]
impl Summarizer for NoSummarizer {
    async fn summarize(&self, _report: &str) -> Option<String> {
        None
    }
}

#[derive(Debug, Error)]
enum SummaryError {
    #[error("GEMINI_API_KEY not set")]
    MissingCredential,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("empty response")]
    Empty,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Summarizer backed by the Gemini `generateContent` endpoint
#[derive(Debug, Clone)]
pub struct GeminiSummarizer {
    api_key: Option<String>,
    client: reqwest::Client,
}

impl GeminiSummarizer {
    pub fn new(api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            client,
        }
    }

    /// Read the credential from the environment
    pub fn from_env() -> Self {
        Self::new(std::env::var(GEMINI_API_KEY_ENV).ok())
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn request(&self, report: &str) -> Result<String, SummaryError> {
        let api_key = self.api_key.as_deref().ok_or(SummaryError::MissingCredential)?;
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(build_prompt(report)),
                }],
            }],
        };

        let response: GenerateResponse = self
            .client
            .post(format!("{GEMINI_ENDPOINT}/{GEMINI_MODEL}:generateContent"))
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        extract_text(response).ok_or(SummaryError::Empty)
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn summarize(&self, report: &str) -> Option<String> {
        match self.request(report).await {
            Ok(text) => Some(text),
            Err(SummaryError::MissingCredential) => {
                tracing::info!("Summary skipped: {GEMINI_API_KEY_ENV} not found");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Summary request failed");
                None
            }
        }
    }
}

fn build_prompt(report: &str) -> String {
    format!(
        "You write short client-facing work reports for a support engineer. \
The client's name does not appear in the log; describe only the engineer and the work done. \
Read the session log below and summarize it in professional English in at most {MAX_SUMMARY_WORDS} words. \
State how much time was actively spent capturing, what the work was about, and any challenges noted.\n\n\
--- SESSION LOG ---\n{report}"
    )
}

fn extract_text(response: GenerateResponse) -> Option<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
