//! Scoring Client — the single point of entry for calls to the external AI
//! scoring service.
//!
//! ARCHITECTURAL RULE: exactly one outbound POST per `submit`. No retries here;
//! a failed attempt surfaces to the session, which decides what happens next.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::screening::error::ScreeningError;
use crate::screening::models::{validate_request, Job, ResumeInput};
use crate::screening::weights::ScoringWeights;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDescription {
    pub role: String,
    pub summary: String,
    pub requirements: Vec<String>,
}

/// Wire payload sent to the scoring service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningRequest {
    pub job_description: JobDescription,
    pub resumes: Vec<String>,
    pub weights: BTreeMap<String, i64>,
}

impl ScreeningRequest {
    /// Builds the payload, rejecting input that must never reach the network.
    pub fn compose(
        job: &Job,
        resumes: &[ResumeInput],
        weights: &ScoringWeights,
    ) -> Result<Self, ScreeningError> {
        validate_request(job, resumes)?;
        Ok(Self {
            job_description: JobDescription {
                role: job.title.trim().to_string(),
                summary: job.summary.clone(),
                requirements: job.requirements.clone(),
            },
            resumes: resumes.iter().map(|r| r.as_payload().to_string()).collect(),
            weights: weights.as_map().clone(),
        })
    }
}

/// Anything that can score a screening request. Swapped for mocks in tests.
#[async_trait]
pub trait ScoringBackend: Send + Sync {
    /// Performs one scoring call and returns the decoded body untouched.
    async fn submit(&self, request: &ScreeningRequest) -> Result<Value, ScreeningError>;
}

/// HTTP implementation of `ScoringBackend`.
#[derive(Clone)]
pub struct ScoringClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl ScoringClient {
    /// `timeout` is the caller-supplied deadline for each scoring call.
    pub fn new(endpoint: String, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ScoringBackend for ScoringClient {
    async fn submit(&self, request: &ScreeningRequest) -> Result<Value, ScreeningError> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        debug!(
            "Submitting {} resume(s) for '{}' to {}",
            request.resumes.len(),
            request.job_description.role,
            self.endpoint
        );

        let response = builder.send().await.map_err(|e| {
            warn!("Scoring service request failed: {e}");
            ScreeningError::Transport {
                status: e.status().map(|s| s.as_u16()),
                cause: e.to_string(),
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ScreeningError::Transport {
            status: Some(status.as_u16()),
            cause: format!("failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            warn!("Scoring service returned {}: {}", status, body);
            return Err(ScreeningError::Transport {
                status: Some(status.as_u16()),
                cause: if body.trim().is_empty() {
                    status.to_string()
                } else {
                    body
                },
            });
        }

        decode_body(&body)
    }
}

/// Decodes a 2xx body as JSON, tolerating markdown code fences around it.
fn decode_body(body: &str) -> Result<Value, ScreeningError> {
    serde_json::from_str::<Value>(body)
        .or_else(|_| serde_json::from_str(strip_json_fences(body)))
        .map_err(|e| ScreeningError::schema(format!("response body is not valid JSON: {e}")))
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(stripped) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    else {
        return text;
    };
    let stripped = stripped.trim_start();
    stripped
        .strip_suffix("```")
        .map(|s| s.trim())
        .unwrap_or(stripped)
}
