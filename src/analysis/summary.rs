//! Natural-language summaries from the Gemini text-generation API.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::SummaryConfig;
use crate::error::SummaryError;

use super::models::{Indices, Sample};

const USER_AGENT: &str = concat!("groundwater-hmpi/", env!("CARGO_PKG_VERSION"));

const SYSTEM_INSTRUCTION: &str = "You are an environmental science assistant.";

const PROMPT_TEMPLATE: &str = "Based on the following HMPI report data, provide a concise summary \
(max 150 words) for a non-technical stakeholder. Highlight the overall pollution level, identify \
the heavy metals of greatest concern, and state the public health implications. Data: {{jsonData}}";

/// Capability that turns a serialized report into a short synopsis.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, json_data: &str) -> Result<String, SummaryError>;
}

/// Report data handed to the summary service.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryPayload {
    pub location: String,
    /// ISO date, `YYYY-MM-DD`
    pub date: String,
    /// One `{name: value}` entry per metal, in submission order
    pub metal_concentrations: Vec<BTreeMap<String, f64>>,
    pub calculated_indices: CalculatedIndices,
}

#[derive(Debug, Serialize)]
pub struct CalculatedIndices {
    #[serde(rename = "HPI")]
    pub hpi: f64,
    #[serde(rename = "MI")]
    pub mi: f64,
    #[serde(rename = "PLI")]
    pub pli: f64,
}

impl SummaryPayload {
    pub fn new(sample: &Sample, indices: &Indices) -> Self {
        Self {
            location: sample.location_name.clone(),
            date: sample.collection_date.format("%Y-%m-%d").to_string(),
            metal_concentrations: sample
                .metals
                .iter()
                .map(|m| BTreeMap::from([(m.name.clone(), m.value)]))
                .collect(),
            calculated_indices: CalculatedIndices {
                hpi: indices.hpi,
                mi: indices.mi,
                pli: indices.pli,
            },
        }
    }

    /// Pretty-printed JSON sent as `jsonData`.
    pub fn to_json(&self) -> Result<String, SummaryError> {
        serde_json::to_string_pretty(self).map_err(|e| SummaryError::Malformed(e.to_string()))
    }
}

/// Expected structured output of the model.
#[derive(Debug, Deserialize)]
struct SummaryOutput {
    summary: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Gemini `generateContent` client.
pub struct GeminiSummarizer {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiSummarizer {
    pub fn new(config: &SummaryConfig) -> Result<Self, SummaryError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| SummaryError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

/// Request body for one summary.
fn request_body(json_data: &str) -> serde_json::Value {
    json!({
        "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
        "contents": [{
            "role": "user",
            "parts": [{ "text": PROMPT_TEMPLATE.replace("{{jsonData}}", json_data) }]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "summary": {
                        "type": "STRING",
                        "description": "A concise summary of the HMPI report."
                    }
                },
                "required": ["summary"]
            }
        }
    })
}

/// Pull the `summary` field out of a `generateContent` response body.
fn parse_summary(body: &str) -> Result<String, SummaryError> {
    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| SummaryError::Malformed(e.to_string()))?;

    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
        .ok_or_else(|| SummaryError::Malformed("no candidate text".to_string()))?;

    let output: SummaryOutput =
        serde_json::from_str(&text).map_err(|e| SummaryError::Malformed(e.to_string()))?;

    let summary = output.summary.trim();
    if summary.is_empty() {
        return Err(SummaryError::EmptySummary);
    }
    Ok(summary.to_string())
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn summarize(&self, json_data: &str) -> Result<String, SummaryError> {
        let api_key = self.api_key.as_deref().ok_or(SummaryError::NotConfigured)?;

        tracing::debug!(model = %self.model, "Requesting summary");

        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request_body(json_data))
            .send()
            .await
            .map_err(|e| SummaryError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SummaryError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(SummaryError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let summary = parse_summary(&body)?;
        tracing::info!(words = summary.split_whitespace().count(), "Summary received");
        Ok(summary)
    }
}

/// Imposes a deadline on another summarizer.
pub struct WithTimeout<S> {
    inner: S,
    timeout: Duration,
}

impl<S> WithTimeout<S> {
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl<S: Summarizer> Summarizer for WithTimeout<S> {
    async fn summarize(&self, json_data: &str) -> Result<String, SummaryError> {
        tokio::time::timeout(self.timeout, self.inner.summarize(json_data))
            .await
            .map_err(|_| SummaryError::Timeout(self.timeout))?
    }
}
