//! Error types shared across the service.

use std::time::Duration;

use thiserror::Error;

use crate::analysis::FieldErrors;

/// Failure of the external text-generation call.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("summary service is not configured (GEMINI_API_KEY unset)")]
    NotConfigured,

    #[error("network error: {0}")]
    Network(String),

    #[error("summary service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed summary response: {0}")]
    Malformed(String),

    #[error("summary service returned an empty summary")]
    EmptySummary,

    #[error("summary request timed out after {0:?}")]
    Timeout(Duration),
}

/// Terminal failures of the analysis pipeline.
///
/// The `Display` text is the message shown to the submitter.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid input data. Please check your entries.")]
    InvalidInput(FieldErrors),

    #[error("Failed to generate AI analysis. The service may be unavailable.")]
    SummaryUnavailable(#[source] SummaryError),
}

/// Bad environment configuration at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}
