//! Validation -> indices -> summary -> report.

use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::Instrument;
use uuid::Uuid;

use crate::error::{AnalysisError, SummaryError};

use super::indices;
use super::models::{AnalysisOutcome, Indices, Report, Sample, SampleData};
use super::summary::{Summarizer, SummaryPayload};
use super::validator;

/// Compute SHA256 fingerprint of a submission.
fn fingerprint(raw: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.to_string().as_bytes());
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

/// Run one analysis. Every failure is folded into the returned outcome.
pub async fn analyze(raw: Value, summarizer: &dyn Summarizer) -> AnalysisOutcome {
    let span = tracing::info_span!(
        "analysis",
        request_id = %Uuid::new_v4(),
        sample_hash = %fingerprint(&raw),
    );

    run(raw, summarizer).instrument(span).await
}

async fn run(raw: Value, summarizer: &dyn Summarizer) -> AnalysisOutcome {
    let sample = match validator::validate(&raw) {
        Ok(sample) => sample,
        Err(errors) => {
            tracing::warn!(?errors, "Validation errors");
            return AnalysisOutcome::rejected(
                SampleData::Submitted(raw),
                AnalysisError::InvalidInput(errors),
            );
        }
    };

    let indices = indices::calculate(&sample.concentrations());
    tracing::debug!(
        metals = sample.metals.len(),
        hpi = indices.hpi,
        mi = indices.mi,
        pli = indices.pli,
        "Indices calculated"
    );

    match request_summary(&sample, &indices, summarizer).await {
        Ok(summary) => {
            tracing::info!(location = %sample.location_name, "Analysis complete");
            let report = Report::new(summary, indices);
            AnalysisOutcome::done(sample, report)
        }
        Err(e) => {
            tracing::error!(error = %e, "Summary generation failed");
            AnalysisOutcome::rejected(
                SampleData::Validated(sample),
                AnalysisError::SummaryUnavailable(e),
            )
        }
    }
}

async fn request_summary(
    sample: &Sample,
    indices: &Indices,
    summarizer: &dyn Summarizer,
) -> Result<String, SummaryError> {
    let json_data = SummaryPayload::new(sample, indices).to_json()?;
    summarizer.summarize(&json_data).await
}
