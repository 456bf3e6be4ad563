//! Groundwater sample analysis module.
//!
//! Validates a submitted sample, computes heavy-metal pollution indices and
//! asks the text-generation service for a plain-language summary.

mod indices;
mod models;
mod pipeline;
mod routes;
mod summary;
mod validator;

pub use indices::calculate;
pub use models::{
    AnalysisOutcome, DefaultMetals, FieldErrors, Indices, Metal, Report, Sample, SampleData,
};
pub use pipeline::analyze;
pub use routes::router;
pub use summary::{GeminiSummarizer, Summarizer, SummaryPayload, WithTimeout};
pub use validator::validate;
