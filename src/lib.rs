//! Groundwater HMPI - Rust/Axum service
//!
//! Computes heavy-metal pollution indices for a groundwater sample and
//! attaches a plain-language summary from a text-generation service.

use std::sync::Arc;

use axum::{response::Json, routing::get, Router};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

pub mod analysis;
pub mod config;
pub mod error;

use analysis::{GeminiSummarizer, Summarizer, WithTimeout};
use config::SummaryConfig;
use error::SummaryError;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub summarizer: Arc<dyn Summarizer>,
}

impl AppState {
    /// State backed by the Gemini client, bounded by the configured deadline.
    pub fn new(config: &SummaryConfig) -> Result<Self, SummaryError> {
        let gemini = GeminiSummarizer::new(config)?;
        Ok(Self::with_summarizer(Arc::new(WithTimeout::new(
            gemini,
            config.timeout,
        ))))
    }

    pub fn with_summarizer(summarizer: Arc<dyn Summarizer>) -> Self {
        Self { summarizer }
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/analysis", analysis::router())
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "groundwater-hmpi"
    }))
}
