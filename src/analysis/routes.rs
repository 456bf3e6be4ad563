//! HTTP route handlers for the analysis API.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};

use crate::error::AnalysisError;
use crate::AppState;

use super::models::{AnalysisOutcome, DefaultMetals, FieldErrors, SampleData};
use super::pipeline;

/// Create the analysis router with all endpoints.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/defaults", get(defaults))
        .route("/analyze", post(analyze))
}

/// Health check for the analysis engine.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "hmpi-analysis",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Metal rows the input form starts with.
async fn defaults() -> Json<DefaultMetals> {
    Json(DefaultMetals::default())
}

/// Analyze a submitted sample.
///
/// The body is always an `AnalysisOutcome`; the status reflects how far it got.
async fn analyze(
    State(state): State<AppState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> (StatusCode, Json<AnalysisOutcome>) {
    let outcome = match body {
        Ok(Json(raw)) => pipeline::analyze(raw, state.summarizer.as_ref()).await,
        Err(rejection) => {
            let message = rejection.body_text();
            tracing::warn!(status = %rejection.status(), reason = %message, "Unreadable submission");
            let errors = FieldErrors::from([("sample".to_string(), vec![message])]);
            AnalysisOutcome::rejected(
                SampleData::Submitted(serde_json::Value::Null),
                AnalysisError::InvalidInput(errors),
            )
        }
    };

    let status = if outcome.is_success() {
        StatusCode::OK
    } else if outcome.field_errors.is_some() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(outcome))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::analysis::Summarizer;
    use crate::error::SummaryError;
    use crate::{build_router, AppState};

    struct Fixed;

    #[async_trait]
    impl Summarizer for Fixed {
        async fn summarize(&self, _json_data: &str) -> Result<String, SummaryError> {
            Ok("Pollution is low.".to_string())
        }
    }

    struct Down;

    #[async_trait]
    impl Summarizer for Down {
        async fn summarize(&self, _json_data: &str) -> Result<String, SummaryError> {
            Err(SummaryError::Network("connection refused".to_string()))
        }
    }

    fn app(summarizer: Arc<dyn Summarizer>) -> axum::Router {
        build_router(AppState::with_summarizer(summarizer))
    }

    fn well_a() -> Value {
        json!({
            "locationName": "Well A",
            "latitude": 40,
            "longitude": -73,
            "collectionDate": "2024-01-01",
            "metals": [
                { "id": "As", "name": "Arsenic", "value": 2 },
                { "id": "Pb", "name": "Lead", "value": 3 }
            ]
        })
    }

    async fn post_analyze(app: axum::Router, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/analysis/analyze")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_analyze_success() {
        let (status, body) = post_analyze(app(Arc::new(Fixed)), well_a()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"], Value::Null);
        assert_eq!(body["report"]["summary"], "Pollution is low.");
        assert_eq!(body["report"]["hpi"], 52.5);
        assert_eq!(body["report"]["mi"], 2.5);
        assert_eq!(body["report"]["pli"], 2.45);
        assert_eq!(body["sampleData"]["locationName"], "Well A");
        assert_eq!(body["sampleData"]["collectionDate"], "2024-01-01");
        assert!(body.get("fieldErrors").is_none());
    }

    #[tokio::test]
    async fn test_analyze_invalid() {
        let mut raw = well_a();
        raw["metals"] = json!([]);

        let (status, body) = post_analyze(app(Arc::new(Fixed)), raw.clone()).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["report"], Value::Null);
        assert_eq!(body["error"], "Invalid input data. Please check your entries.");
        assert_eq!(
            body["fieldErrors"]["metals"][0],
            "At least one metal concentration is required."
        );
        assert_eq!(body["sampleData"], raw);
    }

    async fn post_raw(content_type: Option<&str>, body: &'static str) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method("POST")
            .uri("/api/analysis/analyze");
        if let Some(content_type) = content_type {
            request = request.header(header::CONTENT_TYPE, content_type);
        }

        let response = app(Arc::new(Fixed))
            .oneshot(request.body(Body::from(body)).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_analyze_unparseable_body() {
        let (status, body) = post_raw(Some("application/json"), "{not json").await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["report"], Value::Null);
        assert_eq!(body["sampleData"], Value::Null);
        assert_eq!(body["error"], "Invalid input data. Please check your entries.");
        assert_eq!(body["fieldErrors"]["sample"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_analyze_missing_content_type() {
        let (status, body) = post_raw(None, r#"{"locationName": "Well A"}"#).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "Invalid input data. Please check your entries.");
        assert!(body["fieldErrors"]["sample"][0]
            .as_str()
            .unwrap()
            .contains("Content-Type"));
    }

    #[tokio::test]
    async fn test_analyze_summary_unavailable() {
        let (status, body) = post_analyze(app(Arc::new(Down)), well_a()).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["report"], Value::Null);
        assert_eq!(
            body["error"],
            "Failed to generate AI analysis. The service may be unavailable."
        );
    }

    #[tokio::test]
    async fn test_defaults() {
        let response = app(Arc::new(Fixed))
            .oneshot(
                Request::builder()
                    .uri("/api/analysis/defaults")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        let ids: Vec<&str> = body["metals"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["As", "Pb", "Cd", "Cr"]);
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(Arc::new(Fixed))
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
