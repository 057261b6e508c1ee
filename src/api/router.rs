//! Tender evaluation API router.
//!
//! Returns a composable `Router` mounted under `/api/`. No auth layer:
//! the service is meant to sit behind the marketplace backend.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::types::AppState;
use crate::pipeline::orchestrator::TenderEvaluator;

/// Terms plus proposals in a single request, with multipart overhead.
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

pub fn api_router(evaluator: Arc<TenderEvaluator>) -> Router {
    build_router(AppState::new(evaluator))
}

fn build_router(state: AppState) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let api = Router::new()
        .route("/evaluate", post(endpoints::evaluate::evaluate))
        .route("/workflows", get(endpoints::workflows::list))
        .route("/workflows/:id", get(endpoints::workflows::detail))
        .route("/metrics", get(endpoints::metrics::snapshot))
        .route("/metrics/reset", post(endpoints::metrics::reset))
        .route("/health", get(endpoints::health::check))
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::pipeline::extraction::batch::tests::PlainTextExtractor;
    use crate::pipeline::llm::FailingLlmClient;
    use crate::pipeline_config::PipelineConfig;

    const BOUNDARY: &str = "tender-test-boundary";

    fn test_evaluator() -> Arc<TenderEvaluator> {
        Arc::new(TenderEvaluator::new(
            &PipelineConfig::default(),
            Arc::new(PlainTextExtractor),
            Arc::new(FailingLlmClient::new()),
        ))
    }

    enum Part<'a> {
        File(&'a str, &'a str, &'a str),
        Text(&'a str, &'a str),
    }

    fn multipart_body(parts: &[Part]) -> String {
        let mut body = String::new();
        for part in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match part {
                Part::File(field, filename, content) => {
                    body.push_str(&format!(
                        "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
                    ));
                    body.push_str("Content-Type: application/pdf\r\n\r\n");
                    body.push_str(content);
                }
                Part::Text(field, value) => {
                    body.push_str(&format!("Content-Disposition: form-data; name=\"{field}\"\r\n\r\n"));
                    body.push_str(value);
                }
            }
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body
    }

    fn evaluate_request(parts: &[Part]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/evaluate")
            .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(multipart_body(parts)))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn response_json(response: axum::http::Response<Body>) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    fn valid_parts() -> Vec<Part<'static>> {
        vec![
            Part::File("terms", "terms.pdf", "شروط عامة"),
            Part::File("proposals", "Alpha.pdf", "لدينا خبرة واسعة وفريق من مهندس وخبير مع خطة"),
            Part::File("proposals", "Beta.pdf", "عرض مختصر مع سعر تنافسي"),
            Part::Text("top_n", "1"),
        ]
    }

    #[tokio::test]
    async fn evaluate_returns_completed_workflow() {
        let app = api_router(test_evaluator());
        let response = app.oneshot(evaluate_request(&valid_parts())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["status"], "COMPLETED");
        assert_eq!(json["metadata"]["proposal_count"], 2);
        assert_eq!(json["final_result"]["chosen"].as_array().unwrap().len(), 1);
        assert_eq!(json["final_result"]["not_chosen"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn evaluate_without_terms_returns_400() {
        let app = api_router(test_evaluator());
        let parts = [Part::File("proposals", "Alpha.pdf", "عرض")];
        let response = app.oneshot(evaluate_request(&parts)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn evaluate_rejects_non_pdf_proposal() {
        let app = api_router(test_evaluator());
        let parts = [
            Part::File("terms", "terms.pdf", "شروط"),
            Part::File("proposals", "notes.docx", "عرض"),
        ];
        let response = app.oneshot(evaluate_request(&parts)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn evaluate_rejects_file_part_without_filename() {
        let app = api_router(test_evaluator());
        let parts = [
            Part::File("terms", "terms.pdf", "شروط"),
            Part::Text("proposals", "عرض بلا اسم ملف"),
        ];
        let response = app.oneshot(evaluate_request(&parts)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert!(json["error"]["message"].as_str().unwrap().contains("filename"));
    }

    #[tokio::test]
    async fn evaluate_rejects_non_numeric_top_n() {
        let app = api_router(test_evaluator());
        let parts = [
            Part::File("terms", "terms.pdf", "شروط"),
            Part::File("proposals", "Alpha.pdf", "عرض"),
            Part::Text("top_n", "three"),
        ];
        let response = app.oneshot(evaluate_request(&parts)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert!(json["error"]["message"].as_str().unwrap().contains("top_n"));
    }

    #[tokio::test]
    async fn evaluation_with_no_readable_proposal_returns_422() {
        let app = api_router(test_evaluator());
        let parts = [
            Part::File("terms", "terms.pdf", "شروط"),
            Part::File("proposals", "Alpha.pdf", "FAIL"),
        ];
        let response = app.oneshot(evaluate_request(&parts)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "EVALUATION_FAILED");
    }

    #[tokio::test]
    async fn finished_workflow_is_listed_and_retrievable() {
        let evaluator = test_evaluator();

        let response = api_router(Arc::clone(&evaluator))
            .oneshot(evaluate_request(&valid_parts()))
            .await
            .unwrap();
        let workflow_id = response_json(response).await["workflow_id"]
            .as_str()
            .unwrap()
            .to_string();

        let response = api_router(Arc::clone(&evaluator))
            .oneshot(get_request("/api/workflows?limit=5"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["count"], 1);
        assert_eq!(json["workflows"][0]["workflow_id"], workflow_id.as_str());
        assert!(json["workflows"][0].get("final_result").is_none());

        let response = api_router(Arc::clone(&evaluator))
            .oneshot(get_request(&format!("/api/workflows/{workflow_id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["status"], "COMPLETED");
        assert_eq!(json["agent_results"].as_object().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn unknown_workflow_returns_404() {
        let app = api_router(test_evaluator());
        let response = app.oneshot(get_request("/api/workflows/missing")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn metrics_count_runs_and_reset_clears_them() {
        let evaluator = test_evaluator();
        api_router(Arc::clone(&evaluator))
            .oneshot(evaluate_request(&valid_parts()))
            .await
            .unwrap();

        let response = api_router(Arc::clone(&evaluator))
            .oneshot(get_request("/api/metrics"))
            .await
            .unwrap();
        let json = response_json(response).await;
        assert_eq!(json["total_workflows"], 1);
        assert_eq!(json["successful_workflows"], 1);
        assert_eq!(json["stages"]["scoring"]["tasks_processed"], 1);

        let reset = Request::builder()
            .method("POST")
            .uri("/api/metrics/reset")
            .body(Body::empty())
            .unwrap();
        let response = api_router(Arc::clone(&evaluator)).oneshot(reset).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(evaluator.metrics().total_workflows, 0);
    }

    #[tokio::test]
    async fn health_reports_degraded_when_llm_is_down() {
        let app = api_router(test_evaluator());
        let response = app.oneshot(get_request("/api/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["status"], "degraded");
        assert_eq!(json["llm"]["available"], false);
        assert_eq!(json["service"], crate::config::APP_NAME);
        assert_eq!(json["stages"].as_object().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn not_found_for_unknown_route() {
        let app = api_router(test_evaluator());
        let response = app.oneshot(get_request("/api/nonexistent")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
