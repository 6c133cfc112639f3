//! Tests for REST API endpoints

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use financial_web_analyst::{
    agent::AgentRunner,
    analyst::FinancialAnalyst,
    api::{create_router, ApiState},
    error::AnalystError,
    models::{AgentInput, AgentRawOutput},
    Result,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Runner that records its inputs and replies with canned text
struct RecordingRunner {
    reply: std::result::Result<String, String>,
    calls: Mutex<Vec<AgentInput>>,
}

impl RecordingRunner {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<AgentInput> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AgentRunner for RecordingRunner {
    async fn invoke(&self, input: &AgentInput) -> Result<AgentRawOutput> {
        self.calls.lock().unwrap().push(input.clone());
        match &self.reply {
            Ok(text) => Ok(AgentRawOutput::new(text.clone())),
            Err(message) => Err(AnalystError::LlmError(message.clone())),
        }
    }
}

/// Runner that panics mid-analysis
struct PanickingRunner;

#[async_trait]
impl AgentRunner for PanickingRunner {
    async fn invoke(&self, _input: &AgentInput) -> Result<AgentRawOutput> {
        panic!("agent blew up");
    }
}

fn router_with(runner: Arc<dyn AgentRunner>) -> Router {
    let analyst = FinancialAnalyst::new(runner);
    create_router(ApiState::new(Some(Arc::new(analyst))))
}

fn analyze_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_analyze_success() {
    let runner = RecordingRunner::replying(
        "Apple reported record services revenue.\n\nSources:\nhttps://www.apple.com/newsroom\nhttps://www.reuters.com/aapl",
    );
    let app = router_with(runner.clone());

    let (status, body) = send(
        app,
        analyze_request(&json!({ "query": "Apple Q2 2024 earnings", "profile": "a long-term investor" }).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "Apple reported record services revenue.");
    assert_eq!(
        body["sources"],
        json!(["https://www.apple.com/newsroom", "https://www.reuters.com/aapl"])
    );

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].query, "Apple Q2 2024 earnings");
    assert_eq!(calls[0].profile, "a long-term investor");
}

#[tokio::test]
async fn test_missing_query_returns_400_without_invoking() {
    let bodies = [
        r#"{}"#,
        r#"{"profile":"a retail investor"}"#,
        r#"{"query":""}"#,
        r#"{"query":null}"#,
        r#"{"query":42}"#,
        r#"not json"#,
        "",
    ];

    for raw in bodies {
        let runner = RecordingRunner::replying("unused");
        let (status, body) = send(router_with(runner.clone()), analyze_request(raw)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {:?}", raw);
        assert_eq!(body["error"], "Invalid request: 'query' field is required.");
        assert!(runner.calls().is_empty());
    }
}

#[tokio::test]
async fn test_missing_content_type_returns_400() {
    let runner = RecordingRunner::replying("unused");
    let request = Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .body(Body::from(r#"{"query":"MSFT"}"#))
        .unwrap();

    let (status, _) = send(router_with(runner.clone()), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_default_profile() {
    let runner = RecordingRunner::replying("Fine.");
    let (status, _) = send(
        router_with(runner.clone()),
        analyze_request(r#"{"query":"Is NVDA overvalued?"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let explicit = RecordingRunner::replying("Fine.");
    send(
        router_with(explicit.clone()),
        analyze_request(r#"{"query":"Is NVDA overvalued?","profile":"a retail investor"}"#),
    )
    .await;

    assert_eq!(runner.calls(), explicit.calls());
    assert_eq!(runner.calls()[0].profile, "a retail investor");
}

#[tokio::test]
async fn test_agent_unavailable_returns_500() {
    let app = create_router(ApiState::unavailable());

    let (status, body) = send(app, analyze_request(r#"{"query":"GOOG outlook"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "Financial agent is not available. Check server logs."
    );
}

#[tokio::test]
async fn test_agent_failure_degrades_to_200() {
    let runner = RecordingRunner::failing("Gemini API error (503)");
    let (status, body) = send(
        router_with(runner),
        analyze_request(r#"{"query":"AMZN margins"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sources"], json!([]));
    let answer = body["answer"].as_str().unwrap();
    assert!(answer.starts_with("An error occurred during analysis:"));
    assert!(answer.contains("Gemini API error (503)"));
}

#[tokio::test]
async fn test_panic_during_analysis_returns_500() {
    let (status, body) = send(
        router_with(Arc::new(PanickingRunner)),
        analyze_request(r#"{"query":"META capex"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("An unexpected error occurred:"));
}

#[tokio::test]
async fn test_health_reports_agent_state() {
    let (status, body) = send(
        create_router(ApiState::unavailable()),
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["agent_ready"], false);

    let (_, body) = send(
        router_with(RecordingRunner::replying("ok")),
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(body["agent_ready"], true);
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/analyze")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();

    let response = router_with(RecordingRunner::replying("ok"))
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .map(|v| v.to_str().unwrap()),
        Some("*")
    );
}
