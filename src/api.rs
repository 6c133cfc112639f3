//! REST API server for the financial web analyst
//!
//! Exposes the analyst via HTTP endpoints for the web frontend.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::analyst::FinancialAnalyst;
use crate::error::AnalystError;
use crate::models::{AnalysisRequest, AnalyzeBody, QUERY_REQUIRED_MESSAGE};

pub const AGENT_UNAVAILABLE_MESSAGE: &str = "Financial agent is not available. Check server logs.";

/// =============================
/// API State
/// =============================

/// `analyst` is `None` when the agent failed to initialize at startup
#[derive(Clone)]
pub struct ApiState {
    pub analyst: Option<Arc<FinancialAnalyst>>,
}

impl ApiState {
    pub fn new(analyst: Option<Arc<FinancialAnalyst>>) -> Self {
        Self { analyst }
    }

    pub fn unavailable() -> Self {
        Self { analyst: None }
    }
}

type ApiResponse = (StatusCode, Json<Value>);

fn error_response(status: StatusCode, message: impl Into<String>) -> ApiResponse {
    (status, Json(json!({ "error": message.into() })))
}

/// =============================
/// Health Endpoint
/// =============================

async fn health(State(state): State<ApiState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "agent_ready": state.analyst.is_some(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Analyze Endpoint
/// =============================

fn validate(body: Result<Json<AnalyzeBody>, JsonRejection>) -> Result<AnalysisRequest, AnalystError> {
    let Json(body) = body.map_err(|rejection| {
        warn!("Rejected analyze body: {}", rejection.body_text());
        AnalystError::ValidationError(rejection.body_text())
    })?;
    AnalysisRequest::try_from(body)
}

async fn analyze(
    State(state): State<ApiState>,
    body: Result<Json<AnalyzeBody>, JsonRejection>,
) -> ApiResponse {
    let request = match validate(body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Invalid analyze request: {}", e);
            return error_response(StatusCode::BAD_REQUEST, QUERY_REQUIRED_MESSAGE);
        }
    };

    let Some(analyst) = state.analyst.clone() else {
        error!("Analyze request received but the financial agent is unavailable");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, AGENT_UNAVAILABLE_MESSAGE);
    };

    info!(
        request_id = %uuid::Uuid::new_v4(),
        "Received query: '{}' with profile: '{}'",
        request.query,
        request.profile
    );

    // A panic inside the analysis surfaces as a JoinError instead of
    // tearing down the connection.
    let task = tokio::spawn(async move {
        analyst
            .run_analysis(&request.query, &request.profile)
            .await
    });

    match task.await {
        Ok(result) => match serde_json::to_value(&result) {
            Ok(body) => (StatusCode::OK, Json(body)),
            Err(e) => {
                error!("Failed to serialize analysis result: {}", e);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("An unexpected error occurred: {}", e),
                )
            }
        },
        Err(e) => {
            error!("Error during analysis: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("An unexpected error occurred: {}", e),
            )
        }
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/analyze", post(analyze))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    state: ApiState,
    bind_address: &str,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(bind_address).await?;

    info!("API Server listening on http://{}", bind_address);

    axum::serve(listener, router).await?;

    Ok(())
}
