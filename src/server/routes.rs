//! API routes for ag-kaizen
//!
//! Both endpoints answer 200; an empty problem description is reported in
//! the body as `{"error": ...}` rather than through the status code.

use crate::output::AnalysisResponse;
use crate::server::AppState;
use crate::service::ServiceError;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

type AppStateArc = Arc<AppState>;

pub const STATUS_MESSAGE: &str = "Ag-Kaizen-LLM is running";

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub user_text: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatResponse {
    Diagnosis {
        reply: String,
        analysis: AnalysisResponse,
    },
    Error {
        error: String,
    },
}

// ============================================================================
// Status Routes
// ============================================================================

pub fn status_routes() -> Router<AppStateArc> {
    Router::new().route("/", get(status))
}

async fn status(State(state): State<AppStateArc>) -> Json<StatusResponse> {
    debug!(
        "Status check, up {}s, {} flows loaded",
        state.start_time.elapsed().as_secs(),
        state.taxonomy.flows().len()
    );
    Json(StatusResponse {
        message: STATUS_MESSAGE.to_string(),
    })
}

// ============================================================================
// Chat Routes
// ============================================================================

pub fn chat_routes() -> Router<AppStateArc> {
    Router::new().route("/chat", post(chat))
}

async fn chat(
    State(state): State<AppStateArc>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatResponse> {
    info!("Chat request ({} chars)", req.user_text.len());

    match state.service.diagnose(&req.user_text).await {
        Ok(diagnosis) => Json(ChatResponse::Diagnosis {
            reply: diagnosis.reply().to_string(),
            analysis: diagnosis.analysis,
        }),
        Err(e @ ServiceError::EmptyInput) => Json(ChatResponse::Error {
            error: e.to_string(),
        }),
    }
}
