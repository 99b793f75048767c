//! REST API handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use nodes::{CancellationSignal, RunOutcome};
use pipeline::{AnalysisReport, AnalysisRequest, PipelineContext, SkillMasterError, SkillName};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Service name reported by the health endpoint.
pub const SERVICE_NAME: &str = "SkillMaster API";

/// A reference shown alongside an analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Display name of the reference.
    pub title: String,
    /// Link to the reference; `#` when none is published.
    pub url: String,
}

/// Body of a successful `POST /api/analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub report: AnalysisReport,
    pub sources: Vec<Source>,
    pub related_questions: Vec<String>,
}

/// `GET /`: liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "online",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `POST /api/analyze`: runs the full pipeline for one skill.
///
/// The run is spawned onto its own task. If the client disconnects, this
/// handler's future is dropped, which raises the run's cancellation signal;
/// the spawned run then stops at its next node boundary.
pub async fn analyze(
    State(state): State<AppState>,
    body: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::InvalidInput(e.body_text()))?;
    let (skill_name, level) = request.validate().map_err(|e| match e {
        SkillMasterError::InvalidInput { .. } => ApiError::InvalidInput(e.to_string()),
        other => ApiError::Internal(other.to_string()),
    })?;

    info!(skill = %skill_name, level = %level, "analysis requested");

    let context = PipelineContext::new(skill_name.clone(), level);
    let signal = CancellationSignal::new();
    let guard = signal.drop_guard();
    let executor = state.executor.clone();
    let handle =
        tokio::spawn(async move { executor.run_with_cancellation(context, &signal).await });

    let joined = handle.await;
    guard.disarm();

    let run = joined
        .map_err(|e| ApiError::Internal(format!("analysis task failed: {e}")))?
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    match run.outcome {
        RunOutcome::AllCompleted => Ok(Json(AnalyzeResponse {
            report: run.context.to_report(),
            sources: sources(),
            related_questions: related_questions(&skill_name),
        })),
        RunOutcome::Halted(failure) => {
            warn!(
                node = %failure.failed_node,
                error_kind = %failure.error_kind,
                "analysis halted"
            );
            Err(ApiError::Halted(failure))
        }
    }
}

/// Follow-up questions offered with every analysis.
pub fn related_questions(skill: &SkillName) -> Vec<String> {
    vec![
        format!("How long does it typically take to master {skill}?"),
        format!("What are common mistakes beginners make in {skill}?"),
        format!("How can I practice {skill} effectively?"),
        format!("What resources are best for learning {skill}?"),
    ]
}

/// Methodology references attached to every analysis.
pub fn sources() -> Vec<Source> {
    [
        "Skilled Success Methodology",
        "Deliberate Practice Research",
        "Cognitive Load Theory",
    ]
    .into_iter()
    .map(|title| Source {
        title: title.to_owned(),
        url: "#".to_owned(),
    })
    .collect()
}
