use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ActorRef, AssessmentId, AssessmentStatus, QuestionId};
use super::repository::{AssessmentRepository, AuditLogSink, QuestionnaireRepository};
use super::scoring::{BreakdownAxis, WeightMode};
use super::service::{
    AssessmentService, AssessmentServiceError, NewAssessment, ResponseInput,
};

/// Router builder exposing the assessment operation contract over HTTP.
pub fn assessment_router<Q, R, L>(service: Arc<AssessmentService<Q, R, L>>) -> Router
where
    Q: QuestionnaireRepository + 'static,
    R: AssessmentRepository + 'static,
    L: AuditLogSink + 'static,
{
    Router::new()
        .route("/api/v1/assessments", post(create_handler::<Q, R, L>))
        .route(
            "/api/v1/assessments/:assessment_id",
            get(status_handler::<Q, R, L>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/responses/:question_id",
            put(save_response_handler::<Q, R, L>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/progress",
            get(progress_handler::<Q, R, L>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/scores",
            get(scores_handler::<Q, R, L>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/submission-check",
            get(submission_check_handler::<Q, R, L>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/submit",
            post(submit_handler::<Q, R, L>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/transitions",
            post(transition_handler::<Q, R, L>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateAssessmentRequest {
    pub(crate) actor: ActorRef,
    #[serde(flatten)]
    pub(crate) assessment: NewAssessment,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SaveResponseRequest {
    pub(crate) actor: ActorRef,
    #[serde(flatten)]
    pub(crate) input: ResponseInput,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActorRequest {
    pub(crate) actor: ActorRef,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransitionRequest {
    pub(crate) actor: ActorRef,
    pub(crate) target: AssessmentStatus,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ScoreQuery {
    #[serde(default)]
    pub(crate) weighted: bool,
    #[serde(default)]
    pub(crate) axis: Option<BreakdownAxis>,
}

fn error_response(error: AssessmentServiceError) -> Response {
    let status = match &error {
        AssessmentServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        AssessmentServiceError::Forbidden | AssessmentServiceError::NotEditable { .. } => {
            StatusCode::FORBIDDEN
        }
        AssessmentServiceError::InvalidTransition { .. } | AssessmentServiceError::Conflict => {
            StatusCode::CONFLICT
        }
        AssessmentServiceError::PreconditionFailed { .. }
        | AssessmentServiceError::KindMismatch { .. }
        | AssessmentServiceError::InactiveQuestionnaire(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AssessmentServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let body = match &error {
        AssessmentServiceError::PreconditionFailed { missing } => json!({
            "error": error.to_string(),
            "missing": missing,
        }),
        AssessmentServiceError::InvalidTransition { from, to } => json!({
            "error": error.to_string(),
            "from": from.label(),
            "to": to.label(),
        }),
        _ => json!({ "error": error.to_string() }),
    };

    (status, axum::Json(body)).into_response()
}

pub(crate) async fn create_handler<Q, R, L>(
    State(service): State<Arc<AssessmentService<Q, R, L>>>,
    axum::Json(request): axum::Json<CreateAssessmentRequest>,
) -> Response
where
    Q: QuestionnaireRepository + 'static,
    R: AssessmentRepository + 'static,
    L: AuditLogSink + 'static,
{
    match service.create(&request.actor, request.assessment) {
        Ok(assessment) => {
            (StatusCode::CREATED, axum::Json(assessment.status_view())).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<Q, R, L>(
    State(service): State<Arc<AssessmentService<Q, R, L>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    Q: QuestionnaireRepository + 'static,
    R: AssessmentRepository + 'static,
    L: AuditLogSink + 'static,
{
    let id = AssessmentId(assessment_id);
    match service.status_view(&id) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn save_response_handler<Q, R, L>(
    State(service): State<Arc<AssessmentService<Q, R, L>>>,
    Path((assessment_id, question_id)): Path<(String, String)>,
    axum::Json(request): axum::Json<SaveResponseRequest>,
) -> Response
where
    Q: QuestionnaireRepository + 'static,
    R: AssessmentRepository + 'static,
    L: AuditLogSink + 'static,
{
    match service.save_response(
        &request.actor,
        &AssessmentId(assessment_id),
        &QuestionId(question_id),
        request.input,
    ) {
        Ok(saved) => (StatusCode::OK, axum::Json(saved)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn progress_handler<Q, R, L>(
    State(service): State<Arc<AssessmentService<Q, R, L>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    Q: QuestionnaireRepository + 'static,
    R: AssessmentRepository + 'static,
    L: AuditLogSink + 'static,
{
    match service.progress(&AssessmentId(assessment_id)) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn scores_handler<Q, R, L>(
    State(service): State<Arc<AssessmentService<Q, R, L>>>,
    Path(assessment_id): Path<String>,
    Query(query): Query<ScoreQuery>,
) -> Response
where
    Q: QuestionnaireRepository + 'static,
    R: AssessmentRepository + 'static,
    L: AuditLogSink + 'static,
{
    let mode = if query.weighted {
        WeightMode::PriorityWeighted
    } else {
        WeightMode::Unweighted
    };
    match service.scores(&AssessmentId(assessment_id), mode, query.axis) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submission_check_handler<Q, R, L>(
    State(service): State<Arc<AssessmentService<Q, R, L>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    Q: QuestionnaireRepository + 'static,
    R: AssessmentRepository + 'static,
    L: AuditLogSink + 'static,
{
    match service.validate_for_submission(&AssessmentId(assessment_id)) {
        Ok(check) => (StatusCode::OK, axum::Json(check)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<Q, R, L>(
    State(service): State<Arc<AssessmentService<Q, R, L>>>,
    Path(assessment_id): Path<String>,
    axum::Json(request): axum::Json<ActorRequest>,
) -> Response
where
    Q: QuestionnaireRepository + 'static,
    R: AssessmentRepository + 'static,
    L: AuditLogSink + 'static,
{
    match service.submit(&request.actor, &AssessmentId(assessment_id)) {
        Ok(assessment) => {
            (StatusCode::OK, axum::Json(assessment.status_view())).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn transition_handler<Q, R, L>(
    State(service): State<Arc<AssessmentService<Q, R, L>>>,
    Path(assessment_id): Path<String>,
    axum::Json(request): axum::Json<TransitionRequest>,
) -> Response
where
    Q: QuestionnaireRepository + 'static,
    R: AssessmentRepository + 'static,
    L: AuditLogSink + 'static,
{
    match service.transition(&request.actor, &AssessmentId(assessment_id), request.target) {
        Ok(assessment) => {
            (StatusCode::OK, axum::Json(assessment.status_view())).into_response()
        }
        Err(error) => error_response(error),
    }
}
