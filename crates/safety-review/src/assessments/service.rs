use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::domain::{
    ActorRef, AnswerValue, Assessment, AssessmentId, AssessmentResponse, AssessmentStatus,
    OrganizationId, Questionnaire, QuestionnaireId, QuestionnaireKind,
};
use super::lifecycle::{can_transition, TransitionEvent};
use super::progress::{compute_progress, ProgressSummary};
use super::repository::{
    AccessPolicy, AssessmentRepository, AuditLogSink, QuestionnaireRepository, RepositoryError,
};
use super::scope::resolve_in_scope;
use super::scoring::{BreakdownAxis, ScoreReport, ScoringConfig, ScoringEngine, WeightMode};
use super::validation::{check_submission, MissingQuestion, SubmissionCheck};

/// Service composing the scope resolver, calculators, validator, and state
/// machine behind the assessment operation contract.
pub struct AssessmentService<Q, R, L> {
    questionnaires: Arc<Q>,
    assessments: Arc<R>,
    audit_log: Arc<L>,
    access: Arc<dyn AccessPolicy>,
    engine: ScoringEngine,
}

static ASSESSMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_assessment_id() -> AssessmentId {
    let id = ASSESSMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AssessmentId(format!("asmt-{id:06}"))
}

/// Creation request for a new draft assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAssessment {
    pub questionnaire_id: QuestionnaireId,
    pub organization_id: OrganizationId,
    #[serde(default)]
    pub selected_audit_areas: Vec<String>,
}

/// One response edit: the kind-matched answer (or `None` to clear it), notes,
/// and opaque evidence URLs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseInput {
    #[serde(default)]
    pub value: Option<AnswerValue>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub evidence_refs: Vec<String>,
}

/// Result of a response save: the stored row plus the refreshed completion
/// summary persisted in the same request.
#[derive(Debug, Clone, Serialize)]
pub struct SavedResponse {
    pub response: AssessmentResponse,
    pub progress: ProgressSummary,
}

/// Entity names used by the not-found variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Questionnaire,
    Assessment,
    Question,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Questionnaire => "questionnaire",
            EntityKind::Assessment => "assessment",
            EntityKind::Question => "question",
        };
        f.write_str(name)
    }
}

/// Error raised by the assessment service. Every variant is an expected,
/// user-facing outcome rather than an internal failure.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error("{0} not found")]
    NotFound(EntityKind),
    #[error("write access to this assessment is denied")]
    Forbidden,
    #[error("responses are editable only while the assessment is in draft (status is {})", .status.label())]
    NotEditable { status: AssessmentStatus },
    #[error("transition from {} to {} is not allowed", .from.label(), .to.label())]
    InvalidTransition {
        from: AssessmentStatus,
        to: AssessmentStatus,
    },
    #[error("submission blocked by {} unanswered question(s)", .missing.len())]
    PreconditionFailed { missing: Vec<MissingQuestion> },
    #[error("assessment status changed concurrently")]
    Conflict,
    #[error("answer kind does not match a {} assessment", .expected.label())]
    KindMismatch { expected: QuestionnaireKind },
    #[error("questionnaire {0} is no longer active")]
    InactiveQuestionnaire(QuestionnaireId),
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for AssessmentServiceError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::StaleStatus => Self::Conflict,
            other => Self::Repository(other),
        }
    }
}

impl<Q, R, L> AssessmentService<Q, R, L>
where
    Q: QuestionnaireRepository + 'static,
    R: AssessmentRepository + 'static,
    L: AuditLogSink + 'static,
{
    pub fn new(
        questionnaires: Arc<Q>,
        assessments: Arc<R>,
        audit_log: Arc<L>,
        access: Arc<dyn AccessPolicy>,
        config: ScoringConfig,
    ) -> Self {
        Self {
            questionnaires,
            assessments,
            audit_log,
            access,
            engine: ScoringEngine::new(config),
        }
    }

    /// Create a draft assessment, materializing one empty response per
    /// in-scope question in a single atomic insert.
    pub fn create(
        &self,
        actor: &ActorRef,
        request: NewAssessment,
    ) -> Result<Assessment, AssessmentServiceError> {
        let questionnaire = self.fetch_questionnaire(&request.questionnaire_id)?;
        if !questionnaire.is_active {
            return Err(AssessmentServiceError::InactiveQuestionnaire(
                questionnaire.id.clone(),
            ));
        }

        let in_scope = resolve_in_scope(&questionnaire, &request.selected_audit_areas);
        let responses = in_scope
            .iter()
            .map(|id| (id.clone(), AssessmentResponse::empty(id.clone())))
            .collect();

        let assessment = Assessment {
            id: next_assessment_id(),
            questionnaire_id: questionnaire.id.clone(),
            organization_id: request.organization_id,
            kind: questionnaire.kind,
            status: AssessmentStatus::Draft,
            selected_audit_areas: request.selected_audit_areas,
            in_scope,
            responses,
            progress: 0,
            overall_score: None,
            ei_score: None,
            maturity_level: None,
            category_scores: BTreeMap::new(),
            started_at: Utc::now(),
            submitted_at: None,
            completed_at: None,
        };

        if !self.access.can_write(actor, &assessment) {
            return Err(AssessmentServiceError::Forbidden);
        }

        let stored = self.assessments.insert(assessment)?;
        Ok(stored)
    }

    /// Save one answer. Draft-only; the refreshed progress percentage is
    /// persisted as the final step of the request so readers never observe a
    /// stale cache past this boundary.
    pub fn save_response(
        &self,
        actor: &ActorRef,
        assessment_id: &AssessmentId,
        question_id: &super::domain::QuestionId,
        input: ResponseInput,
    ) -> Result<SavedResponse, AssessmentServiceError> {
        let mut assessment = self.fetch_assessment(assessment_id)?;

        if !self.access.can_write(actor, &assessment) {
            return Err(AssessmentServiceError::Forbidden);
        }
        if assessment.status != AssessmentStatus::Draft {
            return Err(AssessmentServiceError::NotEditable {
                status: assessment.status,
            });
        }
        if !assessment.in_scope.contains(question_id) {
            return Err(AssessmentServiceError::NotFound(EntityKind::Question));
        }
        if let Some(value) = &input.value {
            let kind_matches = matches!(
                (value, assessment.kind),
                (AnswerValue::Compliance(_), QuestionnaireKind::AuditAreaBased)
                    | (AnswerValue::Maturity(_), QuestionnaireKind::MaturityBased)
            );
            if !kind_matches {
                return Err(AssessmentServiceError::KindMismatch {
                    expected: assessment.kind,
                });
            }
        }

        let kind = assessment.kind;
        let response = assessment
            .responses
            .entry(question_id.clone())
            .or_insert_with(|| AssessmentResponse::empty(question_id.clone()));

        match input.value {
            Some(AnswerValue::Compliance(value)) => {
                response.compliance_value = Some(value);
                response.responded_by = Some(actor.user_id.clone());
                response.responded_at = Some(Utc::now());
            }
            Some(AnswerValue::Maturity(level)) => {
                response.maturity_level = Some(level);
                response.responded_by = Some(actor.user_id.clone());
                response.responded_at = Some(Utc::now());
            }
            None => {
                response.compliance_value = None;
                response.maturity_level = None;
                response.responded_by = None;
                response.responded_at = None;
            }
        }
        response.notes = input.notes;
        response.evidence_refs = input.evidence_refs;
        let saved = response.clone();

        let progress = compute_progress(kind, &assessment.in_scope, &assessment.responses);
        assessment.progress = progress.percent;

        self.assessments
            .update_where_status(assessment, AssessmentStatus::Draft)?;

        Ok(SavedResponse {
            response: saved,
            progress,
        })
    }

    /// Snapshot view of an assessment for API responses.
    pub fn status_view(
        &self,
        assessment_id: &AssessmentId,
    ) -> Result<super::domain::AssessmentView, AssessmentServiceError> {
        Ok(self.fetch_assessment(assessment_id)?.status_view())
    }

    /// Recompute completion on read; never trusts the cached percentage.
    pub fn progress(
        &self,
        assessment_id: &AssessmentId,
    ) -> Result<ProgressSummary, AssessmentServiceError> {
        let assessment = self.fetch_assessment(assessment_id)?;
        Ok(compute_progress(
            assessment.kind,
            &assessment.in_scope,
            &assessment.responses,
        ))
    }

    /// Recompute scores on read.
    pub fn scores(
        &self,
        assessment_id: &AssessmentId,
        mode: WeightMode,
        axis: Option<BreakdownAxis>,
    ) -> Result<ScoreReport, AssessmentServiceError> {
        let assessment = self.fetch_assessment(assessment_id)?;
        let questionnaire = self.fetch_questionnaire(&assessment.questionnaire_id)?;
        Ok(self.engine.score(&questionnaire, &assessment, mode, axis))
    }

    /// Pure readiness check; no mutation.
    pub fn validate_for_submission(
        &self,
        assessment_id: &AssessmentId,
    ) -> Result<SubmissionCheck, AssessmentServiceError> {
        let assessment = self.fetch_assessment(assessment_id)?;
        let questionnaire = self.fetch_questionnaire(&assessment.questionnaire_id)?;
        Ok(check_submission(&questionnaire, &assessment))
    }

    /// Submit a complete draft, freezing the score snapshot onto the record.
    pub fn submit(
        &self,
        actor: &ActorRef,
        assessment_id: &AssessmentId,
    ) -> Result<Assessment, AssessmentServiceError> {
        let mut assessment = self.fetch_assessment(assessment_id)?;

        if !self.access.can_write(actor, &assessment) {
            return Err(AssessmentServiceError::Forbidden);
        }
        if assessment.status != AssessmentStatus::Draft {
            return Err(AssessmentServiceError::InvalidTransition {
                from: assessment.status,
                to: AssessmentStatus::Submitted,
            });
        }

        let questionnaire = self.fetch_questionnaire(&assessment.questionnaire_id)?;
        let check = check_submission(&questionnaire, &assessment);
        if !check.ok {
            return Err(AssessmentServiceError::PreconditionFailed {
                missing: check.missing,
            });
        }

        let report =
            self.engine
                .score(&questionnaire, &assessment, WeightMode::Unweighted, None);
        assessment.overall_score = report.overall();
        assessment.ei_score = report.ei_score();
        assessment.maturity_level = report.maturity_level();
        assessment.category_scores = report.category_scores();
        assessment.progress = 100;
        assessment.status = AssessmentStatus::Submitted;
        assessment.submitted_at = Some(Utc::now());

        self.assessments
            .update_where_status(assessment.clone(), AssessmentStatus::Draft)?;

        let mut detail = BTreeMap::new();
        detail.insert("progress".to_string(), "100".to_string());
        if let Some(score) = assessment.overall_score {
            detail.insert("overall_score".to_string(), format!("{score:.2}"));
        }
        self.audit(actor, &assessment, AssessmentStatus::Draft, detail);

        Ok(assessment)
    }

    /// Apply a status transition from the lifecycle table. `Draft ->
    /// Submitted` is delegated to [`Self::submit`] so the validator guard is
    /// never bypassed.
    pub fn transition(
        &self,
        actor: &ActorRef,
        assessment_id: &AssessmentId,
        target: AssessmentStatus,
    ) -> Result<Assessment, AssessmentServiceError> {
        let mut assessment = self.fetch_assessment(assessment_id)?;

        if !self.access.can_write(actor, &assessment) {
            return Err(AssessmentServiceError::Forbidden);
        }

        let from = assessment.status;
        if from == AssessmentStatus::Draft && target == AssessmentStatus::Submitted {
            return self.submit(actor, assessment_id);
        }
        if !can_transition(from, target) {
            return Err(AssessmentServiceError::InvalidTransition { from, to: target });
        }

        match (from, target) {
            // Reopen clears the submission timestamp but keeps the score
            // snapshot as "last computed" until resubmission.
            (AssessmentStatus::Submitted, AssessmentStatus::Draft) => {
                assessment.submitted_at = None;
            }
            (AssessmentStatus::UnderReview, AssessmentStatus::Completed) => {
                assessment.completed_at = Some(Utc::now());
            }
            _ => {}
        }
        assessment.status = target;

        self.assessments
            .update_where_status(assessment.clone(), from)?;

        self.audit(actor, &assessment, from, BTreeMap::new());

        Ok(assessment)
    }

    fn fetch_assessment(
        &self,
        id: &AssessmentId,
    ) -> Result<Assessment, AssessmentServiceError> {
        self.assessments
            .fetch(id)?
            .ok_or(AssessmentServiceError::NotFound(EntityKind::Assessment))
    }

    fn fetch_questionnaire(
        &self,
        id: &QuestionnaireId,
    ) -> Result<Questionnaire, AssessmentServiceError> {
        self.questionnaires
            .fetch(id)?
            .ok_or(AssessmentServiceError::NotFound(EntityKind::Questionnaire))
    }

    fn audit(
        &self,
        actor: &ActorRef,
        assessment: &Assessment,
        from: AssessmentStatus,
        detail: BTreeMap<String, String>,
    ) {
        let event = TransitionEvent {
            assessment_id: assessment.id.clone(),
            actor: actor.user_id.clone(),
            occurred_at: Utc::now(),
            from,
            to: assessment.status,
            detail,
        };
        if let Err(error) = self.audit_log.record(event) {
            // Audit failures never abort the primary mutation.
            tracing::warn!(
                assessment_id = %assessment.id.0,
                %error,
                "failed to record transition audit event"
            );
        }
    }
}
