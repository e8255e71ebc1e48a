//! Assessment scoring and lifecycle engine.
//!
//! Tracks which questions of a scoped questionnaire have been answered,
//! computes regulator-defined compliance scores from the answers, and governs
//! the state machine gating an assessment's path from editable draft through
//! submission, review, and completion. Everything else in the programme
//! consumes this module's outputs as opaque values.

pub mod domain;
pub mod lifecycle;
pub mod progress;
pub mod repository;
pub mod router;
pub mod scope;
pub mod scoring;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    ActorRef, AnswerValue, Assessment, AssessmentId, AssessmentResponse, AssessmentStatus,
    AssessmentView, Classification, ComplianceValue, MaturityLevel, OrganizationId, Question,
    QuestionId, Questionnaire, QuestionnaireId, QuestionnaireKind,
};
pub use lifecycle::{allowed_targets, can_transition, TransitionEvent};
pub use progress::{compute_progress, ProgressSummary};
pub use repository::{
    AccessPolicy, AssessmentRepository, AuditLogError, AuditLogSink, QuestionnaireRepository,
    RepositoryError,
};
pub use router::assessment_router;
pub use scope::resolve_in_scope;
pub use scoring::{
    BreakdownAxis, CategoryMaturity, EiReport, MaturityReport, ScoreReport, ScoringConfig,
    ScoringEngine, WeightMode,
};
pub use service::{
    AssessmentService, AssessmentServiceError, EntityKind, NewAssessment, ResponseInput,
    SavedResponse,
};
pub use validation::{check_submission, MissingQuestion, SubmissionCheck};
