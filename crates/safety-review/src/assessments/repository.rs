use super::domain::{
    ActorRef, Assessment, AssessmentId, AssessmentStatus, Questionnaire, QuestionnaireId,
};
use super::lifecycle::TransitionEvent;

/// Read-only access to questionnaire templates.
pub trait QuestionnaireRepository: Send + Sync {
    fn fetch(&self, id: &QuestionnaireId) -> Result<Option<Questionnaire>, RepositoryError>;
}

/// Storage abstraction for assessment aggregates. The aggregate (assessment
/// plus its materialized response map) is the atomic unit: `insert` makes all
/// response rows visible in one call, so completion denominators are never
/// observed half-built.
pub trait AssessmentRepository: Send + Sync {
    fn insert(&self, assessment: Assessment) -> Result<Assessment, RepositoryError>;
    fn fetch(&self, id: &AssessmentId) -> Result<Option<Assessment>, RepositoryError>;
    /// Compare-and-swap update: commits only while the stored status still
    /// equals `expected`, otherwise fails with `StaleStatus`. This is the
    /// optimistic re-check that resolves racing transitions.
    fn update_where_status(
        &self,
        assessment: Assessment,
        expected: AssessmentStatus,
    ) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("status changed concurrently")]
    StaleStatus,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Append-only audit trail consumed, not implemented, by the engine. Sink
/// failures must never abort the primary mutation.
pub trait AuditLogSink: Send + Sync {
    fn record(&self, event: TransitionEvent) -> Result<(), AuditLogError>;
}

/// Audit dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum AuditLogError {
    #[error("audit log transport unavailable: {0}")]
    Transport(String),
}

/// Externally supplied write-access predicate.
pub trait AccessPolicy: Send + Sync {
    fn can_write(&self, actor: &ActorRef, assessment: &Assessment) -> bool;
}
