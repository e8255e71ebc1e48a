use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde_json::Value;

use crate::assessments::domain::{
    ActorRef, AnswerValue, Assessment, AssessmentId, AssessmentResponse, AssessmentStatus,
    Classification, ComplianceValue, MaturityLevel, OrganizationId, Question, QuestionId,
    Questionnaire, QuestionnaireId, QuestionnaireKind,
};
use crate::assessments::lifecycle::TransitionEvent;
use crate::assessments::repository::{
    AccessPolicy, AssessmentRepository, AuditLogError, AuditLogSink, QuestionnaireRepository,
    RepositoryError,
};
use crate::assessments::router::assessment_router;
use crate::assessments::scope::resolve_in_scope;
use crate::assessments::scoring::ScoringConfig;
use crate::assessments::service::{AssessmentService, NewAssessment, ResponseInput};

pub(super) fn audit_question(
    id: &str,
    reference: &str,
    audit_area: &str,
    critical_element: &str,
    is_priority: bool,
) -> Question {
    Question {
        id: QuestionId(id.to_string()),
        reference: reference.to_string(),
        text_en: format!("Protocol question {reference}"),
        text_fr: format!("Question de protocole {reference}"),
        classification: Classification {
            audit_area: Some(audit_area.to_string()),
            critical_element: Some(critical_element.to_string()),
            maturity_component: None,
            study_area: None,
        },
        is_priority,
        requires_onsite_evidence: false,
        weight: 1.0,
        is_active: true,
    }
}

pub(super) fn maturity_question(
    id: &str,
    reference: &str,
    component: &str,
    study_area: &str,
) -> Question {
    Question {
        id: QuestionId(id.to_string()),
        reference: reference.to_string(),
        text_en: format!("Study question {reference}"),
        text_fr: format!("Question d'étude {reference}"),
        classification: Classification {
            audit_area: None,
            critical_element: None,
            maturity_component: Some(component.to_string()),
            study_area: Some(study_area.to_string()),
        },
        is_priority: false,
        requires_onsite_evidence: false,
        weight: 1.0,
        is_active: true,
    }
}

/// Audit-area questionnaire: two ATS and two MET questions plus one retired
/// question that must never enter any scope.
pub(super) fn audit_questionnaire() -> Questionnaire {
    let mut retired = audit_question("q-old-1", "ATS.900", "ATS", "CE-1", false);
    retired.is_active = false;

    Questionnaire {
        id: QuestionnaireId("ans-audit-v3".to_string()),
        code: "ANS-AUDIT".to_string(),
        kind: QuestionnaireKind::AuditAreaBased,
        version: 3,
        is_active: true,
        questions: vec![
            audit_question("q-ats-1", "ATS.001", "ATS", "CE-6", true),
            audit_question("q-ats-2", "ATS.002", "ATS", "CE-7", false),
            audit_question("q-met-1", "MET.001", "MET", "CE-6", false),
            audit_question("q-met-2", "MET.002", "MET", "CE-7", false),
            retired,
        ],
    }
}

/// Maturity questionnaire: four questions over two components.
pub(super) fn maturity_questionnaire() -> Questionnaire {
    Questionnaire {
        id: QuestionnaireId("sms-maturity-v2".to_string()),
        code: "SMS-MATURITY".to_string(),
        kind: QuestionnaireKind::MaturityBased,
        version: 2,
        is_active: true,
        questions: vec![
            maturity_question("q-pol-1", "POL.001", "policy", "organization"),
            maturity_question("q-pol-2", "POL.002", "policy", "documentation"),
            maturity_question("q-asr-1", "ASR.001", "assurance", "monitoring"),
            maturity_question("q-asr-2", "ASR.002", "assurance", "monitoring"),
        ],
    }
}

/// Build a draft assessment directly, bypassing the service, for calculator
/// level tests.
pub(super) fn draft_assessment(
    questionnaire: &Questionnaire,
    selected_audit_areas: &[&str],
) -> Assessment {
    let selected: Vec<String> = selected_audit_areas
        .iter()
        .map(|area| area.to_string())
        .collect();
    let in_scope = resolve_in_scope(questionnaire, &selected);
    let responses = in_scope
        .iter()
        .map(|id| (id.clone(), AssessmentResponse::empty(id.clone())))
        .collect();

    Assessment {
        id: AssessmentId("asmt-test".to_string()),
        questionnaire_id: questionnaire.id.clone(),
        organization_id: OrganizationId("org-1".to_string()),
        kind: questionnaire.kind,
        status: AssessmentStatus::Draft,
        selected_audit_areas: selected,
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
    }
}

pub(super) fn answer_compliance(
    assessment: &mut Assessment,
    question_id: &str,
    value: ComplianceValue,
) {
    let response = assessment
        .responses
        .get_mut(&QuestionId(question_id.to_string()))
        .expect("question in scope");
    response.compliance_value = Some(value);
    response.responded_by = Some("inspector-1".to_string());
    response.responded_at = Some(Utc::now());
}

pub(super) fn answer_maturity(assessment: &mut Assessment, question_id: &str, level: MaturityLevel) {
    let response = assessment
        .responses
        .get_mut(&QuestionId(question_id.to_string()))
        .expect("question in scope");
    response.maturity_level = Some(level);
    response.responded_by = Some("inspector-1".to_string());
    response.responded_at = Some(Utc::now());
}

pub(super) fn actor() -> ActorRef {
    ActorRef {
        user_id: "inspector-1".to_string(),
        organization_id: OrganizationId("org-1".to_string()),
    }
}

pub(super) fn foreign_actor() -> ActorRef {
    ActorRef {
        user_id: "outsider-1".to_string(),
        organization_id: OrganizationId("org-2".to_string()),
    }
}

pub(super) fn compliance_input(value: ComplianceValue) -> ResponseInput {
    ResponseInput {
        value: Some(AnswerValue::Compliance(value)),
        notes: None,
        evidence_refs: Vec::new(),
    }
}

pub(super) fn maturity_input(level: MaturityLevel) -> ResponseInput {
    ResponseInput {
        value: Some(AnswerValue::Maturity(level)),
        notes: None,
        evidence_refs: Vec::new(),
    }
}

pub(super) fn new_audit_assessment(selected_audit_areas: &[&str]) -> NewAssessment {
    NewAssessment {
        questionnaire_id: QuestionnaireId("ans-audit-v3".to_string()),
        organization_id: OrganizationId("org-1".to_string()),
        selected_audit_areas: selected_audit_areas
            .iter()
            .map(|area| area.to_string())
            .collect(),
    }
}

pub(super) fn new_maturity_assessment() -> NewAssessment {
    NewAssessment {
        questionnaire_id: QuestionnaireId("sms-maturity-v2".to_string()),
        organization_id: OrganizationId("org-1".to_string()),
        selected_audit_areas: Vec::new(),
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryQuestionnaires {
    records: Arc<Mutex<HashMap<QuestionnaireId, Questionnaire>>>,
}

impl MemoryQuestionnaires {
    pub(super) fn seeded() -> Self {
        let repo = Self::default();
        repo.put(audit_questionnaire());
        repo.put(maturity_questionnaire());
        repo
    }

    pub(super) fn put(&self, questionnaire: Questionnaire) {
        self.records
            .lock()
            .expect("questionnaire mutex poisoned")
            .insert(questionnaire.id.clone(), questionnaire);
    }
}

impl QuestionnaireRepository for MemoryQuestionnaires {
    fn fetch(&self, id: &QuestionnaireId) -> Result<Option<Questionnaire>, RepositoryError> {
        let guard = self.records.lock().expect("questionnaire mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryAssessments {
    records: Arc<Mutex<HashMap<AssessmentId, Assessment>>>,
}

impl MemoryAssessments {
    pub(super) fn stored(&self, id: &AssessmentId) -> Option<Assessment> {
        self.records
            .lock()
            .expect("assessment mutex poisoned")
            .get(id)
            .cloned()
    }
}

impl AssessmentRepository for MemoryAssessments {
    fn insert(&self, assessment: Assessment) -> Result<Assessment, RepositoryError> {
        let mut guard = self.records.lock().expect("assessment mutex poisoned");
        if guard.contains_key(&assessment.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(assessment.id.clone(), assessment.clone());
        Ok(assessment)
    }

    fn fetch(&self, id: &AssessmentId) -> Result<Option<Assessment>, RepositoryError> {
        let guard = self.records.lock().expect("assessment mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update_where_status(
        &self,
        assessment: Assessment,
        expected: AssessmentStatus,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("assessment mutex poisoned");
        let stored = guard
            .get(&assessment.id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.status != expected {
            return Err(RepositoryError::StaleStatus);
        }
        guard.insert(assessment.id.clone(), assessment);
        Ok(())
    }
}

/// Repository double whose status guard always reports a lost race.
pub(super) struct StaleAssessments {
    pub(super) inner: MemoryAssessments,
}

impl AssessmentRepository for StaleAssessments {
    fn insert(&self, assessment: Assessment) -> Result<Assessment, RepositoryError> {
        self.inner.insert(assessment)
    }

    fn fetch(&self, id: &AssessmentId) -> Result<Option<Assessment>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn update_where_status(
        &self,
        _assessment: Assessment,
        _expected: AssessmentStatus,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::StaleStatus)
    }
}

pub(super) struct UnavailableAssessments;

impl AssessmentRepository for UnavailableAssessments {
    fn insert(&self, _assessment: Assessment) -> Result<Assessment, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &AssessmentId) -> Result<Option<Assessment>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_where_status(
        &self,
        _assessment: Assessment,
        _expected: AssessmentStatus,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryAuditLog {
    events: Arc<Mutex<Vec<TransitionEvent>>>,
}

impl MemoryAuditLog {
    pub(super) fn events(&self) -> Vec<TransitionEvent> {
        self.events.lock().expect("audit mutex poisoned").clone()
    }
}

impl AuditLogSink for MemoryAuditLog {
    fn record(&self, event: TransitionEvent) -> Result<(), AuditLogError> {
        self.events
            .lock()
            .expect("audit mutex poisoned")
            .push(event);
        Ok(())
    }
}

/// Sink double that always fails; the service must swallow the error.
pub(super) struct BrokenAuditLog;

impl AuditLogSink for BrokenAuditLog {
    fn record(&self, _event: TransitionEvent) -> Result<(), AuditLogError> {
        Err(AuditLogError::Transport("audit store offline".to_string()))
    }
}

/// Write access is granted to editors of the owning organization only.
pub(super) struct OwnOrganizationPolicy;

impl AccessPolicy for OwnOrganizationPolicy {
    fn can_write(&self, actor: &ActorRef, assessment: &Assessment) -> bool {
        actor.organization_id == assessment.organization_id
    }
}

pub(super) type TestService =
    AssessmentService<MemoryQuestionnaires, MemoryAssessments, MemoryAuditLog>;

pub(super) fn build_service() -> (
    Arc<TestService>,
    Arc<MemoryAssessments>,
    Arc<MemoryAuditLog>,
) {
    let questionnaires = Arc::new(MemoryQuestionnaires::seeded());
    let assessments = Arc::new(MemoryAssessments::default());
    let audit_log = Arc::new(MemoryAuditLog::default());
    let service = Arc::new(AssessmentService::new(
        questionnaires,
        assessments.clone(),
        audit_log.clone(),
        Arc::new(OwnOrganizationPolicy),
        ScoringConfig::default(),
    ));
    (service, assessments, audit_log)
}

pub(super) fn assessment_router_with_service(service: Arc<TestService>) -> axum::Router {
    assessment_router(service)
}

pub(super) async fn read_json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
