use metrics_exporter_prometheus::PrometheusHandle;
use safety_review::assessments::{
    AccessPolicy, ActorRef, Assessment, AssessmentId, AssessmentRepository, AssessmentStatus,
    AuditLogError, AuditLogSink, Classification, Question, QuestionId, Questionnaire,
    QuestionnaireId, QuestionnaireKind, QuestionnaireRepository, RepositoryError, TransitionEvent,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Questionnaire catalogue held in memory, seeded at startup.
#[derive(Default, Clone)]
pub(crate) struct InMemoryQuestionnaireRepository {
    records: Arc<Mutex<HashMap<QuestionnaireId, Questionnaire>>>,
}

impl InMemoryQuestionnaireRepository {
    pub(crate) fn seeded() -> Self {
        let repo = Self::default();
        {
            let mut guard = repo.records.lock().expect("questionnaire mutex poisoned");
            for questionnaire in seed_questionnaires() {
                guard.insert(questionnaire.id.clone(), questionnaire);
            }
        }
        repo
    }
}

impl QuestionnaireRepository for InMemoryQuestionnaireRepository {
    fn fetch(&self, id: &QuestionnaireId) -> Result<Option<Questionnaire>, RepositoryError> {
        let guard = self.records.lock().expect("questionnaire mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAssessmentRepository {
    records: Arc<Mutex<HashMap<AssessmentId, Assessment>>>,
}

impl AssessmentRepository for InMemoryAssessmentRepository {
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

/// Audit sink that keeps events in memory and mirrors them to the log stream.
#[derive(Default, Clone)]
pub(crate) struct RecordingAuditLog {
    events: Arc<Mutex<Vec<TransitionEvent>>>,
}

impl RecordingAuditLog {
    pub(crate) fn events(&self) -> Vec<TransitionEvent> {
        self.events.lock().expect("audit mutex poisoned").clone()
    }
}

impl AuditLogSink for RecordingAuditLog {
    fn record(&self, event: TransitionEvent) -> Result<(), AuditLogError> {
        info!(
            assessment_id = %event.assessment_id.0,
            actor = %event.actor,
            from = event.from.label(),
            to = event.to.label(),
            "assessment transition"
        );
        self.events
            .lock()
            .expect("audit mutex poisoned")
            .push(event);
        Ok(())
    }
}

/// Writers must belong to the organization the assessment was opened for.
pub(crate) struct OrganizationAccessPolicy;

impl AccessPolicy for OrganizationAccessPolicy {
    fn can_write(&self, actor: &ActorRef, assessment: &Assessment) -> bool {
        actor.organization_id == assessment.organization_id
    }
}

fn audit_question(
    id: &str,
    reference: &str,
    area: &str,
    critical_element: &str,
    text_en: &str,
    text_fr: &str,
    is_priority: bool,
    weight: f64,
) -> Question {
    Question {
        id: QuestionId(id.to_string()),
        reference: reference.to_string(),
        text_en: text_en.to_string(),
        text_fr: text_fr.to_string(),
        classification: Classification {
            audit_area: Some(area.to_string()),
            critical_element: Some(critical_element.to_string()),
            maturity_component: None,
            study_area: None,
        },
        is_priority,
        requires_onsite_evidence: is_priority,
        weight,
        is_active: true,
    }
}

fn maturity_question(
    id: &str,
    reference: &str,
    component: &str,
    study_area: &str,
    text_en: &str,
    text_fr: &str,
) -> Question {
    Question {
        id: QuestionId(id.to_string()),
        reference: reference.to_string(),
        text_en: text_en.to_string(),
        text_fr: text_fr.to_string(),
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

/// Demo catalogue: a compliance protocol split over three audit areas and an
/// organizational maturity questionnaire.
pub(crate) fn seed_questionnaires() -> Vec<Questionnaire> {
    let mut retired = audit_question(
        "q-ats-090",
        "ATS.090",
        "ATS",
        "CE-6",
        "Are obsolete coordination letters retained beyond their review date?",
        "Les lettres de coordination obsoletes sont-elles conservees au-dela de leur date de revision ?",
        false,
        1.0,
    );
    retired.is_active = false;

    vec![
        Questionnaire {
            id: QuestionnaireId("ans-protocol-v3".to_string()),
            code: "ANS-PROTOCOL".to_string(),
            kind: QuestionnaireKind::AuditAreaBased,
            version: 3,
            is_active: true,
            questions: vec![
                audit_question(
                    "q-ats-001",
                    "ATS.001",
                    "ATS",
                    "CE-6",
                    "Has the provider documented ATS coordination procedures with adjacent units?",
                    "Le prestataire a-t-il documente les procedures de coordination ATS avec les unites adjacentes ?",
                    true,
                    2.0,
                ),
                audit_question(
                    "q-ats-002",
                    "ATS.002",
                    "ATS",
                    "CE-7",
                    "Are controller competency assessments carried out at the required interval?",
                    "Les evaluations de competence des controleurs sont-elles realisees a l'intervalle requis ?",
                    false,
                    1.0,
                ),
                audit_question(
                    "q-cns-001",
                    "CNS.001",
                    "CNS",
                    "CE-6",
                    "Is navigation aid flight inspection scheduling documented and current?",
                    "La planification des inspections en vol des aides a la navigation est-elle documentee et a jour ?",
                    false,
                    1.0,
                ),
                audit_question(
                    "q-met-001",
                    "MET.001",
                    "MET",
                    "CE-8",
                    "Does the meteorological watch office issue SIGMET in accordance with regional procedures?",
                    "Le centre de veille meteorologique emet-il les SIGMET conformement aux procedures regionales ?",
                    true,
                    1.5,
                ),
                retired,
            ],
        },
        Questionnaire {
            id: QuestionnaireId("sms-maturity-v2".to_string()),
            code: "SMS-MATURITY".to_string(),
            kind: QuestionnaireKind::MaturityBased,
            version: 2,
            is_active: true,
            questions: vec![
                maturity_question(
                    "q-pol-001",
                    "POL.001",
                    "policy",
                    "organization",
                    "Safety policy is endorsed by the accountable executive and reviewed annually.",
                    "La politique de securite est approuvee par le dirigeant responsable et revue annuellement.",
                ),
                maturity_question(
                    "q-pol-002",
                    "POL.002",
                    "policy",
                    "documentation",
                    "Safety accountabilities are documented for all management levels.",
                    "Les responsabilites en matiere de securite sont documentees pour tous les niveaux de direction.",
                ),
                maturity_question(
                    "q-asr-001",
                    "ASR.001",
                    "assurance",
                    "monitoring",
                    "Safety performance indicators are monitored against agreed targets.",
                    "Les indicateurs de performance de securite sont suivis par rapport aux objectifs convenus.",
                ),
                maturity_question(
                    "q-asr-002",
                    "ASR.002",
                    "assurance",
                    "monitoring",
                    "Internal audits cover all safety-critical processes on a defined cycle.",
                    "Les audits internes couvrent tous les processus critiques pour la securite selon un cycle defini.",
                ),
            ],
        },
    ]
}
