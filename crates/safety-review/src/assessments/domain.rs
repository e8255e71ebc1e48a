use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for questionnaire templates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuestionnaireId(pub String);

/// Identifier wrapper for protocol questions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuestionId(pub String);

/// Identifier wrapper for assessment instances.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssessmentId(pub String);

/// Identifier wrapper for the organization that owns an assessment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrganizationId(pub String);

impl fmt::Display for QuestionnaireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two regulatory questionnaire families supported by the programme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionnaireKind {
    AuditAreaBased,
    MaturityBased,
}

impl QuestionnaireKind {
    pub const fn label(self) -> &'static str {
        match self {
            QuestionnaireKind::AuditAreaBased => "audit_area_based",
            QuestionnaireKind::MaturityBased => "maturity_based",
        }
    }
}

/// Compliance verdicts available on audit-area protocol questions.
///
/// `NotReviewed` is an explicit marker and deliberately does not count as an
/// answer anywhere in the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceValue {
    Satisfactory,
    NotSatisfactory,
    NotApplicable,
    NotReviewed,
}

/// Ordinal maturity bands for safety-management questionnaires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MaturityLevel {
    A,
    B,
    C,
    D,
    E,
}

impl MaturityLevel {
    pub const fn ordinal(self) -> u8 {
        match self {
            MaturityLevel::A => 1,
            MaturityLevel::B => 2,
            MaturityLevel::C => 3,
            MaturityLevel::D => 4,
            MaturityLevel::E => 5,
        }
    }

    /// Band mapping for an ordinal average; boundaries are inclusive toward
    /// the higher band (an average of exactly 3.5 is a D).
    pub fn from_average(average: f64) -> Self {
        if average >= 4.5 {
            MaturityLevel::E
        } else if average >= 3.5 {
            MaturityLevel::D
        } else if average >= 2.5 {
            MaturityLevel::C
        } else if average >= 1.5 {
            MaturityLevel::B
        } else {
            MaturityLevel::A
        }
    }
}

/// Static classification metadata attached to each question. Exactly the
/// fields relevant to the owning questionnaire's kind are populated:
/// `audit_area` for audit-area questionnaires, `maturity_component` and
/// `study_area` for maturity questionnaires, `critical_element` cross-cutting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_element: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maturity_component: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_area: Option<String>,
}

/// One protocol question within a questionnaire template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    /// The regulator's stable protocol-question number, used in diagnostics.
    pub reference: String,
    pub text_en: String,
    pub text_fr: String,
    pub classification: Classification,
    pub is_priority: bool,
    pub requires_onsite_evidence: bool,
    pub weight: f64,
    pub is_active: bool,
}

/// Versioned questionnaire template. Immutable once an assessment references
/// it; revisions are modeled as new questionnaire records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Questionnaire {
    pub id: QuestionnaireId,
    pub code: String,
    pub kind: QuestionnaireKind,
    pub version: u32,
    pub is_active: bool,
    pub questions: Vec<Question>,
}

impl Questionnaire {
    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|question| &question.id == id)
    }
}

/// Lifecycle states of an assessment instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    Draft,
    Submitted,
    UnderReview,
    Completed,
    Archived,
}

impl AssessmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AssessmentStatus::Draft => "draft",
            AssessmentStatus::Submitted => "submitted",
            AssessmentStatus::UnderReview => "under_review",
            AssessmentStatus::Completed => "completed",
            AssessmentStatus::Archived => "archived",
        }
    }
}

/// A kind-matched answer supplied by an editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerValue {
    Compliance(ComplianceValue),
    Maturity(MaturityLevel),
}

/// One row per (assessment, question): the answer, evidence references, and
/// authorship metadata. Only the field matching the owning assessment's kind
/// is ever populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResponse {
    pub question_id: QuestionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_value: Option<ComplianceValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maturity_level: Option<MaturityLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub evidence_refs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responded_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<DateTime<Utc>>,
}

impl AssessmentResponse {
    pub fn empty(question_id: QuestionId) -> Self {
        Self {
            question_id,
            compliance_value: None,
            maturity_level: None,
            notes: None,
            evidence_refs: Vec::new(),
            responded_by: None,
            responded_at: None,
        }
    }

    /// The canonical answered-predicate. Progress, scoring applicability, and
    /// submission validation all route through this method; no other module
    /// re-derives the rule.
    pub fn is_answered(&self, kind: QuestionnaireKind) -> bool {
        match kind {
            QuestionnaireKind::AuditAreaBased => matches!(
                self.compliance_value,
                Some(ComplianceValue::Satisfactory)
                    | Some(ComplianceValue::NotSatisfactory)
                    | Some(ComplianceValue::NotApplicable)
            ),
            QuestionnaireKind::MaturityBased => self.maturity_level.is_some(),
        }
    }

    /// Derived numeric score; only meaningful for maturity questionnaires.
    pub fn score(&self) -> Option<u8> {
        self.maturity_level.map(MaturityLevel::ordinal)
    }
}

/// One attempt by one organization to answer one questionnaire.
///
/// `in_scope` is resolved once at creation and never recomputed, so later
/// questionnaire edits cannot move the completion denominator. An empty
/// `selected_audit_areas` means every area is in scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: AssessmentId,
    pub questionnaire_id: QuestionnaireId,
    pub organization_id: OrganizationId,
    pub kind: QuestionnaireKind,
    pub status: AssessmentStatus,
    #[serde(default)]
    pub selected_audit_areas: Vec<String>,
    pub in_scope: BTreeSet<QuestionId>,
    pub responses: BTreeMap<QuestionId, AssessmentResponse>,
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ei_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maturity_level: Option<MaturityLevel>,
    #[serde(default)]
    pub category_scores: BTreeMap<String, f64>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Assessment {
    pub fn status_view(&self) -> AssessmentView {
        AssessmentView {
            assessment_id: self.id.clone(),
            questionnaire_id: self.questionnaire_id.clone(),
            organization_id: self.organization_id.clone(),
            kind: self.kind.label(),
            status: self.status.label(),
            total_questions: self.in_scope.len(),
            progress: self.progress,
            overall_score: self.overall_score,
            ei_score: self.ei_score,
            maturity_level: self.maturity_level,
            category_scores: self.category_scores.clone(),
            submitted_at: self.submitted_at,
            completed_at: self.completed_at,
        }
    }
}

/// Sanitized representation of an assessment's exposed state.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentView {
    pub assessment_id: AssessmentId,
    pub questionnaire_id: QuestionnaireId,
    pub organization_id: OrganizationId,
    pub kind: &'static str,
    pub status: &'static str,
    pub total_questions: usize,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ei_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maturity_level: Option<MaturityLevel>,
    pub category_scores: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Acting user reference passed alongside mutations; authorization itself is
/// delegated to the externally supplied access policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRef {
    pub user_id: String,
    pub organization_id: OrganizationId,
}
