use std::collections::BTreeSet;

use super::domain::{QuestionId, Questionnaire, QuestionnaireKind};

/// Resolve the authoritative in-scope question set for an assessment.
///
/// Only active questions count. An empty audit-area selection means "all
/// areas in scope", never "no areas". Maturity questionnaires ignore the
/// selection entirely since audit areas are not a meaningful axis for them.
///
/// Callers snapshot the result onto the assessment at creation time; the set
/// is never re-resolved against a later questionnaire revision.
pub fn resolve_in_scope(
    questionnaire: &Questionnaire,
    selected_audit_areas: &[String],
) -> BTreeSet<QuestionId> {
    questionnaire
        .questions
        .iter()
        .filter(|question| question.is_active)
        .filter(|question| match questionnaire.kind {
            QuestionnaireKind::MaturityBased => true,
            QuestionnaireKind::AuditAreaBased => {
                selected_audit_areas.is_empty()
                    || question
                        .classification
                        .audit_area
                        .as_deref()
                        .is_some_and(|area| {
                            selected_audit_areas.iter().any(|selected| selected == area)
                        })
            }
        })
        .map(|question| question.id.clone())
        .collect()
}
