use super::common::*;
use crate::assessments::domain::QuestionId;
use crate::assessments::scope::resolve_in_scope;

#[test]
fn empty_selection_means_all_active_questions() {
    let questionnaire = audit_questionnaire();
    let in_scope = resolve_in_scope(&questionnaire, &[]);

    assert_eq!(in_scope.len(), 4);
    assert!(!in_scope.contains(&QuestionId("q-old-1".to_string())));
}

#[test]
fn selection_restricts_to_matching_audit_areas() {
    let questionnaire = audit_questionnaire();
    let in_scope = resolve_in_scope(&questionnaire, &["ATS".to_string()]);

    assert_eq!(in_scope.len(), 2);
    assert!(in_scope.contains(&QuestionId("q-ats-1".to_string())));
    assert!(in_scope.contains(&QuestionId("q-ats-2".to_string())));
}

#[test]
fn unknown_area_selection_yields_empty_scope() {
    let questionnaire = audit_questionnaire();
    let in_scope = resolve_in_scope(&questionnaire, &["CNS".to_string()]);

    assert!(in_scope.is_empty());
}

#[test]
fn maturity_questionnaires_ignore_area_selection() {
    let questionnaire = maturity_questionnaire();
    let all = resolve_in_scope(&questionnaire, &[]);
    let filtered = resolve_in_scope(&questionnaire, &["ATS".to_string()]);

    assert_eq!(all.len(), 4);
    assert_eq!(all, filtered);
}

#[test]
fn inactive_questions_never_enter_scope() {
    let mut questionnaire = audit_questionnaire();
    for question in &mut questionnaire.questions {
        question.is_active = false;
    }

    assert!(resolve_in_scope(&questionnaire, &[]).is_empty());
}
