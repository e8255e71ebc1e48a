use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::super::domain::{
    AssessmentResponse, ComplianceValue, Question, QuestionId, Questionnaire, QuestionnaireKind,
};
use super::config::{ScoringConfig, WeightMode};

/// Grouping axis for the EI category breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EiAxis {
    AuditArea,
    CriticalElement,
}

/// Effective-implementation result for an audit-area assessment.
///
/// `score` is `None` when no in-scope response is applicable; that is a
/// defined-empty result, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EiReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub mode: WeightMode,
    pub satisfactory: usize,
    pub applicable: usize,
    pub by_category: BTreeMap<String, f64>,
}

fn applicable_value(
    response: &AssessmentResponse,
) -> Option<ComplianceValue> {
    // Applicability rides on the canonical answered-predicate; not-applicable
    // answers count as answered but drop out of both ratio terms.
    if !response.is_answered(QuestionnaireKind::AuditAreaBased) {
        return None;
    }
    match response.compliance_value {
        Some(value @ ComplianceValue::Satisfactory)
        | Some(value @ ComplianceValue::NotSatisfactory) => Some(value),
        _ => None,
    }
}

fn question_weight(question: &Question, mode: WeightMode, config: &ScoringConfig) -> f64 {
    match mode {
        WeightMode::Unweighted => 1.0,
        WeightMode::PriorityWeighted => {
            let multiplier = if question.is_priority {
                config.priority_multiplier
            } else {
                1.0
            };
            question.weight * multiplier
        }
    }
}

fn axis_value(question: &Question, axis: EiAxis) -> Option<&str> {
    match axis {
        EiAxis::AuditArea => question.classification.audit_area.as_deref(),
        EiAxis::CriticalElement => question.classification.critical_element.as_deref(),
    }
}

pub(crate) fn compute_ei(
    questionnaire: &Questionnaire,
    in_scope: &BTreeSet<QuestionId>,
    responses: &BTreeMap<QuestionId, AssessmentResponse>,
    mode: WeightMode,
    axis: EiAxis,
    config: &ScoringConfig,
) -> EiReport {
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    let mut satisfactory = 0usize;
    let mut applicable = 0usize;
    let mut category_terms: BTreeMap<String, (f64, f64)> = BTreeMap::new();

    for question_id in in_scope {
        let Some(question) = questionnaire.question(question_id) else {
            continue;
        };
        let Some(response) = responses.get(question_id) else {
            continue;
        };
        let Some(value) = applicable_value(response) else {
            continue;
        };

        let weight = question_weight(question, mode, config);
        let is_satisfactory = value == ComplianceValue::Satisfactory;

        applicable += 1;
        denominator += weight;
        if is_satisfactory {
            satisfactory += 1;
            numerator += weight;
        }

        if let Some(category) = axis_value(question, axis) {
            let terms = category_terms.entry(category.to_string()).or_insert((0.0, 0.0));
            terms.1 += weight;
            if is_satisfactory {
                terms.0 += weight;
            }
        }
    }

    let score = (denominator > 0.0).then(|| numerator / denominator * 100.0);
    let by_category = category_terms
        .into_iter()
        .map(|(category, (num, den))| (category, num / den * 100.0))
        .collect();

    EiReport {
        score,
        mode,
        satisfactory,
        applicable,
        by_category,
    }
}
