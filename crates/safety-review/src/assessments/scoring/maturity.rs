use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::super::domain::{
    AssessmentResponse, MaturityLevel, Question, QuestionId, Questionnaire, QuestionnaireKind,
};

/// Grouping axis for the maturity category breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MaturityAxis {
    MaturityComponent,
    StudyArea,
}

/// Per-category maturity summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMaturity {
    pub average: f64,
    pub percent: f64,
    pub level: MaturityLevel,
}

/// Maturity result for a safety-management assessment. Unanswered responses
/// are excluded from the average, never treated as zero; `average` is `None`
/// when nothing in scope is answered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaturityReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<MaturityLevel>,
    pub answered: usize,
    pub by_category: BTreeMap<String, CategoryMaturity>,
}

fn axis_value(question: &Question, axis: MaturityAxis) -> Option<&str> {
    match axis {
        MaturityAxis::MaturityComponent => question.classification.maturity_component.as_deref(),
        MaturityAxis::StudyArea => question.classification.study_area.as_deref(),
    }
}

fn summarize(total_ordinals: u32, count: usize) -> (f64, f64, MaturityLevel) {
    let average = f64::from(total_ordinals) / count as f64;
    let percent = average / 5.0 * 100.0;
    (average, percent, MaturityLevel::from_average(average))
}

pub(crate) fn compute_maturity(
    questionnaire: &Questionnaire,
    in_scope: &BTreeSet<QuestionId>,
    responses: &BTreeMap<QuestionId, AssessmentResponse>,
    axis: MaturityAxis,
) -> MaturityReport {
    let mut total_ordinals = 0u32;
    let mut answered = 0usize;
    let mut category_terms: BTreeMap<String, (u32, usize)> = BTreeMap::new();

    for question_id in in_scope {
        let Some(response) = responses.get(question_id) else {
            continue;
        };
        if !response.is_answered(QuestionnaireKind::MaturityBased) {
            continue;
        }
        let Some(ordinal) = response.score() else {
            continue;
        };

        answered += 1;
        total_ordinals += u32::from(ordinal);

        if let Some(category) = questionnaire
            .question(question_id)
            .and_then(|question| axis_value(question, axis))
        {
            let terms = category_terms.entry(category.to_string()).or_insert((0, 0));
            terms.0 += u32::from(ordinal);
            terms.1 += 1;
        }
    }

    let (average, percent, level) = if answered == 0 {
        (None, None, None)
    } else {
        let (average, percent, level) = summarize(total_ordinals, answered);
        (Some(average), Some(percent), Some(level))
    };

    let by_category = category_terms
        .into_iter()
        .map(|(category, (ordinals, count))| {
            let (average, percent, level) = summarize(ordinals, count);
            (
                category,
                CategoryMaturity {
                    average,
                    percent,
                    level,
                },
            )
        })
        .collect();

    MaturityReport {
        average,
        percent,
        level,
        answered,
        by_category,
    }
}
