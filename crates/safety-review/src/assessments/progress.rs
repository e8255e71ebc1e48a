use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::domain::{AssessmentResponse, QuestionId, QuestionnaireKind};

/// Answered/total completion summary for an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    pub total: usize,
    pub answered: usize,
    pub percent: u8,
}

/// Compute completion from the resolved in-scope set. Responses whose
/// question is out of scope (leftovers from a prior broader scope) are
/// discarded from both counts, so `answered <= total` always holds.
pub fn compute_progress(
    kind: QuestionnaireKind,
    in_scope: &BTreeSet<QuestionId>,
    responses: &BTreeMap<QuestionId, AssessmentResponse>,
) -> ProgressSummary {
    let total = in_scope.len();
    let answered = responses
        .iter()
        .filter(|(question_id, response)| {
            in_scope.contains(question_id) && response.is_answered(kind)
        })
        .count();

    let percent = if total == 0 {
        0
    } else {
        ((answered as f64 / total as f64) * 100.0).round() as u8
    };

    ProgressSummary {
        total,
        answered,
        percent,
    }
}
