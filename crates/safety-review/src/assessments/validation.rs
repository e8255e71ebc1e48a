use serde::Serialize;

use super::domain::{Assessment, QuestionId, Questionnaire};

/// An in-scope question still blocking submission, resolved to the
/// regulator's protocol-question reference for diagnostic display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingQuestion {
    pub question_id: QuestionId,
    pub reference: String,
}

/// Result of the submission readiness check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionCheck {
    pub ok: bool,
    pub missing: Vec<MissingQuestion>,
}

/// Decide whether an assessment may leave draft. Pure read: used by the
/// pre-submission status query and re-run inside the submit transition, so a
/// client-cached "ready" flag is never trusted at commit time.
pub fn check_submission(questionnaire: &Questionnaire, assessment: &Assessment) -> SubmissionCheck {
    let mut missing = Vec::new();

    for question_id in &assessment.in_scope {
        let answered = assessment
            .responses
            .get(question_id)
            .is_some_and(|response| response.is_answered(assessment.kind));
        if answered {
            continue;
        }

        let reference = questionnaire
            .question(question_id)
            .map(|question| question.reference.clone())
            .unwrap_or_else(|| question_id.0.clone());
        missing.push(MissingQuestion {
            question_id: question_id.clone(),
            reference,
        });
    }

    SubmissionCheck {
        ok: missing.is_empty(),
        missing,
    }
}
