use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{AssessmentId, AssessmentStatus};

/// Legal targets for each lifecycle state. `Archived` is terminal.
pub fn allowed_targets(status: AssessmentStatus) -> &'static [AssessmentStatus] {
    match status {
        AssessmentStatus::Draft => &[AssessmentStatus::Submitted, AssessmentStatus::Archived],
        // Draft target = "reopen"
        AssessmentStatus::Submitted => &[AssessmentStatus::UnderReview, AssessmentStatus::Draft],
        // Submitted target = "send back"
        AssessmentStatus::UnderReview => {
            &[AssessmentStatus::Completed, AssessmentStatus::Submitted]
        }
        AssessmentStatus::Completed => &[AssessmentStatus::Archived],
        AssessmentStatus::Archived => &[],
    }
}

pub fn can_transition(from: AssessmentStatus, to: AssessmentStatus) -> bool {
    allowed_targets(from).contains(&to)
}

/// Immutable audit record emitted for every committed transition. Append-only
/// from the engine's point of view; sinks must never mutate past events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub assessment_id: AssessmentId,
    pub actor: String,
    pub occurred_at: DateTime<Utc>,
    pub from: AssessmentStatus,
    pub to: AssessmentStatus,
    pub detail: BTreeMap<String, String>,
}
