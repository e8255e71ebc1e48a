use serde::{Deserialize, Serialize};

const DEFAULT_PRIORITY_MULTIPLIER: f64 = 1.5;

/// Dials backing the scoring calculators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Multiplier applied to a question's base weight when `is_priority` is
    /// set and priority-weighted scoring is requested.
    pub priority_multiplier: f64,
}

impl ScoringConfig {
    pub fn new(priority_multiplier: f64) -> Self {
        let sanitized = if priority_multiplier.is_finite() && priority_multiplier > 0.0 {
            priority_multiplier
        } else {
            DEFAULT_PRIORITY_MULTIPLIER
        };

        Self {
            priority_multiplier: sanitized,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PRIORITY_MULTIPLIER)
    }
}

/// Whether the effective-implementation ratio uses question weights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightMode {
    #[default]
    Unweighted,
    PriorityWeighted,
}

/// Requested grouping axis for the per-category breakdown. Axes that do not
/// apply to the assessment's kind fall back to that kind's default axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakdownAxis {
    AuditArea,
    CriticalElement,
    MaturityComponent,
    StudyArea,
}
