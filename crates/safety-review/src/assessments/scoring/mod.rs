mod config;
mod ei;
mod maturity;

pub use config::{BreakdownAxis, ScoringConfig, WeightMode};
pub use ei::EiReport;
pub use maturity::{CategoryMaturity, MaturityReport};

use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::{Assessment, MaturityLevel, Questionnaire, QuestionnaireKind};
use ei::EiAxis;
use maturity::MaturityAxis;

/// Stateless calculator applying the kind-selected scoring algorithm to an
/// assessment's in-scope responses. Pure: two calls over an unchanged
/// response set yield identical output.
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn score(
        &self,
        questionnaire: &Questionnaire,
        assessment: &Assessment,
        mode: WeightMode,
        axis: Option<BreakdownAxis>,
    ) -> ScoreReport {
        match assessment.kind {
            QuestionnaireKind::AuditAreaBased => {
                let axis = match axis {
                    Some(BreakdownAxis::CriticalElement) => EiAxis::CriticalElement,
                    _ => EiAxis::AuditArea,
                };
                ScoreReport::EffectiveImplementation(ei::compute_ei(
                    questionnaire,
                    &assessment.in_scope,
                    &assessment.responses,
                    mode,
                    axis,
                    &self.config,
                ))
            }
            QuestionnaireKind::MaturityBased => {
                let axis = match axis {
                    Some(BreakdownAxis::StudyArea) => MaturityAxis::StudyArea,
                    _ => MaturityAxis::MaturityComponent,
                };
                ScoreReport::Maturity(maturity::compute_maturity(
                    questionnaire,
                    &assessment.in_scope,
                    &assessment.responses,
                    axis,
                ))
            }
        }
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

/// Kind-tagged scoring output consumed by the service facade and routes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreReport {
    EffectiveImplementation(EiReport),
    Maturity(MaturityReport),
}

impl ScoreReport {
    /// The single overall percentage persisted as `overall_score`.
    pub fn overall(&self) -> Option<f64> {
        match self {
            ScoreReport::EffectiveImplementation(report) => report.score,
            ScoreReport::Maturity(report) => report.percent,
        }
    }

    pub fn ei_score(&self) -> Option<f64> {
        match self {
            ScoreReport::EffectiveImplementation(report) => report.score,
            ScoreReport::Maturity(_) => None,
        }
    }

    pub fn maturity_level(&self) -> Option<MaturityLevel> {
        match self {
            ScoreReport::EffectiveImplementation(_) => None,
            ScoreReport::Maturity(report) => report.level,
        }
    }

    /// Category code to percentage map, flattened for the snapshot fields.
    pub fn category_scores(&self) -> BTreeMap<String, f64> {
        match self {
            ScoreReport::EffectiveImplementation(report) => report.by_category.clone(),
            ScoreReport::Maturity(report) => report
                .by_category
                .iter()
                .map(|(category, summary)| (category.clone(), summary.percent))
                .collect(),
        }
    }
}
