use cte_model::{OutcomeMeasure, Study};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chart::{ChartSpec, build_chart};
use crate::heuristics::Heuristics;
use crate::interpret::{Interpretation, interpret};
use crate::shape::{OutcomeShape, classify};

/// Chart and summary of one reported outcome measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeVisualization {
    /// Registry outcome type (`PRIMARY`, `SECONDARY`, ...), if any.
    pub outcome_type: Option<String>,
    pub shape: OutcomeShape,
    pub chart: ChartSpec,
    pub interpretation: Interpretation,
}

/// Classifies the outcome, then builds its chart and interpretation.
pub fn visualize(outcome: &OutcomeMeasure, heuristics: &Heuristics) -> OutcomeVisualization {
    let shape = classify(outcome);
    debug!(
        title = outcome.title.as_deref().unwrap_or_default(),
        %shape,
        "classified outcome measure"
    );
    OutcomeVisualization {
        outcome_type: outcome
            .outcome_type
            .as_ref()
            .map(|kind| kind.as_str().to_string()),
        shape,
        chart: build_chart(outcome, shape),
        interpretation: interpret(outcome, shape, heuristics),
    }
}

/// One visualization per reported outcome: primary outcomes first, then
/// secondary, then any other type, each in registry order.
pub fn visualize_study(study: &Study, heuristics: &Heuristics) -> Vec<OutcomeVisualization> {
    let outcomes = study.outcome_measures();
    let primary = outcomes.iter().filter(|o| o.is_primary());
    let secondary = outcomes.iter().filter(|o| o.is_secondary());
    let other = outcomes
        .iter()
        .filter(|o| !o.is_primary() && !o.is_secondary());
    primary
        .chain(secondary)
        .chain(other)
        .map(|outcome| visualize(outcome, heuristics))
        .collect()
}
