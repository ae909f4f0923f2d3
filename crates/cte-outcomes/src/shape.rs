//! Chooses how an outcome measure should be visualized.

use std::fmt;
use std::sync::LazyLock;

use cte_model::OutcomeMeasure;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::normalize::flatten;

static TIME_POINT_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(baseline|week|month|day|hour|minute|year|follow.?up|visit)")
        .expect("Invalid time point regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeShape {
    /// Mean and spread per group, drawn as normal density curves.
    Distribution,
    /// Several response buckets, drawn as grouped bars.
    Categorical,
    /// Classes are time points, drawn as one line per group.
    TimeSeries,
    /// Flat bar per (group, measurement).
    Fallback,
}

impl OutcomeShape {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Distribution => "distribution",
            Self::Categorical => "categorical",
            Self::TimeSeries => "time_series",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for OutcomeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assigns exactly one shape. Checks run in a fixed order and the first
/// match wins, so an outcome that is both a distribution and a time series
/// is a distribution.
pub fn classify(outcome: &OutcomeMeasure) -> OutcomeShape {
    if has_distribution_data(outcome) {
        OutcomeShape::Distribution
    } else if has_categorical_data(outcome) {
        OutcomeShape::Categorical
    } else if has_time_point_data(outcome) {
        OutcomeShape::TimeSeries
    } else {
        OutcomeShape::Fallback
    }
}

/// Mean-like statistic with a variance dispersion type, or any resolved
/// measurement carrying a spread.
pub fn has_distribution_data(outcome: &OutcomeMeasure) -> bool {
    let mean_with_variance = outcome
        .param_type
        .as_ref()
        .is_some_and(|param| param.is_mean_like())
        && outcome
            .dispersion_type
            .as_ref()
            .is_some_and(|dispersion| dispersion.is_variance());

    mean_with_variance
        || flatten(outcome)
            .iter()
            .any(|row| row.measurement.spread_text().is_some())
}

/// Any class with several categories, or one category holding several
/// measurements.
pub fn has_categorical_data(outcome: &OutcomeMeasure) -> bool {
    outcome.classes.iter().any(|class| match class.categories.as_slice() {
        [] => false,
        [only] => only.measurements.len() > 1,
        _ => true,
    })
}

/// Any class title starting with a temporal marker.
pub fn has_time_point_data(outcome: &OutcomeMeasure) -> bool {
    outcome.classes.iter().any(|class| {
        class
            .title
            .as_deref()
            .is_some_and(|title| TIME_POINT_TITLE.is_match(title))
    })
}
