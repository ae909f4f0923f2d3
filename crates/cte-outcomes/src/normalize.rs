//! Flattens an outcome measure into resolved measurement rows.

use std::sync::LazyLock;

use cte_model::{Category, Group, Measurement, OutcomeClass, OutcomeMeasure};
use regex::Regex;
use tracing::debug;

/// Leading numeric prefix, as accepted by a lenient float parser.
static NUMERIC_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?")
        .expect("Invalid numeric prefix regex")
});

/// One measurement together with the nodes that lead to it.
#[derive(Debug, Clone, Copy)]
pub struct MeasurementRow<'a> {
    pub group: &'a Group,
    pub class_index: usize,
    pub class: &'a OutcomeClass,
    pub category: &'a Category,
    pub measurement: &'a Measurement,
}

impl MeasurementRow<'_> {
    pub fn value(&self) -> Option<f64> {
        self.measurement.value_text().and_then(parse_number)
    }

    pub fn spread(&self) -> Option<f64> {
        self.measurement.spread_text().and_then(parse_number)
    }
}

/// All measurements in traversal order (class, category, measurement).
///
/// Measurements whose group id does not resolve are skipped.
pub fn flatten(outcome: &OutcomeMeasure) -> Vec<MeasurementRow<'_>> {
    let mut rows = Vec::new();
    for (class_index, class) in outcome.classes.iter().enumerate() {
        for category in &class.categories {
            for measurement in &category.measurements {
                let Some(group) = outcome.group(&measurement.group_id) else {
                    debug!(
                        group_id = %measurement.group_id,
                        "skipping measurement with unresolved group"
                    );
                    continue;
                };
                rows.push(MeasurementRow {
                    group,
                    class_index,
                    class,
                    category,
                    measurement,
                });
            }
        }
    }
    rows
}

/// Parses the leading number of a registry value (`"12.5 (3.1)"` is 12.5).
///
/// Returns `None` when there is no numeric prefix or the result is not finite.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let prefix = NUMERIC_PREFIX.find(trimmed)?.as_str();
    prefix.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Parses the leading integer of a registry value, like a sample size.
pub fn parse_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|value| sign * value)
}
