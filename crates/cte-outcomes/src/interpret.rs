//! Plain-language summaries that accompany each outcome chart.
//!
//! Generation never fails: missing pieces become `N/A` or are left out.

use std::fmt;

use cte_model::{Analysis, OutcomeMeasure};
use serde::{Deserialize, Serialize};

use crate::chart::{
    GroupDistribution, category_grid, fixed, group_distributions, group_values, non_empty,
    time_point_grid,
};
use crate::heuristics::Heuristics;
use crate::shape::OutcomeShape;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interpretation {
    pub heading: String,
    pub title: String,
    pub description: Option<String>,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    pub body: SectionBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionBody {
    Lines { lines: Vec<String> },
    Bullets { items: Vec<String> },
    Table { header: Vec<String>, rows: Vec<Vec<String>> },
}

impl Section {
    fn lines(heading: &str, lines: Vec<String>) -> Self {
        Self {
            heading: heading.to_string(),
            body: SectionBody::Lines { lines },
        }
    }

    fn bullets(heading: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            heading: heading.into(),
            body: SectionBody::Bullets { items },
        }
    }
}

impl fmt::Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.heading)?;
        writeln!(f, "{}", self.title)?;
        if let Some(description) = &self.description {
            writeln!(f, "{description}")?;
        }
        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "{}", section.heading)?;
            match &section.body {
                SectionBody::Lines { lines } => {
                    for line in lines {
                        writeln!(f, "{line}")?;
                    }
                }
                SectionBody::Bullets { items } => {
                    for item in items {
                        writeln!(f, "- {item}")?;
                    }
                }
                SectionBody::Table { header, rows } => {
                    writeln!(f, "{}", header.join(" | "))?;
                    for row in rows {
                        writeln!(f, "{}", row.join(" | "))?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Summary text for an outcome already classified as `shape`.
pub fn interpret(
    outcome: &OutcomeMeasure,
    shape: OutcomeShape,
    heuristics: &Heuristics,
) -> Interpretation {
    match shape {
        OutcomeShape::Distribution => distribution(outcome, heuristics),
        OutcomeShape::Categorical => categorical(outcome),
        OutcomeShape::TimeSeries => time_series(outcome, heuristics),
        OutcomeShape::Fallback => fallback(outcome),
    }
}

fn base(outcome: &OutcomeMeasure, heading: &str) -> Interpretation {
    Interpretation {
        heading: heading.to_string(),
        title: outcome
            .title
            .clone()
            .unwrap_or_else(|| "Outcome Measure".to_string()),
        description: non_empty(outcome.description.as_deref()).map(str::to_string),
        sections: Vec::new(),
    }
}

fn distribution(outcome: &OutcomeMeasure, heuristics: &Heuristics) -> Interpretation {
    let mut out = base(outcome, "Distribution Analysis:");
    let groups = group_distributions(outcome);

    out.sections.push(Section::bullets(
        "Group Comparisons:",
        groups
            .iter()
            .map(|g| {
                format!(
                    "{}: Mean = {}, SD = {}",
                    g.group,
                    fixed(g.mean, 2),
                    fixed(g.std_dev, 2)
                )
            })
            .collect(),
    ));

    if let Some(section) = statistics_section(outcome.analyses.first(), true) {
        out.sections.push(section);
    }

    let comparable: Vec<&GroupDistribution> = groups.iter().filter(|g| g.mean.is_some()).collect();
    if let Some((control, experimental)) = pick_arms(&comparable, heuristics) {
        let (Some(control_mean), Some(experimental_mean)) = (control.mean, experimental.mean)
        else {
            return out;
        };
        let diff = experimental_mean - control_mean;
        let percent = diff / control_mean.abs() * 100.0;
        let lower_is_better = heuristics.is_lower_value_better(outcome.title.as_deref());
        let better = if lower_is_better { diff < 0.0 } else { diff > 0.0 };
        let amount = if percent.is_finite() {
            format!("{:.1}%", percent.abs())
        } else {
            "N/A".to_string()
        };
        out.sections.push(Section::lines(
            "Clinical Interpretation:",
            vec![format!(
                "The experimental group showed a {amount} {} outcome compared to control.",
                if better { "better" } else { "worse" }
            )],
        ));
    }
    out
}

/// Control and experimental arms by keyword; the last keyword match wins.
/// Without a control keyword the first two groups are used.
fn pick_arms<'a>(
    groups: &[&'a GroupDistribution],
    heuristics: &Heuristics,
) -> Option<(&'a GroupDistribution, &'a GroupDistribution)> {
    if groups.len() < 2 {
        return None;
    }
    let mut control = None;
    let mut experimental = None;
    for group in groups {
        if heuristics.is_control_arm(&group.group) {
            control = Some(*group);
        } else if heuristics.is_experimental_arm(&group.group) {
            experimental = Some(*group);
        }
    }
    if control.is_none() {
        return Some((groups[0], groups[1]));
    }
    control.zip(experimental)
}

fn categorical(outcome: &OutcomeMeasure) -> Interpretation {
    let mut out = base(outcome, "Categorical Analysis:");
    let grid = category_grid(outcome);

    let mut header = vec!["Category".to_string()];
    header.extend(grid.rows.iter().map(|row| row.group.clone()));
    let rows = grid
        .columns
        .iter()
        .enumerate()
        .map(|(col, category)| {
            let mut cells = vec![category.clone()];
            cells.extend(grid.rows.iter().map(|row| fixed(row.values[col], 2)));
            cells
        })
        .collect();
    out.sections.push(Section {
        heading: "Category Values:".to_string(),
        body: SectionBody::Table { header, rows },
    });

    if let Some(section) = statistics_section(outcome.analyses.first(), true) {
        out.sections.push(section);
    }
    out
}

fn time_series(outcome: &OutcomeMeasure, heuristics: &Heuristics) -> Interpretation {
    let mut out = base(outcome, "Time Series Analysis:");
    let grid = time_point_grid(outcome);
    let lower_is_better = heuristics.is_lower_value_better(outcome.title.as_deref());

    let baseline = grid
        .columns
        .iter()
        .position(|title| {
            let lower = title.to_lowercase();
            lower.contains("baseline") || lower.contains("screening")
        })
        .unwrap_or(0);
    let last = grid.columns.len().saturating_sub(1);

    if last > baseline {
        let items = grid
            .rows
            .iter()
            .filter_map(|row| {
                let (start, end) = (row.values[baseline]?, row.values[last]?);
                let change = end - start;
                let percent = change / start.abs() * 100.0;
                let direction = direction_word(change, "increase", "decrease");
                let verdict = if lower_is_better {
                    direction_word(-change, "improvement", "worsening")
                } else {
                    direction_word(change, "improvement", "worsening")
                };
                let amount = if percent.is_finite() {
                    format!("{:.1}%", percent.abs())
                } else {
                    "N/A".to_string()
                };
                Some(format!("{}: {amount} {direction} ({verdict})", row.group))
            })
            .collect();
        out.sections.push(Section::bullets(
            format!(
                "Change from {} to {}:",
                grid.columns[baseline], grid.columns[last]
            ),
            items,
        ));
    }

    if let Some(section) = statistics_section(outcome.analyses.first(), false) {
        out.sections.push(section);
    }
    out
}

fn direction_word(change: f64, positive: &'static str, negative: &'static str) -> &'static str {
    if change > 0.0 {
        positive
    } else if change < 0.0 {
        negative
    } else {
        "no change"
    }
}

fn fallback(outcome: &OutcomeMeasure) -> Interpretation {
    let mut out = base(outcome, "Outcome Summary:");
    let unit = non_empty(outcome.unit_of_measure.as_deref());
    let items = group_values(outcome)
        .into_iter()
        .map(|entry| match unit {
            Some(unit) => format!("{}: {} {unit}", entry.group, entry.value),
            None => format!("{}: {}", entry.group, entry.value),
        })
        .collect();
    out.sections.push(Section::bullets("Values:", items));
    out
}

/// p-value, method and (optionally) confidence interval of the first analysis.
fn statistics_section(analysis: Option<&Analysis>, with_ci: bool) -> Option<Section> {
    let analysis = analysis?;
    let p_value = non_empty(analysis.p_value.as_deref())?;
    let mut lines = vec![format!("p-value: {p_value}")];
    if let Some(method) = non_empty(analysis.statistical_method.as_deref()) {
        lines.push(format!("Method: {method}"));
    }
    if with_ci
        && let (Some(lower), Some(upper)) = (
            non_empty(analysis.ci_lower_limit.as_deref()),
            non_empty(analysis.ci_upper_limit.as_deref()),
        )
    {
        let pct = non_empty(analysis.ci_pct_value.as_deref()).unwrap_or("95");
        lines.push(format!("{pct}% CI: [{lower}, {upper}]"));
    }
    Some(Section::lines("Statistical Analysis:", lines))
}
