//! Renderer-agnostic chart specifications built from outcome measures.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::LazyLock;

use cte_model::{DispersionType, OutcomeMeasure};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::normalize::{MeasurementRow, flatten, parse_integer};
use crate::shape::OutcomeShape;

/// Series colors, assigned in order and reused cyclically.
pub const PALETTE: [&str; 6] = [
    "#3B82F6", "#10B981", "#F05252", "#8B5CF6", "#F59E0B", "#EC4899",
];

/// Samples per density curve.
pub const DENSITY_POINTS: usize = 100;

const MAX_TITLE_CHARS: usize = 60;

static FINAL_CLASS_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(final|end|last|completion)\b").expect("Invalid final class regex")
});

static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*(second|minute|min|hour|hr|day|week|month|year)")
        .expect("Invalid duration regex")
});

/// `Week 12`, `Day 7`: the unit leads the number.
static LABELLED_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(second|minute|min|hour|hr|day|week|month|year)s?\s*(\d+)")
        .expect("Invalid labelled duration regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
    Doughnut,
    Pie,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointX {
    Value(f64),
    Label(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: PointX,
    /// `None` is a gap, distinct from a recorded zero.
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Point {
    pub fn numeric(x: f64, y: f64) -> Self {
        Self {
            x: PointX::Value(x),
            y: Some(y),
            color: None,
        }
    }

    pub fn labelled(label: impl Into<String>, y: Option<f64>) -> Self {
        Self {
            x: PointX::Label(label.into()),
            y,
            color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub label: String,
    pub color: String,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisLabels {
    pub x: Option<String>,
    pub y: Option<String>,
}

/// Vertical reference line, e.g. a group mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub x: f64,
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub subtitle: Option<String>,
    pub axis_labels: AxisLabels,
    /// Category axis labels; empty when the x axis is numeric.
    pub labels: Vec<String>,
    pub series: Vec<Series>,
    pub markers: Vec<Marker>,
}

/// Mean and standard deviation of one group, ready to plot.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDistribution {
    pub group_id: String,
    pub group: String,
    pub mean: Option<f64>,
    /// Standard deviation after any standard-error conversion.
    pub std_dev: Option<f64>,
}

/// Value grid of a group by category (or by time point).
#[derive(Debug, Clone, PartialEq)]
pub struct GroupGrid {
    pub columns: Vec<String>,
    pub rows: Vec<GridRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub group: String,
    pub values: Vec<Option<f64>>,
}

/// One bar of the fallback chart.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupValue {
    pub group: String,
    pub value: f64,
}

pub fn color_for(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Chart title, cut to 57 characters plus `...` past 60 characters.
pub fn sanitize_title(title: Option<&str>) -> String {
    let Some(title) = title.filter(|t| !t.is_empty()) else {
        return "Outcome Measure".to_string();
    };
    if title.chars().count() > MAX_TITLE_CHARS {
        let cut: String = title.chars().take(MAX_TITLE_CHARS - 3).collect();
        format!("{cut}...")
    } else {
        title.to_string()
    }
}

pub fn time_frame_subtitle(outcome: &OutcomeMeasure) -> String {
    format!(
        "Time Frame: {}",
        non_empty(outcome.time_frame.as_deref()).unwrap_or("Not specified")
    )
}

/// Normal density curve: 100 points evenly spaced over mean ± 3·sd.
///
/// A non-finite mean or a non-positive sd gives 100 `(0, 0)` points.
pub fn normal_density(mean: f64, std_dev: f64) -> Vec<(f64, f64)> {
    if !mean.is_finite() || !std_dev.is_finite() || std_dev <= 0.0 {
        warn!(mean, std_dev, "invalid parameters for normal distribution");
        return vec![(0.0, 0.0); DENSITY_POINTS];
    }
    let min = mean - 3.0 * std_dev;
    let step = 6.0 * std_dev / (DENSITY_POINTS - 1) as f64;
    let scale = 1.0 / (std_dev * (2.0 * PI).sqrt());
    (0..DENSITY_POINTS)
        .map(|i| {
            let x = min + i as f64 * step;
            let y = scale * (-(x - mean).powi(2) / (2.0 * std_dev.powi(2))).exp();
            (x, y)
        })
        .collect()
}

/// Builds the chart for an already classified outcome.
pub fn build_chart(outcome: &OutcomeMeasure, shape: OutcomeShape) -> ChartSpec {
    match shape {
        OutcomeShape::Distribution => distribution_chart(outcome),
        OutcomeShape::Categorical => categorical_chart(outcome),
        OutcomeShape::TimeSeries => time_series_chart(outcome),
        OutcomeShape::Fallback => fallback_chart(outcome),
    }
}

/// Per-group mean and sd from the final class (or the only one).
///
/// Standard errors become standard deviations via `sd = se·√n` when the
/// group's denominator is known; otherwise the standard error is used as is.
pub fn group_distributions(outcome: &OutcomeMeasure) -> Vec<GroupDistribution> {
    let class_index = distribution_class(outcome);
    let is_error = outcome.dispersion_type == Some(DispersionType::StandardError);

    flatten(outcome)
        .into_iter()
        .filter(|row| class_index.is_none_or(|index| row.class_index == index))
        .map(|row| {
            let spread = row.spread();
            let std_dev = if is_error {
                spread.map(|se| standard_error_to_deviation(outcome, &row, se))
            } else {
                spread
            };
            GroupDistribution {
                group_id: row.group.id.clone(),
                group: row.group.title.clone(),
                mean: row.value(),
                std_dev,
            }
        })
        .collect()
}

fn standard_error_to_deviation(outcome: &OutcomeMeasure, row: &MeasurementRow<'_>, se: f64) -> f64 {
    match outcome
        .denominator_for(&row.group.id)
        .and_then(parse_integer)
    {
        Some(n) if n > 0 => se * (n as f64).sqrt(),
        _ => se,
    }
}

/// Index of the class used for distributions when several exist.
fn distribution_class(outcome: &OutcomeMeasure) -> Option<usize> {
    if outcome.classes.len() <= 1 {
        return None;
    }
    outcome
        .classes
        .iter()
        .position(|class| {
            class
                .title
                .as_deref()
                .is_some_and(|title| FINAL_CLASS_TITLE.is_match(title))
        })
        .or(Some(outcome.classes.len() - 1))
}

fn distribution_chart(outcome: &OutcomeMeasure) -> ChartSpec {
    let distributions = group_distributions(outcome);
    let mut series = Vec::with_capacity(distributions.len());
    let mut markers = Vec::new();

    for (index, dist) in distributions.iter().enumerate() {
        let color = color_for(index).to_string();
        let points = normal_density(dist.mean.unwrap_or(f64::NAN), dist.std_dev.unwrap_or(0.0))
            .into_iter()
            .map(|(x, y)| Point::numeric(x, y))
            .collect();
        series.push(Series {
            label: format!(
                "{} (μ={}, σ={})",
                dist.group,
                fixed(dist.mean, 1),
                fixed(dist.std_dev, 1)
            ),
            color: color.clone(),
            points,
        });
        if let Some(mean) = dist.mean {
            markers.push(Marker {
                x: mean,
                label: format!("μ={mean:.1}"),
                color,
            });
        }
    }

    ChartSpec {
        kind: ChartKind::Line,
        title: sanitize_title(outcome.title.as_deref()),
        subtitle: Some(time_frame_subtitle(outcome)),
        axis_labels: AxisLabels {
            x: Some(format!(
                "{} ({})",
                outcome.title.as_deref().unwrap_or("Outcome Measure"),
                unit_label(outcome)
            )),
            y: Some("Probability Density".to_string()),
        },
        labels: Vec::new(),
        series,
        markers,
    }
}

/// Group × category grid in first-seen category order; later values for the
/// same cell overwrite earlier ones.
pub fn category_grid(outcome: &OutcomeMeasure) -> GroupGrid {
    let mut columns: Vec<String> = Vec::new();
    for class in &outcome.classes {
        for category in &class.categories {
            let name = category_title(category.title.as_deref());
            if !columns.contains(&name) {
                columns.push(name);
            }
        }
    }
    let mut cells: HashMap<(&str, String), f64> = HashMap::new();
    for row in flatten(outcome) {
        if let Some(value) = row.value() {
            cells.insert(
                (row.group.id.as_str(), category_title(row.category.title.as_deref())),
                value,
            );
        }
    }
    grid(outcome, columns, &cells)
}

/// Group × time point grid with time points in chronological order.
pub fn time_point_grid(outcome: &OutcomeMeasure) -> GroupGrid {
    let mut columns: Vec<String> = Vec::new();
    for class in &outcome.classes {
        let name = time_point_title(class.title.as_deref());
        if !columns.contains(&name) {
            columns.push(name);
        }
    }
    sort_time_points(&mut columns);

    let mut cells: HashMap<(&str, String), f64> = HashMap::new();
    for row in flatten(outcome) {
        if let Some(value) = row.value() {
            cells.insert(
                (row.group.id.as_str(), time_point_title(row.class.title.as_deref())),
                value,
            );
        }
    }
    grid(outcome, columns, &cells)
}

fn grid(outcome: &OutcomeMeasure, columns: Vec<String>, cells: &HashMap<(&str, String), f64>) -> GroupGrid {
    let rows = outcome
        .groups
        .iter()
        .map(|group| GridRow {
            group: group.title.clone(),
            values: columns
                .iter()
                .map(|column| cells.get(&(group.id.as_str(), column.clone())).copied())
                .collect(),
        })
        .collect();
    GroupGrid { columns, rows }
}

fn categorical_chart(outcome: &OutcomeMeasure) -> ChartSpec {
    let grid = category_grid(outcome);
    let series = grid
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| Series {
            label: row.group.clone(),
            color: color_for(index).to_string(),
            points: grid
                .columns
                .iter()
                .zip(&row.values)
                .map(|(column, value)| Point::labelled(column.clone(), Some(value.unwrap_or(0.0))))
                .collect(),
        })
        .collect();

    ChartSpec {
        kind: ChartKind::Bar,
        title: sanitize_title(outcome.title.as_deref()),
        subtitle: Some(time_frame_subtitle(outcome)),
        axis_labels: AxisLabels {
            x: None,
            y: Some(unit_label(outcome).to_string()),
        },
        labels: grid.columns,
        series,
        markers: Vec::new(),
    }
}

fn time_series_chart(outcome: &OutcomeMeasure) -> ChartSpec {
    let grid = time_point_grid(outcome);
    let series = grid
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| Series {
            label: row.group.clone(),
            color: color_for(index).to_string(),
            points: grid
                .columns
                .iter()
                .zip(&row.values)
                .map(|(column, value)| Point::labelled(column.clone(), *value))
                .collect(),
        })
        .collect();

    ChartSpec {
        kind: ChartKind::Line,
        title: sanitize_title(outcome.title.as_deref()),
        subtitle: Some(time_frame_subtitle(outcome)),
        axis_labels: AxisLabels {
            x: None,
            y: Some(unit_label(outcome).to_string()),
        },
        labels: grid.columns,
        series,
        markers: Vec::new(),
    }
}

/// Every resolved measurement with a numeric value, in traversal order.
pub fn group_values(outcome: &OutcomeMeasure) -> Vec<GroupValue> {
    flatten(outcome)
        .into_iter()
        .filter_map(|row| {
            row.value().map(|value| GroupValue {
                group: row.group.title.clone(),
                value,
            })
        })
        .collect()
}

fn fallback_chart(outcome: &OutcomeMeasure) -> ChartSpec {
    let values = group_values(outcome);
    let points = values
        .iter()
        .enumerate()
        .map(|(index, entry)| Point {
            x: PointX::Label(entry.group.clone()),
            y: Some(entry.value),
            color: Some(color_for(index).to_string()),
        })
        .collect();

    ChartSpec {
        kind: ChartKind::Bar,
        title: sanitize_title(outcome.title.as_deref()),
        subtitle: Some(time_frame_subtitle(outcome)),
        axis_labels: AxisLabels {
            x: None,
            y: Some(unit_label(outcome).to_string()),
        },
        labels: values.iter().map(|entry| entry.group.clone()).collect(),
        series: vec![Series {
            label: outcome
                .title
                .clone()
                .unwrap_or_else(|| "Outcome Measure".to_string()),
            color: color_for(0).to_string(),
            points,
        }],
        markers: Vec::new(),
    }
}

/// Sorts time point titles: baseline, screening, `<n> <unit>` or
/// `<unit> <n>` titles by unit duration then number, then everything else
/// case-insensitively.
pub fn sort_time_points(titles: &mut [String]) {
    titles.sort_by_cached_key(|title| time_sort_key(title));
}

fn time_sort_key(title: &str) -> (u8, u8, u64, String) {
    let lower = title.to_lowercase();
    if lower.contains("baseline") {
        return (0, 0, 0, lower);
    }
    if lower.contains("screening") {
        return (1, 0, 0, lower);
    }
    let duration = DURATION
        .captures(title)
        .map(|captures| (captures[1].to_string(), captures[2].to_lowercase()))
        .or_else(|| {
            LABELLED_DURATION
                .captures(title)
                .map(|captures| (captures[2].to_string(), captures[1].to_lowercase()))
        });
    if let Some((number, unit)) = duration {
        let number = number.parse::<u64>().unwrap_or(u64::MAX);
        let unit = match unit.as_str() {
            "second" => 0,
            "minute" | "min" => 1,
            "hour" | "hr" => 2,
            "day" => 3,
            "week" => 4,
            "month" => 5,
            _ => 6,
        };
        return (2, unit, number, lower);
    }
    (3, 0, 0, lower)
}

/// `unitOfMeasure`, or `Value` when absent.
pub fn unit_label(outcome: &OutcomeMeasure) -> &str {
    non_empty(outcome.unit_of_measure.as_deref()).unwrap_or("Value")
}

pub(crate) fn fixed(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.decimals$}"),
        _ => "N/A".to_string(),
    }
}

fn category_title(title: Option<&str>) -> String {
    non_empty(title).unwrap_or("Category").to_string()
}

fn time_point_title(title: Option<&str>) -> String {
    non_empty(title).unwrap_or("Time Point").to_string()
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(json: &str) -> OutcomeMeasure {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_density_spans_three_sigma() {
        let points = normal_density(10.0, 2.0);
        assert_eq!(points.len(), DENSITY_POINTS);
        assert!((points[0].0 - 4.0).abs() < 1e-9);
        assert!((points[DENSITY_POINTS - 1].0 - 16.0).abs() < 1e-9);
        let peak = points
            .iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap();
        assert!((peak.0 - 10.0).abs() < 0.07);
    }

    #[test]
    fn test_density_degenerates_on_invalid_input() {
        assert_eq!(normal_density(f64::NAN, 1.0), vec![(0.0, 0.0); 100]);
        assert_eq!(normal_density(1.0, 0.0), vec![(0.0, 0.0); 100]);
        assert_eq!(normal_density(1.0, -2.0).len(), 100);
    }

    #[test]
    fn test_time_points_sorted() {
        let mut titles = vec![
            "Week 4".to_string(),
            "Baseline".to_string(),
            "Week 12".to_string(),
        ];
        sort_time_points(&mut titles);
        assert_eq!(titles, vec!["Baseline", "Week 4", "Week 12"]);

        let mut mixed = vec![
            "Month 2".to_string(),
            "Other".to_string(),
            "Day 7".to_string(),
            "Screening".to_string(),
            "Baseline".to_string(),
        ];
        sort_time_points(&mut mixed);
        assert_eq!(mixed, vec!["Baseline", "Screening", "Day 7", "Month 2", "Other"]);

        let mut units = vec!["2 months".to_string(), "Week 30".to_string(), "Day 90".to_string()];
        sort_time_points(&mut units);
        assert_eq!(units, vec!["Day 90", "Week 30", "2 months"]);
    }

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title(None), "Outcome Measure");
        assert_eq!(sanitize_title(Some("Short")), "Short");
        let long = "x".repeat(61);
        let cut = sanitize_title(Some(&long));
        assert_eq!(cut.chars().count(), 60);
        assert!(cut.ends_with("..."));
        assert_eq!(sanitize_title(Some(&"y".repeat(60))), "y".repeat(60));
    }

    #[test]
    fn test_standard_error_converted_with_denominator() {
        let o = outcome(
            r#"{"paramType": "MEAN", "dispersionType": "STANDARD_ERROR",
                "groups": [{"id": "OG000", "title": "A"}, {"id": "OG001", "title": "B"}],
                "denoms": [{"counts": [{"groupId": "OG000", "value": "25"}]}],
                "classes": [{"categories": [{"measurements": [
                    {"groupId": "OG000", "value": "10", "spread": "2"},
                    {"groupId": "OG001", "value": "12", "spread": "3"}]}]}]}"#,
        );
        let dists = group_distributions(&o);
        assert_eq!(dists[0].std_dev, Some(10.0));
        assert_eq!(dists[1].std_dev, Some(3.0));
    }

    #[test]
    fn test_distribution_prefers_final_class() {
        let o = outcome(
            r#"{"paramType": "MEAN", "dispersionType": "STANDARD_DEVIATION",
                "groups": [{"id": "OG000", "title": "A"}],
                "classes": [
                    {"title": "Baseline", "categories": [{"measurements": [{"groupId": "OG000", "value": "1", "spread": "1"}]}]},
                    {"title": "End of treatment", "categories": [{"measurements": [{"groupId": "OG000", "value": "5", "spread": "1"}]}]},
                    {"title": "Week 30", "categories": [{"measurements": [{"groupId": "OG000", "value": "9", "spread": "1"}]}]}
                ]}"#,
        );
        let dists = group_distributions(&o);
        assert_eq!(dists.len(), 1);
        assert_eq!(dists[0].mean, Some(5.0));

        let chart = build_chart(&o, OutcomeShape::Distribution);
        assert_eq!(chart.series[0].label, "A (μ=5.0, σ=1.0)");
        assert_eq!(chart.markers[0].label, "μ=5.0");
        assert_eq!(chart.axis_labels.y.as_deref(), Some("Probability Density"));
        assert_eq!(chart.subtitle.as_deref(), Some("Time Frame: Not specified"));
    }

    #[test]
    fn test_distribution_ignores_partial_word_matches() {
        let o = outcome(
            r#"{"paramType": "MEAN", "dispersionType": "STANDARD_DEVIATION",
                "groups": [{"id": "OG000", "title": "A"}],
                "classes": [
                    {"title": "Extended follow-up", "categories": [{"measurements": [{"groupId": "OG000", "value": "2", "spread": "1"}]}]},
                    {"title": "Trend at Week 8", "categories": [{"measurements": [{"groupId": "OG000", "value": "4", "spread": "1"}]}]},
                    {"title": "Week 30", "categories": [{"measurements": [{"groupId": "OG000", "value": "9", "spread": "1"}]}]}
                ]}"#,
        );
        let dists = group_distributions(&o);
        assert_eq!(dists[0].mean, Some(9.0));
    }

    #[test]
    fn test_time_series_gaps_are_not_zero() {
        let o = outcome(
            r#"{"groups": [{"id": "OG000", "title": "A"}, {"id": "OG001", "title": "B"}],
                "classes": [
                    {"title": "Week 4", "categories": [{"measurements": [{"groupId": "OG000", "value": "0"}]}]},
                    {"title": "Baseline", "categories": [{"measurements": [
                        {"groupId": "OG000", "value": "3"}, {"groupId": "OG001", "value": "4"}]}]}
                ]}"#,
        );
        let chart = build_chart(&o, OutcomeShape::TimeSeries);
        assert_eq!(chart.labels, vec!["Baseline", "Week 4"]);
        let b: Vec<_> = chart.series[1].points.iter().map(|p| p.y).collect();
        assert_eq!(b, vec![Some(4.0), None]);
        let a: Vec<_> = chart.series[0].points.iter().map(|p| p.y).collect();
        assert_eq!(a, vec![Some(3.0), Some(0.0)]);
    }

    #[test]
    fn test_categorical_missing_cells_default_to_zero() {
        let o = outcome(
            r#"{"unitOfMeasure": "Participants",
                "groups": [{"id": "OG000", "title": "A"}, {"id": "OG001", "title": "B"}],
                "classes": [{"categories": [
                    {"title": "Responder", "measurements": [{"groupId": "OG000", "value": "12"}]},
                    {"title": "Non-responder", "measurements": [{"groupId": "OG001", "value": "9"}]}
                ]}]}"#,
        );
        let chart = build_chart(&o, OutcomeShape::Categorical);
        assert_eq!(chart.labels, vec!["Responder", "Non-responder"]);
        let a: Vec<_> = chart.series[0].points.iter().map(|p| p.y).collect();
        assert_eq!(a, vec![Some(12.0), Some(0.0)]);
        assert_eq!(chart.axis_labels.y.as_deref(), Some("Participants"));
    }

    #[test]
    fn test_fallback_one_bar_per_measurement() {
        let o = outcome(
            r#"{"title": "Survival",
                "groups": [{"id": "OG000", "title": "A"}, {"id": "OG001", "title": "B"}],
                "classes": [{"categories": [{"measurements": [
                    {"groupId": "OG001", "value": "7.5"}]}]},
                    {"categories": [{"measurements": [{"groupId": "OG000", "value": "6"}]}]}]}"#,
        );
        let chart = build_chart(&o, OutcomeShape::Fallback);
        assert_eq!(chart.labels, vec!["B", "A"]);
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].label, "Survival");
        assert_eq!(chart.series[0].points[1].color.as_deref(), Some(PALETTE[1]));
    }
}
