//! Statistics panel: status, phase and enrollment distributions.

use std::fmt;

use cte_model::{FieldValueStats, ValueCount, format_phase};
use cte_outcomes::{AxisLabels, ChartKind, ChartSpec, Heuristics, Point, Series};
use serde::Serialize;

use crate::view::format_count;

/// Synthetic enrollment buckets drawn in the panel.
pub const ENROLLMENT_BUCKETS: u64 = 6;

const DEFAULT_ENROLLMENT_MAX: f64 = 10_000.0;
const DEFAULT_ENROLLMENT_AVG: f64 = 100.0;
const BAR_COLOR: &str = "#3498DB";

/// One labelled share of a doughnut or pie chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slice {
    pub label: String,
    pub count: u64,
    /// Rounded share of the chart total.
    pub percent: u64,
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({}%)",
            self.label,
            format_count(self.count),
            self.percent
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionView {
    pub chart: ChartSpec,
    pub slices: Vec<Slice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrollmentBucket {
    pub label: String,
    pub min: u64,
    pub max: u64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentView {
    pub chart: ChartSpec,
    pub buckets: Vec<EnrollmentBucket>,
}

/// Everything the statistics tab shows. Parts that failed to load are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatisticsView {
    pub status: Option<DistributionView>,
    pub phase: Option<DistributionView>,
    pub enrollment: Option<EnrollmentView>,
    pub total_studies: Option<u64>,
    pub studies_with_results: Option<u64>,
}

fn by_count(values: &[ValueCount]) -> Vec<&ValueCount> {
    let mut sorted: Vec<&ValueCount> = values.iter().collect();
    sorted.sort_by(|a, b| b.studies_count.cmp(&a.studies_count));
    sorted
}

/// Sorts by count, highest first, and computes rounded percentages.
pub fn slices(values: &[ValueCount], label: impl Fn(Option<&str>) -> String) -> Vec<Slice> {
    to_slices(&by_count(values), label)
}

fn to_slices(sorted: &[&ValueCount], label: impl Fn(Option<&str>) -> String) -> Vec<Slice> {
    let total: u64 = sorted.iter().map(|v| v.studies_count).sum();
    sorted
        .iter()
        .map(|value| Slice {
            label: label(value.value.as_deref()),
            count: value.studies_count,
            percent: if total == 0 {
                0
            } else {
                (value.studies_count as f64 / total as f64 * 100.0).round() as u64
            },
        })
        .collect()
}

fn distribution_chart(
    kind: ChartKind,
    title: &str,
    slices: &[Slice],
    colors: Vec<String>,
) -> ChartSpec {
    let points = slices
        .iter()
        .zip(colors)
        .map(|(slice, color)| Point {
            color: Some(color),
            ..Point::labelled(slice.label.clone(), Some(slice.count as f64))
        })
        .collect();
    ChartSpec {
        kind,
        title: title.to_string(),
        subtitle: None,
        axis_labels: AxisLabels::default(),
        labels: slices.iter().map(|slice| slice.label.clone()).collect(),
        series: vec![Series {
            label: "Studies".to_string(),
            color: BAR_COLOR.to_string(),
            points,
        }],
        markers: Vec::new(),
    }
}

/// Doughnut of overall statuses.
pub fn status_distribution(stats: &FieldValueStats, heuristics: &Heuristics) -> DistributionView {
    let sorted = by_count(&stats.top_values);
    let slices = to_slices(&sorted, |value| value.unwrap_or("Unknown").to_string());
    let colors = sorted
        .iter()
        .map(|v| heuristics.status_color(v.value.as_deref().unwrap_or_default()).to_string())
        .collect();
    let chart = distribution_chart(ChartKind::Doughnut, "Study Status Distribution", &slices, colors);
    DistributionView { chart, slices }
}

/// Pie of phases; studies without a phase read `Not Specified`.
pub fn phase_distribution(stats: &FieldValueStats, heuristics: &Heuristics) -> DistributionView {
    let sorted = by_count(&stats.top_values);
    let slices = to_slices(&sorted, |value| match value.map(str::trim) {
        Some(phase) if !phase.is_empty() => format_phase(phase),
        _ => "Not Specified".to_string(),
    });
    let colors = sorted
        .iter()
        .map(|v| heuristics.phase_color(v.value.as_deref().unwrap_or("NA")).to_string())
        .collect();
    let chart = distribution_chart(ChartKind::Pie, "Study Phase Distribution", &slices, colors);
    DistributionView { chart, slices }
}

/// Six buckets of width `ceil(avg / 2)` with a bell-shaped weight around
/// the average. The counts are illustrative, not observed.
pub fn enrollment_buckets(stats: &FieldValueStats) -> Vec<EnrollmentBucket> {
    let max = stats
        .max
        .filter(|v| v.is_finite() && *v != 0.0)
        .unwrap_or(DEFAULT_ENROLLMENT_MAX);
    let avg = stats
        .avg
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(DEFAULT_ENROLLMENT_AVG);
    let bucket_size = (avg / 2.0).ceil().max(1.0) as u64;
    let spread = avg / 2.0;

    (0..ENROLLMENT_BUCKETS)
        .map(|i| {
            let last = i == ENROLLMENT_BUCKETS - 1;
            let min = i * bucket_size;
            let upper = if last {
                max
            } else {
                ((i + 1) * bucket_size - 1) as f64
            };
            let mid = (min as f64 + upper) / 2.0;
            let count = (100.0 * (-0.5 * (mid - avg).powi(2) / spread.powi(2)).exp()).round();
            EnrollmentBucket {
                label: if last {
                    format!("{min}+")
                } else {
                    format!("{min}-{}", upper as u64)
                },
                min,
                max: upper.max(0.0) as u64,
                count: count as u64,
            }
        })
        .collect()
}

pub fn enrollment_distribution(stats: &FieldValueStats) -> EnrollmentView {
    let buckets = enrollment_buckets(stats);
    let chart = ChartSpec {
        kind: ChartKind::Bar,
        title: "Enrollment Size Distribution".to_string(),
        subtitle: None,
        axis_labels: AxisLabels {
            x: Some("Enrollment Size".to_string()),
            y: Some("Number of Studies".to_string()),
        },
        labels: buckets.iter().map(|b| b.label.clone()).collect(),
        series: vec![Series {
            label: "Number of Studies".to_string(),
            color: BAR_COLOR.to_string(),
            points: buckets
                .iter()
                .map(|b| Point::labelled(b.label.clone(), Some(b.count as f64)))
                .collect(),
        }],
        markers: Vec::new(),
    };
    EnrollmentView { chart, buckets }
}
