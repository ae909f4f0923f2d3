//! Success-rate comparison panel.

use cte_model::SuccessRateAnalysis;
use cte_outcomes::{AxisLabels, ChartKind, ChartSpec, PALETTE, Point, Series};
use serde::Serialize;

use crate::view::NOT_AVAILABLE;

/// Enrollment sizes plotted in the comparison chart.
pub const MAX_ENROLLMENT_BARS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessRateView {
    pub total_completed: u64,
    pub total_with_results: u64,
    /// `{rate}%`, or `N/A` when the server sent none.
    pub success_rate: String,
    /// `Condition: ...`, `Intervention: ...`, `Phase: ...` for the filters used.
    pub filters: Vec<String>,
    pub overview_chart: ChartSpec,
    pub enrollment_chart: Option<ChartSpec>,
}

impl SuccessRateView {
    pub fn build(analysis: &SuccessRateAnalysis) -> Self {
        let overview = &analysis.overview;
        let filter = &overview.filter;
        let filters = [
            ("Condition", &filter.condition),
            ("Intervention", &filter.intervention),
            ("Phase", &filter.phase),
        ]
        .into_iter()
        .filter_map(|(label, value)| {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(|v| format!("{label}: {v}"))
        })
        .collect();

        let overview_chart = ChartSpec {
            kind: ChartKind::Bar,
            title: "Completed Studies vs Studies With Results".to_string(),
            subtitle: None,
            axis_labels: AxisLabels {
                x: None,
                y: Some("Number of Studies".to_string()),
            },
            labels: vec![
                "Total Completed Studies".to_string(),
                "Studies With Results".to_string(),
            ],
            series: vec![Series {
                label: "Number of Studies".to_string(),
                color: PALETTE[0].to_string(),
                points: vec![
                    Point {
                        color: Some(PALETTE[0].to_string()),
                        ..Point::labelled(
                            "Total Completed Studies",
                            Some(overview.total_completed_studies as f64),
                        )
                    },
                    Point {
                        color: Some(PALETTE[1].to_string()),
                        ..Point::labelled(
                            "Studies With Results",
                            Some(overview.total_with_results as f64),
                        )
                    },
                ],
            }],
            markers: Vec::new(),
        };

        Self {
            total_completed: overview.total_completed_studies,
            total_with_results: overview.total_with_results,
            success_rate: overview
                .success_rate
                .as_deref()
                .map(str::trim)
                .filter(|rate| !rate.is_empty())
                .map_or_else(|| NOT_AVAILABLE.to_string(), |rate| format!("{rate}%")),
            filters,
            overview_chart,
            enrollment_chart: enrollment_chart(analysis),
        }
    }
}

/// Bar chart of the smallest enrollment sizes from the first histogram.
fn enrollment_chart(analysis: &SuccessRateAnalysis) -> Option<ChartSpec> {
    let stats = analysis.enrollment_stats.first()?;
    let mut sizes: Vec<(i64, u64)> = stats
        .top_values
        .iter()
        .filter_map(|value| {
            let size = value.value.as_deref()?.trim().parse::<i64>().ok()?;
            Some((size, value.studies_count))
        })
        .collect();
    if sizes.is_empty() {
        return None;
    }
    sizes.sort_by_key(|(size, _)| *size);
    sizes.truncate(MAX_ENROLLMENT_BARS);

    Some(ChartSpec {
        kind: ChartKind::Bar,
        title: "Enrollment Size Distribution".to_string(),
        subtitle: None,
        axis_labels: AxisLabels {
            x: Some("Enrollment Size".to_string()),
            y: Some("Number of Studies".to_string()),
        },
        labels: sizes.iter().map(|(size, _)| size.to_string()).collect(),
        series: vec![Series {
            label: "Number of Studies".to_string(),
            color: PALETTE[1].to_string(),
            points: sizes
                .iter()
                .map(|(size, count)| Point::labelled(size.to_string(), Some(*count as f64)))
                .collect(),
        }],
        markers: Vec::new(),
    })
}
