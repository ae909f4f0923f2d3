//! Terminal rendering of dashboard panels.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use cte_dashboard::{
    ActivityLog, DetailField, DistributionView, EnrollmentView, ResultRow, ResultsView,
    StatisticsView, StudyDetailView, SuccessRateView, format_count,
};
use cte_model::PrecedentCase;
use cte_outcomes::{ChartSpec, Heuristics, OutcomeVisualization, PointX, Series};
use serde::Serialize;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_results(view: &ResultsView, heuristics: &Heuristics) {
    if view.is_empty() {
        println!("No studies found");
        return;
    }
    let mut table = Table::new();
    table.set_header(ResultRow::HEADERS.iter().map(|h| header_cell(h)));
    apply_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Center);
    for row in &view.rows {
        let [nct_id, title, status, phase, has_results] = row.cells();
        table.add_row(vec![
            Cell::new(nct_id).add_attribute(Attribute::Bold),
            Cell::new(title),
            colored_cell(status, heuristics.status_color(&row.status)),
            Cell::new(phase),
            if row.has_results {
                Cell::new(has_results).fg(Color::Green)
            } else {
                dim_cell(has_results)
            },
        ]);
    }
    println!("{table}");
    if let Some(stats) = &view.stats_text {
        println!("{stats}");
    }
    if let Some(pagination) = view.pagination.filter(|p| p.visible) {
        println!("{pagination} | {}", pagination.page_text());
    }
}

pub fn print_detail(detail: &StudyDetailView, heuristics: &Heuristics) {
    let title = Cell::new(&detail.title).add_attribute(Attribute::Bold);
    let mut header = Table::new();
    apply_table_style(&mut header);
    header.set_header(vec![title]);
    header.add_row(vec![format!(
        "{} | {} | {}",
        detail.nct_id, detail.phase, detail.sponsor
    )]);
    header.add_row(vec![colored_cell(
        &detail.status,
        detail.status_color(heuristics),
    )]);
    if detail.has_results {
        header.add_row(vec![Cell::new("Has Results").fg(Color::Green)]);
    }
    if detail.trd_specific {
        header.add_row(vec![Cell::new("TRD-specific").fg(Color::Yellow)]);
    }
    println!("{header}");

    if let Some(official) = &detail.official_title {
        println!("Official title: {official}");
    }
    print_fields("Study Design", &detail.design);
    print_text("Brief Summary", detail.brief_summary.as_deref());
    print_text("Detailed Description", detail.detailed_description.as_deref());
    print_list("Conditions", &detail.conditions);
    print_list("Keywords", &detail.keywords);
    print_list("Interventions", &detail.interventions);

    if !detail.arm_groups.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Arm"),
            header_cell("Type"),
            header_cell("Description"),
            header_cell("Interventions"),
        ]);
        apply_table_style(&mut table);
        for arm in &detail.arm_groups {
            table.add_row(vec![
                Cell::new(&arm.label),
                optional_cell(arm.arm_type.as_deref()),
                optional_cell(arm.description.as_deref()),
                Cell::new(arm.interventions.join(", ")),
            ]);
        }
        println!("\nArm Groups:");
        println!("{table}");
    }

    print_fields("Eligibility", &detail.eligibility);
    print_text("Eligibility Criteria", detail.eligibility_criteria.as_deref());

    let mut locations = detail.locations.clone();
    locations.extend(detail.more_locations.clone());
    print_list("Locations", &locations);

    for (heading, outcomes) in [
        ("Primary Outcomes", &detail.primary_outcomes),
        ("Secondary Outcomes", &detail.secondary_outcomes),
    ] {
        if outcomes.is_empty() {
            continue;
        }
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Measure"),
            header_cell("Time Frame"),
            header_cell("Description"),
        ]);
        apply_table_style(&mut table);
        for outcome in outcomes {
            table.add_row(vec![
                Cell::new(&outcome.measure),
                optional_cell(outcome.time_frame.as_deref()),
                optional_cell(outcome.description.as_deref()),
            ]);
        }
        println!("\n{heading}:");
        println!("{table}");
    }

    print_text("Collaborators", detail.collaborators.as_deref());
    print_visualizations(&detail.outcome_visualizations);
}

pub fn print_visualizations(visualizations: &[OutcomeVisualization]) {
    if visualizations.is_empty() {
        println!("\nNo outcome results have been posted for this study.");
        return;
    }
    for visualization in visualizations {
        println!();
        println!(
            "== {} outcome ({}) ==",
            visualization.outcome_type.as_deref().unwrap_or("Other"),
            visualization.shape
        );
        print_chart(&visualization.chart);
        println!("{}", visualization.interpretation);
    }
}

/// Category charts print one column per series; numeric charts print the
/// range and peak of each curve.
pub fn print_chart(chart: &ChartSpec) {
    println!("{}", chart.title);
    if let Some(subtitle) = &chart.subtitle {
        println!("{subtitle}");
    }
    let mut table = Table::new();
    apply_table_style(&mut table);

    if chart.labels.is_empty() {
        table.set_header(vec![
            header_cell("Series"),
            header_cell("From"),
            header_cell("To"),
            header_cell("Peak at"),
        ]);
        for series in &chart.series {
            let xs: Vec<(f64, Option<f64>)> = series
                .points
                .iter()
                .filter_map(|point| match point.x {
                    PointX::Value(x) => Some((x, point.y)),
                    PointX::Label(_) => None,
                })
                .collect();
            let peak = xs
                .iter()
                .filter_map(|(x, y)| y.map(|y| (*x, y)))
                .max_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(x, _)| x);
            table.add_row(vec![
                colored_cell(&series.label, &series.color),
                Cell::new(format_value(xs.first().map(|(x, _)| *x))),
                Cell::new(format_value(xs.last().map(|(x, _)| *x))),
                Cell::new(format_value(peak)),
            ]);
        }
        for marker in &chart.markers {
            table.add_row(vec![
                colored_cell(&marker.label, &marker.color),
                dim_cell("-"),
                dim_cell("-"),
                Cell::new(format_value(Some(marker.x))),
            ]);
        }
    } else {
        let mut header = vec![header_cell(chart.axis_labels.x.as_deref().unwrap_or(""))];
        header.extend(
            chart
                .series
                .iter()
                .map(|series| colored_cell(&series.label, &series.color)),
        );
        table.set_header(header);
        for (index, label) in chart.labels.iter().enumerate() {
            let mut row = vec![Cell::new(label)];
            row.extend(
                chart
                    .series
                    .iter()
                    .map(|series| Cell::new(format_value(value_at(series, label, index)))),
            );
            table.add_row(row);
        }
        for column in 1..=chart.series.len() {
            align_column(&mut table, column, CellAlignment::Right);
        }
    }
    println!("{table}");
}

fn value_at(series: &Series, label: &str, index: usize) -> Option<f64> {
    series
        .points
        .iter()
        .find(|point| matches!(&point.x, PointX::Label(l) if l == label))
        .or_else(|| series.points.get(index))
        .and_then(|point| point.y)
}

pub fn print_statistics(view: &StatisticsView) {
    println!(
        "Total studies: {} | With results: {}",
        view.total_studies
            .map_or_else(|| "-".to_string(), format_count),
        view.studies_with_results
            .map_or_else(|| "-".to_string(), format_count)
    );
    if let Some(status) = &view.status {
        print_distribution(status, "Status");
    }
    if let Some(phase) = &view.phase {
        print_distribution(phase, "Phase");
    }
    if let Some(enrollment) = &view.enrollment {
        print_enrollment(enrollment);
    }
}

/// Slice colors come from the matching chart points.
fn print_distribution(view: &DistributionView, label: &str) {
    let colors: Vec<&str> = view
        .chart
        .series
        .first()
        .map(|series| {
            series
                .points
                .iter()
                .map(|point| point.color.as_deref().unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();
    let mut table = Table::new();
    table.set_header(vec![
        header_cell(label),
        header_cell("Studies"),
        header_cell("Share"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for (index, slice) in view.slices.iter().enumerate() {
        table.add_row(vec![
            colored_cell(&slice.label, colors.get(index).copied().unwrap_or_default()),
            Cell::new(format_count(slice.count)),
            Cell::new(format!("{}%", slice.percent)),
        ]);
    }
    println!("\n{}", view.chart.title);
    println!("{table}");
}

fn print_enrollment(view: &EnrollmentView) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Enrollment"), header_cell("Studies")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for bucket in &view.buckets {
        table.add_row(vec![Cell::new(&bucket.label), Cell::new(bucket.count)]);
    }
    println!("\n{}", view.chart.title);
    println!("{table}");
}

pub fn print_success_rate(view: &SuccessRateView) {
    if !view.filters.is_empty() {
        println!("{}", view.filters.join(" | "));
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Completed Studies"),
        header_cell("With Results"),
        header_cell("Success Rate"),
    ]);
    apply_table_style(&mut table);
    table.add_row(vec![
        Cell::new(format_count(view.total_completed)),
        Cell::new(format_count(view.total_with_results)),
        Cell::new(&view.success_rate).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    if let Some(chart) = &view.enrollment_chart {
        print_chart(chart);
    }
}

pub fn print_precedents(cases: &[&PrecedentCase]) {
    if cases.is_empty() {
        println!("No precedent cases match these filters");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Drug"),
        header_cell("Biomarker"),
        header_cell("Division"),
        header_cell("FDA Section"),
        header_cell("Strength"),
    ]);
    apply_table_style(&mut table);
    for case in cases {
        table.add_row(vec![
            Cell::new(&case.drug).add_attribute(Attribute::Bold),
            Cell::new(&case.biomarker),
            Cell::new(&case.division),
            Cell::new(&case.fda_section),
            Cell::new(format!("{} ({})", case.strength(), case.strength_score())),
        ]);
    }
    println!("{table}");
}

pub fn print_log(log: &ActivityLog) {
    eprintln!("Activity log:");
    for entry in log.iter() {
        eprintln!("  {entry}");
    }
}

fn print_fields(heading: &str, fields: &[DetailField]) {
    let mut table = Table::new();
    apply_table_style(&mut table);
    for field in fields {
        table.add_row(vec![header_cell(field.label), Cell::new(&field.value)]);
    }
    println!("\n{heading}:");
    println!("{table}");
}

fn print_text(heading: &str, text: Option<&str>) {
    if let Some(text) = text {
        println!("\n{heading}:\n{text}");
    }
}

fn print_list(heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("\n{heading}:");
    for item in items {
        println!("- {item}");
    }
}

/// Whole numbers print without decimals, everything else with two.
fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", v as i64),
        Some(v) => format!("{v:.2}"),
        None => "-".to_string(),
    }
}

/// Named terminal colors or `#RRGGBB`.
fn parse_color(name: &str) -> Option<Color> {
    if let Some(hex_digits) = name.strip_prefix('#') {
        let bytes = hex::decode(hex_digits).ok()?;
        return match bytes.as_slice() {
            [r, g, b] => Some(Color::Rgb {
                r: *r,
                g: *g,
                b: *b,
            }),
            _ => None,
        };
    }
    match name.to_ascii_lowercase().as_str() {
        "green" => Some(Color::Green),
        "blue" => Some(Color::Blue),
        "magenta" | "purple" => Some(Color::Magenta),
        "red" => Some(Color::Red),
        "yellow" | "orange" => Some(Color::Yellow),
        "cyan" => Some(Color::Cyan),
        "grey" | "gray" => Some(Color::Grey),
        _ => None,
    }
}

fn colored_cell(text: &str, color: &str) -> Cell {
    match parse_color(color) {
        Some(color) => Cell::new(text).fg(color),
        None => Cell::new(text),
    }
}

fn optional_cell(value: Option<&str>) -> Cell {
    value.map_or_else(|| dim_cell("-"), Cell::new)
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
