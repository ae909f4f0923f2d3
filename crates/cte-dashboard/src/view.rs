//! Declarative render tree for the search results and study detail panels.
//!
//! Views are plain data built from API payloads. Missing fields become
//! placeholder text, never errors.

use std::fmt;

use cte_client::SearchPage;
use cte_model::{Pagination, PlannedOutcome, Study, format_phase};
use cte_outcomes::{Heuristics, OutcomeVisualization, visualize_study};
use serde::Serialize;

pub const NOT_AVAILABLE: &str = "N/A";
pub const NOT_SPECIFIED: &str = "Not specified";

/// Locations listed before the remainder is summarised.
pub const MAX_LOCATIONS: usize = 10;

/// Formats a count with `,` thousands separators.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn text_or(value: Option<&str>, placeholder: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(placeholder)
        .to_string()
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty()).map(str::to_string)
}

/// One row of the results table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    pub nct_id: String,
    pub title: String,
    pub status: String,
    pub phase: String,
    pub has_results: bool,
}

impl ResultRow {
    pub const HEADERS: [&'static str; 5] = ["NCT ID", "Title", "Status", "Phase", "Has Results"];

    pub fn from_study(study: &Study) -> Self {
        let phases: Vec<String> = study
            .design()
            .map(|design| design.phases.iter().map(|p| format_phase(p)).collect())
            .unwrap_or_default();
        Self {
            nct_id: text_or(study.nct_id(), NOT_AVAILABLE),
            title: text_or(study.brief_title(), NOT_AVAILABLE),
            status: text_or(study.overall_status(), NOT_AVAILABLE),
            phase: if phases.is_empty() {
                NOT_AVAILABLE.to_string()
            } else {
                phases.join(", ")
            },
            has_results: study.has_results,
        }
    }

    pub fn has_results_label(&self) -> &'static str {
        if self.has_results { "Yes" } else { "No" }
    }

    pub fn cells(&self) -> [&str; 5] {
        [
            &self.nct_id,
            &self.title,
            &self.status,
            &self.phase,
            self.has_results_label(),
        ]
    }
}

/// Pager state derived from a response's pagination block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationDisplay {
    pub start: u64,
    pub end: u64,
    pub total: u64,
    pub current_page: u64,
    pub total_pages: u64,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    /// Hidden when there is nothing to page through.
    pub visible: bool,
}

impl PaginationDisplay {
    /// `requested_page` and `requested_size` stand in for fields the
    /// response leaves out.
    pub fn new(pagination: &Pagination, requested_page: u64, requested_size: u64) -> Self {
        let current_page = match pagination.current_page {
            0 => requested_page.max(1),
            page => page,
        };
        let page_size = match pagination.page_size {
            0 => requested_size.max(1),
            size => size,
        };
        let total = pagination.total_count;
        let start = (current_page - 1) * page_size + 1;
        let end = (start + page_size - 1).min(total);
        Self {
            start,
            end,
            total,
            current_page,
            total_pages: pagination.total_pages.max(1),
            prev_enabled: current_page > 1,
            next_enabled: pagination.has_next_page,
            visible: total > 0,
        }
    }

    pub fn range_text(&self) -> String {
        format!(
            "{}–{} of {}",
            format_count(self.start),
            format_count(self.end),
            format_count(self.total)
        )
    }

    pub fn page_text(&self) -> String {
        format!("Page {} of {}", self.current_page, self.total_pages)
    }
}

impl fmt::Display for PaginationDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.range_text())
    }
}

/// The results panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultsView {
    /// `Found {total} studies`, absent when the response had no pagination.
    pub stats_text: Option<String>,
    pub rows: Vec<ResultRow>,
    pub pagination: Option<PaginationDisplay>,
}

impl ResultsView {
    pub fn from_page(page: &SearchPage, requested_page: u64, requested_size: u64) -> Self {
        if page.studies.is_empty() {
            return Self::default();
        }
        let pagination = PaginationDisplay::new(&page.pagination, requested_page, requested_size);
        Self {
            stats_text: Some(format!("Found {} studies", format_count(pagination.total))),
            rows: page.studies.iter().map(ResultRow::from_study).collect(),
            pagination: Some(pagination),
        }
    }

    /// A single unpaged list, as produced by fetch-all.
    pub fn from_studies(studies: &[Study]) -> Self {
        if studies.is_empty() {
            return Self::default();
        }
        Self {
            stats_text: Some(format!("Found {} studies", format_count(studies.len() as u64))),
            rows: studies.iter().map(ResultRow::from_study).collect(),
            pagination: None,
        }
    }

    /// Whether to show the "no results" message.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailField {
    pub label: &'static str,
    pub value: String,
}

impl DetailField {
    fn new(label: &'static str, value: Option<String>) -> Self {
        Self {
            label,
            value: value.unwrap_or_else(|| NOT_SPECIFIED.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArmView {
    pub label: String,
    pub arm_type: Option<String>,
    pub description: Option<String>,
    pub interventions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedOutcomeView {
    pub measure: String,
    pub description: Option<String>,
    pub time_frame: Option<String>,
}

impl PlannedOutcomeView {
    fn from_planned(outcome: &PlannedOutcome) -> Self {
        Self {
            measure: text_or(outcome.measure.as_deref(), NOT_SPECIFIED),
            description: non_empty(outcome.description.as_ref()),
            time_frame: non_empty(outcome.time_frame.as_ref()),
        }
    }
}

/// The study detail panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyDetailView {
    pub nct_id: String,
    pub title: String,
    pub official_title: Option<String>,
    pub has_results: bool,
    pub phase: String,
    pub status: String,
    pub sponsor: String,
    /// Mentions treatment-resistant depression.
    pub trd_specific: bool,
    pub design: Vec<DetailField>,
    pub brief_summary: Option<String>,
    pub detailed_description: Option<String>,
    pub conditions: Vec<String>,
    pub keywords: Vec<String>,
    pub interventions: Vec<String>,
    pub arm_groups: Vec<ArmView>,
    pub eligibility: Vec<DetailField>,
    pub eligibility_criteria: Option<String>,
    pub locations: Vec<String>,
    /// `And N more locations...` when the list was cut.
    pub more_locations: Option<String>,
    pub primary_outcomes: Vec<PlannedOutcomeView>,
    pub secondary_outcomes: Vec<PlannedOutcomeView>,
    pub collaborators: Option<String>,
    pub outcome_visualizations: Vec<OutcomeVisualization>,
}

impl StudyDetailView {
    pub fn build(study: &Study, heuristics: &Heuristics) -> Self {
        let protocol = study.protocol_section.clone().unwrap_or_default();
        let identification = protocol.identification_module.unwrap_or_default();
        let status = protocol.status_module.unwrap_or_default();
        let design = protocol.design_module.unwrap_or_default();
        let description = protocol.description_module.unwrap_or_default();
        let sponsors = protocol.sponsor_collaborators_module.unwrap_or_default();
        let conditions = protocol.conditions_module.unwrap_or_default();
        let arms = protocol.arms_interventions_module.unwrap_or_default();
        let eligibility = protocol.eligibility_module.unwrap_or_default();
        let locations = protocol
            .contacts_locations_module
            .unwrap_or_default()
            .locations;
        let outcomes = protocol.outcomes_module.unwrap_or_default();

        let trd_specific = heuristics.is_trd_specific(
            [
                identification.brief_title.as_deref(),
                identification.official_title.as_deref(),
                description.brief_summary.as_deref(),
                description.detailed_description.as_deref(),
            ]
            .into_iter()
            .flatten(),
        );

        let phases: Vec<String> = design.phases.iter().map(|p| format_phase(p)).collect();
        let enrollment = design.enrollment_info.as_ref().and_then(|info| {
            let count = info.count.filter(|count| *count > 0)?;
            Some(match non_empty(info.enrollment_type.as_ref()) {
                Some(kind) => format!("{} ({kind})", format_count(count)),
                None => format_count(count),
            })
        });
        let design_fields = vec![
            DetailField::new("Study Type", non_empty(design.study_type.as_ref())),
            DetailField::new("Phases", (!phases.is_empty()).then(|| phases.join(", "))),
            DetailField::new("Enrollment", enrollment),
            DetailField::new(
                "Allocation",
                design
                    .design_info
                    .as_ref()
                    .and_then(|info| non_empty(info.allocation.as_ref())),
            ),
            DetailField::new(
                "Start Date",
                status
                    .start_date_struct
                    .as_ref()
                    .and_then(|date| non_empty(date.date.as_ref())),
            ),
            DetailField::new(
                "Completion Date",
                status
                    .completion_date_struct
                    .as_ref()
                    .and_then(|date| non_empty(date.date.as_ref())),
            ),
        ];

        let eligibility_fields = vec![
            DetailField::new("Sex", non_empty(eligibility.sex.as_ref())),
            DetailField::new("Minimum Age", non_empty(eligibility.minimum_age.as_ref())),
            DetailField::new("Maximum Age", non_empty(eligibility.maximum_age.as_ref())),
            DetailField::new(
                "Healthy Volunteers",
                eligibility
                    .healthy_volunteers
                    .map(|accepts| String::from(if accepts { "Yes" } else { "No" })),
            ),
        ];

        let interventions = arms
            .interventions
            .iter()
            .map(|intervention| {
                format!(
                    "{} - {}",
                    text_or(intervention.name.as_deref(), NOT_SPECIFIED),
                    intervention.intervention_type.as_deref().unwrap_or_default()
                )
            })
            .collect();

        let arm_groups = arms
            .arm_groups
            .iter()
            .map(|arm| ArmView {
                label: text_or(arm.label.as_deref(), NOT_SPECIFIED),
                arm_type: non_empty(arm.arm_type.as_ref()),
                description: non_empty(arm.description.as_ref()),
                interventions: arm.intervention_names.clone(),
            })
            .collect();

        let location_lines = locations
            .iter()
            .take(MAX_LOCATIONS)
            .map(|location| {
                let mut line = text_or(location.facility.as_deref(), "Unnamed Facility");
                for part in [&location.city, &location.state, &location.country] {
                    if let Some(part) = non_empty(part.as_ref()) {
                        line.push_str(", ");
                        line.push_str(&part);
                    }
                }
                if let Some(status) = non_empty(location.status.as_ref()) {
                    line.push_str(&format!(" ({status})"));
                }
                line
            })
            .collect();
        let more_locations = (locations.len() > MAX_LOCATIONS)
            .then(|| format!("And {} more locations...", locations.len() - MAX_LOCATIONS));

        let collaborators: Vec<String> = sponsors
            .collaborators
            .iter()
            .filter_map(|c| non_empty(c.name.as_ref()))
            .collect();

        Self {
            nct_id: text_or(identification.nct_id.as_deref(), NOT_AVAILABLE),
            title: text_or(identification.brief_title.as_deref(), NOT_AVAILABLE),
            official_title: non_empty(identification.official_title.as_ref()),
            has_results: study.has_results,
            phase: study
                .primary_phase()
                .map_or_else(|| NOT_AVAILABLE.to_string(), format_phase),
            status: text_or(status.overall_status.as_deref(), NOT_AVAILABLE),
            sponsor: text_or(
                sponsors
                    .lead_sponsor
                    .as_ref()
                    .and_then(|sponsor| sponsor.name.as_deref()),
                NOT_SPECIFIED,
            ),
            trd_specific,
            design: design_fields,
            brief_summary: non_empty(description.brief_summary.as_ref()),
            detailed_description: non_empty(description.detailed_description.as_ref()),
            conditions: conditions.conditions,
            keywords: conditions.keywords,
            interventions,
            arm_groups,
            eligibility: eligibility_fields,
            eligibility_criteria: non_empty(eligibility.eligibility_criteria.as_ref()),
            locations: location_lines,
            more_locations,
            primary_outcomes: outcomes
                .primary_outcomes
                .iter()
                .map(PlannedOutcomeView::from_planned)
                .collect(),
            secondary_outcomes: outcomes
                .secondary_outcomes
                .iter()
                .map(PlannedOutcomeView::from_planned)
                .collect(),
            collaborators: (!collaborators.is_empty()).then(|| collaborators.join(", ")),
            outcome_visualizations: visualize_study(study, heuristics),
        }
    }

    /// Badge color for the overall status.
    pub fn status_color<'h>(&self, heuristics: &'h Heuristics) -> &'h str {
        heuristics.status_color(&self.status)
    }
}
