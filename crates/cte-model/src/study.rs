//! Study records as returned by the registry (API v2 shape).
//!
//! Only the modules the dashboard reads are modelled. Unknown keys are
//! ignored and absent modules deserialize as `None`.

use serde::{Deserialize, Serialize};

use crate::de::null_as_default;
use crate::outcome::OutcomeMeasure;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Study {
    pub protocol_section: Option<ProtocolSection>,
    pub results_section: Option<ResultsSection>,
    pub has_results: bool,
}

impl Study {
    pub fn identification(&self) -> Option<&IdentificationModule> {
        self.protocol_section.as_ref()?.identification_module.as_ref()
    }

    pub fn status(&self) -> Option<&StatusModule> {
        self.protocol_section.as_ref()?.status_module.as_ref()
    }

    pub fn design(&self) -> Option<&DesignModule> {
        self.protocol_section.as_ref()?.design_module.as_ref()
    }

    pub fn description(&self) -> Option<&DescriptionModule> {
        self.protocol_section.as_ref()?.description_module.as_ref()
    }

    pub fn nct_id(&self) -> Option<&str> {
        self.identification()?.nct_id.as_deref()
    }

    pub fn brief_title(&self) -> Option<&str> {
        self.identification()?.brief_title.as_deref()
    }

    pub fn overall_status(&self) -> Option<&str> {
        self.status()?.overall_status.as_deref()
    }

    /// First listed phase, the one used for sorting and badges.
    pub fn primary_phase(&self) -> Option<&str> {
        self.design()?.phases.first().map(String::as_str)
    }

    /// Reported outcome measures, empty when the study has no results.
    pub fn outcome_measures(&self) -> &[OutcomeMeasure] {
        self.results_section
            .as_ref()
            .and_then(|results| results.outcome_measures_module.as_ref())
            .map_or(&[], |module| module.outcome_measures.as_slice())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProtocolSection {
    pub identification_module: Option<IdentificationModule>,
    pub status_module: Option<StatusModule>,
    pub design_module: Option<DesignModule>,
    pub description_module: Option<DescriptionModule>,
    pub sponsor_collaborators_module: Option<SponsorCollaboratorsModule>,
    pub conditions_module: Option<ConditionsModule>,
    pub arms_interventions_module: Option<ArmsInterventionsModule>,
    pub eligibility_module: Option<EligibilityModule>,
    pub contacts_locations_module: Option<ContactsLocationsModule>,
    pub outcomes_module: Option<OutcomesModule>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdentificationModule {
    pub nct_id: Option<String>,
    pub brief_title: Option<String>,
    pub official_title: Option<String>,
    pub acronym: Option<String>,
    pub organization: Option<Organization>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Organization {
    pub full_name: Option<String>,
    #[serde(rename = "class")]
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusModule {
    pub overall_status: Option<String>,
    pub start_date_struct: Option<DateStruct>,
    pub primary_completion_date_struct: Option<DateStruct>,
    pub completion_date_struct: Option<DateStruct>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DateStruct {
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub date_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DesignModule {
    pub study_type: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub phases: Vec<String>,
    pub enrollment_info: Option<EnrollmentInfo>,
    pub design_info: Option<DesignInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnrollmentInfo {
    pub count: Option<u64>,
    #[serde(rename = "type")]
    pub enrollment_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DesignInfo {
    pub allocation: Option<String>,
    pub intervention_model: Option<String>,
    pub primary_purpose: Option<String>,
    pub masking_info: Option<MaskingInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaskingInfo {
    pub masking: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DescriptionModule {
    pub brief_summary: Option<String>,
    pub detailed_description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SponsorCollaboratorsModule {
    pub lead_sponsor: Option<Sponsor>,
    #[serde(deserialize_with = "null_as_default")]
    pub collaborators: Vec<Sponsor>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Sponsor {
    pub name: Option<String>,
    #[serde(rename = "class")]
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConditionsModule {
    #[serde(deserialize_with = "null_as_default")]
    pub conditions: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArmsInterventionsModule {
    #[serde(deserialize_with = "null_as_default")]
    pub arm_groups: Vec<ArmGroup>,
    #[serde(deserialize_with = "null_as_default")]
    pub interventions: Vec<Intervention>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArmGroup {
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub arm_type: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub intervention_names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Intervention {
    #[serde(rename = "type")]
    pub intervention_type: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EligibilityModule {
    pub eligibility_criteria: Option<String>,
    pub healthy_volunteers: Option<bool>,
    pub sex: Option<String>,
    pub minimum_age: Option<String>,
    pub maximum_age: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactsLocationsModule {
    #[serde(deserialize_with = "null_as_default")]
    pub locations: Vec<Location>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Location {
    pub facility: Option<String>,
    pub status: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

/// Planned (protocol) outcomes, distinct from reported outcome measures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutcomesModule {
    #[serde(deserialize_with = "null_as_default")]
    pub primary_outcomes: Vec<PlannedOutcome>,
    #[serde(deserialize_with = "null_as_default")]
    pub secondary_outcomes: Vec<PlannedOutcome>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlannedOutcome {
    pub measure: Option<String>,
    pub description: Option<String>,
    pub time_frame: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResultsSection {
    pub outcome_measures_module: Option<OutcomeMeasuresModule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutcomeMeasuresModule {
    #[serde(deserialize_with = "null_as_default")]
    pub outcome_measures: Vec<OutcomeMeasure>,
}

/// Human-readable phase label: `PHASE1_PHASE2` becomes `Phase 1/Phase 2`,
/// `EARLY_PHASE1` becomes `Early Phase 1`, `NA` becomes `Not Applicable`.
pub fn format_phase(phase: &str) -> String {
    let trimmed = phase.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("N/A") {
        return "N/A".to_string();
    }
    if trimmed.eq_ignore_ascii_case("NA") {
        return "Not Applicable".to_string();
    }
    let upper = trimmed.to_ascii_uppercase();
    let mut parts = Vec::new();
    let mut rest = upper.as_str();
    while !rest.is_empty() {
        let (early, tail) = match rest.strip_prefix("EARLY_") {
            Some(tail) => (true, tail),
            None => (false, rest),
        };
        let Some(tail) = tail.strip_prefix("PHASE") else {
            return trimmed.to_string();
        };
        let digits: String = tail.chars().take_while(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return trimmed.to_string();
        }
        parts.push(if early {
            format!("Early Phase {digits}")
        } else {
            format!("Phase {digits}")
        });
        rest = tail[digits.len()..].trim_start_matches('_');
    }
    parts.join("/")
}
