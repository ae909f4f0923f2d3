//! Aggregate statistics payloads (field-value histograms, sizes, success rates).

use serde::{Deserialize, Serialize};

use crate::de::scalar_text;

/// Histogram or numeric summary of one registry field.
///
/// ENUM fields carry `topValues`; INTEGER fields carry `min`/`max`/`avg`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldValueStats {
    pub field: String,
    pub piece: Option<String>,
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    pub missing_studies_count: Option<u64>,
    pub unique_values_count: Option<u64>,
    pub top_values: Vec<ValueCount>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValueCount {
    /// Field value; numeric histogram values are kept in their text form.
    #[serde(deserialize_with = "scalar_text")]
    pub value: Option<String>,
    pub studies_count: u64,
}

/// `/stats/size` summary of the whole registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SizeStats {
    pub total_studies: u64,
    pub average_size_bytes: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SuccessRateAnalysis {
    pub overview: SuccessRateOverview,
    pub enrollment_stats: Vec<FieldValueStats>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SuccessRateOverview {
    pub total_completed_studies: u64,
    pub total_with_results: u64,
    /// Percentage formatted with two decimals, e.g. `"42.17"`.
    #[serde(deserialize_with = "scalar_text")]
    pub success_rate: Option<String>,
    pub filter: AnalysisFilter,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisFilter {
    pub condition: Option<String>,
    pub intervention: Option<String>,
    pub phase: Option<String>,
}

impl AnalysisFilter {
    pub fn is_empty(&self) -> bool {
        [&self.condition, &self.intervention, &self.phase]
            .iter()
            .all(|value| value.as_deref().is_none_or(|v| v.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_values_accept_numbers_and_strings() {
        let stats: Vec<FieldValueStats> = serde_json::from_str(
            r#"[{"field": "EnrollmentCount", "type": "INTEGER",
                 "topValues": [{"value": 100, "studiesCount": 7}, {"value": "40", "studiesCount": 3}],
                 "min": 0, "max": 90000, "avg": 412.5}]"#,
        )
        .unwrap();
        let values: Vec<_> = stats[0]
            .top_values
            .iter()
            .map(|v| v.value.as_deref())
            .collect();
        assert_eq!(values, vec![Some("100"), Some("40")]);
        assert_eq!(stats[0].avg, Some(412.5));
    }

    #[test]
    fn success_rate_accepts_string_percentage() {
        let analysis: SuccessRateAnalysis = serde_json::from_str(
            r#"{"overview": {"totalCompletedStudies": 200, "totalWithResults": 50,
                "successRate": "25.00", "filter": {"condition": "asthma"}}}"#,
        )
        .unwrap();
        assert_eq!(analysis.overview.success_rate.as_deref(), Some("25.00"));
        assert!(!analysis.overview.filter.is_empty());
        assert!(analysis.enrollment_stats.is_empty());
    }
}
