//! Reported outcome measures from the registry's results section.
//!
//! Every nested collection defaults to empty and every scalar is optional, so a
//! partially populated record still deserializes. Measurement values stay as
//! the registry's numeric strings; parsing is left to the consumer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::de::{null_as_default, scalar_text};

/// Whether an outcome measure is a primary or secondary endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OutcomeType {
    Primary,
    Secondary,
    /// Other registry values (`OTHER_PRE_SPECIFIED`, `POST_HOC`, ...).
    Other(String),
}

impl OutcomeType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Primary => "PRIMARY",
            Self::Secondary => "SECONDARY",
            Self::Other(value) => value,
        }
    }
}

impl From<String> for OutcomeType {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "PRIMARY" => Self::Primary,
            "SECONDARY" => Self::Secondary,
            _ => Self::Other(value),
        }
    }
}

impl From<OutcomeType> for String {
    fn from(value: OutcomeType) -> Self {
        value.as_str().to_string()
    }
}

/// Statistic reported by each measurement of an outcome.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParamType {
    Mean,
    Median,
    LeastSquaresMean,
    GeometricMean,
    Number,
    CountOfParticipants,
    CountOfUnits,
    Other(String),
}

impl ParamType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Mean => "MEAN",
            Self::Median => "MEDIAN",
            Self::LeastSquaresMean => "LEAST_SQUARES_MEAN",
            Self::GeometricMean => "GEOMETRIC_MEAN",
            Self::Number => "NUMBER",
            Self::CountOfParticipants => "COUNT_OF_PARTICIPANTS",
            Self::CountOfUnits => "COUNT_OF_UNITS",
            Self::Other(value) => value,
        }
    }

    /// Mean-like statistics that summarize a distribution per group.
    pub fn is_mean_like(&self) -> bool {
        matches!(
            self,
            Self::Mean | Self::LeastSquaresMean | Self::GeometricMean
        )
    }
}

impl From<String> for ParamType {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "MEAN" => Self::Mean,
            "MEDIAN" => Self::Median,
            "LEAST_SQUARES_MEAN" => Self::LeastSquaresMean,
            "GEOMETRIC_MEAN" => Self::GeometricMean,
            "NUMBER" => Self::Number,
            "COUNT_OF_PARTICIPANTS" => Self::CountOfParticipants,
            "COUNT_OF_UNITS" => Self::CountOfUnits,
            _ => Self::Other(value),
        }
    }
}

impl From<ParamType> for String {
    fn from(value: ParamType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dispersion statistic attached to the measurements of an outcome.
///
/// The registry has used both `STANDARD_DEVIATION` and `Standard Deviation`
/// spellings; both parse to the same variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DispersionType {
    StandardDeviation,
    StandardError,
    Other(String),
}

impl DispersionType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::StandardDeviation => "STANDARD_DEVIATION",
            Self::StandardError => "STANDARD_ERROR",
            Self::Other(value) => value,
        }
    }

    pub fn is_variance(&self) -> bool {
        matches!(self, Self::StandardDeviation | Self::StandardError)
    }
}

impl From<String> for DispersionType {
    fn from(value: String) -> Self {
        let normalized = value.trim().to_ascii_uppercase().replace(' ', "_");
        match normalized.as_str() {
            "STANDARD_DEVIATION" => Self::StandardDeviation,
            "STANDARD_ERROR" => Self::StandardError,
            _ => Self::Other(value),
        }
    }
}

impl From<DispersionType> for String {
    fn from(value: DispersionType) -> Self {
        value.as_str().to_string()
    }
}

/// One reported endpoint of a trial.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutcomeMeasure {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub outcome_type: Option<OutcomeType>,
    pub time_frame: Option<String>,
    pub param_type: Option<ParamType>,
    pub unit_of_measure: Option<String>,
    pub dispersion_type: Option<DispersionType>,
    #[serde(deserialize_with = "null_as_default")]
    pub groups: Vec<Group>,
    #[serde(deserialize_with = "null_as_default")]
    pub denoms: Vec<Denom>,
    #[serde(deserialize_with = "null_as_default")]
    pub classes: Vec<OutcomeClass>,
    #[serde(deserialize_with = "null_as_default")]
    pub analyses: Vec<Analysis>,
}

impl OutcomeMeasure {
    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|group| group.id == id)
    }

    pub fn is_primary(&self) -> bool {
        self.outcome_type == Some(OutcomeType::Primary)
    }

    pub fn is_secondary(&self) -> bool {
        self.outcome_type == Some(OutcomeType::Secondary)
    }

    pub fn reports_standard_error(&self) -> bool {
        self.dispersion_type == Some(DispersionType::StandardError)
    }

    /// Sample size of a group from the first denominator block.
    pub fn denominator_for(&self, group_id: &str) -> Option<&str> {
        self.denoms
            .first()?
            .counts
            .iter()
            .find(|count| count.group_id == group_id)
            .and_then(|count| count.value.as_deref())
    }
}

/// A treatment arm of an outcome measure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Group {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Denom {
    pub units: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub counts: Vec<DenomCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DenomCount {
    #[serde(deserialize_with = "null_as_default")]
    pub group_id: String,
    #[serde(deserialize_with = "scalar_text")]
    pub value: Option<String>,
}

/// A stratification axis instance, e.g. a time point or an unnamed stratum.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutcomeClass {
    pub title: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub categories: Vec<Category>,
}

/// A sub-stratum of a class, e.g. a response bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Category {
    pub title: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub measurements: Vec<Measurement>,
}

/// One numeric observation tied to a group by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Measurement {
    #[serde(deserialize_with = "null_as_default")]
    pub group_id: String,
    #[serde(deserialize_with = "scalar_text")]
    pub value: Option<String>,
    #[serde(deserialize_with = "scalar_text")]
    pub spread: Option<String>,
    /// Older payloads carry the spread under this key.
    #[serde(deserialize_with = "scalar_text")]
    pub dispersion: Option<String>,
    #[serde(deserialize_with = "scalar_text")]
    pub lower_limit: Option<String>,
    #[serde(deserialize_with = "scalar_text")]
    pub upper_limit: Option<String>,
    pub comment: Option<String>,
    pub unit: Option<String>,
}

impl Measurement {
    /// The recorded value, if non-blank.
    pub fn value_text(&self) -> Option<&str> {
        non_blank(self.value.as_deref())
    }

    /// The recorded spread, falling back to the legacy `dispersion` key.
    pub fn spread_text(&self) -> Option<&str> {
        non_blank(self.spread.as_deref()).or_else(|| non_blank(self.dispersion.as_deref()))
    }
}

/// Statistical analysis attached to an outcome measure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Analysis {
    #[serde(deserialize_with = "null_as_default")]
    pub group_ids: Vec<String>,
    pub p_value: Option<String>,
    pub statistical_method: Option<String>,
    pub param_type: Option<String>,
    pub param_value: Option<String>,
    pub ci_pct_value: Option<String>,
    pub ci_lower_limit: Option<String>,
    pub ci_upper_limit: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}
