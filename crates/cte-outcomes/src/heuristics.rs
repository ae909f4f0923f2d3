//! Keyword lookup tables behind the dashboard's text heuristics.
//!
//! Every list can be replaced from a TOML file; omitted keys keep their
//! built-in values. Matching is case-insensitive substring containment, so
//! misclassification is possible and accepted.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{HeuristicsError, Result};

const LOWER_IS_BETTER_TERMS: &[&str] = &[
    "depression",
    "anxiety",
    "stress",
    "pain",
    "fatigue",
    "symptom",
    "adverse",
    "negative",
    "score",
    "ham-d",
    "hamd",
    "madrs",
    "phq",
    "hamilton",
    "montgomery",
    "qids",
    "beck",
    "bdi",
    "gad",
    "panss",
];

const TRD_TERMS: &[&str] = &[
    "treatment-resistant depression",
    "treatment resistant depression",
    "trd",
    "refractory depression",
    "treatment-refractory depression",
];

const CONTROL_ARM_TERMS: &[&str] = &["placebo", "control"];

const EXPERIMENTAL_ARM_TERMS: &[&str] = &["experimental", "treatment", "intervention"];

const STATUS_COLORS: &[(&str, &str)] = &[
    ("RECRUITING", "green"),
    ("ACTIVE_NOT_RECRUITING", "blue"),
    ("COMPLETED", "magenta"),
    ("WITHDRAWN", "red"),
    ("TERMINATED", "red"),
    ("SUSPENDED", "red"),
];

const PHASE_COLORS: &[(&str, &str)] = &[
    ("EARLY_PHASE1", "#1ABC9C"),
    ("PHASE1", "#2ECC71"),
    ("PHASE2", "#3498DB"),
    ("PHASE3", "#9B59B6"),
    ("PHASE4", "#E74C3C"),
    ("NA", "#95A5A6"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heuristics {
    /// Outcome-title terms for which a lower value means improvement.
    pub lower_is_better_terms: Vec<String>,
    /// Terms that flag a study as specific to treatment-resistant depression.
    pub trd_terms: Vec<String>,
    pub control_arm_terms: Vec<String>,
    pub experimental_arm_terms: Vec<String>,
    /// Overall status (registry enum) to display color.
    pub status_colors: BTreeMap<String, String>,
    /// Phase (registry enum) to display color.
    pub phase_colors: BTreeMap<String, String>,
    pub default_color: String,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            lower_is_better_terms: to_strings(LOWER_IS_BETTER_TERMS),
            trd_terms: to_strings(TRD_TERMS),
            control_arm_terms: to_strings(CONTROL_ARM_TERMS),
            experimental_arm_terms: to_strings(EXPERIMENTAL_ARM_TERMS),
            status_colors: to_map(STATUS_COLORS),
            phase_colors: to_map(PHASE_COLORS),
            default_color: "grey".to_string(),
        }
    }
}

impl Heuristics {
    /// Load tables from a TOML file. Unlike settings, an explicitly named
    /// heuristics file that cannot be read is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| HeuristicsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| HeuristicsError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Whether lower values of the titled outcome indicate improvement.
    ///
    /// A missing title defaults to "higher is better".
    pub fn is_lower_value_better(&self, title: Option<&str>) -> bool {
        title.is_some_and(|title| contains_any(title, &self.lower_is_better_terms))
    }

    /// Whether any of the given texts mentions a TRD term.
    pub fn is_trd_specific<'a>(&self, texts: impl IntoIterator<Item = &'a str>) -> bool {
        texts
            .into_iter()
            .any(|text| contains_any(text, &self.trd_terms))
    }

    pub fn is_control_arm(&self, title: &str) -> bool {
        contains_any(title, &self.control_arm_terms)
    }

    pub fn is_experimental_arm(&self, title: &str) -> bool {
        contains_any(title, &self.experimental_arm_terms)
    }

    pub fn status_color(&self, status: &str) -> &str {
        lookup(&self.status_colors, status).unwrap_or(&self.default_color)
    }

    pub fn phase_color(&self, phase: &str) -> &str {
        lookup(&self.phase_colors, phase).unwrap_or(&self.default_color)
    }
}

fn contains_any(text: &str, terms: &[String]) -> bool {
    let lower = text.to_lowercase();
    terms
        .iter()
        .any(|term| !term.is_empty() && lower.contains(&term.to_lowercase()))
}

fn lookup<'a>(map: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    let key = key.trim();
    map.get(key)
        .or_else(|| {
            map.iter()
                .find(|(candidate, _)| candidate.eq_ignore_ascii_case(key))
                .map(|(_, color)| color)
        })
        .map(String::as_str)
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

fn to_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}
