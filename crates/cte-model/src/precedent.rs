//! Biomarker-driven approval precedents used as reference material.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrecedentCase {
    pub id: String,
    pub drug: String,
    pub biomarker: String,
    pub division: String,
    pub nct_id: Option<String>,
    pub fda_section: String,
    pub title: String,
    pub phase: Option<String>,
    pub status: Option<String>,
    pub enrollment: Option<u64>,
    pub sponsor: Option<String>,
    pub primary_outcome: Option<String>,
    pub biomarker_data: BiomarkerData,
    /// Free-text result lines keyed by endpoint name.
    pub results: BTreeMap<String, String>,
    pub fda_impact: String,
    pub ema_alignment: String,
    pub publications: Vec<Publication>,
    pub sources: BTreeMap<String, String>,
    pub data_source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BiomarkerData {
    pub biomarker: Option<String>,
    pub strategy: Option<String>,
    pub population_split: Option<String>,
    pub total_tested: Option<u64>,
    pub biomarker_positive: Option<u64>,
    pub biomarker_negative: Option<u64>,
    /// Share of enrolled patients selected by the biomarker, 0 to 100.
    pub enrichment_level: f64,
    pub percent_positive_included: Option<f64>,
    pub percent_negative_included: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Publication {
    pub citation: String,
    pub pmid: Option<String>,
    pub link: Option<String>,
}

/// Qualitative strength of a precedent as regulatory evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CaseStrength {
    Moderate,
    Strong,
    Excellent,
    Bulletproof,
}

impl CaseStrength {
    pub fn from_score(score: u32) -> Self {
        match score {
            85.. => Self::Bulletproof,
            70.. => Self::Excellent,
            55.. => Self::Strong,
            _ => Self::Moderate,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Moderate => "Moderate",
            Self::Strong => "Strong",
            Self::Excellent => "Excellent",
            Self::Bulletproof => "Bulletproof",
        }
    }
}

impl fmt::Display for CaseStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CaseStrength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "moderate" => Ok(Self::Moderate),
            "strong" => Ok(Self::Strong),
            "excellent" => Ok(Self::Excellent),
            "bulletproof" => Ok(Self::Bulletproof),
            other => Err(format!("unknown case strength: {other}")),
        }
    }
}

impl PrecedentCase {
    /// Evidence score out of 100: enrichment level (up to 40), FDA impact
    /// wording (up to 30), EMA alignment wording (up to 20) and publication
    /// count (up to 10).
    pub fn strength_score(&self) -> u32 {
        let enrichment = self.biomarker_data.enrichment_level;
        let mut score = if enrichment >= 95.0 {
            40
        } else if enrichment >= 80.0 {
            30
        } else if enrichment >= 60.0 {
            20
        } else {
            10
        };

        let impact = self.fda_impact.to_lowercase();
        score += if impact.contains("mandated") || impact.contains("required") {
            30
        } else if impact.contains("warning") || impact.contains("label") {
            20
        } else {
            10
        };

        let alignment = self.ema_alignment.to_lowercase();
        score += if alignment.contains("identical") || alignment.contains("adopted") {
            20
        } else if alignment.contains("similar") {
            15
        } else {
            5
        };

        score += match self.publications.len() {
            0 => 0,
            1 => 5,
            _ => 10,
        };
        score
    }

    pub fn strength(&self) -> CaseStrength {
        CaseStrength::from_score(self.strength_score())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(enrichment: f64, impact: &str, alignment: &str, publications: usize) -> PrecedentCase {
        PrecedentCase {
            biomarker_data: BiomarkerData {
                enrichment_level: enrichment,
                ..BiomarkerData::default()
            },
            fda_impact: impact.to_string(),
            ema_alignment: alignment.to_string(),
            publications: vec![Publication::default(); publications],
            ..PrecedentCase::default()
        }
    }

    #[test]
    fn test_strength_thresholds() {
        let top = case(100.0, "FDA mandated genetic testing", "EMA adopted similar", 2);
        assert_eq!(top.strength_score(), 100);
        assert_eq!(top.strength(), CaseStrength::Bulletproof);

        let excellent = case(100.0, "First drug approved", "EMA approved with identical", 1);
        assert_eq!(excellent.strength_score(), 75);
        assert_eq!(excellent.strength(), CaseStrength::Excellent);

        let strong = case(80.0, "Boxed warning added", "Under review", 0);
        assert_eq!(strong.strength_score(), 55);
        assert_eq!(strong.strength(), CaseStrength::Strong);

        let moderate = case(10.0, "Approved", "Pending", 0);
        assert_eq!(moderate.strength_score(), 25);
        assert_eq!(moderate.strength(), CaseStrength::Moderate);
    }

    #[test]
    fn test_strength_parses_case_insensitively() {
        assert_eq!("strong".parse::<CaseStrength>(), Ok(CaseStrength::Strong));
        assert!("weak".parse::<CaseStrength>().is_err());
    }
}
