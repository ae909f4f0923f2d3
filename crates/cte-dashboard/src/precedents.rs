//! Static library of biomarker-driven approval precedents.

use cte_model::{CaseStrength, ModelError, PrecedentCase, parse_precedents};

const EMBEDDED_PRECEDENTS: &str = include_str!("../data/precedents.json");

/// Filters applied to the precedent library. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrecedentFilter {
    /// Exact division name, compared case-insensitively.
    pub division: Option<String>,
    pub biomarker: Option<String>,
    pub drug: Option<String>,
    pub fda_section: Option<String>,
    pub strength: Option<CaseStrength>,
}

impl PrecedentFilter {
    pub fn matches(&self, case: &PrecedentCase) -> bool {
        let division = self
            .division
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .is_none_or(|d| case.division.eq_ignore_ascii_case(d));
        division
            && contains(&case.biomarker, self.biomarker.as_deref())
            && contains(&case.drug, self.drug.as_deref())
            && contains(&case.fda_section, self.fda_section.as_deref())
            && self.strength.is_none_or(|s| case.strength() == s)
    }
}

fn contains(haystack: &str, needle: Option<&str>) -> bool {
    needle
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .is_none_or(|n| haystack.to_lowercase().contains(&n.to_lowercase()))
}

#[derive(Debug, Clone, Default)]
pub struct PrecedentLibrary {
    cases: Vec<PrecedentCase>,
}

impl PrecedentLibrary {
    /// The dataset compiled into the binary.
    pub fn embedded() -> Result<Self, ModelError> {
        Self::from_json(EMBEDDED_PRECEDENTS)
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(Self {
            cases: parse_precedents(json)?,
        })
    }

    pub fn cases(&self) -> &[PrecedentCase] {
        &self.cases
    }

    pub fn get(&self, id: &str) -> Option<&PrecedentCase> {
        self.cases.iter().find(|case| case.id == id)
    }

    /// Matching cases, strongest first; ties keep dataset order.
    pub fn search(&self, filter: &PrecedentFilter) -> Vec<&PrecedentCase> {
        let mut found: Vec<&PrecedentCase> =
            self.cases.iter().filter(|case| filter.matches(case)).collect();
        found.sort_by(|a, b| b.strength_score().cmp(&a.strength_score()));
        found
    }

    /// Distinct divisions in dataset order.
    pub fn divisions(&self) -> Vec<&str> {
        let mut divisions: Vec<&str> = Vec::new();
        for case in &self.cases {
            if !divisions.contains(&case.division.as_str()) {
                divisions.push(&case.division);
            }
        }
        divisions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_dataset_loads() {
        let library = PrecedentLibrary::embedded().unwrap();
        assert_eq!(library.cases().len(), 31);
        assert_eq!(
            library.divisions(),
            vec![
                "Neurology",
                "Pulmonary",
                "Psychiatry",
                "Cardiology",
                "Infectious Diseases"
            ]
        );
        assert_eq!(
            library.get("carbamazepine-hla").map(PrecedentCase::strength),
            Some(CaseStrength::Bulletproof)
        );
        assert_eq!(
            library.get("vortioxetine-cyp2d6").map(PrecedentCase::strength),
            Some(CaseStrength::Moderate)
        );
    }

    #[test]
    fn test_descriptive_counts_are_omitted() {
        let library = PrecedentLibrary::embedded().unwrap();
        let clopidogrel = library.get("clopidogrel-cyp2c19").unwrap();
        assert_eq!(clopidogrel.enrollment, None);
        assert_eq!(clopidogrel.biomarker_data.total_tested, None);
        assert_eq!(clopidogrel.biomarker_data.enrichment_level, 70.0);
    }

    #[test]
    fn test_filters() {
        let library = PrecedentLibrary::embedded().unwrap();

        let neurology = library.search(&PrecedentFilter {
            division: Some("neurology".to_string()),
            ..PrecedentFilter::default()
        });
        let ids: Vec<&str> = neurology.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "carbamazepine-hla",
                "nusinersen-smn1",
                "patisiran-ttr",
                "viltolarsen-dmd",
                "risdiplam-smn1",
                "onasemnogene-smn1",
                "tofersen-sod1",
                "eteplirsen-dmd"
            ]
        );

        let partial_division = library.search(&PrecedentFilter {
            division: Some("neuro".to_string()),
            ..PrecedentFilter::default()
        });
        assert!(partial_division.is_empty());

        let cftr = library.search(&PrecedentFilter {
            biomarker: Some("cftr".to_string()),
            fda_section: Some("Pulmonary".to_string()),
            ..PrecedentFilter::default()
        });
        assert_eq!(cftr.len(), 5);
        assert_eq!(cftr[0].drug, "Ivacaftor (Kalydeco)");

        let cyp2d6 = library.search(&PrecedentFilter {
            biomarker: Some("CYP2D6".to_string()),
            ..PrecedentFilter::default()
        });
        let ids: Vec<&str> = cyp2d6.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "atomoxetine-cyp2d6",
                "vortioxetine-cyp2d6",
                "brexpiprazole-cyp2d6",
                "aripiprazole-cyp2d6"
            ]
        );

        let strong_cardiology = library.search(&PrecedentFilter {
            division: Some("Cardiology".to_string()),
            strength: Some(CaseStrength::Strong),
            ..PrecedentFilter::default()
        });
        let ids: Vec<&str> = strong_cardiology.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["clopidogrel-cyp2c19", "prasugrel-cyp2c19"]);
    }

    #[test]
    fn test_results_ordered_by_strength() {
        let library = PrecedentLibrary::embedded().unwrap();
        let found = library.search(&PrecedentFilter::default());
        assert_eq!(found.len(), 31);
        assert!(
            found
                .windows(2)
                .all(|pair| pair[0].strength_score() >= pair[1].strength_score())
        );
        let top: Vec<(&str, u32)> = found[..3]
            .iter()
            .map(|c| (c.id.as_str(), c.strength_score()))
            .collect();
        assert_eq!(
            top,
            vec![
                ("carbamazepine-hla", 100),
                ("abacavir-hla", 100),
                ("ivacaftor-cftr", 80)
            ]
        );
    }
}
