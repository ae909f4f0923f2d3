//! Query parameters for the search and analysis endpoints.

use std::fmt;
use std::str::FromStr;

/// Which search field the free-text term is sent as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SearchType {
    /// Full-text query across all fields.
    #[default]
    Term,
    Condition,
    Intervention,
    Sponsor,
    Location,
    Patient,
    /// Direct study lookup; no search request is made.
    NctId,
}

impl SearchType {
    pub const ALL: [Self; 7] = [
        Self::Term,
        Self::Condition,
        Self::Intervention,
        Self::Sponsor,
        Self::Location,
        Self::Patient,
        Self::NctId,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Term => "term",
            Self::Condition => "cond",
            Self::Intervention => "intr",
            Self::Sponsor => "spons",
            Self::Location => "locn",
            Self::Patient => "patient",
            Self::NctId => "id",
        }
    }

    /// Query parameter carrying the term.
    fn param(self) -> &'static str {
        match self {
            Self::Condition => "condition",
            Self::Intervention => "intervention",
            Self::Sponsor => "sponsor",
            Self::Location => "location",
            Self::Patient => "patientData",
            Self::Term | Self::NctId => "query",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lower)
            .or(match lower.as_str() {
                "condition" => Some(Self::Condition),
                "intervention" => Some(Self::Intervention),
                "sponsor" => Some(Self::Sponsor),
                "location" => Some(Self::Location),
                "nct" | "nct-id" => Some(Self::NctId),
                _ => None,
            })
            .ok_or_else(|| format!("unknown search type: {s}"))
    }
}

/// A study search as sent to `/api/studies/search`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub search_type: SearchType,
    pub term: String,
    pub phase: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
    /// Restrict to studies with (or without) posted results.
    pub has_results: Option<bool>,
    /// Registry query-language expression, e.g. `AREA[Phase]PHASE3`.
    pub advanced: Option<String>,
    /// Comma-separated field selector.
    pub fields: Option<String>,
    pub count_total: bool,
    /// 1-based page number.
    pub page: u64,
    pub page_size: u64,
    pub page_token: Option<String>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            search_type: SearchType::Term,
            term: String::new(),
            phase: None,
            status: None,
            sort: None,
            has_results: None,
            advanced: None,
            fields: None,
            count_total: true,
            page: 1,
            page_size: 20,
            page_token: None,
        }
    }
}

impl SearchQuery {
    pub fn new(search_type: SearchType, term: impl Into<String>) -> Self {
        Self {
            search_type,
            term: term.into().trim().to_string(),
            ..Self::default()
        }
    }

    /// A non-`term` search needs something to search for.
    pub fn is_missing_term(&self) -> bool {
        self.term.trim().is_empty() && self.search_type != SearchType::Term
    }

    /// Combined `advanced` expression, with the results filter first.
    pub fn advanced_expression(&self) -> Option<String> {
        let results = self.has_results.map(|flag| format!("AREA[HasResults]{flag}"));
        let user = self
            .advanced
            .as_deref()
            .map(str::trim)
            .filter(|expr| !expr.is_empty())
            .map(str::to_string);
        match (results, user) {
            (Some(results), Some(user)) => Some(format!("{results} AND {user}")),
            (results, user) => results.or(user),
        }
    }

    /// Query parameters in a stable order.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if !self.term.is_empty() {
            params.push((self.search_type.param(), self.term.clone()));
        }
        params.push(("page", self.page.to_string()));
        params.push(("pageSize", self.page_size.to_string()));
        push_opt(&mut params, "pageToken", self.page_token.as_deref());
        push_opt(&mut params, "fields", self.fields.as_deref());
        push_opt(&mut params, "phase", self.phase.as_deref());
        push_opt(&mut params, "status", self.status.as_deref());
        push_opt(&mut params, "sort", self.sort.as_deref());
        push_opt(&mut params, "advanced", self.advanced_expression().as_deref());
        if self.count_total {
            params.push(("countTotal", "true".to_string()));
        }
        params
    }
}

/// Filters of `/api/analysis/success-rates`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuccessRateQuery {
    pub condition: Option<String>,
    pub intervention: Option<String>,
    pub phase: Option<String>,
}

impl SuccessRateQuery {
    /// At least a condition or an intervention is required.
    pub fn is_empty(&self) -> bool {
        blank(self.condition.as_deref()) && blank(self.intervention.as_deref())
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        push_opt(&mut params, "condition", self.condition.as_deref());
        push_opt(&mut params, "intervention", self.intervention.as_deref());
        push_opt(&mut params, "phase", self.phase.as_deref());
        params
    }
}

/// Value type of a field-value statistics request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Enum,
    Integer,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enum => "ENUM",
            Self::Integer => "INTEGER",
        }
    }
}

fn push_opt(params: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        params.push((key, value.to_string()));
    }
}

fn blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_search_params() {
        let query = SearchQuery::new(SearchType::Condition, " diabetes ");
        assert_eq!(
            query.to_params(),
            vec![
                ("condition", "diabetes".to_string()),
                ("page", "1".to_string()),
                ("pageSize", "20".to_string()),
                ("countTotal", "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_has_results_combines_with_advanced() {
        let query = SearchQuery {
            has_results: Some(true),
            advanced: Some("AREA[Phase]PHASE3".to_string()),
            ..SearchQuery::default()
        };
        assert_eq!(
            query.advanced_expression().as_deref(),
            Some("AREA[HasResults]true AND AREA[Phase]PHASE3")
        );

        let only_results = SearchQuery {
            has_results: Some(false),
            ..SearchQuery::default()
        };
        assert_eq!(
            only_results.advanced_expression().as_deref(),
            Some("AREA[HasResults]false")
        );
    }

    #[test]
    fn test_missing_term_only_for_typed_search() {
        assert!(!SearchQuery::new(SearchType::Term, "").is_missing_term());
        assert!(SearchQuery::new(SearchType::Sponsor, "  ").is_missing_term());
        assert!(!SearchQuery::new(SearchType::Sponsor, "Pfizer").is_missing_term());
    }

    #[test]
    fn test_search_type_parses_short_and_long_names() {
        assert_eq!("cond".parse::<SearchType>(), Ok(SearchType::Condition));
        assert_eq!("Intervention".parse::<SearchType>(), Ok(SearchType::Intervention));
        assert_eq!("id".parse::<SearchType>(), Ok(SearchType::NctId));
        assert!("drug".parse::<SearchType>().is_err());
    }

    #[test]
    fn test_success_rate_params() {
        let query = SuccessRateQuery {
            condition: Some("asthma".to_string()),
            intervention: Some(" ".to_string()),
            phase: Some("PHASE3".to_string()),
        };
        assert!(!query.is_empty());
        assert_eq!(
            query.to_params(),
            vec![
                ("condition", "asthma".to_string()),
                ("phase", "PHASE3".to_string()),
            ]
        );
        assert!(SuccessRateQuery::default().is_empty());
    }
}
