//! Shared data model for the clinical trials explorer.
//!
//! Everything here mirrors the registry's JSON: camelCase keys, optional
//! scalars and defaulted collections, so partially populated payloads still
//! load.

pub mod api;
mod de;
pub mod error;
pub mod ids;
pub mod outcome;
pub mod precedent;
pub mod stats;
pub mod study;

pub use api::{ApiEnvelope, Pagination, SearchData, SearchResponse, StudyResponse};
pub use error::{ModelError, Result};
pub use ids::NctId;
pub use outcome::{
    Analysis, Category, Denom, DenomCount, DispersionType, Group, Measurement, OutcomeClass,
    OutcomeMeasure, OutcomeType, ParamType,
};
pub use precedent::{BiomarkerData, CaseStrength, PrecedentCase, Publication};
pub use stats::{
    AnalysisFilter, FieldValueStats, SizeStats, SuccessRateAnalysis, SuccessRateOverview,
    ValueCount,
};
pub use study::{PlannedOutcome, Study, format_phase};

/// Parses a precedent dataset (a JSON array of cases).
pub fn parse_precedents(json: &str) -> Result<Vec<PrecedentCase>> {
    Ok(serde_json::from_str(json)?)
}
