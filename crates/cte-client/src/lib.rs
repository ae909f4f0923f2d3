//! Client for the clinical trials explorer REST API.
//!
//! [`TrialsApi`] is the seam between the dashboard and the network;
//! [`HttpTrialsClient`] implements it with blocking `reqwest` calls.

pub mod client;
pub mod error;
pub mod query;

pub use client::{
    DEFAULT_BASE_URL, FETCH_ALL_DELAY, FetchProgress, HttpTrialsClient, SearchPage, TrialsApi,
    decode_envelope, fetch_all,
};
pub use error::{ApiError, Result};
pub use query::{FieldType, SearchQuery, SearchType, SuccessRateQuery};
