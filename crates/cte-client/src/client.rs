//! HTTP client for the dashboard REST endpoints.

use std::thread;
use std::time::Duration;

use cte_model::{
    ApiEnvelope, FieldValueStats, NctId, Pagination, SearchData, SizeStats, Study,
    SuccessRateAnalysis,
};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;

use crate::error::{ApiError, Result};
use crate::query::{FieldType, SearchQuery, SuccessRateQuery};

/// Default API base URL (the local dashboard server).
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Pause between pages when following `nextPageToken`.
pub const FETCH_ALL_DELAY: Duration = Duration::from_millis(300);

/// User agent string for API requests.
const USER_AGENT_VALUE: &str = concat!("trials-explorer/", env!("CARGO_PKG_VERSION"));

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub studies: Vec<Study>,
    pub pagination: Pagination,
}

impl SearchPage {
    /// Token for the following page, from the pagination block or the data block.
    pub fn next_page_token(&self) -> Option<&str> {
        self.pagination
            .next_page_token
            .as_deref()
            .filter(|token| !token.is_empty())
    }
}

/// Endpoints the dashboard consumes.
///
/// Implemented over HTTP by [`HttpTrialsClient`]; tests substitute an
/// in-memory fake.
pub trait TrialsApi {
    /// `GET /api/studies/search`
    fn search_studies(&self, query: &SearchQuery) -> Result<SearchPage>;

    /// `GET /api/studies/{nctId}`
    fn get_study(&self, nct_id: &NctId) -> Result<Study>;

    /// `GET /api/stats/field-values`
    fn field_values(&self, field: &str, field_type: FieldType) -> Result<Vec<FieldValueStats>>;

    /// `GET /api/stats/sizes`
    fn sizes(&self) -> Result<SizeStats>;

    /// `GET /api/analysis/success-rates`
    fn success_rates(&self, query: &SuccessRateQuery) -> Result<SuccessRateAnalysis>;
}

/// Progress of a [`fetch_all`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchProgress {
    pub pages: usize,
    pub studies: usize,
    pub total: Option<u64>,
}

/// Collects every study matching `query` by following page tokens.
///
/// Sleeps `delay` between page requests. The first failing page aborts the
/// whole run.
pub fn fetch_all<A, F>(
    api: &A,
    query: &SearchQuery,
    delay: Duration,
    mut on_page: F,
) -> Result<Vec<Study>>
where
    A: TrialsApi + ?Sized,
    F: FnMut(FetchProgress),
{
    let mut query = query.clone();
    query.page_token = None;
    let mut studies = Vec::new();
    let mut pages = 0;

    loop {
        let page = api.search_studies(&query)?;
        pages += 1;
        let next = page.next_page_token().map(str::to_string);
        let total = Some(page.pagination.total_count).filter(|count| *count > 0);
        studies.extend(page.studies);
        on_page(FetchProgress {
            pages,
            studies: studies.len(),
            total,
        });

        match next {
            Some(token) => {
                tracing::debug!(pages, fetched = studies.len(), "Following next page token");
                query.page_token = Some(token);
                query.page += 1;
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
            }
            None => break,
        }
    }

    Ok(studies)
}

/// Blocking HTTP implementation of [`TrialsApi`].
#[derive(Debug, Clone)]
pub struct HttpTrialsClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpTrialsClient {
    /// Creates a client for the API served at `base_url`.
    ///
    /// No timeout is applied unless one is given.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let mut builder = reqwest::blocking::Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> Result<ApiEnvelope<T>> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("Request: GET {}", url);

        let response = self.client.get(&url).query(params).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        decode_envelope(status, &body)
    }
}

impl TrialsApi for HttpTrialsClient {
    fn search_studies(&self, query: &SearchQuery) -> Result<SearchPage> {
        let envelope: ApiEnvelope<SearchData> =
            self.get("/api/studies/search", &query.to_params())?;
        Ok(search_page(envelope))
    }

    fn get_study(&self, nct_id: &NctId) -> Result<Study> {
        let path = format!("/api/studies/{nct_id}");
        into_data(self.get(&path, &[])?)
    }

    fn field_values(&self, field: &str, field_type: FieldType) -> Result<Vec<FieldValueStats>> {
        let params = [
            ("fields", field.to_string()),
            ("types", field_type.as_str().to_string()),
        ];
        into_data(self.get("/api/stats/field-values", &params)?)
    }

    fn sizes(&self) -> Result<SizeStats> {
        into_data(self.get("/api/stats/sizes", &[])?)
    }

    fn success_rates(&self, query: &SuccessRateQuery) -> Result<SuccessRateAnalysis> {
        into_data(self.get("/api/analysis/success-rates", &query.to_params())?)
    }
}

/// Checks the HTTP status and the envelope's `success` flag.
///
/// A non-2xx status is an [`ApiError::Http`]; `success: false` is an
/// [`ApiError::Unsuccessful`] carrying the server's message.
pub fn decode_envelope<T: DeserializeOwned>(status: u16, body: &str) -> Result<ApiEnvelope<T>> {
    if !(200..300).contains(&status) {
        return Err(ApiError::Http {
            status,
            body: body.to_string(),
        });
    }

    let envelope: ApiEnvelope<T> = serde_json::from_str(body)?;
    if !envelope.success {
        return Err(ApiError::unsuccessful(envelope.failure_message()));
    }
    Ok(envelope)
}

fn into_data<T>(envelope: ApiEnvelope<T>) -> Result<T> {
    envelope
        .data
        .ok_or_else(|| ApiError::unsuccessful("API response contained no data"))
}

/// Merges the data-level paging fields into the pagination block.
fn search_page(envelope: ApiEnvelope<SearchData>) -> SearchPage {
    let data = envelope.data.unwrap_or_default();
    let mut pagination = envelope.pagination.unwrap_or_default();
    if pagination.next_page_token.is_none() {
        pagination.next_page_token = data.next_page_token;
    }
    if pagination.total_count == 0
        && let Some(total) = data.total_count
    {
        pagination.total_count = total;
    }
    if pagination.next_page_token.is_some() {
        pagination.has_next_page = true;
    }
    SearchPage {
        studies: data.studies,
        pagination,
    }
}
