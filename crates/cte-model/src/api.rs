//! Response envelopes of the dashboard REST endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::study::Study;

/// `{success, data, pagination}` wrapper shared by every endpoint.
///
/// Error responses carry `error` (a flag or a message) and `message`
/// instead of `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            pagination: None,
            error: None,
            message: None,
        }
    }

    #[must_use]
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Best available explanation of an unsuccessful response.
    pub fn failure_message(&self) -> String {
        if let Some(message) = self.message.as_deref().filter(|m| !m.trim().is_empty()) {
            return message.to_string();
        }
        match &self.error {
            Some(Value::String(text)) if !text.trim().is_empty() => text.clone(),
            _ => "API request was not successful".to_string(),
        }
    }
}

/// Page of studies returned by the search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchData {
    pub studies: Vec<Study>,
    pub total_count: Option<u64>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pagination {
    pub total_count: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub page_size: u64,
    pub has_next_page: bool,
    pub next_page_token: Option<String>,
}

pub type SearchResponse = ApiEnvelope<SearchData>;
pub type StudyResponse = ApiEnvelope<Study>;
