//! Error types for registry API calls.

use thiserror::Error;

/// Failures of a single API call. None of them is retried.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// The request could not be sent or the response could not be read.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("API request failed with status {status}")]
    Http {
        status: u16,
        /// Response body, kept for logs.
        body: String,
    },

    /// The envelope reported `success: false` or carried no data.
    #[error("{message}")]
    Unsuccessful { message: String },

    /// The response body was not the expected JSON.
    #[error("invalid API response: {0}")]
    JsonParse(String),

    /// The NCT ID was rejected before any request was made.
    #[error("invalid NCT ID: {0}")]
    InvalidNctId(String),
}

impl ApiError {
    /// Text shown to the user in an alert and recorded in the activity log.
    #[must_use]
    pub fn user_message(&self) -> String {
        format!("Error: {self}")
    }

    pub fn unsuccessful(message: impl Into<String>) -> Self {
        Self::Unsuccessful {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonParse(err.to_string())
    }
}

impl From<cte_model::ModelError> for ApiError {
    fn from(err: cte_model::ModelError) -> Self {
        match err {
            cte_model::ModelError::InvalidNctId(value) => Self::InvalidNctId(value),
            other => Self::JsonParse(other.to_string()),
        }
    }
}

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        let err = ApiError::Http {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(err.user_message(), "Error: API request failed with status 502");

        let err = ApiError::unsuccessful("API request was not successful");
        assert_eq!(err.user_message(), "Error: API request was not successful");
    }

    #[test]
    fn test_model_error_maps_to_invalid_id() {
        let err: ApiError = cte_model::NctId::new("NCT1").unwrap_err().into();
        assert!(matches!(err, ApiError::InvalidNctId(value) if value == "NCT1"));
    }
}
