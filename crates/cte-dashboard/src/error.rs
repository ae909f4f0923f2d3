//! Failures of dashboard operations.
//!
//! By the time one of these is returned the user has already been alerted.

use cte_client::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// Required form input was missing; no request was made.
    #[error("{0}")]
    MissingInput(&'static str),

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
