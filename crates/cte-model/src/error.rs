use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid NCT ID: {0}")]
    InvalidNctId(String),
    #[error("invalid precedent dataset: {0}")]
    InvalidDataset(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;
