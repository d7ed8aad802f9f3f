use thiserror::Error;

/// Errors raised while building or validating model types.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid property term: {0:?}")]
    InvalidPropertyTerm(String),
    #[error("invalid resource type: {0:?}")]
    InvalidResourceType(String),
    #[error("invalid action: {0:?}")]
    InvalidAction(String),
    #[error("invalid merge policy: {0:?}")]
    InvalidMergePolicy(String),
    #[error("invalid import configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
