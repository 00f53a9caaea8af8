use models::errors::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Participant not found")]
    NotFound,
    #[error("Name already taken")]
    DuplicateName,
    #[error("The name of a participant cannot be empty")]
    EmptyName,
    #[error("The maximum number of players is reached...")]
    IdSpaceExhausted,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot decode roster: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("cannot encode roster: {0}")]
    Encode(#[source] serde_json::Error),
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::EmptyName => ServiceError::EmptyName,
        }
    }
}
