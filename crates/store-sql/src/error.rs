use flowerstore_core::repository::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    SqlError(#[from] sqlx::Error),
    #[error("Invalid sql store configuration: {0}")]
    ConfigError(#[from] serde_yaml::Error),
    #[error("Invalid row: {0}")]
    DecodeError(String),
}

impl From<Error> for RepositoryError {
    fn from(value: Error) -> Self {
        match value {
            Error::DecodeError(msg) => RepositoryError::Corrupted(msg),
            other => RepositoryError::Backend(other.to_string()),
        }
    }
}
