//! Error types for the appraisal portal.

use thiserror::Error;

/// Domain errors. Backend failures are `appraisal_client::ClientError`.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// Client-side form validation failed. The message is shown to the user as-is.
    #[error("{0}")]
    Validation(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
