//! Portal config errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid KDL: {0}")]
    Parse(#[from] kdl::KdlError),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("{0} is defined more than once")]
    Duplicate(String),

    /// A top-level node other than `server`, `api` or `session`.
    #[error("unknown config node: {0}")]
    UnknownNode(String),

    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
