use thiserror::Error;

/// A type alias for handling `Result`s with [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or validating endpoint configuration.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// The configuration source could not be read or parsed
    #[error("failed to load configuration: {0}")]
    Load(String),

    /// A required configuration key was absent
    #[error("missing configuration key: {0}")]
    MissingKey(String),

    /// A configuration value failed validation
    #[error("invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Key whose value failed validation
        key: String,
        /// Human-readable explanation
        message: String,
    },
}
