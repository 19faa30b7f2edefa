//! Common error types for DOST

use thiserror::Error;

/// Common result type for DOST operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the DOST crates
#[derive(Error, Debug)]
pub enum Error {
    /// TOML decoding error (wraps toml::de::Error)
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Curriculum snapshot missing, corrupt, or violating uniqueness
    #[error("Curriculum load error: {0}")]
    Load(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
