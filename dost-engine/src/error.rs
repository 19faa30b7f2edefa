//! Error types for dost-engine
//!
//! Errors here are scoped to one task request: the pipeline converts them
//! into per-request diagnostics and carries on with the rest of the batch.

use thiserror::Error;

use crate::dispatch::DispatchError;
use crate::validation::ValidatorError;

/// Engine error type
#[derive(Debug, Error)]
pub enum EngineError {
    /// Request record is malformed (missing type, unknown type, bad shape)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Task parameters failed typed validation
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Validator rejected a resolution without supplying corrected hints
    #[error("Validation protocol violation: {0}")]
    Protocol(String),

    /// Validator could not be reached or answered with an error status
    #[error("Validator failed: {0}")]
    Validator(#[from] ValidatorError),

    /// Resource API call failed
    #[error("Dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    /// dost-common error
    #[error("Common error: {0}")]
    Common(#[from] dost_common::Error),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
