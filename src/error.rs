//! Error handling for matpipe
//!
//! This module defines the crate-level error type and a Result alias. The
//! data store and the pipeline engine carry their own narrower error enums
//! which convert into [`MatpipeError`] at the crate boundary.

use crate::data::DataError;
use crate::pipeline::PipelineError;
use thiserror::Error;

/// Main error type for matpipe operations
#[derive(Error, Debug)]
pub enum MatpipeError {
    /// Errors raised by the data store hierarchy
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Errors raised by the pipeline engine outside the stage contract
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<MatpipeError>,
    },
}

impl MatpipeError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        MatpipeError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

impl From<serde_json::Error> for MatpipeError {
    fn from(err: serde_json::Error) -> Self {
        MatpipeError::Serialization(err.to_string())
    }
}

/// Result type alias for matpipe operations
pub type Result<T> = std::result::Result<T, MatpipeError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<MatpipeError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}
