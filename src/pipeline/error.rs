//! Pipeline-specific error types and reserved codes.
//!
//! Stages report failure through integer codes on the message bus, not
//! through `Result`. The constants here are the codes the orchestrator and
//! the persistence layer reserve for themselves.

use thiserror::Error;

/// `cancel()` called while no pass is running.
pub const ERR_NOT_EXECUTING: i32 = -201;
/// A pipeline file names a filter no factory can create.
pub const ERR_UNKNOWN_FILTER: i32 = -66066;
/// A stage panicked inside `preflight()` or `execute()`.
pub const ERR_STAGE_PANICKED: i32 = -10100;

/// Errors outside the stage contract: persistence, factories, parameters.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Unknown filter '{0}'")]
    UnknownFilter(String),

    #[error("Invalid pipeline file: {0}")]
    InvalidFormat(String),

    #[error("Parameter '{name}' of {filter}: {message}")]
    Parameter {
        filter: String,
        name: String,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
