//! Data-store specific error types.

use crate::pipeline::DataArrayPath;
use crate::types::ElementKind;
use thiserror::Error;

/// Errors raised by operations on the Store hierarchy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Path '{0}' does not resolve in the data container array")]
    NotFound(DataArrayPath),

    #[error("Array '{path}' holds {found} elements but {expected} was requested")]
    TypeMismatch {
        path: DataArrayPath,
        expected: ElementKind,
        found: ElementKind,
    },

    #[error("Shape mismatch at '{path}': expected {expected} tuples, found {found}")]
    ShapeMismatch {
        path: DataArrayPath,
        expected: usize,
        found: usize,
    },

    #[error("Dimensions {dims:?} at '{path}' overflow the element count")]
    ShapeOverflow {
        path: DataArrayPath,
        dims: Vec<usize>,
    },

    #[error("'{0}' already exists with an incompatible shape")]
    AlreadyExists(DataArrayPath),

    #[error("Geometry of '{path}' requires {expected} tuples, got {found}")]
    GeometryMismatch {
        path: DataArrayPath,
        expected: usize,
        found: usize,
    },

    #[error("Invalid path '{0}'")]
    InvalidPath(String),

    #[error("Invalid name '{0}'")]
    InvalidName(String),
}

pub type DataResult<T> = std::result::Result<T, DataError>;
