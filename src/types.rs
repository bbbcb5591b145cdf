//! Core data types for matpipe
//!
//! This module contains the small value types shared by the data store and
//! the pipeline engine.
//!
//! # Main Types
//!
//! - [`ElementKind`] - Enum of supported element types (int8 .. float64, bool, string)
//! - [`AttributeMatrixType`] - What a matrix's tuples represent (cells, features, ...)
//! - [`Geometry`] - Optional grid/vertex descriptor attached to a data container
//!
//! # Geometry constraints
//!
//! An image geometry fixes the number of cells, so a `Cell` matrix inside the
//! owning container must hold exactly `dims[0] * dims[1] * dims[2]` tuples.
//! A vertex geometry does the same for `Vertex` matrices.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of elements a shape describes, or `None` if it overflows `usize`.
///
/// Shapes read from pipeline files go through this before anything is
/// sized from them.
pub fn shape_len(dims: &[usize]) -> Option<usize> {
    dims.iter().try_fold(1usize, |acc, d| acc.checked_mul(*d))
}

/// Represents the element type stored in a data array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ElementKind {
    /// 8-bit signed integer
    Int8,
    /// 8-bit unsigned integer
    UInt8,
    /// 16-bit signed integer
    Int16,
    /// 16-bit unsigned integer
    UInt16,
    /// 32-bit signed integer
    #[default]
    Int32,
    /// 32-bit unsigned integer
    UInt32,
    /// 64-bit signed integer
    Int64,
    /// 64-bit unsigned integer
    UInt64,
    /// 32-bit floating point
    Float32,
    /// 64-bit floating point
    Float64,
    /// Boolean value
    Bool,
    /// UTF-8 string per component
    String,
}

impl ElementKind {
    /// Every supported kind, in declaration order.
    pub fn all() -> &'static [ElementKind] {
        &[
            ElementKind::Int8,
            ElementKind::UInt8,
            ElementKind::Int16,
            ElementKind::UInt16,
            ElementKind::Int32,
            ElementKind::UInt32,
            ElementKind::Int64,
            ElementKind::UInt64,
            ElementKind::Float32,
            ElementKind::Float64,
            ElementKind::Bool,
            ElementKind::String,
        ]
    }

    /// Returns the size in bytes of one element, `None` for strings.
    pub fn size_bytes(&self) -> Option<usize> {
        match self {
            ElementKind::Int8 | ElementKind::UInt8 | ElementKind::Bool => Some(1),
            ElementKind::Int16 | ElementKind::UInt16 => Some(2),
            ElementKind::Int32 | ElementKind::UInt32 | ElementKind::Float32 => Some(4),
            ElementKind::Int64 | ElementKind::UInt64 | ElementKind::Float64 => Some(8),
            ElementKind::String => None,
        }
    }

    /// True for the integer and floating point kinds.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, ElementKind::Bool | ElementKind::String)
    }

    /// Stable lowercase name used in pipeline files and schema dumps.
    pub fn type_name(&self) -> &'static str {
        match self {
            ElementKind::Int8 => "int8",
            ElementKind::UInt8 => "uint8",
            ElementKind::Int16 => "int16",
            ElementKind::UInt16 => "uint16",
            ElementKind::Int32 => "int32",
            ElementKind::UInt32 => "uint32",
            ElementKind::Int64 => "int64",
            ElementKind::UInt64 => "uint64",
            ElementKind::Float32 => "float32",
            ElementKind::Float64 => "float64",
            ElementKind::Bool => "bool",
            ElementKind::String => "string",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for ElementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        ElementKind::all()
            .iter()
            .copied()
            .find(|kind| kind.type_name() == lower || format!("{:?}", kind).to_ascii_lowercase() == lower)
            .ok_or_else(|| format!("unknown element kind '{}'", s))
    }
}

/// What the tuples of an attribute matrix represent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AttributeMatrixType {
    Vertex,
    Edge,
    Face,
    Cell,
    CellFeature,
    CellEnsemble,
    MetaData,
    #[default]
    Generic,
    Unknown,
}

impl fmt::Display for AttributeMatrixType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributeMatrixType::Vertex => "Vertex",
            AttributeMatrixType::Edge => "Edge",
            AttributeMatrixType::Face => "Face",
            AttributeMatrixType::Cell => "Cell",
            AttributeMatrixType::CellFeature => "Cell Feature",
            AttributeMatrixType::CellEnsemble => "Cell Ensemble",
            AttributeMatrixType::MetaData => "MetaData",
            AttributeMatrixType::Generic => "Generic",
            AttributeMatrixType::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Discriminant of [`Geometry`], compared when checking rename compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Image,
    Vertex,
    Unknown,
}

/// Geometry descriptor shared by all matrices of one data container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// Regular grid of cells
    Image {
        dims: [usize; 3],
        origin: [f32; 3],
        spacing: [f32; 3],
    },
    /// Point cloud
    Vertex { num_vertices: usize },
    Unknown,
}

impl Geometry {
    /// Image geometry with unit spacing at the origin.
    pub fn image(dims: [usize; 3]) -> Self {
        Geometry::Image {
            dims,
            origin: [0.0; 3],
            spacing: [1.0; 3],
        }
    }

    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Image { .. } => GeometryKind::Image,
            Geometry::Vertex { .. } => GeometryKind::Vertex,
            Geometry::Unknown => GeometryKind::Unknown,
        }
    }

    /// Number of elements (cells or vertices) this geometry defines.
    pub fn element_count(&self) -> Option<usize> {
        match self {
            Geometry::Image { dims, .. } => shape_len(dims),
            Geometry::Vertex { num_vertices } => Some(*num_vertices),
            Geometry::Unknown => None,
        }
    }

    /// The matrix type whose tuple count this geometry pins down.
    pub fn constrained_matrix_type(&self) -> Option<AttributeMatrixType> {
        match self {
            Geometry::Image { .. } => Some(AttributeMatrixType::Cell),
            Geometry::Vertex { .. } => Some(AttributeMatrixType::Vertex),
            Geometry::Unknown => None,
        }
    }

    /// Check whether a matrix of `am_type` with `tuple_dims` fits this geometry.
    pub fn accepts(&self, am_type: AttributeMatrixType, tuple_dims: &[usize]) -> bool {
        match (self.constrained_matrix_type(), self.element_count()) {
            (Some(constrained), Some(count)) if constrained == am_type => {
                shape_len(tuple_dims) == Some(count)
            }
            _ => true,
        }
    }
}
