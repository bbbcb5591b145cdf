//! Named groups of attribute matrices with an optional geometry.

use crate::data::AttributeMatrix;
use crate::types::Geometry;

/// A named container of [`AttributeMatrix`] tables.
///
/// When a geometry is present it pins the tuple count of the matrix type it
/// constrains (see [`Geometry::accepts`]).
#[derive(Debug, Clone, PartialEq)]
pub struct DataContainer {
    name: String,
    geometry: Option<Geometry>,
    matrices: Vec<AttributeMatrix>,
}

impl DataContainer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            geometry: None,
            matrices: Vec::new(),
        }
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    /// Replace the geometry. Fails (leaving the old one) if an existing
    /// matrix would violate the new constraint.
    pub fn set_geometry(&mut self, geometry: Option<Geometry>) -> bool {
        if let Some(geom) = &geometry {
            if !self
                .matrices
                .iter()
                .all(|am| geom.accepts(am.kind(), am.tuple_dims()))
            {
                return false;
            }
        }
        self.geometry = geometry;
        true
    }

    /// True when a matrix of this shape would satisfy the geometry.
    pub fn accepts_shape(&self, am: &AttributeMatrix, tuple_dims: &[usize]) -> bool {
        self.geometry
            .as_ref()
            .map_or(true, |geom| geom.accepts(am.kind(), tuple_dims))
    }

    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    pub fn matrices(&self) -> impl Iterator<Item = &AttributeMatrix> {
        self.matrices.iter()
    }

    pub fn matrix_names(&self) -> Vec<String> {
        self.matrices.iter().map(|m| m.name().to_string()).collect()
    }

    pub fn contains_matrix(&self, name: &str) -> bool {
        self.matrices.iter().any(|m| m.name() == name)
    }

    pub fn get_matrix(&self, name: &str) -> Option<&AttributeMatrix> {
        self.matrices.iter().find(|m| m.name() == name)
    }

    pub fn get_matrix_mut(&mut self, name: &str) -> Option<&mut AttributeMatrix> {
        self.matrices.iter_mut().find(|m| m.name() == name)
    }

    /// Add a matrix; callers check name uniqueness and geometry first.
    pub(crate) fn push_matrix(&mut self, am: AttributeMatrix) -> &mut AttributeMatrix {
        self.matrices.push(am);
        let last = self.matrices.len() - 1;
        &mut self.matrices[last]
    }

    pub fn remove_matrix(&mut self, name: &str) -> Option<AttributeMatrix> {
        let index = self.matrices.iter().position(|m| m.name() == name)?;
        Some(self.matrices.remove(index))
    }

    pub fn schema_copy(&self) -> Self {
        Self {
            name: self.name.clone(),
            geometry: self.geometry.clone(),
            matrices: self.matrices.iter().map(AttributeMatrix::schema_copy).collect(),
        }
    }
}
