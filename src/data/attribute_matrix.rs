//! Tables of equally long arrays.

use crate::data::DataArray;
use crate::types::{shape_len, AttributeMatrixType};

/// An ordered set of [`DataArray`]s sharing one tuple shape.
///
/// Every member array has `tuple_count == num_tuples()`. The only ways to
/// change the tuple shape are [`AttributeMatrix::resize`] (which resizes all
/// members together) and adding arrays that already match.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeMatrix {
    name: String,
    kind: AttributeMatrixType,
    tuple_dims: Vec<usize>,
    arrays: Vec<DataArray>,
}

impl AttributeMatrix {
    pub fn new(name: impl Into<String>, tuple_dims: &[usize], kind: AttributeMatrixType) -> Self {
        Self {
            name: name.into(),
            kind,
            tuple_dims: tuple_dims.to_vec(),
            arrays: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn kind(&self) -> AttributeMatrixType {
        self.kind
    }

    pub fn tuple_dims(&self) -> &[usize] {
        &self.tuple_dims
    }

    /// Product of the tuple dimensions, saturating at `usize::MAX`.
    ///
    /// Matrices created through the Store never saturate.
    pub fn num_tuples(&self) -> usize {
        shape_len(&self.tuple_dims).unwrap_or(usize::MAX)
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    pub fn arrays(&self) -> impl Iterator<Item = &DataArray> {
        self.arrays.iter()
    }

    pub fn arrays_mut(&mut self) -> impl Iterator<Item = &mut DataArray> {
        self.arrays.iter_mut()
    }

    pub fn array_names(&self) -> Vec<String> {
        self.arrays.iter().map(|a| a.name().to_string()).collect()
    }

    pub fn contains_array(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get_array(&self, name: &str) -> Option<&DataArray> {
        self.arrays.iter().find(|a| a.name() == name)
    }

    pub fn get_array_mut(&mut self, name: &str) -> Option<&mut DataArray> {
        self.arrays.iter_mut().find(|a| a.name() == name)
    }

    /// True when `array` has the tuple count this matrix requires.
    pub fn accepts(&self, array: &DataArray) -> bool {
        array.tuple_count() == self.num_tuples()
    }

    /// Insert or replace an array, keeping the original position on replace.
    ///
    /// Callers must have checked [`AttributeMatrix::accepts`].
    pub(crate) fn insert_array(&mut self, array: DataArray) -> Option<DataArray> {
        debug_assert!(self.accepts(&array));
        match self.position(array.name()) {
            Some(index) => Some(std::mem::replace(&mut self.arrays[index], array)),
            None => {
                self.arrays.push(array);
                None
            }
        }
    }

    pub fn remove_array(&mut self, name: &str) -> Option<DataArray> {
        self.position(name).map(|index| self.arrays.remove(index))
    }

    /// Rename a member array. Returns false if `old` is missing or `new` taken.
    pub(crate) fn rename_array(&mut self, old: &str, new: &str) -> bool {
        if self.contains_array(new) {
            return false;
        }
        match self.get_array_mut(old) {
            Some(array) => {
                array.set_name(new);
                true
            }
            None => false,
        }
    }

    /// Resize every member array to the new tuple shape.
    pub(crate) fn resize(&mut self, tuple_dims: &[usize]) {
        self.tuple_dims = tuple_dims.to_vec();
        let count = self.num_tuples();
        for array in &mut self.arrays {
            array.resize_tuples(count);
        }
    }

    pub fn schema_copy(&self) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind,
            tuple_dims: self.tuple_dims.clone(),
            arrays: self.arrays.iter().map(DataArray::schema_copy).collect(),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.arrays.iter().position(|a| a.name() == name)
    }
}
