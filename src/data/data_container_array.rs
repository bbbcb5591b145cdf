//! The Store: the single mutable root threaded through a pipeline run.

use crate::data::{AttributeMatrix, DataArray, DataContainer, DataError, DataResult};
use crate::data::data_array::ArrayElement;
use crate::pipeline::path::{DataArrayPath, PathType, RenameEvent, DELIMITER};
use crate::types::{shape_len, AttributeMatrixType, ElementKind, Geometry};
use serde::{Deserialize, Serialize};

/// What [`DataContainerArray::create_array`] does when the name is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreatePolicy {
    /// Reuse a compatible array, fail on an incompatible one
    #[default]
    FailIfIncompatible,
    /// Replace whatever is there
    Overwrite,
}

/// Options for creating arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateOptions {
    pub policy: CreatePolicy,
    /// Allocate the buffer; false records the shape only
    pub allocate: bool,
}

impl CreateOptions {
    pub fn allocated() -> Self {
        Self {
            policy: CreatePolicy::FailIfIncompatible,
            allocate: true,
        }
    }

    pub fn schema_only() -> Self {
        Self {
            policy: CreatePolicy::FailIfIncompatible,
            allocate: false,
        }
    }

    /// Schema-only during preflight, allocated during execute.
    pub fn for_phase(in_preflight: bool) -> Self {
        if in_preflight {
            Self::schema_only()
        } else {
            Self::allocated()
        }
    }

    pub fn overwrite(mut self) -> Self {
        self.policy = CreatePolicy::Overwrite;
        self
    }
}

/// Outcome of a rename on the Store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    Success,
    OldDoesNotExist,
    NewExists,
    SamePath,
}

/// Serializable summary of a Store, without buffers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StoreSchema {
    pub containers: Vec<ContainerSchema>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSchema {
    pub name: String,
    pub geometry: Option<Geometry>,
    pub matrices: Vec<MatrixSchema>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixSchema {
    pub name: String,
    pub kind: AttributeMatrixType,
    pub tuple_dims: Vec<usize>,
    pub arrays: Vec<ArraySchema>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArraySchema {
    pub name: String,
    pub kind: ElementKind,
    pub component_dims: Vec<usize>,
    pub allocated: bool,
}

/// Root of the data hierarchy.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataContainerArray {
    containers: Vec<DataContainer>,
}

impl DataContainerArray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn containers(&self) -> impl Iterator<Item = &DataContainer> {
        self.containers.iter()
    }

    pub fn container_names(&self) -> Vec<String> {
        self.containers.iter().map(|dc| dc.name().to_string()).collect()
    }

    // ── Containers ──

    pub fn contains_container(&self, name: &str) -> bool {
        self.containers.iter().any(|dc| dc.name() == name)
    }

    pub fn get_container(&self, name: &str) -> Option<&DataContainer> {
        self.containers.iter().find(|dc| dc.name() == name)
    }

    pub fn get_container_mut(&mut self, name: &str) -> Option<&mut DataContainer> {
        self.containers.iter_mut().find(|dc| dc.name() == name)
    }

    /// Add a fully built container. Fails if the name is taken or invalid.
    pub fn add_container(&mut self, dc: DataContainer) -> DataResult<&mut DataContainer> {
        validate_name(dc.name())?;
        if self.contains_container(dc.name()) {
            return Err(DataError::AlreadyExists(DataArrayPath::container(dc.name())));
        }
        self.containers.push(dc);
        let last = self.containers.len() - 1;
        Ok(&mut self.containers[last])
    }

    pub fn create_container(&mut self, name: &str) -> DataResult<&mut DataContainer> {
        self.add_container(DataContainer::new(name))
    }

    pub fn remove_container(&mut self, name: &str) -> Option<DataContainer> {
        let index = self.containers.iter().position(|dc| dc.name() == name)?;
        Some(self.containers.remove(index))
    }

    // ── Matrices ──

    pub fn get_matrix(&self, path: &DataArrayPath) -> DataResult<&AttributeMatrix> {
        self.get_container(path.data_container_name())
            .and_then(|dc| dc.get_matrix(path.attribute_matrix_name()))
            .ok_or_else(|| DataError::NotFound(path.matrix_path()))
    }

    pub fn get_matrix_mut(&mut self, path: &DataArrayPath) -> DataResult<&mut AttributeMatrix> {
        self.get_container_mut(path.data_container_name())
            .and_then(|dc| dc.get_matrix_mut(path.attribute_matrix_name()))
            .ok_or_else(|| DataError::NotFound(path.matrix_path()))
    }

    /// Create an empty matrix at `path` (container+matrix).
    pub fn create_matrix(
        &mut self,
        path: &DataArrayPath,
        tuple_dims: &[usize],
        kind: AttributeMatrixType,
    ) -> DataResult<&mut AttributeMatrix> {
        validate_name(path.attribute_matrix_name())?;
        let found = checked_shape(&path.matrix_path(), tuple_dims)?;
        let dc = self
            .get_container_mut(path.data_container_name())
            .ok_or_else(|| DataError::NotFound(path.container_path()))?;
        if dc.contains_matrix(path.attribute_matrix_name()) {
            return Err(DataError::AlreadyExists(path.matrix_path()));
        }
        if let Some(geom) = dc.geometry() {
            if !geom.accepts(kind, tuple_dims) {
                return Err(DataError::GeometryMismatch {
                    path: path.matrix_path(),
                    expected: geom.element_count().unwrap_or_default(),
                    found,
                });
            }
        }
        Ok(dc.push_matrix(AttributeMatrix::new(
            path.attribute_matrix_name(),
            tuple_dims,
            kind,
        )))
    }

    pub fn remove_matrix(&mut self, path: &DataArrayPath) -> Option<AttributeMatrix> {
        self.get_container_mut(path.data_container_name())?
            .remove_matrix(path.attribute_matrix_name())
    }

    /// Resize every array of a matrix at once.
    ///
    /// All checks run before anything is touched, so the call either
    /// resizes every member array or changes nothing.
    pub fn resize_matrix(&mut self, path: &DataArrayPath, tuple_dims: &[usize]) -> DataResult<()> {
        let found = checked_shape(&path.matrix_path(), tuple_dims)?;
        let dc = self
            .get_container_mut(path.data_container_name())
            .ok_or_else(|| DataError::NotFound(path.container_path()))?;
        let am = dc
            .get_matrix(path.attribute_matrix_name())
            .ok_or_else(|| DataError::NotFound(path.matrix_path()))?;
        if !dc.accepts_shape(am, tuple_dims) {
            return Err(DataError::GeometryMismatch {
                path: path.matrix_path(),
                expected: dc
                    .geometry()
                    .and_then(Geometry::element_count)
                    .unwrap_or_default(),
                found,
            });
        }
        if let Some(am) = dc.get_matrix_mut(path.attribute_matrix_name()) {
            am.resize(tuple_dims);
        }
        Ok(())
    }

    // ── Arrays ──

    /// Create (or reuse) an array in the matrix at `matrix`.
    ///
    /// `tuple_dims` must describe the matrix's tuple count. An existing array
    /// of the same name is reused when its kind and component dims match,
    /// replaced under [`CreatePolicy::Overwrite`], and rejected otherwise.
    pub fn create_array(
        &mut self,
        matrix: &DataArrayPath,
        name: &str,
        kind: ElementKind,
        tuple_dims: &[usize],
        component_dims: &[usize],
        options: CreateOptions,
    ) -> DataResult<&mut DataArray> {
        validate_name(name)?;
        let path = matrix.with_array(name);
        let requested = checked_shape(&path, tuple_dims)?;
        shape_len(component_dims)
            .and_then(|comps| comps.checked_mul(requested))
            .ok_or_else(|| DataError::ShapeOverflow {
                path: path.clone(),
                dims: component_dims.to_vec(),
            })?;
        let am = self.get_matrix_mut(matrix)?;
        if requested != am.num_tuples() {
            return Err(DataError::ShapeMismatch {
                path,
                expected: am.num_tuples(),
                found: requested,
            });
        }
        let candidate = DataArray::new(name, kind, am.num_tuples(), component_dims, options.allocate);
        let reuse = match am.get_array(name) {
            Some(existing) if options.policy == CreatePolicy::FailIfIncompatible => {
                if !existing.is_compatible_with(&candidate) {
                    return Err(DataError::AlreadyExists(path));
                }
                true
            }
            _ => false,
        };
        if !reuse {
            am.insert_array(candidate);
        }
        let array = am
            .get_array_mut(name)
            .ok_or_else(|| DataError::NotFound(path))?;
        if options.allocate {
            array.allocate();
        }
        Ok(array)
    }

    /// Add a prebuilt array, replacing any array of the same name.
    pub fn add_array(&mut self, matrix: &DataArrayPath, array: DataArray) -> DataResult<()> {
        validate_name(array.name())?;
        let path = matrix.with_array(array.name());
        let am = self.get_matrix_mut(matrix)?;
        if !am.accepts(&array) {
            return Err(DataError::ShapeMismatch {
                path,
                expected: am.num_tuples(),
                found: array.tuple_count(),
            });
        }
        am.insert_array(array);
        Ok(())
    }

    pub fn get_array(&self, path: &DataArrayPath) -> DataResult<&DataArray> {
        self.get_matrix(path)
            .ok()
            .and_then(|am| am.get_array(path.data_array_name()))
            .ok_or_else(|| DataError::NotFound(path.clone()))
    }

    pub fn get_array_mut(&mut self, path: &DataArrayPath) -> DataResult<&mut DataArray> {
        self.get_matrix_mut(path)
            .ok()
            .and_then(|am| am.get_array_mut(path.data_array_name()))
            .ok_or_else(|| DataError::NotFound(path.clone()))
    }

    /// Look up an array and check that it stores `T`.
    pub fn get_array_as<T: ArrayElement>(&self, path: &DataArrayPath) -> DataResult<&DataArray> {
        let array = self.get_array(path)?;
        check_kind::<T>(path, array)?;
        Ok(array)
    }

    pub fn get_array_as_mut<T: ArrayElement>(
        &mut self,
        path: &DataArrayPath,
    ) -> DataResult<&mut DataArray> {
        let array = self.get_array_mut(path)?;
        check_kind::<T>(path, array)?;
        Ok(array)
    }

    pub fn remove_array(&mut self, path: &DataArrayPath) -> Option<DataArray> {
        self.get_matrix_mut(path)
            .ok()?
            .remove_array(path.data_array_name())
    }

    /// True when the container, matrix or array `path` addresses exists.
    pub fn contains_path(&self, path: &DataArrayPath) -> bool {
        match path.path_type() {
            PathType::DataContainer => self.contains_container(path.data_container_name()),
            PathType::AttributeMatrix => self.get_matrix(path).is_ok(),
            PathType::DataArray => self.get_array(path).is_ok(),
            PathType::None => false,
        }
    }

    /// Every container, matrix and array path, parents before children.
    pub fn all_paths(&self) -> Vec<DataArrayPath> {
        let mut paths = Vec::new();
        for dc in &self.containers {
            paths.push(DataArrayPath::container(dc.name()));
            for am in dc.matrices() {
                let am_path = DataArrayPath::matrix(dc.name(), am.name());
                paths.push(am_path.clone());
                paths.extend(am.arrays().map(|array| am_path.with_array(array.name())));
            }
        }
        paths
    }

    // ── Copies ──

    /// Full copy including buffers.
    pub fn deep_copy(&self) -> Self {
        self.clone()
    }

    /// Same hierarchy and metadata with every buffer dropped.
    pub fn schema_copy(&self) -> Self {
        Self {
            containers: self.containers.iter().map(DataContainer::schema_copy).collect(),
        }
    }

    // ── Renames ──

    pub fn rename_data_container(&mut self, old: &str, new: &str) -> RenameOutcome {
        if old == new {
            return RenameOutcome::SamePath;
        }
        if self.contains_container(new) {
            return RenameOutcome::NewExists;
        }
        match self.get_container_mut(old) {
            Some(dc) => {
                dc.set_name(new);
                RenameOutcome::Success
            }
            None => RenameOutcome::OldDoesNotExist,
        }
    }

    /// Rename the matrix at `path` (container+matrix) to `new_name`.
    pub fn rename_attribute_matrix(&mut self, path: &DataArrayPath, new_name: &str) -> RenameOutcome {
        if path.attribute_matrix_name() == new_name {
            return RenameOutcome::SamePath;
        }
        let Some(dc) = self.get_container_mut(path.data_container_name()) else {
            return RenameOutcome::OldDoesNotExist;
        };
        if dc.contains_matrix(new_name) {
            return RenameOutcome::NewExists;
        }
        match dc.get_matrix_mut(path.attribute_matrix_name()) {
            Some(am) => {
                am.set_name(new_name);
                RenameOutcome::Success
            }
            None => RenameOutcome::OldDoesNotExist,
        }
    }

    /// Rename the array at `path` to `new_name` within the same matrix.
    pub fn rename_attribute_array(&mut self, path: &DataArrayPath, new_name: &str) -> RenameOutcome {
        if path.data_array_name() == new_name {
            return RenameOutcome::SamePath;
        }
        let Ok(am) = self.get_matrix_mut(path) else {
            return RenameOutcome::OldDoesNotExist;
        };
        if !am.contains_array(path.data_array_name()) {
            return RenameOutcome::OldDoesNotExist;
        }
        if am.contains_array(new_name) {
            return RenameOutcome::NewExists;
        }
        am.rename_array(path.data_array_name(), new_name);
        RenameOutcome::Success
    }

    /// Replay `renames` onto the Store itself, in order.
    pub fn rename_data_array_paths(&mut self, renames: &[RenameEvent]) {
        for rename in renames {
            let (old, new) = (&rename.old, &rename.new);
            let outcome = if !old.has_same_data_container(new) {
                self.rename_data_container(old.data_container_name(), new.data_container_name())
            } else if !old.has_same_attribute_matrix(new) {
                self.rename_attribute_matrix(old, new.attribute_matrix_name())
            } else {
                self.rename_attribute_array(old, new.data_array_name())
            };
            tracing::trace!("Store rename {}: {:?}", rename, outcome);
        }
    }

    // ── Summary ──

    pub fn schema(&self) -> StoreSchema {
        StoreSchema {
            containers: self
                .containers
                .iter()
                .map(|dc| ContainerSchema {
                    name: dc.name().to_string(),
                    geometry: dc.geometry().cloned(),
                    matrices: dc
                        .matrices()
                        .map(|am| MatrixSchema {
                            name: am.name().to_string(),
                            kind: am.kind(),
                            tuple_dims: am.tuple_dims().to_vec(),
                            arrays: am
                                .arrays()
                                .map(|a| ArraySchema {
                                    name: a.name().to_string(),
                                    kind: a.kind(),
                                    component_dims: a.component_dims().to_vec(),
                                    allocated: a.is_allocated(),
                                })
                                .collect(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

fn validate_name(name: &str) -> DataResult<()> {
    if name.is_empty() || name.contains(DELIMITER) {
        return Err(DataError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn checked_shape(path: &DataArrayPath, dims: &[usize]) -> DataResult<usize> {
    shape_len(dims).ok_or_else(|| DataError::ShapeOverflow {
        path: path.clone(),
        dims: dims.to_vec(),
    })
}

fn check_kind<T: ArrayElement>(path: &DataArrayPath, array: &DataArray) -> DataResult<()> {
    if array.kind() != T::KIND {
        return Err(DataError::TypeMismatch {
            path: path.clone(),
            expected: T::KIND,
            found: array.kind(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> DataContainerArray {
        let mut dca = DataContainerArray::new();
        dca.create_container("DC").unwrap();
        dca.create_matrix(
            &DataArrayPath::matrix("DC", "AM"),
            &[5],
            AttributeMatrixType::Generic,
        )
        .unwrap();
        dca
    }

    fn am_path() -> DataArrayPath {
        DataArrayPath::matrix("DC", "AM")
    }

    #[test]
    fn test_create_and_get_array_as() {
        let mut dca = store();
        dca.create_array(&am_path(), "Foo", ElementKind::Int32, &[5], &[1], CreateOptions::allocated())
            .unwrap();
        let path = DataArrayPath::new("DC", "AM", "Foo");
        let array = dca.get_array_as::<i32>(&path).unwrap();
        assert_eq!(array.tuple_count(), 5);
        assert_eq!(array.as_slice::<i32>().unwrap().len(), 5);
    }

    #[test]
    fn test_get_array_as_type_mismatch() {
        let mut dca = store();
        dca.create_array(&am_path(), "Foo", ElementKind::Int32, &[5], &[1], CreateOptions::allocated())
            .unwrap();
        let path = DataArrayPath::new("DC", "AM", "Foo");
        let err = dca.get_array_as::<f32>(&path).unwrap_err();
        assert!(matches!(
            err,
            DataError::TypeMismatch {
                expected: ElementKind::Float32,
                found: ElementKind::Int32,
                ..
            }
        ));
        assert!(matches!(
            dca.get_array_as::<i32>(&DataArrayPath::new("DC", "AM", "Nope")),
            Err(DataError::NotFound(_))
        ));
    }

    #[test]
    fn test_create_array_shape_mismatch() {
        let mut dca = store();
        let err = dca
            .create_array(&am_path(), "Foo", ElementKind::Int32, &[6], &[1], CreateOptions::allocated())
            .unwrap_err();
        assert!(matches!(err, DataError::ShapeMismatch { expected: 5, found: 6, .. }));
    }

    #[test]
    fn test_create_array_existing_policies() {
        let mut dca = store();
        let opts = CreateOptions::allocated();
        dca.create_array(&am_path(), "Foo", ElementKind::Int32, &[5], &[1], opts)
            .unwrap()
            .fill(7i32);
        // compatible: reused with data intact
        let reused = dca
            .create_array(&am_path(), "Foo", ElementKind::Int32, &[5], &[1], opts)
            .unwrap();
        assert_eq!(reused.as_slice::<i32>().unwrap()[0], 7);
        // incompatible
        assert!(matches!(
            dca.create_array(&am_path(), "Foo", ElementKind::Float32, &[5], &[1], opts),
            Err(DataError::AlreadyExists(_))
        ));
        // overwrite
        let replaced = dca
            .create_array(&am_path(), "Foo", ElementKind::Float32, &[5], &[2], opts.overwrite())
            .unwrap();
        assert_eq!(replaced.kind(), ElementKind::Float32);
        assert_eq!(replaced.len(), 10);
    }

    #[test]
    fn test_resize_matrix_keeps_shape_invariant() {
        let mut dca = store();
        let opts = CreateOptions::allocated();
        dca.create_array(&am_path(), "A", ElementKind::UInt8, &[5], &[1], opts).unwrap();
        dca.create_array(&am_path(), "B", ElementKind::Float64, &[5], &[3], opts).unwrap();
        dca.resize_matrix(&am_path(), &[4, 2]).unwrap();
        let am = dca.get_matrix(&am_path()).unwrap();
        for array in am.arrays() {
            assert_eq!(array.tuple_count(), am.num_tuples());
            assert_eq!(array.len(), 8 * array.component_count());
        }
    }

    #[test]
    fn test_resize_matrix_rejects_geometry_violation() {
        let mut dca = DataContainerArray::new();
        dca.add_container(DataContainer::new("Image").with_geometry(Geometry::image([2, 2, 1])))
            .unwrap();
        let cell = DataArrayPath::matrix("Image", "Cell");
        dca.create_matrix(&cell, &[2, 2, 1], AttributeMatrixType::Cell).unwrap();
        dca.create_array(&cell, "A", ElementKind::Int8, &[4], &[1], CreateOptions::allocated())
            .unwrap();
        let err = dca.resize_matrix(&cell, &[5]).unwrap_err();
        assert!(matches!(err, DataError::GeometryMismatch { expected: 4, found: 5, .. }));
        // nothing changed
        assert_eq!(dca.get_array(&cell.with_array("A")).unwrap().len(), 4);
        assert!(dca
            .create_matrix(&DataArrayPath::matrix("Image", "Bad"), &[3], AttributeMatrixType::Cell)
            .is_err());
    }

    #[test]
    fn test_overflowing_shapes_are_rejected() {
        let huge = [1usize << 40, 1 << 40];
        let mut dca = store();
        assert!(matches!(
            dca.create_matrix(&DataArrayPath::matrix("DC", "Big"), &huge, AttributeMatrixType::Generic),
            Err(DataError::ShapeOverflow { .. })
        ));
        assert!(!dca.contains_path(&DataArrayPath::matrix("DC", "Big")));

        dca.create_array(&am_path(), "A", ElementKind::Int32, &[5], &[1], CreateOptions::allocated())
            .unwrap();
        assert!(matches!(
            dca.resize_matrix(&am_path(), &huge),
            Err(DataError::ShapeOverflow { .. })
        ));
        assert_eq!(dca.get_matrix(&am_path()).unwrap().tuple_dims(), &[5]);
        assert!(matches!(
            dca.create_array(&am_path(), "B", ElementKind::Int32, &huge, &[1], CreateOptions::schema_only()),
            Err(DataError::ShapeOverflow { .. })
        ));
        let err = dca
            .create_array(&am_path(), "C", ElementKind::Int8, &[5], &[usize::MAX, 2], CreateOptions::schema_only())
            .unwrap_err();
        assert!(matches!(err, DataError::ShapeOverflow { ref dims, .. } if dims == &[usize::MAX, 2]));
    }

    #[test]
    fn test_remove_array() {
        let mut dca = store();
        dca.create_array(&am_path(), "Foo", ElementKind::Bool, &[5], &[1], CreateOptions::schema_only())
            .unwrap();
        let path = am_path().with_array("Foo");
        assert!(dca.remove_array(&path).is_some());
        assert!(dca.remove_array(&path).is_none());
    }

    #[test]
    fn test_schema_copy_is_independent_and_empty() {
        let mut dca = store();
        dca.create_array(&am_path(), "Foo", ElementKind::Int64, &[5], &[2], CreateOptions::allocated())
            .unwrap();
        let mut copy = dca.schema_copy();
        let path = am_path().with_array("Foo");
        assert!(copy.get_array(&path).unwrap().is_empty());
        assert_eq!(copy.get_array(&path).unwrap().tuple_count(), 5);
        copy.remove_array(&path);
        assert!(dca.get_array(&path).is_ok());
        assert_eq!(dca.deep_copy(), dca);
    }

    #[test]
    fn test_all_paths_order() {
        let mut dca = store();
        let opts = CreateOptions::schema_only();
        dca.create_array(&am_path(), "A", ElementKind::Int8, &[5], &[1], opts).unwrap();
        dca.create_array(&am_path(), "B", ElementKind::Int8, &[5], &[1], opts).unwrap();
        let paths: Vec<String> = dca.all_paths().iter().map(|p| p.serialize()).collect();
        assert_eq!(paths, vec!["DC", "DC|AM", "DC|AM|A", "DC|AM|B"]);
    }

    #[test]
    fn test_rename_outcomes() {
        let mut dca = store();
        dca.create_container("Other").unwrap();
        assert_eq!(dca.rename_data_container("DC", "DC"), RenameOutcome::SamePath);
        assert_eq!(dca.rename_data_container("DC", "Other"), RenameOutcome::NewExists);
        assert_eq!(dca.rename_data_container("Nope", "X"), RenameOutcome::OldDoesNotExist);
        assert_eq!(dca.rename_data_container("DC", "Renamed"), RenameOutcome::Success);
        assert!(dca.contains_container("Renamed"));

        let am = DataArrayPath::matrix("Renamed", "AM");
        assert_eq!(dca.rename_attribute_matrix(&am, "Cells"), RenameOutcome::Success);
        dca.create_array(
            &DataArrayPath::matrix("Renamed", "Cells"),
            "A",
            ElementKind::Int8,
            &[5],
            &[1],
            CreateOptions::schema_only(),
        )
        .unwrap();
        let a = DataArrayPath::new("Renamed", "Cells", "A");
        assert_eq!(dca.rename_attribute_array(&a, "B"), RenameOutcome::Success);
        assert_eq!(dca.rename_attribute_array(&a, "C"), RenameOutcome::OldDoesNotExist);
    }

    #[test]
    fn test_rename_data_array_paths() {
        let mut dca = store();
        dca.create_array(&am_path(), "Foo", ElementKind::Int8, &[5], &[1], CreateOptions::schema_only())
            .unwrap();
        dca.rename_data_array_paths(&[
            RenameEvent::new(am_path().with_array("Foo"), am_path().with_array("Bar")),
            RenameEvent::new(DataArrayPath::container("DC"), DataArrayPath::container("Data")),
        ]);
        assert!(dca.contains_path(&DataArrayPath::new("Data", "AM", "Bar")));
        assert!(!dca.contains_path(&DataArrayPath::container("DC")));
    }

    #[test]
    fn test_invalid_names_rejected() {
        let mut dca = DataContainerArray::new();
        assert!(matches!(dca.create_container(""), Err(DataError::InvalidName(_))));
        assert!(matches!(dca.create_container("a|b"), Err(DataError::InvalidName(_))));
        dca.create_container("DC").unwrap();
        assert!(matches!(dca.create_container("DC"), Err(DataError::AlreadyExists(_))));
    }

    #[test]
    fn test_schema_summary_serializes() {
        let mut dca = store();
        dca.create_array(&am_path(), "Foo", ElementKind::Float32, &[5], &[3], CreateOptions::schema_only())
            .unwrap();
        let schema = dca.schema();
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["containers"][0]["name"], "DC");
        assert_eq!(json["containers"][0]["matrices"][0]["arrays"][0]["kind"], "Float32");
        assert_eq!(
            json["containers"][0]["matrices"][0]["arrays"][0]["component_dims"],
            serde_json::json!([3])
        );
    }
}
