//! Filter factories and the registry that resolves them.
//!
//! A [`FilterFactory`] builds fresh stages of one type and exposes that
//! type's static metadata. [`FilterManager`] indexes factories by class name
//! and by UUID so pipeline files can be loaded with either.

use crate::pipeline::filter::{Filter, FilterMetadata};
use crate::pipeline::filters::{
    self, CreateAttributeMatrix, CreateDataArray, CreateDataContainer, EmptyFilter, RemoveArrays,
    RenameAttributeArray, RenameAttributeMatrix, RenameDataContainer,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Builds stages of a single type.
pub trait FilterFactory: Send + Sync {
    fn metadata(&self) -> FilterMetadata;

    fn create(&self) -> Box<dyn Filter>;
}

/// The built-in stage types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoreFilter {
    CreateDataContainer,
    CreateAttributeMatrix,
    CreateDataArray,
    RenameDataContainer,
    RenameAttributeMatrix,
    RenameAttributeArray,
    RemoveArrays,
    EmptyFilter,
}

impl CoreFilter {
    /// Get all built-in stage types.
    pub fn all() -> &'static [CoreFilter] {
        &[
            CoreFilter::CreateDataContainer,
            CoreFilter::CreateAttributeMatrix,
            CoreFilter::CreateDataArray,
            CoreFilter::RenameDataContainer,
            CoreFilter::RenameAttributeMatrix,
            CoreFilter::RenameAttributeArray,
            CoreFilter::RemoveArrays,
            CoreFilter::EmptyFilter,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CoreFilter::CreateDataContainer => "Create Data Container",
            CoreFilter::CreateAttributeMatrix => "Create Attribute Matrix",
            CoreFilter::CreateDataArray => "Create Data Array",
            CoreFilter::RenameDataContainer => "Rename Data Container",
            CoreFilter::RenameAttributeMatrix => "Rename Attribute Matrix",
            CoreFilter::RenameAttributeArray => "Rename Attribute Array",
            CoreFilter::RemoveArrays => "Delete Data",
            CoreFilter::EmptyFilter => "Unknown Filter",
        }
    }

    pub fn metadata(&self) -> FilterMetadata {
        match self {
            CoreFilter::CreateDataContainer => filters::create_data_container::METADATA,
            CoreFilter::CreateAttributeMatrix => filters::create_attribute_matrix::METADATA,
            CoreFilter::CreateDataArray => filters::create_data_array::METADATA,
            CoreFilter::RenameDataContainer => filters::rename_data_container::METADATA,
            CoreFilter::RenameAttributeMatrix => filters::rename_attribute_matrix::METADATA,
            CoreFilter::RenameAttributeArray => filters::rename_attribute_array::METADATA,
            CoreFilter::RemoveArrays => filters::remove_arrays::METADATA,
            CoreFilter::EmptyFilter => filters::empty_filter::METADATA,
        }
    }

    /// Get a short description of what this stage does.
    pub fn description(&self) -> &'static str {
        match self {
            CoreFilter::CreateDataContainer => "Adds an empty data container, optionally with a geometry.",
            CoreFilter::CreateAttributeMatrix => "Adds an empty attribute matrix to a data container.",
            CoreFilter::CreateDataArray => "Adds an array filled with a constant value.",
            CoreFilter::RenameDataContainer => "Renames a data container.",
            CoreFilter::RenameAttributeMatrix => "Renames an attribute matrix.",
            CoreFilter::RenameAttributeArray => "Renames an attribute array.",
            CoreFilter::RemoveArrays => "Deletes containers, matrices or arrays.",
            CoreFilter::EmptyFilter => "Placeholder for a stage that could not be loaded.",
        }
    }
}

impl FilterFactory for CoreFilter {
    fn metadata(&self) -> FilterMetadata {
        CoreFilter::metadata(self)
    }

    fn create(&self) -> Box<dyn Filter> {
        match self {
            CoreFilter::CreateDataContainer => Box::new(CreateDataContainer::default()),
            CoreFilter::CreateAttributeMatrix => Box::new(CreateAttributeMatrix::default()),
            CoreFilter::CreateDataArray => Box::new(CreateDataArray::default()),
            CoreFilter::RenameDataContainer => Box::new(RenameDataContainer::default()),
            CoreFilter::RenameAttributeMatrix => Box::new(RenameAttributeMatrix::default()),
            CoreFilter::RenameAttributeArray => Box::new(RenameAttributeArray::default()),
            CoreFilter::RemoveArrays => Box::new(RemoveArrays::default()),
            CoreFilter::EmptyFilter => Box::new(EmptyFilter::default()),
        }
    }
}

impl std::fmt::Display for CoreFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Registry of filter factories.
#[derive(Default, Clone)]
pub struct FilterManager {
    factories: Vec<Arc<dyn FilterFactory>>,
    by_name: HashMap<String, usize>,
    by_uuid: HashMap<Uuid, usize>,
}

impl FilterManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every [`CoreFilter`].
    pub fn with_core_filters() -> Self {
        let mut manager = Self::new();
        for core in CoreFilter::all() {
            manager.register(Arc::new(*core));
        }
        manager
    }

    /// Register `factory`, replacing any factory with the same class name.
    pub fn register(&mut self, factory: Arc<dyn FilterFactory>) {
        let metadata = factory.metadata();
        let class_name = metadata.class_name.into_owned();
        let index = match self.by_name.get(&class_name) {
            Some(&index) => {
                tracing::debug!("Replacing filter factory '{}'", class_name);
                let old_uuid = self.factories[index].metadata().uuid;
                self.by_uuid.remove(&old_uuid);
                self.factories[index] = factory;
                index
            }
            None => {
                self.factories.push(factory);
                self.factories.len() - 1
            }
        };
        self.by_name.insert(class_name, index);
        if !metadata.uuid.is_nil() {
            self.by_uuid.insert(metadata.uuid, index);
        }
    }

    pub fn factory_for_name(&self, class_name: &str) -> Option<&Arc<dyn FilterFactory>> {
        self.by_name.get(class_name).map(|&i| &self.factories[i])
    }

    pub fn factory_for_uuid(&self, uuid: &Uuid) -> Option<&Arc<dyn FilterFactory>> {
        self.by_uuid.get(uuid).map(|&i| &self.factories[i])
    }

    /// Resolve by UUID first, then by class name.
    pub fn resolve(&self, uuid: Option<&Uuid>, class_name: &str) -> Option<&Arc<dyn FilterFactory>> {
        uuid.and_then(|uuid| self.factory_for_uuid(uuid))
            .or_else(|| self.factory_for_name(class_name))
    }

    pub fn create(&self, class_name: &str) -> Option<Box<dyn Filter>> {
        self.factory_for_name(class_name).map(|f| f.create())
    }

    /// Registered class names, sorted.
    pub fn class_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.by_name.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for FilterManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterManager")
            .field("class_names", &self.class_names())
            .finish()
    }
}
