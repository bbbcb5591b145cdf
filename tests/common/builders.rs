//! Test data builders for creating pipelines

use matpipe::pipeline::filters::{
    CreateAttributeMatrix, CreateDataArray, CreateDataContainer, RemoveArrays,
    RenameAttributeArray, RenameAttributeMatrix, RenameDataContainer,
};
use matpipe::pipeline::{DataArrayPath, Filter, FilterPipeline, Observer};
use matpipe::{AttributeMatrixType, ElementKind};
use std::sync::Arc;

/// Builder for creating test pipelines
pub struct PipelineBuilder {
    pipeline: FilterPipeline,
}

impl PipelineBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            pipeline: FilterPipeline::new(name),
        }
    }

    pub fn stage(mut self, filter: impl Filter + 'static) -> Self {
        self.pipeline.push_back(Box::new(filter));
        self
    }

    pub fn disabled(mut self, filter: impl Filter + 'static) -> Self {
        self.pipeline.push_back(Box::new(filter));
        let last = self.pipeline.len() - 1;
        self.pipeline.set_enabled(last, false);
        self
    }

    pub fn container(self, name: &str) -> Self {
        self.stage(CreateDataContainer::new(name))
    }

    pub fn matrix(self, path: DataArrayPath, tuple_dims: &[usize]) -> Self {
        self.stage(CreateAttributeMatrix::new(
            path,
            AttributeMatrixType::Generic,
            tuple_dims,
        ))
    }

    pub fn array(self, path: DataArrayPath, kind: ElementKind, tuple_dims: &[usize]) -> Self {
        self.stage(CreateDataArray::new(path, kind, tuple_dims))
    }

    pub fn filled_array(
        self,
        path: DataArrayPath,
        kind: ElementKind,
        tuple_dims: &[usize],
        value: &str,
    ) -> Self {
        self.stage(CreateDataArray::new(path, kind, tuple_dims).with_value(value))
    }

    pub fn rename_array(self, path: DataArrayPath, new_name: &str) -> Self {
        self.stage(RenameAttributeArray::new(path, new_name))
    }

    pub fn rename_matrix(self, path: DataArrayPath, new_name: &str) -> Self {
        self.stage(RenameAttributeMatrix::new(path, new_name))
    }

    pub fn rename_container(self, name: &str, new_name: &str) -> Self {
        self.stage(RenameDataContainer::new(name, new_name))
    }

    pub fn remove(self, paths: Vec<DataArrayPath>) -> Self {
        self.stage(RemoveArrays::new(paths))
    }

    pub fn observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.pipeline.add_observer(observer);
        self
    }

    pub fn build(self) -> FilterPipeline {
        self.pipeline
    }
}
