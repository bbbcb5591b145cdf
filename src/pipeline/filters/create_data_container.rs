//! CreateDataContainer: adds an empty data container to the Store.

use super::core_metadata;
use crate::data::{DataContainer, DataError};
use crate::pipeline::error::PipelineResult;
use crate::pipeline::filter::{Filter, FilterContext, FilterMetadata, PathParameter};
use crate::pipeline::parameters::{read_params, write_params};
use crate::pipeline::path::DataArrayPath;
use crate::types::Geometry;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const METADATA: FilterMetadata = core_metadata(
    "CreateDataContainer",
    "Create Data Container",
    "Generation",
    0x816fbe6b_7c38_581b_b149_3f839fb65b93,
);

const ERR_INVALID_NAME: i32 = -886;
const ERR_EXISTS: i32 = -887;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateDataContainerParams {
    #[serde(rename = "DataContainerName")]
    pub data_container_name: DataArrayPath,
    /// Geometry attached to the new container
    #[serde(rename = "Geometry", skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
}

impl Default for CreateDataContainerParams {
    fn default() -> Self {
        Self {
            data_container_name: DataArrayPath::container("DataContainer"),
            geometry: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct CreateDataContainer {
    pub params: CreateDataContainerParams,
}

impl CreateDataContainer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            params: CreateDataContainerParams {
                data_container_name: DataArrayPath::container(name),
                geometry: None,
            },
        }
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.params.geometry = Some(geometry);
        self
    }
}

impl Filter for CreateDataContainer {
    fn metadata(&self) -> FilterMetadata {
        METADATA
    }

    fn data_check(&mut self, ctx: &mut FilterContext<'_>) {
        ctx.clear_error_code();
        ctx.clear_warning_code();

        let name = self.params.data_container_name.data_container_name();
        if name.is_empty() {
            ctx.set_error_condition(ERR_INVALID_NAME, "The Data Container name cannot be empty");
            return;
        }
        if ctx.dca.contains_container(name) {
            ctx.set_error_condition(
                ERR_EXISTS,
                format!("The Data Container '{}' already exists", name),
            );
            return;
        }

        let mut dc = DataContainer::new(name);
        if let Some(geometry) = &self.params.geometry {
            dc = dc.with_geometry(geometry.clone());
        }
        match ctx.dca.add_container(dc).map(|_| ()) {
            Ok(_) => {}
            Err(e @ DataError::InvalidName(_)) => ctx.set_error_condition(ERR_INVALID_NAME, e.to_string()),
            Err(e) => ctx.set_error_condition(ERR_EXISTS, e.to_string()),
        }
    }

    fn execute(&mut self, ctx: &mut FilterContext<'_>) {
        self.data_check(ctx);
    }

    fn path_parameters_mut(&mut self) -> Vec<PathParameter<'_>> {
        vec![PathParameter::creation(&mut self.params.data_container_name)]
    }

    fn read_json(&mut self, json: &Map<String, Value>) -> PipelineResult<()> {
        self.params = read_params(METADATA.class_name.as_ref(), json)?;
        Ok(())
    }

    fn write_json(&self, json: &mut Map<String, Value>) {
        write_params(&self.params, json);
    }
}
