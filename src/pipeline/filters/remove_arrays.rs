//! RemoveArrays: deletes containers, matrices or arrays from the Store.
//!
//! Each entry of `DataArraysToRemove` is removed at the depth it names, so a
//! container path drops the whole container. Removal happens in preflight
//! too, which keeps later stages from validating against deleted data.

use super::core_metadata;
use crate::pipeline::error::PipelineResult;
use crate::pipeline::filter::{Filter, FilterContext, FilterMetadata, PathParameter};
use crate::pipeline::parameters::{read_params, write_params};
use crate::pipeline::path::{DataArrayPath, PathType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const METADATA: FilterMetadata = core_metadata(
    "RemoveArrays",
    "Delete Data",
    "Memory/Management",
    0x7b1c8f46_90dd_584a_b3ba_34e16958a7d0,
);

const ERR_MISSING_CONTAINER: i32 = -999;
const ERR_MISSING_MATRIX: i32 = -11008;
const WARN_MISSING_ARRAY: i32 = -11009;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoveArraysParams {
    #[serde(rename = "DataArraysToRemove")]
    pub data_arrays_to_remove: Vec<DataArrayPath>,
}

#[derive(Debug, Default)]
pub struct RemoveArrays {
    pub params: RemoveArraysParams,
}

impl RemoveArrays {
    pub fn new(paths: Vec<DataArrayPath>) -> Self {
        Self {
            params: RemoveArraysParams {
                data_arrays_to_remove: paths,
            },
        }
    }

    fn remove(path: &DataArrayPath, ctx: &mut FilterContext<'_>) {
        match path.path_type() {
            PathType::DataContainer => {
                if ctx.dca.remove_container(path.data_container_name()).is_none() {
                    ctx.set_error_condition(
                        ERR_MISSING_CONTAINER,
                        format!("The Data Container '{}' does not exist", path),
                    );
                }
            }
            PathType::AttributeMatrix => {
                if ctx.prereq_data_container(path, ERR_MISSING_CONTAINER).is_none() {
                    return;
                }
                if ctx.dca.remove_matrix(path).is_none() {
                    ctx.set_error_condition(
                        ERR_MISSING_MATRIX,
                        format!("The Attribute Matrix '{}' does not exist", path),
                    );
                }
            }
            PathType::DataArray => {
                if ctx.dca.get_matrix(path).is_err() {
                    ctx.set_error_condition(
                        ERR_MISSING_MATRIX,
                        format!("The Attribute Matrix '{}' does not exist", path.matrix_path()),
                    );
                    return;
                }
                if ctx.dca.remove_array(path).is_none() {
                    ctx.set_warning_condition(
                        WARN_MISSING_ARRAY,
                        format!("The Attribute Array '{}' does not exist and was not removed", path),
                    );
                }
            }
            PathType::None => tracing::debug!("Skipping empty removal path '{}'", path),
        }
    }
}

impl Filter for RemoveArrays {
    fn metadata(&self) -> FilterMetadata {
        METADATA
    }

    fn data_check(&mut self, ctx: &mut FilterContext<'_>) {
        ctx.clear_error_code();
        ctx.clear_warning_code();
        for path in &self.params.data_arrays_to_remove {
            Self::remove(path, ctx);
        }
    }

    fn execute(&mut self, ctx: &mut FilterContext<'_>) {
        self.data_check(ctx);
    }

    fn path_parameters_mut(&mut self) -> Vec<PathParameter<'_>> {
        self.params
            .data_arrays_to_remove
            .iter_mut()
            .map(PathParameter::selection)
            .collect()
    }

    fn read_json(&mut self, json: &Map<String, Value>) -> PipelineResult<()> {
        self.params = read_params(METADATA.class_name.as_ref(), json)?;
        Ok(())
    }

    fn write_json(&self, json: &mut Map<String, Value>) {
        write_params(&self.params, json);
    }
}
