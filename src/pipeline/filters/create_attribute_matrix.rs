//! CreateAttributeMatrix: adds an empty attribute matrix to an existing
//! data container.

use super::core_metadata;
use crate::pipeline::error::PipelineResult;
use crate::pipeline::filter::{Filter, FilterContext, FilterMetadata, PathParameter};
use crate::pipeline::parameters::{read_params, write_params};
use crate::pipeline::path::DataArrayPath;
use crate::types::AttributeMatrixType;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const METADATA: FilterMetadata = core_metadata(
    "CreateAttributeMatrix",
    "Create Attribute Matrix",
    "Generation",
    0x93375ef0_7367_5372_addc_baa019b1b341,
);

const ERR_MISSING_CONTAINER: i32 = -999;
const ERR_EMPTY_DIMS: i32 = -11000;
const ERR_CREATE: i32 = -11002;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateAttributeMatrixParams {
    #[serde(rename = "CreatedAttributeMatrix")]
    pub created_attribute_matrix: DataArrayPath,
    #[serde(rename = "AttributeMatrixType")]
    pub attribute_matrix_type: AttributeMatrixType,
    #[serde(rename = "TupleDimensions")]
    pub tuple_dimensions: Vec<usize>,
}

impl Default for CreateAttributeMatrixParams {
    fn default() -> Self {
        Self {
            created_attribute_matrix: DataArrayPath::matrix("DataContainer", "AttributeMatrix"),
            attribute_matrix_type: AttributeMatrixType::Generic,
            tuple_dimensions: vec![1],
        }
    }
}

#[derive(Debug, Default)]
pub struct CreateAttributeMatrix {
    pub params: CreateAttributeMatrixParams,
}

impl CreateAttributeMatrix {
    pub fn new(path: DataArrayPath, kind: AttributeMatrixType, tuple_dims: &[usize]) -> Self {
        Self {
            params: CreateAttributeMatrixParams {
                created_attribute_matrix: path,
                attribute_matrix_type: kind,
                tuple_dimensions: tuple_dims.to_vec(),
            },
        }
    }
}

impl Filter for CreateAttributeMatrix {
    fn metadata(&self) -> FilterMetadata {
        METADATA
    }

    fn data_check(&mut self, ctx: &mut FilterContext<'_>) {
        ctx.clear_error_code();
        ctx.clear_warning_code();

        let path = self.params.created_attribute_matrix.matrix_path();
        if ctx.prereq_data_container(&path, ERR_MISSING_CONTAINER).is_none() {
            return;
        }
        if self.params.tuple_dimensions.is_empty() {
            ctx.set_error_condition(
                ERR_EMPTY_DIMS,
                "The number of tuple dimensions must be at least one",
            );
            return;
        }

        let created = ctx
            .dca
            .create_matrix(
                &path,
                &self.params.tuple_dimensions,
                self.params.attribute_matrix_type,
            )
            .map(|_| ());
        if let Err(e) = created {
            ctx.set_error_condition(ERR_CREATE, format!("Unable to create Attribute Matrix: {}", e));
        }
    }

    fn execute(&mut self, ctx: &mut FilterContext<'_>) {
        self.data_check(ctx);
    }

    fn path_parameters_mut(&mut self) -> Vec<PathParameter<'_>> {
        vec![PathParameter::creation(&mut self.params.created_attribute_matrix)]
    }

    fn read_json(&mut self, json: &Map<String, Value>) -> PipelineResult<()> {
        self.params = read_params(METADATA.class_name.as_ref(), json)?;
        Ok(())
    }

    fn write_json(&self, json: &mut Map<String, Value>) {
        write_params(&self.params, json);
    }
}
