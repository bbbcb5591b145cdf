//! CreateDataArray: adds a typed array filled with a constant value.
//!
//! Missing parents are created on the way: the data container if it does
//! not exist, and a `Generic` attribute matrix sized by `TupleDimensions`
//! if the matrix does not exist. When the matrix already exists its tuple
//! shape wins, and a non-empty `TupleDimensions` that disagrees with it is
//! an error.

use super::core_metadata;
use crate::data::{CreateOptions, DataArray};
use crate::pipeline::error::PipelineResult;
use crate::pipeline::filter::{Filter, FilterContext, FilterMetadata, PathParameter};
use crate::pipeline::parameters::{read_params, write_params};
use crate::pipeline::path::DataArrayPath;
use crate::types::{shape_len, AttributeMatrixType, ElementKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const METADATA: FilterMetadata = core_metadata(
    "CreateDataArray",
    "Create Data Array",
    "Generation",
    0x77f392fb_c1eb_57da_a1b1_e7acf9239fb8,
);

const ERR_BAD_VALUE: i32 = -5400;
const ERR_COMPONENTS: i32 = -5401;
const ERR_TUPLE_SHAPE: i32 = -5402;
const ERR_CREATE: i32 = -5403;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateDataArrayParams {
    #[serde(rename = "NewArray")]
    pub new_array: DataArrayPath,
    #[serde(rename = "ScalarType")]
    pub scalar_type: ElementKind,
    #[serde(rename = "NumberOfComponents")]
    pub number_of_components: usize,
    /// Shape of the matrix to create when it does not exist yet
    #[serde(rename = "TupleDimensions")]
    pub tuple_dimensions: Vec<usize>,
    #[serde(rename = "InitializationValue")]
    pub initialization_value: String,
}

impl Default for CreateDataArrayParams {
    fn default() -> Self {
        Self {
            new_array: DataArrayPath::new("DataContainer", "AttributeMatrix", "NewArray"),
            scalar_type: ElementKind::Int32,
            number_of_components: 1,
            tuple_dimensions: Vec::new(),
            initialization_value: "0".to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CreateDataArray {
    pub params: CreateDataArrayParams,
}

impl CreateDataArray {
    pub fn new(path: DataArrayPath, kind: ElementKind, tuple_dims: &[usize]) -> Self {
        Self {
            params: CreateDataArrayParams {
                new_array: path,
                scalar_type: kind,
                tuple_dimensions: tuple_dims.to_vec(),
                ..Default::default()
            },
        }
    }

    pub fn with_components(mut self, components: usize) -> Self {
        self.params.number_of_components = components;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.params.initialization_value = value.into();
        self
    }

    fn ensure_parents(&self, ctx: &mut FilterContext<'_>) -> bool {
        let path = &self.params.new_array;
        let dims = &self.params.tuple_dimensions;
        let Some(requested) = shape_len(dims) else {
            ctx.set_error_condition(
                ERR_TUPLE_SHAPE,
                format!("Tuple dimensions {:?} overflow the tuple count", dims),
            );
            return false;
        };
        if !ctx.dca.contains_container(path.data_container_name()) {
            if let Err(e) = ctx.dca.create_container(path.data_container_name()).map(|_| ()) {
                ctx.set_error_condition(ERR_CREATE, e.to_string());
                return false;
            }
        }

        let am_path = path.matrix_path();
        let existing = ctx.dca.get_matrix(&am_path).map(|am| am.num_tuples()).ok();
        match existing {
            None if dims.is_empty() => {
                ctx.set_error_condition(
                    ERR_TUPLE_SHAPE,
                    format!(
                        "Attribute Matrix '{}' does not exist and no tuple dimensions were given",
                        am_path
                    ),
                );
                false
            }
            None => {
                let created = ctx
                    .dca
                    .create_matrix(&am_path, dims, AttributeMatrixType::Generic)
                    .map(|_| ());
                if let Err(e) = created {
                    ctx.set_error_condition(ERR_CREATE, e.to_string());
                    return false;
                }
                true
            }
            Some(tuples) if !dims.is_empty() && requested != tuples => {
                ctx.set_error_condition(
                    ERR_TUPLE_SHAPE,
                    format!(
                        "Tuple dimensions {:?} do not match the {} tuples of '{}'",
                        dims, tuples, am_path
                    ),
                );
                false
            }
            Some(_) => true,
        }
    }
}

impl Filter for CreateDataArray {
    fn metadata(&self) -> FilterMetadata {
        METADATA
    }

    fn data_check(&mut self, ctx: &mut FilterContext<'_>) {
        ctx.clear_error_code();
        ctx.clear_warning_code();

        if self.params.number_of_components < 1 {
            ctx.set_error_condition(ERR_COMPONENTS, "The number of components must be at least 1");
            return;
        }
        let mut sample = DataArray::new("sample", self.params.scalar_type, 1, &[1], true);
        if !sample.fill_from_str(&self.params.initialization_value) {
            ctx.set_error_condition(
                ERR_BAD_VALUE,
                format!(
                    "Initialization value '{}' is not a valid {}",
                    self.params.initialization_value, self.params.scalar_type
                ),
            );
            return;
        }
        if !self.ensure_parents(ctx) {
            return;
        }

        let path = self.params.new_array.clone();
        let am_path = path.matrix_path();
        let tuple_dims = match ctx.dca.get_matrix(&am_path) {
            Ok(am) => am.tuple_dims().to_vec(),
            Err(e) => {
                ctx.set_error_condition(ERR_CREATE, e.to_string());
                return;
            }
        };
        let created = ctx
            .dca
            .create_array(
                &am_path,
                path.data_array_name(),
                self.params.scalar_type,
                &tuple_dims,
                &[self.params.number_of_components],
                CreateOptions::for_phase(ctx.in_preflight()),
            )
            .map(|_| ());
        if let Err(e) = created {
            ctx.set_error_condition(ERR_CREATE, format!("Unable to create '{}': {}", path, e));
        }
    }

    fn execute(&mut self, ctx: &mut FilterContext<'_>) {
        self.data_check(ctx);
        if ctx.error_code() < 0 {
            return;
        }
        let filled = ctx
            .dca
            .get_array_mut(&self.params.new_array)
            .map(|array| array.fill_from_str(&self.params.initialization_value))
            .unwrap_or(false);
        if !filled {
            ctx.set_error_condition(
                ERR_BAD_VALUE,
                format!("Unable to initialize '{}'", self.params.new_array),
            );
        }
    }

    fn path_parameters_mut(&mut self) -> Vec<PathParameter<'_>> {
        vec![PathParameter::creation(&mut self.params.new_array)]
    }

    fn read_json(&mut self, json: &Map<String, Value>) -> PipelineResult<()> {
        self.params = read_params(METADATA.class_name.as_ref(), json)?;
        Ok(())
    }

    fn write_json(&self, json: &mut Map<String, Value>) {
        write_params(&self.params, json);
    }
}
