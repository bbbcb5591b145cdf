//! RenameAttributeMatrix: renames a matrix inside its container.

use super::core_metadata;
use super::rename_attribute_array::{
    ERR_EMPTY_NAME, ERR_NEW_EXISTS, ERR_OLD_MISSING, ERR_PREREQ, ERR_SAME_NAME,
};
use crate::data::RenameOutcome;
use crate::pipeline::error::PipelineResult;
use crate::pipeline::filter::{Filter, FilterContext, FilterMetadata, PathParameter};
use crate::pipeline::parameters::{read_params, write_params};
use crate::pipeline::path::{DataArrayPath, RenameEvent};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const METADATA: FilterMetadata = core_metadata(
    "RenameAttributeMatrix",
    "Rename Attribute Matrix",
    "Memory/Management",
    0xee29e6d6_1f59_551b_9350_a696523261d5,
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenameAttributeMatrixParams {
    #[serde(rename = "SelectedAttributeMatrixPath")]
    pub selected_attribute_matrix_path: DataArrayPath,
    #[serde(rename = "NewAttributeMatrix")]
    pub new_attribute_matrix: String,
}

#[derive(Debug, Default)]
pub struct RenameAttributeMatrix {
    pub params: RenameAttributeMatrixParams,
    last_name: Option<String>,
    renamed: Vec<RenameEvent>,
}

impl RenameAttributeMatrix {
    pub fn new(selected: DataArrayPath, new_name: impl Into<String>) -> Self {
        Self {
            params: RenameAttributeMatrixParams {
                selected_attribute_matrix_path: selected,
                new_attribute_matrix: new_name.into(),
            },
            ..Default::default()
        }
    }

    fn renamed_to(&self, name: &str) -> DataArrayPath {
        DataArrayPath::matrix(
            self.params.selected_attribute_matrix_path.data_container_name(),
            name,
        )
    }
}

impl Filter for RenameAttributeMatrix {
    fn metadata(&self) -> FilterMetadata {
        METADATA
    }

    fn data_check(&mut self, ctx: &mut FilterContext<'_>) {
        ctx.clear_error_code();
        ctx.clear_warning_code();
        self.renamed.clear();

        let new_name = self.params.new_attribute_matrix.clone();
        if let Some(last) = self.last_name.replace(new_name.clone()) {
            if !last.is_empty() && last != new_name {
                let event = RenameEvent::new(self.renamed_to(&last), self.renamed_to(&new_name));
                self.renamed.push(event);
            }
        }

        if new_name.is_empty() {
            ctx.set_error_condition(ERR_EMPTY_NAME, "The new Attribute Matrix name must be set");
            return;
        }
        let selected = self.params.selected_attribute_matrix_path.matrix_path();
        if ctx.prereq_data_container(&selected, ERR_PREREQ).is_none() {
            return;
        }

        match ctx.dca.rename_attribute_matrix(&selected, &new_name) {
            RenameOutcome::Success => {
                let event = RenameEvent::new(selected, self.renamed_to(&new_name));
                self.renamed.push(event);
            }
            RenameOutcome::OldDoesNotExist => ctx.set_error_condition(
                ERR_OLD_MISSING,
                format!(
                    "An Attribute Matrix with the name '{}' was not found",
                    selected.attribute_matrix_name()
                ),
            ),
            RenameOutcome::NewExists => ctx.set_error_condition(
                ERR_NEW_EXISTS,
                format!("An Attribute Matrix with the name '{}' already exists", new_name),
            ),
            RenameOutcome::SamePath => ctx.set_error_condition(
                ERR_SAME_NAME,
                "The old and new Attribute Matrix names are the same",
            ),
        }
    }

    fn execute(&mut self, ctx: &mut FilterContext<'_>) {
        self.data_check(ctx);
    }

    fn renamed_paths(&self) -> Vec<RenameEvent> {
        self.renamed.clone()
    }

    fn path_parameters_mut(&mut self) -> Vec<PathParameter<'_>> {
        vec![PathParameter::selection(
            &mut self.params.selected_attribute_matrix_path,
        )]
    }

    fn read_json(&mut self, json: &Map<String, Value>) -> PipelineResult<()> {
        self.params = read_params(METADATA.class_name.as_ref(), json)?;
        Ok(())
    }

    fn write_json(&self, json: &mut Map<String, Value>) {
        write_params(&self.params, json);
    }
}
