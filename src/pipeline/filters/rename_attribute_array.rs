//! RenameAttributeArray: renames one array inside its matrix.
//!
//! The rename happens on the Store in both phases and is reported through
//! [`Filter::renamed_paths`] so downstream stages follow it. When the new
//! name is edited between two preflights, the previous new name is reported
//! as renamed as well, which keeps stages that already point at it in step.

use super::core_metadata;
use crate::data::RenameOutcome;
use crate::pipeline::error::PipelineResult;
use crate::pipeline::filter::{Filter, FilterContext, FilterMetadata, PathParameter};
use crate::pipeline::parameters::{read_params, write_params};
use crate::pipeline::path::{DataArrayPath, RenameEvent};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const METADATA: FilterMetadata = core_metadata(
    "RenameAttributeArray",
    "Rename Attribute Array",
    "Memory/Management",
    0x53a5f731_2858_5e3e_bd43_8f2cf45d90ec,
);

pub(crate) const ERR_EMPTY_NAME: i32 = -11009;
pub(crate) const ERR_OLD_MISSING: i32 = -11016;
pub(crate) const ERR_NEW_EXISTS: i32 = -11017;
pub(crate) const ERR_SAME_NAME: i32 = -11018;
pub(crate) const ERR_PREREQ: i32 = -301;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenameAttributeArrayParams {
    #[serde(rename = "SelectedArrayPath")]
    pub selected_array_path: DataArrayPath,
    #[serde(rename = "NewArrayName")]
    pub new_array_name: String,
}

#[derive(Debug, Default)]
pub struct RenameAttributeArray {
    pub params: RenameAttributeArrayParams,
    /// New name seen by the previous data check
    last_name: Option<String>,
    renamed: Vec<RenameEvent>,
}

impl RenameAttributeArray {
    pub fn new(selected: DataArrayPath, new_name: impl Into<String>) -> Self {
        Self {
            params: RenameAttributeArrayParams {
                selected_array_path: selected,
                new_array_name: new_name.into(),
            },
            ..Default::default()
        }
    }

    fn renamed_to(&self, name: &str) -> DataArrayPath {
        let mut path = self.params.selected_array_path.clone();
        path.set_data_array_name(name);
        path
    }
}

impl Filter for RenameAttributeArray {
    fn metadata(&self) -> FilterMetadata {
        METADATA
    }

    fn data_check(&mut self, ctx: &mut FilterContext<'_>) {
        ctx.clear_error_code();
        ctx.clear_warning_code();
        self.renamed.clear();

        let new_name = self.params.new_array_name.clone();
        if let Some(last) = self.last_name.replace(new_name.clone()) {
            if !last.is_empty() && last != new_name {
                let event = RenameEvent::new(self.renamed_to(&last), self.renamed_to(&new_name));
                self.renamed.push(event);
            }
        }

        if new_name.is_empty() {
            ctx.set_error_condition(ERR_EMPTY_NAME, "The new Attribute Array name must be set");
            return;
        }
        let selected = self.params.selected_array_path.clone();
        if ctx.prereq_attribute_matrix(&selected, ERR_PREREQ).is_none() {
            return;
        }

        match ctx.dca.rename_attribute_array(&selected, &new_name) {
            RenameOutcome::Success => {
                let event = RenameEvent::new(selected.clone(), self.renamed_to(&new_name));
                self.renamed.push(event);
            }
            RenameOutcome::OldDoesNotExist => ctx.set_error_condition(
                ERR_OLD_MISSING,
                format!("A DataArray with the name '{}' was not found", selected.data_array_name()),
            ),
            RenameOutcome::NewExists => ctx.set_error_condition(
                ERR_NEW_EXISTS,
                format!("A DataArray with the name '{}' already exists", new_name),
            ),
            RenameOutcome::SamePath => ctx.set_error_condition(
                ERR_SAME_NAME,
                "The old and new array names are the same",
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
        vec![PathParameter::selection(&mut self.params.selected_array_path)]
    }

    fn read_json(&mut self, json: &Map<String, Value>) -> PipelineResult<()> {
        self.params = read_params(METADATA.class_name.as_ref(), json)?;
        Ok(())
    }

    fn write_json(&self, json: &mut Map<String, Value>) {
        write_params(&self.params, json);
    }
}
