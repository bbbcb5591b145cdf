//! RenameDataContainer: renames a data container.

use super::core_metadata;
use super::rename_attribute_array::{ERR_EMPTY_NAME, ERR_NEW_EXISTS, ERR_OLD_MISSING, ERR_SAME_NAME};
use crate::data::RenameOutcome;
use crate::pipeline::error::PipelineResult;
use crate::pipeline::filter::{Filter, FilterContext, FilterMetadata, PathParameter};
use crate::pipeline::parameters::{read_params, write_params};
use crate::pipeline::path::{DataArrayPath, RenameEvent};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const METADATA: FilterMetadata = core_metadata(
    "RenameDataContainer",
    "Rename Data Container",
    "Memory/Management",
    0xd53c808f_004d_5fac_b125_0fffc8cc78d6,
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenameDataContainerParams {
    #[serde(rename = "SelectedDataContainerName")]
    pub selected_data_container_name: DataArrayPath,
    #[serde(rename = "NewDataContainerName")]
    pub new_data_container_name: String,
}

#[derive(Debug, Default)]
pub struct RenameDataContainer {
    pub params: RenameDataContainerParams,
    last_name: Option<String>,
    renamed: Vec<RenameEvent>,
}

impl RenameDataContainer {
    pub fn new(selected: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self {
            params: RenameDataContainerParams {
                selected_data_container_name: DataArrayPath::container(selected),
                new_data_container_name: new_name.into(),
            },
            ..Default::default()
        }
    }
}

impl Filter for RenameDataContainer {
    fn metadata(&self) -> FilterMetadata {
        METADATA
    }

    fn data_check(&mut self, ctx: &mut FilterContext<'_>) {
        ctx.clear_error_code();
        ctx.clear_warning_code();
        self.renamed.clear();

        let new_name = self.params.new_data_container_name.clone();
        if let Some(last) = self.last_name.replace(new_name.clone()) {
            if !last.is_empty() && last != new_name {
                self.renamed.push(RenameEvent::new(
                    DataArrayPath::container(last),
                    DataArrayPath::container(new_name.as_str()),
                ));
            }
        }

        if new_name.is_empty() {
            ctx.set_error_condition(ERR_EMPTY_NAME, "The new Data Container name must be set");
            return;
        }
        let old_name = self
            .params
            .selected_data_container_name
            .data_container_name()
            .to_string();

        match ctx.dca.rename_data_container(&old_name, &new_name) {
            RenameOutcome::Success => self.renamed.push(RenameEvent::new(
                DataArrayPath::container(old_name),
                DataArrayPath::container(new_name),
            )),
            RenameOutcome::OldDoesNotExist => ctx.set_error_condition(
                ERR_OLD_MISSING,
                format!("A Data Container with the name '{}' was not found", old_name),
            ),
            RenameOutcome::NewExists => ctx.set_error_condition(
                ERR_NEW_EXISTS,
                format!("A Data Container with the name '{}' already exists", new_name),
            ),
            RenameOutcome::SamePath => ctx.set_error_condition(
                ERR_SAME_NAME,
                "The old and new Data Container names are the same",
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
            &mut self.params.selected_data_container_name,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataContainerArray;
    use crate::pipeline::filters::test_support;
    use crate::types::AttributeMatrixType;

    fn store() -> DataContainerArray {
        let mut dca = DataContainerArray::new();
        dca.create_container("DC").unwrap();
        dca.create_container("Other").unwrap();
        dca.create_matrix(&DataArrayPath::matrix("DC", "AM"), &[1], AttributeMatrixType::Generic)
            .unwrap();
        dca
    }

    #[test]
    fn test_rename_container() {
        let mut dca = store();
        let mut filter = RenameDataContainer::new("DC", "Renamed");
        assert_eq!(test_support::execute(&mut filter, &mut dca).error_code, 0);
        assert!(dca.contains_path(&DataArrayPath::matrix("Renamed", "AM")));
        assert_eq!(filter.renamed_paths().len(), 1);
    }

    #[test]
    fn test_error_codes() {
        let cases = [
            ("DC", "", ERR_EMPTY_NAME),
            ("Missing", "X", ERR_OLD_MISSING),
            ("DC", "Other", ERR_NEW_EXISTS),
            ("DC", "DC", ERR_SAME_NAME),
        ];
        for (old, new, code) in cases {
            let mut filter = RenameDataContainer::new(old, new);
            assert_eq!(test_support::preflight(&mut filter, &mut store()).error_code, code);
        }
    }
}
