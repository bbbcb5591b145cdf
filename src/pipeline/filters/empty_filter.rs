//! EmptyFilter: placeholder for a stage the registry could not build.
//!
//! The placeholder keeps the original JSON object untouched so that saving
//! the pipeline again writes the unknown stage back out as it was read.

use super::core_metadata;
use crate::pipeline::error::{PipelineResult, ERR_UNKNOWN_FILTER};
use crate::pipeline::filter::{Filter, FilterContext, FilterMetadata};
use serde_json::{Map, Value};

pub const METADATA: FilterMetadata = core_metadata(
    "EmptyFilter",
    "Unknown Filter",
    "Misc",
    0x0af0e81f_1f98_5734_a38a_74cfccd6e6f8,
);

const ORIGINAL_FILTER_NAME: &str = "OriginalFilterName";

#[derive(Debug, Default)]
pub struct EmptyFilter {
    original_filter_name: String,
    original_json: Map<String, Value>,
}

impl EmptyFilter {
    pub fn new(original_filter_name: impl Into<String>) -> Self {
        let original_filter_name = original_filter_name.into();
        let mut original_json = Map::new();
        original_json.insert(
            ORIGINAL_FILTER_NAME.to_string(),
            Value::from(original_filter_name.as_str()),
        );
        Self {
            original_filter_name,
            original_json,
        }
    }

    pub fn original_filter_name(&self) -> &str {
        &self.original_filter_name
    }

    fn report(&self, ctx: &mut FilterContext<'_>) {
        ctx.set_error_condition(
            ERR_UNKNOWN_FILTER,
            format!(
                "This filter does nothing and was inserted as a placeholder for '{}', which is not available",
                self.original_filter_name
            ),
        );
    }
}

impl Filter for EmptyFilter {
    fn metadata(&self) -> FilterMetadata {
        METADATA
    }

    fn human_label(&self) -> String {
        if self.original_filter_name.is_empty() {
            METADATA.human_label.into_owned()
        } else {
            format!("UNKNOWN FILTER: {}", self.original_filter_name)
        }
    }

    fn data_check(&mut self, ctx: &mut FilterContext<'_>) {
        ctx.clear_error_code();
        ctx.clear_warning_code();
        self.report(ctx);
    }

    fn execute(&mut self, ctx: &mut FilterContext<'_>) {
        ctx.clear_error_code();
        self.report(ctx);
    }

    fn read_json(&mut self, json: &Map<String, Value>) -> PipelineResult<()> {
        self.original_filter_name = json
            .get(ORIGINAL_FILTER_NAME)
            .or_else(|| json.get("Filter_Name"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        self.original_json = json.clone();
        Ok(())
    }

    fn write_json(&self, json: &mut Map<String, Value>) {
        json.extend(self.original_json.clone());
    }
}
