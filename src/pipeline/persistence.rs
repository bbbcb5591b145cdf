//! Pipeline files.
//!
//! A pipeline is stored as one JSON object. Each stage lives under its
//! 0-based position as a string key, next to a `"PipelineBuilder"` block:
//!
//! ```json
//! {
//!   "0": { "Filter_Name": "CreateDataArray", "Filter_Uuid": "{77f3...}", ... },
//!   "PipelineBuilder": { "Name": "Demo", "Version": 6, "Number_Filters": 1 }
//! }
//! ```
//!
//! Stages are resolved through a [`FilterManager`], by UUID first and class
//! name second. A stage that cannot be resolved is loaded as an
//! [`EmptyFilter`] so the pipeline keeps its length and order.

use crate::pipeline::error::{PipelineError, PipelineResult, ERR_UNKNOWN_FILTER};
use crate::pipeline::executor::{FilterPipeline, PIPELINE_CLASS_NAME, PIPELINE_VERSION};
use crate::pipeline::factory::FilterManager;
use crate::pipeline::filter::Filter;
use crate::pipeline::filters::EmptyFilter;
use crate::pipeline::message::{Message, MessageSource, Observer};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use uuid::Uuid;

pub const PIPELINE_BUILDER: &str = "PipelineBuilder";
pub const PIPELINE_NAME: &str = "Name";
pub const PIPELINE_FILE_VERSION: &str = "Version";
pub const NUMBER_FILTERS: &str = "Number_Filters";

pub const FILTER_NAME: &str = "Filter_Name";
pub const FILTER_HUMAN_LABEL: &str = "Filter_Human_Label";
pub const FILTER_UUID: &str = "Filter_Uuid";
pub const FILTER_ENABLED: &str = "Filter_Enabled";
pub const FILTER_VERSION: &str = "FilterVersion";
pub const GROUP_NAME: &str = "Group_Name";
pub const SUBGROUP_NAME: &str = "SubGroup_Name";

impl FilterPipeline {
    /// Serialize the stage list and its configuration.
    pub fn to_json(&self) -> Value {
        let mut root = Map::new();
        for (i, slot) in self.slots().iter().enumerate() {
            root.insert(
                i.to_string(),
                Value::Object(filter_to_json(slot.filter(), slot.is_enabled())),
            );
        }
        let mut builder = Map::new();
        builder.insert(PIPELINE_NAME.into(), Value::from(self.name()));
        builder.insert(PIPELINE_FILE_VERSION.into(), Value::from(PIPELINE_VERSION));
        builder.insert(NUMBER_FILTERS.into(), Value::from(self.len()));
        root.insert(PIPELINE_BUILDER.into(), Value::Object(builder));
        Value::Object(root)
    }

    /// Rebuild a pipeline from [`FilterPipeline::to_json`] output.
    ///
    /// Unknown stages become [`EmptyFilter`] placeholders and are reported
    /// to `observer` with code [`ERR_UNKNOWN_FILTER`].
    pub fn from_json(
        json: &Value,
        manager: &FilterManager,
        observer: Option<&dyn Observer>,
    ) -> PipelineResult<FilterPipeline> {
        let root = json
            .as_object()
            .ok_or_else(|| PipelineError::InvalidFormat("root is not a JSON object".into()))?;
        let builder = root
            .get(PIPELINE_BUILDER)
            .and_then(Value::as_object)
            .ok_or_else(|| {
                PipelineError::InvalidFormat(format!("missing '{}' block", PIPELINE_BUILDER))
            })?;
        let count = builder
            .get(NUMBER_FILTERS)
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                PipelineError::InvalidFormat(format!("missing '{}'", NUMBER_FILTERS))
            })?;
        let name = builder
            .get(PIPELINE_NAME)
            .and_then(Value::as_str)
            .unwrap_or_default();

        let mut pipeline = FilterPipeline::new(name);
        for i in 0..count as usize {
            let filter_json = root
                .get(&i.to_string())
                .and_then(Value::as_object)
                .ok_or_else(|| PipelineError::InvalidFormat(format!("missing filter {}", i)))?;
            let filter = filter_from_json(filter_json, manager, i, name, observer)?;
            let enabled = filter_json
                .get(FILTER_ENABLED)
                .and_then(Value::as_bool)
                .unwrap_or(true);
            pipeline.push_back(filter);
            pipeline.set_enabled(i, enabled);
        }
        tracing::debug!("Loaded pipeline '{}' with {} filters", name, pipeline.len());
        Ok(pipeline)
    }

    /// Independent copy of the stage list, built through `manager`.
    ///
    /// Observers and run state are not copied.
    pub fn deep_copy(&self, manager: &FilterManager) -> PipelineResult<FilterPipeline> {
        FilterPipeline::from_json(&self.to_json(), manager, None)
    }
}

fn filter_to_json(filter: &dyn Filter, enabled: bool) -> Map<String, Value> {
    let metadata = filter.metadata();
    let mut json = filter.properties();
    json.entry(FILTER_NAME)
        .or_insert_with(|| Value::from(&*metadata.class_name));
    json.entry(FILTER_HUMAN_LABEL)
        .or_insert_with(|| Value::from(filter.human_label()));
    json.entry(FILTER_UUID)
        .or_insert_with(|| Value::from(metadata.uuid.braced().to_string()));
    json.entry(FILTER_VERSION)
        .or_insert_with(|| Value::from(&*metadata.version));
    json.entry(GROUP_NAME)
        .or_insert_with(|| Value::from(&*metadata.group_name));
    json.entry(SUBGROUP_NAME)
        .or_insert_with(|| Value::from(&*metadata.subgroup_name));
    json.insert(FILTER_ENABLED.into(), Value::Bool(enabled));
    json
}

fn filter_from_json(
    json: &Map<String, Value>,
    manager: &FilterManager,
    index: usize,
    pipeline_name: &str,
    observer: Option<&dyn Observer>,
) -> PipelineResult<Box<dyn Filter>> {
    let class_name = json
        .get(FILTER_NAME)
        .and_then(Value::as_str)
        .unwrap_or_default();
    let uuid = json
        .get(FILTER_UUID)
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok());

    if let Some(factory) = manager.resolve(uuid.as_ref(), class_name) {
        let mut filter = factory.create();
        filter.read_json(json)?;
        return Ok(filter);
    }

    tracing::warn!("No implementation for filter '{}' at index {}", class_name, index);
    if let Some(observer) = observer {
        observer.process_message(&Message::Error {
            source: MessageSource::new(PIPELINE_CLASS_NAME, pipeline_name).at(index),
            code: ERR_UNKNOWN_FILTER,
            text: format!(
                "An implementation for filter '{}' could not be located. \
                 A placeholder was inserted at index {}.",
                class_name, index
            ),
        });
    }
    let mut placeholder = EmptyFilter::default();
    placeholder.read_json(json)?;
    Ok(Box::new(placeholder))
}

/// Load a pipeline file. A file without a pipeline name is named after its
/// file stem.
pub fn read_pipeline_file(
    path: impl AsRef<Path>,
    manager: &FilterManager,
    observer: Option<&dyn Observer>,
) -> PipelineResult<FilterPipeline> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let json: Value = serde_json::from_str(&text)?;
    let mut pipeline = FilterPipeline::from_json(&json, manager, observer)?;
    if pipeline.name().is_empty() {
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            pipeline.set_name(stem);
        }
    }
    tracing::info!("Read pipeline '{}' from {}", pipeline.name(), path.display());
    Ok(pipeline)
}

/// Write `pipeline` as pretty-printed JSON, creating parent directories.
pub fn write_pipeline_file(pipeline: &FilterPipeline, path: impl AsRef<Path>) -> PipelineResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = serde_json::to_string_pretty(&pipeline.to_json())?;
    fs::write(path, text)?;
    tracing::info!("Wrote pipeline '{}' to {}", pipeline.name(), path.display());
    Ok(())
}
