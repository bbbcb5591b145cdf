//! The stage contract.
//!
//! Every pipeline unit implements [`Filter`]. The orchestrator calls
//! `preflight()` against a schema-only Store and later `execute()` against
//! the live Store, each time through a [`FilterContext`] that carries the
//! Store, the message bus for that call and the shared cancel flag.
//!
//! Stages never return `Result` from these hooks. They report failure by
//! setting a negative error code on the context, which also publishes an
//! `Error` message naming the stage.

use crate::data::{ArrayElement, AttributeMatrix, DataArray, DataContainer, DataContainerArray};
use crate::pipeline::error::PipelineResult;
use crate::pipeline::message::{Message, MessageBus, MessageSource};
use crate::pipeline::path::{DataArrayPath, RenameEvent};
use crate::pipeline::rename;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

/// Static identity of a filter type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterMetadata {
    pub class_name: Cow<'static, str>,
    pub human_label: Cow<'static, str>,
    pub group_name: Cow<'static, str>,
    pub subgroup_name: Cow<'static, str>,
    pub uuid: Uuid,
    pub version: Cow<'static, str>,
}

/// How a path-valued parameter relates to the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRole {
    /// Names something the stage reads or modifies
    Selection,
    /// Names something the stage creates
    Creation,
}

/// A path-valued parameter exposed for rename substitution.
#[derive(Debug)]
pub struct PathParameter<'a> {
    pub role: PathRole,
    pub path: &'a mut DataArrayPath,
}

impl<'a> PathParameter<'a> {
    pub fn selection(path: &'a mut DataArrayPath) -> Self {
        Self {
            role: PathRole::Selection,
            path,
        }
    }

    pub fn creation(path: &'a mut DataArrayPath) -> Self {
        Self {
            role: PathRole::Creation,
            path,
        }
    }
}

/// One pipeline stage.
pub trait Filter: Send {
    fn metadata(&self) -> FilterMetadata;

    fn human_label(&self) -> String {
        self.metadata().human_label.into_owned()
    }

    /// Validate configuration and declare output schema.
    fn data_check(&mut self, ctx: &mut FilterContext<'_>);

    /// Schema-only pass. Defaults to [`Filter::data_check`].
    fn preflight(&mut self, ctx: &mut FilterContext<'_>) {
        self.data_check(ctx);
    }

    /// Real computation against the live Store.
    fn execute(&mut self, ctx: &mut FilterContext<'_>);

    /// Renames this stage performs on paths it did not create.
    fn renamed_paths(&self) -> Vec<RenameEvent> {
        Vec::new()
    }

    /// Paths that exist in `after` but not in `before`.
    fn created_paths(
        &self,
        before: Option<&DataContainerArray>,
        after: &DataContainerArray,
    ) -> Vec<DataArrayPath> {
        rename::created_paths(before, after)
    }

    /// Every path-valued parameter, in declaration order.
    fn path_parameters_mut(&mut self) -> Vec<PathParameter<'_>> {
        Vec::new()
    }

    /// Load parameters from a JSON object keyed by property name.
    fn read_json(&mut self, json: &Map<String, Value>) -> PipelineResult<()>;

    /// Store parameters into a JSON object keyed by property name.
    fn write_json(&self, json: &mut Map<String, Value>);

    /// Release per-run resources after the execute pass.
    fn cleanup(&mut self) {}

    fn properties(&self) -> Map<String, Value> {
        let mut json = Map::new();
        self.write_json(&mut json);
        json
    }

    fn set_properties(&mut self, json: &Map<String, Value>) -> PipelineResult<()> {
        self.read_json(json)
    }

    /// Apply `rename` to every path parameter unless this stage creates
    /// `rename.old` itself.
    fn rename_data_array_path(&mut self, rename: &RenameEvent) {
        let creates_old = self
            .path_parameters_mut()
            .iter()
            .any(|p| p.role == PathRole::Creation && *p.path == rename.old);
        if creates_old {
            return;
        }
        for param in self.path_parameters_mut() {
            param.path.update_path(rename);
        }
    }
}

/// Everything a stage may touch during one `preflight()` or `execute()`.
pub struct FilterContext<'a> {
    /// The Store this call operates on.
    pub dca: &'a mut DataContainerArray,
    bus: &'a MessageBus,
    source: MessageSource,
    cancel: &'a AtomicBool,
    in_preflight: bool,
    error_code: i32,
    warning_code: i32,
}

impl<'a> FilterContext<'a> {
    pub fn new(
        dca: &'a mut DataContainerArray,
        bus: &'a MessageBus,
        source: MessageSource,
        cancel: &'a AtomicBool,
        in_preflight: bool,
    ) -> Self {
        Self {
            dca,
            bus,
            source,
            cancel,
            in_preflight,
            error_code: 0,
            warning_code: 0,
        }
    }

    pub fn in_preflight(&self) -> bool {
        self.in_preflight
    }

    pub fn source(&self) -> &MessageSource {
        &self.source
    }

    pub fn error_code(&self) -> i32 {
        self.error_code
    }

    pub fn warning_code(&self) -> i32 {
        self.warning_code
    }

    /// True once cancellation has been requested.
    pub fn is_canceled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Record an error code and publish an `Error` message.
    pub fn set_error_condition(&mut self, code: i32, text: impl Into<String>) {
        self.error_code = code;
        self.bus.publish(Message::Error {
            source: self.source.clone(),
            code,
            text: text.into(),
        });
    }

    /// Record a warning code and publish a `Warning` message.
    pub fn set_warning_condition(&mut self, code: i32, text: impl Into<String>) {
        self.warning_code = code;
        self.bus.publish(Message::Warning {
            source: self.source.clone(),
            code,
            text: text.into(),
        });
    }

    pub fn clear_error_code(&mut self) {
        self.error_code = 0;
    }

    pub fn clear_warning_code(&mut self) {
        self.warning_code = 0;
    }

    pub fn notify_status(&self, text: impl Into<String>) {
        self.bus.publish(Message::Status {
            source: self.source.clone(),
            text: text.into(),
        });
    }

    pub fn notify_progress(&self, percent: i32) {
        self.bus.publish(Message::Progress {
            source: self.source.clone(),
            percent,
        });
    }

    pub fn notify_standard_output(&self, text: impl Into<String>) {
        self.bus.publish(Message::StandardOutput {
            source: self.source.clone(),
            text: text.into(),
        });
    }

    // ── Prerequisite lookups ──

    /// The container `path` names, or an error with `code`.
    pub fn prereq_data_container(&mut self, path: &DataArrayPath, code: i32) -> Option<&DataContainer> {
        if !self.dca.contains_container(path.data_container_name()) {
            self.set_error_condition(
                code,
                format!(
                    "The DataContainer '{}' does not exist",
                    path.data_container_name()
                ),
            );
            return None;
        }
        self.dca.get_container(path.data_container_name())
    }

    /// The matrix `path` names, or an error with `code`.
    pub fn prereq_attribute_matrix(
        &mut self,
        path: &DataArrayPath,
        code: i32,
    ) -> Option<&AttributeMatrix> {
        self.prereq_data_container(path, code)?;
        if let Err(e) = self.dca.get_matrix(path).map(|_| ()) {
            self.set_error_condition(code, e.to_string());
            return None;
        }
        self.dca.get_matrix(path).ok()
    }

    /// The array `path` names, checked to store `T`, or an error with `code`.
    pub fn prereq_array_as<T: ArrayElement>(
        &mut self,
        path: &DataArrayPath,
        code: i32,
    ) -> Option<&DataArray> {
        if let Err(e) = self.dca.get_array_as::<T>(path).map(|_| ()) {
            self.set_error_condition(code, e.to_string());
            return None;
        }
        self.dca.get_array_as::<T>(path).ok()
    }

    /// The array `path` names, of any kind, or an error with `code`.
    pub fn prereq_array(&mut self, path: &DataArrayPath, code: i32) -> Option<&DataArray> {
        if let Err(e) = self.dca.get_array(path).map(|_| ()) {
            self.set_error_condition(code, e.to_string());
            return None;
        }
        self.dca.get_array(path).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CreateOptions;
    use crate::pipeline::message::ChannelObserver;
    use crate::types::{AttributeMatrixType, ElementKind};
    use crossbeam_channel::unbounded;
    use std::sync::Arc;

    #[derive(Default)]
    struct TwoPaths {
        input: DataArrayPath,
        output: DataArrayPath,
    }

    impl Filter for TwoPaths {
        fn metadata(&self) -> FilterMetadata {
            FilterMetadata {
                class_name: Cow::Borrowed("TwoPaths"),
                human_label: Cow::Borrowed("Two Paths"),
                group_name: Cow::Borrowed("Test"),
                subgroup_name: Cow::Borrowed("Test"),
                uuid: Uuid::nil(),
                version: Cow::Borrowed("1.0"),
            }
        }

        fn data_check(&mut self, _ctx: &mut FilterContext<'_>) {}

        fn execute(&mut self, _ctx: &mut FilterContext<'_>) {}

        fn path_parameters_mut(&mut self) -> Vec<PathParameter<'_>> {
            vec![
                PathParameter::selection(&mut self.input),
                PathParameter::creation(&mut self.output),
            ]
        }

        fn read_json(&mut self, _json: &Map<String, Value>) -> PipelineResult<()> {
            Ok(())
        }

        fn write_json(&self, _json: &mut Map<String, Value>) {}
    }

    #[test]
    fn test_rename_updates_all_path_parameters() {
        let mut filter = TwoPaths {
            input: DataArrayPath::new("DC", "AM", "In"),
            output: DataArrayPath::new("DC", "AM", "Out"),
        };
        filter.rename_data_array_path(&RenameEvent::new(
            DataArrayPath::matrix("DC", "AM"),
            DataArrayPath::matrix("DC", "Cells"),
        ));
        assert_eq!(filter.input, DataArrayPath::new("DC", "Cells", "In"));
        assert_eq!(filter.output, DataArrayPath::new("DC", "Cells", "Out"));
    }

    #[test]
    fn test_rename_skipped_for_own_creation_path() {
        let mut filter = TwoPaths {
            input: DataArrayPath::new("DC", "AM", "Out"),
            output: DataArrayPath::new("DC", "AM", "Out"),
        };
        filter.rename_data_array_path(&RenameEvent::new(
            DataArrayPath::new("DC", "AM", "Out"),
            DataArrayPath::new("DC", "AM", "Other"),
        ));
        assert_eq!(filter.input.data_array_name(), "Out");
        assert_eq!(filter.output.data_array_name(), "Out");
    }

    #[test]
    fn test_context_error_publishes_message() {
        let (tx, rx) = unbounded();
        let mut bus = MessageBus::new();
        bus.subscribe(Arc::new(ChannelObserver::new(tx)));
        let cancel = AtomicBool::new(false);
        let mut dca = DataContainerArray::new();
        let mut ctx = FilterContext::new(
            &mut dca,
            &bus,
            MessageSource::new("X", "X Label").at(4),
            &cancel,
            true,
        );
        assert!(ctx
            .prereq_data_container(&DataArrayPath::container("Missing"), -301)
            .is_none());
        assert_eq!(ctx.error_code(), -301);
        let msg = rx.try_recv().unwrap();
        assert_eq!(msg.code(), Some(-301));
        assert_eq!(msg.source().pipeline_index, Some(4));
    }

    #[test]
    fn test_prereq_array_as_type_mismatch() {
        let bus = MessageBus::new();
        let cancel = AtomicBool::new(false);
        let mut dca = DataContainerArray::new();
        dca.create_container("DC").unwrap();
        let am = DataArrayPath::matrix("DC", "AM");
        dca.create_matrix(&am, &[2], AttributeMatrixType::Generic).unwrap();
        dca.create_array(&am, "A", ElementKind::UInt8, &[2], &[1], CreateOptions::schema_only())
            .unwrap();
        let mut ctx = FilterContext::new(&mut dca, &bus, MessageSource::default(), &cancel, true);
        assert!(ctx.prereq_array_as::<u8>(&am.with_array("A"), -1).is_some());
        assert_eq!(ctx.error_code(), 0);
        assert!(ctx.prereq_array_as::<f64>(&am.with_array("A"), -90).is_none());
        assert_eq!(ctx.error_code(), -90);
    }
}
