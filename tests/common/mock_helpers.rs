//! Recording observers and scripted stages

use crossbeam_channel::{unbounded, Receiver};
use matpipe::pipeline::{
    CancelHandle, ChannelObserver, DataArrayPath, Filter, FilterContext, FilterMetadata, Message,
    Observer, PathParameter, PipelineResult,
};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Shared, ordered record of stage calls such as `"execute:B"`
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn new_call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Keeps every message it receives
#[derive(Default)]
pub struct RecordingObserver {
    messages: Mutex<Vec<Message>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<Message> {
        self.messages().into_iter().filter(Message::is_error).collect()
    }

    pub fn status_texts(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter_map(|m| match m {
                Message::Status { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn progress(&self) -> Vec<i32> {
        self.messages()
            .into_iter()
            .filter_map(|m| match m {
                Message::Progress { percent, .. } => Some(percent),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.messages.lock().unwrap().clear();
    }
}

impl Observer for RecordingObserver {
    fn process_message(&self, message: &Message) {
        self.messages.lock().unwrap().push(message.clone());
    }
}

/// A channel-backed observer and the receiving end
pub fn channel_observer() -> (Arc<ChannelObserver>, Receiver<Message>) {
    let (tx, rx) = unbounded();
    (Arc::new(ChannelObserver::new(tx)), rx)
}

/// Configurable stage that reads one array path and records its calls.
///
/// Property `SelectedArrayPath` holds the path so tests can observe rename
/// substitution through `properties()`.
#[derive(Default)]
pub struct ScriptedStage {
    pub label: String,
    pub selected: DataArrayPath,
    pub require_selected: bool,
    pub creates_container: Option<String>,
    pub preflight_code: i32,
    pub execute_code: i32,
    pub cancel_on_preflight: Option<CancelHandle>,
    pub cancel_on_execute: Option<CancelHandle>,
    pub log: Option<CallLog>,
}

impl ScriptedStage {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            ..Default::default()
        }
    }

    pub fn logging_to(mut self, log: &CallLog) -> Self {
        self.log = Some(Arc::clone(log));
        self
    }

    /// Fail preflight with `code` unless the array exists
    pub fn requires(mut self, path: DataArrayPath) -> Self {
        self.selected = path;
        self.require_selected = true;
        self
    }

    pub fn creates_container(mut self, name: &str) -> Self {
        self.creates_container = Some(name.to_string());
        self
    }

    pub fn fails_preflight(mut self, code: i32) -> Self {
        self.preflight_code = code;
        self
    }

    pub fn fails_execute(mut self, code: i32) -> Self {
        self.execute_code = code;
        self
    }

    pub fn cancels(mut self, handle: CancelHandle) -> Self {
        self.cancel_on_execute = Some(handle);
        self
    }

    pub fn cancels_preflight(mut self, handle: CancelHandle) -> Self {
        self.cancel_on_preflight = Some(handle);
        self
    }

    fn record(&self, what: &str) {
        if let Some(log) = &self.log {
            log.lock().unwrap().push(format!("{}:{}", what, self.label));
        }
    }

    fn run(&mut self, ctx: &mut FilterContext<'_>, code: i32) {
        ctx.clear_error_code();
        if self.require_selected && ctx.prereq_array(&self.selected, -301).is_none() {
            return;
        }
        if let Some(name) = &self.creates_container {
            if !ctx.dca.contains_container(name) {
                let _ = ctx.dca.create_container(name).map(|_| ());
            }
        }
        if code < 0 {
            ctx.set_error_condition(code, format!("{} was told to fail", self.label));
        }
    }
}

impl Filter for ScriptedStage {
    fn metadata(&self) -> FilterMetadata {
        FilterMetadata {
            class_name: Cow::Borrowed("ScriptedStage"),
            human_label: Cow::Borrowed("Scripted Stage"),
            group_name: Cow::Borrowed("Test"),
            subgroup_name: Cow::Borrowed("Test"),
            uuid: Uuid::nil(),
            version: Cow::Borrowed("1.0"),
        }
    }

    fn human_label(&self) -> String {
        self.label.clone()
    }

    fn data_check(&mut self, ctx: &mut FilterContext<'_>) {
        self.record("preflight");
        self.run(ctx, self.preflight_code);
        if let Some(handle) = &self.cancel_on_preflight {
            handle.cancel();
        }
    }

    fn execute(&mut self, ctx: &mut FilterContext<'_>) {
        self.record("execute");
        self.run(ctx, self.execute_code);
        if let Some(handle) = &self.cancel_on_execute {
            handle.cancel();
        }
    }

    fn cleanup(&mut self) {
        self.record("cleanup");
    }

    fn path_parameters_mut(&mut self) -> Vec<PathParameter<'_>> {
        vec![PathParameter::selection(&mut self.selected)]
    }

    fn read_json(&mut self, json: &Map<String, Value>) -> PipelineResult<()> {
        if let Some(path) = json.get("SelectedArrayPath").and_then(DataArrayPath::from_json) {
            self.selected = path;
        }
        Ok(())
    }

    fn write_json(&self, json: &mut Map<String, Value>) {
        json.insert("SelectedArrayPath".into(), self.selected.to_json());
    }
}

/// The `SelectedArrayPath` a stage currently holds
pub fn selected_path(filter: &dyn Filter) -> Option<DataArrayPath> {
    filter
        .properties()
        .get("SelectedArrayPath")
        .and_then(DataArrayPath::from_json)
}
