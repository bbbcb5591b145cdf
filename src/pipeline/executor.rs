//! Pipeline executor: the ordered stage list and its two passes.
//!
//! A [`FilterPipeline`] owns its stages in an ordered arena of
//! [`FilterSlot`]s; neighbours are found by position. A run has two passes:
//!
//! 1. **Preflight** threads a schema-only Store through every stage. Errors
//!    are aggregated and the pass continues so every configuration problem
//!    surfaces at once. Renames discovered along the way are substituted
//!    into the configured paths of later stages.
//! 2. **Execute** threads a live Store through the enabled stages and stops
//!    at the first stage that reports a negative error code.
//!
//! Cancellation is cooperative through a shared flag ([`CancelHandle`]).
//! The executor checks it between stages; a running stage polls it through
//! its [`FilterContext`].

use crate::data::DataContainerArray;
use crate::pipeline::error::{ERR_NOT_EXECUTING, ERR_STAGE_PANICKED};
use crate::pipeline::filter::{Filter, FilterContext};
use crate::pipeline::id::StageIndex;
use crate::pipeline::message::{Message, MessageBus, MessageSource, Observer};
use crate::pipeline::path::RenameEvent;
use crate::pipeline::rename;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Name the executor uses as message source.
pub const PIPELINE_CLASS_NAME: &str = "FilterPipeline";
/// Pipeline file format version written by this crate.
pub const PIPELINE_VERSION: u32 = 6;

/// Outcome of the last execute pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionResult {
    #[default]
    Invalid,
    Completed,
    Canceled,
    Failed,
}

/// What the executor is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Preflighting,
    Executing,
    Canceling,
}

/// Per-stage lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterState {
    #[default]
    Configured,
    Preflighting,
    PreflightOk,
    PreflightFailed,
    Executing,
    Done,
    Failed,
    Cancelled,
    Cleaned,
}

#[derive(Debug, Default)]
struct CancelState {
    requested: AtomicBool,
    running: AtomicBool,
}

/// Shared cancellation flag.
///
/// Clones share the flag, so a handle taken before a run can cancel it from
/// another thread or from inside a stage or observer. A request is only
/// accepted while a preflight or execute pass is running.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<CancelState>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Returns false, leaving the flag clear, when no
    /// pass is running.
    pub fn cancel(&self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.0.requested.store(true, Ordering::SeqCst);
        true
    }

    pub fn is_canceled(&self) -> bool {
        self.0.requested.load(Ordering::SeqCst)
    }

    /// True while a preflight or execute pass is in progress.
    pub fn is_running(&self) -> bool {
        self.0.running.load(Ordering::SeqCst)
    }

    fn begin(&self) {
        self.0.requested.store(false, Ordering::SeqCst);
        self.0.running.store(true, Ordering::SeqCst);
    }

    fn end(&self) {
        self.0.running.store(false, Ordering::SeqCst);
    }

    fn reset(&self) {
        self.0.requested.store(false, Ordering::SeqCst);
    }

    pub(crate) fn flag(&self) -> &AtomicBool {
        &self.0.requested
    }
}

/// A stage together with the executor's bookkeeping for it.
pub struct FilterSlot {
    filter: Box<dyn Filter>,
    enabled: bool,
    state: FilterState,
    index: StageIndex,
    /// Store schema after this stage's last preflight
    snapshot: Option<DataContainerArray>,
}

impl FilterSlot {
    fn new(filter: Box<dyn Filter>) -> Self {
        Self {
            filter,
            enabled: true,
            state: FilterState::Configured,
            index: StageIndex::INVALID,
            snapshot: None,
        }
    }

    pub fn filter(&self) -> &dyn Filter {
        self.filter.as_ref()
    }

    pub fn filter_mut(&mut self) -> &mut dyn Filter {
        self.filter.as_mut()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn state(&self) -> FilterState {
        self.state
    }

    pub fn index(&self) -> StageIndex {
        self.index
    }
}

impl std::fmt::Debug for FilterSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterSlot")
            .field("filter", &self.filter.human_label())
            .field("enabled", &self.enabled)
            .field("state", &self.state)
            .field("index", &self.index)
            .finish()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Preflight,
    Execute,
}

/// Ordered list of stages plus the two-pass run logic.
pub struct FilterPipeline {
    name: String,
    slots: Vec<FilterSlot>,
    observers: Vec<Arc<dyn Observer>>,
    cancel: CancelHandle,
    state: PipelineState,
    result: ExecutionResult,
    error_condition: i32,
    preflight_error: i32,
    preflight_dca: Option<DataContainerArray>,
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new("Untitled Pipeline")
    }
}

impl FilterPipeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slots: Vec::new(),
            observers: Vec::new(),
            cancel: CancelHandle::new(),
            state: PipelineState::Idle,
            result: ExecutionResult::Invalid,
            error_condition: 0,
            preflight_error: 0,
            preflight_dca: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn execution_result(&self) -> ExecutionResult {
        self.result
    }

    /// Error code of the last execute pass, or of a rejected request.
    pub fn error_condition(&self) -> i32 {
        self.error_condition
    }

    /// Aggregate of the last preflight pass. Only its sign is meaningful.
    pub fn preflight_error(&self) -> i32 {
        self.preflight_error
    }

    /// Store schema left by the last preflight pass.
    pub fn preflight_dca(&self) -> Option<&DataContainerArray> {
        self.preflight_dca.as_ref()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    // ── Observers ──

    pub fn add_observer(&mut self, observer: Arc<dyn Observer>) {
        self.observers.push(observer);
    }

    /// Returns false if `observer` was not registered.
    pub fn remove_observer(&mut self, observer: &Arc<dyn Observer>) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| !Arc::ptr_eq(o, observer));
        self.observers.len() != before
    }

    pub fn clear_observers(&mut self) {
        self.observers.clear();
    }

    pub fn observers(&self) -> &[Arc<dyn Observer>] {
        &self.observers
    }

    // ── Stage list ──

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[FilterSlot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&FilterSlot> {
        self.slots.get(index)
    }

    pub fn filter(&self, index: usize) -> Option<&dyn Filter> {
        self.slots.get(index).map(FilterSlot::filter)
    }

    pub fn filter_mut(&mut self, index: usize) -> Option<&mut dyn Filter> {
        self.slots.get_mut(index).map(FilterSlot::filter_mut)
    }

    pub fn filters(&self) -> impl Iterator<Item = &dyn Filter> {
        self.slots.iter().map(FilterSlot::filter)
    }

    pub fn is_enabled(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|s| s.enabled)
    }

    /// Returns false if `index` is out of range.
    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                slot.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn previous(&self, index: StageIndex) -> Option<StageIndex> {
        index.previous().filter(|prev| prev.index() < self.slots.len())
    }

    pub fn next(&self, index: StageIndex) -> Option<StageIndex> {
        index.next(self.slots.len())
    }

    pub fn push_back(&mut self, filter: Box<dyn Filter>) {
        self.slots.push(FilterSlot::new(filter));
        self.reindex();
    }

    pub fn push_front(&mut self, filter: Box<dyn Filter>) {
        self.slots.insert(0, FilterSlot::new(filter));
        self.reindex();
    }

    pub fn pop_back(&mut self) -> Option<Box<dyn Filter>> {
        let slot = self.slots.pop();
        self.reindex();
        slot.map(|s| s.filter)
    }

    pub fn pop_front(&mut self) -> Option<Box<dyn Filter>> {
        if self.slots.is_empty() {
            return None;
        }
        let slot = self.slots.remove(0);
        self.reindex();
        Some(slot.filter)
    }

    /// Insert at `index`; an index past the end appends.
    pub fn insert(&mut self, index: usize, filter: Box<dyn Filter>) {
        let index = index.min(self.slots.len());
        self.slots.insert(index, FilterSlot::new(filter));
        self.reindex();
    }

    pub fn erase(&mut self, index: usize) -> Option<Box<dyn Filter>> {
        if index >= self.slots.len() {
            return None;
        }
        let slot = self.slots.remove(index);
        self.reindex();
        Some(slot.filter)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.preflight_dca = None;
    }

    /// Remove the first stage whose human label is `label`.
    pub fn remove_first_filter_by_name(&mut self, label: &str) -> bool {
        match self.slots.iter().position(|s| s.filter.human_label() == label) {
            Some(index) => self.erase(index).is_some(),
            None => false,
        }
    }

    fn reindex(&mut self) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            slot.index = StageIndex::from(i);
        }
    }

    // ── Running ──

    /// Preflight then execute.
    ///
    /// A cancellation raised during preflight skips the execute pass; the
    /// run then finishes as [`ExecutionResult::Canceled`] with an empty Store.
    pub fn run(&mut self) -> DataContainerArray {
        self.error_condition = 0;
        let err = self.preflight_pipeline();
        if self.cancel.is_canceled() {
            tracing::info!("Pipeline '{}' canceled during preflight", self.name);
            self.broadcast(Message::Status {
                source: self.source(),
                text: "Pipeline Canceled".to_string(),
            });
            return self.finish(DataContainerArray::new(), ExecutionResult::Canceled, &[]);
        }
        if err < 0 {
            tracing::warn!(
                "Pipeline '{}' preflight reported errors ({}), executing anyway",
                self.name,
                err
            );
        }
        self.execute()
    }

    /// Schema-only pass over every stage. Returns the aggregate error.
    ///
    /// A cancellation stops the pass at the next stage boundary and stays
    /// requested on the [`CancelHandle`] until the next pass begins.
    pub fn preflight_pipeline(&mut self) -> i32 {
        tracing::info!("Preflighting pipeline '{}' ({} filters)", self.name, self.slots.len());
        self.state = PipelineState::Preflighting;
        self.cancel.begin();

        let mut dca = DataContainerArray::new();
        let mut renamed: Vec<RenameEvent> = Vec::new();
        let mut filter_renamed: Vec<RenameEvent> = Vec::new();
        let mut preflight_error = 0;

        for i in 0..self.slots.len() {
            if self.cancel.is_canceled() {
                tracing::info!("Preflight of '{}' canceled before stage {}", self.name, i);
                break;
            }
            let (before, rest) = self.slots.split_at_mut(i);
            let prev = before.last().and_then(|s| s.snapshot.as_ref());
            let slot = &mut rest[0];

            if !slot.enabled {
                slot.snapshot = Some(dca.schema_copy());
                for rename in &renamed {
                    slot.filter.rename_data_array_path(rename);
                }
                // Inverse renames go to the pipeline-wide list only.
                renamed.extend(slot.filter.renamed_paths().iter().map(RenameEvent::inverse));
                continue;
            }

            let mut old_snapshot = slot.snapshot.take().unwrap_or_default();
            old_snapshot.rename_data_array_paths(&filter_renamed);
            for rename in &filter_renamed {
                slot.filter.rename_data_array_path(rename);
            }
            let old_created = slot.filter.created_paths(prev, &old_snapshot);
            for rename in &renamed {
                slot.filter.rename_data_array_path(rename);
            }

            tracing::debug!("Preflighting [{}] {}", i, slot.filter.human_label());
            slot.state = FilterState::Preflighting;
            let code = invoke(
                slot.filter.as_mut(),
                &self.observers,
                &mut dca,
                self.cancel.flag(),
                i,
                Phase::Preflight,
            );
            slot.state = if code < 0 {
                FilterState::PreflightFailed
            } else if self.cancel.is_canceled() {
                FilterState::Cancelled
            } else {
                FilterState::PreflightOk
            };
            preflight_error |= code;

            let snapshot = dca.schema_copy();
            let current_created = slot.filter.created_paths(prev, &snapshot);
            rename::retire_recreated(&mut renamed, &current_created);
            rename::retire_recreated(&mut filter_renamed, &current_created);

            let inferred = rename::check_for_renamed_paths(
                &old_snapshot,
                &snapshot,
                &old_created,
                &current_created,
            );
            for rename in &inferred {
                tracing::debug!("[{}] {} renamed {}", i, slot.filter.human_label(), rename);
            }
            rename::merge_renamed_paths(&mut renamed, &inferred);

            let hard = slot.filter.renamed_paths();
            renamed.extend(hard.iter().cloned());
            filter_renamed.extend(hard);
            slot.snapshot = Some(snapshot);
        }

        self.state = PipelineState::Idle;
        self.cancel.end();
        self.preflight_error = preflight_error;
        self.preflight_dca = Some(dca);
        tracing::info!(
            "Preflight of '{}' finished with aggregate error {}",
            self.name,
            preflight_error
        );
        preflight_error
    }

    /// Run every enabled stage against a fresh live Store.
    ///
    /// Stops at the first stage that reports a negative error code, or at
    /// the first stage boundary after cancellation. Either way the Store is
    /// returned as far as it got, and every stage that ran is cleaned up.
    pub fn execute(&mut self) -> DataContainerArray {
        self.state = PipelineState::Executing;
        self.cancel.begin();
        self.result = ExecutionResult::Invalid;
        self.error_condition = 0;

        let mut dca = DataContainerArray::new();
        let mut executed: Vec<usize> = Vec::new();
        let count = self.slots.len();

        for i in 0..count {
            if self.cancel.is_canceled() {
                break;
            }
            let label = self.slots[i].filter.human_label();
            let source = self.source().at(i);
            self.broadcast(Message::Progress {
                source: source.clone(),
                percent: ((i + 1) as f64 / (count + 1) as f64 * 100.0) as i32,
            });
            self.broadcast(Message::Status {
                source: source.clone(),
                text: format!("[{}/{}] {}", i + 1, count, label),
            });

            let slot = &mut self.slots[i];
            if !slot.enabled {
                continue;
            }
            tracing::debug!("Executing [{}] {}", i, label);
            slot.state = FilterState::Executing;
            executed.push(i);
            let code = invoke(
                slot.filter.as_mut(),
                &self.observers,
                &mut dca,
                self.cancel.flag(),
                i,
                Phase::Execute,
            );

            if code < 0 {
                slot.state = FilterState::Failed;
                self.error_condition = code;
                tracing::warn!("[{}] {} failed with error {}", i, label, code);
                self.broadcast(Message::Error {
                    source,
                    code,
                    text: format!(
                        "[{}/{}] {} caused an error during execution.",
                        i + 1,
                        count,
                        label
                    ),
                });
                return self.finish(dca, ExecutionResult::Failed, &executed);
            }

            if self.cancel.is_canceled() {
                slot.state = FilterState::Cancelled;
                break;
            }
            slot.state = FilterState::Done;
        }

        let result = if self.cancel.is_canceled() {
            self.state = PipelineState::Canceling;
            tracing::info!("Pipeline '{}' canceled", self.name);
            ExecutionResult::Canceled
        } else {
            ExecutionResult::Completed
        };
        self.broadcast(Message::Status {
            source: self.source(),
            text: match result {
                ExecutionResult::Canceled => "Pipeline Canceled".to_string(),
                _ => "Pipeline Complete".to_string(),
            },
        });
        self.finish(dca, result, &executed)
    }

    /// Request cancellation of the running pass.
    ///
    /// While a pass runs the pipeline is mutably borrowed, so stages,
    /// observers and other threads cancel through a [`CancelHandle`] from
    /// [`FilterPipeline::cancel_handle`]. Outside a pass the request is
    /// rejected with [`ERR_NOT_EXECUTING`] and the flag stays clear.
    pub fn cancel(&self) -> bool {
        if self.cancel.cancel() {
            tracing::info!("Cancel requested for pipeline '{}'", self.name);
            return true;
        }
        self.broadcast(Message::Error {
            source: self.source(),
            code: ERR_NOT_EXECUTING,
            text: format!(
                "Pipeline '{}' could not be canceled because it is not executing.",
                self.name
            ),
        });
        false
    }

    fn finish(
        &mut self,
        dca: DataContainerArray,
        result: ExecutionResult,
        executed: &[usize],
    ) -> DataContainerArray {
        self.result = result;
        self.state = PipelineState::Idle;
        self.broadcast(Message::PipelineFinished {
            source: self.source(),
            result,
        });
        for &i in executed {
            let slot = &mut self.slots[i];
            slot.filter.cleanup();
            slot.state = FilterState::Cleaned;
        }
        self.cancel.reset();
        self.cancel.end();
        tracing::info!(
            "Pipeline '{}' finished: {:?} (error {})",
            self.name,
            result,
            self.error_condition
        );
        dca
    }

    fn source(&self) -> MessageSource {
        MessageSource::new(PIPELINE_CLASS_NAME, self.name.clone())
    }

    fn broadcast(&self, message: Message) {
        for observer in &self.observers {
            observer.process_message(&message);
        }
    }
}

impl std::fmt::Debug for FilterPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterPipeline")
            .field("name", &self.name)
            .field("slots", &self.slots)
            .field("observers", &self.observers.len())
            .field("state", &self.state)
            .field("result", &self.result)
            .finish()
    }
}

/// Drive one stage call with the observers subscribed for its duration.
///
/// A panic inside the stage is caught and reported as
/// [`ERR_STAGE_PANICKED`].
fn invoke(
    filter: &mut dyn Filter,
    observers: &[Arc<dyn Observer>],
    dca: &mut DataContainerArray,
    cancel: &AtomicBool,
    index: usize,
    phase: Phase,
) -> i32 {
    let mut bus = MessageBus::new();
    let subscriptions: Vec<_> = observers.iter().map(|o| bus.subscribe(Arc::clone(o))).collect();
    let source = MessageSource::new(filter.metadata().class_name, filter.human_label()).at(index);

    let code = {
        let mut ctx = FilterContext::new(dca, &bus, source.clone(), cancel, phase == Phase::Preflight);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match phase {
            Phase::Preflight => filter.preflight(&mut ctx),
            Phase::Execute => filter.execute(&mut ctx),
        }));
        match outcome {
            Ok(()) => ctx.error_code(),
            Err(payload) => {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!("[{}] {} panicked: {}", index, source.human_label, reason);
                bus.publish(Message::Error {
                    source,
                    code: ERR_STAGE_PANICKED,
                    text: format!("The filter panicked: {}", reason),
                });
                ERR_STAGE_PANICKED
            }
        }
    };

    for id in subscriptions {
        bus.unsubscribe(id);
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::error::PipelineResult;
    use crate::pipeline::filter::{FilterMetadata, PathParameter};
    use crate::pipeline::message::{ChannelObserver, MockObserver};
    use crate::pipeline::path::DataArrayPath;
    use crossbeam_channel::{unbounded, Receiver};
    use serde_json::{Map, Value};
    use std::borrow::Cow;
    use std::sync::Mutex;
    use uuid::Uuid;

    type Log = Arc<Mutex<Vec<String>>>;

    /// Records every call and can be told to fail, panic or cancel.
    #[derive(Default)]
    struct TestStage {
        label: String,
        path: DataArrayPath,
        creates: Option<String>,
        preflight_code: i32,
        execute_code: i32,
        panic_on_execute: bool,
        cancel_on_preflight: Option<CancelHandle>,
        cancel_on_execute: Option<CancelHandle>,
        renames: Vec<RenameEvent>,
        log: Log,
    }

    impl TestStage {
        fn new(label: &str, log: &Log) -> Self {
            Self {
                label: label.to_string(),
                log: Arc::clone(log),
                ..Default::default()
            }
        }

        fn record(&self, what: &str) {
            self.log.lock().unwrap().push(format!("{}:{}", what, self.label));
        }
    }

    impl Filter for TestStage {
        fn metadata(&self) -> FilterMetadata {
            FilterMetadata {
                class_name: Cow::Borrowed("TestStage"),
                human_label: Cow::Borrowed("TestStage"),
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
            if let Some(name) = &self.creates {
                let _ = ctx.dca.create_container(name).map(|_| ());
            }
            if self.preflight_code < 0 {
                ctx.set_error_condition(self.preflight_code, "configured to fail");
            }
            if let Some(handle) = &self.cancel_on_preflight {
                assert!(handle.cancel());
            }
        }

        fn execute(&mut self, ctx: &mut FilterContext<'_>) {
            self.record("execute");
            if self.panic_on_execute {
                panic!("boom");
            }
            if let Some(name) = &self.creates {
                let _ = ctx.dca.create_container(name).map(|_| ());
            }
            if self.execute_code < 0 {
                ctx.set_error_condition(self.execute_code, "configured to fail");
            }
            if let Some(handle) = &self.cancel_on_execute {
                assert!(handle.cancel());
                assert!(ctx.is_canceled());
            }
        }

        fn renamed_paths(&self) -> Vec<RenameEvent> {
            self.renames.clone()
        }

        fn path_parameters_mut(&mut self) -> Vec<PathParameter<'_>> {
            vec![PathParameter::selection(&mut self.path)]
        }

        fn cleanup(&mut self) {
            self.record("cleanup");
        }

        fn read_json(&mut self, _json: &Map<String, Value>) -> PipelineResult<()> {
            Ok(())
        }

        fn write_json(&self, json: &mut Map<String, Value>) {
            json.insert("SelectedPath".into(), self.path.to_json());
        }
    }

    fn pipeline_of(stages: Vec<TestStage>) -> (FilterPipeline, Receiver<Message>) {
        let (tx, rx) = unbounded();
        let mut pipeline = FilterPipeline::new("Test");
        pipeline.add_observer(Arc::new(ChannelObserver::new(tx)));
        for stage in stages {
            pipeline.push_back(Box::new(stage));
        }
        (pipeline, rx)
    }

    fn entries(log: &Log, prefix: &str) -> Vec<String> {
        log.lock()
            .unwrap()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .cloned()
            .collect()
    }

    #[test]
    fn test_preflight_continues_past_errors() {
        let log = Log::default();
        let mut failing = TestStage::new("B", &log);
        failing.preflight_code = -42;
        let (mut pipeline, _rx) = pipeline_of(vec![
            TestStage::new("A", &log),
            failing,
            TestStage::new("C", &log),
            TestStage::new("D", &log),
        ]);
        let err = pipeline.preflight_pipeline();
        assert!(err < 0);
        assert_eq!(
            entries(&log, "preflight"),
            vec!["preflight:A", "preflight:B", "preflight:C", "preflight:D"]
        );
        assert_eq!(pipeline.slot(1).unwrap().state(), FilterState::PreflightFailed);
        assert_eq!(pipeline.slot(2).unwrap().state(), FilterState::PreflightOk);
    }

    #[test]
    fn test_execute_stops_at_first_error_and_cleans_up() {
        let log = Log::default();
        let mut failing = TestStage::new("B", &log);
        failing.execute_code = -7;
        let (mut pipeline, rx) = pipeline_of(vec![
            TestStage::new("A", &log),
            failing,
            TestStage::new("C", &log),
            TestStage::new("D", &log),
        ]);
        pipeline.execute();
        assert_eq!(entries(&log, "execute"), vec!["execute:A", "execute:B"]);
        assert_eq!(entries(&log, "cleanup"), vec!["cleanup:A", "cleanup:B"]);
        assert_eq!(pipeline.execution_result(), ExecutionResult::Failed);
        assert_eq!(pipeline.error_condition(), -7);
        assert_eq!(pipeline.state(), PipelineState::Idle);

        let messages: Vec<Message> = rx.try_iter().collect();
        assert!(messages.iter().any(|m| matches!(
            m,
            Message::Error { text, .. } if text == "[2/4] B caused an error during execution."
        )));
        assert!(matches!(
            messages.last(),
            Some(Message::PipelineFinished { result: ExecutionResult::Failed, .. })
        ));
    }

    #[test]
    fn test_progress_and_status_messages() {
        let log = Log::default();
        let (mut pipeline, rx) = pipeline_of(vec![TestStage::new("A", &log), TestStage::new("B", &log)]);
        pipeline.execute();
        let messages: Vec<Message> = rx.try_iter().collect();
        let progress: Vec<i32> = messages
            .iter()
            .filter_map(|m| match m {
                Message::Progress { percent, .. } => Some(*percent),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![33, 66]);
        let statuses: Vec<&str> = messages
            .iter()
            .filter_map(|m| match m {
                Message::Status { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(statuses, vec!["[1/2] A", "[2/2] B", "Pipeline Complete"]);
        assert_eq!(pipeline.execution_result(), ExecutionResult::Completed);
    }

    #[test]
    fn test_panicking_stage_is_reported() {
        let log = Log::default();
        let mut bad = TestStage::new("Bad", &log);
        bad.panic_on_execute = true;
        let (mut pipeline, rx) = pipeline_of(vec![bad, TestStage::new("After", &log)]);
        pipeline.execute();
        assert_eq!(pipeline.error_condition(), ERR_STAGE_PANICKED);
        assert_eq!(entries(&log, "execute"), vec!["execute:Bad"]);
        assert!(rx
            .try_iter()
            .any(|m| m.code() == Some(ERR_STAGE_PANICKED) && m.source().pipeline_index == Some(0)));
    }

    #[test]
    fn test_cancel_between_stages() {
        let log = Log::default();
        let (mut pipeline, _rx) = pipeline_of(Vec::new());
        let mut canceller = TestStage::new("B", &log);
        canceller.cancel_on_execute = Some(pipeline.cancel_handle());
        pipeline.push_back(Box::new(TestStage::new("A", &log)));
        pipeline.push_back(Box::new(canceller));
        pipeline.push_back(Box::new(TestStage::new("C", &log)));
        pipeline.execute();
        assert_eq!(entries(&log, "execute"), vec!["execute:A", "execute:B"]);
        assert_eq!(pipeline.execution_result(), ExecutionResult::Canceled);
        assert_eq!(pipeline.slot(1).unwrap().state(), FilterState::Cleaned);
        assert!(!pipeline.cancel_handle().is_canceled());
    }

    #[test]
    fn test_cancel_while_idle_is_rejected() {
        let mut observer = MockObserver::new();
        observer
            .expect_process_message()
            .withf(|m| m.code() == Some(ERR_NOT_EXECUTING))
            .times(1)
            .return_const(());
        let mut pipeline = FilterPipeline::new("Idle");
        pipeline.add_observer(Arc::new(observer));
        assert!(!pipeline.cancel());
        assert!(!pipeline.cancel_handle().cancel());
        assert!(!pipeline.cancel_handle().is_canceled());
        assert!(!pipeline.cancel_handle().is_running());
    }

    #[test]
    fn test_cancel_during_preflight_skips_execute() {
        let log = Log::default();
        let (mut pipeline, rx) = pipeline_of(Vec::new());
        let mut canceller = TestStage::new("A", &log);
        canceller.cancel_on_preflight = Some(pipeline.cancel_handle());
        pipeline.push_back(Box::new(canceller));
        pipeline.push_back(Box::new(TestStage::new("B", &log)));

        let dca = pipeline.run();
        assert!(dca.is_empty());
        assert_eq!(entries(&log, "preflight"), vec!["preflight:A"]);
        assert!(entries(&log, "execute").is_empty());
        assert!(entries(&log, "cleanup").is_empty());
        assert_eq!(pipeline.slot(0).unwrap().state(), FilterState::Cancelled);
        assert_eq!(pipeline.execution_result(), ExecutionResult::Canceled);
        assert_eq!(pipeline.error_condition(), 0);
        assert!(!pipeline.cancel_handle().is_canceled());

        let messages: Vec<Message> = rx.try_iter().collect();
        assert!(messages.iter().all(|m| !m.is_error()));
        assert!(matches!(
            messages.last(),
            Some(Message::PipelineFinished { result: ExecutionResult::Canceled, .. })
        ));

        // The next run starts with a clear flag.
        pipeline.erase(0);
        pipeline.run();
        assert_eq!(pipeline.execution_result(), ExecutionResult::Completed);
        assert_eq!(entries(&log, "execute"), vec!["execute:B"]);
    }

    #[test]
    fn test_disabled_stage_skipped_but_follows_renames() {
        let log = Log::default();
        let mut renamer = TestStage::new("Renamer", &log);
        renamer.renames = vec![RenameEvent::new(
            DataArrayPath::container("Old"),
            DataArrayPath::container("New"),
        )];
        let mut disabled = TestStage::new("Disabled", &log);
        disabled.path = DataArrayPath::new("Old", "AM", "A");
        let (mut pipeline, _rx) = pipeline_of(vec![renamer, disabled]);
        pipeline.set_enabled(1, false);
        pipeline.run();
        assert_eq!(entries(&log, "preflight"), vec!["preflight:Renamer"]);
        assert_eq!(entries(&log, "execute"), vec!["execute:Renamer"]);
        assert_eq!(
            pipeline.filter(1).unwrap().properties()["SelectedPath"]["Data Container Name"],
            "New"
        );
    }

    #[test]
    fn test_disabled_renamer_reverts_downstream_paths() {
        let log = Log::default();
        let mut renamer = TestStage::new("Renamer", &log);
        renamer.renames = vec![RenameEvent::new(
            DataArrayPath::container("Old"),
            DataArrayPath::container("New"),
        )];
        let mut reader = TestStage::new("Reader", &log);
        reader.path = DataArrayPath::container("New");
        let (mut pipeline, _rx) = pipeline_of(vec![renamer, reader]);
        pipeline.set_enabled(0, false);
        pipeline.preflight_pipeline();
        assert_eq!(
            pipeline.filter(1).unwrap().properties()["SelectedPath"]["Data Container Name"],
            "Old"
        );
    }

    #[test]
    fn test_list_operations_reindex() {
        let log = Log::default();
        let (mut pipeline, _rx) = pipeline_of(vec![TestStage::new("B", &log), TestStage::new("D", &log)]);
        pipeline.push_front(Box::new(TestStage::new("A", &log)));
        pipeline.insert(2, Box::new(TestStage::new("C", &log)));
        pipeline.insert(99, Box::new(TestStage::new("E", &log)));
        let labels: Vec<String> = pipeline.filters().map(|f| f.human_label()).collect();
        assert_eq!(labels, vec!["A", "B", "C", "D", "E"]);
        assert!(pipeline
            .slots()
            .iter()
            .enumerate()
            .all(|(i, s)| s.index() == StageIndex::from(i)));

        assert!(pipeline.remove_first_filter_by_name("C"));
        assert!(!pipeline.remove_first_filter_by_name("C"));
        assert_eq!(pipeline.pop_front().unwrap().human_label(), "A");
        assert_eq!(pipeline.pop_back().unwrap().human_label(), "E");
        assert_eq!(pipeline.erase(0).unwrap().human_label(), "B");
        assert!(pipeline.erase(5).is_none());
        assert_eq!(pipeline.slot(0).unwrap().index(), StageIndex(0));
        assert_eq!(pipeline.next(StageIndex(0)), None);
        assert_eq!(pipeline.previous(StageIndex(0)), None);
        pipeline.clear();
        assert!(pipeline.is_empty());
        assert!(pipeline.pop_front().is_none());
    }

    #[test]
    fn test_observers_receive_stage_messages_with_index() {
        let log = Log::default();
        let mut failing = TestStage::new("B", &log);
        failing.preflight_code = -3;
        let (mut pipeline, rx) = pipeline_of(vec![TestStage::new("A", &log), failing]);
        pipeline.preflight_pipeline();
        let errors: Vec<Message> = rx.try_iter().filter(Message::is_error).collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].source().pipeline_index, Some(1));
        assert_eq!(errors[0].source().human_label, "B");
    }

    #[test]
    fn test_removed_observer_gets_nothing() {
        let (tx, rx) = unbounded();
        let observer: Arc<dyn Observer> = Arc::new(ChannelObserver::new(tx));
        let mut pipeline = FilterPipeline::new("P");
        pipeline.add_observer(Arc::clone(&observer));
        assert!(pipeline.remove_observer(&observer));
        pipeline.execute();
        assert!(rx.try_recv().is_err());
    }
}
