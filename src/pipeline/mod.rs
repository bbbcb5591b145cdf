//! Preflight/execute pipeline engine.
//!
//! A [`FilterPipeline`] is an ordered list of stages ([`Filter`]s) that all
//! operate on one shared Store. Running a pipeline is two passes:
//!
//! ```text
//! preflight:  schema-only Store ─► stage 0 ─► stage 1 ─► ... (every stage, errors OR'd)
//!                                  │ snapshot  │ snapshot
//!                                  └──── rename inference between snapshots
//!
//! execute:    live Store ─► stage 0 ─► stage 1 ─► ... (stops at first negative code)
//!                           └── progress / status / error messages on the bus
//! ```
//!
//! # Design
//!
//! - **Stages report, never return errors**: negative codes on the
//!   [`FilterContext`] become `Error` messages on the [`MessageBus`].
//! - **Renames propagate downstream**: preflight diffs per-stage schema
//!   snapshots and rewrites later stages' path parameters.
//! - **Panics are contained**: a panicking stage is reported as an error
//!   code instead of unwinding through the orchestrator.
//! - **Cooperative cancel**: a shared [`CancelHandle`] is checked between
//!   stages and exposed to stages through the context.

pub mod error;
pub mod executor;
pub mod factory;
pub mod filter;
pub mod filters;
pub mod id;
pub mod message;
pub mod parameters;
pub mod path;
pub mod persistence;
pub mod rename;

pub use error::{PipelineError, PipelineResult};
pub use executor::{
    CancelHandle, ExecutionResult, FilterPipeline, FilterSlot, FilterState, PipelineState,
};
pub use factory::{CoreFilter, FilterFactory, FilterManager};
pub use filter::{Filter, FilterContext, FilterMetadata, PathParameter, PathRole};
pub use id::StageIndex;
pub use message::{
    ChannelObserver, Message, MessageBus, MessageSource, Observer, StdoutObserver,
    TracingObserver,
};
pub use path::{DataArrayPath, PathType, RenameEvent};
pub use persistence::{read_pipeline_file, write_pipeline_file};
