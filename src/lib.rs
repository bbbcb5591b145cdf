//! # matpipe: preflight/execute pipelines over a hierarchical data store
//!
//! A pipeline is an ordered list of stages that all operate on one shared
//! in-memory Store. The Store is a three-level hierarchy of named nodes:
//! data containers hold attribute matrices, which hold equally long data
//! arrays.
//!
//! ## Architecture
//!
//! - **Data**: the Store hierarchy and its schema-only copies
//! - **Pipeline**: the stage contract, the orchestrator, rename inference,
//!   the message bus and pipeline files
//! - **Config**: runner configuration loaded from TOML
//!
//! ## Example
//!
//! ```ignore
//! use matpipe::pipeline::filters::{CreateDataArray, RenameAttributeArray};
//! use matpipe::{DataArrayPath, ElementKind, FilterPipeline, TracingObserver};
//! use std::sync::Arc;
//!
//! let mut pipeline = FilterPipeline::new("Demo");
//! pipeline.add_observer(Arc::new(TracingObserver));
//! pipeline.push_back(Box::new(CreateDataArray::new(
//!     DataArrayPath::new("DC", "AM", "Foo"),
//!     ElementKind::Float32,
//!     &[10],
//! )));
//! pipeline.push_back(Box::new(RenameAttributeArray::new(
//!     DataArrayPath::new("DC", "AM", "Foo"),
//!     "Bar",
//! )));
//!
//! if pipeline.preflight_pipeline() >= 0 {
//!     let store = pipeline.execute();
//!     assert!(store.contains_path(&DataArrayPath::new("DC", "AM", "Bar")));
//! }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod types;

// Re-export commonly used types
pub use config::RunnerConfig;
pub use data::{AttributeMatrix, DataArray, DataContainer, DataContainerArray};
pub use error::{MatpipeError, Result, ResultExt};
pub use pipeline::{
    DataArrayPath, ExecutionResult, Filter, FilterContext, FilterManager, FilterPipeline, Message,
    Observer, PipelineState, RenameEvent, TracingObserver,
};
pub use types::{AttributeMatrixType, ElementKind, Geometry};
