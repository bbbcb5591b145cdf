//! The in-memory data store.
//!
//! One [`DataContainerArray`] (the Store) is threaded through a whole
//! pipeline run. It owns a set of [`DataContainer`]s, each of which owns
//! [`AttributeMatrix`] tables of equally long [`DataArray`] columns.
//!
//! ```text
//! DataContainerArray
//! └── DataContainer "Image" (geometry: Image 10x10x1)
//!     ├── AttributeMatrix "Cell" (tuple_dims [10, 10, 1])
//!     │   ├── DataArray "Phases"   Int32 x1
//!     │   └── DataArray "EulerAngles" Float32 x3
//!     └── AttributeMatrix "Feature" (tuple_dims [42])
//! ```
//!
//! Two copies are supported: [`DataContainerArray::deep_copy`] duplicates
//! buffers, [`DataContainerArray::schema_copy`] keeps names, kinds and shapes
//! but drops every buffer so preflight never allocates bulk data.

pub mod attribute_matrix;
pub mod data_array;
pub mod data_container;
pub mod data_container_array;
pub mod error;

pub use attribute_matrix::AttributeMatrix;
pub use data_array::{ArrayData, ArrayElement, DataArray};
pub use data_container::DataContainer;
pub use data_container_array::{
    ArraySchema, ContainerSchema, CreateOptions, CreatePolicy, DataContainerArray, MatrixSchema,
    RenameOutcome, StoreSchema,
};
pub use error::{DataError, DataResult};
