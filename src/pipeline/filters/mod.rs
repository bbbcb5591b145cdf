//! Built-in core stages.
//!
//! These cover the structural operations every pipeline needs: creating
//! containers, matrices and arrays, renaming them, removing them, and the
//! placeholder that stands in for a stage the registry cannot build.

pub mod create_attribute_matrix;
pub mod create_data_array;
pub mod create_data_container;
pub mod empty_filter;
pub mod remove_arrays;
pub mod rename_attribute_array;
pub mod rename_attribute_matrix;
pub mod rename_data_container;

pub use create_attribute_matrix::CreateAttributeMatrix;
pub use create_data_array::CreateDataArray;
pub use create_data_container::CreateDataContainer;
pub use empty_filter::EmptyFilter;
pub use remove_arrays::RemoveArrays;
pub use rename_attribute_array::RenameAttributeArray;
pub use rename_attribute_matrix::RenameAttributeMatrix;
pub use rename_data_container::RenameDataContainer;

use crate::pipeline::filter::FilterMetadata;
use std::borrow::Cow;
use uuid::Uuid;

pub(crate) const CORE_GROUP: &str = "Core";
pub(crate) const CORE_VERSION: &str = "1.0";

/// Metadata for a built-in stage in the core group.
pub(crate) const fn core_metadata(
    class_name: &'static str,
    human_label: &'static str,
    subgroup_name: &'static str,
    uuid: u128,
) -> FilterMetadata {
    FilterMetadata {
        class_name: Cow::Borrowed(class_name),
        human_label: Cow::Borrowed(human_label),
        group_name: Cow::Borrowed(CORE_GROUP),
        subgroup_name: Cow::Borrowed(subgroup_name),
        uuid: Uuid::from_u128(uuid),
        version: Cow::Borrowed(CORE_VERSION),
    }
}
