//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod mock_helpers;

use matpipe::DataArrayPath;

/// The `DC|AM|<name>` array path most scenarios use
pub fn array_path(name: &str) -> DataArrayPath {
    DataArrayPath::new("DC", "AM", name)
}

/// Names of every path in `paths`, `|`-joined, for compact assertions
pub fn path_strings(paths: &[DataArrayPath]) -> Vec<String> {
    paths.iter().map(|p| p.to_string()).collect()
}
