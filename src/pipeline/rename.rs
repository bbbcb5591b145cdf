//! Rename inference between Store snapshots.
//!
//! During preflight every stage is compared against the snapshot it
//! produced on the previous preflight. When a path it used to create has
//! disappeared and a structurally identical path with one differing
//! component has appeared instead, the stage (or its configuration) renamed
//! something, and later stages that referenced the old path must follow.
//!
//! ```text
//!  previous preflight          this preflight
//!  DC|AM|Foo  (Int32 x1)  ->   DC|AM|Bar  (Int32 x1)   => RenameEvent(Foo -> Bar)
//! ```
//!
//! Pairing is positional: old paths are visited in creation order and each
//! takes the first still-unused compatible new path.

use crate::data::DataContainerArray;
use crate::pipeline::path::{DataArrayPath, RenameEvent};

/// Paths that exist in `after` but not in `before`.
///
/// A new container contributes itself, its matrices and their arrays; a new
/// matrix in an existing container contributes itself and its arrays. With
/// no `before` snapshot every path in `after` counts as created.
pub fn created_paths(
    before: Option<&DataContainerArray>,
    after: &DataContainerArray,
) -> Vec<DataArrayPath> {
    let Some(before) = before else {
        return after.all_paths();
    };
    let mut paths = Vec::new();
    for dc in after.containers() {
        let dc_path = DataArrayPath::container(dc.name());
        if !before.contains_container(dc.name()) {
            paths.push(dc_path);
            for am in dc.matrices() {
                push_matrix_paths(&mut paths, dc.name(), am);
            }
            continue;
        }
        for am in dc.matrices() {
            let am_path = DataArrayPath::matrix(dc.name(), am.name());
            if before.get_matrix(&am_path).is_err() {
                push_matrix_paths(&mut paths, dc.name(), am);
                continue;
            }
            for array in am.arrays() {
                let path = am_path.with_array(array.name());
                if !before.contains_path(&path) {
                    paths.push(path);
                }
            }
        }
    }
    paths
}

fn push_matrix_paths(
    paths: &mut Vec<DataArrayPath>,
    dc_name: &str,
    am: &crate::data::AttributeMatrix,
) {
    let am_path = DataArrayPath::matrix(dc_name, am.name());
    paths.push(am_path.clone());
    paths.extend(am.arrays().map(|a| am_path.with_array(a.name())));
}

/// True when `old_path` in `old_dca` and `new_path` in `new_dca` could be
/// the same object under a different name.
///
/// Requires a single differing component, then matching geometry kind (or
/// a missing geometry on either side), matrix kind and tuple count, and
/// array element kind and component dims, as deep as the paths go.
pub fn check_rename_path(
    old_dca: &DataContainerArray,
    new_dca: &DataContainerArray,
    old_path: &DataArrayPath,
    new_path: &DataArrayPath,
) -> bool {
    if !old_path.possible_rename(new_path) {
        return false;
    }
    let (Some(old_dc), Some(new_dc)) = (
        old_dca.get_container(old_path.data_container_name()),
        new_dca.get_container(new_path.data_container_name()),
    ) else {
        return false;
    };
    if let (Some(old_geom), Some(new_geom)) = (old_dc.geometry(), new_dc.geometry()) {
        if old_geom.kind() != new_geom.kind() {
            return false;
        }
    }
    if old_path.attribute_matrix_name().is_empty() && new_path.attribute_matrix_name().is_empty() {
        return true;
    }

    let (Some(old_am), Some(new_am)) = (
        old_dc.get_matrix(old_path.attribute_matrix_name()),
        new_dc.get_matrix(new_path.attribute_matrix_name()),
    ) else {
        return false;
    };
    if old_am.kind() != new_am.kind() || old_am.num_tuples() != new_am.num_tuples() {
        return false;
    }
    if old_path.data_array_name().is_empty() && new_path.data_array_name().is_empty() {
        return true;
    }

    match (
        old_am.get_array(old_path.data_array_name()),
        new_am.get_array(new_path.data_array_name()),
    ) {
        (Some(old_da), Some(new_da)) => old_da.is_compatible_with(new_da),
        _ => false,
    }
}

/// Pair disappeared paths with appeared paths.
///
/// Paths present in both lists were not renamed and are skipped. Each old
/// path takes the first compatible new path not already paired. Ambiguity
/// is resolved by order: when several new paths fit, the earliest wins
/// rather than the match being dropped.
pub fn check_for_renamed_paths(
    old_dca: &DataContainerArray,
    new_dca: &DataContainerArray,
    old_paths: &[DataArrayPath],
    new_paths: &[DataArrayPath],
) -> Vec<RenameEvent> {
    let mut renames = Vec::new();
    let mut used = vec![false; new_paths.len()];
    for old_path in old_paths {
        if new_paths.contains(old_path) {
            continue;
        }
        let candidate = new_paths.iter().enumerate().find(|(i, new_path)| {
            !used[*i]
                && !old_paths.contains(new_path)
                && check_rename_path(old_dca, new_dca, old_path, new_path)
        });
        if let Some((i, new_path)) = candidate {
            used[i] = true;
            renames.push(RenameEvent::new(old_path.clone(), new_path.clone()));
        }
    }
    renames
}

/// Fold `new_renames` into `list`, linking chained events.
///
/// A new event that extends an existing one (see [`RenameEvent::link`]) is
/// inserted as the linked event just before it; otherwise it is appended.
pub fn merge_renamed_paths(list: &mut Vec<RenameEvent>, new_renames: &[RenameEvent]) {
    for rename in new_renames {
        let linked = list
            .iter()
            .enumerate()
            .find_map(|(i, existing)| existing.link(rename).map(|event| (i, event)));
        match linked {
            Some((i, event)) => list.insert(i, event),
            None => list.push(rename.clone()),
        }
    }
}

/// Drop, for every created path, the first event whose old path it
/// re-creates.
pub fn retire_recreated(list: &mut Vec<RenameEvent>, created: &[DataArrayPath]) {
    for path in created {
        if let Some(i) = list.iter().position(|rename| rename.old == *path) {
            list.remove(i);
        }
    }
}
