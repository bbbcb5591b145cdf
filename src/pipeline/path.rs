//! Three-level addresses into the Store.
//!
//! A [`DataArrayPath`] names a container, a matrix inside it and an array
//! inside that. Trailing components may be empty, giving container-only or
//! container+matrix addresses. The string form joins the non-empty prefix
//! with `|`, e.g. `"Image|Cell|Phases"`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Separator used by [`DataArrayPath::serialize`].
pub const DELIMITER: &str = "|";

/// Depth of a path, derived from which components are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathType {
    /// No container name, or a gap in the components
    None,
    DataContainer,
    AttributeMatrix,
    DataArray,
}

/// Address of a container, matrix or array in a
/// [`DataContainerArray`](crate::data::DataContainerArray).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataArrayPath {
    #[serde(rename = "Data Container Name", default)]
    data_container_name: String,
    #[serde(rename = "Attribute Matrix Name", default)]
    attribute_matrix_name: String,
    #[serde(rename = "Data Array Name", default)]
    data_array_name: String,
}

impl DataArrayPath {
    pub fn new(
        data_container: impl Into<String>,
        attribute_matrix: impl Into<String>,
        data_array: impl Into<String>,
    ) -> Self {
        Self {
            data_container_name: data_container.into(),
            attribute_matrix_name: attribute_matrix.into(),
            data_array_name: data_array.into(),
        }
    }

    /// Container-only address.
    pub fn container(name: impl Into<String>) -> Self {
        Self::new(name, "", "")
    }

    /// Container+matrix address.
    pub fn matrix(data_container: impl Into<String>, attribute_matrix: impl Into<String>) -> Self {
        Self::new(data_container, attribute_matrix, "")
    }

    pub fn data_container_name(&self) -> &str {
        &self.data_container_name
    }

    pub fn attribute_matrix_name(&self) -> &str {
        &self.attribute_matrix_name
    }

    pub fn data_array_name(&self) -> &str {
        &self.data_array_name
    }

    pub fn set_data_container_name(&mut self, name: impl Into<String>) {
        self.data_container_name = name.into();
    }

    pub fn set_attribute_matrix_name(&mut self, name: impl Into<String>) {
        self.attribute_matrix_name = name.into();
    }

    pub fn set_data_array_name(&mut self, name: impl Into<String>) {
        self.data_array_name = name.into();
    }

    /// The path truncated to its container component.
    pub fn container_path(&self) -> DataArrayPath {
        Self::container(self.data_container_name.clone())
    }

    /// The path truncated to its container and matrix components.
    pub fn matrix_path(&self) -> DataArrayPath {
        Self::matrix(
            self.data_container_name.clone(),
            self.attribute_matrix_name.clone(),
        )
    }

    /// Array path under this matrix path.
    pub fn with_array(&self, name: impl Into<String>) -> DataArrayPath {
        Self::new(
            self.data_container_name.clone(),
            self.attribute_matrix_name.clone(),
            name,
        )
    }

    pub fn path_type(&self) -> PathType {
        let dc = self.data_container_name.is_empty();
        let am = self.attribute_matrix_name.is_empty();
        let da = self.data_array_name.is_empty();
        match (dc, am, da) {
            (true, _, _) => PathType::None,
            (false, true, true) => PathType::DataContainer,
            (false, false, true) => PathType::AttributeMatrix,
            (false, false, false) => PathType::DataArray,
            (false, true, false) => PathType::None,
        }
    }

    /// True when every component is empty.
    pub fn is_empty(&self) -> bool {
        self.data_container_name.is_empty()
            && self.attribute_matrix_name.is_empty()
            && self.data_array_name.is_empty()
    }

    /// True when all three components are set.
    pub fn is_valid(&self) -> bool {
        self.path_type() == PathType::DataArray
    }

    pub fn has_same_data_container(&self, other: &DataArrayPath) -> bool {
        self.data_container_name == other.data_container_name
    }

    pub fn has_same_attribute_matrix(&self, other: &DataArrayPath) -> bool {
        self.attribute_matrix_name == other.attribute_matrix_name
    }

    pub fn has_same_data_array(&self, other: &DataArrayPath) -> bool {
        self.data_array_name == other.data_array_name
    }

    /// Same container and matrix components.
    pub fn has_same_attribute_matrix_path(&self, other: &DataArrayPath) -> bool {
        self.has_same_data_container(other) && self.has_same_attribute_matrix(other)
    }

    /// Join the non-empty prefix with [`DELIMITER`].
    pub fn serialize(&self) -> String {
        self.serialize_with(DELIMITER)
    }

    pub fn serialize_with(&self, delimiter: &str) -> String {
        let mut s = String::new();
        if !self.data_container_name.is_empty() {
            s.push_str(&self.data_container_name);
            if !self.attribute_matrix_name.is_empty() {
                s.push_str(delimiter);
                s.push_str(&self.attribute_matrix_name);
                if !self.data_array_name.is_empty() {
                    s.push_str(delimiter);
                    s.push_str(&self.data_array_name);
                }
            }
        }
        s
    }

    /// Inverse of [`DataArrayPath::serialize`].
    ///
    /// Parts beyond the third are ignored.
    pub fn deserialize(s: &str) -> Self {
        Self::deserialize_with(s, DELIMITER)
    }

    pub fn deserialize_with(s: &str, delimiter: &str) -> Self {
        if s.is_empty() {
            return Self::default();
        }
        let mut parts = s.split(delimiter);
        let mut path = Self::default();
        if let Some(dc) = parts.next() {
            path.data_container_name = dc.to_string();
        }
        if let Some(am) = parts.next() {
            path.attribute_matrix_name = am.to_string();
        }
        if let Some(da) = parts.next() {
            path.data_array_name = da.to_string();
        }
        path
    }

    /// Partial-address containment.
    ///
    /// With `wildcard_suffix` the empty trailing components of `self` match
    /// anything in `other`; otherwise the paths must be equal.
    pub fn matches(&self, other: &DataArrayPath, wildcard_suffix: bool) -> bool {
        if wildcard_suffix {
            self.is_subset(other)
        } else {
            self == other
        }
    }

    /// True when `self` is a prefix of `other` at `self`'s depth.
    ///
    /// Paths of the same type must be equal; a deeper `self` is never a
    /// subset of a shallower `other`.
    pub fn is_subset(&self, other: &DataArrayPath) -> bool {
        let depth = depth(self.path_type());
        let other_depth = depth_of(other);
        if self.path_type() == other.path_type() {
            return self == other;
        }
        if depth > other_depth {
            return false;
        }
        let mut valid = true;
        if depth >= 3 {
            valid &= self.has_same_data_array(other);
        }
        if depth >= 2 {
            valid &= self.has_same_attribute_matrix(other);
        }
        if depth >= 1 {
            valid &= self.has_same_data_container(other);
        }
        valid
    }

    /// True when `updated` could be `self` after a single rename: same path
    /// type and exactly one differing component.
    pub fn possible_rename(&self, updated: &DataArrayPath) -> bool {
        if self.path_type() != updated.path_type() {
            return false;
        }
        let differences = [
            !self.has_same_data_container(updated),
            !self.has_same_attribute_matrix(updated),
            !self.has_same_data_array(updated),
        ]
        .iter()
        .filter(|d| **d)
        .count();
        differences == 1
    }

    /// Apply `rename` if its old path addresses `self` (or an ancestor of
    /// `self`). Returns true if the rename applied.
    pub fn update_path(&mut self, rename: &RenameEvent) -> bool {
        let old = &rename.old;
        let new = &rename.new;
        let valid = match old.path_type() {
            PathType::DataArray => {
                self.has_same_data_array(old)
                    && self.has_same_attribute_matrix(old)
                    && self.has_same_data_container(old)
            }
            PathType::AttributeMatrix => {
                self.has_same_attribute_matrix(old) && self.has_same_data_container(old)
            }
            PathType::DataContainer => self.has_same_data_container(old),
            PathType::None => false,
        };
        if !valid {
            return false;
        }
        self.substitute(old.path_type(), new);
        true
    }

    /// Copy `new`'s components down to `level`.
    fn substitute(&mut self, level: PathType, new: &DataArrayPath) {
        if level == PathType::DataArray {
            self.data_array_name = new.data_array_name.clone();
        }
        if matches!(level, PathType::DataArray | PathType::AttributeMatrix) {
            self.attribute_matrix_name = new.attribute_matrix_name.clone();
        }
        if level != PathType::None {
            self.data_container_name = new.data_container_name.clone();
        }
    }

    /// JSON object form keyed by `"Data Container Name"` etc.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "Data Container Name": self.data_container_name,
            "Attribute Matrix Name": self.attribute_matrix_name,
            "Data Array Name": self.data_array_name,
        })
    }

    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

fn depth(path_type: PathType) -> u8 {
    match path_type {
        PathType::None => 0,
        PathType::DataContainer => 1,
        PathType::AttributeMatrix => 2,
        PathType::DataArray => 3,
    }
}

fn depth_of(path: &DataArrayPath) -> u8 {
    depth(path.path_type())
}

impl fmt::Display for DataArrayPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl FromStr for DataArrayPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::deserialize(s))
    }
}

impl PartialOrd for DataArrayPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DataArrayPath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.serialize()
            .cmp(&other.serialize())
            .then_with(|| self.data_array_name.cmp(&other.data_array_name))
            .then_with(|| self.attribute_matrix_name.cmp(&other.attribute_matrix_name))
    }
}

/// An `(old, new)` substitution between two Store snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenameEvent {
    pub old: DataArrayPath,
    pub new: DataArrayPath,
}

impl RenameEvent {
    pub fn new(old: DataArrayPath, new: DataArrayPath) -> Self {
        Self { old, new }
    }

    /// The rename that undoes this one.
    pub fn inverse(&self) -> Self {
        Self {
            old: self.new.clone(),
            new: self.old.clone(),
        }
    }

    /// Chain `next` onto `self` (the earlier rename).
    ///
    /// Returns the combined event when `next` renames the same source to a
    /// different target, or when `next.old` lies inside `self.new`.
    pub fn link(&self, next: &RenameEvent) -> Option<RenameEvent> {
        if next.old == self.old && self.new != next.new {
            return Some(RenameEvent::new(self.new.clone(), next.new.clone()));
        }
        if !next.old.is_subset(&self.new) {
            return None;
        }
        let mut old = self.old.clone();
        old.update_path(next);
        let mut new = self.new.clone();
        new.substitute(next.old.path_type(), &next.new);
        Some(RenameEvent::new(old, new))
    }
}

impl fmt::Display for RenameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.old, self.new)
    }
}
