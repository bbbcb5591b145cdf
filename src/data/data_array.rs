//! Typed, resizable column storage.
//!
//! A [`DataArray`] stores `tuple_count * component_count` elements of one
//! [`ElementKind`]. The element kind is fixed at construction; the tuple
//! count follows the owning [`AttributeMatrix`](super::AttributeMatrix).
//!
//! Arrays created during preflight (or produced by a schema copy) are
//! *unallocated*: they describe their shape but hold an empty buffer. Once
//! allocated, `len() == tuple_count * component_count` holds at all times.

use crate::types::{shape_len, ElementKind};

/// Backing buffer of a [`DataArray`], one variant per element kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Int8(Vec<i8>),
    UInt8(Vec<u8>),
    Int16(Vec<i16>),
    UInt16(Vec<u16>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Int64(Vec<i64>),
    UInt64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Bool(Vec<bool>),
    String(Vec<String>),
}

/// Run `$body` with `$v` bound to the inner `Vec` of any variant.
macro_rules! with_vec {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            ArrayData::Int8($v) => $body,
            ArrayData::UInt8($v) => $body,
            ArrayData::Int16($v) => $body,
            ArrayData::UInt16($v) => $body,
            ArrayData::Int32($v) => $body,
            ArrayData::UInt32($v) => $body,
            ArrayData::Int64($v) => $body,
            ArrayData::UInt64($v) => $body,
            ArrayData::Float32($v) => $body,
            ArrayData::Float64($v) => $body,
            ArrayData::Bool($v) => $body,
            ArrayData::String($v) => $body,
        }
    };
}

impl ArrayData {
    /// An empty buffer of the given kind.
    pub fn empty(kind: ElementKind) -> Self {
        Self::with_len(kind, 0)
    }

    /// A default-filled buffer of `len` elements.
    pub fn with_len(kind: ElementKind, len: usize) -> Self {
        match kind {
            ElementKind::Int8 => ArrayData::Int8(vec![0; len]),
            ElementKind::UInt8 => ArrayData::UInt8(vec![0; len]),
            ElementKind::Int16 => ArrayData::Int16(vec![0; len]),
            ElementKind::UInt16 => ArrayData::UInt16(vec![0; len]),
            ElementKind::Int32 => ArrayData::Int32(vec![0; len]),
            ElementKind::UInt32 => ArrayData::UInt32(vec![0; len]),
            ElementKind::Int64 => ArrayData::Int64(vec![0; len]),
            ElementKind::UInt64 => ArrayData::UInt64(vec![0; len]),
            ElementKind::Float32 => ArrayData::Float32(vec![0.0; len]),
            ElementKind::Float64 => ArrayData::Float64(vec![0.0; len]),
            ElementKind::Bool => ArrayData::Bool(vec![false; len]),
            ElementKind::String => ArrayData::String(vec![String::new(); len]),
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            ArrayData::Int8(_) => ElementKind::Int8,
            ArrayData::UInt8(_) => ElementKind::UInt8,
            ArrayData::Int16(_) => ElementKind::Int16,
            ArrayData::UInt16(_) => ElementKind::UInt16,
            ArrayData::Int32(_) => ElementKind::Int32,
            ArrayData::UInt32(_) => ElementKind::UInt32,
            ArrayData::Int64(_) => ElementKind::Int64,
            ArrayData::UInt64(_) => ElementKind::UInt64,
            ArrayData::Float32(_) => ElementKind::Float32,
            ArrayData::Float64(_) => ElementKind::Float64,
            ArrayData::Bool(_) => ElementKind::Bool,
            ArrayData::String(_) => ElementKind::String,
        }
    }

    pub fn len(&self) -> usize {
        with_vec!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Grow with default values or truncate.
    fn resize(&mut self, len: usize) {
        with_vec!(self, v => v.resize(len, Default::default()))
    }

    /// Replace the contents with `len` default values.
    fn reset(&mut self, len: usize) {
        *self = Self::with_len(self.kind(), len);
    }

    fn clear(&mut self) {
        with_vec!(self, v => {
            v.clear();
            v.shrink_to_fit();
        })
    }

    /// Parse `text` as one element and write it to every slot.
    fn fill_parsed(&mut self, text: &str) -> bool {
        with_vec!(self, v => fill_vec(v, text))
    }
}

fn fill_vec<T: ArrayElement>(values: &mut [T], text: &str) -> bool {
    match T::parse_value(text) {
        Some(value) => {
            values.iter_mut().for_each(|slot| *slot = value.clone());
            true
        }
        None => false,
    }
}

/// Rust element types that can be stored in a [`DataArray`].
pub trait ArrayElement: Clone + Default + Send + 'static {
    const KIND: ElementKind;

    fn slice(data: &ArrayData) -> Option<&[Self]>;
    fn vec_mut(data: &mut ArrayData) -> Option<&mut Vec<Self>>;
    fn wrap(values: Vec<Self>) -> ArrayData;
    fn parse_value(text: &str) -> Option<Self>;
}

macro_rules! impl_array_element {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ArrayElement for $ty {
                const KIND: ElementKind = ElementKind::$variant;

                fn slice(data: &ArrayData) -> Option<&[Self]> {
                    match data {
                        ArrayData::$variant(v) => Some(v.as_slice()),
                        _ => None,
                    }
                }

                fn vec_mut(data: &mut ArrayData) -> Option<&mut Vec<Self>> {
                    match data {
                        ArrayData::$variant(v) => Some(v),
                        _ => None,
                    }
                }

                fn wrap(values: Vec<Self>) -> ArrayData {
                    ArrayData::$variant(values)
                }

                fn parse_value(text: &str) -> Option<Self> {
                    text.trim().parse::<$ty>().ok()
                }
            }
        )*
    };
}

impl_array_element! {
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
}

impl ArrayElement for bool {
    const KIND: ElementKind = ElementKind::Bool;

    fn slice(data: &ArrayData) -> Option<&[Self]> {
        match data {
            ArrayData::Bool(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    fn vec_mut(data: &mut ArrayData) -> Option<&mut Vec<Self>> {
        match data {
            ArrayData::Bool(v) => Some(v),
            _ => None,
        }
    }

    fn wrap(values: Vec<Self>) -> ArrayData {
        ArrayData::Bool(values)
    }

    fn parse_value(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ArrayElement for String {
    const KIND: ElementKind = ElementKind::String;

    fn slice(data: &ArrayData) -> Option<&[Self]> {
        match data {
            ArrayData::String(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    fn vec_mut(data: &mut ArrayData) -> Option<&mut Vec<Self>> {
        match data {
            ArrayData::String(v) => Some(v),
            _ => None,
        }
    }

    fn wrap(values: Vec<Self>) -> ArrayData {
        ArrayData::String(values)
    }

    fn parse_value(text: &str) -> Option<Self> {
        Some(text.to_string())
    }
}

/// A named, typed array of `tuple_count` tuples with `component_dims` per tuple.
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray {
    name: String,
    data: ArrayData,
    tuple_count: usize,
    component_dims: Vec<usize>,
    allocated: bool,
}

impl DataArray {
    /// Create a new array. When `allocate` is false only the shape is recorded.
    pub fn new(
        name: impl Into<String>,
        kind: ElementKind,
        tuple_count: usize,
        component_dims: &[usize],
        allocate: bool,
    ) -> Self {
        let component_dims = normalize_component_dims(component_dims);
        let len = if allocate {
            element_len(tuple_count, &component_dims)
        } else {
            0
        };
        Self {
            name: name.into(),
            data: ArrayData::with_len(kind, len),
            tuple_count,
            component_dims,
            allocated: allocate,
        }
    }

    /// Wrap an existing buffer. Returns `None` when `values.len()` is not a
    /// whole number of tuples.
    pub fn from_vec<T: ArrayElement>(
        name: impl Into<String>,
        values: Vec<T>,
        component_dims: &[usize],
    ) -> Option<Self> {
        let component_dims = normalize_component_dims(component_dims);
        let comps = shape_len(&component_dims)?;
        if comps == 0 || values.len() % comps != 0 {
            return None;
        }
        Some(Self {
            name: name.into(),
            tuple_count: values.len() / comps,
            data: T::wrap(values),
            component_dims,
            allocated: true,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn kind(&self) -> ElementKind {
        self.data.kind()
    }

    pub fn tuple_count(&self) -> usize {
        self.tuple_count
    }

    pub fn component_dims(&self) -> &[usize] {
        &self.component_dims
    }

    pub fn component_count(&self) -> usize {
        shape_len(&self.component_dims).unwrap_or(usize::MAX)
    }

    /// Number of stored elements (zero when unallocated).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_allocated(&self) -> bool {
        self.allocated
    }

    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    /// Typed view of the buffer, `None` when `T` is not the stored kind.
    pub fn as_slice<T: ArrayElement>(&self) -> Option<&[T]> {
        T::slice(&self.data)
    }

    pub fn as_mut_slice<T: ArrayElement>(&mut self) -> Option<&mut [T]> {
        T::vec_mut(&mut self.data).map(|v| v.as_mut_slice())
    }

    /// Elements of tuple `index`, if allocated and in range.
    pub fn tuple<T: ArrayElement>(&self, index: usize) -> Option<&[T]> {
        let comps = self.component_count();
        let start = index.checked_mul(comps)?;
        self.as_slice::<T>()?.get(start..start + comps)
    }

    /// Allocate a default-filled buffer if this array only holds a shape.
    pub fn allocate(&mut self) {
        if !self.allocated {
            self.data.reset(element_len(self.tuple_count, &self.component_dims));
            self.allocated = true;
        }
    }

    /// Change the tuple count.
    ///
    /// Growing keeps existing tuples and default-fills the tail. Shrinking
    /// would lose data, so the buffer is reallocated and default-filled.
    pub(crate) fn resize_tuples(&mut self, tuple_count: usize) {
        if self.allocated {
            let len = element_len(tuple_count, &self.component_dims);
            if tuple_count < self.tuple_count {
                self.data.reset(len);
            } else {
                self.data.resize(len);
            }
        }
        self.tuple_count = tuple_count;
    }

    /// Parse `text` once and write it into every element.
    pub fn fill_from_str(&mut self, text: &str) -> bool {
        self.data.fill_parsed(text)
    }

    /// Write `value` into every element. Returns false on kind mismatch.
    pub fn fill<T: ArrayElement>(&mut self, value: T) -> bool {
        match T::vec_mut(&mut self.data) {
            Some(v) => {
                v.iter_mut().for_each(|slot| *slot = value.clone());
                true
            }
            None => false,
        }
    }

    /// Same name, kind and shape, no buffer.
    pub fn schema_copy(&self) -> Self {
        Self {
            name: self.name.clone(),
            data: ArrayData::empty(self.kind()),
            tuple_count: self.tuple_count,
            component_dims: self.component_dims.clone(),
            allocated: false,
        }
    }

    /// Drop the buffer but keep the shape.
    pub fn release(&mut self) {
        self.data.clear();
        self.allocated = false;
    }

    /// True when `other` has the same kind and component layout.
    pub fn is_compatible_with(&self, other: &DataArray) -> bool {
        self.kind() == other.kind() && self.component_dims == other.component_dims
    }
}

/// Buffer length for a shape, saturating at `usize::MAX`. The Store rejects
/// overflowing shapes before sizing a buffer from them.
fn element_len(tuple_count: usize, component_dims: &[usize]) -> usize {
    shape_len(component_dims)
        .and_then(|comps| comps.checked_mul(tuple_count))
        .unwrap_or(usize::MAX)
}

fn normalize_component_dims(component_dims: &[usize]) -> Vec<usize> {
    if component_dims.is_empty() {
        vec![1]
    } else {
        component_dims.to_vec()
    }
}
