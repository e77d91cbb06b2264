//! The tagged-union "any" value.
//!
//! [`AnyValue`] is what untyped native APIs (boxed property values, async
//! results, event arguments) traffic in. Its [`PropertyType`] tag mirrors the
//! native type-tag enumeration, including the typed array variants.

use crate::{DateTime, Guid, NativeRef, TimeSpan};
use std::fmt;

/// Type tag of an [`AnyValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum PropertyType {
    Empty,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    Char16,
    Boolean,
    String,
    Inspectable,
    DateTime,
    TimeSpan,
    Guid,
    UInt8Array,
    Int16Array,
    UInt16Array,
    Int32Array,
    UInt32Array,
    Int64Array,
    UInt64Array,
    SingleArray,
    DoubleArray,
    Char16Array,
    BooleanArray,
    StringArray,
    InspectableArray,
    DateTimeArray,
    TimeSpanArray,
    GuidArray,
}

impl PropertyType {
    /// True for the typed array tags.
    pub fn is_array(self) -> bool {
        matches!(
            self,
            PropertyType::UInt8Array
                | PropertyType::Int16Array
                | PropertyType::UInt16Array
                | PropertyType::Int32Array
                | PropertyType::UInt32Array
                | PropertyType::Int64Array
                | PropertyType::UInt64Array
                | PropertyType::SingleArray
                | PropertyType::DoubleArray
                | PropertyType::Char16Array
                | PropertyType::BooleanArray
                | PropertyType::StringArray
                | PropertyType::InspectableArray
                | PropertyType::DateTimeArray
                | PropertyType::TimeSpanArray
                | PropertyType::GuidArray
        )
    }
}

/// A tagged native value.
#[derive(Clone)]
#[allow(missing_docs)]
pub enum AnyValue {
    Empty,
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Single(f32),
    Double(f64),
    Char16(u16),
    Boolean(bool),
    String(String),
    Object(NativeRef),
    DateTime(DateTime),
    TimeSpan(TimeSpan),
    Guid(Guid),
    UInt8Array(Vec<u8>),
    Int16Array(Vec<i16>),
    UInt16Array(Vec<u16>),
    Int32Array(Vec<i32>),
    UInt32Array(Vec<u32>),
    Int64Array(Vec<i64>),
    UInt64Array(Vec<u64>),
    SingleArray(Vec<f32>),
    DoubleArray(Vec<f64>),
    Char16Array(Vec<u16>),
    BooleanArray(Vec<bool>),
    StringArray(Vec<String>),
    ObjectArray(Vec<Option<NativeRef>>),
    DateTimeArray(Vec<DateTime>),
    TimeSpanArray(Vec<TimeSpan>),
    GuidArray(Vec<Guid>),
}

impl AnyValue {
    /// The type tag of this value.
    pub fn property_type(&self) -> PropertyType {
        match self {
            AnyValue::Empty => PropertyType::Empty,
            AnyValue::UInt8(_) => PropertyType::UInt8,
            AnyValue::Int16(_) => PropertyType::Int16,
            AnyValue::UInt16(_) => PropertyType::UInt16,
            AnyValue::Int32(_) => PropertyType::Int32,
            AnyValue::UInt32(_) => PropertyType::UInt32,
            AnyValue::Int64(_) => PropertyType::Int64,
            AnyValue::UInt64(_) => PropertyType::UInt64,
            AnyValue::Single(_) => PropertyType::Single,
            AnyValue::Double(_) => PropertyType::Double,
            AnyValue::Char16(_) => PropertyType::Char16,
            AnyValue::Boolean(_) => PropertyType::Boolean,
            AnyValue::String(_) => PropertyType::String,
            AnyValue::Object(_) => PropertyType::Inspectable,
            AnyValue::DateTime(_) => PropertyType::DateTime,
            AnyValue::TimeSpan(_) => PropertyType::TimeSpan,
            AnyValue::Guid(_) => PropertyType::Guid,
            AnyValue::UInt8Array(_) => PropertyType::UInt8Array,
            AnyValue::Int16Array(_) => PropertyType::Int16Array,
            AnyValue::UInt16Array(_) => PropertyType::UInt16Array,
            AnyValue::Int32Array(_) => PropertyType::Int32Array,
            AnyValue::UInt32Array(_) => PropertyType::UInt32Array,
            AnyValue::Int64Array(_) => PropertyType::Int64Array,
            AnyValue::UInt64Array(_) => PropertyType::UInt64Array,
            AnyValue::SingleArray(_) => PropertyType::SingleArray,
            AnyValue::DoubleArray(_) => PropertyType::DoubleArray,
            AnyValue::Char16Array(_) => PropertyType::Char16Array,
            AnyValue::BooleanArray(_) => PropertyType::BooleanArray,
            AnyValue::StringArray(_) => PropertyType::StringArray,
            AnyValue::ObjectArray(_) => PropertyType::InspectableArray,
            AnyValue::DateTimeArray(_) => PropertyType::DateTimeArray,
            AnyValue::TimeSpanArray(_) => PropertyType::TimeSpanArray,
            AnyValue::GuidArray(_) => PropertyType::GuidArray,
        }
    }

    /// True for [`AnyValue::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, AnyValue::Empty)
    }

    /// The object reference, for [`AnyValue::Object`].
    pub fn as_object(&self) -> Option<&NativeRef> {
        match self {
            AnyValue::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

impl From<Option<NativeRef>> for AnyValue {
    fn from(obj: Option<NativeRef>) -> Self {
        obj.map(AnyValue::Object).unwrap_or(AnyValue::Empty)
    }
}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnyValue::Empty => write!(f, "Empty"),
            AnyValue::UInt8(v) => write!(f, "UInt8({})", v),
            AnyValue::Int16(v) => write!(f, "Int16({})", v),
            AnyValue::UInt16(v) => write!(f, "UInt16({})", v),
            AnyValue::Int32(v) => write!(f, "Int32({})", v),
            AnyValue::UInt32(v) => write!(f, "UInt32({})", v),
            AnyValue::Int64(v) => write!(f, "Int64({})", v),
            AnyValue::UInt64(v) => write!(f, "UInt64({})", v),
            AnyValue::Single(v) => write!(f, "Single({})", v),
            AnyValue::Double(v) => write!(f, "Double({})", v),
            AnyValue::Char16(v) => write!(f, "Char16({:#06x})", v),
            AnyValue::Boolean(v) => write!(f, "Boolean({})", v),
            AnyValue::String(v) => write!(f, "String({:?})", v),
            AnyValue::Object(obj) => write!(
                f,
                "Object({})",
                obj.runtime_class_name().unwrap_or_else(|| "?".to_string())
            ),
            AnyValue::DateTime(v) => write!(f, "DateTime({})", v.universal_time),
            AnyValue::TimeSpan(v) => write!(f, "TimeSpan({})", v.duration),
            AnyValue::Guid(v) => write!(f, "Guid({})", v),
            other => write!(f, "{:?}[..]", other.property_type()),
        }
    }
}
