//! Tagged-union any value conversions.

use crate::primitive::expected;
use crate::{char16_to_script, ObjectProjector, ToScript};
use core_types::{JsError, Value};
use native_model::{AnyValue, DateTime};
use num_traits::ToPrimitive;

fn array_to_script<T: ToScript>(items: &[T]) -> Value {
    Value::array(items.iter().map(ToScript::to_script).collect())
}

/// Converts an any value to script, dispatching on its type tag.
///
/// Empty becomes `null`, typed arrays become arrays and objects are projected
/// through `projector`.
pub fn any_to_script(projector: &dyn ObjectProjector, value: AnyValue) -> Result<Value, JsError> {
    Ok(match value {
        AnyValue::Empty => Value::Null,
        AnyValue::UInt8(n) => n.to_script(),
        AnyValue::Int16(n) => n.to_script(),
        AnyValue::UInt16(n) => n.to_script(),
        AnyValue::Int32(n) => n.to_script(),
        AnyValue::UInt32(n) => n.to_script(),
        AnyValue::Int64(n) => n.to_script(),
        AnyValue::UInt64(n) => n.to_script(),
        AnyValue::Single(n) => n.to_script(),
        AnyValue::Double(n) => n.to_script(),
        AnyValue::Char16(c) => char16_to_script(c),
        AnyValue::Boolean(b) => b.to_script(),
        AnyValue::String(s) => Value::String(s),
        AnyValue::Object(obj) => projector.project(obj)?,
        AnyValue::DateTime(dt) => dt.to_script(),
        AnyValue::TimeSpan(ts) => ts.to_script(),
        AnyValue::Guid(g) => g.to_script(),
        AnyValue::UInt8Array(items) => array_to_script(&items),
        AnyValue::Int16Array(items) => array_to_script(&items),
        AnyValue::UInt16Array(items) => array_to_script(&items),
        AnyValue::Int32Array(items) => array_to_script(&items),
        AnyValue::UInt32Array(items) => array_to_script(&items),
        AnyValue::Int64Array(items) => array_to_script(&items),
        AnyValue::UInt64Array(items) => array_to_script(&items),
        AnyValue::SingleArray(items) => array_to_script(&items),
        AnyValue::DoubleArray(items) => array_to_script(&items),
        AnyValue::Char16Array(items) => {
            Value::array(items.into_iter().map(char16_to_script).collect())
        }
        AnyValue::BooleanArray(items) => array_to_script(&items),
        AnyValue::StringArray(items) => array_to_script(&items),
        AnyValue::ObjectArray(items) => {
            let mut converted = Vec::with_capacity(items.len());
            for item in items {
                converted.push(crate::object_to_script(projector, item)?);
            }
            Value::array(converted)
        }
        AnyValue::DateTimeArray(items) => array_to_script(&items),
        AnyValue::TimeSpanArray(items) => array_to_script(&items),
        AnyValue::GuidArray(items) => array_to_script(&items),
    })
}

/// Boxes a script value into an any value, inferring the type tag.
///
/// | Script value | Any value |
/// |--------------|-----------|
/// | `undefined`, `null` | `Empty` |
/// | boolean | `Boolean` |
/// | small integer | `Int32` |
/// | other number | `Double` |
/// | string | `String` |
/// | lone surrogate | `Char16` |
/// | `BigInt` | `Int64`, or `UInt64` above `i64::MAX` |
/// | `Date` | `DateTime` |
/// | projected native object | `Object` |
/// | array | typed array inferred from the elements |
///
/// Functions, plain objects and arrays mixing element kinds are type errors.
pub fn any_from_script(projector: &dyn ObjectProjector, value: &Value) -> Result<AnyValue, JsError> {
    match value {
        Value::Undefined | Value::Null => Ok(AnyValue::Empty),
        Value::Boolean(b) => Ok(AnyValue::Boolean(*b)),
        Value::Smi(n) => Ok(AnyValue::Int32(*n)),
        Value::Double(n) => Ok(AnyValue::Double(*n)),
        Value::String(s) => Ok(AnyValue::String(s.clone())),
        Value::Utf16(units) => match units.as_ref() {
            [c] => Ok(AnyValue::Char16(*c)),
            _ => Ok(AnyValue::String(String::from_utf16_lossy(units))),
        },
        Value::BigInt(n) => n
            .to_i64()
            .map(AnyValue::Int64)
            .or_else(|| n.to_u64().map(AnyValue::UInt64))
            .ok_or_else(|| JsError::type_error(format!("{} does not fit in 64 bits", n))),
        Value::Date(_) => Ok(AnyValue::DateTime(crate::FromScript::from_script(value)?)),
        Value::Object(_) => projector
            .unwrap(value)
            .map(AnyValue::Object)
            .ok_or_else(|| expected("native object", value)),
        Value::Array(items) => array_from_script(projector, &items.borrow()),
        Value::Function(_) => Err(expected("boxable value", value)),
    }
}

fn array_from_script(projector: &dyn ObjectProjector, items: &[Value]) -> Result<AnyValue, JsError> {
    let Some(first) = items.iter().find(|item| !item.is_nullish()) else {
        let mut objects = Vec::with_capacity(items.len());
        objects.resize_with(items.len(), || None);
        return Ok(AnyValue::ObjectArray(objects));
    };
    let mixed = || JsError::type_error("Array elements must all have the same type");
    match first {
        Value::Boolean(_) => items
            .iter()
            .map(|item| match item {
                Value::Boolean(b) => Ok(*b),
                _ => Err(mixed()),
            })
            .collect::<Result<_, _>>()
            .map(AnyValue::BooleanArray),
        Value::Smi(_) | Value::Double(_) => {
            if items.iter().all(|item| matches!(item, Value::Smi(_))) {
                items
                    .iter()
                    .map(|item| match item {
                        Value::Smi(n) => Ok(*n),
                        _ => Err(mixed()),
                    })
                    .collect::<Result<_, _>>()
                    .map(AnyValue::Int32Array)
            } else {
                items
                    .iter()
                    .map(|item| item.as_number().ok_or_else(mixed))
                    .collect::<Result<_, _>>()
                    .map(AnyValue::DoubleArray)
            }
        }
        Value::String(_) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                _ => Err(mixed()),
            })
            .collect::<Result<_, _>>()
            .map(AnyValue::StringArray),
        Value::Date(_) => items
            .iter()
            .map(|item| match item {
                Value::Date(_) => <DateTime as crate::FromScript>::from_script(item),
                _ => Err(mixed()),
            })
            .collect::<Result<_, _>>()
            .map(AnyValue::DateTimeArray),
        Value::Object(_) => items
            .iter()
            .map(|item| {
                if item.is_nullish() {
                    Ok(None)
                } else {
                    projector.unwrap(item).map(Some).ok_or_else(mixed)
                }
            })
            .collect::<Result<_, _>>()
            .map(AnyValue::ObjectArray),
        other => Err(expected("array of boxable values", other)),
    }
}
