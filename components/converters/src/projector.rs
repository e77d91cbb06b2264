//! The object projection seam.

use core_types::{JsError, Value};
use native_model::{AsyncInfo, NativeRef};
use std::sync::Arc;

/// Converts the result of a completed native async operation to script.
pub type ResultConvertFn = fn(&dyn ObjectProjector, native_model::AnyValue) -> Result<Value, JsError>;

/// Projects native objects into script and back.
///
/// Implemented by the projection session; converters and generated thunks
/// only see this trait.
pub trait ObjectProjector {
    /// Returns the script wrapper of a native object.
    fn project(&self, obj: NativeRef) -> Result<Value, JsError>;

    /// Returns the native object behind a projected wrapper, or `None` when
    /// the value is not a projected native object.
    fn unwrap(&self, value: &Value) -> Option<NativeRef>;

    /// Wraps a native async operation in a promise-like script object whose
    /// result is converted with `convert`.
    fn project_async(
        &self,
        operation: Arc<dyn AsyncInfo>,
        convert: ResultConvertFn,
    ) -> Result<Value, JsError>;
}

/// Projects an optional native object; `None` becomes `null`.
pub fn object_to_script(
    projector: &dyn ObjectProjector,
    obj: Option<NativeRef>,
) -> Result<Value, JsError> {
    match obj {
        Some(obj) => projector.project(obj),
        None => Ok(Value::Null),
    }
}

/// Recovers the native object behind a script value; `null` and `undefined`
/// become `None`.
pub fn object_from_script(
    projector: &dyn ObjectProjector,
    value: &Value,
) -> Result<Option<NativeRef>, JsError> {
    if value.is_nullish() {
        return Ok(None);
    }
    projector
        .unwrap(value)
        .map(Some)
        .ok_or_else(|| JsError::type_error(format!("{} is not a native object", value)))
}
