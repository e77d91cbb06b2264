//! Native failures as script errors.

use core_types::JsError;
use native_model::NativeError;

/// Converts a native failure to a script `Error` carrying the native code as
/// its `number`.
///
/// ```
/// use converters::native_error;
/// use native_model::{HResult, NativeError};
///
/// let error = native_error(&NativeError::new(HResult::E_INVALIDARG, "bad size"));
/// assert_eq!(error.message, "bad size");
/// assert_eq!(error.code, Some(HResult::E_INVALIDARG.0));
/// ```
pub fn native_error(error: &NativeError) -> JsError {
    let message = if error.message.is_empty() {
        format!("Native call failed with {}", error.code)
    } else {
        error.message.clone()
    };
    JsError::with_code(message, error.code.0)
}
