//! Script error types.
//!
//! Errors raised towards script are [`JsError`]s. A `JsError` either describes
//! an error the binding layer creates (type errors, native failures) or carries
//! an arbitrary value thrown by script code, so that promise chains can
//! propagate exactly what was thrown.

use crate::{PlainObject, Value};
use std::fmt;

/// The kind of script error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Generic `Error` (native failures use this kind)
    Error,
    /// Type error (wrong argument count, bad value shape)
    TypeError,
    /// Reference to something that does not exist
    ReferenceError,
    /// Value out of allowed range
    RangeError,
    /// Internal binding-layer error
    InternalError,
    /// A value thrown by script code
    Thrown,
}

impl ErrorKind {
    /// The constructor name of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Error | ErrorKind::Thrown => "Error",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::InternalError => "InternalError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A script error with message, optional native error code and optional
/// thrown value.
///
/// # Examples
///
/// ```
/// use core_types::{ErrorKind, JsError};
///
/// let error = JsError::type_error("undefined is not a function");
/// assert_eq!(error.kind, ErrorKind::TypeError);
/// assert_eq!(error.to_string(), "TypeError: undefined is not a function");
/// ```
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct JsError {
    /// The type of error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Native error code, when the error came from a native call
    pub code: Option<i32>,
    /// The value thrown by script, for [`ErrorKind::Thrown`]
    pub thrown: Option<Value>,
}

impl JsError {
    /// Creates an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
            thrown: None,
        }
    }

    /// Creates a `TypeError`.
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message)
    }

    /// Creates a `RangeError`.
    pub fn range_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RangeError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InternalError, message)
    }

    /// Creates an `Error` carrying a native error code.
    pub fn with_code(message: impl Into<String>, code: i32) -> Self {
        Self {
            code: Some(code),
            ..Self::new(ErrorKind::Error, message)
        }
    }

    /// Wraps a value thrown by script.
    ///
    /// ```
    /// use core_types::{JsError, Value};
    ///
    /// let error = JsError::thrown(Value::Smi(7));
    /// assert_eq!(error.to_value(), Value::Smi(7));
    /// ```
    pub fn thrown(value: Value) -> Self {
        let message = match value.get("message") {
            Ok(Value::String(message)) => message,
            _ => value.to_string(),
        };
        Self {
            thrown: Some(value),
            ..Self::new(ErrorKind::Thrown, message)
        }
    }

    /// The script value this error throws.
    ///
    /// Thrown values are returned as-is; other errors become error objects
    /// with `name`, `message` and, for native failures, `number`.
    pub fn to_value(&self) -> Value {
        if let Some(value) = &self.thrown {
            return value.clone();
        }
        let obj = PlainObject::with_class(self.kind.name())
            .with("name", Value::string(self.kind.name()))
            .with("message", Value::string(self.message.clone()));
        if let Some(code) = self.code {
            obj.insert("number", Value::Smi(code));
        }
        obj.into_value()
    }
}
