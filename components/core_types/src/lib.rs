//! Core script value types and error handling.
//!
//! This crate provides the script-side vocabulary shared by every component
//! of the projection runtime: the values the engine passes around, the
//! object and function contracts of its native-extension API, and the errors
//! raised towards script.
//!
//! # Overview
//!
//! - [`Value`] - Script values (primitives, arrays, objects, functions)
//! - [`HostObject`] - Get/set/enumerate contract of script-visible objects
//! - [`Callable`] - Contract of script-callable functions
//! - [`PlainObject`] / [`NativeFunction`] - Ready-made implementations
//! - [`JsError`] / [`ErrorKind`] - Script errors
//!
//! # Examples
//!
//! ```
//! use core_types::{JsError, PlainObject, Value};
//!
//! let point = PlainObject::new()
//!     .with("x", Value::Smi(1))
//!     .with("y", Value::Smi(2))
//!     .into_value();
//! assert_eq!(point.get("x").unwrap(), Value::Smi(1));
//!
//! let error = JsError::type_error("undefined is not a function");
//! assert!(error.to_string().starts_with("TypeError"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod object;
mod value;

pub use error::{ErrorKind, JsError};
pub use object::{Callable, HostObject, NativeFunction, PlainObject};
pub use value::{ArrayRef, FunctionRef, ObjectRef, Value, MAX_SAFE_INTEGER};
