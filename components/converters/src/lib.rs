//! Value converter layer.
//!
//! Bidirectional conversions between native values and script values, used by
//! the generated member thunks of every interface descriptor:
//!
//! - [`ToScript`] / [`FromScript`] - value types: booleans, integers, floats,
//!   strings, unique IDs, time points, durations, vectors, matrices and
//!   boxed optionals
//! - [`char16_to_script`] / [`char16_from_script`] - 16-bit characters
//! - [`any_to_script`] / [`any_from_script`] - the tagged-union any value,
//!   including typed arrays
//! - [`ObjectProjector`] - the seam through which native objects and async
//!   operations are projected by the runtime
//!
//! Failed conversions from script are `TypeError`s naming the expected type.
//!
//! # Examples
//!
//! ```
//! use converters::{parse_guid, FromScript, ToScript};
//! use core_types::Value;
//! use native_model::Guid;
//!
//! let id = parse_guid("{00000035-0000-0000-c000-000000000046}").unwrap();
//! let script = id.to_script();
//! assert_eq!(script, Value::string("00000035-0000-0000-c000-000000000046"));
//! assert_eq!(Guid::from_script(&script).unwrap(), id);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod any;
mod error;
mod guid;
mod numerics;
mod primitive;
mod projector;
mod time;

pub use any::{any_from_script, any_to_script};
pub use error::native_error;
pub use guid::parse_guid;
pub use primitive::{char16_from_script, char16_to_script, FromScript, ToScript};
pub use projector::{object_from_script, object_to_script, ObjectProjector, ResultConvertFn};
