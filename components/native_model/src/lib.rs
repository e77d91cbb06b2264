//! Native object model consumed by the projection runtime.
//!
//! Native components are reference-counted, thread-safe objects that expose
//! capabilities through interfaces identified by [`Guid`]s. This crate
//! provides the vocabulary the projection needs to talk to them:
//!
//! - [`Unknown`] / [`NativeRef`] - the root object contract: same-identity
//!   query, interface-set enumeration, typed access
//! - [`Identity`] - canonical identity address, used as a cache key
//! - [`AnyValue`] / [`PropertyType`] - the tagged-union "any" value
//! - [`DateTime`], [`TimeSpan`], vectors and matrices - value types
//! - [`EventSource`] / [`EventToken`] - native events
//! - [`AsyncInfo`] / [`CompletionSource`] - native async operations
//! - [`NativeError`] / [`HResult`] - native failures
//!
//! # Examples
//!
//! ```
//! use native_model::{Guid, Identity, NativeRef, Unknown};
//! use std::any::Any;
//! use std::sync::Arc;
//!
//! const IID_LAMP: Guid = Guid::from_u128(0x7c1f_5a2e_0000_4000_8000_0000_0000_0001);
//!
//! struct Lamp;
//!
//! impl Unknown for Lamp {
//!     fn interface_ids(&self) -> Vec<Guid> {
//!         vec![IID_LAMP]
//!     }
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//! }
//!
//! let lamp: NativeRef = Arc::new(Lamp);
//! let alias = Arc::clone(&lamp);
//! assert_eq!(Identity::of(&lamp), Identity::of(&alias));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod async_info;
mod error;
mod event;
mod guid;
mod numerics;
mod object;
mod time;
mod value;

pub use async_info::{
    AsyncInfo, AsyncStatus, CompletedHandler, CompletionSource, ProgressHandler, IID_ASYNC_INFO,
};
pub use error::{HResult, NativeError};
pub use event::{EventHandler, EventSource, EventToken};
pub use guid::Guid;
pub use numerics::{Matrix3x2, Matrix4x4, Vector2, Vector3, Vector4};
pub use object::{
    cast, query_identity, ActivationFactory, Identity, NativeRef, Unknown, IID_ACTIVATION_FACTORY,
};
pub use time::{DateTime, TimeSpan, TICKS_PER_MILLISECOND, UNIX_EPOCH_TICKS};
pub use value::{AnyValue, PropertyType};
