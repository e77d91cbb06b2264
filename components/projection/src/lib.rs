//! Native component projection.
//!
//! Presents reference-counted native objects to the script engine as
//! ordinary script objects:
//!
//! - [`Session`] / [`ProjectionContext`] - one projection session per script
//!   thread, registered in a process-wide thread table
//! - identity cache - at most one live wrapper per native identity
//! - [`ProjectedInstance`] - dispatch of properties, overloaded methods,
//!   events and runtime members across an object's interfaces
//! - event registration table - script listeners attached to native events,
//!   keyed by native identity
//! - [`NamespaceObject`] / [`EnumObject`] - namespaces, enumerations and
//!   runtime class factories
//!
//! Native async operations are projected as promise-likes through
//! [`async_runtime::AsyncOperation`].

#![warn(missing_docs)]
#![warn(clippy::all)]

mod cache;
mod config;
mod dispatch;
mod error;
mod events;
mod host;
mod instance;
mod namespace;
mod session;

pub use config::{ProjectionConfig, WeakReferenceMode};
pub use error::{contract_violation, ProjectionError};
pub use host::{RcHost, ScriptHost};
pub use instance::ProjectedInstance;
pub use namespace::{EnumObject, NamespaceObject};
pub use session::{ProjectionContext, Session};
