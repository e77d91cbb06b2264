//! Interface registry.
//!
//! Generated metadata tables describe every interface as an
//! [`InterfaceDescriptor`]: ordered property, method and event descriptors
//! carrying converter thunks. The registry resolves interface identifiers to
//! descriptors with two levels of laziness:
//!
//! 1. the global sorted index is built on the first
//!    [`InterfaceRegistry::resolve`];
//! 2. each descriptor's name-keyed member tables are built on the first
//!    member query against that interface.
//!
//! Interfaces never touched by a session cost nothing beyond their static
//! tables.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod activation;
mod descriptor;
mod interface;
mod namespace;
mod registry;

pub use activation::ACTIVATION_FACTORY;
pub use descriptor::{
    AddHandler, CallContext, EventDescriptor, Getter, MethodDescriptor, MethodThunk,
    PropertyDescriptor, RemoveHandler, RuntimeMembers, Setter,
};
pub use interface::{InterfaceDescriptor, MemberTables};
pub use namespace::{ClassDescriptor, EnumDescriptor, FactoryFn, NamespaceTable};
pub use registry::InterfaceRegistry;
