//! Per-namespace tables: interfaces, enumerations and runtime classes.

use crate::interface::InterfaceDescriptor;
use native_model::{NativeError, NativeRef};
use std::fmt;

/// An enumeration: named 64-bit values.
#[derive(Debug, Clone, Copy)]
pub struct EnumDescriptor {
    /// Short name within its namespace
    pub name: &'static str,
    /// Members in declaration order
    pub members: &'static [(&'static str, i64)],
}

impl EnumDescriptor {
    /// Looks up a member value.
    pub fn value(&self, member: &str) -> Option<i64> {
        self.members
            .iter()
            .find(|(name, _)| *name == member)
            .map(|(_, value)| *value)
    }
}

/// Returns the activation factory object of a runtime class.
pub type FactoryFn = fn() -> Result<NativeRef, NativeError>;

/// A runtime class, reached through its activation factory.
#[derive(Clone, Copy)]
pub struct ClassDescriptor {
    /// Short name within its namespace
    pub name: &'static str,
    /// Factory accessor
    pub factory: FactoryFn,
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("name", &self.name)
            .finish()
    }
}

/// The generated table of one namespace.
#[derive(Debug)]
pub struct NamespaceTable {
    /// Dotted namespace name, e.g. `Sample.Devices`
    pub name: &'static str,
    /// Interfaces declared in the namespace
    pub interfaces: &'static [&'static InterfaceDescriptor],
    /// Enumerations declared in the namespace
    pub enums: &'static [EnumDescriptor],
    /// Runtime classes declared in the namespace
    pub classes: &'static [ClassDescriptor],
}

impl NamespaceTable {
    /// An empty namespace.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            interfaces: &[],
            enums: &[],
            classes: &[],
        }
    }

    /// Sets the interface table.
    pub const fn with_interfaces(mut self, interfaces: &'static [&'static InterfaceDescriptor]) -> Self {
        self.interfaces = interfaces;
        self
    }

    /// Sets the enumeration table.
    pub const fn with_enums(mut self, enums: &'static [EnumDescriptor]) -> Self {
        self.enums = enums;
        self
    }

    /// Sets the runtime class table.
    pub const fn with_classes(mut self, classes: &'static [ClassDescriptor]) -> Self {
        self.classes = classes;
        self
    }

    /// Looks up an enumeration by short name.
    pub fn enumeration(&self, name: &str) -> Option<&EnumDescriptor> {
        self.enums.iter().find(|e| e.name == name)
    }

    /// Looks up a runtime class by short name.
    pub fn class(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes.iter().find(|c| c.name == name)
    }
}
