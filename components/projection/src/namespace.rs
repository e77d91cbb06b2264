//! Namespace and enumeration objects.
//!
//! Namespaces nest by dotted name: `Demo` exposes `Demo.Devices` as its
//! `Devices` member. A namespace also exposes the enumerations and runtime
//! classes of its own table; a class reads as its projected activation
//! factory. Both kinds of object are read-only.

use crate::session::ProjectionContext;
use converters::{native_error, ToScript};
use core_types::{HostObject, JsError, Value};
use indexmap::IndexSet;
use interface_registry::{EnumDescriptor, InterfaceRegistry};
use std::any::Any;
use std::rc::{Rc, Weak};

/// A namespace as a script object.
pub struct NamespaceObject {
    path: String,
    context: Weak<ProjectionContext>,
}

impl NamespaceObject {
    pub(crate) fn new(path: &str, context: Weak<ProjectionContext>) -> Self {
        Self {
            path: path.to_string(),
            context,
        }
    }

    /// True when some table is named `path` or nested below it.
    pub(crate) fn exists(registry: &InterfaceRegistry, path: &str) -> bool {
        registry
            .namespaces()
            .iter()
            .any(|ns| ns.name == path || is_nested(ns.name, path))
    }

    pub(crate) fn into_value(self) -> Value {
        Value::Object(Rc::new(self))
    }

    /// The dotted name of this namespace.
    pub fn path(&self) -> &str {
        &self.path
    }

    fn context(&self) -> Result<Rc<ProjectionContext>, JsError> {
        self.context
            .upgrade()
            .ok_or_else(|| JsError::internal("projection session has ended"))
    }
}

/// True when `name` lies below `parent` in the dotted hierarchy.
fn is_nested(name: &str, parent: &str) -> bool {
    name.len() > parent.len() + 1
        && name.starts_with(parent)
        && name.as_bytes()[parent.len()] == b'.'
}

impl HostObject for NamespaceObject {
    fn class_name(&self) -> &str {
        &self.path
    }

    fn get(&self, name: &str) -> Result<Value, JsError> {
        let context = self.context()?;
        let registry = context.registry();
        if let Some(table) = registry.namespace(&self.path) {
            if let Some(descriptor) = table.enumeration(name) {
                return Ok(Value::object(EnumObject::new(descriptor)));
            }
            if let Some(class) = table.class(name) {
                let factory = (class.factory)().map_err(|e| native_error(&e))?;
                return context.project(factory);
            }
        }
        let child = format!("{}.{}", self.path, name);
        if Self::exists(registry, &child) {
            return Ok(NamespaceObject::new(&child, self.context.clone()).into_value());
        }
        Ok(Value::Undefined)
    }

    fn set(&self, name: &str, _value: Value) -> Result<(), JsError> {
        Err(JsError::type_error(format!(
            "Cannot assign to '{}' of namespace {}",
            name, self.path
        )))
    }

    fn own_keys(&self) -> Vec<String> {
        let context = match self.context() {
            Ok(context) => context,
            Err(_) => return Vec::new(),
        };
        let registry = context.registry();
        let mut keys: IndexSet<String> = IndexSet::new();
        if let Some(table) = registry.namespace(&self.path) {
            keys.extend(table.enums.iter().map(|e| e.name.to_string()));
            keys.extend(table.classes.iter().map(|c| c.name.to_string()));
        }
        for table in registry.namespaces() {
            if is_nested(table.name, &self.path) {
                let rest = &table.name[self.path.len() + 1..];
                let segment = rest.split('.').next().unwrap_or(rest);
                keys.insert(segment.to_string());
            }
        }
        keys.into_iter().collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An enumeration as a read-only script object of named numbers.
pub struct EnumObject {
    descriptor: &'static EnumDescriptor,
}

impl EnumObject {
    /// Wraps an enumeration descriptor.
    pub fn new(descriptor: &'static EnumDescriptor) -> Self {
        Self { descriptor }
    }
}

impl HostObject for EnumObject {
    fn class_name(&self) -> &str {
        self.descriptor.name
    }

    fn get(&self, name: &str) -> Result<Value, JsError> {
        Ok(self
            .descriptor
            .value(name)
            .map_or(Value::Undefined, |value| value.to_script()))
    }

    fn set(&self, name: &str, _value: Value) -> Result<(), JsError> {
        Err(JsError::type_error(format!(
            "Cannot assign to read-only enumeration member {}.{}",
            self.descriptor.name, name
        )))
    }

    fn own_keys(&self) -> Vec<String> {
        self.descriptor
            .members
            .iter()
            .map(|(name, _)| name.to_string())
            .collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
