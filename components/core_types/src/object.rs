//! Host object and callable contracts.
//!
//! These traits are the native-object extension API of the script engine:
//! anything the engine can see as an object implements [`HostObject`], and
//! anything it can call implements [`Callable`].

use crate::{JsError, Value};
use indexmap::IndexMap;
use std::any::Any;
use std::cell::RefCell;
use std::fmt;

/// A script-visible object with get/set/enumerate semantics.
pub trait HostObject {
    /// Class name used in `[object Name]` strings and diagnostics.
    fn class_name(&self) -> &str;

    /// Reads a property. Missing properties read as `undefined`.
    fn get(&self, name: &str) -> Result<Value, JsError>;

    /// Writes a property.
    fn set(&self, name: &str, value: Value) -> Result<(), JsError>;

    /// Enumerates property names in a stable order.
    fn own_keys(&self) -> Vec<String>;

    /// Downcasting hook so bindings can recognize their own objects.
    fn as_any(&self) -> &dyn Any;
}

/// A function callable from script.
pub trait Callable {
    /// Function name, used in error messages.
    fn name(&self) -> &str;

    /// Calls the function with a receiver and arguments.
    fn call(&self, this: &Value, args: &[Value]) -> Result<Value, JsError>;
}

type NativeCallback = Box<dyn Fn(&Value, &[Value]) -> Result<Value, JsError>>;

/// A [`Callable`] backed by a Rust closure.
///
/// # Examples
///
/// ```
/// use core_types::{Callable, NativeFunction, Value};
///
/// let add = NativeFunction::new("add", |_this, args| {
///     let a = args[0].as_number().unwrap_or(0.0);
///     let b = args[1].as_number().unwrap_or(0.0);
///     Ok(Value::number(a + b))
/// });
/// let sum = add.call(&Value::Undefined, &[Value::Smi(1), Value::Smi(2)]).unwrap();
/// assert_eq!(sum, Value::Smi(3));
/// ```
pub struct NativeFunction {
    name: String,
    callback: NativeCallback,
}

impl NativeFunction {
    /// Creates a new function from a closure.
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, JsError> + 'static,
    {
        Self {
            name: name.into(),
            callback: Box::new(f),
        }
    }

    /// Wraps the function into a script value.
    pub fn into_value(self) -> Value {
        Value::Function(std::rc::Rc::new(self))
    }
}

impl Callable for NativeFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, this: &Value, args: &[Value]) -> Result<Value, JsError> {
        (self.callback)(this, args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction {{ name: {:?} }}", self.name)
    }
}

/// An ordinary script object: an ordered property bag.
///
/// Struct-shaped native values (vectors, matrices) and error objects are
/// projected as plain objects.
#[derive(Default)]
pub struct PlainObject {
    class_name: String,
    properties: RefCell<IndexMap<String, Value>>,
}

impl PlainObject {
    /// Creates an empty `Object`.
    pub fn new() -> Self {
        Self::with_class("Object")
    }

    /// Creates an empty object reporting the given class name.
    pub fn with_class(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            properties: RefCell::new(IndexMap::new()),
        }
    }

    /// Inserts or replaces a property.
    pub fn insert(&self, name: impl Into<String>, value: Value) {
        self.properties.borrow_mut().insert(name.into(), value);
    }

    /// Builder-style [`PlainObject::insert`].
    pub fn with(self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    /// Returns true when the property exists.
    pub fn contains(&self, name: &str) -> bool {
        self.properties.borrow().contains_key(name)
    }

    /// Wraps the object into a script value.
    pub fn into_value(self) -> Value {
        Value::object(self)
    }
}

impl HostObject for PlainObject {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn get(&self, name: &str) -> Result<Value, JsError> {
        Ok(self
            .properties
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or(Value::Undefined))
    }

    fn set(&self, name: &str, value: Value) -> Result<(), JsError> {
        self.insert(name, value);
        Ok(())
    }

    fn own_keys(&self) -> Vec<String> {
        self.properties.borrow().keys().cloned().collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
