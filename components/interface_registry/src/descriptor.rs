//! Member descriptors.
//!
//! Descriptors are plain records of names, arities, flags and function
//! pointers. Generated tables declare them as `static` arrays; the thunks
//! adapt a native call by converting arguments and results through the
//! [`converters`] layer.

use converters::{native_error, ObjectProjector};
use core_types::{JsError, Value};
use native_model::{cast, EventHandler, EventToken, NativeError, NativeRef};
use std::any::Any;
use std::fmt;

/// What a thunk sees of the call: the native target and the projector used to
/// convert object-typed values.
pub struct CallContext<'a> {
    /// Projector for object-typed arguments and results
    pub projector: &'a dyn ObjectProjector,
    /// The native object the member is invoked on
    pub target: &'a NativeRef,
}

impl<'a> CallContext<'a> {
    /// Creates a call context.
    pub fn new(projector: &'a dyn ObjectProjector, target: &'a NativeRef) -> Self {
        Self { projector, target }
    }

    /// Typed access to the target's implementation.
    pub fn target<T: Any>(&self) -> Result<&'a T, JsError> {
        cast::<T>(self.target).map_err(|e| native_error(&e))
    }
}

/// Reads a property.
pub type Getter = fn(&CallContext<'_>) -> Result<Value, JsError>;

/// Writes a property.
pub type Setter = fn(&CallContext<'_>, &Value) -> Result<(), JsError>;

/// Invokes a method with exactly `arity` arguments.
pub type MethodThunk = fn(&CallContext<'_>, &[Value]) -> Result<Value, JsError>;

/// Subscribes a native handler to an event and returns its token.
pub type AddHandler = fn(&NativeRef, EventHandler) -> Result<EventToken, NativeError>;

/// Unsubscribes the handler registered under a token.
pub type RemoveHandler = fn(&NativeRef, EventToken) -> Result<(), NativeError>;

/// A property of an interface.
#[derive(Clone, Copy)]
pub struct PropertyDescriptor {
    /// Script-visible name
    pub name: &'static str,
    /// Getter thunk
    pub getter: Option<Getter>,
    /// Setter thunk; `None` for readonly properties
    pub setter: Option<Setter>,
}

impl PropertyDescriptor {
    /// A readonly property.
    pub const fn readonly(name: &'static str, getter: Getter) -> Self {
        Self {
            name,
            getter: Some(getter),
            setter: None,
        }
    }

    /// A read/write property.
    pub const fn read_write(name: &'static str, getter: Getter, setter: Setter) -> Self {
        Self {
            name,
            getter: Some(getter),
            setter: Some(setter),
        }
    }

    /// True when the property has no setter.
    pub fn is_readonly(&self) -> bool {
        self.setter.is_none()
    }
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("readonly", &self.is_readonly())
            .finish()
    }
}

/// One overload of a method.
#[derive(Clone, Copy)]
pub struct MethodDescriptor {
    /// Script-visible name, shared by all overloads
    pub name: &'static str,
    /// Number of script arguments
    pub arity: usize,
    /// Call thunk
    pub thunk: MethodThunk,
    /// Preferred among overloads of the same arity
    pub is_default_overload: bool,
}

impl MethodDescriptor {
    /// A method overload.
    pub const fn new(name: &'static str, arity: usize, thunk: MethodThunk) -> Self {
        Self {
            name,
            arity,
            thunk,
            is_default_overload: false,
        }
    }

    /// Flags this overload as the default one.
    pub const fn default_overload(mut self) -> Self {
        self.is_default_overload = true;
        self
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("is_default_overload", &self.is_default_overload)
            .finish()
    }
}

/// An event of an interface.
#[derive(Clone, Copy)]
pub struct EventDescriptor {
    /// Event name as passed to `addEventListener`
    pub name: &'static str,
    /// Native add-handler thunk
    pub add: AddHandler,
    /// Native remove-handler thunk
    pub remove: RemoveHandler,
    /// The native raiser waits until script listeners have run
    pub blocking: bool,
}

impl EventDescriptor {
    /// An event whose raiser does not wait for script listeners.
    pub const fn new(name: &'static str, add: AddHandler, remove: RemoveHandler) -> Self {
        Self {
            name,
            add,
            remove,
            blocking: false,
        }
    }

    /// Makes the native raiser block until script listeners ran.
    pub const fn blocking(mut self) -> Self {
        self.blocking = true;
        self
    }
}

impl fmt::Debug for EventDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDescriptor")
            .field("name", &self.name)
            .field("blocking", &self.blocking)
            .finish()
    }
}

/// Dynamic members (indexer-style access) resolved at run time.
#[derive(Clone, Copy)]
pub struct RuntimeMembers {
    /// Returns `None` when the name is not a runtime member.
    pub get: fn(&CallContext<'_>, &str) -> Result<Option<Value>, JsError>,
    /// Returns `false` when the name is not a runtime member.
    pub set: fn(&CallContext<'_>, &str, &Value) -> Result<bool, JsError>,
}

impl fmt::Debug for RuntimeMembers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RuntimeMembers")
    }
}
