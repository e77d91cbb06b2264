//! Host engine services used by the identity cache.

use core_types::{HostObject, JsError, ObjectRef};
use std::rc::{Rc, Weak};

/// Engine services the projection needs beyond the object contracts.
pub trait ScriptHost {
    /// Creates a weak reference to a script object.
    ///
    /// Engines without weak reference support fail here; the projection then
    /// stops asking for the rest of the session.
    fn create_weak_ref(&self, obj: &ObjectRef) -> Result<Weak<dyn HostObject>, JsError>;
}

/// The in-process host: script objects are `Rc`s, so weak references are
/// `Rc` weak pointers.
#[derive(Debug, Clone, Copy)]
pub struct RcHost {
    weak_refs_supported: bool,
}

impl RcHost {
    /// A host with weak reference support.
    pub fn new() -> Self {
        Self {
            weak_refs_supported: true,
        }
    }

    /// A host whose engine has no weak references.
    pub fn without_weak_refs() -> Self {
        Self {
            weak_refs_supported: false,
        }
    }
}

impl Default for RcHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptHost for RcHost {
    fn create_weak_ref(&self, obj: &ObjectRef) -> Result<Weak<dyn HostObject>, JsError> {
        if !self.weak_refs_supported {
            return Err(JsError::type_error("WeakRef is not supported by this engine"));
        }
        Ok(Rc::downgrade(obj))
    }
}
