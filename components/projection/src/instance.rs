//! Projected native instances.
//!
//! A projected instance is split in two. The [`InstanceCore`] owns the
//! strong native reference and the interface list, resolved on first member
//! access; the [`ProjectedInstance`] shell is the script-visible object and
//! memoizes the callables it hands out. Callables hold the core, never the shell, so a
//! memoized method does not keep its own wrapper alive.

use crate::dispatch;
use crate::session::ProjectionContext;
use core_types::{HostObject, JsError, Value};
use indexmap::IndexSet;
use interface_registry::{InterfaceDescriptor, InterfaceRegistry};
use native_model::{Identity, NativeRef};
use once_cell::unsync::OnceCell;
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Names of the synthesized event members.
pub(crate) const ADD_EVENT_LISTENER: &str = "addEventListener";
pub(crate) const REMOVE_EVENT_LISTENER: &str = "removeEventListener";

pub(crate) struct InstanceCore {
    pub(crate) native: NativeRef,
    pub(crate) identity: Identity,
    registry: &'static InterfaceRegistry,
    interfaces: OnceCell<Vec<&'static InterfaceDescriptor>>,
    class_name: String,
    context: Weak<ProjectionContext>,
}

impl InstanceCore {
    /// A core over `native`, a canonical identity object. Its interfaces are
    /// resolved on first member access.
    pub(crate) fn new(
        native: NativeRef,
        identity: Identity,
        registry: &'static InterfaceRegistry,
        context: Weak<ProjectionContext>,
    ) -> Self {
        let class_name = native
            .runtime_class_name()
            .unwrap_or_else(|| "Object".to_string());
        Self {
            native,
            identity,
            registry,
            interfaces: OnceCell::new(),
            class_name,
            context,
        }
    }

    /// The resolved interfaces, in the order the object reports them.
    /// Unknown interfaces are skipped.
    pub(crate) fn interfaces(&self) -> &[&'static InterfaceDescriptor] {
        self.interfaces.get_or_init(|| {
            let mut interfaces: Vec<&'static InterfaceDescriptor> = Vec::new();
            for iid in self.native.interface_ids() {
                match self.registry.resolve(&iid) {
                    Some(descriptor) => {
                        if !interfaces.iter().any(|d| d.iid == descriptor.iid) {
                            interfaces.push(descriptor);
                        }
                    }
                    None => tracing::trace!(%iid, "interface not supported"),
                }
            }
            tracing::trace!(identity = %self.identity, count = interfaces.len(), "resolved interfaces");
            interfaces
        })
    }

    pub(crate) fn context(&self) -> Result<Rc<ProjectionContext>, JsError> {
        self.context
            .upgrade()
            .ok_or_else(|| JsError::internal("projection session has ended"))
    }

    pub(crate) fn has_events(&self) -> bool {
        self.interfaces().iter().any(|d| d.has_events())
    }
}

/// The script-visible wrapper of a native object.
pub struct ProjectedInstance {
    core: Rc<InstanceCore>,
    callables: RefCell<HashMap<String, Value>>,
}

impl ProjectedInstance {
    pub(crate) fn new(core: Rc<InstanceCore>) -> Self {
        Self {
            core,
            callables: RefCell::new(HashMap::new()),
        }
    }

    pub(crate) fn core(&self) -> &Rc<InstanceCore> {
        &self.core
    }

    /// The wrapper behind a script value, if it is a projected instance.
    pub fn from_value(value: &Value) -> Option<&ProjectedInstance> {
        value
            .as_object()?
            .as_any()
            .downcast_ref::<ProjectedInstance>()
    }

    /// The canonical native object.
    pub fn native(&self) -> &NativeRef {
        &self.core.native
    }

    /// Identity of the native object.
    pub fn identity(&self) -> Identity {
        self.core.identity
    }

    /// Names of the resolved interfaces, in resolution order.
    pub fn interface_names(&self) -> Vec<&'static str> {
        self.core.interfaces().iter().map(|d| d.name).collect()
    }

    /// True when both wrappers share one core.
    pub fn same_core(&self, other: &ProjectedInstance) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }

    pub(crate) fn memoized(&self, name: &str) -> Option<Value> {
        self.callables.borrow().get(name).cloned()
    }

    pub(crate) fn memoize(&self, name: &str, callable: Value) {
        self.callables.borrow_mut().insert(name.to_string(), callable);
    }
}

impl HostObject for ProjectedInstance {
    fn class_name(&self) -> &str {
        &self.core.class_name
    }

    fn get(&self, name: &str) -> Result<Value, JsError> {
        dispatch::get_member(self, name)
    }

    fn set(&self, name: &str, value: Value) -> Result<(), JsError> {
        dispatch::set_member(&self.core, name, &value)
    }

    fn own_keys(&self) -> Vec<String> {
        let mut keys: IndexSet<&str> = IndexSet::new();
        for descriptor in self.core.interfaces() {
            keys.extend(descriptor.properties().iter().map(|p| p.name));
            keys.extend(descriptor.methods().iter().map(|m| m.name));
        }
        if self.core.has_events() {
            keys.insert(ADD_EVENT_LISTENER);
            keys.insert(REMOVE_EVENT_LISTENER);
        }
        keys.into_iter().map(str::to_string).collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl std::fmt::Debug for ProjectedInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectedInstance")
            .field("class", &self.core.class_name)
            .field("identity", &self.core.identity)
            .field("interfaces", &self.interface_names())
            .finish()
    }
}
