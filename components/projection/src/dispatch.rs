//! Member dispatch and overload resolution.
//!
//! A member read walks the resolved interfaces in order:
//!
//! 1. the first interface declaring a readable property of that name wins;
//! 2. otherwise every same-named method across all interfaces is collected,
//!    one overload kept per arity, and wrapped in a callable;
//! 3. otherwise `addEventListener`/`removeEventListener` are synthesized
//!    when any interface declares events;
//! 4. otherwise the runtime member handlers are asked, in order.
//!
//! Callables are memoized on the wrapper that produced them.

use crate::instance::{InstanceCore, ProjectedInstance, ADD_EVENT_LISTENER, REMOVE_EVENT_LISTENER};
use core_types::{Callable, FunctionRef, JsError, Value};
use interface_registry::{CallContext, EventDescriptor, MethodDescriptor};
use std::rc::Rc;

pub(crate) fn get_member(instance: &ProjectedInstance, name: &str) -> Result<Value, JsError> {
    let core = instance.core();
    let getter = core
        .interfaces()
        .iter()
        .find_map(|d| d.property(name).and_then(|p| p.getter));
    if let Some(getter) = getter {
        let context = core.context()?;
        return getter(&CallContext::new(&*context, &core.native));
    }

    if let Some(callable) = instance.memoized(name) {
        return Ok(callable);
    }
    if let Some(callable) = resolve_callable(core, name) {
        instance.memoize(name, callable.clone());
        return Ok(callable);
    }

    let context = core.context()?;
    let call = CallContext::new(&*context, &core.native);
    for members in core.interfaces().iter().filter_map(|d| d.runtime_members()) {
        if let Some(value) = (members.get)(&call, name)? {
            return Ok(value);
        }
    }
    Ok(Value::Undefined)
}

/// Writes a property. Missing and readonly properties are ignored.
pub(crate) fn set_member(core: &InstanceCore, name: &str, value: &Value) -> Result<(), JsError> {
    let mut declared = false;
    for descriptor in core.interfaces() {
        if let Some(property) = descriptor.property(name) {
            declared = true;
            if let Some(setter) = property.setter {
                let context = core.context()?;
                return setter(&CallContext::new(&*context, &core.native), value);
            }
        }
    }
    if declared {
        tracing::trace!(property = name, "assignment to readonly property ignored");
        return Ok(());
    }

    let context = core.context()?;
    let call = CallContext::new(&*context, &core.native);
    for members in core.interfaces().iter().filter_map(|d| d.runtime_members()) {
        if (members.set)(&call, name, value)? {
            return Ok(());
        }
    }
    Ok(())
}

fn resolve_callable(core: &Rc<InstanceCore>, name: &str) -> Option<Value> {
    let candidates: Vec<&'static MethodDescriptor> = core
        .interfaces()
        .iter()
        .flat_map(|&d| d.methods_named(name))
        .collect();
    if !candidates.is_empty() {
        let overloads = select_overloads(candidates);
        let name = overloads[0].name;
        return Some(Value::Function(Rc::new(MethodCallable {
            name,
            overloads,
            core: Rc::clone(core),
        })));
    }

    let action = match name {
        ADD_EVENT_LISTENER => ListenerAction::Add,
        REMOVE_EVENT_LISTENER => ListenerAction::Remove,
        _ => return None,
    };
    if !core.has_events() {
        return None;
    }
    Some(Value::Function(Rc::new(EventListenerCallable {
        action,
        core: Rc::clone(core),
    })))
}

/// Keeps one overload per arity, in candidate order.
///
/// Among same-arity overloads the default-flagged one survives, taking the
/// place of the first; without a default the first declared wins and the
/// rest are dropped.
pub(crate) fn select_overloads(
    candidates: Vec<&'static MethodDescriptor>,
) -> Vec<&'static MethodDescriptor> {
    let mut selected: Vec<&'static MethodDescriptor> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match selected.iter_mut().find(|kept| kept.arity == candidate.arity) {
            Some(kept) => {
                if candidate.is_default_overload && !kept.is_default_overload {
                    *kept = candidate;
                } else {
                    tracing::debug!(
                        method = candidate.name,
                        arity = candidate.arity,
                        "dropping colliding overload"
                    );
                }
            }
            None => selected.push(candidate),
        }
    }
    selected
}

/// A projected method: one or more overloads selected by argument count.
struct MethodCallable {
    name: &'static str,
    overloads: Vec<&'static MethodDescriptor>,
    core: Rc<InstanceCore>,
}

impl Callable for MethodCallable {
    fn name(&self) -> &str {
        self.name
    }

    fn call(&self, _this: &Value, args: &[Value]) -> Result<Value, JsError> {
        let overload = match self.overloads.iter().find(|m| m.arity == args.len()) {
            Some(overload) => overload,
            None if self.overloads.len() == 1 => {
                return Err(JsError::type_error(format!(
                    "Function '{}' expects {} argument(s) but was called with {}",
                    self.name,
                    self.overloads[0].arity,
                    args.len()
                )));
            }
            None => {
                return Err(JsError::type_error(format!(
                    "No overload of '{}' takes {} argument(s)",
                    self.name,
                    args.len()
                )));
            }
        };
        let context = self.core.context()?;
        (overload.thunk)(&CallContext::new(&*context, &self.core.native), args)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListenerAction {
    Add,
    Remove,
}

/// `addEventListener(name, listener)` / `removeEventListener(name, listener)`.
struct EventListenerCallable {
    action: ListenerAction,
    core: Rc<InstanceCore>,
}

impl EventListenerCallable {
    fn event(&self, name: &str) -> Result<&'static EventDescriptor, JsError> {
        self.core
            .interfaces()
            .iter()
            .find_map(|&d| d.event(name))
            .ok_or_else(|| JsError::type_error(format!("'{}' is not an event of this object", name)))
    }
}

impl Callable for EventListenerCallable {
    fn name(&self) -> &str {
        match self.action {
            ListenerAction::Add => ADD_EVENT_LISTENER,
            ListenerAction::Remove => REMOVE_EVENT_LISTENER,
        }
    }

    fn call(&self, _this: &Value, args: &[Value]) -> Result<Value, JsError> {
        if args.len() != 2 {
            return Err(JsError::type_error(format!(
                "Function '{}' expects 2 argument(s) but was called with {}",
                self.name(),
                args.len()
            )));
        }
        let name = args[0]
            .as_str()
            .ok_or_else(|| JsError::type_error("Event name must be a string"))?;
        let listener: FunctionRef = args[1]
            .as_function()
            .cloned()
            .ok_or_else(|| JsError::type_error("Event listener must be a function"))?;
        let event = self.event(name)?;
        let context = self.core.context()?;
        match self.action {
            ListenerAction::Add => context.add_event_listener(&self.core, event, listener)?,
            ListenerAction::Remove => context.remove_event_listener(&self.core, event, &listener)?,
        }
        Ok(Value::Undefined)
    }
}
