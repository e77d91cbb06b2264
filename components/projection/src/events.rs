//! Event registration table.
//!
//! Registrations are keyed by native identity, not by wrapper, so a listener
//! added through one wrapper can be removed through another wrapper of the
//! same object. Each entry carries a weak reference to the native object;
//! entries whose object died are swept once the table is large enough and
//! the sweep interval has elapsed.
//!
//! Listeners live on the script thread. The native side only sees a handler
//! closure holding an [`Invoker`] and the [`ParkToken`] of the listener.

use crate::error::contract_violation;
use crate::session::ProjectionContext;
use async_runtime::{EventLoop, InvokeError, Invoker, ParkToken};
use converters::{any_to_script, native_error};
use core_types::{FunctionRef, JsError, Value};
use interface_registry::EventDescriptor;
use native_model::{AnyValue, EventHandler, EventToken, Identity, NativeRef, Unknown};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A listener parked in the event loop for native delivery.
struct ParkedListener {
    listener: FunctionRef,
    context: Weak<ProjectionContext>,
}

impl ParkedListener {
    fn deliver(&self, args: Vec<AnyValue>) -> Result<(), JsError> {
        let context = match self.context.upgrade() {
            Some(context) => context,
            None => return Ok(()),
        };
        let args = args
            .into_iter()
            .map(|arg| any_to_script(&*context, arg))
            .collect::<Result<Vec<Value>, JsError>>()?;
        self.listener.call(&Value::Undefined, &args)?;
        Ok(())
    }
}

struct ListenerRecord {
    listener: FunctionRef,
    token: EventToken,
    park: ParkToken,
}

/// The listeners of one event on one native object.
pub(crate) struct EventRegistration {
    event: &'static EventDescriptor,
    listeners: Vec<ListenerRecord>,
}

impl EventRegistration {
    fn new(event: &'static EventDescriptor) -> Self {
        Self {
            event,
            listeners: Vec::new(),
        }
    }

    fn position(&self, listener: &FunctionRef) -> Option<usize> {
        self.listeners
            .iter()
            .position(|r| std::ptr::addr_eq(Rc::as_ptr(&r.listener), Rc::as_ptr(listener)))
    }

    /// Registers `listener` with the native event. Adding a listener that is
    /// already registered does nothing.
    pub(crate) fn add(
        &mut self,
        native: &NativeRef,
        listener: FunctionRef,
        context: &Rc<ProjectionContext>,
    ) -> Result<(), JsError> {
        if self.position(&listener).is_some() {
            return Ok(());
        }
        let event_loop = context.event_loop();
        let park = event_loop.park(Rc::new(ParkedListener {
            listener: Rc::clone(&listener),
            context: Rc::downgrade(context),
        }));
        let handler = native_handler(event_loop.invoker(), park, self.event.blocking);
        match (self.event.add)(native, handler) {
            Ok(token) => {
                tracing::debug!(event = self.event.name, %token, "listener registered");
                self.listeners.push(ListenerRecord {
                    listener,
                    token,
                    park,
                });
                Ok(())
            }
            Err(error) => {
                event_loop.unpark::<ParkedListener>(park);
                Err(native_error(&error))
            }
        }
    }

    /// Unregisters `listener`. Unknown listeners are ignored.
    pub(crate) fn remove(
        &mut self,
        native: &NativeRef,
        listener: &FunctionRef,
        event_loop: &EventLoop,
    ) -> Result<(), JsError> {
        let index = match self.position(listener) {
            Some(index) => index,
            None => return Ok(()),
        };
        let record = self.listeners.remove(index);
        event_loop.unpark::<ParkedListener>(record.park);
        tracing::debug!(event = self.event.name, token = %record.token, "listener unregistered");
        (self.event.remove)(native, record.token).map_err(|e| native_error(&e))
    }

    /// Drops every listener, unregistering from `native` when it is alive.
    fn clear(&mut self, native: Option<&NativeRef>, event_loop: &EventLoop) {
        for record in self.listeners.drain(..) {
            event_loop.unpark::<ParkedListener>(record.park);
            if let Some(native) = native {
                if let Err(error) = (self.event.remove)(native, record.token) {
                    tracing::warn!(event = self.event.name, %error, "failed to unregister listener");
                }
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl Drop for EventRegistration {
    fn drop(&mut self) {
        if !self.listeners.is_empty() && !std::thread::panicking() {
            contract_violation("event registration destroyed with live listeners");
        }
    }
}

fn native_handler(invoker: Invoker, park: ParkToken, blocking: bool) -> EventHandler {
    Arc::new(move |args: &[AnyValue]| {
        let args = args.to_vec();
        let deliver = move |event_loop: &EventLoop| match event_loop.parked::<ParkedListener>(park) {
            Some(parked) => parked.deliver(args),
            None => Ok(()),
        };
        let result = if blocking {
            invoker.invoke_and_block(deliver)
        } else {
            invoker.invoke_possibly_async(deliver)
        };
        match result {
            Ok(()) => {}
            Err(InvokeError::Disconnected) => {
                tracing::debug!("event dropped, script thread gone");
            }
            Err(InvokeError::ScriptError(message)) => {
                tracing::warn!(%message, "blocking event listener failed");
            }
        }
    })
}

struct RegistrationEntry {
    liveness: std::sync::Weak<dyn Unknown>,
    registrations: Vec<EventRegistration>,
}

impl RegistrationEntry {
    fn is_alive(&self) -> bool {
        self.liveness.strong_count() > 0
    }

    fn clear(&mut self, event_loop: &EventLoop) {
        let native = self.liveness.upgrade();
        for registration in &mut self.registrations {
            registration.clear(native.as_ref(), event_loop);
        }
    }
}

/// All event registrations of one session.
pub(crate) struct EventRegistrar {
    entries: HashMap<Identity, RegistrationEntry>,
    sweep_threshold: usize,
    sweep_interval: Duration,
    last_sweep: Instant,
}

impl EventRegistrar {
    pub(crate) fn new(sweep_threshold: usize, sweep_interval: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            sweep_threshold,
            sweep_interval,
            last_sweep: Instant::now(),
        }
    }

    /// The registration for `event` on the object `identity`, created on
    /// first use. `native` must be the canonical object of `identity`.
    pub(crate) fn registration(
        &mut self,
        identity: Identity,
        native: &NativeRef,
        event: &'static EventDescriptor,
        event_loop: &EventLoop,
    ) -> &mut EventRegistration {
        self.maybe_sweep(event_loop);
        let stale = self.entries.get(&identity).is_some_and(|e| !e.is_alive());
        if stale {
            // The address was reused by a new object.
            if let Some(mut entry) = self.entries.remove(&identity) {
                entry.clear(event_loop);
            }
        }
        let entry = self.entries.entry(identity).or_insert_with(|| RegistrationEntry {
            liveness: Arc::downgrade(native),
            registrations: Vec::new(),
        });
        let index = match entry
            .registrations
            .iter()
            .position(|r| r.event.name == event.name)
        {
            Some(index) => index,
            None => {
                entry.registrations.push(EventRegistration::new(event));
                entry.registrations.len() - 1
            }
        };
        &mut entry.registrations[index]
    }

    /// The existing registration for `event` on `identity`, if any. An entry
    /// whose object died is dropped rather than returned.
    pub(crate) fn existing(
        &mut self,
        identity: Identity,
        event: &EventDescriptor,
        event_loop: &EventLoop,
    ) -> Option<&mut EventRegistration> {
        if self.entries.get(&identity).is_some_and(|e| !e.is_alive()) {
            if let Some(mut entry) = self.entries.remove(&identity) {
                entry.clear(event_loop);
            }
            return None;
        }
        self.entries
            .get_mut(&identity)?
            .registrations
            .iter_mut()
            .find(|r| r.event.name == event.name)
    }

    /// Number of registered listeners across all objects.
    pub(crate) fn listener_count(&self) -> usize {
        self.entries
            .values()
            .flat_map(|e| e.registrations.iter())
            .map(EventRegistration::len)
            .sum()
    }

    /// Number of objects with an entry.
    pub(crate) fn entry_count(&self) -> usize {
        self.entries.len()
    }

    fn maybe_sweep(&mut self, event_loop: &EventLoop) {
        if self.entries.len() >= self.sweep_threshold && self.last_sweep.elapsed() >= self.sweep_interval {
            self.sweep(event_loop);
        }
    }

    /// Removes the entries of dead native objects. Returns how many were
    /// removed.
    pub(crate) fn sweep(&mut self, event_loop: &EventLoop) -> usize {
        self.last_sweep = Instant::now();
        let dead: Vec<Identity> = self
            .entries
            .iter()
            .filter(|(_, e)| !e.is_alive())
            .map(|(identity, _)| *identity)
            .collect();
        for identity in &dead {
            if let Some(mut entry) = self.entries.remove(identity) {
                entry.clear(event_loop);
            }
        }
        if !dead.is_empty() {
            tracing::debug!(removed = dead.len(), remaining = self.entries.len(), "swept event registrations");
        }
        dead.len()
    }

    /// Unregisters every listener. Used at session teardown.
    pub(crate) fn unregister_all(&mut self, event_loop: &EventLoop) {
        let listeners = self.listener_count();
        for (_, mut entry) in self.entries.drain() {
            entry.clear(event_loop);
        }
        if listeners > 0 {
            tracing::debug!(listeners, "unregistered remaining listeners");
        }
    }
}
