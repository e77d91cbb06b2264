//! Promise implementation following the Promise/A+ specification.
//!
//! Promises settle once; every reaction runs as a microtask on the event loop
//! the promise was created on, never inside `then`. Thenables passed to
//! `resolve` are adopted.

use crate::event_loop::EventLoop;
use crate::task_queue::MicroTask;
use core_types::{HostObject, JsError, NativeFunction, Value};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// The state of a Promise.
///
/// Once settled (Fulfilled or Rejected), a Promise cannot change state.
#[derive(Debug, Clone, PartialEq)]
pub enum PromiseState {
    /// The initial state; the promise is neither fulfilled nor rejected.
    Pending,
    /// The promise has been fulfilled with a value.
    Fulfilled(Value),
    /// The promise has been rejected with a reason.
    Rejected(Value),
}

/// A settled outcome: `Ok` for fulfillment, `Err` for rejection.
pub type Settlement = Result<Value, Value>;

type NativeReaction = Box<dyn FnOnce(Settlement) -> Result<(), JsError>>;

/// A reaction to be triggered when a Promise settles.
enum PromiseReaction {
    /// Registered through `then`; settles the derived promise.
    Script {
        on_fulfilled: Option<Value>,
        on_rejected: Option<Value>,
        derived: Promise,
    },
    /// Registered from Rust.
    Native(NativeReaction),
}

struct PromiseInner {
    state: RefCell<PromiseState>,
    reactions: RefCell<Vec<PromiseReaction>>,
    already_resolved: Cell<bool>,
    event_loop: Weak<EventLoop>,
}

/// A script Promise.
///
/// Cloning yields another handle to the same promise.
///
/// # Examples
///
/// ```
/// use async_runtime::{EventLoop, Promise, PromiseState};
/// use core_types::{NativeFunction, Value};
///
/// let event_loop = EventLoop::new();
/// let promise = Promise::new(&event_loop);
/// let doubled = promise.then(
///     Some(NativeFunction::new("double", |_this, args| {
///         Ok(Value::number(args[0].as_number().unwrap_or(0.0) * 2.0))
///     })
///     .into_value()),
///     None,
/// );
///
/// promise.resolve(Value::Smi(21));
/// assert_eq!(doubled.state(), PromiseState::Pending);
///
/// event_loop.run_until_idle().unwrap();
/// assert_eq!(doubled.state(), PromiseState::Fulfilled(Value::Smi(42)));
/// ```
#[derive(Clone)]
pub struct Promise {
    inner: Rc<PromiseInner>,
}

impl Promise {
    /// Creates a new pending Promise whose reactions run on `event_loop`.
    pub fn new(event_loop: &Rc<EventLoop>) -> Self {
        Self::with_loop(Rc::downgrade(event_loop))
    }

    fn with_loop(event_loop: Weak<EventLoop>) -> Self {
        Self {
            inner: Rc::new(PromiseInner {
                state: RefCell::new(PromiseState::Pending),
                reactions: RefCell::new(Vec::new()),
                already_resolved: Cell::new(false),
                event_loop,
            }),
        }
    }

    /// A promise already fulfilled with `value`.
    pub fn resolved(event_loop: &Rc<EventLoop>, value: Value) -> Self {
        let promise = Self::new(event_loop);
        promise.resolve(value);
        promise
    }

    /// A promise already rejected with `reason`.
    pub fn rejected(event_loop: &Rc<EventLoop>, reason: Value) -> Self {
        let promise = Self::new(event_loop);
        promise.reject(reason);
        promise
    }

    /// The current state.
    pub fn state(&self) -> PromiseState {
        self.inner.state.borrow().clone()
    }

    /// True until the promise settles.
    pub fn is_pending(&self) -> bool {
        matches!(*self.inner.state.borrow(), PromiseState::Pending)
    }

    /// Resolves the Promise.
    ///
    /// Thenables are adopted: the promise follows their outcome. Resolving a
    /// promise with itself rejects it with a `TypeError`. Only the first
    /// call to `resolve` or `reject` has an effect.
    pub fn resolve(&self, value: Value) {
        if self.inner.already_resolved.replace(true) {
            return;
        }
        self.resolve_unchecked(value);
    }

    /// Rejects the Promise. Only the first call to `resolve` or `reject` has
    /// an effect.
    pub fn reject(&self, reason: Value) {
        if self.inner.already_resolved.replace(true) {
            return;
        }
        self.settle(Err(reason));
    }

    /// Registers fulfillment and rejection handlers and returns the derived
    /// promise. Non-callable handlers pass the outcome through.
    pub fn then(&self, on_fulfilled: Option<Value>, on_rejected: Option<Value>) -> Promise {
        let derived = Self::with_loop(self.inner.event_loop.clone());
        self.add_reaction(PromiseReaction::Script {
            on_fulfilled: on_fulfilled.filter(|f| f.as_function().is_some()),
            on_rejected: on_rejected.filter(|f| f.as_function().is_some()),
            derived: derived.clone(),
        });
        derived
    }

    /// Same as `then(None, on_rejected)`.
    pub fn catch(&self, on_rejected: Option<Value>) -> Promise {
        self.then(None, on_rejected)
    }

    /// Runs `callback` with no arguments once settled. The derived promise
    /// keeps this promise's outcome unless the callback throws or returns a
    /// rejected thenable.
    pub fn finally(&self, callback: Option<Value>) -> Promise {
        let callback = match callback.filter(|f| f.as_function().is_some()) {
            Some(callback) => callback,
            None => return self.then(None, None),
        };
        let derived = Self::with_loop(self.inner.event_loop.clone());
        let target = derived.clone();
        let event_loop = self.inner.event_loop.clone();
        self.on_settled(move |outcome| {
            let returned = match callback.call(&Value::Undefined, &[]) {
                Ok(returned) => returned,
                Err(error) => {
                    target.reject(error.to_value());
                    return Ok(());
                }
            };
            let wait = Self::with_loop(event_loop);
            wait.resolve(returned);
            wait.on_settled(move |waited| {
                match waited {
                    Err(reason) => target.reject(reason),
                    Ok(_) => target.settle_with(outcome),
                }
                Ok(())
            });
            Ok(())
        });
        derived
    }

    /// Runs `reaction` as a microtask once the promise settles.
    pub fn on_settled<F>(&self, reaction: F)
    where
        F: FnOnce(Settlement) -> Result<(), JsError> + 'static,
    {
        self.add_reaction(PromiseReaction::Native(Box::new(reaction)));
    }

    /// The promise as a script object.
    pub fn to_value(&self) -> Value {
        Value::Object(Rc::new(PromiseObject(self.clone())))
    }

    /// The promise behind a script value created by [`Promise::to_value`].
    pub fn from_value(value: &Value) -> Option<Promise> {
        let obj = value.as_object()?;
        obj.as_any()
            .downcast_ref::<PromiseObject>()
            .map(|p| p.0.clone())
    }

    /// True when both handles refer to the same promise.
    pub fn ptr_eq(&self, other: &Promise) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn settle_with(&self, outcome: Settlement) {
        match outcome {
            Ok(value) => self.resolve(value),
            Err(reason) => self.reject(reason),
        }
    }

    fn resolve_unchecked(&self, value: Value) {
        if let Some(other) = Self::from_value(&value) {
            if other.ptr_eq(self) {
                self.settle(Err(JsError::type_error("Chaining cycle detected for promise")
                    .to_value()));
                return;
            }
        }
        let then = match &value {
            Value::Object(obj) => match obj.get("then") {
                Ok(then) => then,
                Err(error) => {
                    self.settle(Err(error.to_value()));
                    return;
                }
            },
            _ => Value::Undefined,
        };
        if then.as_function().is_none() {
            self.settle(Ok(value));
            return;
        }
        let promise = self.clone();
        self.schedule(MicroTask::new(move || {
            let (resolve, reject) = promise.resolving_functions();
            if let Err(error) = then.call(&value, &[resolve, reject.clone()]) {
                reject.call(&Value::Undefined, &[error.to_value()])?;
            }
            Ok(())
        }));
    }

    /// One-shot resolve and reject functions handed to an adopted thenable.
    fn resolving_functions(&self) -> (Value, Value) {
        let done = Rc::new(Cell::new(false));
        let promise = self.clone();
        let flag = Rc::clone(&done);
        let resolve = NativeFunction::new("resolve", move |_this, args| {
            if !flag.replace(true) {
                promise.resolve_unchecked(args.first().cloned().unwrap_or(Value::Undefined));
            }
            Ok(Value::Undefined)
        });
        let promise = self.clone();
        let reject = NativeFunction::new("reject", move |_this, args| {
            if !done.replace(true) {
                promise.settle(Err(args.first().cloned().unwrap_or(Value::Undefined)));
            }
            Ok(Value::Undefined)
        });
        (resolve.into_value(), reject.into_value())
    }

    fn settle(&self, outcome: Settlement) {
        {
            let mut state = self.inner.state.borrow_mut();
            if !matches!(*state, PromiseState::Pending) {
                return;
            }
            *state = match &outcome {
                Ok(value) => PromiseState::Fulfilled(value.clone()),
                Err(reason) => PromiseState::Rejected(reason.clone()),
            };
        }
        let reactions = std::mem::take(&mut *self.inner.reactions.borrow_mut());
        for reaction in reactions {
            self.schedule_reaction(reaction, outcome.clone());
        }
    }

    fn add_reaction(&self, reaction: PromiseReaction) {
        let outcome = match &*self.inner.state.borrow() {
            PromiseState::Pending => None,
            PromiseState::Fulfilled(value) => Some(Ok(value.clone())),
            PromiseState::Rejected(reason) => Some(Err(reason.clone())),
        };
        match outcome {
            Some(outcome) => self.schedule_reaction(reaction, outcome),
            None => self.inner.reactions.borrow_mut().push(reaction),
        }
    }

    fn schedule_reaction(&self, reaction: PromiseReaction, outcome: Settlement) {
        self.schedule(MicroTask::new(move || run_reaction(reaction, outcome)));
    }

    fn schedule(&self, microtask: MicroTask) {
        match self.inner.event_loop.upgrade() {
            Some(event_loop) => event_loop.enqueue_microtask(microtask),
            None => tracing::trace!("event loop gone, promise reaction dropped"),
        }
    }
}

fn run_reaction(reaction: PromiseReaction, outcome: Settlement) -> Result<(), JsError> {
    match reaction {
        PromiseReaction::Native(reaction) => reaction(outcome),
        PromiseReaction::Script {
            on_fulfilled,
            on_rejected,
            derived,
        } => {
            let (handler, argument) = match outcome {
                Ok(value) => (on_fulfilled, Ok(value)),
                Err(reason) => (on_rejected, Err(reason)),
            };
            match (handler, argument) {
                (Some(handler), Ok(arg)) | (Some(handler), Err(arg)) => {
                    match handler.call(&Value::Undefined, &[arg]) {
                        Ok(value) => derived.resolve(value),
                        Err(error) => derived.reject(error.to_value()),
                    }
                }
                (None, Ok(value)) => derived.resolve(value),
                (None, Err(reason)) => derived.reject(reason),
            }
            Ok(())
        }
    }
}

impl std::fmt::Debug for Promise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Promise")
            .field("state", &*self.inner.state.borrow())
            .field("reactions", &self.inner.reactions.borrow().len())
            .finish()
    }
}

/// Script-visible face of a [`Promise`]: `then`, `catch` and `finally`.
pub struct PromiseObject(Promise);

impl PromiseObject {
    /// The promise behind this object.
    pub fn promise(&self) -> &Promise {
        &self.0
    }
}

fn arg(args: &[Value], index: usize) -> Option<Value> {
    args.get(index).cloned()
}

impl HostObject for PromiseObject {
    fn class_name(&self) -> &str {
        "Promise"
    }

    fn get(&self, name: &str) -> Result<Value, JsError> {
        let promise = self.0.clone();
        let method = match name {
            "then" => NativeFunction::new("then", move |_this, args| {
                Ok(promise.then(arg(args, 0), arg(args, 1)).to_value())
            }),
            "catch" => NativeFunction::new("catch", move |_this, args| {
                Ok(promise.catch(arg(args, 0)).to_value())
            }),
            "finally" => NativeFunction::new("finally", move |_this, args| {
                Ok(promise.finally(arg(args, 0)).to_value())
            }),
            _ => return Ok(Value::Undefined),
        };
        Ok(method.into_value())
    }

    fn set(&self, _name: &str, _value: Value) -> Result<(), JsError> {
        Ok(())
    }

    fn own_keys(&self) -> Vec<String> {
        Vec::new()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
