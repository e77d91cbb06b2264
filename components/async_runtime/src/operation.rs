//! Native async operations as script promise-likes.
//!
//! An [`AsyncOperation`] wraps a native [`AsyncInfo`]. The native completion
//! handler may fire on any thread; it is marshaled onto the script thread
//! through the loop's [`Invoker`](crate::Invoker) before any wrapper state is
//! touched. Continuations registered with `then`, `done`, `catch` and
//! `finally` are buffered while the operation is pending and each is
//! dispatched exactly once, always from a microtask.

use crate::event_loop::{EventLoop, ParkToken};
use crate::promise::Promise;
use crate::task_queue::MicroTask;
use converters::native_error;
use core_types::{HostObject, JsError, NativeFunction, Value};
use native_model::{AnyValue, AsyncInfo, AsyncStatus, HResult, NativeError};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::Arc;

/// Converts a native value produced by an operation to a script value.
pub type ValueConverter = Box<dyn Fn(AnyValue) -> Result<Value, JsError>>;

/// How an operation's results and progress values reach script.
pub struct OperationConverters {
    /// Converts the completed result.
    pub result: ValueConverter,
    /// Converts progress values.
    pub progress: ValueConverter,
}

enum OperationStatus {
    Pending,
    Completed(Value),
    Failed(JsError),
}

enum Continuation {
    Then {
        on_resolved: Option<Value>,
        on_rejected: Option<Value>,
        promise: Promise,
    },
    Done {
        on_resolved: Option<Value>,
        on_rejected: Option<Value>,
    },
    Finally {
        callback: Value,
        promise: Promise,
    },
}

/// Script-thread state of one projected operation.
pub struct OperationState {
    event_loop: Weak<EventLoop>,
    operation: Arc<dyn AsyncInfo>,
    operation_object: Value,
    converters: OperationConverters,
    status: RefCell<OperationStatus>,
    continuations: RefCell<Vec<Continuation>>,
    progress_listeners: RefCell<Vec<Value>>,
    dispatched: Cell<usize>,
}

/// The script-visible wrapper of a native async operation.
///
/// # Examples
///
/// ```
/// use async_runtime::{AsyncOperation, EventLoop, OperationConverters};
/// use converters::ToScript;
/// use core_types::{NativeFunction, Value};
/// use native_model::{AnyValue, CompletionSource};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let event_loop = EventLoop::new();
/// let source = CompletionSource::new("Demo.Operation");
/// let converters = OperationConverters {
///     result: Box::new(|v| match v {
///         AnyValue::Int32(n) => Ok(n.to_script()),
///         _ => Ok(Value::Undefined),
///     }),
///     progress: Box::new(|_| Ok(Value::Undefined)),
/// };
/// let operation =
///     AsyncOperation::start(&event_loop, source.to_async_info(), Value::Null, converters)
///         .unwrap();
///
/// let seen = Rc::new(RefCell::new(None));
/// let sink = Rc::clone(&seen);
/// let on_resolved = NativeFunction::new("onResolved", move |_this, args| {
///     *sink.borrow_mut() = args.first().cloned();
///     Ok(Value::Undefined)
/// });
/// operation.invoke("then", &[on_resolved.into_value()]).unwrap();
///
/// source.complete(AnyValue::Int32(7));
/// event_loop.run_until_idle().unwrap();
/// assert_eq!(*seen.borrow(), Some(Value::Smi(7)));
/// ```
pub struct AsyncOperation {
    state: Rc<OperationState>,
}

const MEMBERS: [&str; 6] = ["then", "done", "catch", "finally", "cancel", "operation"];

impl AsyncOperation {
    /// Wraps `operation` and hooks its completion and progress handlers.
    ///
    /// `operation_object` is what the wrapper's `operation` property returns.
    /// When the operation has already finished, completion is processed
    /// before this returns; continuations still run from microtasks.
    pub fn start(
        event_loop: &Rc<EventLoop>,
        operation: Arc<dyn AsyncInfo>,
        operation_object: Value,
        converters: OperationConverters,
    ) -> Result<Value, JsError> {
        let state = Rc::new(OperationState {
            event_loop: Rc::downgrade(event_loop),
            operation: Arc::clone(&operation),
            operation_object,
            converters,
            status: RefCell::new(OperationStatus::Pending),
            continuations: RefCell::new(Vec::new()),
            progress_listeners: RefCell::new(Vec::new()),
            dispatched: Cell::new(0),
        });
        // Parked until completion: the native side refers to the state by token.
        let token = event_loop.park(Rc::clone(&state) as Rc<dyn Any>);

        let invoker = event_loop.invoker();
        operation.set_progress(Arc::new(move |value: AnyValue| {
            let delivered = invoker.invoke_possibly_async(move |event_loop| {
                if let Some(state) = event_loop.parked::<OperationState>(token) {
                    state.report_progress(value);
                }
                Ok(())
            });
            if delivered.is_err() {
                tracing::trace!("progress dropped, script thread gone");
            }
        }));

        let invoker = event_loop.invoker();
        let hooked = operation.set_completed(Box::new(move |status| {
            let delivered = invoker.invoke_possibly_async(move |event_loop| {
                on_native_completed(event_loop, token, status);
                Ok(())
            });
            if delivered.is_err() {
                tracing::debug!(?status, "completion dropped, script thread gone");
            }
        }));
        if let Err(error) = hooked {
            event_loop.unpark::<OperationState>(token);
            return Err(native_error(&error));
        }

        tracing::debug!(id = operation.id(), "projected async operation");
        Ok(Value::Object(Rc::new(AsyncOperation { state })))
    }

    /// The wrapper behind a script value created by [`AsyncOperation::start`].
    pub fn from_value(value: &Value) -> Option<&AsyncOperation> {
        value.as_object()?.as_any().downcast_ref::<AsyncOperation>()
    }

    /// True until the native operation has completed.
    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    /// Number of continuations dispatched so far.
    pub fn dispatched(&self) -> usize {
        self.state.dispatched.get()
    }
}

fn on_native_completed(event_loop: &EventLoop, token: ParkToken, status: AsyncStatus) {
    let state = match event_loop.unpark::<OperationState>(token) {
        Some(state) => state,
        None => return,
    };
    let outcome = match status {
        AsyncStatus::Completed => match state.operation.results() {
            Ok(value) => match (state.converters.result)(value) {
                Ok(value) => OperationStatus::Completed(value),
                Err(error) => OperationStatus::Failed(error),
            },
            Err(error) => OperationStatus::Failed(native_error(&error)),
        },
        AsyncStatus::Error | AsyncStatus::Canceled => {
            let error = state.operation.error().unwrap_or_else(|| {
                if status == AsyncStatus::Canceled {
                    NativeError::canceled()
                } else {
                    NativeError::new(HResult::E_FAIL, "")
                }
            });
            OperationStatus::Failed(native_error(&error))
        }
        AsyncStatus::Started => {
            tracing::warn!(id = state.operation.id(), "completion reported while still running");
            return;
        }
    };
    state.operation.close();
    tracing::debug!(id = state.operation.id(), ?status, "async operation completed");
    state.complete(outcome);
}

impl OperationState {
    fn is_pending(&self) -> bool {
        matches!(*self.status.borrow(), OperationStatus::Pending)
    }

    fn complete(self: &Rc<Self>, outcome: OperationStatus) {
        if !self.is_pending() {
            return;
        }
        *self.status.borrow_mut() = outcome;
        self.progress_listeners.borrow_mut().clear();
        let continuations = std::mem::take(&mut *self.continuations.borrow_mut());
        for continuation in continuations {
            self.dispatch(continuation);
        }
    }

    fn report_progress(&self, value: AnyValue) {
        if !self.is_pending() {
            return;
        }
        let listeners = self.progress_listeners.borrow().clone();
        if listeners.is_empty() {
            return;
        }
        let result = (self.converters.progress)(value).and_then(|value| {
            for listener in &listeners {
                listener.call(&Value::Undefined, &[value.clone()])?;
            }
            Ok(())
        });
        if let Err(error) = result {
            if let Some(event_loop) = self.event_loop.upgrade() {
                event_loop.report_error(error);
            }
        }
    }

    fn add(self: &Rc<Self>, continuation: Continuation, on_progress: Option<Value>) {
        if self.is_pending() {
            if let Some(listener) = on_progress.filter(|f| f.as_function().is_some()) {
                self.progress_listeners.borrow_mut().push(listener);
            }
            self.continuations.borrow_mut().push(continuation);
        } else {
            self.dispatch(continuation);
        }
    }

    fn dispatch(self: &Rc<Self>, continuation: Continuation) {
        let event_loop = match self.event_loop.upgrade() {
            Some(event_loop) => event_loop,
            None => return,
        };
        let state = Rc::clone(self);
        event_loop.enqueue_microtask(MicroTask::new(move || state.run(continuation)));
    }

    fn outcome(&self) -> Result<Value, JsError> {
        match &*self.status.borrow() {
            OperationStatus::Completed(value) => Ok(value.clone()),
            OperationStatus::Failed(error) => Err(error.clone()),
            OperationStatus::Pending => Err(JsError::internal("continuation ran while pending")),
        }
    }

    fn run(&self, continuation: Continuation) -> Result<(), JsError> {
        self.dispatched.set(self.dispatched.get() + 1);
        let outcome = self.outcome();
        match continuation {
            Continuation::Then {
                on_resolved,
                on_rejected,
                promise,
            } => {
                match outcome {
                    Ok(value) => match on_resolved {
                        Some(handler) => settle_from(&promise, handler.call(&Value::Undefined, &[value])),
                        None => promise.resolve(value),
                    },
                    Err(error) => match on_rejected {
                        Some(handler) => {
                            settle_from(&promise, handler.call(&Value::Undefined, &[error.to_value()]))
                        }
                        None => promise.reject(error.to_value()),
                    },
                }
                Ok(())
            }
            Continuation::Done {
                on_resolved,
                on_rejected,
            } => match outcome {
                Ok(value) => match on_resolved {
                    Some(handler) => handler.call(&Value::Undefined, &[value]).map(|_| ()),
                    None => Ok(()),
                },
                Err(error) => match on_rejected {
                    Some(handler) => handler.call(&Value::Undefined, &[error.to_value()]).map(|_| ()),
                    // Unhandled: rethrown to the event loop.
                    None => Err(error),
                },
            },
            Continuation::Finally { callback, promise } => {
                match callback.call(&Value::Undefined, &[]) {
                    Err(error) => promise.reject(error.to_value()),
                    Ok(_) => match outcome {
                        Ok(value) => promise.resolve(value),
                        Err(error) => promise.reject(error.to_value()),
                    },
                }
                Ok(())
            }
        }
    }

    fn new_promise(&self) -> Result<Promise, JsError> {
        let event_loop = self
            .event_loop
            .upgrade()
            .ok_or_else(|| JsError::internal("event loop is gone"))?;
        Ok(Promise::new(&event_loop))
    }
}

fn settle_from(promise: &Promise, result: Result<Value, JsError>) {
    match result {
        Ok(value) => promise.resolve(value),
        Err(error) => promise.reject(error.to_value()),
    }
}

fn callable(args: &[Value], index: usize) -> Option<Value> {
    args.get(index).filter(|f| f.as_function().is_some()).cloned()
}

impl HostObject for AsyncOperation {
    fn class_name(&self) -> &str {
        "AsyncOperation"
    }

    fn get(&self, name: &str) -> Result<Value, JsError> {
        let state = Rc::clone(&self.state);
        let method = match name {
            "then" => NativeFunction::new("then", move |_this, args| {
                let promise = state.new_promise()?;
                state.add(
                    Continuation::Then {
                        on_resolved: callable(args, 0),
                        on_rejected: callable(args, 1),
                        promise: promise.clone(),
                    },
                    callable(args, 2),
                );
                Ok(promise.to_value())
            }),
            "done" => NativeFunction::new("done", move |_this, args| {
                state.add(
                    Continuation::Done {
                        on_resolved: callable(args, 0),
                        on_rejected: callable(args, 1),
                    },
                    callable(args, 2),
                );
                Ok(Value::Undefined)
            }),
            "catch" => NativeFunction::new("catch", move |_this, args| {
                let promise = state.new_promise()?;
                state.add(
                    Continuation::Then {
                        on_resolved: None,
                        on_rejected: callable(args, 0),
                        promise: promise.clone(),
                    },
                    None,
                );
                Ok(promise.to_value())
            }),
            "finally" => NativeFunction::new("finally", move |_this, args| {
                let promise = state.new_promise()?;
                let continuation = match callable(args, 0) {
                    Some(callback) => Continuation::Finally {
                        callback,
                        promise: promise.clone(),
                    },
                    None => Continuation::Then {
                        on_resolved: None,
                        on_rejected: None,
                        promise: promise.clone(),
                    },
                };
                state.add(continuation, None);
                Ok(promise.to_value())
            }),
            "cancel" => NativeFunction::new("cancel", move |_this, _args| {
                state.operation.cancel();
                Ok(Value::Undefined)
            }),
            "operation" => return Ok(self.state.operation_object.clone()),
            _ => return Ok(Value::Undefined),
        };
        Ok(method.into_value())
    }

    fn set(&self, _name: &str, _value: Value) -> Result<(), JsError> {
        Ok(())
    }

    fn own_keys(&self) -> Vec<String> {
        MEMBERS.iter().map(|name| name.to_string()).collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
