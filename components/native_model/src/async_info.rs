//! Native asynchronous operations.
//!
//! A native async operation runs on some background thread and reports its
//! outcome through a completion handler that may fire on any thread.
//! [`AsyncInfo`] is the contract the projection consumes; [`CompletionSource`]
//! is the producer side native components use to implement it.

use crate::{AnyValue, Guid, HResult, NativeError, NativeRef, Unknown};
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Weak};

/// Interface identifier of the async-info contract.
pub const IID_ASYNC_INFO: Guid = Guid::from_u128(0x0000_0036_0000_0000_c000_0000_0000_0046);

/// Status of a native async operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AsyncStatus {
    /// Still running
    Started,
    /// Finished with a result
    Completed,
    /// Canceled before completion
    Canceled,
    /// Finished with an error
    Error,
}

impl AsyncStatus {
    /// True for every status except [`AsyncStatus::Started`].
    pub fn is_terminal(self) -> bool {
        !matches!(self, AsyncStatus::Started)
    }
}

/// Completion delegate. Invoked exactly once with the terminal status.
pub type CompletedHandler = Box<dyn FnOnce(AsyncStatus) + Send>;

/// Progress delegate. Invoked zero or more times while the operation runs.
pub type ProgressHandler = Arc<dyn Fn(AnyValue) + Send + Sync>;

/// The native async operation contract.
pub trait AsyncInfo: Send + Sync {
    /// Operation id, unique within the process.
    fn id(&self) -> u32;

    /// Current status.
    fn status(&self) -> AsyncStatus;

    /// The failure, once the status is [`AsyncStatus::Error`] or
    /// [`AsyncStatus::Canceled`].
    fn error(&self) -> Option<NativeError>;

    /// Requests cancellation. Has no effect once the operation finished.
    fn cancel(&self);

    /// Releases the operation's result.
    fn close(&self);

    /// Installs the completion handler. May be called once; the handler runs
    /// immediately (on the calling thread) when the operation already
    /// finished.
    fn set_completed(&self, handler: CompletedHandler) -> Result<(), NativeError>;

    /// Installs the progress handler, replacing any previous one.
    fn set_progress(&self, handler: ProgressHandler);

    /// The result of a completed operation. Actions complete with
    /// [`AnyValue::Empty`].
    fn results(&self) -> Result<AnyValue, NativeError>;

    /// The operation as a native object.
    fn as_object(&self) -> NativeRef;
}

enum Outcome {
    Pending,
    Completed(AnyValue),
    Failed(NativeError),
    Canceled,
    Closed,
}

struct State {
    outcome: Outcome,
    completed: Option<CompletedHandler>,
    handler_assigned: bool,
    progress: Option<ProgressHandler>,
}

impl State {
    fn status(&self) -> AsyncStatus {
        match self.outcome {
            Outcome::Pending => AsyncStatus::Started,
            Outcome::Completed(_) | Outcome::Closed => AsyncStatus::Completed,
            Outcome::Failed(_) => AsyncStatus::Error,
            Outcome::Canceled => AsyncStatus::Canceled,
        }
    }
}

static NEXT_ID: AtomicU32 = AtomicU32::new(1);

/// The producer side of a native async operation.
///
/// # Examples
///
/// ```
/// use native_model::{AnyValue, AsyncInfo, AsyncStatus, CompletionSource};
/// use std::sync::mpsc;
///
/// let source = CompletionSource::new("Demo.Operation");
/// let (tx, rx) = mpsc::channel();
/// source
///     .set_completed(Box::new(move |status| tx.send(status).unwrap()))
///     .unwrap();
///
/// std::thread::spawn({
///     let source = source.clone();
///     move || source.complete(AnyValue::Int32(42))
/// });
///
/// assert_eq!(rx.recv().unwrap(), AsyncStatus::Completed);
/// assert!(matches!(source.results().unwrap(), AnyValue::Int32(42)));
/// ```
#[derive(Clone)]
pub struct CompletionSource {
    inner: Arc<Inner>,
}

struct Inner {
    id: u32,
    class_name: String,
    state: Mutex<State>,
    this: Weak<Inner>,
}

impl CompletionSource {
    /// Creates a pending operation reporting the given runtime class name.
    pub fn new(class_name: impl Into<String>) -> Self {
        let class_name = class_name.into();
        let inner = Arc::new_cyclic(|this| Inner {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            class_name,
            state: Mutex::new(State {
                outcome: Outcome::Pending,
                completed: None,
                handler_assigned: false,
                progress: None,
            }),
            this: this.clone(),
        });
        Self { inner }
    }

    /// Completes the operation with a result. Ignored once finished.
    pub fn complete(&self, value: AnyValue) {
        self.inner.finish(Outcome::Completed(value));
    }

    /// Fails the operation. Ignored once finished.
    pub fn fail(&self, error: NativeError) {
        self.inner.finish(Outcome::Failed(error));
    }

    /// Reports progress while the operation is running.
    pub fn report_progress(&self, value: AnyValue) {
        let progress = {
            let state = self.inner.state.lock();
            match state.outcome {
                Outcome::Pending => state.progress.clone(),
                _ => None,
            }
        };
        if let Some(progress) = progress {
            progress(value);
        }
    }

    /// True once cancellation was requested and accepted.
    pub fn is_canceled(&self) -> bool {
        matches!(self.inner.state.lock().outcome, Outcome::Canceled)
    }

    /// This operation as an [`AsyncInfo`] trait object.
    pub fn to_async_info(&self) -> Arc<dyn AsyncInfo> {
        Arc::new(self.clone())
    }
}

impl Inner {
    fn finish(&self, outcome: Outcome) {
        let (handler, status) = {
            let mut state = self.state.lock();
            if !matches!(state.outcome, Outcome::Pending) {
                return;
            }
            state.outcome = outcome;
            state.progress = None;
            (state.completed.take(), state.status())
        };
        if let Some(handler) = handler {
            handler(status);
        }
    }
}

impl Unknown for Inner {
    fn interface_ids(&self) -> Vec<Guid> {
        vec![IID_ASYNC_INFO]
    }

    fn runtime_class_name(&self) -> Option<String> {
        Some(self.class_name.clone())
    }

    fn as_async_info(&self) -> Option<Arc<dyn AsyncInfo>> {
        let inner = self.this.upgrade()?;
        Some(Arc::new(CompletionSource { inner }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl AsyncInfo for CompletionSource {
    fn id(&self) -> u32 {
        self.inner.id
    }

    fn status(&self) -> AsyncStatus {
        self.inner.state.lock().status()
    }

    fn error(&self) -> Option<NativeError> {
        match &self.inner.state.lock().outcome {
            Outcome::Failed(error) => Some(error.clone()),
            Outcome::Canceled => Some(NativeError::canceled()),
            _ => None,
        }
    }

    fn cancel(&self) {
        self.inner.finish(Outcome::Canceled);
    }

    fn close(&self) {
        let mut state = self.inner.state.lock();
        if matches!(state.outcome, Outcome::Completed(_)) {
            state.outcome = Outcome::Closed;
        }
    }

    fn set_completed(&self, handler: CompletedHandler) -> Result<(), NativeError> {
        let status = {
            let mut state = self.inner.state.lock();
            if state.handler_assigned {
                return Err(NativeError::new(
                    HResult::E_ILLEGAL_DELEGATE_ASSIGNMENT,
                    "Completion handler already assigned",
                ));
            }
            state.handler_assigned = true;
            let status = state.status();
            if !status.is_terminal() {
                state.completed = Some(handler);
                return Ok(());
            }
            status
        };
        handler(status);
        Ok(())
    }

    fn set_progress(&self, handler: ProgressHandler) {
        self.inner.state.lock().progress = Some(handler);
    }

    fn results(&self) -> Result<AnyValue, NativeError> {
        match &self.inner.state.lock().outcome {
            Outcome::Completed(value) => Ok(value.clone()),
            Outcome::Failed(error) => Err(error.clone()),
            Outcome::Canceled => Err(NativeError::canceled()),
            Outcome::Pending => Err(NativeError::new(
                HResult::E_ILLEGAL_METHOD_CALL,
                "Operation has not completed",
            )),
            Outcome::Closed => Err(NativeError::new(HResult::RO_E_CLOSED, "Operation is closed")),
        }
    }

    fn as_object(&self) -> NativeRef {
        Arc::clone(&self.inner) as NativeRef
    }
}

impl fmt::Debug for CompletionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionSource")
            .field("id", &self.inner.id)
            .field("status", &self.status())
            .finish()
    }
}
