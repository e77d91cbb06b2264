//! Native events: handler delegates, registration tokens and a ready-made
//! event source for native components.

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Token returned by a native add-handler call, needed to remove the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventToken(pub i64);

impl fmt::Display for EventToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A native event handler delegate. Raisers may call it from any thread.
pub type EventHandler = Arc<dyn Fn(&[crate::AnyValue]) + Send + Sync>;

static NEXT_TOKEN: AtomicI64 = AtomicI64::new(1);

/// A multicast event: the storage behind a native component's `add_x` /
/// `remove_x` pair.
///
/// # Examples
///
/// ```
/// use native_model::{AnyValue, EventSource};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let source = EventSource::new();
/// let hits = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&hits);
/// let token = source.add(Arc::new(move |_args: &[AnyValue]| {
///     counter.fetch_add(1, Ordering::SeqCst);
/// }));
///
/// source.raise(&[AnyValue::Int32(1)]);
/// source.remove(token);
/// source.raise(&[AnyValue::Int32(2)]);
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// ```
#[derive(Default)]
pub struct EventSource {
    handlers: Mutex<Vec<(EventToken, EventHandler)>>,
}

impl EventSource {
    /// Creates an event with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a handler and returns its token.
    pub fn add(&self, handler: EventHandler) -> EventToken {
        let token = EventToken(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed));
        self.handlers.lock().push((token, handler));
        token
    }

    /// Removes the handler registered under `token`. Unknown tokens are ignored.
    pub fn remove(&self, token: EventToken) {
        self.handlers.lock().retain(|(t, _)| *t != token);
    }

    /// Invokes every handler with `args`.
    ///
    /// Handlers are snapshotted first and called without the lock held, so a
    /// handler may add or remove handlers.
    pub fn raise(&self, args: &[crate::AnyValue]) {
        let snapshot: Vec<EventHandler> = self
            .handlers
            .lock()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in snapshot {
            handler(args);
        }
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.lock().len()
    }

    /// True when no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.lock().is_empty()
    }
}

impl fmt::Debug for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSource")
            .field("handlers", &self.len())
            .finish()
    }
}
