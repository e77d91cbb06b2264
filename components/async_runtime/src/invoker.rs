//! Marshaling work onto the script thread.

use crate::event_loop::{EventLoop, RemoteTask};
use core_types::JsError;
use crossbeam::channel::{bounded, Sender};
use std::thread::{self, ThreadId};

/// Errors from running work on the script thread.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvokeError {
    /// The script thread's event loop is gone.
    #[error("script thread event loop is no longer running")]
    Disconnected,
    /// The work ran and failed with a script error.
    #[error("script handler failed: {0}")]
    ScriptError(String),
}

/// A cloneable, sendable handle that runs work on one script thread.
///
/// # Examples
///
/// ```
/// use async_runtime::EventLoop;
/// use std::time::Duration;
///
/// let event_loop = EventLoop::new();
/// let invoker = event_loop.invoker();
///
/// let worker = std::thread::spawn(move || {
///     invoker.invoke_and_block(|_| Ok(6 * 7)).unwrap()
/// });
///
/// // The script thread must keep pumping while the worker blocks.
/// event_loop
///     .run_until(|| worker.is_finished(), Duration::from_secs(5))
///     .unwrap();
/// assert_eq!(worker.join().unwrap(), 42);
/// ```
#[derive(Clone)]
pub struct Invoker {
    thread: ThreadId,
    tx: Sender<RemoteTask>,
}

impl Invoker {
    pub(crate) fn new(thread: ThreadId, tx: Sender<RemoteTask>) -> Self {
        Self { thread, tx }
    }

    /// The script thread this invoker targets.
    pub fn thread(&self) -> ThreadId {
        self.thread
    }

    /// True when called on the script thread.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread
    }

    /// Runs `f` on the script thread: synchronously when already there,
    /// queued otherwise. Script errors from `f` are reported to the event
    /// loop.
    pub fn invoke_possibly_async<F>(&self, f: F) -> Result<(), InvokeError>
    where
        F: FnOnce(&EventLoop) -> Result<(), JsError> + Send + 'static,
    {
        if self.is_current() {
            if let Some(event_loop) = EventLoop::current() {
                if let Err(error) = f(&event_loop) {
                    event_loop.report_error(error);
                }
                return Ok(());
            }
        }
        self.tx
            .send(Box::new(f))
            .map_err(|_| InvokeError::Disconnected)
    }

    /// Runs `f` on the script thread and blocks the calling thread until it
    /// has finished.
    ///
    /// Must not be reached while the script thread waits on the caller. On
    /// the script thread itself `f` runs inline.
    pub fn invoke_and_block<R, F>(&self, f: F) -> Result<R, InvokeError>
    where
        R: Send + 'static,
        F: FnOnce(&EventLoop) -> Result<R, JsError> + Send + 'static,
    {
        if self.is_current() {
            let event_loop = EventLoop::current().ok_or(InvokeError::Disconnected)?;
            return f(&event_loop).map_err(|e| InvokeError::ScriptError(e.to_string()));
        }
        let (reply_tx, reply_rx) = bounded(1);
        let task: RemoteTask = Box::new(move |event_loop| {
            let result = f(event_loop).map_err(|e| e.to_string());
            // The waiting side may have gone away; nothing to do then.
            let _ = reply_tx.send(result);
            Ok(())
        });
        self.tx.send(task).map_err(|_| InvokeError::Disconnected)?;
        match reply_rx.recv() {
            Ok(result) => result.map_err(InvokeError::ScriptError),
            Err(_) => Err(InvokeError::Disconnected),
        }
    }
}

impl std::fmt::Debug for Invoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invoker")
            .field("thread", &self.thread)
            .finish()
    }
}
