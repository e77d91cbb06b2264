//! Event loop implementation.
//!
//! This module provides the script-thread event loop that coordinates task and
//! microtask execution, and receives work marshaled from native threads.

use crate::invoker::Invoker;
use crate::task_queue::{MicroTask, MicrotaskQueue, Task, TaskQueue};
use core_types::JsError;
use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

/// Work sent to the script thread from another thread.
pub type RemoteTask = Box<dyn FnOnce(&EventLoop) -> Result<(), JsError> + Send>;

/// Handle to a script-thread value parked in the event loop.
///
/// Native threads cannot hold script values, so they hold a token instead and
/// look the value up once their work has been marshaled onto the script
/// thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParkToken(u64);

thread_local! {
    static CURRENT: RefCell<Weak<EventLoop>> = RefCell::new(Weak::new());
}

/// The script event loop.
///
/// Each turn of the loop:
/// 1. Runs the tasks marshaled from other threads
/// 2. Takes the oldest task from the task queue and executes it
/// 3. Drains all microtasks in the microtask queue
///
/// A failing task does not stop the loop; its error is kept and returned by
/// the next [`EventLoop::run_until_idle`].
///
/// # Examples
///
/// ```
/// use async_runtime::{EventLoop, MicroTask, Task};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let event_loop = EventLoop::new();
/// let order = Rc::new(RefCell::new(Vec::new()));
///
/// let o = Rc::clone(&order);
/// event_loop.enqueue_task(Task::new(move || {
///     o.borrow_mut().push('T');
///     Ok(())
/// }));
/// let o = Rc::clone(&order);
/// event_loop.enqueue_microtask(MicroTask::new(move || {
///     o.borrow_mut().push('M');
///     Ok(())
/// }));
///
/// event_loop.run_until_idle().unwrap();
/// assert_eq!(*order.borrow(), vec!['T', 'M']);
/// ```
pub struct EventLoop {
    thread: ThreadId,
    task_queue: RefCell<TaskQueue>,
    microtask_queue: RefCell<MicrotaskQueue>,
    remote_tx: Sender<RemoteTask>,
    remote_rx: Receiver<RemoteTask>,
    parked: RefCell<HashMap<u64, Rc<dyn Any>>>,
    next_token: Cell<u64>,
    errors: RefCell<Vec<JsError>>,
}

impl EventLoop {
    /// Creates an event loop for the calling thread and makes it the
    /// thread's current loop.
    pub fn new() -> Rc<Self> {
        let (remote_tx, remote_rx) = unbounded();
        let event_loop = Rc::new(Self {
            thread: thread::current().id(),
            task_queue: RefCell::new(TaskQueue::new()),
            microtask_queue: RefCell::new(MicrotaskQueue::new()),
            remote_tx,
            remote_rx,
            parked: RefCell::new(HashMap::new()),
            next_token: Cell::new(1),
            errors: RefCell::new(Vec::new()),
        });
        CURRENT.with(|current| *current.borrow_mut() = Rc::downgrade(&event_loop));
        event_loop
    }

    /// The calling thread's current event loop, if one is alive.
    pub fn current() -> Option<Rc<EventLoop>> {
        CURRENT.with(|current| current.borrow().upgrade())
    }

    /// The thread this loop runs on.
    pub fn thread(&self) -> ThreadId {
        self.thread
    }

    /// A handle other threads use to run work on this loop.
    pub fn invoker(&self) -> Invoker {
        Invoker::new(self.thread, self.remote_tx.clone())
    }

    /// Adds a task to the task queue.
    pub fn enqueue_task(&self, task: Task) {
        self.task_queue.borrow_mut().enqueue(task);
    }

    /// Adds a microtask to the microtask queue.
    pub fn enqueue_microtask(&self, microtask: MicroTask) {
        self.microtask_queue.borrow_mut().enqueue(microtask);
    }

    /// Returns true if the task queue is empty.
    pub fn is_task_queue_empty(&self) -> bool {
        self.task_queue.borrow().is_empty()
    }

    /// Returns true if the microtask queue is empty.
    pub fn is_microtask_queue_empty(&self) -> bool {
        self.microtask_queue.borrow().is_empty()
    }

    /// Records an error raised by a task, continuation or marshaled callback.
    pub fn report_error(&self, error: JsError) {
        tracing::debug!(%error, "error reported to event loop");
        self.errors.borrow_mut().push(error);
    }

    /// Removes and returns every reported error.
    pub fn take_errors(&self) -> Vec<JsError> {
        std::mem::take(&mut *self.errors.borrow_mut())
    }

    /// Runs all microtasks in the queue until empty.
    ///
    /// New microtasks added during execution are processed before this
    /// method returns.
    pub fn run_all_microtasks(&self) {
        loop {
            // The borrow must end before the microtask runs: it may enqueue.
            let next = self.microtask_queue.borrow_mut().dequeue();
            match next {
                Some(microtask) => self.settle(microtask.run()),
                None => break,
            }
        }
    }

    /// Processes one complete cycle: the marshaled tasks, one task, then all
    /// microtasks. Returns false when there was nothing to do.
    pub fn process_one_cycle(&self) -> bool {
        let mut ran = false;
        while let Ok(remote) = self.remote_rx.try_recv() {
            self.settle(remote(self));
            self.run_all_microtasks();
            ran = true;
        }
        let next = self.task_queue.borrow_mut().dequeue();
        if let Some(task) = next {
            self.settle(task.run());
            ran = true;
        }
        if !self.is_microtask_queue_empty() {
            self.run_all_microtasks();
            ran = true;
        }
        ran
    }

    /// Runs until no task, microtask or marshaled task is left.
    ///
    /// Returns the first error reported since the last call, if any.
    pub fn run_until_idle(&self) -> Result<(), JsError> {
        while self.process_one_cycle() {}
        let mut errors = self.take_errors().into_iter();
        match errors.next() {
            Some(first) => {
                let dropped = errors.count();
                if dropped > 0 {
                    tracing::warn!(dropped, "more errors were reported in the same run");
                }
                Err(first)
            }
            None => Ok(()),
        }
    }

    /// Runs the loop, waiting for marshaled work, until `done` returns true
    /// or `timeout` elapses. Returns whether `done` became true.
    pub fn run_until<F>(&self, done: F, timeout: Duration) -> Result<bool, JsError>
    where
        F: Fn() -> bool,
    {
        let deadline = Instant::now() + timeout;
        loop {
            self.run_until_idle()?;
            if done() {
                return Ok(true);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.remote_rx.recv_timeout(remaining) {
                Ok(remote) => {
                    self.settle(remote(self));
                    self.run_all_microtasks();
                }
                Err(RecvTimeoutError::Timeout) => {
                    self.run_until_idle()?;
                    return Ok(done());
                }
                // The loop owns a sender, so the channel cannot disconnect.
                Err(RecvTimeoutError::Disconnected) => return Ok(done()),
            }
        }
    }

    /// Parks a script value so that marshaled work can find it again.
    pub fn park(&self, value: Rc<dyn Any>) -> ParkToken {
        let token = self.next_token.get();
        self.next_token.set(token + 1);
        self.parked.borrow_mut().insert(token, value);
        ParkToken(token)
    }

    /// Looks up a parked value without removing it.
    pub fn parked<T: Any>(&self, token: ParkToken) -> Option<Rc<T>> {
        let value = self.parked.borrow().get(&token.0).cloned()?;
        value.downcast::<T>().ok()
    }

    /// Removes a parked value and returns it.
    pub fn unpark<T: Any>(&self, token: ParkToken) -> Option<Rc<T>> {
        let value = self.parked.borrow_mut().remove(&token.0)?;
        value.downcast::<T>().ok()
    }

    /// Number of parked values.
    pub fn parked_len(&self) -> usize {
        self.parked.borrow().len()
    }

    fn settle(&self, result: Result<(), JsError>) {
        if let Err(error) = result {
            self.report_error(error);
        }
    }
}

impl std::fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLoop")
            .field("thread", &self.thread)
            .field("tasks", &self.task_queue.borrow().len())
            .field("microtasks", &self.microtask_queue.borrow().len())
            .field("parked", &self.parked_len())
            .finish()
    }
}
