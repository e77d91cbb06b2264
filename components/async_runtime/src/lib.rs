//! Script-thread async runtime for the projection.
//!
//! This crate provides the asynchronous plumbing between native threads and
//! the single-threaded script engine:
//! - Event loop with task and microtask queues
//! - Invoker for marshaling native-thread callbacks onto the script thread
//! - Promise implementation following the Promise/A+ specification
//! - Adapter presenting native async operations as promise-likes
//!
//! # Overview
//!
//! - [`EventLoop`] - Script-thread loop; owns parked values and the remote queue
//! - [`Invoker`] - `invoke_possibly_async` and `invoke_and_block` primitives
//! - [`Promise`] - Promise/A+ compliant implementation
//! - [`AsyncOperation`] - `then`/`done`/`catch`/`finally`/`cancel` over a
//!   native operation
//!
//! # Examples
//!
//! ## Event Loop Usage
//!
//! ```
//! use async_runtime::{EventLoop, Task};
//!
//! let event_loop = EventLoop::new();
//! event_loop.enqueue_task(Task::new(|| Ok(())));
//! event_loop.run_until_idle().unwrap();
//! ```
//!
//! ## Promise Usage
//!
//! ```
//! use async_runtime::{EventLoop, Promise, PromiseState};
//! use core_types::Value;
//!
//! let event_loop = EventLoop::new();
//! let promise = Promise::new(&event_loop);
//! promise.resolve(Value::Smi(42));
//! assert_eq!(promise.state(), PromiseState::Fulfilled(Value::Smi(42)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod event_loop;
pub mod invoker;
pub mod operation;
pub mod promise;
pub mod task_queue;

// Re-export main types at crate root
pub use event_loop::{EventLoop, ParkToken, RemoteTask};
pub use invoker::{InvokeError, Invoker};
pub use operation::{AsyncOperation, OperationConverters, OperationState, ValueConverter};
pub use promise::{Promise, PromiseObject, PromiseState, Settlement};
pub use task_queue::{MicroTask, MicrotaskQueue, Task, TaskQueue};
