//! Unit tests for Invoker

use async_runtime::{EventLoop, InvokeError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn invoker_reports_current_thread() {
    let event_loop = EventLoop::new();
    let invoker = event_loop.invoker();
    assert!(invoker.is_current());
    assert_eq!(invoker.thread(), std::thread::current().id());

    let remote = invoker.clone();
    let on_other_thread = std::thread::spawn(move || remote.is_current())
        .join()
        .unwrap();
    assert!(!on_other_thread);
}

#[test]
fn invoke_and_block_waits_for_script_thread() {
    let event_loop = EventLoop::new();
    let invoker = event_loop.invoker();
    let ran = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&ran);
    let worker = std::thread::spawn(move || {
        let value = invoker
            .invoke_and_block(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok("handled")
            })
            .unwrap();
        value.to_string()
    });

    let finished = event_loop
        .run_until(|| worker.is_finished(), Duration::from_secs(5))
        .unwrap();
    assert!(finished);
    assert_eq!(worker.join().unwrap(), "handled");
    assert_eq!(ran.load(Ordering::SeqCst), 1);
}

#[test]
fn invoke_and_block_on_script_thread_runs_inline() {
    let event_loop = EventLoop::new();
    let invoker = event_loop.invoker();
    assert_eq!(invoker.invoke_and_block(|_| Ok(5)).unwrap(), 5);
}

#[test]
fn invoke_after_loop_dropped_fails() {
    let event_loop = EventLoop::new();
    let invoker = event_loop.invoker();
    drop(event_loop);
    let result = std::thread::spawn(move || invoker.invoke_and_block(|_| Ok(())))
        .join()
        .unwrap();
    assert_eq!(result, Err(InvokeError::Disconnected));
}
