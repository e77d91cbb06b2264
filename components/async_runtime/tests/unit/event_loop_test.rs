//! Unit tests for EventLoop

use async_runtime::{EventLoop, MicroTask, Task};
use core_types::JsError;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

#[test]
fn new_event_loop_has_empty_queues() {
    let event_loop = EventLoop::new();
    assert!(event_loop.is_task_queue_empty());
    assert!(event_loop.is_microtask_queue_empty());
}

#[test]
fn enqueue_task_adds_to_task_queue() {
    let event_loop = EventLoop::new();
    event_loop.enqueue_task(Task::new(|| Ok(())));
    assert!(!event_loop.is_task_queue_empty());
    event_loop.run_until_idle().unwrap();
    assert!(event_loop.is_task_queue_empty());
}

#[test]
fn task_queue_fifo_order() {
    let event_loop = EventLoop::new();
    let results = Rc::new(RefCell::new(vec![]));
    for n in 1..=3 {
        let results = Rc::clone(&results);
        event_loop.enqueue_task(Task::new(move || {
            results.borrow_mut().push(n);
            Ok(())
        }));
    }
    event_loop.run_until_idle().unwrap();
    assert_eq!(*results.borrow(), vec![1, 2, 3]);
}

#[test]
fn microtasks_enqueued_by_microtasks_run_in_same_drain() {
    let event_loop = EventLoop::new();
    let results = Rc::new(RefCell::new(vec![]));

    let outer = Rc::clone(&results);
    let weak = Rc::downgrade(&event_loop);
    event_loop.enqueue_microtask(MicroTask::new(move || {
        outer.borrow_mut().push("first");
        let inner = Rc::clone(&outer);
        if let Some(event_loop) = weak.upgrade() {
            event_loop.enqueue_microtask(MicroTask::new(move || {
                inner.borrow_mut().push("nested");
                Ok(())
            }));
        }
        Ok(())
    }));

    event_loop.run_all_microtasks();
    assert_eq!(*results.borrow(), vec!["first", "nested"]);
}

#[test]
fn failing_microtask_is_reported() {
    let event_loop = EventLoop::new();
    event_loop.enqueue_microtask(MicroTask::new(|| Err(JsError::range_error("bad"))));
    let error = event_loop.run_until_idle().unwrap_err();
    assert_eq!(error.to_string(), "RangeError: bad");
}

#[test]
fn run_until_times_out_when_never_done() {
    let event_loop = EventLoop::new();
    let done = event_loop
        .run_until(|| false, Duration::from_millis(10))
        .unwrap();
    assert!(!done);
}

#[test]
fn remote_task_runs_on_script_thread() {
    let event_loop = EventLoop::new();
    let script_thread = std::thread::current().id();
    let invoker = event_loop.invoker();
    let seen = Rc::new(RefCell::new(None::<std::thread::ThreadId>));
    let token = event_loop.park(Rc::clone(&seen) as Rc<dyn std::any::Any>);

    std::thread::spawn(move || {
        invoker
            .invoke_possibly_async(move |event_loop| {
                if let Some(seen) = event_loop.parked::<RefCell<Option<std::thread::ThreadId>>>(token) {
                    *seen.borrow_mut() = Some(std::thread::current().id());
                }
                Ok(())
            })
            .unwrap();
    })
    .join()
    .unwrap();

    event_loop.run_until_idle().unwrap();
    assert_eq!(*seen.borrow(), Some(script_thread));
}
