//! Unit tests for Promise

use async_runtime::{EventLoop, Promise, PromiseState};
use core_types::{JsError, NativeFunction, PlainObject, Value};
use std::cell::RefCell;
use std::rc::Rc;

fn recorder(log: &Rc<RefCell<Vec<Value>>>) -> Value {
    let log = Rc::clone(log);
    NativeFunction::new("record", move |_this, args| {
        log.borrow_mut()
            .push(args.first().cloned().unwrap_or(Value::Undefined));
        Ok(Value::Undefined)
    })
    .into_value()
}

#[test]
fn new_promise_is_pending() {
    let event_loop = EventLoop::new();
    let promise = Promise::new(&event_loop);
    assert_eq!(promise.state(), PromiseState::Pending);
    assert!(promise.is_pending());
}

#[test]
fn cannot_resolve_already_fulfilled_promise() {
    let event_loop = EventLoop::new();
    let promise = Promise::new(&event_loop);
    promise.resolve(Value::Smi(42));
    promise.resolve(Value::Smi(100));
    promise.reject(Value::Smi(0));
    assert_eq!(promise.state(), PromiseState::Fulfilled(Value::Smi(42)));
}

#[test]
fn then_handler_runs_after_current_turn() {
    let event_loop = EventLoop::new();
    let log = Rc::new(RefCell::new(vec![]));
    let promise = Promise::resolved(&event_loop, Value::Smi(1));
    promise.then(Some(recorder(&log)), None);
    assert!(log.borrow().is_empty());

    event_loop.run_until_idle().unwrap();
    assert_eq!(*log.borrow(), vec![Value::Smi(1)]);
}

#[test]
fn rejection_passes_through_missing_handler() {
    let event_loop = EventLoop::new();
    let log = Rc::new(RefCell::new(vec![]));
    let promise = Promise::new(&event_loop);
    promise
        .then(Some(recorder(&log)), None)
        .catch(Some(recorder(&log)));
    promise.reject(Value::string("boom"));

    event_loop.run_until_idle().unwrap();
    assert_eq!(*log.borrow(), vec![Value::string("boom")]);
}

#[test]
fn throwing_handler_rejects_derived_promise() {
    let event_loop = EventLoop::new();
    let promise = Promise::resolved(&event_loop, Value::Undefined);
    let thrower = NativeFunction::new("thrower", |_this, _args| {
        Err(JsError::thrown(Value::Smi(7)))
    })
    .into_value();
    let derived = promise.then(Some(thrower), None);

    event_loop.run_until_idle().unwrap();
    assert_eq!(derived.state(), PromiseState::Rejected(Value::Smi(7)));
}

#[test]
fn finally_keeps_outcome() {
    let event_loop = EventLoop::new();
    let log = Rc::new(RefCell::new(vec![]));
    let promise = Promise::rejected(&event_loop, Value::string("kept"));
    let derived = promise.finally(Some(recorder(&log)));

    event_loop.run_until_idle().unwrap();
    assert_eq!(*log.borrow(), vec![Value::Undefined]);
    assert_eq!(derived.state(), PromiseState::Rejected(Value::string("kept")));
}

#[test]
fn adopts_foreign_thenable() {
    let event_loop = EventLoop::new();
    let thenable = PlainObject::new()
        .with(
            "then",
            NativeFunction::new("then", |_this, args| {
                args[0].call(&Value::Undefined, &[Value::string("adopted")])
            })
            .into_value(),
        )
        .into_value();
    let promise = Promise::new(&event_loop);
    promise.resolve(thenable);
    assert!(promise.is_pending());

    event_loop.run_until_idle().unwrap();
    assert_eq!(
        promise.state(),
        PromiseState::Fulfilled(Value::string("adopted"))
    );
}

#[test]
fn script_then_returns_promise_object() {
    let event_loop = EventLoop::new();
    let log = Rc::new(RefCell::new(vec![]));
    let promise = Promise::resolved(&event_loop, Value::Smi(3));
    let value = promise.to_value();
    assert_eq!(value.as_object().unwrap().class_name(), "Promise");

    let chained = value.invoke("then", &[recorder(&log)]).unwrap();
    assert!(Promise::from_value(&chained).is_some());

    event_loop.run_until_idle().unwrap();
    assert_eq!(*log.borrow(), vec![Value::Smi(3)]);
}
