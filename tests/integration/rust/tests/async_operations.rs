//! Async Operation Integration Tests
//!
//! Native async operations returned by projected methods behave as
//! promise-likes: continuations are deferred, errors propagate down chains
//! and completion may arrive from any thread.

use async_runtime::{AsyncOperation, Promise, PromiseState};
use core_types::{ErrorKind, JsError, Value};
use integration_tests::demo::{self, Lamp};
use integration_tests::support::Recorder;
use native_model::{AnyValue, HResult, NativeError, NativeRef};
use projection::Session;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

fn warm_up(session: &Session) -> (Arc<Lamp>, Value) {
    let lamp = Lamp::new("Kitchen");
    let wrapper = session.project(Arc::clone(&lamp) as NativeRef).unwrap();
    let operation = wrapper.invoke("warmUpAsync", &[Value::Double(0.8)]).unwrap();
    (lamp, operation)
}

fn number_field(value: &Value, name: &str) -> Option<f64> {
    value.get(name).ok()?.as_number()
}

#[test]
fn test_method_returns_async_operation() {
    let session = demo::session();
    let (lamp, operation) = warm_up(&session);

    let wrapper = AsyncOperation::from_value(&operation).unwrap();
    assert!(wrapper.is_pending());
    assert!(lamp.pending_warm_up().is_some());
    assert_eq!(operation.as_object().unwrap().class_name(), "AsyncOperation");

    let native = operation.get("operation").unwrap();
    assert_eq!(
        native.as_object().unwrap().class_name(),
        "Demo.Devices.WarmUpOperation"
    );
}

#[test]
fn test_continuation_deferred_to_microtask() {
    let session = demo::session();
    let (lamp, operation) = warm_up(&session);
    let recorder = Recorder::new();
    operation.invoke("then", &[recorder.function("onResolved")]).unwrap();

    lamp.pending_warm_up().unwrap().complete(AnyValue::Double(0.8));
    assert_eq!(recorder.count(), 0);

    session.event_loop().run_until_idle().unwrap();
    assert_eq!(recorder.calls(), vec![vec![Value::Double(0.8)]]);
}

#[test]
fn test_then_after_completion_still_deferred() {
    let session = demo::session();
    let (lamp, operation) = warm_up(&session);
    lamp.pending_warm_up().unwrap().complete(AnyValue::Int32(3));
    session.event_loop().run_until_idle().unwrap();

    let recorder = Recorder::new();
    operation.invoke("then", &[recorder.function("onResolved")]).unwrap();
    assert_eq!(recorder.count(), 0);

    session.event_loop().run_until_idle().unwrap();
    assert_eq!(recorder.last_arg(), Some(Value::Smi(3)));
}

#[test]
fn test_each_continuation_runs_once() {
    let session = demo::session();
    let (lamp, operation) = warm_up(&session);
    let recorder = Recorder::new();
    for _ in 0..3 {
        operation.invoke("then", &[recorder.function("onResolved")]).unwrap();
    }

    let source = lamp.pending_warm_up().unwrap();
    source.complete(AnyValue::Boolean(true));
    source.complete(AnyValue::Boolean(false));
    session.event_loop().run_until_idle().unwrap();

    assert_eq!(recorder.count(), 3);
    assert!(recorder.calls().iter().all(|args| args[0] == Value::Boolean(true)));
    assert_eq!(AsyncOperation::from_value(&operation).unwrap().dispatched(), 3);
}

#[test]
fn test_then_chains_return_values() {
    let session = demo::session();
    let (lamp, operation) = warm_up(&session);
    let recorder = Recorder::new();

    let chained = operation
        .invoke(
            "then",
            &[Recorder::new().function_returning("double", Ok(Value::Smi(84)))],
        )
        .unwrap();
    chained.invoke("then", &[recorder.function("onResolved")]).unwrap();

    lamp.pending_warm_up().unwrap().complete(AnyValue::Int32(42));
    session.event_loop().run_until_idle().unwrap();
    assert_eq!(recorder.last_arg(), Some(Value::Smi(84)));
}

#[test]
fn test_native_failure_rejects_with_code() {
    let session = demo::session();
    let (lamp, operation) = warm_up(&session);
    let recorder = Recorder::new();
    operation
        .invoke("then", &[Value::Undefined, recorder.function("onRejected")])
        .unwrap();

    lamp.pending_warm_up()
        .unwrap()
        .fail(NativeError::new(HResult::E_INVALIDARG, "filament missing"));
    session.event_loop().run_until_idle().unwrap();

    let reason = recorder.last_arg().unwrap();
    assert_eq!(reason.get("message").unwrap(), Value::string("filament missing"));
    assert_eq!(
        number_field(&reason, "number"),
        Some(f64::from(HResult::E_INVALIDARG.0))
    );
}

#[test]
fn test_rejection_propagates_through_chain() {
    let session = demo::session();
    let (lamp, operation) = warm_up(&session);
    let skipped = Recorder::new();
    let caught = Recorder::new();

    let promise = operation
        .invoke("then", &[skipped.function("onResolved")])
        .unwrap()
        .invoke("then", &[skipped.function("onResolved")])
        .unwrap()
        .invoke("catch", &[caught.function("onRejected")])
        .unwrap();

    lamp.pending_warm_up()
        .unwrap()
        .fail(NativeError::new(HResult::E_FAIL, "burnt out"));
    session.event_loop().run_until_idle().unwrap();

    assert_eq!(skipped.count(), 0);
    assert_eq!(
        caught.last_arg().unwrap().get("message").unwrap(),
        Value::string("burnt out")
    );
    let promise = Promise::from_value(&promise).unwrap();
    assert!(matches!(promise.state(), PromiseState::Fulfilled(Value::Undefined)));
}

#[test]
fn test_thrown_value_propagates_unchanged() {
    let session = demo::session();
    let (lamp, operation) = warm_up(&session);
    let caught = Recorder::new();
    let thrown = JsError::thrown(Value::string("custom"));

    operation
        .invoke("then", &[Recorder::new().function_returning("throws", Err(thrown))])
        .unwrap()
        .invoke("then", &[Value::Undefined, caught.function("onRejected")])
        .unwrap();

    lamp.pending_warm_up().unwrap().complete(AnyValue::Empty);
    session.event_loop().run_until_idle().unwrap();
    assert_eq!(caught.last_arg(), Some(Value::string("custom")));
}

#[test]
fn test_done_without_error_handler_reports_error() {
    let session = demo::session();
    let (lamp, operation) = warm_up(&session);
    operation.invoke("done", &[Recorder::new().function("onResolved")]).unwrap();

    lamp.pending_warm_up()
        .unwrap()
        .fail(NativeError::new(HResult::E_FAIL, "unhandled"));
    let err = session.event_loop().run_until_idle().unwrap_err();
    assert_eq!(err.message, "unhandled");
}

#[test]
fn test_done_returns_undefined() {
    let session = demo::session();
    let (lamp, operation) = warm_up(&session);
    let recorder = Recorder::new();

    let result = operation.invoke("done", &[recorder.function("onResolved")]).unwrap();
    assert_eq!(result, Value::Undefined);

    lamp.pending_warm_up().unwrap().complete(AnyValue::Int32(1));
    session.event_loop().run_until_idle().unwrap();
    assert_eq!(recorder.count(), 1);
}

#[test]
fn test_finally_passes_outcome_through() {
    let session = demo::session();
    let (lamp, operation) = warm_up(&session);
    let cleanup = Recorder::new();
    let recorder = Recorder::new();

    operation
        .invoke("finally", &[cleanup.function("cleanup")])
        .unwrap()
        .invoke("then", &[recorder.function("onResolved")])
        .unwrap();

    lamp.pending_warm_up().unwrap().complete(AnyValue::Int32(5));
    session.event_loop().run_until_idle().unwrap();
    assert_eq!(cleanup.calls(), vec![Vec::<Value>::new()]);
    assert_eq!(recorder.last_arg(), Some(Value::Smi(5)));
}

#[test]
fn test_progress_delivered_while_pending() {
    let session = demo::session();
    let (lamp, operation) = warm_up(&session);
    let progress = Recorder::new();
    operation
        .invoke("then", &[Value::Undefined, Value::Undefined, progress.function("onProgress")])
        .unwrap();

    let source = lamp.pending_warm_up().unwrap();
    source.report_progress(AnyValue::Double(0.5));
    assert_eq!(progress.last_arg(), Some(Value::Double(0.5)));

    source.complete(AnyValue::Empty);
    source.report_progress(AnyValue::Double(0.9));
    session.event_loop().run_until_idle().unwrap();
    assert_eq!(progress.count(), 1);
}

#[test]
fn test_cancel_rejects_with_abort() {
    let session = demo::session();
    let (lamp, operation) = warm_up(&session);
    let caught = Recorder::new();
    operation.invoke("catch", &[caught.function("onRejected")]).unwrap();

    operation.invoke("cancel", &[]).unwrap();
    session.event_loop().run_until_idle().unwrap();

    assert!(lamp.pending_warm_up().unwrap().is_canceled());
    let reason = caught.last_arg().unwrap();
    assert_eq!(
        number_field(&reason, "number"),
        Some(f64::from(HResult::E_ABORT.0))
    );
}

#[test]
fn test_completion_from_native_thread() {
    let session = demo::session();
    let (lamp, operation) = warm_up(&session);
    let recorder = Recorder::new();
    operation.invoke("then", &[recorder.function("onResolved")]).unwrap();

    let source = lamp.pending_warm_up().unwrap();
    let worker = thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        source.complete(AnyValue::String("warm".to_string()));
    });

    let settled = session
        .event_loop()
        .run_until(|| recorder.count() == 1, WAIT)
        .unwrap();
    worker.join().unwrap();
    assert!(settled);
    assert_eq!(recorder.last_arg(), Some(Value::string("warm")));
}

#[test]
fn test_object_result_is_projected() {
    let session = demo::session();
    let (lamp, operation) = warm_up(&session);
    let recorder = Recorder::new();
    operation.invoke("then", &[recorder.function("onResolved")]).unwrap();

    let spare = Lamp::new("Spare");
    lamp.pending_warm_up()
        .unwrap()
        .complete(AnyValue::Object(Arc::clone(&spare) as NativeRef));
    session.event_loop().run_until_idle().unwrap();

    let result = recorder.last_arg().unwrap();
    assert_eq!(result.get("name").unwrap(), Value::string("Spare"));
    assert_eq!(result, session.project(spare as NativeRef).unwrap());
}

#[test]
fn test_operation_ignores_assignment() {
    let session = demo::session();
    let (_lamp, operation) = warm_up(&session);
    operation.set("then", Value::Smi(1)).unwrap();
    assert!(operation.get("then").unwrap().as_function().is_some());
}

#[test]
fn test_rejection_reason_is_error_object() {
    let session = demo::session();
    let (lamp, operation) = warm_up(&session);
    let caught = Recorder::new();
    operation.invoke("catch", &[caught.function("onRejected")]).unwrap();

    lamp.pending_warm_up()
        .unwrap()
        .fail(NativeError::new(HResult::E_FAIL, ""));
    session.event_loop().run_until_idle().unwrap();

    let reason = caught.last_arg().unwrap();
    assert_eq!(reason.get("name").unwrap(), Value::string(ErrorKind::Error.name()));
    assert!(reason
        .get("message")
        .unwrap()
        .as_str()
        .unwrap()
        .contains("Native call failed"));
}
