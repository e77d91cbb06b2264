//! Unit tests for native async operations

use native_model::{AnyValue, AsyncInfo, AsyncStatus, CompletionSource, HResult, NativeError};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

#[test]
fn test_completion_from_background_thread() {
    let source = CompletionSource::new("Test.Download");
    let (tx, rx) = mpsc::channel();
    source
        .set_completed(Box::new(move |status| {
            tx.send((status, thread::current().id())).unwrap();
        }))
        .unwrap();

    let worker = {
        let source = source.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(5));
            source.complete(AnyValue::String("done".into()));
            thread::current().id()
        })
    };
    let worker_id = worker.join().unwrap();

    let (status, fired_on) = rx.recv().unwrap();
    assert_eq!(status, AsyncStatus::Completed);
    assert_eq!(fired_on, worker_id);
    assert!(matches!(source.results().unwrap(), AnyValue::String(s) if s == "done"));
}

#[test]
fn test_results_before_completion_is_illegal() {
    let source = CompletionSource::new("Test.Op");
    assert_eq!(source.status(), AsyncStatus::Started);
    assert_eq!(
        source.results().unwrap_err().code,
        HResult::E_ILLEGAL_METHOD_CALL
    );
}

#[test]
fn test_cancel_after_completion_has_no_effect() {
    let source = CompletionSource::new("Test.Op");
    source.complete(AnyValue::Int32(3));
    source.cancel();
    assert_eq!(source.status(), AsyncStatus::Completed);
    assert!(source.error().is_none());
}

#[test]
fn test_failure_is_reported_to_handler() {
    let source = CompletionSource::new("Test.Op");
    let (tx, rx) = mpsc::channel();
    source
        .set_completed(Box::new(move |status| tx.send(status).unwrap()))
        .unwrap();
    source.fail(NativeError::new(HResult::E_INVALIDARG, "bad input"));
    assert_eq!(rx.recv().unwrap(), AsyncStatus::Error);
    assert_eq!(source.error().unwrap().code, HResult::E_INVALIDARG);
}

#[test]
fn test_close_releases_result() {
    let source = CompletionSource::new("Test.Op");
    source.complete(AnyValue::Int32(3));
    source.close();
    assert_eq!(source.results().unwrap_err().code, HResult::RO_E_CLOSED);
}
