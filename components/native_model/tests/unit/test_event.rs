//! Unit tests for native event sources

use native_model::{AnyValue, EventSource};
use parking_lot::Mutex;
use std::sync::Arc;

#[test]
fn test_raise_passes_arguments_in_order() {
    let source = EventSource::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    source.add(Arc::new(move |args: &[AnyValue]| {
        if let Some(AnyValue::Int32(n)) = args.first() {
            sink.lock().push(*n);
        }
    }));
    source.raise(&[AnyValue::Int32(1)]);
    source.raise(&[AnyValue::Int32(2)]);
    assert_eq!(*seen.lock(), vec![1, 2]);
}

#[test]
fn test_handler_may_remove_itself() {
    let source = Arc::new(EventSource::new());
    let token_slot = Arc::new(Mutex::new(None));
    let weak = Arc::downgrade(&source);
    let slot = Arc::clone(&token_slot);
    let token = source.add(Arc::new(move |_: &[AnyValue]| {
        if let (Some(source), Some(token)) = (weak.upgrade(), *slot.lock()) {
            source.remove(token);
        }
    }));
    *token_slot.lock() = Some(token);

    source.raise(&[]);
    assert!(source.is_empty());
}
