//! Namespace Integration Tests
//!
//! Dotted namespaces as read-only script objects, enumerations and class
//! activation through factories.

use core_types::{ErrorKind, Value};
use integration_tests::demo::{self, Lamp, LampFactory};
use native_model::{Identity, NativeRef};
use projection::ProjectedInstance;
use std::sync::Arc;

#[test]
fn test_root_namespace_lists_children() {
    let session = demo::session();
    let root = session.namespace("Demo").unwrap();

    let mut keys = root.as_object().unwrap().own_keys();
    keys.sort();
    assert_eq!(keys, vec!["Collections", "Devices", "Probes"]);
    assert_eq!(root.as_object().unwrap().class_name(), "Demo");
}

#[test]
fn test_nested_namespace_lookup() {
    let session = demo::session();
    let root = session.namespace("Demo").unwrap();

    let devices = root.get("Devices").unwrap();
    assert_eq!(devices.as_object().unwrap().class_name(), "Demo.Devices");
    assert_eq!(root.get("Kitchens").unwrap(), Value::Undefined);
    assert!(session.namespace("Demo.Devices").is_some());
    assert!(session.namespace("Dem").is_none());
    assert!(session.namespace("Elsewhere").is_none());
}

#[test]
fn test_namespace_members() {
    let session = demo::session();
    let devices = session.namespace("Demo.Devices").unwrap();

    assert_eq!(devices.as_object().unwrap().own_keys(), vec!["LampState", "Lamp"]);
}

#[test]
fn test_namespace_is_read_only() {
    let session = demo::session();
    let root = session.namespace("Demo").unwrap();

    let err = root.set("Devices", Value::Smi(1)).unwrap_err();
    assert_eq!(err.kind, ErrorKind::TypeError);
    assert!(root.get("Devices").unwrap().as_object().is_some());
}

#[test]
fn test_enumeration_values() {
    let session = demo::session();
    let state = session
        .namespace("Demo.Devices")
        .unwrap()
        .get("LampState")
        .unwrap();

    assert_eq!(state.get("off").unwrap(), Value::Smi(0));
    assert_eq!(state.get("on").unwrap(), Value::Smi(1));
    assert_eq!(state.get("broken").unwrap(), Value::Smi(-1));
    assert_eq!(state.get("dimmed").unwrap(), Value::Undefined);
    assert_eq!(
        state.as_object().unwrap().own_keys(),
        vec!["off", "on", "broken"]
    );
}

#[test]
fn test_enumeration_is_read_only() {
    let session = demo::session();
    let state = session
        .namespace("Demo.Devices")
        .unwrap()
        .get("LampState")
        .unwrap();

    let err = state.set("on", Value::Smi(7)).unwrap_err();
    assert_eq!(err.kind, ErrorKind::TypeError);
    assert_eq!(state.get("on").unwrap(), Value::Smi(1));
}

#[test]
fn test_class_reads_as_activation_factory() {
    let session = demo::session();
    let factory = session
        .namespace("Demo.Devices")
        .unwrap()
        .get("Lamp")
        .unwrap();

    let instance = ProjectedInstance::from_value(&factory).unwrap();
    assert_eq!(instance.interface_names(), vec!["IActivationFactory"]);
    assert!(instance.native().as_any().downcast_ref::<LampFactory>().is_some());
}

#[test]
fn test_activate_instance() {
    let session = demo::session();
    let factory = session
        .namespace("Demo.Devices")
        .unwrap()
        .get("Lamp")
        .unwrap();

    let lamp = factory.invoke("activateInstance", &[]).unwrap();
    assert_eq!(lamp.get("name").unwrap(), Value::string("Activated"));
    assert_eq!(lamp.as_object().unwrap().class_name(), "Demo.Devices.Lamp");

    let native = session.unwrap(&lamp).unwrap();
    assert!(native.as_any().downcast_ref::<Lamp>().is_some());
}

#[test]
fn test_activation_failure_is_native_error() {
    let session = demo::session();
    let err = session
        .namespace("Demo.Probes")
        .unwrap()
        .get("Probe")
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Error);
    assert_eq!(err.message, "Probe cannot be activated");
}

#[test]
fn test_activated_instance_shares_identity_cache() {
    let session = demo::session();
    let factory = session
        .namespace("Demo.Devices")
        .unwrap()
        .get("Lamp")
        .unwrap();

    let lamp = factory.invoke("activateInstance", &[]).unwrap();
    let native: NativeRef = session.unwrap(&lamp).unwrap();
    assert_eq!(session.project(Arc::clone(&native)).unwrap(), lamp);
    assert_eq!(
        ProjectedInstance::from_value(&lamp).unwrap().identity(),
        Identity::of(&native)
    );
}

#[test]
fn test_namespace_without_session_errors() {
    let namespace = {
        let session = demo::session();
        let namespace = session.namespace("Demo").unwrap();
        namespace
    };

    let err = namespace.get("Devices").unwrap_err();
    assert_eq!(err.kind, ErrorKind::InternalError);
    assert!(namespace.as_object().unwrap().own_keys().is_empty());
}
