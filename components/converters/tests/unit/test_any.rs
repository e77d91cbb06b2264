//! Unit tests for any-value conversions

use converters::{any_from_script, any_to_script, object_from_script, ObjectProjector, ResultConvertFn};
use core_types::{HostObject, JsError, PlainObject, Value};
use native_model::{AnyValue, AsyncInfo, Guid, NativeRef, PropertyType, Unknown};
use std::any::Any;
use std::sync::Arc;

struct Gadget;

impl Unknown for Gadget {
    fn interface_ids(&self) -> Vec<Guid> {
        Vec::new()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Projects native objects as a `Projected` object holding the reference.
struct TestProjector;

struct Projected(NativeRef);

impl HostObject for Projected {
    fn class_name(&self) -> &str {
        "Projected"
    }

    fn get(&self, _name: &str) -> Result<Value, JsError> {
        Ok(Value::Undefined)
    }

    fn set(&self, _name: &str, _value: Value) -> Result<(), JsError> {
        Ok(())
    }

    fn own_keys(&self) -> Vec<String> {
        Vec::new()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ObjectProjector for TestProjector {
    fn project(&self, obj: NativeRef) -> Result<Value, JsError> {
        Ok(Value::object(Projected(obj)))
    }

    fn unwrap(&self, value: &Value) -> Option<NativeRef> {
        let obj = value.as_object()?;
        obj.as_any()
            .downcast_ref::<Projected>()
            .map(|projected| Arc::clone(&projected.0))
    }

    fn project_async(
        &self,
        _operation: Arc<dyn AsyncInfo>,
        _convert: ResultConvertFn,
    ) -> Result<Value, JsError> {
        Err(JsError::internal("not supported"))
    }
}

#[test]
fn test_scalars_infer_tags() {
    let p = TestProjector;
    let cases = [
        (Value::Null, PropertyType::Empty),
        (Value::Boolean(true), PropertyType::Boolean),
        (Value::Smi(3), PropertyType::Int32),
        (Value::Double(0.5), PropertyType::Double),
        (Value::string("s"), PropertyType::String),
        (Value::Date(0.0), PropertyType::DateTime),
    ];
    for (value, tag) in cases {
        assert_eq!(any_from_script(&p, &value).unwrap().property_type(), tag);
    }
}

#[test]
fn test_arrays_infer_element_type() {
    let p = TestProjector;
    let ints = Value::array(vec![Value::Smi(1), Value::Smi(2)]);
    let doubles = Value::array(vec![Value::Smi(1), Value::Double(2.5)]);
    let mixed = Value::array(vec![Value::Smi(1), Value::string("x")]);
    assert!(matches!(any_from_script(&p, &ints).unwrap(), AnyValue::Int32Array(v) if v == [1, 2]));
    assert!(matches!(any_from_script(&p, &doubles).unwrap(), AnyValue::DoubleArray(v) if v == [1.0, 2.5]));
    assert!(any_from_script(&p, &mixed).is_err());
}

#[test]
fn test_typed_array_to_script() {
    let p = TestProjector;
    let value = any_to_script(&p, AnyValue::StringArray(vec!["a".into(), "b".into()])).unwrap();
    assert_eq!(value.get("length").unwrap(), Value::Smi(2));
    let empty = any_to_script(&p, AnyValue::Empty).unwrap();
    assert_eq!(empty, Value::Null);
}

#[test]
fn test_objects_go_through_projector() {
    let p = TestProjector;
    let gadget: NativeRef = Arc::new(Gadget);
    let script = any_to_script(&p, AnyValue::Object(Arc::clone(&gadget))).unwrap();
    let back = any_from_script(&p, &script).unwrap();
    assert!(Arc::ptr_eq(back.as_object().unwrap(), &gadget));

    let array = any_to_script(&p, AnyValue::ObjectArray(vec![Some(gadget), None])).unwrap();
    assert!(matches!(any_from_script(&p, &array).unwrap(), AnyValue::ObjectArray(v) if v.len() == 2 && v[1].is_none()));
}

#[test]
fn test_plain_object_is_not_native() {
    let p = TestProjector;
    let plain = PlainObject::new().into_value();
    assert!(any_from_script(&p, &plain).is_err());
    assert!(object_from_script(&p, &plain).is_err());
    assert!(object_from_script(&p, &Value::Null).unwrap().is_none());
}
