//! Unit tests for Value enum

use core_types::{NativeFunction, PlainObject, Value};
use num_bigint::BigInt;

mod value_creation_tests {
    use super::*;

    #[test]
    fn test_value_smi_bounds() {
        assert!(matches!(Value::number(f64::from(i32::MAX)), Value::Smi(n) if n == i32::MAX));
        assert!(matches!(Value::number(f64::from(i32::MIN)), Value::Smi(n) if n == i32::MIN));
        assert!(matches!(Value::number(f64::from(i32::MAX) + 1.0), Value::Double(_)));
    }

    #[test]
    fn test_value_string() {
        let val = Value::string("hello");
        assert_eq!(val.as_str(), Some("hello"));
    }

    #[test]
    fn test_value_array_length() {
        let val = Value::array(vec![Value::Smi(1), Value::Smi(2)]);
        assert_eq!(val.get("length").unwrap(), Value::Smi(2));
    }
}

mod truthiness_tests {
    use super::*;

    #[test]
    fn test_falsy_values() {
        assert!(!Value::Undefined.is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(!Value::Smi(0).is_truthy());
        assert!(!Value::Double(0.0).is_truthy());
        assert!(!Value::Double(f64::NAN).is_truthy());
        assert!(!Value::string("").is_truthy());
        assert!(!Value::BigInt(BigInt::from(0)).is_truthy());
    }

    #[test]
    fn test_truthy_values() {
        assert!(Value::Smi(-1).is_truthy());
        assert!(Value::Date(0.0).is_truthy());
        assert!(Value::array(vec![]).is_truthy());
        assert!(PlainObject::new().into_value().is_truthy());
    }
}

mod equality_tests {
    use super::*;

    #[test]
    fn test_arrays_compare_by_reference() {
        let a = Value::array(vec![Value::Smi(1)]);
        let b = Value::array(vec![Value::Smi(1)]);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_functions_compare_by_reference() {
        let f = NativeFunction::new("f", |_, _| Ok(Value::Undefined)).into_value();
        let g = NativeFunction::new("f", |_, _| Ok(Value::Undefined)).into_value();
        assert_eq!(f, f.clone());
        assert_ne!(f, g);
    }

    #[test]
    fn test_nan_is_not_equal_to_itself() {
        assert_ne!(Value::Double(f64::NAN), Value::Double(f64::NAN));
    }
}

mod display_tests {
    use super::*;

    #[test]
    fn test_display_numbers() {
        assert_eq!(Value::Double(1.5).to_string(), "1.5");
        assert_eq!(Value::Double(2.0).to_string(), "2");
        assert_eq!(Value::Double(f64::NEG_INFINITY).to_string(), "-Infinity");
    }

    #[test]
    fn test_display_objects_and_functions() {
        let obj = PlainObject::with_class("Calculator").into_value();
        assert_eq!(obj.to_string(), "[object Calculator]");
        let f = NativeFunction::new("add", |_, _| Ok(Value::Undefined)).into_value();
        assert_eq!(f.to_string(), "function add() { [native code] }");
    }

    #[test]
    fn test_display_bigint() {
        assert_eq!(Value::BigInt(BigInt::from(9_007_199_254_740_993_i64)).to_string(), "9007199254740993n");
    }
}

mod call_tests {
    use super::*;

    #[test]
    fn test_calling_non_function_is_type_error() {
        let err = Value::Smi(1).call(&Value::Undefined, &[]).unwrap_err();
        assert_eq!(err.kind, core_types::ErrorKind::TypeError);
        assert!(err.message.contains("is not a function"));
    }

    #[test]
    fn test_set_on_primitive_is_type_error() {
        assert!(Value::Smi(1).set("x", Value::Null).is_err());
    }
}
