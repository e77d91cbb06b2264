//! Script value representation.
//!
//! This module provides the core `Value` enum that represents every value a
//! projected native object can hand to, or receive from, the script engine.
//! Heap values (objects, functions, arrays) are reference counted; dropping the
//! last script reference is what "collection" means for a wrapper.

use crate::object::{Callable, HostObject};
use crate::JsError;
use num_bigint::BigInt;
use num_traits::Zero;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Reference to a script-visible object.
pub type ObjectRef = Rc<dyn HostObject>;

/// Reference to a script-callable function.
pub type FunctionRef = Rc<dyn Callable>;

/// Reference to a script array.
pub type ArrayRef = Rc<RefCell<Vec<Value>>>;

/// Largest integer a script number represents exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;

/// Represents any script value.
///
/// Small integers are stored as [`Value::Smi`]; every other number is a
/// [`Value::Double`]. Use [`Value::number`] to pick the right variant.
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// let undefined = Value::Undefined;
/// let number = Value::Smi(42);
/// let float = Value::Double(3.14);
///
/// assert!(!undefined.is_truthy());
/// assert!(number.is_truthy());
/// assert_eq!(float.type_of(), "number");
/// ```
#[derive(Clone)]
pub enum Value {
    /// Script undefined value
    Undefined,
    /// Script null value
    Null,
    /// Script boolean (true or false)
    Boolean(bool),
    /// Small integer (fits in 32 bits)
    Smi(i32),
    /// IEEE 754 double-precision floating point
    Double(f64),
    /// Script string value
    String(String),
    /// Script string whose UTF-16 units are not valid Unicode (it holds a
    /// lone surrogate). Built only through [`Value::from_utf16`], so a
    /// string is never represented both ways.
    Utf16(Rc<[u16]>),
    /// Arbitrary precision integer
    BigInt(BigInt),
    /// Date, as milliseconds since the Unix epoch (may carry a fraction)
    Date(f64),
    /// Script array
    Array(ArrayRef),
    /// Script object (plain objects, projected wrappers, promises)
    Object(ObjectRef),
    /// Callable function
    Function(FunctionRef),
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Undefined"),
            Value::Null => write!(f, "Null"),
            Value::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Value::Smi(n) => f.debug_tuple("Smi").field(n).finish(),
            Value::Double(n) => f.debug_tuple("Double").field(n).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::Utf16(units) => f.debug_tuple("Utf16").field(&units).finish(),
            Value::BigInt(n) => f.debug_tuple("BigInt").field(n).finish(),
            Value::Date(ms) => f.debug_tuple("Date").field(ms).finish(),
            Value::Array(items) => f.debug_tuple("Array").field(&items.borrow()).finish(),
            Value::Object(obj) => write!(f, "Object({})", obj.class_name()),
            Value::Function(func) => write!(f, "Function({})", func.name()),
        }
    }
}

/// Equality is strict equality for primitives and reference equality for
/// arrays, objects and functions.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Smi(a), Value::Smi(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Smi(a), Value::Double(b)) | (Value::Double(b), Value::Smi(a)) => {
                f64::from(*a) == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Utf16(a), Value::Utf16(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
            (Value::Function(a), Value::Function(b)) => {
                std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl Value {
    /// Creates a number, using the small-integer form when it is exact.
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// assert!(matches!(Value::number(7.0), Value::Smi(7)));
    /// assert!(matches!(Value::number(0.5), Value::Double(_)));
    /// assert!(matches!(Value::number(-0.0), Value::Double(_)));
    /// ```
    pub fn number(n: f64) -> Self {
        if n.fract() == 0.0
            && n >= f64::from(i32::MIN)
            && n <= f64::from(i32::MAX)
            && !(n == 0.0 && n.is_sign_negative())
        {
            Value::Smi(n as i32)
        } else {
            Value::Double(n)
        }
    }

    /// Creates a string value.
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Creates a string from UTF-16 units. Valid Unicode becomes an ordinary
    /// [`Value::String`]; units with lone surrogates are kept as they are.
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// assert_eq!(Value::from_utf16(&[0x41, 0x42]), Value::string("AB"));
    /// assert!(matches!(Value::from_utf16(&[0xD800]), Value::Utf16(_)));
    /// assert_eq!(Value::from_utf16(&[0xD800]).to_utf16(), Some(vec![0xD800]));
    /// ```
    pub fn from_utf16(units: &[u16]) -> Self {
        match String::from_utf16(units) {
            Ok(s) => Value::String(s),
            Err(_) => Value::Utf16(units.into()),
        }
    }

    /// Creates a new array value from its elements.
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    /// Creates an object value from a host object.
    pub fn object<T: HostObject + 'static>(obj: T) -> Self {
        Value::Object(Rc::new(obj))
    }

    /// Returns whether this value is truthy in script semantics.
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// assert!(!Value::Undefined.is_truthy());
    /// assert!(!Value::Null.is_truthy());
    /// assert!(!Value::Smi(0).is_truthy());
    /// assert!(!Value::Double(f64::NAN).is_truthy());
    /// assert!(Value::string("x").is_truthy());
    /// ```
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Smi(n) => *n != 0,
            Value::Double(n) => !n.is_nan() && *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Utf16(units) => !units.is_empty(),
            Value::BigInt(n) => !n.is_zero(),
            Value::Date(_) | Value::Array(_) | Value::Object(_) | Value::Function(_) => true,
        }
    }

    /// Returns the script `typeof` result for this value.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Boolean(_) => "boolean",
            Value::Smi(_) | Value::Double(_) => "number",
            Value::String(_) | Value::Utf16(_) => "string",
            Value::BigInt(_) => "bigint",
            Value::Date(_) | Value::Array(_) | Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    /// Returns true for `undefined` and `null`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Numeric view of `Smi` and `Double` values.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Smi(n) => Some(f64::from(*n)),
            Value::Double(n) => Some(*n),
            _ => None,
        }
    }

    /// String view of string values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The UTF-16 units of either string form.
    pub fn to_utf16(&self) -> Option<Vec<u16>> {
        match self {
            Value::String(s) => Some(s.encode_utf16().collect()),
            Value::Utf16(units) => Some(units.to_vec()),
            _ => None,
        }
    }

    /// The object behind an object value.
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// The function behind a function value.
    pub fn as_function(&self) -> Option<&FunctionRef> {
        match self {
            Value::Function(func) => Some(func),
            _ => None,
        }
    }

    /// Reads a named property; non-objects have no properties.
    pub fn get(&self, name: &str) -> Result<Value, JsError> {
        match self {
            Value::Object(obj) => obj.get(name),
            Value::Array(items) if name == "length" => {
                Ok(Value::number(items.borrow().len() as f64))
            }
            _ => Ok(Value::Undefined),
        }
    }

    /// Writes a named property on an object value.
    pub fn set(&self, name: &str, value: Value) -> Result<(), JsError> {
        match self {
            Value::Object(obj) => obj.set(name, value),
            _ => Err(JsError::type_error(format!(
                "Cannot set property '{}' on {}",
                name,
                self.type_of()
            ))),
        }
    }

    /// Calls this value as a function.
    pub fn call(&self, this: &Value, args: &[Value]) -> Result<Value, JsError> {
        match self {
            Value::Function(func) => func.call(this, args),
            other => Err(JsError::type_error(format!("{} is not a function", other))),
        }
    }

    /// Looks up `name` on this value and calls it with this value as receiver.
    pub fn invoke(&self, name: &str, args: &[Value]) -> Result<Value, JsError> {
        match self.get(name)? {
            Value::Function(func) => func.call(self, args),
            _ => Err(JsError::type_error(format!("{} is not a function", name))),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Smi(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// Script `String()` conversion.
///
/// ```
/// use core_types::Value;
///
/// assert_eq!(Value::Undefined.to_string(), "undefined");
/// assert_eq!(Value::Null.to_string(), "null");
/// assert_eq!(Value::Boolean(true).to_string(), "true");
/// assert_eq!(Value::Smi(42).to_string(), "42");
/// ```
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Smi(n) => write!(f, "{}", n),
            Value::Double(n) => {
                if n.is_nan() {
                    write!(f, "NaN")
                } else if n.is_infinite() {
                    if n.is_sign_positive() {
                        write!(f, "Infinity")
                    } else {
                        write!(f, "-Infinity")
                    }
                } else if n.fract() == 0.0 && n.abs() < 1e15 {
                    // Integer-valued doubles display without decimal point
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => write!(f, "{}", s),
            Value::Utf16(units) => write!(f, "{}", String::from_utf16_lossy(units)),
            Value::BigInt(n) => write!(f, "{}n", n),
            Value::Date(ms) => write!(f, "[Date {}]", ms),
            Value::Array(items) => {
                let items = items.borrow();
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", parts.join(","))
            }
            Value::Object(obj) => write!(f, "[object {}]", obj.class_name()),
            Value::Function(func) => write!(f, "function {}() {{ [native code] }}", func.name()),
        }
    }
}
