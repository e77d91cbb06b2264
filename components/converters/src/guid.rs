//! Unique-ID conversions.

use crate::primitive::expected;
use crate::{FromScript, ToScript};
use core_types::{JsError, Value};
use native_model::Guid;
use uuid::Uuid;

/// Parses a unique ID in the 36-character hyphenated form
/// (`xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`) or the 38-character braced form
/// (`{xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx}`). Strings of any other length are
/// type errors.
///
/// ```
/// use converters::parse_guid;
///
/// let plain = parse_guid("6f1d3a2b-0c4e-4f5a-9b8c-7d6e5f4a3b2c").unwrap();
/// let braced = parse_guid("{6F1D3A2B-0C4E-4F5A-9B8C-7D6E5F4A3B2C}").unwrap();
/// assert_eq!(plain, braced);
/// assert!(parse_guid("6f1d3a2b0c4e4f5a9b8c7d6e5f4a3b2c").is_err());
/// ```
pub fn parse_guid(s: &str) -> Result<Guid, JsError> {
    let hyphenated = match s.len() {
        36 => s,
        38 if s.starts_with('{') && s.ends_with('}') => &s[1..37],
        _ => return Err(invalid_guid(s)),
    };
    Uuid::try_parse(hyphenated)
        .map(|uuid| Guid::from_uuid(&uuid))
        .map_err(|_| invalid_guid(s))
}

fn invalid_guid(s: &str) -> JsError {
    JsError::type_error(format!("'{}' is not a valid GUID", s))
}

impl ToScript for Guid {
    fn to_script(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl FromScript for Guid {
    fn from_script(value: &Value) -> Result<Self, JsError> {
        match value {
            Value::String(s) => parse_guid(s),
            other => Err(expected("GUID string", other)),
        }
    }
}
