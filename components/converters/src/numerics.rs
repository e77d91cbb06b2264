//! Vector and matrix conversions.
//!
//! Struct-shaped values project as plain objects with one number property per
//! field; converting back requires every field to be a number.

use crate::primitive::number_of;
use crate::{FromScript, ToScript};
use core_types::{JsError, PlainObject, Value};
use native_model::{Matrix3x2, Matrix4x4, Vector2, Vector3, Vector4};

fn fields_to_script(names: &[&str], values: &[f32]) -> Value {
    let obj = PlainObject::new();
    for (name, value) in names.iter().zip(values) {
        obj.insert(*name, Value::number(f64::from(*value)));
    }
    obj.into_value()
}

fn field(value: &Value, name: &str) -> Result<f32, JsError> {
    if value.as_object().is_none() {
        return Err(JsError::type_error(format!(
            "Expected an object with field '{}', got {}",
            name,
            value.type_of()
        )));
    }
    let field = value.get(name)?;
    number_of(&field)
        .map(|n| n as f32)
        .map_err(|_| JsError::type_error(format!("Field '{}' must be a number", name)))
}

impl ToScript for Vector2 {
    fn to_script(&self) -> Value {
        fields_to_script(&["x", "y"], &[self.x, self.y])
    }
}

impl FromScript for Vector2 {
    fn from_script(value: &Value) -> Result<Self, JsError> {
        Ok(Vector2 {
            x: field(value, "x")?,
            y: field(value, "y")?,
        })
    }
}

impl ToScript for Vector3 {
    fn to_script(&self) -> Value {
        fields_to_script(&["x", "y", "z"], &[self.x, self.y, self.z])
    }
}

impl FromScript for Vector3 {
    fn from_script(value: &Value) -> Result<Self, JsError> {
        Ok(Vector3 {
            x: field(value, "x")?,
            y: field(value, "y")?,
            z: field(value, "z")?,
        })
    }
}

impl ToScript for Vector4 {
    fn to_script(&self) -> Value {
        fields_to_script(&["x", "y", "z", "w"], &[self.x, self.y, self.z, self.w])
    }
}

impl FromScript for Vector4 {
    fn from_script(value: &Value) -> Result<Self, JsError> {
        Ok(Vector4 {
            x: field(value, "x")?,
            y: field(value, "y")?,
            z: field(value, "z")?,
            w: field(value, "w")?,
        })
    }
}

impl ToScript for Matrix3x2 {
    fn to_script(&self) -> Value {
        fields_to_script(&Matrix3x2::FIELDS, &self.to_array())
    }
}

impl FromScript for Matrix3x2 {
    fn from_script(value: &Value) -> Result<Self, JsError> {
        let mut m = [0.0_f32; 6];
        for (slot, name) in m.iter_mut().zip(Matrix3x2::FIELDS) {
            *slot = field(value, name)?;
        }
        Ok(Matrix3x2::from_array(m))
    }
}

impl ToScript for Matrix4x4 {
    fn to_script(&self) -> Value {
        fields_to_script(&Matrix4x4::FIELDS, &self.to_array())
    }
}

impl FromScript for Matrix4x4 {
    fn from_script(value: &Value) -> Result<Self, JsError> {
        let mut m = [0.0_f32; 16];
        for (slot, name) in m.iter_mut().zip(Matrix4x4::FIELDS) {
            *slot = field(value, name)?;
        }
        Ok(Matrix4x4::from_array(m))
    }
}
