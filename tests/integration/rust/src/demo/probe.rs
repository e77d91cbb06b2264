//! `Demo.Probes.Probe`: one read-write property per value type.

use converters::{char16_from_script, char16_to_script, parse_guid, FromScript, ToScript};
use core_types::{JsError, Value};
use interface_registry::{
    CallContext, ClassDescriptor, InterfaceDescriptor, MethodDescriptor, NamespaceTable,
    PropertyDescriptor,
};
use native_model::{
    DateTime, Guid, Matrix3x2, Matrix4x4, NativeError, NativeRef, TimeSpan, Unknown, Vector2,
    Vector3, Vector4,
};
use parking_lot::Mutex;
use std::any::Any;
use std::sync::Arc;

/// `Demo.Probes.IProbe`
pub const IID_IPROBE: Guid = Guid::from_u128(0x3d5a_6c10_9b1e_4a7f_8e21_0000_0000_0010);

/// Stores whatever script assigns to it.
#[derive(Default)]
pub struct Probe {
    flag: Mutex<bool>,
    letter: Mutex<u16>,
    id: Mutex<Guid>,
    when: Mutex<DateTime>,
    duration: Mutex<TimeSpan>,
    v2: Mutex<Vector2>,
    v3: Mutex<Vector3>,
    v4: Mutex<Vector4>,
    m32: Mutex<Matrix3x2>,
    m44: Mutex<Matrix4x4>,
    big: Mutex<i64>,
}

impl Probe {
    /// A probe with every field at its default.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The stored unique ID.
    pub fn id(&self) -> Guid {
        *self.id.lock()
    }

    /// The stored character.
    pub fn letter(&self) -> u16 {
        *self.letter.lock()
    }
}

impl Unknown for Probe {
    fn interface_ids(&self) -> Vec<Guid> {
        vec![IID_IPROBE]
    }

    fn runtime_class_name(&self) -> Option<String> {
        Some("Demo.Probes.Probe".to_string())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

macro_rules! probe_property {
    ($get:ident, $put:ident, $field:ident, $ty:ty) => {
        fn $get(ctx: &CallContext<'_>) -> Result<Value, JsError> {
            Ok(ctx.target::<Probe>()?.$field.lock().to_script())
        }

        fn $put(ctx: &CallContext<'_>, value: &Value) -> Result<(), JsError> {
            let value = <$ty>::from_script(value)?;
            *ctx.target::<Probe>()?.$field.lock() = value;
            Ok(())
        }
    };
}

probe_property!(get_flag, put_flag, flag, bool);
probe_property!(get_id, put_id, id, Guid);
probe_property!(get_when, put_when, when, DateTime);
probe_property!(get_duration, put_duration, duration, TimeSpan);
probe_property!(get_v2, put_v2, v2, Vector2);
probe_property!(get_v3, put_v3, v3, Vector3);
probe_property!(get_v4, put_v4, v4, Vector4);
probe_property!(get_m32, put_m32, m32, Matrix3x2);
probe_property!(get_m44, put_m44, m44, Matrix4x4);
probe_property!(get_big, put_big, big, i64);

fn get_letter(ctx: &CallContext<'_>) -> Result<Value, JsError> {
    Ok(char16_to_script(*ctx.target::<Probe>()?.letter.lock()))
}

fn put_letter(ctx: &CallContext<'_>, value: &Value) -> Result<(), JsError> {
    let letter = char16_from_script(value)?;
    *ctx.target::<Probe>()?.letter.lock() = letter;
    Ok(())
}

fn parse_id(_ctx: &CallContext<'_>, args: &[Value]) -> Result<Value, JsError> {
    let text = String::from_script(&args[0])?;
    Ok(parse_guid(&text)?.to_script())
}

static PROPERTIES: [PropertyDescriptor; 11] = [
    PropertyDescriptor::read_write("flag", get_flag, put_flag),
    PropertyDescriptor::read_write("letter", get_letter, put_letter),
    PropertyDescriptor::read_write("id", get_id, put_id),
    PropertyDescriptor::read_write("when", get_when, put_when),
    PropertyDescriptor::read_write("duration", get_duration, put_duration),
    PropertyDescriptor::read_write("v2", get_v2, put_v2),
    PropertyDescriptor::read_write("v3", get_v3, put_v3),
    PropertyDescriptor::read_write("v4", get_v4, put_v4),
    PropertyDescriptor::read_write("m32", get_m32, put_m32),
    PropertyDescriptor::read_write("m44", get_m44, put_m44),
    PropertyDescriptor::read_write("big", get_big, put_big),
];

static METHODS: [MethodDescriptor; 1] = [MethodDescriptor::new("parseId", 1, parse_id)];

static IPROBE: InterfaceDescriptor = InterfaceDescriptor::new(IID_IPROBE, "Demo.Probes.IProbe")
    .with_properties(&PROPERTIES)
    .with_methods(&METHODS);

static INTERFACES: [&InterfaceDescriptor; 1] = [&IPROBE];

fn probe_factory() -> Result<NativeRef, NativeError> {
    Err(NativeError::new(
        native_model::HResult::E_NOTIMPL,
        "Probe cannot be activated",
    ))
}

static CLASSES: [ClassDescriptor; 1] = [ClassDescriptor {
    name: "Probe",
    factory: probe_factory,
}];

pub(super) static NAMESPACE: NamespaceTable = NamespaceTable::new("Demo.Probes")
    .with_interfaces(&INTERFACES)
    .with_classes(&CLASSES);
