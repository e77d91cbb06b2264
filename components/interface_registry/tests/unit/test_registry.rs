//! Unit tests for the interface index

use interface_registry::{
    ClassDescriptor, EnumDescriptor, InterfaceDescriptor, InterfaceRegistry, NamespaceTable,
    ACTIVATION_FACTORY,
};
use native_model::{Guid, NativeError, NativeRef, IID_ACTIVATION_FACTORY};

macro_rules! interfaces {
    ($($name:ident = $iid:expr),* $(,)?) => {
        $(static $name: InterfaceDescriptor = InterfaceDescriptor::new(Guid::from_u128($iid), stringify!($name));)*
    };
}

interfaces! {
    I1 = 0x50, I2 = 0x10, I3 = 0x40, I4 = 0x30, I5 = 0x20,
    I6 = 0x90, I7 = 0x80, I8 = 0x70, I9 = 0x60, I10 = 0xA0,
}

static FIRST: [&InterfaceDescriptor; 5] = [&I1, &I2, &I3, &I4, &I5];
static SECOND: [&InterfaceDescriptor; 5] = [&I6, &I7, &I8, &I9, &I10];

fn no_factory() -> Result<NativeRef, NativeError> {
    Err(NativeError::new(native_model::HResult::E_NOTIMPL, "no factory"))
}

static COLORS: [EnumDescriptor; 1] = [EnumDescriptor {
    name: "Color",
    members: &[("red", 0), ("green", 1), ("blue", 2)],
}];

static CLASSES: [ClassDescriptor; 1] = [ClassDescriptor {
    name: "Palette",
    factory: no_factory,
}];

static NS_ONE: NamespaceTable = NamespaceTable::new("Test.One")
    .with_interfaces(&FIRST)
    .with_enums(&COLORS)
    .with_classes(&CLASSES);

static NS_TWO: NamespaceTable = NamespaceTable::new("Test.Two").with_interfaces(&SECOND);

#[test]
fn test_index_is_lazy() {
    let registry = InterfaceRegistry::new(vec![&NS_ONE, &NS_TWO]);
    assert!(!registry.is_built());
    registry.resolve(&Guid::from_u128(0x10));
    assert!(registry.is_built());
}

#[test]
fn test_binary_search_over_all_namespaces() {
    let registry = InterfaceRegistry::new(vec![&NS_ONE, &NS_TWO]);
    assert_eq!(registry.len(), 11);
    for (iid, name) in [(0x10, "I2"), (0x50, "I1"), (0xA0, "I10"), (0x60, "I9")] {
        assert_eq!(registry.resolve(&Guid::from_u128(iid)).unwrap().name, name);
    }
    assert!(registry.resolve(&Guid::from_u128(0x55)).is_none());
}

#[test]
fn test_activation_factory_is_always_indexed() {
    let registry = InterfaceRegistry::new(Vec::new());
    let factory = registry.resolve(&IID_ACTIVATION_FACTORY).unwrap();
    assert!(std::ptr::eq(factory, &ACTIVATION_FACTORY));
    assert_eq!(factory.methods_named("activateInstance").next().unwrap().arity, 0);
}

#[test]
fn test_namespace_lookup() {
    let registry = InterfaceRegistry::new(vec![&NS_ONE, &NS_TWO]);
    let ns = registry.namespace("Test.One").unwrap();
    assert_eq!(ns.enumeration("Color").unwrap().value("blue"), Some(2));
    assert!(ns.class("Palette").is_some());
    assert!(registry.namespace("Test.Three").is_none());
}
