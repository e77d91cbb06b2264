//! The hand-authored activation factory interface.
//!
//! Every runtime class is reached through its activation factory. The factory
//! contract is part of the platform rather than of any metadata file, so its
//! descriptor is written here instead of being generated.

use crate::descriptor::{CallContext, MethodDescriptor};
use crate::interface::InterfaceDescriptor;
use converters::{native_error, object_to_script};
use core_types::{JsError, Value};
use native_model::IID_ACTIVATION_FACTORY;

fn activate_instance(ctx: &CallContext<'_>, _args: &[Value]) -> Result<Value, JsError> {
    let factory = ctx.target.as_activation_factory().ok_or_else(|| {
        JsError::type_error("Object does not implement the activation factory interface")
    })?;
    let instance = factory.activate_instance().map_err(|e| native_error(&e))?;
    object_to_script(ctx.projector, Some(instance))
}

static METHODS: [MethodDescriptor; 1] = [MethodDescriptor::new("activateInstance", 0, activate_instance)];

/// Descriptor of the activation factory interface.
pub static ACTIVATION_FACTORY: InterfaceDescriptor =
    InterfaceDescriptor::new(IID_ACTIVATION_FACTORY, "IActivationFactory").with_methods(&METHODS);
