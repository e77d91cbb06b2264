//! Reference-counted native objects and their identity.
//!
//! A native object may be reachable through several references that are not
//! pointer-equal (one per interface it hands out). Only the canonical identity
//! reference, obtained with [`query_identity`], is comparable.

use crate::{AsyncInfo, Guid, NativeError};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Strong reference to a native object.
pub type NativeRef = Arc<dyn Unknown>;

/// The root contract of every native object.
pub trait Unknown: Any + Send + Sync {
    /// Same-identity query.
    ///
    /// Secondary interface references return the canonical object; the
    /// canonical object itself returns `None`.
    fn identity(&self) -> Option<NativeRef> {
        None
    }

    /// Identifiers of the interfaces this object implements, in the order the
    /// object reports them.
    fn interface_ids(&self) -> Vec<Guid>;

    /// Fully-qualified runtime class name, when the object has one.
    fn runtime_class_name(&self) -> Option<String> {
        None
    }

    /// The async-operation view of this object, for objects that are native
    /// async operations.
    fn as_async_info(&self) -> Option<Arc<dyn AsyncInfo>> {
        None
    }

    /// The activation-factory view of this object, for class factories.
    fn as_activation_factory(&self) -> Option<&dyn ActivationFactory> {
        None
    }

    /// Typed access for generated accessor thunks.
    fn as_any(&self) -> &dyn Any;
}

/// Interface identifier of the root activation factory contract.
pub const IID_ACTIVATION_FACTORY: Guid =
    Guid::from_u128(0x0000_0035_0000_0000_c000_0000_0000_0046);

/// The root factory contract: creates default-constructed instances of a
/// runtime class.
pub trait ActivationFactory: Send + Sync {
    /// Creates a new instance.
    fn activate_instance(&self) -> Result<NativeRef, NativeError>;
}

/// Returns the canonical identity reference of `obj`.
pub fn query_identity(obj: &NativeRef) -> NativeRef {
    match obj.identity() {
        Some(canonical) => canonical,
        None => Arc::clone(obj),
    }
}

/// Casts a native object to its concrete implementation type.
///
/// ```
/// use native_model::{cast, Guid, NativeRef, Unknown};
/// use std::any::Any;
/// use std::sync::Arc;
///
/// struct Lamp;
/// impl Unknown for Lamp {
///     fn interface_ids(&self) -> Vec<Guid> { vec![] }
///     fn as_any(&self) -> &dyn Any { self }
/// }
///
/// let obj: NativeRef = Arc::new(Lamp);
/// assert!(cast::<Lamp>(&obj).is_ok());
/// ```
pub fn cast<T: Any>(obj: &NativeRef) -> Result<&T, NativeError> {
    obj.as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| NativeError::no_interface(std::any::type_name::<T>()))
}

/// Address of a canonical identity reference, used as a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(usize);

impl Identity {
    /// Performs the same-identity query and takes the address of the result.
    pub fn of(obj: &NativeRef) -> Self {
        Self::of_canonical(&query_identity(obj))
    }

    /// Address of a reference that is already canonical.
    pub fn of_canonical(canonical: &NativeRef) -> Self {
        Identity(Arc::as_ptr(canonical) as *const () as usize)
    }

    /// The raw address.
    pub fn address(&self) -> usize {
        self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
