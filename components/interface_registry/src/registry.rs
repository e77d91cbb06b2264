//! The global interface index.

use crate::activation::ACTIVATION_FACTORY;
use crate::interface::InterfaceDescriptor;
use crate::namespace::NamespaceTable;
use native_model::Guid;
use once_cell::sync::OnceCell;

/// Below this many entries `resolve` scans linearly.
const LINEAR_SCAN_THRESHOLD: usize = 8;

/// Maps interface identifiers to descriptors.
///
/// The sorted index is built on the first [`InterfaceRegistry::resolve`] from
/// every namespace table plus the hand-authored activation factory
/// interface, and is never rebuilt.
///
/// # Examples
///
/// ```
/// use interface_registry::{InterfaceDescriptor, InterfaceRegistry, NamespaceTable};
/// use native_model::{Guid, IID_ACTIVATION_FACTORY};
///
/// static ILAMP: InterfaceDescriptor = InterfaceDescriptor::new(Guid::from_u128(9), "Demo.ILamp");
/// static INTERFACES: [&InterfaceDescriptor; 1] = [&ILAMP];
/// static DEMO: NamespaceTable = NamespaceTable::new("Demo").with_interfaces(&INTERFACES);
///
/// let registry = InterfaceRegistry::new(vec![&DEMO]);
/// assert_eq!(registry.resolve(&Guid::from_u128(9)).unwrap().name, "Demo.ILamp");
/// assert!(registry.resolve(&IID_ACTIVATION_FACTORY).is_some());
/// assert!(registry.resolve(&Guid::from_u128(10)).is_none());
/// ```
pub struct InterfaceRegistry {
    namespaces: Vec<&'static NamespaceTable>,
    index: OnceCell<Vec<&'static InterfaceDescriptor>>,
}

impl InterfaceRegistry {
    /// Creates a registry over the given namespace tables.
    pub fn new(namespaces: Vec<&'static NamespaceTable>) -> Self {
        Self {
            namespaces,
            index: OnceCell::new(),
        }
    }

    fn index(&self) -> &[&'static InterfaceDescriptor] {
        self.index.get_or_init(|| {
            let mut index: Vec<&'static InterfaceDescriptor> = self
                .namespaces
                .iter()
                .flat_map(|ns| ns.interfaces.iter().copied())
                .collect();
            index.push(&ACTIVATION_FACTORY);
            index.sort_by_key(|d| d.iid);
            index.dedup_by_key(|d| d.iid);
            tracing::debug!(interfaces = index.len(), "built interface index");
            index
        })
    }

    /// Finds the descriptor of an interface. `None` means the capability is
    /// not supported, which callers treat as absent rather than as an error.
    pub fn resolve(&self, iid: &Guid) -> Option<&'static InterfaceDescriptor> {
        let index = self.index();
        if index.len() < LINEAR_SCAN_THRESHOLD {
            return index.iter().find(|d| d.iid == *iid).copied();
        }
        index
            .binary_search_by(|d| d.iid.cmp(iid))
            .ok()
            .map(|i| index[i])
    }

    /// True once the index was built.
    pub fn is_built(&self) -> bool {
        self.index.get().is_some()
    }

    /// Number of indexed interfaces.
    pub fn len(&self) -> usize {
        self.index().len()
    }

    /// True when nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.index().is_empty()
    }

    /// The namespace tables, in registration order.
    pub fn namespaces(&self) -> &[&'static NamespaceTable] {
        &self.namespaces
    }

    /// Finds a namespace table by its full name.
    pub fn namespace(&self, name: &str) -> Option<&'static NamespaceTable> {
        self.namespaces.iter().copied().find(|ns| ns.name == name)
    }
}

impl std::fmt::Debug for InterfaceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterfaceRegistry")
            .field("namespaces", &self.namespaces.len())
            .field("built", &self.is_built())
            .finish()
    }
}
