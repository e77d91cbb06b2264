//! Interface descriptors and their lazily built member tables.

use crate::descriptor::{EventDescriptor, MethodDescriptor, PropertyDescriptor, RuntimeMembers};
use native_model::Guid;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::fmt;

/// Name-keyed lookup tables built from an interface's static member arrays.
#[derive(Debug, Default)]
pub struct MemberTables {
    properties: HashMap<&'static str, usize>,
    events: HashMap<&'static str, usize>,
    /// Method indices ordered by name; overloads of one name are contiguous
    /// and keep their declaration order.
    methods_by_name: Vec<usize>,
}

/// The generated description of one interface.
///
/// Declared as a `static`; member tables are built on the first query
/// against the interface.
///
/// # Examples
///
/// ```
/// use core_types::Value;
/// use interface_registry::{CallContext, InterfaceDescriptor, MethodDescriptor};
/// use native_model::Guid;
///
/// fn ping(_ctx: &CallContext<'_>, _args: &[Value]) -> Result<Value, core_types::JsError> {
///     Ok(Value::string("pong"))
/// }
///
/// static METHODS: [MethodDescriptor; 1] = [MethodDescriptor::new("ping", 0, ping)];
/// static IPING: InterfaceDescriptor =
///     InterfaceDescriptor::new(Guid::from_u128(7), "Demo.IPing").with_methods(&METHODS);
///
/// assert!(!IPING.is_initialized());
/// assert_eq!(IPING.methods_named("ping").count(), 1);
/// assert!(IPING.is_initialized());
/// ```
pub struct InterfaceDescriptor {
    /// Interface identifier
    pub iid: Guid,
    /// Fully-qualified interface name
    pub name: &'static str,
    properties: &'static [PropertyDescriptor],
    methods: &'static [MethodDescriptor],
    events: &'static [EventDescriptor],
    runtime_members: Option<RuntimeMembers>,
    tables: OnceCell<MemberTables>,
}

impl InterfaceDescriptor {
    /// An interface with no members.
    pub const fn new(iid: Guid, name: &'static str) -> Self {
        Self {
            iid,
            name,
            properties: &[],
            methods: &[],
            events: &[],
            runtime_members: None,
            tables: OnceCell::new(),
        }
    }

    /// Sets the property table. Property names are unique.
    pub const fn with_properties(mut self, properties: &'static [PropertyDescriptor]) -> Self {
        self.properties = properties;
        self
    }

    /// Sets the method table. Overloads share a name.
    pub const fn with_methods(mut self, methods: &'static [MethodDescriptor]) -> Self {
        self.methods = methods;
        self
    }

    /// Sets the event table. Event names are unique.
    pub const fn with_events(mut self, events: &'static [EventDescriptor]) -> Self {
        self.events = events;
        self
    }

    /// Sets the runtime member handler.
    pub const fn with_runtime_members(mut self, handler: RuntimeMembers) -> Self {
        self.runtime_members = Some(handler);
        self
    }

    /// Builds the member tables if they have not been built yet.
    pub fn ensure_initialized(&self) -> &MemberTables {
        self.tables.get_or_init(|| {
            tracing::debug!(interface = self.name, "building member tables");
            let properties = self
                .properties
                .iter()
                .enumerate()
                .map(|(i, p)| (p.name, i))
                .collect();
            let events = self
                .events
                .iter()
                .enumerate()
                .map(|(i, e)| (e.name, i))
                .collect();
            let mut methods_by_name: Vec<usize> = (0..self.methods.len()).collect();
            methods_by_name.sort_by_key(|&i| self.methods[i].name);
            MemberTables {
                properties,
                events,
                methods_by_name,
            }
        })
    }

    /// True once the member tables were built.
    pub fn is_initialized(&self) -> bool {
        self.tables.get().is_some()
    }

    /// Looks up a property by name.
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        let index = *self.ensure_initialized().properties.get(name)?;
        Some(&self.properties[index])
    }

    /// All overloads named `name`, in declaration order.
    pub fn methods_named<'s>(
        &'s self,
        name: &str,
    ) -> impl Iterator<Item = &'s MethodDescriptor> + 's {
        let order = &self.ensure_initialized().methods_by_name;
        let start = order.partition_point(|&i| self.methods[i].name < name);
        let end = start + order[start..].partition_point(|&i| self.methods[i].name == name);
        order[start..end].iter().map(move |&i| &self.methods[i])
    }

    /// Looks up an event by name.
    pub fn event(&self, name: &str) -> Option<&EventDescriptor> {
        let index = *self.ensure_initialized().events.get(name)?;
        Some(&self.events[index])
    }

    /// All properties, in declaration order.
    pub fn properties(&self) -> &[PropertyDescriptor] {
        self.properties
    }

    /// All methods, in declaration order.
    pub fn methods(&self) -> &[MethodDescriptor] {
        self.methods
    }

    /// All events, in declaration order.
    pub fn events(&self) -> &[EventDescriptor] {
        self.events
    }

    /// True when the interface declares at least one event.
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// The runtime member handler, if the interface has dynamic members.
    pub fn runtime_members(&self) -> Option<&RuntimeMembers> {
        self.runtime_members.as_ref()
    }
}

impl fmt::Debug for InterfaceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceDescriptor")
            .field("iid", &self.iid)
            .field("name", &self.name)
            .field("properties", &self.properties.len())
            .field("methods", &self.methods.len())
            .field("events", &self.events.len())
            .finish()
    }
}
