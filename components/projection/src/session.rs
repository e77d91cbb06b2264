//! Projection sessions.
//!
//! One session per script thread. The process-wide session table maps each
//! script thread to the [`Invoker`] of its event loop so native threads can
//! find their way back; the session itself lives in a thread-local and is
//! only touched on its own thread.

use crate::cache::InstanceCache;
use crate::config::{ProjectionConfig, WeakReferenceMode};
use crate::error::{contract_violation, ProjectionError};
use crate::events::EventRegistrar;
use crate::host::{RcHost, ScriptHost};
use crate::instance::{InstanceCore, ProjectedInstance};
use crate::namespace::NamespaceObject;
use async_runtime::{AsyncOperation, EventLoop, Invoker, OperationConverters};
use converters::{any_to_script, ObjectProjector, ResultConvertFn};
use core_types::{FunctionRef, JsError, ObjectRef, Value};
use interface_registry::{EventDescriptor, InterfaceRegistry};
use native_model::{query_identity, AsyncInfo, Identity, NativeRef};
use parking_lot::RwLock;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ops::Deref;
use std::rc::{Rc, Weak};
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::thread::{self, ThreadId};

static SESSIONS: Lazy<RwLock<HashMap<ThreadId, Invoker>>> = Lazy::new(|| RwLock::new(HashMap::new()));

thread_local! {
    static CURRENT: RefCell<Weak<ProjectionContext>> = RefCell::new(Weak::new());
}

/// The projection state of one script thread.
pub struct ProjectionContext {
    registry: &'static InterfaceRegistry,
    config: ProjectionConfig,
    event_loop: Rc<EventLoop>,
    host: Box<dyn ScriptHost>,
    cache: RefCell<InstanceCache>,
    events: RefCell<EventRegistrar>,
    closed: Cell<bool>,
    this: Weak<ProjectionContext>,
}

impl ProjectionContext {
    /// The calling thread's session.
    ///
    /// # Panics
    ///
    /// Using the projection on a thread without a session is a contract
    /// violation.
    pub fn current() -> Rc<ProjectionContext> {
        Self::try_current()
            .unwrap_or_else(|| contract_violation("projection used on a thread without a session"))
    }

    /// The calling thread's session, if it has one.
    pub fn try_current() -> Option<Rc<ProjectionContext>> {
        CURRENT.with(|current| current.borrow().upgrade())
    }

    /// The interface registry of this session.
    pub fn registry(&self) -> &'static InterfaceRegistry {
        self.registry
    }

    /// The session configuration.
    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// The script thread's event loop.
    pub fn event_loop(&self) -> &Rc<EventLoop> {
        &self.event_loop
    }

    /// Projects a native object.
    ///
    /// Native async operations become promise-like [`AsyncOperation`]s; every
    /// other object is projected through the identity cache.
    pub fn project(&self, obj: NativeRef) -> Result<Value, JsError> {
        match obj.as_async_info() {
            Some(operation) => self.project_async(operation, any_to_script),
            None => self.project_instance(obj),
        }
    }

    fn project_instance(&self, obj: NativeRef) -> Result<Value, JsError> {
        let canonical = query_identity(&obj);
        let identity = Identity::of_canonical(&canonical);
        let mut cache = self.cache.borrow_mut();
        cache.maybe_sweep();
        if let Some(wrapper) = cache.lookup(identity) {
            return Ok(wrapper);
        }

        let core = Rc::new(InstanceCore::new(
            canonical,
            identity,
            self.registry,
            self.this.clone(),
        ));
        let wrapper: ObjectRef = Rc::new(ProjectedInstance::new(Rc::clone(&core)));
        cache.insert(identity, &wrapper, &core, self.host.as_ref());
        tracing::debug!(%identity, class = wrapper.class_name(), "projected new instance");
        Ok(Value::Object(wrapper))
    }

    /// Wraps a native async operation whose result converts with `convert`.
    pub fn project_async(
        &self,
        operation: Arc<dyn AsyncInfo>,
        convert: ResultConvertFn,
    ) -> Result<Value, JsError> {
        let operation_object = self.project_instance(operation.as_object())?;
        let result_context = self.this.clone();
        let progress_context = self.this.clone();
        let converters = OperationConverters {
            result: Box::new(move |value| convert(&*upgrade(&result_context)?, value)),
            progress: Box::new(move |value| any_to_script(&*upgrade(&progress_context)?, value)),
        };
        AsyncOperation::start(&self.event_loop, operation, operation_object, converters)
    }

    /// The native object behind a projected wrapper.
    pub fn unwrap(&self, value: &Value) -> Option<NativeRef> {
        ProjectedInstance::from_value(value).map(|instance| Arc::clone(instance.native()))
    }

    /// The namespace object for `name`, when some namespace table lives at or
    /// below it.
    pub fn namespace(&self, name: &str) -> Option<Value> {
        NamespaceObject::exists(self.registry, name)
            .then(|| NamespaceObject::new(name, self.this.clone()).into_value())
    }

    /// True once the identity cache gave up on weak references.
    pub fn is_fallback_mode(&self) -> bool {
        self.cache.borrow().is_fallback()
    }

    /// Number of cached wrappers still alive.
    pub fn live_instances(&self) -> usize {
        self.cache.borrow().live_count()
    }

    /// Number of identity cache entries, including dead ones not yet swept.
    pub fn cache_entries(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Number of script listeners registered with native events.
    pub fn registered_listeners(&self) -> usize {
        self.events.borrow().listener_count()
    }

    /// Number of native objects with event registrations.
    pub fn event_entries(&self) -> usize {
        self.events.borrow().entry_count()
    }

    /// Sweeps the identity cache and the registration table now.
    pub fn sweep(&self) -> usize {
        let instances = self.cache.borrow_mut().sweep();
        let events = self.events.borrow_mut().sweep(&self.event_loop);
        instances + events
    }

    pub(crate) fn add_event_listener(
        &self,
        core: &InstanceCore,
        event: &'static EventDescriptor,
        listener: FunctionRef,
    ) -> Result<(), JsError> {
        if self.closed.get() {
            return Err(JsError::internal("projection session has ended"));
        }
        let context = upgrade(&self.this)?;
        let mut events = self.events.borrow_mut();
        events
            .registration(core.identity, &core.native, event, &self.event_loop)
            .add(&core.native, listener, &context)
    }

    pub(crate) fn remove_event_listener(
        &self,
        core: &InstanceCore,
        event: &'static EventDescriptor,
        listener: &FunctionRef,
    ) -> Result<(), JsError> {
        let mut events = self.events.borrow_mut();
        match events.existing(core.identity, event, &self.event_loop) {
            Some(registration) => registration.remove(&core.native, listener, &self.event_loop),
            None => Ok(()),
        }
    }

    fn teardown(&self) {
        self.closed.set(true);
        self.events.borrow_mut().unregister_all(&self.event_loop);
        self.cache.borrow_mut().clear();
    }
}

fn upgrade(context: &Weak<ProjectionContext>) -> Result<Rc<ProjectionContext>, JsError> {
    context
        .upgrade()
        .ok_or_else(|| JsError::internal("projection session has ended"))
}

impl ObjectProjector for ProjectionContext {
    fn project(&self, obj: NativeRef) -> Result<Value, JsError> {
        ProjectionContext::project(self, obj)
    }

    fn unwrap(&self, value: &Value) -> Option<NativeRef> {
        ProjectionContext::unwrap(self, value)
    }

    fn project_async(
        &self,
        operation: Arc<dyn AsyncInfo>,
        convert: ResultConvertFn,
    ) -> Result<Value, JsError> {
        ProjectionContext::project_async(self, operation, convert)
    }
}

impl std::fmt::Debug for ProjectionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectionContext")
            .field("thread", &self.event_loop.thread())
            .field("fallback", &self.is_fallback_mode())
            .field("cache_entries", &self.cache_entries())
            .field("listeners", &self.registered_listeners())
            .finish()
    }
}

/// Owner of a thread's projection session.
///
/// Created once per script-engine session by the module bootstrap. Dropping
/// it unregisters every remaining native event listener and removes the
/// thread from the session table.
///
/// # Examples
///
/// ```
/// use interface_registry::InterfaceRegistry;
/// use projection::{ProjectionConfig, ProjectionContext, Session};
/// use once_cell::sync::Lazy;
///
/// static REGISTRY: Lazy<InterfaceRegistry> = Lazy::new(|| InterfaceRegistry::new(vec![]));
///
/// let session = Session::initialize(&REGISTRY, ProjectionConfig::default()).unwrap();
/// assert!(ProjectionContext::try_current().is_some());
/// assert!(Session::invoker_for(std::thread::current().id()).is_some());
///
/// drop(session);
/// assert!(ProjectionContext::try_current().is_none());
/// ```
pub struct Session {
    context: Rc<ProjectionContext>,
}

impl Session {
    /// Initializes the calling thread's session with the in-process host.
    pub fn initialize(
        registry: &'static InterfaceRegistry,
        config: ProjectionConfig,
    ) -> Result<Self, ProjectionError> {
        Self::initialize_with_host(registry, config, Box::new(RcHost::new()))
    }

    /// Initializes the calling thread's session.
    ///
    /// The thread's current event loop is reused; one is created when the
    /// thread has none.
    pub fn initialize_with_host(
        registry: &'static InterfaceRegistry,
        config: ProjectionConfig,
        host: Box<dyn ScriptHost>,
    ) -> Result<Self, ProjectionError> {
        config.validate()?;
        let thread = thread::current().id();
        let event_loop = EventLoop::current().unwrap_or_else(EventLoop::new);
        {
            let mut sessions = SESSIONS.write();
            if sessions.contains_key(&thread) {
                return Err(ProjectionError::AlreadyInitialized);
            }
            sessions.insert(thread, event_loop.invoker());
        }

        let fallback = config.weak_references == WeakReferenceMode::Disabled;
        let context = Rc::new_cyclic(|this| ProjectionContext {
            registry,
            cache: RefCell::new(InstanceCache::new(config.instance_sweep_interval(), fallback)),
            events: RefCell::new(EventRegistrar::new(
                config.event_sweep_threshold,
                config.event_sweep_interval(),
            )),
            config,
            event_loop,
            host,
            closed: Cell::new(false),
            this: this.clone(),
        });
        CURRENT.with(|current| *current.borrow_mut() = Rc::downgrade(&context));
        tracing::debug!(?thread, "projection session initialized");
        Ok(Self { context })
    }

    /// The session's context.
    pub fn context(&self) -> &Rc<ProjectionContext> {
        &self.context
    }

    /// The invoker of the script thread `thread`, if it has a session.
    pub fn invoker_for(thread: ThreadId) -> Option<Invoker> {
        SESSIONS.read().get(&thread).cloned()
    }

    /// Number of threads with a live session.
    pub fn active_sessions() -> usize {
        SESSIONS.read().len()
    }
}

impl Deref for Session {
    type Target = ProjectionContext;

    fn deref(&self) -> &ProjectionContext {
        &self.context
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.context.teardown();
        let thread = self.context.event_loop.thread();
        SESSIONS.write().remove(&thread);
        CURRENT.with(|current| *current.borrow_mut() = Weak::new());
        tracing::debug!(?thread, "projection session torn down");
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Session").field(&self.context).finish()
    }
}
