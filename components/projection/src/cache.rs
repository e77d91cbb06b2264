//! Identity cache: at most one live wrapper per native identity.

use crate::host::ScriptHost;
use crate::instance::{InstanceCore, ProjectedInstance};
use core_types::{HostObject, ObjectRef, Value};
use native_model::Identity;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

enum CacheEntry {
    /// Engine weak reference to the wrapper.
    Wrapper(Weak<dyn HostObject>),
    /// Fallback mode: weak reference to the wrapper's core. A hit builds a
    /// fresh shell over the surviving core.
    Core(Weak<InstanceCore>),
}

impl CacheEntry {
    fn upgrade(&self) -> Option<Value> {
        match self {
            CacheEntry::Wrapper(wrapper) => wrapper.upgrade().map(Value::Object),
            CacheEntry::Core(core) => core
                .upgrade()
                .map(|core| Value::Object(Rc::new(ProjectedInstance::new(core)))),
        }
    }

    fn is_alive(&self) -> bool {
        match self {
            CacheEntry::Wrapper(wrapper) => wrapper.strong_count() > 0,
            CacheEntry::Core(core) => core.strong_count() > 0,
        }
    }
}

pub(crate) struct InstanceCache {
    entries: HashMap<Identity, CacheEntry>,
    fallback: bool,
    sweep_interval: Duration,
    last_sweep: Instant,
}

impl InstanceCache {
    pub(crate) fn new(sweep_interval: Duration, fallback: bool) -> Self {
        Self {
            entries: HashMap::new(),
            fallback,
            sweep_interval,
            last_sweep: Instant::now(),
        }
    }

    /// The live wrapper of `identity`. A dead entry is erased.
    pub(crate) fn lookup(&mut self, identity: Identity) -> Option<Value> {
        let wrapper = self.entries.get(&identity)?.upgrade();
        if wrapper.is_none() {
            tracing::trace!(%identity, "erasing stale cache entry");
            self.entries.remove(&identity);
        }
        wrapper
    }

    /// Caches a new wrapper. The first failure to create a weak reference
    /// switches the cache to fallback mode for good.
    pub(crate) fn insert(
        &mut self,
        identity: Identity,
        wrapper: &ObjectRef,
        core: &Rc<InstanceCore>,
        host: &dyn ScriptHost,
    ) {
        if !self.fallback {
            match host.create_weak_ref(wrapper) {
                Ok(weak) => {
                    self.entries.insert(identity, CacheEntry::Wrapper(weak));
                    return;
                }
                Err(error) => {
                    tracing::warn!(%error, "weak references unavailable, identity cache in fallback mode");
                    self.fallback = true;
                }
            }
        }
        self.entries
            .insert(identity, CacheEntry::Core(Rc::downgrade(core)));
    }

    pub(crate) fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Sweeps when the sweep interval has elapsed since the last sweep.
    pub(crate) fn maybe_sweep(&mut self) {
        if self.last_sweep.elapsed() >= self.sweep_interval {
            self.sweep();
        }
    }

    /// Erases every dead entry. Returns how many were erased.
    pub(crate) fn sweep(&mut self) -> usize {
        self.last_sweep = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_alive());
        let removed = before - self.entries.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = self.entries.len(), "swept identity cache");
        }
        removed
    }

    /// Number of entries whose wrapper is still alive.
    pub(crate) fn live_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_alive()).count()
    }

    /// Number of entries, dead or alive.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
