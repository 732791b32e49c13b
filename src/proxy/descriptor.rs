use crate::{
    error::ProxyError,
    proxy::builder::ProxyType,
    types::{members::MethodDescription, TypeDescription},
    utils::sync::{Arc, Mutex},
    vm::metrics::RuntimeMetrics,
};
use dashmap::DashMap;
use std::{
    fmt::{Debug, Formatter},
    hash::{Hash, Hasher},
};
use tracing::trace;

type Predicate = dyn Fn(&MethodDescription) -> bool + Send + Sync;

/// Decides which methods of a proxy are intercepted. The rest forward
/// straight to the target.
///
/// Filters compare by identity: clones of one filter are equal, two filters
/// built from separate closures are not.
#[derive(Clone, Default)]
pub struct MethodFilter {
    predicate: Option<Arc<Predicate>>,
}

impl MethodFilter {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&MethodDescription) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Some(Arc::new(predicate)),
        }
    }

    /// Intercepts everything except the members of the universal base type.
    pub fn default_filter() -> Self {
        Self::default()
    }

    pub fn should_intercept(&self, method: &MethodDescription) -> bool {
        match &self.predicate {
            Some(p) => p(method),
            None => method.parent != TypeDescription::object(),
        }
    }

    fn identity(&self) -> usize {
        self.predicate
            .as_ref()
            .map_or(0, |p| Arc::as_ptr(p) as *const () as usize)
    }
}

impl PartialEq for MethodFilter {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for MethodFilter {}

impl Hash for MethodFilter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl Debug for MethodFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.predicate {
            None => write!(f, "MethodFilter(default)"),
            Some(_) => write!(f, "MethodFilter({:#x})", self.identity()),
        }
    }
}

/// What a proxy type is built from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProxyDescriptor {
    pub primary: TypeDescription,
    pub interfaces: Vec<TypeDescription>,
    pub filter: MethodFilter,
}

impl ProxyDescriptor {
    pub fn new(primary: TypeDescription, interfaces: &[TypeDescription], filter: MethodFilter) -> Self {
        Self {
            primary,
            interfaces: interfaces.to_vec(),
            filter,
        }
    }
}

/// Synthesized proxy types by descriptor.
pub struct ProxyTypeCache {
    types: DashMap<ProxyDescriptor, ProxyType>,
    build_lock: Mutex<()>,
    metrics: Arc<RuntimeMetrics>,
}

impl ProxyTypeCache {
    pub fn new(metrics: Arc<RuntimeMetrics>) -> Self {
        Self {
            types: DashMap::new(),
            build_lock: Mutex::new(()),
            metrics,
        }
    }

    /// Returns the cached type or builds it, at most once per descriptor.
    /// Failed builds are not cached.
    pub fn get_or_build(
        &self,
        descriptor: &ProxyDescriptor,
        build: impl FnOnce() -> Result<ProxyType, ProxyError>,
    ) -> Result<ProxyType, ProxyError> {
        if let Some(ty) = self.types.get(descriptor) {
            self.metrics.record_proxy_type_cache_hit();
            trace!("proxy type cache hit for {:?}", descriptor.primary);
            return Ok(ty.clone());
        }

        let _guard = self.build_lock.lock();
        if let Some(ty) = self.types.get(descriptor) {
            self.metrics.record_proxy_type_cache_hit();
            return Ok(ty.clone());
        }
        self.metrics.record_proxy_type_cache_miss();
        let ty = build()?;
        self.types.insert(descriptor.clone(), ty.clone());
        Ok(ty)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
