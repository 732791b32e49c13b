use crate::{
    error::ProxyError,
    types::{members::MethodDescription, runtime::RuntimeType},
    utils::sync::{Arc, Mutex},
    vm::{cache::ThunkCacheEntry, metrics::RuntimeMetrics, thunk::ThunkCompiler},
};
use dashmap::DashMap;
use std::fmt::{Debug, Formatter};
use tracing::{debug, trace};

/// A generic method closed over one list of type arguments.
#[derive(Debug)]
pub struct Specialization {
    pub type_arguments: Box<[RuntimeType]>,
    pub method: MethodDescription,
    /// Proceed thunk, compiled on first use.
    pub entry: Arc<ThunkCacheEntry>,
}

/// Specializations of one open generic method, keyed by type arguments.
pub struct SpecializationCache {
    open_method: MethodDescription,
    specializations: DashMap<Box<[RuntimeType]>, Arc<Specialization>>,
    insert_lock: Mutex<()>,
    compiler: Arc<ThunkCompiler>,
    metrics: Arc<RuntimeMetrics>,
}

impl SpecializationCache {
    pub fn new(
        open_method: MethodDescription,
        compiler: Arc<ThunkCompiler>,
        metrics: Arc<RuntimeMetrics>,
    ) -> Self {
        Self {
            open_method: open_method.open(),
            specializations: DashMap::new(),
            insert_lock: Mutex::new(()),
            compiler,
            metrics,
        }
    }

    pub fn open_method(&self) -> &MethodDescription {
        &self.open_method
    }

    pub fn get_or_create(&self, type_arguments: &[RuntimeType]) -> Result<Arc<Specialization>, ProxyError> {
        if let Some(s) = self.specializations.get(type_arguments) {
            self.metrics.record_specialization_cache_hit();
            trace!("specialization cache hit for {:?}", s.method);
            return Ok(s.clone());
        }

        let _guard = self.insert_lock.lock();
        if let Some(s) = self.specializations.get(type_arguments) {
            self.metrics.record_specialization_cache_hit();
            return Ok(s.clone());
        }

        let method = self.open_method.make_generic(type_arguments)?;
        self.metrics.record_specialization_cache_miss();
        debug!("created specialization {:?}", method);

        let specialization = Arc::new(Specialization {
            type_arguments: type_arguments.into(),
            entry: Arc::new(ThunkCacheEntry::new(method.clone(), self.compiler.clone())),
            method,
        });
        self.specializations
            .insert(type_arguments.into(), specialization.clone());
        Ok(specialization)
    }

    pub fn len(&self) -> usize {
        self.specializations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specializations.is_empty()
    }
}

impl Debug for SpecializationCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecializationCache")
            .field("open_method", &self.open_method)
            .field("specializations", &self.specializations.len())
            .finish()
    }
}
