use crate::{
    error::ProxyError,
    state::SharedState,
    types::members::MethodDescription,
    utils::sync::{Arc, Mutex, OnceLock},
    value::{ObjectRef, Value},
    vm::{
        metrics::RuntimeMetrics,
        thunk::{Thunk, ThunkCompiler},
    },
};
use dashmap::DashMap;
use std::fmt::{Debug, Formatter};
use tracing::trace;

/// A method paired with its thunk, compiled on first use.
pub struct ThunkCacheEntry {
    method: MethodDescription,
    thunk: OnceLock<Arc<Thunk>>,
    compile_lock: Mutex<()>,
    compiler: Arc<ThunkCompiler>,
}

impl ThunkCacheEntry {
    pub(crate) fn new(method: MethodDescription, compiler: Arc<ThunkCompiler>) -> Self {
        Self {
            method,
            thunk: OnceLock::new(),
            compile_lock: Mutex::new(()),
            compiler,
        }
    }

    fn compiled(method: MethodDescription, thunk: Arc<Thunk>, compiler: Arc<ThunkCompiler>) -> Self {
        Self {
            method,
            thunk: OnceLock::from(thunk),
            compile_lock: Mutex::new(()),
            compiler,
        }
    }

    pub fn method(&self) -> &MethodDescription {
        &self.method
    }

    pub fn is_compiled(&self) -> bool {
        self.thunk.get().is_some()
    }

    /// Compiles at most once. A failed compilation leaves the entry empty.
    pub fn thunk(&self) -> Result<Arc<Thunk>, ProxyError> {
        if let Some(thunk) = self.thunk.get() {
            return Ok(thunk.clone());
        }

        let _guard = self.compile_lock.lock();
        if let Some(thunk) = self.thunk.get() {
            return Ok(thunk.clone());
        }
        let thunk = Arc::new(self.compiler.compile(&self.method)?);
        let _ = self.thunk.set(thunk.clone());
        Ok(thunk)
    }

    pub fn invoke(&self, instance: &ObjectRef, arguments: &mut [Value]) -> Result<Value, ProxyError> {
        self.thunk()?.invoke(instance, arguments)
    }
}

impl Debug for ThunkCacheEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThunkCacheEntry")
            .field("method", &self.method)
            .field("compiled", &self.is_compiled())
            .finish()
    }
}

/// One entry per distinct method identity, shared by every caller.
pub struct ThunkCache {
    entries: DashMap<MethodDescription, Arc<ThunkCacheEntry>>,
    insert_lock: Mutex<()>,
    compiler: Arc<ThunkCompiler>,
    metrics: Arc<RuntimeMetrics>,
}

impl ThunkCache {
    pub fn new(compiler: Arc<ThunkCompiler>, metrics: Arc<RuntimeMetrics>) -> Self {
        Self {
            entries: DashMap::new(),
            insert_lock: Mutex::new(()),
            compiler,
            metrics,
        }
    }

    fn lookup(&self, method: &MethodDescription) -> Option<Arc<ThunkCacheEntry>> {
        let entry = self.entries.get(method)?.clone();
        self.metrics.record_thunk_cache_hit();
        trace!("thunk cache hit for {:?}", method);
        Some(entry)
    }

    /// The entry for `method`, created uncompiled on a miss. Callers must have
    /// validated the signature with [`ThunkCompiler::check_signature`].
    pub fn entry(&self, method: &MethodDescription) -> Arc<ThunkCacheEntry> {
        if let Some(entry) = self.lookup(method) {
            return entry;
        }

        let _guard = self.insert_lock.lock();
        if let Some(entry) = self.lookup(method) {
            return entry;
        }
        self.metrics.record_thunk_cache_miss();
        let entry = Arc::new(ThunkCacheEntry::new(method.clone(), self.compiler.clone()));
        self.entries.insert(method.clone(), entry.clone());
        entry
    }

    /// Compiles on a miss and inserts only on success, so a rejected method
    /// leaves the cache untouched.
    pub fn get_or_compile(&self, method: &MethodDescription) -> Result<Arc<Thunk>, ProxyError> {
        if let Some(entry) = self.lookup(method) {
            return entry.thunk();
        }

        let _guard = self.insert_lock.lock();
        if let Some(entry) = self.lookup(method) {
            return entry.thunk();
        }
        let thunk = Arc::new(self.compiler.compile(method)?);
        self.metrics.record_thunk_cache_miss();
        self.entries.insert(
            method.clone(),
            Arc::new(ThunkCacheEntry::compiled(
                method.clone(),
                thunk.clone(),
                self.compiler.clone(),
            )),
        );
        Ok(thunk)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Calls arbitrary methods through thunks.
#[derive(Clone)]
pub struct MethodInvoker {
    state: Arc<SharedState>,
}

impl MethodInvoker {
    pub fn new(state: Arc<SharedState>) -> Self {
        Self { state }
    }

    pub fn invoke(
        &self,
        method: &MethodDescription,
        instance: &ObjectRef,
        arguments: &mut [Value],
    ) -> Result<Value, ProxyError> {
        self.state
            .thunks
            .get_or_compile(method)?
            .invoke(instance, arguments)
    }

    /// A freshly compiled thunk that bypasses the cache.
    pub fn create_delegate(&self, method: &MethodDescription) -> Result<Arc<Thunk>, ProxyError> {
        self.state.compiler.compile(method).map(Arc::new)
    }
}
