use crate::{
    config::ProxyConfig,
    proxy::descriptor::ProxyTypeCache,
    utils::sync::Arc,
    vm::{
        cache::ThunkCache,
        metrics::{CacheSizes, CacheStats, RuntimeMetrics},
        specialization::SpecializationCache,
        thunk::ThunkCompiler,
    },
    types::members::MethodDescription,
};

/// Everything a factory's proxies share: configuration, counters and caches.
pub struct SharedState {
    pub config: ProxyConfig,
    pub metrics: Arc<RuntimeMetrics>,
    pub compiler: Arc<ThunkCompiler>,
    pub thunks: ThunkCache,
    pub proxy_types: ProxyTypeCache,
}

impl SharedState {
    pub fn new(config: ProxyConfig) -> Arc<Self> {
        let metrics = Arc::new(RuntimeMetrics::new());
        let compiler = Arc::new(ThunkCompiler::new(metrics.clone()));
        Arc::new(Self {
            config,
            thunks: ThunkCache::new(compiler.clone(), metrics.clone()),
            proxy_types: ProxyTypeCache::new(metrics.clone()),
            metrics,
            compiler,
        })
    }

    pub fn specialization_cache(&self, open_method: &MethodDescription) -> SpecializationCache {
        SpecializationCache::new(
            open_method.clone(),
            self.compiler.clone(),
            self.metrics.clone(),
        )
    }

    pub fn cache_statistics(&self) -> CacheStats {
        self.metrics.cache_statistics(CacheSizes {
            thunk_size: self.thunks.len(),
            proxy_type_size: self.proxy_types.len(),
        })
    }
}
